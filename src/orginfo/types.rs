//! The per-unit signer record and its merge rule.

use serde::{Deserialize, Serialize};

/// Officer ranks selectable for commanders and senior raters, as
/// `(code, label)` pairs.
pub const OFFICER_RANKS: [(&str, &str); 10] = [
    ("2d Lt", "2d Lt - Second Lieutenant"),
    ("1st Lt", "1st Lt - First Lieutenant"),
    ("Capt", "Capt - Captain"),
    ("Maj", "Maj - Major"),
    ("Lt Col", "Lt Col - Lieutenant Colonel"),
    ("Col", "Col - Colonel"),
    ("Brig Gen", "Brig Gen - Brigadier General"),
    ("Maj Gen", "Maj Gen - Major General"),
    ("Lt Gen", "Lt Gen - Lieutenant General"),
    ("Gen", "Gen - General"),
];

/// A fully populated signer record for one unit (or for the session-level
/// small-unit signer).
///
/// Created empty on first reference to a unit code; mutated only through
/// the reconciler and the workflow's edit surface; never deleted
/// individually — only a whole-session reset clears it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgInfo {
    pub srid: String,
    pub senior_rater_rank: String,
    pub senior_rater_title: String,
    pub senior_rater_first_name: String,
    pub senior_rater_middle_name: String,
    pub senior_rater_last_name: String,
    pub commander_rank: String,
    pub commander_title: String,
    pub commander_first_name: String,
    pub commander_middle_name: String,
    pub commander_last_name: String,
}

impl Default for OrgInfo {
    fn default() -> Self {
        Self {
            srid: String::new(),
            senior_rater_rank: "Col".to_string(),
            senior_rater_title: "Commander".to_string(),
            senior_rater_first_name: String::new(),
            senior_rater_middle_name: String::new(),
            senior_rater_last_name: String::new(),
            commander_rank: "Lt Col".to_string(),
            commander_title: "Commander".to_string(),
            commander_first_name: String::new(),
            commander_middle_name: String::new(),
            commander_last_name: String::new(),
        }
    }
}

fn pick(primary: &str, secondary: String) -> String {
    if primary.is_empty() {
        secondary
    } else {
        primary.to_string()
    }
}

impl OrgInfo {
    /// The senior rater's display name, `"Last, First Middle"` with empty
    /// parts elided.
    pub fn display_name(&self) -> String {
        let last = self.senior_rater_last_name.trim();
        let first = self.senior_rater_first_name.trim();
        let middle = self.senior_rater_middle_name.trim();

        if last.is_empty() && first.is_empty() {
            return String::new();
        }
        let middle_part = if middle.is_empty() {
            String::new()
        } else {
            format!(" {middle}")
        };
        format!("{last}, {first}{middle_part}")
            .trim()
            .trim_start_matches(',')
            .trim()
            .to_string()
    }

    /// Field-wise merge: the primary (user-entered) value wins whenever it
    /// is non-empty, otherwise the secondary (server-hydrated) value is
    /// taken. With no primary record the secondary is returned unchanged.
    ///
    /// This is the core correctness property of the reconciler: a session
    /// refresh triggered by an unrelated member edit never discards
    /// partially typed signer information.
    pub fn merge(primary: Option<&OrgInfo>, secondary: OrgInfo) -> OrgInfo {
        let Some(primary) = primary else {
            return secondary;
        };
        OrgInfo {
            srid: pick(&primary.srid, secondary.srid),
            senior_rater_rank: pick(&primary.senior_rater_rank, secondary.senior_rater_rank),
            senior_rater_title: pick(&primary.senior_rater_title, secondary.senior_rater_title),
            senior_rater_first_name: pick(
                &primary.senior_rater_first_name,
                secondary.senior_rater_first_name,
            ),
            senior_rater_middle_name: pick(
                &primary.senior_rater_middle_name,
                secondary.senior_rater_middle_name,
            ),
            senior_rater_last_name: pick(
                &primary.senior_rater_last_name,
                secondary.senior_rater_last_name,
            ),
            commander_rank: pick(&primary.commander_rank, secondary.commander_rank),
            commander_title: pick(&primary.commander_title, secondary.commander_title),
            commander_first_name: pick(
                &primary.commander_first_name,
                secondary.commander_first_name,
            ),
            commander_middle_name: pick(
                &primary.commander_middle_name,
                secondary.commander_middle_name,
            ),
            commander_last_name: pick(&primary.commander_last_name, secondary.commander_last_name),
        }
    }
}
