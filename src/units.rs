//! Unit derivation: which organizational units are in play for a session.
//!
//! Explicit session data always wins; derivation from member data is the
//! fallback. Both the unit-code ordering and the display-name tie-break are
//! first-seen over the fixed category scan order, so repeated derivation
//! over the same snapshot is stable.

use crate::session::RosterSession;
use std::collections::HashMap;

/// The derived unit universe for a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedUnits {
    /// Distinct unit codes, in first-seen order (or the session's explicit
    /// order when `pascodes` is non-empty).
    pub codes: Vec<String>,
    /// Best-effort unit code → display name map.
    pub names: HashMap<String, String>,
}

/// Compute the ordered unit-code set and display-name map for a session.
///
/// - Explicit `session.pascodes` / `session.pascode_unit_map` are used
///   verbatim and never re-derived.
/// - Otherwise members are scanned in the fixed category order; codes are
///   collected trimmed, duplicates and empty codes skipped, and the first
///   non-empty cleartext seen for a code supplies its display name. Later
///   members never overwrite an established name, even with a different or
///   blank cleartext.
/// - Absent input yields empty outputs; there are no error conditions.
pub fn derive_units(session: &RosterSession) -> DerivedUnits {
    let codes = if !session.pascodes.is_empty() {
        session.pascodes.clone()
    } else {
        let mut seen: Vec<String> = Vec::new();
        for member in session.categories.all_members() {
            let pas = member.assigned_pas.trim();
            if !pas.is_empty() && !seen.iter().any(|c| c == pas) {
                seen.push(pas.to_string());
            }
        }
        seen
    };

    let names = if !session.pascode_unit_map.is_empty() {
        session.pascode_unit_map.clone()
    } else {
        let mut map: HashMap<String, String> = HashMap::new();
        for member in session.categories.all_members() {
            let pas = member.assigned_pas.trim();
            let unit = member.assigned_pas_cleartext.trim();
            if !pas.is_empty() && !unit.is_empty() && !map.contains_key(pas) {
                map.insert(pas.to_string(), unit.to_string());
            }
        }
        map
    };

    DerivedUnits { codes, names }
}
