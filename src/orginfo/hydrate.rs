//! Hydration of partial server records into fully populated signer records.

use crate::orginfo::types::OrgInfo;
use crate::session::PascodeRecord;

/// Discrete name parts recovered from a composite display name.
#[derive(Debug, Default, PartialEq, Eq)]
struct ParsedName {
    first: String,
    middle: String,
    last: String,
}

/// Split a composite `"Last, First Middle"` string into discrete parts.
///
/// The portion before the first comma becomes the last name; the remainder
/// is tokenized on whitespace into first name and (joined) middle names.
/// With no comma the whole string becomes the first name.
fn parse_display_name(display: Option<&str>) -> ParsedName {
    let Some(display) = display.filter(|s| !s.is_empty()) else {
        return ParsedName::default();
    };

    let parts: Vec<&str> = display.split(',').map(str::trim).collect();
    let last = parts.first().copied().unwrap_or("");
    let remainder = parts.get(1).copied().unwrap_or("");

    if remainder.is_empty() {
        return ParsedName {
            first: display.trim().to_string(),
            middle: String::new(),
            last: String::new(),
        };
    }

    let mut tokens = remainder.split_whitespace();
    let first = tokens.next().unwrap_or("").to_string();
    let middle = tokens.collect::<Vec<_>>().join(" ");

    ParsedName {
        first,
        middle,
        last: last.to_string(),
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

impl OrgInfo {
    /// Map an arbitrary, partial server record into a fully populated
    /// record.
    ///
    /// Missing ranks and titles take the standard defaults. Discrete name
    /// parts win over the composite `senior_rater_name` string; the
    /// composite is only split when the discrete parts are absent.
    pub fn hydrate(record: Option<&PascodeRecord>) -> OrgInfo {
        let defaults = OrgInfo::default();
        let Some(entry) = record else {
            return defaults;
        };

        let parsed = parse_display_name(entry.senior_rater_name.as_deref());

        OrgInfo {
            srid: or_default(&entry.srid, ""),
            senior_rater_rank: or_default(&entry.senior_rater_rank, &defaults.senior_rater_rank),
            senior_rater_title: or_default(&entry.senior_rater_title, &defaults.senior_rater_title),
            senior_rater_first_name: or_default(&entry.senior_rater_first_name, &parsed.first),
            senior_rater_middle_name: or_default(&entry.senior_rater_middle_name, &parsed.middle),
            senior_rater_last_name: or_default(&entry.senior_rater_last_name, &parsed.last),
            commander_rank: or_default(&entry.commander_rank, &defaults.commander_rank),
            commander_title: or_default(&entry.commander_title, &defaults.commander_title),
            commander_first_name: or_default(&entry.commander_first_name, ""),
            commander_middle_name: or_default(&entry.commander_middle_name, ""),
            commander_last_name: or_default(&entry.commander_last_name, ""),
        }
    }
}
