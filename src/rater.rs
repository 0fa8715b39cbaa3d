//! Senior-rater requirement rules.
//!
//! Two distinct questions live here and are deliberately not unified:
//! whether a given unit's signer block needs senior-rater fields (a pure
//! function of cycle and small-unit membership), and whether the session
//! needs the single cross-cutting small-unit signer record (a
//! server-authoritative flag that backend policy may set differently from
//! the pure cycle rule).

use crate::session::{Cycle, RosterSession};

/// Does this unit require senior-rater fields for this cycle?
///
/// MSG and SMS cycles require a senior rater for every unit. For the lower
/// cycles only units that appear in the `small_unit` bucket do. Membership
/// compares trimmed codes, consistent with the trimming applied during unit
/// derivation even where backend data carries padded `ASSIGNED_PAS` values.
pub fn needs_senior_rater(cycle: Cycle, unit_code: &str, session: &RosterSession) -> bool {
    if cycle.always_needs_senior_rater() {
        return true;
    }
    session
        .categories
        .small_unit
        .iter()
        .any(|m| m.assigned_pas.trim() == unit_code)
}

/// Does this session require the cross-cutting small-unit signer record?
///
/// Returns the session flag verbatim: the backend is authoritative here and
/// this must not be re-derived from member data.
pub fn session_needs_small_unit_signer(session: &RosterSession) -> bool {
    session.senior_rater_needed
}
