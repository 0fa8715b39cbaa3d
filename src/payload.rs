//! Submission readiness gating and final signer payload construction.

use crate::orginfo::{OrgInfo, OrgInfoState};
use crate::rater::{needs_senior_rater, session_needs_small_unit_signer};
use crate::session::RosterSession;
use crate::units::derive_units;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved payload key for the session-level small-unit signer record.
/// Not a unit code; the generation backend treats it specially.
pub const SMALL_UNIT_SR_KEY: &str = "small_unit_sr";

/// The finalized, trimmed signer record submitted for document generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerPayload {
    pub srid: String,
    pub senior_rater_rank: String,
    pub senior_rater_title: String,
    pub senior_rater_name: String,
    pub senior_rater_first_name: String,
    pub senior_rater_middle_name: String,
    pub senior_rater_last_name: String,
    pub commander_rank: String,
    pub commander_title: String,
    pub commander_first_name: String,
    pub commander_middle_name: String,
    pub commander_last_name: String,
}

impl SignerPayload {
    /// Trim every field and compute the composite display name. These are
    /// the only transformations; validation is `is_ready`'s job.
    pub fn from_info(info: &OrgInfo) -> Self {
        Self {
            srid: info.srid.trim().to_string(),
            senior_rater_rank: info.senior_rater_rank.trim().to_string(),
            senior_rater_title: info.senior_rater_title.trim().to_string(),
            senior_rater_name: info.display_name(),
            senior_rater_first_name: info.senior_rater_first_name.trim().to_string(),
            senior_rater_middle_name: info.senior_rater_middle_name.trim().to_string(),
            senior_rater_last_name: info.senior_rater_last_name.trim().to_string(),
            commander_rank: info.commander_rank.trim().to_string(),
            commander_title: info.commander_title.trim().to_string(),
            commander_first_name: info.commander_first_name.trim().to_string(),
            commander_middle_name: info.commander_middle_name.trim().to_string(),
            commander_last_name: info.commander_last_name.trim().to_string(),
        }
    }
}

fn has_commander_fields(info: &OrgInfo) -> bool {
    !info.commander_rank.is_empty()
        && !info.commander_title.is_empty()
        && !info.commander_first_name.is_empty()
        && !info.commander_last_name.is_empty()
}

fn has_srid(info: &OrgInfo) -> bool {
    !info.srid.is_empty()
}

fn has_senior_rater_fields(info: &OrgInfo) -> bool {
    !info.senior_rater_rank.is_empty()
        && !info.senior_rater_title.is_empty()
        && !info.senior_rater_first_name.is_empty()
        && !info.senior_rater_last_name.is_empty()
}

/// Is the session ready to submit?
///
/// Every unit in the derived list needs a complete commander block and a
/// non-empty srid; units for which `needs_senior_rater` holds additionally
/// need a complete senior-rater block. When the session requires the
/// small-unit signer the same three checks apply to that record. Any single
/// failing unit makes the whole set not ready — there is no partial
/// submission.
pub fn is_ready(session: &RosterSession, state: &OrgInfoState) -> bool {
    let derived = derive_units(session);

    let units_ready = derived.codes.iter().all(|code| {
        let Some(info) = state.unit(code) else {
            return false;
        };
        has_commander_fields(info)
            && has_srid(info)
            && (!needs_senior_rater(session.cycle, code, session) || has_senior_rater_fields(info))
    });

    let small_unit_ready = !session_needs_small_unit_signer(session) || {
        let info = state.small_unit();
        has_commander_fields(info) && has_srid(info) && has_senior_rater_fields(info)
    };

    units_ready && small_unit_ready
}

/// Serialize the final per-unit signer payload, keyed by unit code, with
/// the reserved small-unit entry appended when required.
///
/// Assumes `is_ready` was true; no validation is re-run here.
pub fn build_payload(
    state: &OrgInfoState,
    needs_small_unit: bool,
) -> HashMap<String, SignerPayload> {
    let mut payload: HashMap<String, SignerPayload> = state
        .units()
        .iter()
        .map(|(code, info)| (code.clone(), SignerPayload::from_info(info)))
        .collect();

    if needs_small_unit {
        payload.insert(
            SMALL_UNIT_SR_KEY.to_string(),
            SignerPayload::from_info(state.small_unit()),
        );
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Cycle, RosterCategories, RosterMember, RosterSession};

    fn session_for(cycle: Cycle, eligible_pas: &str, small_unit_pas: Option<&str>) -> RosterSession {
        let mut categories = RosterCategories {
            eligible: vec![RosterMember::new("m1", "ABLE", eligible_pas, "1st Sq")],
            ..RosterCategories::default()
        };
        if let Some(pas) = small_unit_pas {
            categories
                .small_unit
                .push(RosterMember::new("s1", "BAKER", pas, "Small Det"));
        }
        RosterSession {
            session_id: "test".into(),
            cycle,
            categories,
            ..RosterSession::default()
        }
    }

    fn fill_commander_and_srid(info: &mut OrgInfo) {
        info.srid = "1234567".into();
        info.commander_first_name = "Jane".into();
        info.commander_last_name = "Doe".into();
    }

    fn fill_senior_rater(info: &mut OrgInfo) {
        info.senior_rater_first_name = "John".into();
        info.senior_rater_last_name = "Smith".into();
    }

    #[test]
    fn not_ready_until_commander_and_srid_present() {
        let session = session_for(Cycle::Ssg, "ABC", None);
        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        assert!(!is_ready(&session, &state));

        fill_commander_and_srid(state.unit_mut("ABC"));
        assert!(is_ready(&session, &state));
    }

    #[test]
    fn missing_srid_alone_blocks_readiness() {
        let session = session_for(Cycle::Ssg, "ABC", None);
        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        fill_commander_and_srid(state.unit_mut("ABC"));
        state.unit_mut("ABC").srid.clear();
        assert!(!is_ready(&session, &state));
    }

    #[test]
    fn ssg_unit_outside_small_unit_needs_no_senior_rater_fields() {
        let session = session_for(Cycle::Ssg, "ABC", None);
        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        fill_commander_and_srid(state.unit_mut("ABC"));
        // Senior-rater name fields left empty on purpose.
        assert!(is_ready(&session, &state));
    }

    #[test]
    fn msg_cycle_requires_senior_rater_even_outside_small_unit() {
        let session = session_for(Cycle::Msg, "ABC", None);
        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        fill_commander_and_srid(state.unit_mut("ABC"));
        assert!(!is_ready(&session, &state));

        fill_senior_rater(state.unit_mut("ABC"));
        assert!(is_ready(&session, &state));
    }

    #[test]
    fn small_unit_membership_requires_senior_rater_for_lower_cycles() {
        let session = session_for(Cycle::Ssg, "DEF", Some("DEF"));
        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        fill_commander_and_srid(state.unit_mut("DEF"));
        assert!(!is_ready(&session, &state));

        fill_senior_rater(state.unit_mut("DEF"));
        assert!(is_ready(&session, &state));
    }

    #[test]
    fn session_small_unit_signer_gates_readiness() {
        let mut session = session_for(Cycle::Ssg, "ABC", None);
        session.senior_rater_needed = true;

        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        fill_commander_and_srid(state.unit_mut("ABC"));
        assert!(!is_ready(&session, &state));

        fill_commander_and_srid(state.small_unit_mut());
        fill_senior_rater(state.small_unit_mut());
        assert!(is_ready(&session, &state));
    }

    #[test]
    fn any_single_failing_unit_blocks_the_whole_set() {
        let mut session = session_for(Cycle::Ssg, "ABC", None);
        session
            .categories
            .eligible
            .push(RosterMember::new("m2", "BAKER", "DEF", "2nd Sq"));

        let mut state = OrgInfoState::new();
        state.reconcile(&session);
        fill_commander_and_srid(state.unit_mut("ABC"));
        assert!(!is_ready(&session, &state));
    }

    #[test]
    fn payload_trims_fields_and_computes_display_name() {
        let mut state = OrgInfoState::new();
        {
            let info = state.unit_mut("ABC");
            info.srid = " 1234567 ".into();
            info.senior_rater_first_name = "John".into();
            info.senior_rater_middle_name = "A".into();
            info.senior_rater_last_name = "Smith".into();
            info.commander_first_name = " Jane ".into();
            info.commander_last_name = "Doe".into();
        }

        let payload = build_payload(&state, false);
        let entry = &payload["ABC"];
        assert_eq!(entry.srid, "1234567");
        assert_eq!(entry.commander_first_name, "Jane");
        assert_eq!(entry.senior_rater_name, "Smith, John A");
        assert!(!payload.contains_key(SMALL_UNIT_SR_KEY));
    }

    #[test]
    fn payload_includes_small_unit_entry_only_when_required() {
        let mut state = OrgInfoState::new();
        state.unit_mut("ABC");
        state.small_unit_mut().srid = "9999999".into();
        state.small_unit_mut().senior_rater_first_name = "John".into();
        state.small_unit_mut().senior_rater_last_name = "Smith".into();

        let payload = build_payload(&state, true);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[SMALL_UNIT_SR_KEY].srid, "9999999");
        assert_eq!(payload[SMALL_UNIT_SR_KEY].senior_rater_name, "Smith, John");
    }
}
