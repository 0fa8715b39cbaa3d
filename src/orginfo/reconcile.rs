//! Reconciliation of local signer records against fresh session snapshots.

use crate::orginfo::types::OrgInfo;
use crate::rater::session_needs_small_unit_signer;
use crate::session::RosterSession;
use crate::units::derive_units;
use std::collections::HashMap;
use tracing::debug;

/// The per-session map of signer records, plus the single cross-cutting
/// small-unit record.
///
/// Owned exclusively by the workflow instance; all writes go through
/// `reconcile` or the `*_mut` edit surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgInfoState {
    units: HashMap<String, OrgInfo>,
    small_unit: OrgInfo,
}

impl OrgInfoState {
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            small_unit: OrgInfo::default(),
        }
    }

    /// Re-run the merge for every unit the session currently knows about.
    ///
    /// For each derived unit code the server record is hydrated and merged
    /// under the existing local record, so unsaved user input wins
    /// field-by-field. Units no longer in the derived list are dropped.
    /// The small-unit record merges the same way while the session requires
    /// it and resets to an empty hydrated default once it does not.
    pub fn reconcile(&mut self, session: &RosterSession) {
        let derived = derive_units(session);

        let mut next = HashMap::with_capacity(derived.codes.len());
        for code in &derived.codes {
            let hydrated = OrgInfo::hydrate(session.pascode_map.get(code));
            next.insert(code.clone(), OrgInfo::merge(self.units.get(code), hydrated));
        }
        let dropped = self
            .units
            .keys()
            .filter(|code| !next.contains_key(*code))
            .count();
        self.units = next;

        if session_needs_small_unit_signer(session) {
            self.small_unit = OrgInfo::merge(
                Some(&self.small_unit),
                OrgInfo::hydrate(session.small_unit_sr.as_ref()),
            );
        } else {
            self.small_unit = OrgInfo::default();
        }

        debug!(
            session_id = %session.session_id,
            units = self.units.len(),
            dropped,
            small_unit = session.senior_rater_needed,
            "reconciled organizational info"
        );
    }

    pub fn unit(&self, code: &str) -> Option<&OrgInfo> {
        self.units.get(code)
    }

    /// Edit surface for a unit's record; creates an empty record on first
    /// reference to a code.
    pub fn unit_mut(&mut self, code: &str) -> &mut OrgInfo {
        self.units.entry(code.to_string()).or_default()
    }

    pub fn units(&self) -> &HashMap<String, OrgInfo> {
        &self.units
    }

    pub fn small_unit(&self) -> &OrgInfo {
        &self.small_unit
    }

    pub fn small_unit_mut(&mut self) -> &mut OrgInfo {
        &mut self.small_unit
    }

    pub fn clear(&mut self) {
        self.units.clear();
        self.small_unit = OrgInfo::default();
    }
}
