//! Organizational-info records and the reconciliation engine.
//!
//! This module provides:
//! - `OrgInfo` — the fully populated per-unit signer record
//! - `OrgInfo::hydrate` — partial server record → full local record
//! - `OrgInfo::merge` — field-wise "user input wins" conflict resolution
//! - `OrgInfoState` — the per-session map of signer records, re-merged on
//!   every snapshot change so unsaved input survives refreshes

mod hydrate;
mod reconcile;
mod types;

pub use reconcile::OrgInfoState;
pub use types::{OFFICER_RANKS, OrgInfo};
