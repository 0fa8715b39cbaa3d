//! melflow — the intake workflow core for Master Eligibility Listing
//! generation.
//!
//! A user uploads a personnel roster, reviews auto-categorized member
//! records, supplies per-unit signer metadata, and triggers document
//! generation. This crate is the engine between review and generation: it
//! derives the organizational units in play, decides where a senior rater
//! is required, merges fresh server state with in-progress user input
//! without losing edits, and gates submission readiness. Transport, file
//! parsing, classification, and rendering live behind the `api` seam.

pub mod api;
pub mod errors;
pub mod orginfo;
pub mod payload;
pub mod rater;
pub mod session;
pub mod units;
pub mod workflow;

pub use api::{HttpRosterService, RosterService};
pub use errors::WorkflowError;
pub use orginfo::{OrgInfo, OrgInfoState};
pub use payload::{SMALL_UNIT_SR_KEY, SignerPayload, build_payload, is_ready};
pub use rater::{needs_senior_rater, session_needs_small_unit_signer};
pub use session::{Category, Cycle, RosterMember, RosterSession};
pub use units::{DerivedUnits, derive_units};
pub use workflow::{MelWorkflow, WorkflowState};
