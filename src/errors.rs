//! Typed error hierarchy for the intake workflow.
//!
//! One enum per collaborator boundary plus an umbrella for the state
//! machine:
//! - `UploadError` — roster file upload/parsing failures
//! - `PreviewError` — preview fetch failures (consumed by the fallback path)
//! - `MutationError` — member add/edit/delete rejections
//! - `GenerationError` — document generation failures
//! - `WorkflowError` — invalid transitions and readiness gating
//!
//! None of these is fatal: every failure leaves the workflow in a
//! well-defined state and `reset` is always available.

use thiserror::Error;

/// Errors from the upload collaborator.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid roster file: {0}")]
    InvalidFile(String),

    #[error("Roster is missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Upload transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the preview/refresh collaborator.
///
/// Never surfaced to the caller as a hard failure; the workflow logs it and
/// synthesizes a fallback snapshot instead.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Roster preview unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the member-mutation collaborator.
///
/// The detail string is server-provided, human-readable text; the working
/// snapshot is left untouched when one of these surfaces.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Member {member_id} not found in session")]
    MemberNotFound { member_id: String },

    #[error("Mutation rejected: {detail}")]
    Rejected { detail: String },

    #[error("Mutation transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the generation collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Document generation rejected: {detail}")]
    Rejected { detail: String },

    #[error("Generation transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the workflow state machine itself.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Operation '{action}' is not valid in state {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("Organizational info is incomplete; submission is not ready")]
    NotReady,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
