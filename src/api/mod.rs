//! Collaborator contracts consumed by the workflow core.
//!
//! The core is purely in-memory; everything that touches the network sits
//! behind the `RosterService` trait. The production implementation is
//! `HttpRosterService`; tests substitute their own mock.

mod http;

pub use http::HttpRosterService;

use crate::errors::{GenerationError, MutationError, PreviewError, UploadError};
use crate::payload::SignerPayload;
use crate::session::{Category, Cycle, RosterSession};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An uploaded roster or logo file: raw bytes plus the original filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RosterFile {
    pub fn new(filename: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            bytes,
        }
    }
}

/// Paging/filter parameters for a preview fetch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreviewQuery {
    pub category: String,
    pub page: u32,
    pub page_size: u32,
}

impl Default for PreviewQuery {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            page: 1,
            page_size: 50,
        }
    }
}

/// Partial member fields for add/edit payloads. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberPatch {
    #[serde(rename = "FULL_NAME", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "GRADE", skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(rename = "ASSIGNED_PAS", skip_serializing_if = "Option::is_none")]
    pub assigned_pas: Option<String>,
    #[serde(
        rename = "ASSIGNED_PAS_CLEARTEXT",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_pas_cleartext: Option<String>,
    #[serde(rename = "DAFSC", skip_serializing_if = "Option::is_none")]
    pub dafsc: Option<String>,
    #[serde(rename = "PAFSC", skip_serializing_if = "Option::is_none")]
    pub pafsc: Option<String>,
    #[serde(rename = "DOR", skip_serializing_if = "Option::is_none")]
    pub dor: Option<String>,
    #[serde(rename = "TAFMSD", skip_serializing_if = "Option::is_none")]
    pub tafmsd: Option<String>,
    #[serde(
        rename = "DATE_ARRIVED_STATION",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_arrived_station: Option<String>,
    #[serde(rename = "REENL_ELIG_STATUS", skip_serializing_if = "Option::is_none")]
    pub reenl_elig_status: Option<String>,
    #[serde(rename = "REASON", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payload for adding a member to a category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddMemberRequest {
    pub category: Category,
    pub data: MemberPatch,
    pub reason: String,
    pub run_eligibility_check: bool,
}

/// Parameters for a member delete.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteMemberRequest {
    pub reason: String,
    pub hard_delete: bool,
}

/// Payload for re-running classification over an existing session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReprocessRequest {
    pub preserve_manual_edits: bool,
    pub categories: Vec<String>,
}

impl Default for ReprocessRequest {
    fn default() -> Self {
        Self {
            preserve_manual_edits: true,
            categories: Vec::new(),
        }
    }
}

/// Abstraction over the roster backend for testability.
/// Real implementation: `HttpRosterService`. Tests provide their own double.
///
/// Every mutating call returns the refreshed session snapshot that replaces
/// the workflow's working copy.
#[async_trait]
pub trait RosterService: Send + Sync {
    /// Upload a roster file and start a session.
    async fn upload(
        &self,
        file: &RosterFile,
        cycle: Cycle,
        year: i32,
    ) -> Result<RosterSession, UploadError>;

    /// Fetch a fresh session snapshot. May be unavailable, in which case
    /// the workflow falls back to reconstructing a snapshot locally.
    async fn fetch_preview(
        &self,
        session_id: &str,
        query: &PreviewQuery,
    ) -> Result<RosterSession, PreviewError>;

    async fn add_member(
        &self,
        session_id: &str,
        request: &AddMemberRequest,
    ) -> Result<RosterSession, MutationError>;

    async fn edit_member(
        &self,
        session_id: &str,
        member_id: &str,
        patch: &MemberPatch,
    ) -> Result<RosterSession, MutationError>;

    async fn delete_member(
        &self,
        session_id: &str,
        member_id: &str,
        request: &DeleteMemberRequest,
    ) -> Result<RosterSession, MutationError>;

    /// Re-run classification, optionally preserving manual edits.
    async fn reprocess(
        &self,
        session_id: &str,
        request: &ReprocessRequest,
    ) -> Result<RosterSession, MutationError>;

    /// Submit the final signer payload and receive the generated document.
    async fn submit_org_info(
        &self,
        session_id: &str,
        payload: &HashMap<String, SignerPayload>,
    ) -> Result<Vec<u8>, GenerationError>;

    async fn upload_logo(&self, session_id: &str, logo: &RosterFile)
    -> Result<(), MutationError>;

    async fn delete_logo(&self, session_id: &str) -> Result<(), MutationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_query_defaults_match_backend_expectations() {
        let query = PreviewQuery::default();
        assert_eq!(query.category, "all");
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 50);
    }

    #[test]
    fn member_patch_serializes_only_set_fields_under_column_names() {
        let patch = MemberPatch {
            full_name: Some("SMITH, JOHN".into()),
            assigned_pas: Some("AB12".into()),
            ..MemberPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["FULL_NAME"], "SMITH, JOHN");
        assert_eq!(json["ASSIGNED_PAS"], "AB12");
        assert!(json.get("GRADE").is_none());
    }

    #[test]
    fn add_member_request_serializes_category_as_bucket_name() {
        let request = AddMemberRequest {
            category: Category::SmallUnit,
            data: MemberPatch::default(),
            reason: "late arrival".into(),
            run_eligibility_check: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["category"], "small_unit");
        assert_eq!(json["run_eligibility_check"], true);
    }

    #[test]
    fn reprocess_defaults_preserve_manual_edits() {
        let request = ReprocessRequest::default();
        assert!(request.preserve_manual_edits);
        assert!(request.categories.is_empty());
    }
}
