//! HTTP implementation of the roster backend contract.
//!
//! Endpoint shapes mirror the roster service API:
//! - `POST /api/upload/initial-mel` (multipart: file, cycle, year)
//! - `GET /api/roster/preview/{session_id}` (query: category, page, page_size)
//! - `POST/PUT/DELETE /api/roster/member/...`
//! - `POST /api/roster/reprocess/{session_id}`
//! - `POST /api/initial-mel/submit/pascode-info` (returns the PDF bytes)
//! - `POST/DELETE /api/roster/logo/{session_id}`
//!
//! Backend error bodies carry a human-readable `detail` field, which is
//! surfaced verbatim in the typed errors.

use crate::api::{
    AddMemberRequest, DeleteMemberRequest, MemberPatch, PreviewQuery, ReprocessRequest,
    RosterFile, RosterService,
};
use crate::errors::{GenerationError, MutationError, PreviewError, UploadError};
use crate::payload::SignerPayload;
use crate::session::{Cycle, RosterSession};
use async_trait::async_trait;
use reqwest::multipart;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// `RosterService` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRosterService {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    session_id: &'a str,
    pascode_info: &'a HashMap<String, SignerPayload>,
}

/// Extract the backend's `detail` message from an error response, falling
/// back to the status line.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("detail")
            .and_then(|d| d.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    }
}

impl HttpRosterService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Service pointed at the default local backend.
    pub fn local() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn mutation_response(
        &self,
        response: reqwest::Response,
    ) -> Result<RosterSession, MutationError> {
        if !response.status().is_success() {
            return Err(MutationError::Rejected {
                detail: error_detail(response).await,
            });
        }
        response
            .json::<RosterSession>()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))
    }
}

#[async_trait]
impl RosterService for HttpRosterService {
    async fn upload(
        &self,
        file: &RosterFile,
        cycle: Cycle,
        year: i32,
    ) -> Result<RosterSession, UploadError> {
        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(file.bytes.clone()).file_name(file.filename.clone()),
            )
            .text("cycle", cycle.code())
            .text("year", year.to_string());

        let response = self
            .client
            .post(self.url("/api/upload/initial-mel"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UploadError::InvalidFile(error_detail(response).await));
        }
        let session = response
            .json::<RosterSession>()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        debug!(session_id = %session.session_id, "roster uploaded");
        Ok(session)
    }

    async fn fetch_preview(
        &self,
        session_id: &str,
        query: &PreviewQuery,
    ) -> Result<RosterSession, PreviewError> {
        let response = self
            .client
            .get(self.url(&format!("/api/roster/preview/{session_id}")))
            .query(query)
            .send()
            .await
            .map_err(|e| PreviewError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PreviewError::Unavailable(error_detail(response).await));
        }
        response
            .json::<RosterSession>()
            .await
            .map_err(|e| PreviewError::Unavailable(e.to_string()))
    }

    async fn add_member(
        &self,
        session_id: &str,
        request: &AddMemberRequest,
    ) -> Result<RosterSession, MutationError> {
        let response = self
            .client
            .post(self.url(&format!("/api/roster/member/{session_id}")))
            .json(request)
            .send()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;
        self.mutation_response(response).await
    }

    async fn edit_member(
        &self,
        session_id: &str,
        member_id: &str,
        patch: &MemberPatch,
    ) -> Result<RosterSession, MutationError> {
        let response = self
            .client
            .put(self.url(&format!("/api/roster/member/{session_id}/{member_id}")))
            .json(patch)
            .send()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;
        self.mutation_response(response).await
    }

    async fn delete_member(
        &self,
        session_id: &str,
        member_id: &str,
        request: &DeleteMemberRequest,
    ) -> Result<RosterSession, MutationError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/roster/member/{session_id}/{member_id}")))
            .query(&[
                ("hard_delete", request.hard_delete.to_string()),
                ("reason", request.reason.clone()),
            ])
            .send()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;
        self.mutation_response(response).await
    }

    async fn reprocess(
        &self,
        session_id: &str,
        request: &ReprocessRequest,
    ) -> Result<RosterSession, MutationError> {
        let response = self
            .client
            .post(self.url(&format!("/api/roster/reprocess/{session_id}")))
            .json(request)
            .send()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;
        self.mutation_response(response).await
    }

    async fn submit_org_info(
        &self,
        session_id: &str,
        payload: &HashMap<String, SignerPayload>,
    ) -> Result<Vec<u8>, GenerationError> {
        let body = SubmitBody {
            session_id,
            pascode_info: payload,
        };
        let response = self
            .client
            .post(self.url("/api/initial-mel/submit/pascode-info"))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Rejected {
                detail: error_detail(response).await,
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        debug!(session_id, size = bytes.len(), "document generated");
        Ok(bytes.to_vec())
    }

    async fn upload_logo(
        &self,
        session_id: &str,
        logo: &RosterFile,
    ) -> Result<(), MutationError> {
        let form = multipart::Form::new().part(
            "logo",
            multipart::Part::bytes(logo.bytes.clone()).file_name(logo.filename.clone()),
        );
        let response = self
            .client
            .post(self.url(&format!("/api/roster/logo/{session_id}")))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MutationError::Rejected {
                detail: error_detail(response).await,
            });
        }
        Ok(())
    }

    async fn delete_logo(&self, session_id: &str) -> Result<(), MutationError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/roster/logo/{session_id}")))
            .send()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MutationError::Rejected {
                detail: error_detail(response).await,
            });
        }
        Ok(())
    }
}
