//! The intake workflow state machine.
//!
//! Sequences Upload → Review → Org-Info Collection → Completion over a
//! single session snapshot. The snapshot and the per-unit signer records
//! are owned exclusively by the workflow instance; member mutations replace
//! the snapshot wholesale via collaborator responses, and signer records
//! only change through reconciliation or the edit surface.
//!
//! Operations are fully sequential by design: each is triggered by a
//! discrete user action and awaited before the next can start. The
//! transition into org-info collection awaits a fresh snapshot first, so
//! derivation never runs against data older than the last acknowledged
//! member mutation.

use crate::api::{
    AddMemberRequest, DeleteMemberRequest, MemberPatch, PreviewQuery, ReprocessRequest,
    RosterFile, RosterService,
};
use crate::errors::WorkflowError;
use crate::orginfo::{OrgInfo, OrgInfoState};
use crate::payload::{build_payload, is_ready};
use crate::rater::session_needs_small_unit_signer;
use crate::session::{Cycle, RosterSession};
use crate::units::{DerivedUnits, derive_units};
use std::fmt;
use tracing::{info, warn};

/// Workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    UploadPending,
    ReviewingRoster,
    CollectingOrgInfo,
    Complete,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::UploadPending => "UploadPending",
            WorkflowState::ReviewingRoster => "ReviewingRoster",
            WorkflowState::CollectingOrgInfo => "CollectingOrgInfo",
            WorkflowState::Complete => "Complete",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's intake workflow over one roster session.
pub struct MelWorkflow<S: RosterService> {
    service: S,
    state: WorkflowState,
    session: Option<RosterSession>,
    org_info: OrgInfoState,
    artifact: Option<Vec<u8>>,
}

impl<S: RosterService> MelWorkflow<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: WorkflowState::UploadPending,
            session: None,
            org_info: OrgInfoState::new(),
            artifact: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn session(&self) -> Option<&RosterSession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    pub fn org_info(&self) -> &OrgInfoState {
        &self.org_info
    }

    /// The generated document, once `submit` has succeeded.
    pub fn artifact(&self) -> Option<&[u8]> {
        self.artifact.as_deref()
    }

    /// Unit codes and display names for the current snapshot.
    pub fn derived_units(&self) -> DerivedUnits {
        self.session
            .as_ref()
            .map(derive_units)
            .unwrap_or_default()
    }

    fn require(
        &self,
        expected: WorkflowState,
        action: &'static str,
    ) -> Result<(), WorkflowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                state: self.state.as_str(),
                action,
            })
        }
    }

    /// Member mutations are valid while reviewing and while collecting
    /// org-info; the latter keeps typed signer input alive through late
    /// roster corrections.
    fn require_session_stage(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::ReviewingRoster | WorkflowState::CollectingOrgInfo => Ok(()),
            _ => Err(WorkflowError::InvalidTransition {
                state: self.state.as_str(),
                action,
            }),
        }
    }

    /// Replace the working snapshot and, when signer collection is already
    /// underway, re-reconcile local records against it.
    fn apply_snapshot(&mut self, snapshot: RosterSession) {
        if self.state == WorkflowState::CollectingOrgInfo {
            self.org_info.reconcile(&snapshot);
        }
        self.session = Some(snapshot);
    }

    /// Fetch the latest snapshot, reconstructing one locally if the preview
    /// collaborator is unavailable. Degradation is diagnostic only, never a
    /// hard failure.
    async fn fetch_latest(&self) -> RosterSession {
        let session_id = self.session_id().unwrap_or_default().to_string();
        match self
            .service
            .fetch_preview(&session_id, &PreviewQuery::default())
            .await
        {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, session_id, "preview unavailable, reconstructing snapshot locally");
                RosterSession::fallback_snapshot(&session_id, self.session.as_ref())
            }
        }
    }

    /// Upload a roster file and enter the review stage.
    pub async fn upload_roster(
        &mut self,
        file: &RosterFile,
        cycle: Cycle,
        year: i32,
    ) -> Result<(), WorkflowError> {
        self.require(WorkflowState::UploadPending, "upload_roster")?;
        let session = self.service.upload(file, cycle, year).await?;
        info!(session_id = %session.session_id, %cycle, year, "roster session started");
        self.session = Some(session);
        self.state = WorkflowState::ReviewingRoster;
        Ok(())
    }

    /// Re-fetch the working snapshot (with local fallback).
    pub async fn refresh_roster(&mut self) -> Result<(), WorkflowError> {
        self.require_session_stage("refresh_roster")?;
        let latest = self.fetch_latest().await;
        self.apply_snapshot(latest);
        Ok(())
    }

    pub async fn add_member(&mut self, request: &AddMemberRequest) -> Result<(), WorkflowError> {
        self.require_session_stage("add_member")?;
        let session_id = self.session_id().unwrap_or_default().to_string();
        let snapshot = self.service.add_member(&session_id, request).await?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    pub async fn edit_member(
        &mut self,
        member_id: &str,
        patch: &MemberPatch,
    ) -> Result<(), WorkflowError> {
        self.require_session_stage("edit_member")?;
        let session_id = self.session_id().unwrap_or_default().to_string();
        let snapshot = self
            .service
            .edit_member(&session_id, member_id, patch)
            .await?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    pub async fn delete_member(
        &mut self,
        member_id: &str,
        request: &DeleteMemberRequest,
    ) -> Result<(), WorkflowError> {
        self.require_session_stage("delete_member")?;
        let session_id = self.session_id().unwrap_or_default().to_string();
        let snapshot = self
            .service
            .delete_member(&session_id, member_id, request)
            .await?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    /// Re-run classification over the session.
    pub async fn reprocess(&mut self, request: &ReprocessRequest) -> Result<(), WorkflowError> {
        self.require_session_stage("reprocess")?;
        let session_id = self.session_id().unwrap_or_default().to_string();
        let snapshot = self.service.reprocess(&session_id, request).await?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    pub async fn upload_logo(&mut self, logo: &RosterFile) -> Result<(), WorkflowError> {
        self.require_session_stage("upload_logo")?;
        let session_id = self.session_id().unwrap_or_default().to_string();
        self.service.upload_logo(&session_id, logo).await?;
        Ok(())
    }

    pub async fn delete_logo(&mut self) -> Result<(), WorkflowError> {
        self.require_session_stage("delete_logo")?;
        let session_id = self.session_id().unwrap_or_default().to_string();
        self.service.delete_logo(&session_id).await?;
        Ok(())
    }

    /// Leave review and start collecting organizational info.
    ///
    /// Awaits a fresh snapshot first so unit derivation never runs against
    /// data older than the last acknowledged member mutation.
    pub async fn begin_org_info(&mut self) -> Result<(), WorkflowError> {
        self.require(WorkflowState::ReviewingRoster, "begin_org_info")?;
        let latest = self.fetch_latest().await;
        self.org_info.reconcile(&latest);
        self.session = Some(latest);
        self.state = WorkflowState::CollectingOrgInfo;
        info!(units = self.org_info.units().len(), "collecting organizational info");
        Ok(())
    }

    /// Apply user input to one unit's signer record.
    pub fn edit_unit<F>(&mut self, code: &str, edit: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(&mut OrgInfo),
    {
        self.require(WorkflowState::CollectingOrgInfo, "edit_unit")?;
        edit(self.org_info.unit_mut(code));
        Ok(())
    }

    /// Apply user input to the session-level small-unit signer record.
    pub fn edit_small_unit<F>(&mut self, edit: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(&mut OrgInfo),
    {
        self.require(WorkflowState::CollectingOrgInfo, "edit_small_unit")?;
        edit(self.org_info.small_unit_mut());
        Ok(())
    }

    /// Is every required signer record complete? Always false outside the
    /// collection stage. Callers use this to gate the submit action rather
    /// than probing for `NotReady`.
    pub fn is_ready(&self) -> bool {
        self.state == WorkflowState::CollectingOrgInfo
            && self
                .session
                .as_ref()
                .is_some_and(|session| is_ready(session, &self.org_info))
    }

    /// Build the signer payload and request document generation.
    ///
    /// On failure the state stays in collection and the user may fix data
    /// or retry the identical payload; the snapshot and records are
    /// untouched.
    pub async fn submit(&mut self) -> Result<(), WorkflowError> {
        self.require(WorkflowState::CollectingOrgInfo, "submit")?;
        let Some(session) = self.session.as_ref() else {
            return Err(WorkflowError::NotReady);
        };
        if !is_ready(session, &self.org_info) {
            return Err(WorkflowError::NotReady);
        }

        let payload = build_payload(&self.org_info, session_needs_small_unit_signer(session));
        let artifact = self
            .service
            .submit_org_info(&session.session_id, &payload)
            .await?;
        info!(session_id = %session.session_id, size = artifact.len(), "document generated");
        self.artifact = Some(artifact);
        self.state = WorkflowState::Complete;
        Ok(())
    }

    /// Abandon the current session and return to the upload stage.
    /// Available from every state.
    pub fn reset(&mut self) {
        if let Some(id) = self.session_id() {
            info!(session_id = %id, "session reset");
        }
        self.state = WorkflowState::UploadPending;
        self.session = None;
        self.org_info.clear();
        self.artifact = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{
        GenerationError, MutationError, PreviewError, UploadError, WorkflowError,
    };
    use crate::payload::SignerPayload;
    use crate::session::{RosterCategories, RosterMember};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Minimal canned-response double for state gating tests; the full
    /// scenario mock lives in the integration suite.
    struct StubService {
        session: RosterSession,
        preview_available: bool,
    }

    impl StubService {
        fn with_session(session: RosterSession) -> Self {
            Self {
                session,
                preview_available: true,
            }
        }
    }

    #[async_trait]
    impl RosterService for StubService {
        async fn upload(
            &self,
            _file: &RosterFile,
            cycle: Cycle,
            year: i32,
        ) -> Result<RosterSession, UploadError> {
            let mut session = self.session.clone();
            session.cycle = cycle;
            session.year = year;
            Ok(session)
        }

        async fn fetch_preview(
            &self,
            _session_id: &str,
            _query: &PreviewQuery,
        ) -> Result<RosterSession, PreviewError> {
            if self.preview_available {
                Ok(self.session.clone())
            } else {
                Err(PreviewError::Unavailable("503 Service Unavailable".into()))
            }
        }

        async fn add_member(
            &self,
            _session_id: &str,
            _request: &AddMemberRequest,
        ) -> Result<RosterSession, MutationError> {
            Ok(self.session.clone())
        }

        async fn edit_member(
            &self,
            _session_id: &str,
            _member_id: &str,
            _patch: &MemberPatch,
        ) -> Result<RosterSession, MutationError> {
            Ok(self.session.clone())
        }

        async fn delete_member(
            &self,
            _session_id: &str,
            _member_id: &str,
            _request: &DeleteMemberRequest,
        ) -> Result<RosterSession, MutationError> {
            Ok(self.session.clone())
        }

        async fn reprocess(
            &self,
            _session_id: &str,
            _request: &ReprocessRequest,
        ) -> Result<RosterSession, MutationError> {
            Ok(self.session.clone())
        }

        async fn submit_org_info(
            &self,
            _session_id: &str,
            _payload: &HashMap<String, SignerPayload>,
        ) -> Result<Vec<u8>, GenerationError> {
            Ok(b"%PDF-stub".to_vec())
        }

        async fn upload_logo(
            &self,
            _session_id: &str,
            _logo: &RosterFile,
        ) -> Result<(), MutationError> {
            Ok(())
        }

        async fn delete_logo(&self, _session_id: &str) -> Result<(), MutationError> {
            Ok(())
        }
    }

    fn one_unit_session() -> RosterSession {
        RosterSession {
            session_id: "s-1".into(),
            cycle: Cycle::Ssg,
            year: 2026,
            categories: RosterCategories {
                eligible: vec![RosterMember::new("m1", "ABLE", "ABC", "1st Sq")],
                ..RosterCategories::default()
            },
            ..RosterSession::default()
        }
    }

    fn roster_file() -> RosterFile {
        RosterFile::new("roster.csv", b"FULL_NAME,GRADE\n".to_vec())
    }

    #[tokio::test]
    async fn starts_in_upload_pending_with_no_session() {
        let workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        assert_eq!(workflow.state(), WorkflowState::UploadPending);
        assert!(workflow.session().is_none());
        assert!(!workflow.is_ready());
    }

    #[tokio::test]
    async fn upload_enters_review_stage() {
        let mut workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        workflow
            .upload_roster(&roster_file(), Cycle::Ssg, 2026)
            .await
            .unwrap();
        assert_eq!(workflow.state(), WorkflowState::ReviewingRoster);
        assert_eq!(workflow.session_id(), Some("s-1"));
    }

    #[tokio::test]
    async fn member_mutation_before_upload_is_an_invalid_transition() {
        let mut workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        let err = workflow
            .edit_member("m1", &MemberPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn begin_org_info_reconciles_derived_units() {
        let mut workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        workflow
            .upload_roster(&roster_file(), Cycle::Ssg, 2026)
            .await
            .unwrap();
        workflow.begin_org_info().await.unwrap();
        assert_eq!(workflow.state(), WorkflowState::CollectingOrgInfo);
        assert!(workflow.org_info().unit("ABC").is_some());
        assert_eq!(workflow.derived_units().codes, vec!["ABC"]);
    }

    #[tokio::test]
    async fn preview_outage_falls_back_to_local_snapshot() {
        let mut service = StubService::with_session(one_unit_session());
        service.preview_available = false;
        let mut workflow = MelWorkflow::new(service);
        workflow
            .upload_roster(&roster_file(), Cycle::Ssg, 2026)
            .await
            .unwrap();
        workflow.begin_org_info().await.unwrap();

        // The degraded snapshot carries the locally known member data, so
        // the derived unit universe is unchanged.
        assert_eq!(workflow.state(), WorkflowState::CollectingOrgInfo);
        let session = workflow.session().unwrap();
        assert_eq!(session.session_id, "s-1");
        assert_eq!(workflow.derived_units().codes, vec!["ABC"]);
        assert!(workflow.org_info().unit("ABC").is_some());
    }

    #[tokio::test]
    async fn submit_while_not_ready_is_rejected_locally() {
        let mut workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        workflow
            .upload_roster(&roster_file(), Cycle::Ssg, 2026)
            .await
            .unwrap();
        workflow.begin_org_info().await.unwrap();

        let err = workflow.submit().await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotReady));
        assert_eq!(workflow.state(), WorkflowState::CollectingOrgInfo);
    }

    #[tokio::test]
    async fn full_pass_generates_artifact_and_reset_clears_everything() {
        let mut workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        workflow
            .upload_roster(&roster_file(), Cycle::Ssg, 2026)
            .await
            .unwrap();
        workflow.begin_org_info().await.unwrap();
        workflow
            .edit_unit("ABC", |info| {
                info.srid = "1234567".into();
                info.commander_first_name = "Jane".into();
                info.commander_last_name = "Doe".into();
            })
            .unwrap();
        assert!(workflow.is_ready());

        workflow.submit().await.unwrap();
        assert_eq!(workflow.state(), WorkflowState::Complete);
        assert_eq!(workflow.artifact(), Some(b"%PDF-stub".as_slice()));

        workflow.reset();
        assert_eq!(workflow.state(), WorkflowState::UploadPending);
        assert!(workflow.session().is_none());
        assert!(workflow.artifact().is_none());
        assert!(workflow.org_info().units().is_empty());
    }

    #[tokio::test]
    async fn edit_unit_outside_collection_stage_is_rejected() {
        let mut workflow = MelWorkflow::new(StubService::with_session(one_unit_session()));
        let err = workflow.edit_unit("ABC", |_| {}).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }
}
