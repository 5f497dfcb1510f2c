//! Claims application service
//!
//! Runs every request through the same pipeline:
//!
//! ```text
//! Caller + request ─▶ role gate ─▶ lifecycle engine ─▶ repository ─▶ result
//! ```
//!
//! The service owns no state beyond its injected ports, so one instance can
//! be shared by all request handlers.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{ClaimId, PortError};

use crate::claim::{Claim, ClaimStatus};
use crate::document::{Document, DocumentUpload};
use crate::error::ClaimError;
use crate::lifecycle::{self, ClaimSubmission, Command};
use crate::ports::{ClaimQuery, ClaimRepository, DocumentStore};
use crate::rate::RateCheck;
use crate::role::{ensure_authorized, Action, Caller, Role};

/// Result of a successful submission
///
/// Auto-rejection is reported here, not as an error: `claim.status` is
/// `Rejected` and `rate_check.matched` is false.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub claim: Claim,
    pub rate_check: RateCheck,
}

impl SubmissionReceipt {
    pub fn claim_id(&self) -> ClaimId {
        self.claim.id
    }

    pub fn status(&self) -> ClaimStatus {
        self.claim.status
    }

    pub fn is_auto_rejected(&self) -> bool {
        !self.rate_check.matched
    }
}

/// Application service for the claim workflow
#[derive(Clone)]
pub struct ClaimService {
    repository: Arc<dyn ClaimRepository>,
    documents: Arc<dyn DocumentStore>,
}

impl ClaimService {
    /// Creates a service over the given ports
    pub fn new(repository: Arc<dyn ClaimRepository>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            repository,
            documents,
        }
    }

    /// Returns the repository port, for health checks
    pub fn repository(&self) -> &Arc<dyn ClaimRepository> {
        &self.repository
    }

    /// Returns the document store port, for health checks
    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.documents
    }

    /// Submits a new claim on behalf of the calling lecturer
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller is a lecturer
    /// - `LecturerNotFound` if the caller has no lecturer record
    /// - `InvalidInput` for negative hours or rate
    #[instrument(skip(self, caller, submission, document), fields(lecturer = %caller.identity))]
    pub async fn submit_claim(
        &self,
        caller: &Caller,
        submission: ClaimSubmission,
        document: Option<DocumentUpload>,
    ) -> Result<SubmissionReceipt, ClaimError> {
        ensure_authorized(caller, Action::Submit)?;

        let lecturer = self
            .repository
            .find_lecturer(&caller.identity)
            .await
            .map_err(|e| not_found_as(e, || ClaimError::LecturerNotFound(caller.identity.clone())))?;

        let mut decision = lifecycle::submit(&lecturer, submission)?;

        let record = match document {
            Some(upload) => {
                let reference = self
                    .documents
                    .store(upload.content, &upload.file_name)
                    .await
                    .map_err(ClaimError::Storage)?;
                decision = decision.with_document_ref(reference.clone());
                Some(Document::new(decision.claim.id, upload.file_name, reference))
            }
            None => None,
        };

        let claim_id = self
            .repository
            .create_claim(&decision.claim, record.as_ref())
            .await
            .map_err(|e| repository_error(e, decision.claim.id))?;

        if decision.is_auto_rejected() {
            info!(
                claim_id = %claim_id,
                submitted_rate = %decision.rate_check.submitted_rate,
                authorized_rate = %decision.rate_check.corrected_rate,
                "Claim auto-rejected on rate mismatch"
            );
        } else {
            info!(claim_id = %claim_id, "Claim submitted");
        }

        Ok(SubmissionReceipt {
            claim: decision.claim,
            rate_check: decision.rate_check,
        })
    }

    /// Verifies a pending claim, replacing its coordinator notes with `note`
    pub async fn verify_claim(
        &self,
        caller: &Caller,
        id: ClaimId,
        note: Option<String>,
    ) -> Result<Claim, ClaimError> {
        self.transition(caller, id, Command::Verify { note }).await
    }

    /// Approves a verified claim
    pub async fn approve_claim(&self, caller: &Caller, id: ClaimId) -> Result<Claim, ClaimError> {
        self.transition(caller, id, Command::Approve).await
    }

    /// Rejects a pending or verified claim with a human-authored note
    pub async fn reject_claim(
        &self,
        caller: &Caller,
        id: ClaimId,
        note: impl Into<String>,
    ) -> Result<Claim, ClaimError> {
        self.transition(caller, id, Command::Reject { note: note.into() }).await
    }

    /// Runs one human transition: gate, validate, read, decide, write
    #[instrument(skip(self, caller, command), fields(claim_id = %id, caller = %caller.identity, action = %command.action()))]
    async fn transition(&self, caller: &Caller, id: ClaimId, command: Command) -> Result<Claim, ClaimError> {
        ensure_authorized(caller, command.action())?;
        command.validate()?;

        let current = self
            .repository
            .find_claim(id)
            .await
            .map_err(|e| repository_error(e, id))?;

        let next = lifecycle::apply(&current, command).map_err(|e| {
            warn!(status = %current.status, error = %e, "Transition refused");
            e
        })?;

        let stored = self
            .repository
            .update_claim(&next)
            .await
            .map_err(|e| repository_error(e, id))?;

        info!(from = %current.status, to = %stored.status, "Claim transitioned");
        Ok(stored)
    }

    /// Retrieves a claim; lecturers may only see their own
    #[instrument(skip(self, caller), fields(claim_id = %id, caller = %caller.identity))]
    pub async fn get_claim(&self, caller: &Caller, id: ClaimId) -> Result<Claim, ClaimError> {
        ensure_authorized(caller, Action::View)?;

        let claim = self
            .repository
            .find_claim(id)
            .await
            .map_err(|e| repository_error(e, id))?;

        ensure_visible(caller, &claim)?;
        Ok(claim)
    }

    /// Lists claims visible to the caller, optionally filtered by status
    ///
    /// Lecturers see their own claims; coordinators and managers see all.
    #[instrument(skip(self, caller), fields(caller = %caller.identity))]
    pub async fn list_claims(
        &self,
        caller: &Caller,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, ClaimError> {
        ensure_authorized(caller, Action::View)?;

        let query = match caller.role {
            Role::Lecturer => ClaimQuery::by_lecturer(caller.identity.clone()),
            Role::Coordinator | Role::Manager => ClaimQuery::default(),
        }
        .with_status(status);

        self.repository
            .list_claims(query)
            .await
            .map_err(ClaimError::Repository)
    }

    /// Retrieves the supporting document of a claim
    pub async fn get_document(&self, caller: &Caller, id: ClaimId) -> Result<Document, ClaimError> {
        let claim = self.get_claim(caller, id).await?;

        self.repository
            .find_document(claim.id)
            .await
            .map_err(|e| not_found_as(e, || ClaimError::ClaimNotFound(format!("document for {}", id))))
    }
}

fn ensure_visible(caller: &Caller, claim: &Claim) -> Result<(), ClaimError> {
    if caller.role == Role::Lecturer && !claim.lecturer_id.eq_ignore_ascii_case(&caller.identity) {
        warn!(claim_id = %claim.id, caller = %caller.identity, "Lecturer attempted to view another lecturer's claim");
        return Err(ClaimError::Unauthorized {
            role: caller.role,
            action: Action::View,
        });
    }
    Ok(())
}

fn not_found_as(error: PortError, not_found: impl FnOnce() -> ClaimError) -> ClaimError {
    if error.is_not_found() {
        not_found()
    } else {
        ClaimError::Repository(error)
    }
}

fn repository_error(error: PortError, id: ClaimId) -> ClaimError {
    match error {
        PortError::NotFound { .. } => ClaimError::ClaimNotFound(id.to_string()),
        PortError::Conflict { .. } => {
            warn!(claim_id = %id, "Lost a concurrent update");
            ClaimError::Conflict(id.to_string())
        }
        other => ClaimError::Repository(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lecturer::Lecturer;
    use crate::lifecycle::AUTO_REJECTED_MARKER;
    use crate::ports::mock::{InMemoryClaimRepository, InMemoryDocumentStore};
    use rust_decimal_macros::dec;

    const LECTURER: &str = "a@x.com";

    struct Harness {
        service: ClaimService,
        repository: InMemoryClaimRepository,
        documents: InMemoryDocumentStore,
    }

    async fn harness() -> Harness {
        let repository = InMemoryClaimRepository::with_lecturers([
            Lecturer::new(LECTURER, "Ada", dec!(500), "0820000000"),
            Lecturer::new("b@x.com", "Bob", dec!(350), "0820000001"),
        ])
        .await;
        let documents = InMemoryDocumentStore::new();
        let service = ClaimService::new(Arc::new(repository.clone()), Arc::new(documents.clone()));
        Harness {
            service,
            repository,
            documents,
        }
    }

    fn lecturer() -> Caller {
        Caller::lecturer(LECTURER)
    }

    fn coordinator() -> Caller {
        Caller::coordinator("coord@x.com")
    }

    fn manager() -> Caller {
        Caller::manager("boss@x.com")
    }

    async fn submit(h: &Harness, rate: rust_decimal::Decimal) -> Claim {
        h.service
            .submit_claim(&lecturer(), ClaimSubmission::new(dec!(10), rate), None)
            .await
            .unwrap()
            .claim
    }

    async fn stored(h: &Harness, id: ClaimId) -> Claim {
        h.repository.find_claim(id).await.unwrap()
    }

    #[tokio::test]
    async fn test_submit_with_matching_rate_is_pending() {
        let h = harness().await;

        let receipt = h
            .service
            .submit_claim(&lecturer(), ClaimSubmission::new(dec!(10), dec!(500)), None)
            .await
            .unwrap();

        assert!(!receipt.is_auto_rejected());
        let claim = stored(&h, receipt.claim_id()).await;
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.hourly_rate, dec!(500));
        assert_eq!(claim.lecturer_id, LECTURER);
        assert_eq!(claim.coordinator_notes, None);
    }

    #[tokio::test]
    async fn test_submit_with_wrong_rate_is_auto_rejected_but_succeeds() {
        let h = harness().await;

        let receipt = h
            .service
            .submit_claim(&lecturer(), ClaimSubmission::new(dec!(10), dec!(999)), None)
            .await
            .unwrap();

        assert!(receipt.is_auto_rejected());
        assert_eq!(receipt.status(), ClaimStatus::Rejected);
        let claim = stored(&h, receipt.claim_id()).await;
        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert_eq!(claim.hourly_rate, dec!(500));
        assert!(claim.coordinator_notes.unwrap().contains(AUTO_REJECTED_MARKER));
    }

    #[tokio::test]
    async fn test_submit_unknown_lecturer() {
        let h = harness().await;
        let err = h
            .service
            .submit_claim(&Caller::lecturer("ghost@x.com"), ClaimSubmission::new(dec!(1), dec!(500)), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::LecturerNotFound(ref who) if who == "ghost@x.com"));
        assert_eq!(h.repository.claim_count().await, 0);
    }

    #[tokio::test]
    async fn test_only_lecturers_submit() {
        let h = harness().await;
        for caller in [coordinator(), manager()] {
            let err = h
                .service
                .submit_claim(&caller, ClaimSubmission::new(dec!(1), dec!(500)), None)
                .await
                .unwrap_err();
            assert!(matches!(err, ClaimError::Unauthorized { action: Action::Submit, .. }));
        }
        assert_eq!(h.repository.claim_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_with_document_links_it() {
        let h = harness().await;
        let upload = DocumentUpload::new("timesheet.pdf", b"%PDF-1.7".to_vec()).unwrap();

        let receipt = h
            .service
            .submit_claim(&lecturer(), ClaimSubmission::new(dec!(3), dec!(500)), Some(upload))
            .await
            .unwrap();

        let claim = stored(&h, receipt.claim_id()).await;
        let reference = claim.document_ref.clone().unwrap();
        assert_eq!(h.documents.get(&reference).await.unwrap(), b"%PDF-1.7".to_vec());

        let document = h.service.get_document(&lecturer(), claim.id).await.unwrap();
        assert_eq!(document.file_name, "timesheet.pdf");
        assert_eq!(document.storage_url, reference);
        assert_eq!(document.claim_id, claim.id);
    }

    #[tokio::test]
    async fn test_failed_document_record_leaves_no_claim() {
        let h = harness().await;
        h.repository.fail_document_writes();
        let upload = DocumentUpload::new("timesheet.pdf", b"%PDF-1.7".to_vec()).unwrap();

        let err = h
            .service
            .submit_claim(&lecturer(), ClaimSubmission::new(dec!(3), dec!(500)), Some(upload))
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::Repository(_)));
        assert_eq!(h.repository.claim_count().await, 0);
        assert!(h.service.list_claims(&lecturer(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_submission_stores_no_document() {
        let h = harness().await;
        let upload = DocumentUpload::new("timesheet.pdf", vec![1]).unwrap();

        let err = h
            .service
            .submit_claim(&lecturer(), ClaimSubmission::new(dec!(-3), dec!(500)), Some(upload))
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidInput(_)));
        assert!(h.documents.is_empty().await);
    }

    #[tokio::test]
    async fn test_full_approval_path() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;

        let verified = h
            .service
            .verify_claim(&coordinator(), claim.id, Some("Good work".into()))
            .await
            .unwrap();
        assert_eq!(verified.status, ClaimStatus::Verified);
        assert_eq!(verified.coordinator_notes.as_deref(), Some("Good work"));

        let approved = h.service.approve_claim(&manager(), claim.id).await.unwrap();
        assert_eq!(approved.status, ClaimStatus::Approved);
        assert_eq!(approved.coordinator_notes.as_deref(), Some("Good work"));
        assert_eq!(approved.version, 3);
    }

    #[tokio::test]
    async fn test_approving_pending_claim_is_invalid_and_changes_nothing() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;

        let err = h.service.approve_claim(&manager(), claim.id).await.unwrap_err();

        assert!(matches!(err, ClaimError::InvalidTransition { from: ClaimStatus::Pending, .. }));
        assert_eq!(stored(&h, claim.id).await, claim);
    }

    #[tokio::test]
    async fn test_coordinator_rejects_pending() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;

        let rejected = h
            .service
            .reject_claim(&coordinator(), claim.id, "Missing proof")
            .await
            .unwrap();

        assert_eq!(rejected.status, ClaimStatus::Rejected);
        assert_eq!(rejected.coordinator_notes.as_deref(), Some("Missing proof"));
        assert!(!rejected.is_auto_rejected());
    }

    #[tokio::test]
    async fn test_manager_rejects_verified() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;
        h.service.verify_claim(&coordinator(), claim.id, None).await.unwrap();

        let rejected = h.service.reject_claim(&manager(), claim.id, "Over budget").await.unwrap();
        assert_eq!(rejected.status, ClaimStatus::Rejected);
    }

    #[tokio::test]
    async fn test_auto_rejected_claim_cannot_be_verified() {
        let h = harness().await;
        let claim = submit(&h, dec!(1)).await;

        let err = h.service.verify_claim(&coordinator(), claim.id, None).await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidTransition { from: ClaimStatus::Rejected, .. }));
        assert_eq!(stored(&h, claim.id).await, claim);
    }

    #[tokio::test]
    async fn test_repeated_verify_is_refused() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;
        h.service.verify_claim(&coordinator(), claim.id, Some("first".into())).await.unwrap();

        let err = h
            .service
            .verify_claim(&coordinator(), claim.id, Some("second".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidTransition { .. }));
        assert_eq!(stored(&h, claim.id).await.coordinator_notes.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_role_gate_runs_before_lookup() {
        let h = harness().await;
        let err = h.service.approve_claim(&coordinator(), ClaimId::new()).await.unwrap_err();
        assert!(matches!(err, ClaimError::Unauthorized { role: Role::Coordinator, action: Action::Approve }));
    }

    #[tokio::test]
    async fn test_unknown_claim() {
        let h = harness().await;
        let err = h.service.verify_claim(&coordinator(), ClaimId::new(), None).await.unwrap_err();
        assert!(matches!(err, ClaimError::ClaimNotFound(_)));
    }

    #[tokio::test]
    async fn test_lecturer_cannot_decide_or_peek() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;

        assert!(matches!(
            h.service.verify_claim(&lecturer(), claim.id, None).await,
            Err(ClaimError::Unauthorized { .. })
        ));
        assert!(matches!(
            h.service.reject_claim(&lecturer(), claim.id, "no").await,
            Err(ClaimError::Unauthorized { .. })
        ));
        assert!(matches!(
            h.service.get_claim(&Caller::lecturer("b@x.com"), claim.id).await,
            Err(ClaimError::Unauthorized { action: Action::View, .. })
        ));
        assert_eq!(stored(&h, claim.id).await, claim);
    }

    #[tokio::test]
    async fn test_listing_is_scoped_for_lecturers() {
        let h = harness().await;
        let mine = submit(&h, dec!(500)).await;
        h.service
            .submit_claim(&Caller::lecturer("b@x.com"), ClaimSubmission::new(dec!(2), dec!(350)), None)
            .await
            .unwrap();

        let own = h.service.list_claims(&lecturer(), None).await.unwrap();
        assert_eq!(own.iter().map(|c| c.id).collect::<Vec<_>>(), vec![mine.id]);

        let all = h.service.list_claims(&coordinator(), Some(ClaimStatus::Pending)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_verifications_have_one_winner() {
        let h = harness().await;
        let claim = submit(&h, dec!(500)).await;
        let first_coordinator = coordinator();
        let second_coordinator = Caller::coordinator("second@x.com");

        let first = h.service.verify_claim(&first_coordinator, claim.id, Some("first".into()));
        let second = h.service.verify_claim(&second_coordinator, claim.id, Some("second".into()));
        let (first, second) = tokio::join!(first, second);

        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);

        let loser = if first.is_ok() { second.unwrap_err() } else { first.unwrap_err() };
        assert!(matches!(loser, ClaimError::Conflict(_) | ClaimError::InvalidTransition { .. }));
        assert_eq!(stored(&h, claim.id).await.version, 2);
    }
}
