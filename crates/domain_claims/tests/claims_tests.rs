//! Comprehensive tests for domain_claims

use rust_decimal_macros::dec;

use domain_claims::claim::ClaimStatus;
use domain_claims::lecturer::Lecturer;
use domain_claims::lifecycle::{self, ClaimSubmission, Command, AUTO_REJECTED_MARKER};
use domain_claims::rate;
use domain_claims::role::{authorize, Action, Role};
use domain_claims::ClaimError;

fn lecturer() -> Lecturer {
    Lecturer::new("a@x.com", "Ada Lovelace", dec!(500), "0820000000")
}

// ============================================================================
// Rate Validation Tests
// ============================================================================

mod rate_tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let check = rate::validate(dec!(500), dec!(500)).unwrap();
        assert!(check.matched);
        assert_eq!(check.corrected_rate, dec!(500));
    }

    #[test]
    fn test_trailing_zeros_still_match() {
        assert!(rate::validate(dec!(500.00), dec!(500)).unwrap().matched);
    }

    #[test]
    fn test_one_cent_off_is_a_mismatch() {
        let check = rate::validate(dec!(500.01), dec!(500)).unwrap();
        assert!(!check.matched);
        assert_eq!(check.submitted_rate, dec!(500.01));
        assert_eq!(check.corrected_rate, dec!(500));
    }

    #[test]
    fn test_zero_rates_are_allowed() {
        assert!(rate::validate(dec!(0), dec!(0)).unwrap().matched);
    }

    #[test]
    fn test_negative_rates_are_invalid() {
        assert!(matches!(rate::validate(dec!(-1), dec!(500)), Err(ClaimError::InvalidInput(_))));
        assert!(matches!(rate::validate(dec!(500), dec!(-1)), Err(ClaimError::InvalidInput(_))));
    }
}

// ============================================================================
// Role Gate Tests
// ============================================================================

mod role_tests {
    use super::*;

    #[test]
    fn test_lecturer_only_submits() {
        assert!(authorize(Role::Lecturer, Action::Submit));
        assert!(!authorize(Role::Lecturer, Action::Verify));
        assert!(!authorize(Role::Lecturer, Action::Approve));
        assert!(!authorize(Role::Lecturer, Action::Reject));
    }

    #[test]
    fn test_coordinator_verifies_and_rejects() {
        assert!(authorize(Role::Coordinator, Action::Verify));
        assert!(authorize(Role::Coordinator, Action::Reject));
        assert!(!authorize(Role::Coordinator, Action::Approve));
        assert!(!authorize(Role::Coordinator, Action::Submit));
    }

    #[test]
    fn test_manager_approves_and_rejects() {
        assert!(authorize(Role::Manager, Action::Approve));
        assert!(authorize(Role::Manager, Action::Reject));
        assert!(!authorize(Role::Manager, Action::Verify));
        assert!(!authorize(Role::Manager, Action::Submit));
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_submission_then_full_approval() {
        let decision = lifecycle::submit(
            &lecturer(),
            ClaimSubmission::new(dec!(12.5), dec!(500)).with_notes("Week 3 tutorials"),
        )
        .unwrap();
        let claim = decision.claim;
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.notes.as_deref(), Some("Week 3 tutorials"));
        assert_eq!(claim.total_amount(), dec!(6250));

        let verified = lifecycle::apply(&claim, Command::Verify { note: Some("Checked".into()) }).unwrap();
        let approved = lifecycle::apply(&verified, Command::Approve).unwrap();

        assert_eq!(approved.status, ClaimStatus::Approved);
        assert_eq!(approved.coordinator_notes.as_deref(), Some("Checked"));
        assert_eq!(approved.id, claim.id);
    }

    #[test]
    fn test_auto_rejected_claim_is_terminal() {
        let claim = lifecycle::submit(&lecturer(), ClaimSubmission::new(dec!(10), dec!(999)))
            .unwrap()
            .claim;

        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert!(claim.coordinator_notes.as_deref().unwrap().starts_with(AUTO_REJECTED_MARKER));

        for command in [
            Command::Verify { note: None },
            Command::Approve,
            Command::Reject { note: "again".into() },
        ] {
            let err = lifecycle::apply(&claim, command).unwrap_err();
            assert!(matches!(err, ClaimError::InvalidTransition { from: ClaimStatus::Rejected, .. }));
        }
    }

    #[test]
    fn test_human_rejection_is_not_auto_rejection() {
        let claim = lifecycle::submit(&lecturer(), ClaimSubmission::new(dec!(1), dec!(500)))
            .unwrap()
            .claim;

        let rejected = lifecycle::apply(&claim, Command::Reject { note: String::new() }).unwrap();

        assert_eq!(rejected.status, ClaimStatus::Rejected);
        assert_eq!(rejected.coordinator_notes.as_deref(), Some(""));
        assert!(!rejected.is_auto_rejected());
    }

    #[test]
    fn test_forged_marker_is_refused_in_any_case() {
        for note in ["AUTO-REJECTED", "Auto-Rejected: rate", "was auto-rejected"] {
            let command = Command::Reject { note: note.to_string() };
            assert!(matches!(command.validate(), Err(ClaimError::InvalidInput(_))), "{}", note);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use std::sync::Arc;

    use proptest::prelude::*;

    use domain_claims::ports::mock::{InMemoryClaimRepository, InMemoryDocumentStore};
    use domain_claims::role::{ensure_authorized, Caller};
    use domain_claims::{Claim, ClaimRepository, ClaimService};
    use test_utils::{
        action_strategy, assert_auto_rejected, assert_claim_unchanged, assert_invalid_transition,
        assert_pending_at_rate, assert_unauthorized, command_strategy, hours_strategy,
        negative_rate_strategy, rate_strategy, role_strategy, status_strategy,
        unknown_role_name_strategy, CallerFixtures, LecturerFixtures, TestClaimBuilder,
    };

    /// The permission table, written out independently of `authorize`
    fn permitted(role: Role, action: Action) -> bool {
        match action {
            Action::Submit => role == Role::Lecturer,
            Action::Verify => role == Role::Coordinator,
            Action::Approve => role == Role::Manager,
            Action::Reject => role != Role::Lecturer,
            Action::View => true,
        }
    }

    /// The lifecycle edges a human command may take
    fn allowed_edge(from: ClaimStatus, command: &Command) -> bool {
        matches!(
            (from, command),
            (ClaimStatus::Pending, Command::Verify { .. })
                | (ClaimStatus::Pending, Command::Reject { .. })
                | (ClaimStatus::Verified, Command::Approve)
                | (ClaimStatus::Verified, Command::Reject { .. })
        )
    }

    fn decider_for(command: &Command) -> Caller {
        match command {
            Command::Approve => CallerFixtures::manager(),
            Command::Verify { .. } | Command::Reject { .. } => CallerFixtures::coordinator(),
        }
    }

    async fn run(service: &ClaimService, caller: &Caller, claim: &Claim, command: Command) -> Result<Claim, ClaimError> {
        match command {
            Command::Verify { note } => service.verify_claim(caller, claim.id, note).await,
            Command::Approve => service.approve_claim(caller, claim.id).await,
            Command::Reject { note } => service.reject_claim(caller, claim.id, note).await,
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn rate_matches_only_on_exact_equality(submitted in rate_strategy(), authorized in rate_strategy()) {
            let check = rate::validate(submitted, authorized).unwrap();
            prop_assert_eq!(check.matched, submitted == authorized);
            prop_assert_eq!(check.corrected_rate, authorized);
            prop_assert_eq!(check.submitted_rate, submitted);
        }

        #[test]
        fn negative_rates_never_validate(negative in negative_rate_strategy(), rate in rate_strategy()) {
            prop_assert!(rate::validate(negative, rate).is_err());
            prop_assert!(rate::validate(rate, negative).is_err());
        }

        #[test]
        fn submission_stores_the_authorized_rate(
            hours in hours_strategy(),
            authorized in rate_strategy(),
            submitted in rate_strategy(),
        ) {
            let lecturer = LecturerFixtures::random(authorized);
            let claim = lifecycle::submit(&lecturer, ClaimSubmission::new(hours, submitted))
                .unwrap()
                .claim;

            if submitted == authorized {
                assert_pending_at_rate(&claim, authorized);
            } else {
                assert_auto_rejected(&claim, authorized);
            }
            prop_assert!(claim.lecturer_id.eq_ignore_ascii_case(&lecturer.email));
        }

        #[test]
        fn role_gate_follows_the_table(role in role_strategy(), action in action_strategy()) {
            prop_assert_eq!(authorize(role, action), permitted(role, action));

            let result = ensure_authorized(&Caller::new("someone@x.com", role), action);
            if permitted(role, action) {
                prop_assert!(result.is_ok());
            } else {
                assert_unauthorized(&result, role, action);
            }
        }

        #[test]
        fn unknown_role_names_never_parse(name in unknown_role_name_strategy()) {
            prop_assert!(name.parse::<Role>().is_err());
        }

        #[test]
        fn engine_moves_only_along_allowed_edges(status in status_strategy(), command in command_strategy()) {
            let claim = TestClaimBuilder::new().with_status(status).build();
            let result = lifecycle::apply(&claim, command.clone());

            if allowed_edge(status, &command) {
                let next = result.unwrap();
                prop_assert_eq!(next.status, command.target());
                prop_assert_eq!(next.version, claim.version);
                prop_assert_eq!(next.hourly_rate, claim.hourly_rate);
            } else {
                assert_invalid_transition(&result, status);
            }
        }

        #[test]
        fn refused_transitions_leave_the_stored_claim_unchanged(
            status in status_strategy(),
            command in command_strategy(),
        ) {
            let allowed = allowed_edge(status, &command);
            let target = command.target();

            runtime().block_on(async {
                let repository = InMemoryClaimRepository::new();
                let service = ClaimService::new(
                    Arc::new(repository.clone()),
                    Arc::new(InMemoryDocumentStore::new()),
                );
                let before = TestClaimBuilder::new().with_status(status).build();
                repository.create_claim(&before, None).await.unwrap();

                let caller = decider_for(&command);
                let result = run(&service, &caller, &before, command).await;
                let after = repository.find_claim(before.id).await.unwrap();

                if allowed {
                    let updated = result.unwrap();
                    assert_eq!(updated.status, target);
                    assert_eq!(after.status, target);
                    assert_eq!(after.version, before.version + 1);
                } else {
                    assert_invalid_transition(&result, status);
                    assert_claim_unchanged(&before, &after);
                }
            });
        }
    }
}
