//! Property-Based Test Generators
//!
//! Proptest strategies for claim workflow inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::lifecycle::Command;
use domain_claims::{Action, ClaimStatus, Role};

/// Strategy for non-negative rates with up to two decimal places
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for negative rates
pub fn negative_rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy for non-negative hours with up to two decimal places
pub fn hours_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy for any role
pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Strategy for any action
pub fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

/// Strategy for any claim status
pub fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop::sample::select(ClaimStatus::ALL.to_vec())
}

/// Strategy for human-authored notes that never carry the auto-rejection marker
pub fn human_note_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,]{0,80}"
}

/// Strategy for any human transition command
pub fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        proptest::option::of(human_note_strategy()).prop_map(|note| Command::Verify { note }),
        Just(Command::Approve),
        human_note_strategy().prop_map(|note| Command::Reject { note }),
    ]
}

/// Strategy for role names that are not recognized roles
pub fn unknown_role_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_filter("must not name a real role", |name| name.parse::<Role>().is_err())
}
