//! Pre-built Test Fixtures
//!
//! Consistent, predictable test data for the claims workflow. The standard
//! lecturer is `a@x.com` with an authorized rate of 500.

use std::sync::Arc;

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_claims::ports::mock::{InMemoryClaimRepository, InMemoryDocumentStore};
use domain_claims::{Caller, ClaimService, Lecturer};

/// Fixture for lecturer records
pub struct LecturerFixtures;

impl LecturerFixtures {
    /// Standard lecturer with an authorized rate of 500
    pub fn standard() -> Lecturer {
        Lecturer::new(
            StringFixtures::lecturer_email(),
            "Ada Lovelace",
            DecimalFixtures::authorized_rate(),
            StringFixtures::phone(),
        )
    }

    /// A second lecturer with a different rate
    pub fn other() -> Lecturer {
        Lecturer::new("b@x.com", "Brian Kernighan", dec!(350), "0820000001")
    }

    /// A lecturer with generated name and email
    pub fn random(hourly_rate: Decimal) -> Lecturer {
        Lecturer::new(
            SafeEmail().fake::<String>(),
            Name().fake::<String>(),
            hourly_rate,
            PhoneNumber().fake::<String>(),
        )
    }
}

/// Fixture for callers in each role
pub struct CallerFixtures;

impl CallerFixtures {
    /// The standard lecturer acting on their own claims
    pub fn lecturer() -> Caller {
        Caller::lecturer(StringFixtures::lecturer_email())
    }

    pub fn other_lecturer() -> Caller {
        Caller::lecturer("b@x.com")
    }

    pub fn coordinator() -> Caller {
        Caller::coordinator(StringFixtures::coordinator_email())
    }

    pub fn manager() -> Caller {
        Caller::manager(StringFixtures::manager_email())
    }
}

/// Fixture for decimal test data
pub struct DecimalFixtures;

impl DecimalFixtures {
    /// Authorized rate of the standard lecturer
    pub fn authorized_rate() -> Decimal {
        dec!(500)
    }

    /// A rate that does not match the standard lecturer's
    pub fn mismatched_rate() -> Decimal {
        dec!(999)
    }

    /// Standard hours worked
    pub fn hours() -> Decimal {
        dec!(10)
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn lecturer_email() -> &'static str {
        "a@x.com"
    }

    pub fn coordinator_email() -> &'static str {
        "coordinator@x.com"
    }

    pub fn manager_email() -> &'static str {
        "manager@x.com"
    }

    pub fn phone() -> &'static str {
        "0820000000"
    }

    pub fn verify_note() -> &'static str {
        "Good work"
    }

    pub fn reject_note() -> &'static str {
        "Missing proof"
    }
}

/// A `ClaimService` over in-memory adapters, with handles to both adapters
pub struct InMemoryServiceFixture {
    pub service: Arc<ClaimService>,
    pub repository: InMemoryClaimRepository,
    pub documents: InMemoryDocumentStore,
}

impl InMemoryServiceFixture {
    /// Wires a service whose repository knows the standard and other lecturers
    pub async fn new() -> Self {
        Self::with_lecturers([LecturerFixtures::standard(), LecturerFixtures::other()]).await
    }

    /// Wires a service whose repository knows `lecturers`
    pub async fn with_lecturers(lecturers: impl IntoIterator<Item = Lecturer>) -> Self {
        let repository = InMemoryClaimRepository::with_lecturers(lecturers).await;
        let documents = InMemoryDocumentStore::new();
        let service = Arc::new(ClaimService::new(
            Arc::new(repository.clone()),
            Arc::new(documents.clone()),
        ));

        Self {
            service,
            repository,
            documents,
        }
    }
}
