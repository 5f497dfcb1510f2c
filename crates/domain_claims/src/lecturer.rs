//! Lecturer records consulted during submission

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A lecturer and their authorized hourly rate
///
/// Read-only from the workflow's point of view: submissions look it up
/// by email and never modify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    /// Email address, the lecturer's identity
    pub email: String,
    /// Display name
    pub name: String,
    /// Authorized hourly rate
    pub hourly_rate: Decimal,
    /// Contact phone number
    pub phone: String,
}

impl Lecturer {
    /// Creates a lecturer record
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        hourly_rate: Decimal,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            hourly_rate,
            phone: phone.into(),
        }
    }
}
