//! Lecturer Claims Domain
//!
//! This crate implements the lecturer work-claim workflow: submission with
//! hourly-rate validation, coordinator verification, and manager approval.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submit -> Pending -> Verified -> Approved
//!              |           |
//!              +-----------+--> Rejected
//! ```
//!
//! A submission whose rate does not match the lecturer's authorized rate
//! lands directly in `Rejected`, tagged as auto-rejected.

pub mod claim;
pub mod lecturer;
pub mod document;
pub mod rate;
pub mod role;
pub mod lifecycle;
pub mod ports;
pub mod service;
pub mod error;

pub use claim::{Claim, ClaimStatus};
pub use lecturer::Lecturer;
pub use document::{Document, DocumentUpload};
pub use rate::RateCheck;
pub use role::{Action, Caller, Role};
pub use lifecycle::{ClaimSubmission, Command, AUTO_REJECTED_MARKER};
pub use ports::{ClaimQuery, ClaimRepository, DocumentStore};
pub use service::{ClaimService, SubmissionReceipt};
pub use error::ClaimError;
