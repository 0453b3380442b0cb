//! External collaborators behind traits: media storage, payment gateway,
//! certificate rendering and the FAQ answer provider.
//!
//! Each trait has one local implementation; tests swap in fakes through
//! `AppState`.

pub mod certificate;
pub mod faq;
pub mod media;
pub mod payments;

use thiserror::Error;

use crate::error::AppError;

pub use certificate::{CertificateData, CertificateRenderer, JsonCertificateRenderer, RenderedCertificate};
pub use faq::{AnswerProvider, DisabledAnswerProvider};
pub use media::{LocalMediaStore, MediaKind, MediaStore};
pub use payments::{HmacGateway, Order, PaymentGateway};

/// Errors surfaced by service adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The caller handed over something the service cannot accept
    #[error("{0}")]
    Invalid(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider error: {0}")]
    Provider(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid(msg) => AppError::bad_request(msg),
            other => AppError::internal(other.to_string()),
        }
    }
}
