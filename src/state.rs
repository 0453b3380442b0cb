//! Application state shared by all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::{AnswerProvider, CertificateRenderer, MediaStore, PaymentGateway};

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection (users, catalog, progress, payments)
    pub db: DbPool,
    pub config: Arc<Config>,
    pub media: Arc<dyn MediaStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub certificates: Arc<dyn CertificateRenderer>,
    pub answers: Arc<dyn AnswerProvider>,
}

impl AppState {
    pub fn new(
        db: DbPool,
        config: Config,
        media: Arc<dyn MediaStore>,
        payments: Arc<dyn PaymentGateway>,
        certificates: Arc<dyn CertificateRenderer>,
        answers: Arc<dyn AnswerProvider>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            media,
            payments,
            certificates,
            answers,
        }
    }
}
