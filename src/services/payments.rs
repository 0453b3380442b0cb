//! Payment gateway: order creation and signature verification.
//!
//! A payment is genuine when the client returns
//! `hex(HMAC-SHA256(key_secret, "{order_id}|{payment_id}"))` as its signature.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use super::ServiceError;
use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    /// Public key the client uses to open the payment form
    pub key_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<Order, ServiceError>;

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

pub struct HmacGateway {
    key_id: String,
    key_secret: String,
    currency: String,
}

impl HmacGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        if config.key_secret.is_empty() {
            tracing::warn!("Payment key secret is empty; signatures are trivially forgeable");
        }
        Self {
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            currency: config.currency.clone(),
        }
    }

    fn mac(&self, order_id: &str, payment_id: &str) -> Result<HmacSha256, ServiceError> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .map_err(|e| ServiceError::Provider(format!("Failed to create HMAC: {}", e)))?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(mac)
    }

    /// The signature a genuine payment for this order carries
    pub fn sign(&self, order_id: &str, payment_id: &str) -> Result<String, ServiceError> {
        Ok(hex::encode(self.mac(order_id, payment_id)?.finalize().into_bytes()))
    }
}

#[async_trait]
impl PaymentGateway for HmacGateway {
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<Order, ServiceError> {
        if amount < 0 {
            return Err(ServiceError::Invalid("Order amount cannot be negative".to_string()));
        }
        let id = format!("order_{}", hex::encode(rand::random::<[u8; 7]>()));
        tracing::info!("Created order {} for {} {}", id, amount, self.currency);
        Ok(Order {
            id,
            amount,
            currency: self.currency.clone(),
            receipt: receipt.to_string(),
            key_id: self.key_id.clone(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        match self.mac(order_id, payment_id) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(e) => {
                tracing::error!("Signature check failed to run: {}", e);
                false
            }
        }
    }
}
