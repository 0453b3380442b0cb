//! Certificate rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ServiceError;

/// Everything a rendered certificate shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
    pub certificate_id: String,
    pub recipient: String,
    pub course_title: String,
    pub verify_url: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RenderedCertificate {
    pub content_type: &'static str,
    pub file_name: String,
    pub body: Vec<u8>,
}

pub trait CertificateRenderer: Send + Sync {
    fn render(&self, data: &CertificateData) -> Result<RenderedCertificate, ServiceError>;
}

/// Renders the certificate as a JSON document
pub struct JsonCertificateRenderer;

impl CertificateRenderer for JsonCertificateRenderer {
    fn render(&self, data: &CertificateData) -> Result<RenderedCertificate, ServiceError> {
        let body = serde_json::to_vec_pretty(data)
            .map_err(|e| ServiceError::Provider(format!("Certificate encoding failed: {}", e)))?;
        Ok(RenderedCertificate {
            content_type: "application/json",
            file_name: format!("certificate-{}.json", data.certificate_id),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_renderer_output() {
        let data = CertificateData {
            certificate_id: "000007-000003".into(),
            recipient: "Lin Wu".into(),
            course_title: "Rust".into(),
            verify_url: "http://localhost/verify/000007-000003".into(),
            issued_at: Utc::now(),
        };
        let rendered = JsonCertificateRenderer.render(&data).unwrap();
        assert_eq!(rendered.content_type, "application/json");
        assert_eq!(rendered.file_name, "certificate-000007-000003.json");

        let json: serde_json::Value = serde_json::from_slice(&rendered.body).unwrap();
        assert_eq!(json["certificateId"], "000007-000003");
        assert_eq!(json["recipient"], "Lin Wu");
        assert_eq!(json["courseTitle"], "Rust");
    }
}
