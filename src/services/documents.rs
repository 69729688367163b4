//! Deposit document generation collaborator.
//!
//! The document service is external: given the deposit data it renders the
//! deposit slip and a QR code, and hands back their URLs. This module only
//! holds the HTTP client for it, behind a trait so tests can substitute it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::DocumentsConfig,
    error::{AppError, AppResult},
};

/// Payload sent to the document generator
#[derive(Debug, Clone, Serialize)]
pub struct DepositDocumentRequest {
    pub intervention_id: i32,
    pub reference: String,
    pub client_id: i32,
    pub photos: Vec<String>,
    pub accessories: Vec<String>,
}

/// URLs returned by the document generator
#[derive(Debug, Clone, Deserialize)]
pub struct DepositDocument {
    pub document_url: String,
    pub qr_code_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Render the deposit document and QR code for an intervention
    async fn generate(&self, request: &DepositDocumentRequest) -> AppResult<DepositDocument>;
}

/// HTTP client for the document generator collaborator
pub struct HttpDocumentGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentGenerator {
    pub fn new(config: &DocumentsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentGenerator for HttpDocumentGenerator {
    async fn generate(&self, request: &DepositDocumentRequest) -> AppResult<DepositDocument> {
        let url = format!("{}/documents/deposit", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::DocumentGeneration(format!("Document service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DocumentGeneration(format!(
                "Document service returned {}",
                response.status()
            )));
        }

        response
            .json::<DepositDocument>()
            .await
            .map_err(|e| AppError::DocumentGeneration(format!("Invalid document service response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_payload_shape() {
        let request = DepositDocumentRequest {
            intervention_id: 12,
            reference: "INT-000012".to_string(),
            client_id: 3,
            photos: vec!["intake-1.jpg".to_string()],
            accessories: vec!["Notice".to_string()],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["intervention_id"], 12);
        assert_eq!(value["reference"], "INT-000012");
        assert_eq!(value["photos"][0], "intake-1.jpg");
        assert_eq!(value["accessories"][0], "Notice");
    }

    #[tokio::test]
    async fn test_generator_failure_is_a_typed_error() {
        let mut generator = MockDocumentGenerator::new();
        generator.expect_generate().returning(|_| {
            Err(AppError::DocumentGeneration("connection refused".to_string()))
        });

        let generator: &dyn DocumentGenerator = &generator;
        let request = DepositDocumentRequest {
            intervention_id: 1,
            reference: "INT-000001".to_string(),
            client_id: 1,
            photos: Vec::new(),
            accessories: Vec::new(),
        };
        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, AppError::DocumentGeneration(_)));
    }
}
