//! Transmission client for the collector ingestion endpoint.

use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;
use tracing::{info, warn};

use rwatch_models::Report;

use crate::error::TransmitError;

/// Acknowledgement envelope returned by the collector on success.
#[derive(Debug, Default, Deserialize)]
pub struct IngestAck {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// HTTP client posting reports to the collector.
pub struct ReportClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ReportClient {
    /// Create a client for the collector at `collector_url` with a bounded
    /// per-request timeout.
    pub fn new(collector_url: &str, timeout: Duration) -> Result<Self, TransmitError> {
        if !collector_url.starts_with("http://") && !collector_url.starts_with("https://") {
            return Err(TransmitError::InvalidEndpoint(collector_url.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/pothole", collector_url.trim_end_matches('/')),
        })
    }

    /// Attempt one multipart POST of the report.
    pub async fn try_send(&self, report: &Report) -> Result<IngestAck, TransmitError> {
        let image = multipart::Part::bytes(report.image.clone())
            .file_name("pothole.jpg")
            .mime_str("image/jpeg")?;

        let form = multipart::Form::new()
            .text("latitude", report.latitude.to_string())
            .text("longitude", report.longitude.to_string())
            .text("severity", report.severity.clone())
            .part("image", image);

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransmitError::Rejected {
                status: status.as_u16(),
            });
        }

        // A malformed success body is still a success; 2xx is the contract.
        Ok(response.json().await.unwrap_or_default())
    }

    /// Send a report, reporting any failure as `false` with a diagnostic.
    ///
    /// Never fatal to the caller; the capture loop leaves its cooldown
    /// untouched on `false` and simply tries again on the next eligible
    /// cycle.
    pub async fn send(&self, report: &Report) -> bool {
        match self.try_send(report).await {
            Ok(_) => {
                info!(severity = %report.severity, "Report accepted by collector");
                true
            }
            Err(e) => {
                warn!(error = %e, severity = %report.severity, "Failed to send report");
                false
            }
        }
    }
}
