//! HTTP sink posting motion batches to the scoring endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::capture::Batch;
use crate::{Error, Result};

/// Destination for flushed motion batches.
///
/// Implementations score a batch and return the anomaly score. Submission
/// is at-most-once: an error means the batch is gone.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Submit a batch for scoring and return the anomaly score.
    async fn submit(&self, batch: &Batch) -> Result<f64>;
}

/// Scoring response body. Only the score is of interest; `status` is
/// carried for logging.
#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(default)]
    status: i32,
    message: f64,
}

/// Sink that POSTs batches as JSON to `{base_url}/api/get_points`.
pub struct HttpSink {
    client: Client,
    base_url: String,
}

impl HttpSink {
    /// Create a sink targeting `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Sink(format!("failed to build HTTP client: {}", e)))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/get_points", self.base_url)
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn submit(&self, batch: &Batch) -> Result<f64> {
        let url = self.endpoint();
        debug!("submitting {} samples to {}", batch.len(), url);

        let response = self
            .client
            .post(&url)
            .json(batch)
            .send()
            .await
            .map_err(|e| Error::Sink(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("scoring endpoint returned {}", status);
            return Err(Error::Sink(format!(
                "scoring endpoint returned {}",
                status
            )));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| Error::Sink(format!("malformed scoring response: {}", e)))?;

        debug!("score {} (status {})", body.message, body.status);
        Ok(body.message)
    }
}

/// In-memory sink recording every submitted batch and answering with a
/// fixed score. Used by tests and the replay command's dry-run path.
pub struct MemorySink {
    score: f64,
    batches: std::sync::Mutex<Vec<Batch>>,
    fail: bool,
}

impl MemorySink {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            batches: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A sink whose every submission fails.
    pub fn failing() -> Self {
        Self {
            score: 0.0,
            batches: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Number of batches submitted so far.
    pub fn submissions(&self) -> usize {
        match self.batches.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Sample counts of each submitted batch, in submission order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        match self.batches.lock() {
            Ok(guard) => guard.iter().map(|b| b.len()).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|b| b.len()).collect(),
        }
    }
}

#[async_trait]
impl TelemetrySink for MemorySink {
    async fn submit(&self, batch: &Batch) -> Result<f64> {
        if self.fail {
            return Err(Error::Sink("memory sink configured to fail".to_string()));
        }
        match self.batches.lock() {
            Ok(mut guard) => guard.push(batch.clone()),
            Err(poisoned) => poisoned.into_inner().push(batch.clone()),
        }
        Ok(self.score)
    }
}
