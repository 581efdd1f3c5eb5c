//! Submission collaborators.
//!
//! The wizard hands a [`SubmissionPayload`] to a [`CaseSubmitter`] exactly
//! once per attempt and waits for the receipt.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use case_form::{Attachment, MediaKind, ValidatedCase};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use url::Url;
use uuid::Uuid;

pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the lab receives for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub case: ValidatedCase,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub reference: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl SubmissionReceipt {
    fn issued(reference: String) -> Self {
        Self {
            reference,
            submitted_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("lab rejected the case (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("could not reach the lab: {0}")]
    Transport(String),
}

#[async_trait]
pub trait CaseSubmitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError>;
}

/// Stand-in backend: waits, then accepts every case.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_DELAY)
    }
}

#[async_trait]
impl CaseSubmitter for SimulatedSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        debug!(
            delay_ms = self.delay.as_millis() as u64,
            attachments = payload.attachments.len(),
            "simulating case submission"
        );
        tokio::time::sleep(self.delay).await;
        Ok(SubmissionReceipt::issued(generate_reference()))
    }
}

/// Posts the payload as JSON, with attachment content inlined as base64.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSubmitter {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CaseSubmitter for HttpSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        let body = request_body(payload);
        debug!(endpoint = %self.endpoint, "posting case submission");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }
        let reference = response_reference(&text).unwrap_or_else(generate_reference);
        Ok(SubmissionReceipt::issued(reference))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireAttachment<'a> {
    name: &'a str,
    size_bytes: u64,
    media_kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    content_base64: String,
}

#[derive(Serialize)]
struct WireSubmission<'a> {
    case: &'a ValidatedCase,
    attachments: Vec<WireAttachment<'a>>,
}

fn request_body(payload: &SubmissionPayload) -> WireSubmission<'_> {
    WireSubmission {
        case: &payload.case,
        attachments: payload
            .attachments
            .iter()
            .map(|attachment| WireAttachment {
                name: &attachment.name,
                size_bytes: attachment.size_bytes,
                media_kind: attachment.media_kind,
                mime_type: attachment.mime_type.as_deref(),
                content_base64: STANDARD.encode(&attachment.content),
            })
            .collect(),
    }
}

fn response_reference(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("reference")
        .and_then(Value::as_str)
        .filter(|reference| !reference.trim().is_empty())
        .map(str::to_string)
}

fn generate_reference() -> String {
    Uuid::new_v4().to_string()
}
