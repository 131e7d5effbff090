use chrono::{DateTime, Utc};
use dispatch_core::{JobStatus, JobType, Priority};
use serde::{Deserialize, Serialize};

/// The durable job record (governing design document §3). Identity is
/// `id`; the record is never deleted by the core.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: i64,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub data: String,
    pub message: String,
    pub priority: Priority,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub execution_at: DateTime<Utc>,
}

/// Request body for `POST /apis/v1/submit-job`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJobRequest {
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub payload: SubmitPayload,
    pub priority: Priority,
    /// Delay in seconds before the job becomes dispatch-ready.
    #[serde(default)]
    pub delay: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitPayload {
    pub data: String,
    pub message: String,
}

impl SubmitJobRequest {
    /// Field-level validation (governing design document §6): both
    /// `data` and `message` must be non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.payload.data.trim().is_empty() {
            return Err("payload.data must not be empty".to_string());
        }
        if self.payload.message.trim().is_empty() {
            return Err("payload.message must not be empty".to_string());
        }
        if self.delay < 0 {
            return Err("delay must not be negative".to_string());
        }
        Ok(())
    }
}

/// Query filter for `GET /apis/v1/jobs?q=<status>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub q: Option<JobStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_data_or_message() {
        let mut req = SubmitJobRequest {
            job_type: JobType::Email,
            payload: SubmitPayload {
                data: String::new(),
                message: "hi".into(),
            },
            priority: Priority::High,
            delay: 0,
        };
        assert!(req.validate().is_err());
        req.payload.data = "present".into();
        req.payload.message = "   ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_request() {
        let req = SubmitJobRequest {
            job_type: JobType::Webhook,
            payload: SubmitPayload {
                data: "https://example.com".into(),
                message: "ping".into(),
            },
            priority: Priority::Low,
            delay: 30,
        };
        assert!(req.validate().is_ok());
    }
}
