use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dispatch priority class. Each variant owns a disjoint ready-index key
/// and an independent poll cadence (see `config::DispatchConfig`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Ready-index key for this priority, e.g. `job_HIGH`.
    pub fn index_key(&self) -> &'static str {
        match self {
            Priority::High => "job_HIGH",
            Priority::Medium => "job_MEDIUM",
            Priority::Low => "job_LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Job type, used both as the durable record's `type` column and as the
/// dispatcher's handler-registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Email,
    Message,
    Webhook,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Email => "Email",
            JobType::Message => "Message",
            JobType::Webhook => "Webhook",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Email" => Ok(JobType::Email),
            "Message" => Ok(JobType::Message),
            "Webhook" => Ok(JobType::Webhook),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Status of the durable job record, mirrored opportunistically from the
/// dispatch pipeline's view of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    None,
    Queued,
    Progress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::None => "none",
            JobStatus::Queued => "queued",
            JobStatus::Progress => "progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(JobStatus::None),
            "queued" => Ok(JobStatus::Queued),
            "progress" => Ok(JobStatus::Progress),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// The payload carried by a `DispatchRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub data: String,
    pub message: String,
}

/// The self-describing blob stored as a ready-index member. Its serialized
/// form (see `DispatchRecord::to_blob`/`from_blob`) is also its identity
/// within the index: two records with different `retries` are distinct
/// members, by design (§3 of the governing design document).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub job_id: i64,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub payload: Payload,
    pub execution_at: DateTime<Utc>,
    pub priority: Priority,
    #[serde(default)]
    pub retries: u32,
}

impl DispatchRecord {
    pub fn new(
        job_id: i64,
        job_type: JobType,
        payload: Payload,
        execution_at: DateTime<Utc>,
        priority: Priority,
    ) -> Self {
        Self {
            job_id,
            job_type,
            payload,
            execution_at,
            priority,
            retries: 0,
        }
    }

    /// Serialize to the wire blob stored in the ready index.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a ready-index member back into a record.
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    /// Score used to insert/rank this record in its priority's ready index:
    /// execution_at as epoch seconds.
    pub fn score(&self) -> f64 {
        self.execution_at.timestamp() as f64
    }
}
