//! Jobs Domain
//!
//! Owns the durable job record and the HTTP-facing submit/list/get
//! operations. Submitting a job both persists it and publishes a
//! `dispatch_core::DispatchRecord` into the priority-aware ready index;
//! the dispatch pipeline itself lives in `dispatch_core` and never talks
//! to this crate's repository directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Business logic, validation, ready-index publish
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + sea-orm implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Job, SubmitJobRequest, JobFilter
//! └─────────────┘
//! ```

pub mod conversions;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod status_sink;

pub use error::{JobError, JobResult};
pub use handlers::{EmailHandler, MessageHandler, WebhookHandler};
pub use models::{Job, JobFilter, SubmitJobRequest, SubmitPayload};
pub use postgres::PgJobRepository;
pub use repository::JobRepository;
pub use service::JobService;
pub use status_sink::RepositoryStatusSink;
