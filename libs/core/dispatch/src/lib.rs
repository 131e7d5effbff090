//! Dispatch pipeline for a priority-aware, delayed job queue: a
//! time-scored ready index, three per-priority pollers, a fan-in
//! dispatcher, a bounded worker pool, and the retry/backoff ladder that
//! re-schedules failed jobs.
//!
//! The durable store and the HTTP submission surface are collaborators of
//! this crate, not part of it (see `domain_jobs`); this crate only needs a
//! `ReadyIndex` and a `HandlerRegistry` to run, plus an optional
//! `StatusSink` if the caller wants completed/failed status opportunistically
//! mirrored back onto the durable record.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod index;
pub mod lifecycle;
pub mod metrics;
pub mod poller;
pub mod pool;
pub mod record;
pub mod registry;
pub mod retry;
pub mod status;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use index::{ReadyIndex, RedisReadyIndex};
pub use lifecycle::{CancellationToken, LifecycleState};
pub use poller::Poller;
pub use pool::WorkerPool;
pub use record::{DispatchRecord, JobStatus, JobType, Payload, Priority};
pub use registry::{Handler, HandlerRegistry};
pub use status::StatusSink;
