//! Masking run telemetry.
//!
//! Lock-free atomic counters updated by the masking engine while it works,
//! and a plain snapshot attached to the finished run.
//!
//! # Architecture
//!
//! ```text
//! MaskingEngine workers ─────► RunMetrics ─────► RunStats ─────► Reports
//!                              (atomic counters)  (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```
//! use donutmask::telemetry::RunMetrics;
//! use std::time::Duration;
//!
//! let metrics = RunMetrics::new();
//! metrics.draw_taken();
//! metrics.point_masked();
//!
//! let stats = metrics.snapshot(Duration::from_millis(5));
//! assert_eq!(stats.points_masked, 1);
//! assert_eq!(stats.draws, 1);
//! ```

mod metrics;

pub use metrics::{RunMetrics, RunStats};
