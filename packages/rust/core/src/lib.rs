//! Report pipeline orchestration for Gateway Report.
//!
//! This crate ties together the analytics client, HTML rendering, and mail
//! delivery into one invocation (`run_scheduled`), and provides the serialized
//! interval loop used by the daemon mode.

pub mod pipeline;
pub mod schedule;
