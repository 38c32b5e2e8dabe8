//! Assistant Gateway - HTTP gateway for conversational assistant runs
//!
//! This crate exposes a small set of HTTP endpoints that proxy an external
//! assistants API (assistants, threads, turn-based runs) next to a minimal
//! account store. Requests are normalized into a uniform value, routed by
//! exact method and path to named command handlers, and the handlers'
//! results are normalized back into HTTP responses. Long-running runs are
//! driven to completion by a bounded job-completion poller.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
