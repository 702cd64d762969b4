//! Telemetry log parsing and monitoring service.
//!
//! An external sampler process emits line-oriented telemetry (CPU, GPU,
//! memory, disks, network, uptime, SMART). This crate turns those lines into
//! structured, time-addressable records through one shared grammar
//! ([`classify`]), whether the lines arrive as a live stream ([`session`],
//! [`storage`]) or as persisted report folders ([`batch`], [`reports`]), and
//! exposes the results over HTTP ([`api`]) or on the console.

pub mod api;
pub mod assemble;
pub mod batch;
pub mod classify;
pub mod config;
pub mod console;
pub mod disks;
pub mod error;
pub mod history;
pub mod metrics;
pub mod netrate;
pub mod reports;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod timestamp;
pub mod units;
