//! Capture loop and report transmission.
//!
//! This crate provides:
//! - The per-frame capture/detect/report state machine
//! - The global transmission cooldown gate
//! - The multipart transmission client for the collector
//! - Simulated GPS fixes for geotagging

pub mod client;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod gps;
pub mod runner;

pub use client::{IngestAck, ReportClient};
pub use config::CaptureConfig;
pub use cooldown::CooldownGate;
pub use error::TransmitError;
pub use gps::GpsSimulator;
pub use runner::{CaptureLoop, Command, LoopStats};
