//! Library crate for portprobe exposing the scan engine and its collaborators.
pub mod config;
pub mod error;
pub mod findings;
pub mod ports;
pub mod probe;
pub mod report;
pub mod scanner;
pub mod services;
pub mod target;
pub mod types;

pub use error::{Result, ScanError};
