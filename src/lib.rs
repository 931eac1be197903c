// src/lib.rs
// Library interface for recon-pilot
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod ct_log;
pub mod delta;
pub mod dns;
pub mod filter;
pub mod findings;
pub mod output;
pub mod progress;
pub mod rules;
pub mod runner;
pub mod stats;
pub mod types;
