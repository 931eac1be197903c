pub mod client;
pub mod types;

pub use client::CtClient;
pub use types::{extract_hosts, CrtShRow};
