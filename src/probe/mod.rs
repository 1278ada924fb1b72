//! Remote metrics probe
//!
//! One-shot HTTP client for the `/get_info` endpoint that monitored hosts
//! expose. Every failure mode is folded into [`FetchError`], whose `Display`
//! output is the exact text shown to the user in chat.

pub mod client;
pub mod types;

pub use client::{FetchError, ProbeClient};
pub use types::{ComponentInfo, DiskInfo, HostSnapshot, MemoryInfo, SystemInfo};
