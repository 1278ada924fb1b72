//! Wire model for the `/get_info` response.
//! Keep this module minimal and stable — it defines the expected JSON shape.

use serde::{Deserialize, Serialize};

/// Full snapshot returned by a monitored host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub system: SystemInfo,
    pub memory: MemoryInfo,
    #[serde(default)]
    pub disks: Vec<DiskInfo>,
    #[serde(default)]
    pub components: Vec<ComponentInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub name: String,
    pub kernel_version: String,
    pub os_version: String,
    pub host_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_ram_gb: f64,
    pub total_ram_mb: f64,
    pub used_ram_gb: f64,
    pub used_ram_mb: f64,
    pub ram_percent: f64,
    pub total_swap_gb: f64,
    pub total_swap_mb: f64,
    pub used_swap_gb: f64,
    pub used_swap_mb: f64,
    pub swap_percent: f64,
}

/// One mounted disk. Name and mount point are not guaranteed by every agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mount_point: Option<String>,
    #[serde(default)]
    pub available_space_gb: f64,
    #[serde(default)]
    pub available_space_mb: f64,
    #[serde(default)]
    pub total_space_gb: f64,
    #[serde(default)]
    pub total_space_mb: f64,
}

/// One temperature sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl HostSnapshot {
    /// Placeholder snapshot stored when a host is registered, before the
    /// first successful poll overwrites it.
    pub fn zeroed() -> Self {
        Self {
            system: SystemInfo {
                name: String::new(),
                kernel_version: String::new(),
                os_version: String::new(),
                host_name: String::new(),
            },
            memory: MemoryInfo {
                total_ram_gb: 0.0,
                total_ram_mb: 0.0,
                used_ram_gb: 0.0,
                used_ram_mb: 0.0,
                ram_percent: 0.0,
                total_swap_gb: 0.0,
                total_swap_mb: 0.0,
                used_swap_gb: 0.0,
                used_swap_mb: 0.0,
                swap_percent: 0.0,
            },
            disks: Vec::new(),
            components: Vec::new(),
        }
    }
}
