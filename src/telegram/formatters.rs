//! HTML message formatting for host snapshots
//!
//! `render` is a pure function: identical input always produces byte-identical
//! output, and nothing here touches the database or the network.

use crate::database::{HostWithMetric, Metric};
use crate::probe::types::{ComponentInfo, DiskInfo};
use crate::utils::format_last_checked;

/// Render a host and its stored metric as a Telegram HTML message.
///
/// Short mode shows the label, name, RAM/swap load and the last check time;
/// full mode adds system identity, complete memory sections and the itemized
/// disk and component lists.
pub fn render(info: &HostWithMetric, short: bool) -> String {
    if short {
        render_short(info)
    } else {
        render_full(info)
    }
}

fn render_short(info: &HostWithMetric) -> String {
    let metric = &info.metric;
    format!(
        "🖥 <b>{}:{}</b>\n\
         <b>- Name:</b> {}\n\
         <b>- RAM:</b> {:.2} %\n\
         <b>- Swap:</b> {:.2} %\n\
         <b>- Checked:</b> {}\n",
        info.host.ip,
        info.host.port,
        display_name(&info.host.name),
        metric.ram_percent,
        metric.swap_percent,
        format_last_checked(info.host.last_checked),
    )
}

fn render_full(info: &HostWithMetric) -> String {
    let metric = &info.metric;
    let mut text = format!(
        "🖥 <b>Host {}:{}</b>\n\
         <b>- Name:</b> {}\n\
         <b>- System:</b> {}\n\
         <b>- Kernel:</b> {}\n\
         <b>- OS:</b> {}\n\
         <b>- Host name:</b> {}\n\n",
        info.host.ip,
        info.host.port,
        display_name(&info.host.name),
        display_name(&metric.system_name),
        display_name(&metric.kernel_version),
        display_name(&metric.os_version),
        display_name(&metric.host_name),
    );

    text.push_str(&format_memory_section("💾 RAM", RamView::ram(metric)));
    text.push_str(&format_memory_section("🔄 Swap", RamView::swap(metric)));

    text.push_str("<b>💻 Disks:</b>\n");
    if metric.disks.is_empty() {
        text.push_str("No disk data available.\n");
    } else {
        for disk in &metric.disks {
            text.push_str(&format_disk(disk));
        }
    }

    text.push_str("\n<b>🧩 Components:</b>\n");
    if metric.components.is_empty() {
        text.push_str("No component data available.\n");
    } else {
        for component in &metric.components {
            text.push_str(&format_component(component));
        }
    }

    text.push_str(&format!(
        "\n<b>📅 Last checked:</b> {}\n",
        format_last_checked(info.host.last_checked)
    ));
    text
}

/// One memory section (RAM or swap) of the full view
struct RamView {
    total_gb: f64,
    total_mb: f64,
    used_gb: f64,
    used_mb: f64,
    percent: f64,
}

impl RamView {
    fn ram(metric: &Metric) -> Self {
        Self {
            total_gb: metric.total_ram_gb,
            total_mb: metric.total_ram_mb,
            used_gb: metric.used_ram_gb,
            used_mb: metric.used_ram_mb,
            percent: metric.ram_percent,
        }
    }

    fn swap(metric: &Metric) -> Self {
        Self {
            total_gb: metric.total_swap_gb,
            total_mb: metric.total_swap_mb,
            used_gb: metric.used_swap_gb,
            used_mb: metric.used_swap_mb,
            percent: metric.swap_percent,
        }
    }
}

fn format_memory_section(title: &str, view: RamView) -> String {
    format!(
        "<b>{}:</b>\n\
         <b>- Total:</b> {:.2} GB ({:.2} MB)\n\
         <b>- Used:</b> {:.2} GB ({:.2} MB)\n\
         <b>- Load:</b> {:.2} %\n\n",
        title, view.total_gb, view.total_mb, view.used_gb, view.used_mb, view.percent,
    )
}

fn format_disk(disk: &DiskInfo) -> String {
    format!(
        "<b>  - Disk:</b> {}\n\
         <b>    Mount point:</b> {}\n\
         <b>    Available:</b> {:.2} GB ({:.2} MB)\n\
         <b>    Total:</b> {:.2} GB ({:.2} MB)\n",
        disk.name.as_deref().unwrap_or("Unknown"),
        disk.mount_point.as_deref().unwrap_or("Not specified"),
        disk.available_space_gb,
        disk.available_space_mb,
        disk.total_space_gb,
        disk.total_space_mb,
    )
}

fn format_component(component: &ComponentInfo) -> String {
    let temperature = match component.temperature {
        Some(t) => format!("{:.2} °C", t),
        None => "N/A".to_string(),
    };
    format!(
        "<b>  - {}:</b> {}\n",
        component.label.as_deref().unwrap_or("Unknown"),
        temperature,
    )
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "Not specified"
    } else {
        name
    }
}
