use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{Database, RegistryError};
use crate::logger::{self, LogTag};
use crate::probe::types::HostSnapshot;

impl Database {
    /// Replace a host's stored metric with a fresh snapshot and stamp
    /// last_checked, all inside one transaction.
    pub fn overwrite_metrics(
        &self,
        ip: &str,
        snapshot: &HostSnapshot,
    ) -> Result<(), RegistryError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let host_id: Option<i64> = tx
            .query_row("SELECT id FROM hosts WHERE ip = ?1", params![ip], |row| {
                row.get(0)
            })
            .optional()?;
        let host_id = match host_id {
            Some(id) => id,
            None => {
                logger::warning(
                    LogTag::Db,
                    &format!("Metrics update for unregistered IP {}", ip),
                );
                return Err(RegistryError::HostNotFound { ip: ip.to_string() });
            }
        };

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "UPDATE hosts SET last_checked = ?1 WHERE id = ?2",
            params![now, host_id],
        )?;
        tx.execute(
            "UPDATE metrics SET \
                 system_name = ?1, kernel_version = ?2, os_version = ?3, host_name = ?4, \
                 total_ram_gb = ?5, total_ram_mb = ?6, used_ram_gb = ?7, used_ram_mb = ?8, \
                 ram_percent = ?9, total_swap_gb = ?10, total_swap_mb = ?11, \
                 used_swap_gb = ?12, used_swap_mb = ?13, swap_percent = ?14, \
                 disks = ?15, components = ?16 \
             WHERE host_id = ?17",
            params![
                snapshot.system.name,
                snapshot.system.kernel_version,
                snapshot.system.os_version,
                snapshot.system.host_name,
                snapshot.memory.total_ram_gb,
                snapshot.memory.total_ram_mb,
                snapshot.memory.used_ram_gb,
                snapshot.memory.used_ram_mb,
                snapshot.memory.ram_percent,
                snapshot.memory.total_swap_gb,
                snapshot.memory.total_swap_mb,
                snapshot.memory.used_swap_gb,
                snapshot.memory.used_swap_mb,
                snapshot.memory.swap_percent,
                serde_json::to_string(&snapshot.disks)?,
                serde_json::to_string(&snapshot.components)?,
                host_id,
            ],
        )?;
        tx.commit()?;

        logger::info(LogTag::Db, &format!("Metrics updated for host {}", ip));
        Ok(())
    }
}
