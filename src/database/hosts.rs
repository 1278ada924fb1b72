use rusqlite::{params, OptionalExtension, Row};

use crate::database::{
    parse_timestamp, Database, Host, HostWithMetric, Metric, RegistryError,
};
use crate::logger::{self, LogTag};
use crate::probe::types::HostSnapshot;

const JOINED_COLUMNS: &str = "h.id, h.ip, h.port, h.name, h.last_checked, h.owner_tg_id, \
     m.system_name, m.kernel_version, m.os_version, m.host_name, \
     m.total_ram_gb, m.total_ram_mb, m.used_ram_gb, m.used_ram_mb, m.ram_percent, \
     m.total_swap_gb, m.total_swap_mb, m.used_swap_gb, m.used_swap_mb, m.swap_percent, \
     m.disks, m.components";

/// Raw joined row before timestamp/JSON decoding
struct JoinedRow {
    id: i64,
    ip: String,
    port: u16,
    name: String,
    last_checked: Option<String>,
    owner_tg_id: i64,
    system_name: String,
    kernel_version: String,
    os_version: String,
    host_name: String,
    total_ram_gb: f64,
    total_ram_mb: f64,
    used_ram_gb: f64,
    used_ram_mb: f64,
    ram_percent: f64,
    total_swap_gb: f64,
    total_swap_mb: f64,
    used_swap_gb: f64,
    used_swap_mb: f64,
    swap_percent: f64,
    disks: String,
    components: String,
}

fn read_joined_row(row: &Row) -> rusqlite::Result<JoinedRow> {
    Ok(JoinedRow {
        id: row.get(0)?,
        ip: row.get(1)?,
        port: row.get(2)?,
        name: row.get(3)?,
        last_checked: row.get(4)?,
        owner_tg_id: row.get(5)?,
        system_name: row.get(6)?,
        kernel_version: row.get(7)?,
        os_version: row.get(8)?,
        host_name: row.get(9)?,
        total_ram_gb: row.get(10)?,
        total_ram_mb: row.get(11)?,
        used_ram_gb: row.get(12)?,
        used_ram_mb: row.get(13)?,
        ram_percent: row.get(14)?,
        total_swap_gb: row.get(15)?,
        total_swap_mb: row.get(16)?,
        used_swap_gb: row.get(17)?,
        used_swap_mb: row.get(18)?,
        swap_percent: row.get(19)?,
        disks: row.get(20)?,
        components: row.get(21)?,
    })
}

impl JoinedRow {
    fn into_host_with_metric(self) -> Result<HostWithMetric, RegistryError> {
        Ok(HostWithMetric {
            host: Host {
                id: self.id,
                ip: self.ip,
                port: self.port,
                name: self.name,
                last_checked: parse_timestamp(self.last_checked)?,
                owner_tg_id: self.owner_tg_id,
            },
            metric: Metric {
                system_name: self.system_name,
                kernel_version: self.kernel_version,
                os_version: self.os_version,
                host_name: self.host_name,
                total_ram_gb: self.total_ram_gb,
                total_ram_mb: self.total_ram_mb,
                used_ram_gb: self.used_ram_gb,
                used_ram_mb: self.used_ram_mb,
                ram_percent: self.ram_percent,
                total_swap_gb: self.total_swap_gb,
                total_swap_mb: self.total_swap_mb,
                used_swap_gb: self.used_swap_gb,
                used_swap_mb: self.used_swap_mb,
                swap_percent: self.swap_percent,
                disks: serde_json::from_str(&self.disks)?,
                components: serde_json::from_str(&self.components)?,
            },
        })
    }
}

impl Database {
    /// Insert a host and its zero-valued metric row in one transaction.
    ///
    /// A unique-constraint hit on hosts.ip maps to `DuplicateHost`; any other
    /// failure maps to `Storage`. Either way nothing is persisted.
    pub fn register_host(
        &self,
        owner_tg_id: i64,
        name: &str,
        ip: &str,
        port: u16,
    ) -> Result<Host, RegistryError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        logger::debug(
            LogTag::Db,
            &format!("Registering host {}:{} for user {}", ip, port, owner_tg_id),
        );

        if let Err(e) = tx.execute(
            "INSERT INTO hosts (ip, port, name, owner_tg_id) VALUES (?1, ?2, ?3, ?4)",
            params![ip, port, name, owner_tg_id],
        ) {
            return Err(map_host_insert_error(ip, e));
        }
        let host_id = tx.last_insert_rowid();

        let zeroed = HostSnapshot::zeroed();
        tx.execute(
            "INSERT INTO metrics (host_id, system_name, kernel_version, os_version, host_name, \
             total_ram_gb, total_ram_mb, used_ram_gb, used_ram_mb, ram_percent, \
             total_swap_gb, total_swap_mb, used_swap_gb, used_swap_mb, swap_percent, \
             disks, components) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                host_id,
                zeroed.system.name,
                zeroed.system.kernel_version,
                zeroed.system.os_version,
                zeroed.system.host_name,
                zeroed.memory.total_ram_gb,
                zeroed.memory.total_ram_mb,
                zeroed.memory.used_ram_gb,
                zeroed.memory.used_ram_mb,
                zeroed.memory.ram_percent,
                zeroed.memory.total_swap_gb,
                zeroed.memory.total_swap_mb,
                zeroed.memory.used_swap_gb,
                zeroed.memory.used_swap_mb,
                zeroed.memory.swap_percent,
                serde_json::to_string(&zeroed.disks)?,
                serde_json::to_string(&zeroed.components)?,
            ],
        )?;
        tx.commit()?;

        logger::info(
            LogTag::Db,
            &format!("Host {}:{} registered for user {}", ip, port, owner_tg_id),
        );

        Ok(Host {
            id: host_id,
            ip: ip.to_string(),
            port,
            name: name.to_string(),
            last_checked: None,
            owner_tg_id,
        })
    }

    /// All hosts owned by a user, in insertion order
    pub fn list_hosts(&self, owner_tg_id: i64) -> Result<Vec<Host>, RegistryError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, ip, port, name, last_checked, owner_tg_id \
             FROM hosts WHERE owner_tg_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![owner_tg_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u16>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut hosts = Vec::new();
        for row in rows {
            let (id, ip, port, name, last_checked, owner) = row?;
            hosts.push(Host {
                id,
                ip,
                port,
                name,
                last_checked: parse_timestamp(last_checked)?,
                owner_tg_id: owner,
            });
        }
        Ok(hosts)
    }

    /// Load a host together with its metric row in one JOIN query.
    ///
    /// At least one selector is required; when both are given a row matching
    /// either is returned.
    pub fn find_host(
        &self,
        host_id: Option<i64>,
        host_ip: Option<&str>,
    ) -> Result<Option<HostWithMetric>, RegistryError> {
        if host_id.is_none() && host_ip.is_none() {
            return Err(RegistryError::MissingSelector);
        }

        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM hosts h JOIN metrics m ON m.host_id = h.id \
             WHERE (?1 IS NOT NULL AND h.id = ?1) OR (?2 IS NOT NULL AND h.ip = ?2)",
            JOINED_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(params![host_id, host_ip], read_joined_row)
            .optional()?;

        match row {
            None => Ok(None),
            Some(row) => Ok(Some(row.into_host_with_metric()?)),
        }
    }
}

fn map_host_insert_error(ip: &str, e: rusqlite::Error) -> RegistryError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &e {
        let unique_ip_violation = failure.code == rusqlite::ErrorCode::ConstraintViolation
            && message
                .as_deref()
                .map_or(false, |m| m.to_lowercase().contains("hosts.ip"));
        if unique_ip_violation {
            logger::warning(LogTag::Db, &format!("Duplicate host IP rejected: {}", ip));
            return RegistryError::DuplicateHost { ip: ip.to_string() };
        }
    }
    logger::error(LogTag::Db, &format!("Host insert failed: {}", e));
    RegistryError::from(e)
}
