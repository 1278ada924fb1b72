//! Host registry backed by SQLite.
//!
//! Thread-safe database handle behind an r2d2 connection pool. Write
//! operations run in single all-or-nothing transactions; no operation spans
//! two transactions or holds a connection across a network call.
//!
//! Schema invariants:
//! - hosts.ip is globally unique
//! - every host row has exactly one metrics row (created in the same
//!   transaction as the host, zero-valued until the first successful poll)
//! - hosts.last_checked is NULL until the first successful poll

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logger::{self, LogTag};
use crate::probe::types::{ComponentInfo, DiskInfo};

mod error;
mod hosts;
mod metrics;
mod users;

pub use error::RegistryError;

// =============================================================================
// DATABASE SCHEMA DEFINITIONS
// =============================================================================

const SCHEMA_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tg_id INTEGER NOT NULL UNIQUE,
    settings TEXT NOT NULL
);
"#;

const SCHEMA_HOSTS: &str = r#"
CREATE TABLE IF NOT EXISTS hosts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip TEXT NOT NULL UNIQUE,
    port INTEGER NOT NULL CHECK (port >= 0 AND port <= 65535),
    name TEXT NOT NULL,
    last_checked TEXT,
    owner_tg_id INTEGER NOT NULL REFERENCES users (tg_id)
);
"#;

const SCHEMA_METRICS: &str = r#"
CREATE TABLE IF NOT EXISTS metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    host_id INTEGER NOT NULL UNIQUE REFERENCES hosts (id) ON DELETE CASCADE,
    system_name TEXT NOT NULL,
    kernel_version TEXT NOT NULL,
    os_version TEXT NOT NULL,
    host_name TEXT NOT NULL,
    total_ram_gb REAL NOT NULL,
    total_ram_mb REAL NOT NULL,
    used_ram_gb REAL NOT NULL,
    used_ram_mb REAL NOT NULL,
    ram_percent REAL NOT NULL,
    total_swap_gb REAL NOT NULL,
    total_swap_mb REAL NOT NULL,
    used_swap_gb REAL NOT NULL,
    used_swap_mb REAL NOT NULL,
    swap_percent REAL NOT NULL,
    disks TEXT NOT NULL,
    components TEXT NOT NULL
);
"#;

const SCHEMA_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_hosts_owner ON hosts (owner_tg_id);"];

// =============================================================================
// ROW MODELS
// =============================================================================

/// Per-user display settings, stored as one JSON document in users.settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserSettings {
    pub short: bool,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub tg_id: i64,
    pub settings: UserSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub id: i64,
    pub ip: String,
    pub port: u16,
    pub name: String,
    pub last_checked: Option<DateTime<Utc>>,
    pub owner_tg_id: i64,
}

/// Latest stored snapshot for one host
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub system_name: String,
    pub kernel_version: String,
    pub os_version: String,
    pub host_name: String,
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
    pub disks: Vec<DiskInfo>,
    pub components: Vec<ComponentInfo>,
}

/// A host together with its metric row, loaded in one query
#[derive(Debug, Clone, PartialEq)]
pub struct HostWithMetric {
    pub host: Host,
    pub metric: Metric,
}

// =============================================================================
// DATABASE HANDLE
// =============================================================================

/// Thread-safe registry handle; cheap to clone (shares the pool)
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (or create) the registry database at `path`
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        logger::info(
            LogTag::Db,
            &format!("Opening registry database at {}", path.display()),
        );

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(5).build(manager)?;

        let db = Database { pool };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), RegistryError> {
        let conn = self.conn()?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;

        for schema in [SCHEMA_USERS, SCHEMA_HOSTS, SCHEMA_METRICS] {
            conn.execute_batch(schema)?;
        }
        for index in SCHEMA_INDEXES {
            conn.execute(index, [])?;
        }

        Ok(())
    }

    pub(crate) fn conn(
        &self,
    ) -> Result<PooledConnection<SqliteConnectionManager>, RegistryError> {
        Ok(self.pool.get()?)
    }
}

/// Decode an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, RegistryError> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| RegistryError::Storage(format!("Bad timestamp {:?}: {}", s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::types::{HostSnapshot, MemoryInfo, SystemInfo};

    fn open_test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn sample_snapshot() -> HostSnapshot {
        HostSnapshot {
            system: SystemInfo {
                name: "Linux".to_string(),
                kernel_version: "6.8.0".to_string(),
                os_version: "Ubuntu 24.04".to_string(),
                host_name: "web1".to_string(),
            },
            memory: MemoryInfo {
                total_ram_gb: 15.5,
                total_ram_mb: 15872.0,
                used_ram_gb: 6.2,
                used_ram_mb: 6348.8,
                ram_percent: 40.0,
                total_swap_gb: 2.0,
                total_swap_mb: 2048.0,
                used_swap_gb: 0.5,
                used_swap_mb: 512.0,
                swap_percent: 25.0,
            },
            disks: vec![DiskInfo {
                name: Some("sda1".to_string()),
                mount_point: Some("/".to_string()),
                available_space_gb: 100.0,
                available_space_mb: 102400.0,
                total_space_gb: 200.0,
                total_space_mb: 204800.0,
            }],
            components: vec![ComponentInfo {
                label: Some("CPU".to_string()),
                temperature: Some(48.5),
            }],
        }
    }

    #[test]
    fn test_ensure_user_is_idempotent() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();
        db.ensure_user(42).unwrap();

        let user = db.get_user(42).unwrap().unwrap();
        assert_eq!(user.tg_id, 42);
        assert!(!user.settings.short);
    }

    #[test]
    fn test_toggle_short_format_round_trip() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();

        assert_eq!(db.toggle_short_format(42).unwrap(), Some(true));
        assert_eq!(db.toggle_short_format(42).unwrap(), Some(false));
        // Unknown user is a sentinel, not an error
        assert_eq!(db.toggle_short_format(999).unwrap(), None);
    }

    #[test]
    fn test_register_host_creates_zeroed_metric() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();
        db.register_host(42, "web1", "10.0.0.5", 8080).unwrap();

        let found = db.find_host(None, Some("10.0.0.5")).unwrap().unwrap();
        assert_eq!(found.host.ip, "10.0.0.5");
        assert_eq!(found.host.port, 8080);
        assert_eq!(found.host.name, "web1");
        assert_eq!(found.host.owner_tg_id, 42);
        assert!(found.host.last_checked.is_none());
        assert_eq!(found.metric.system_name, "");
        assert_eq!(found.metric.ram_percent, 0.0);
        assert_eq!(found.metric.total_swap_mb, 0.0);
        assert!(found.metric.disks.is_empty());
        assert!(found.metric.components.is_empty());
    }

    #[test]
    fn test_duplicate_ip_rejected_and_original_kept() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();
        db.ensure_user(43).unwrap();
        db.register_host(42, "web1", "10.0.0.5", 8080).unwrap();

        let err = db.register_host(43, "other", "10.0.0.5", 9090).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateHost { .. }));

        // The original row is untouched and no orphan metric row appeared
        let found = db.find_host(None, Some("10.0.0.5")).unwrap().unwrap();
        assert_eq!(found.host.name, "web1");
        assert_eq!(found.host.port, 8080);
        assert_eq!(found.host.owner_tg_id, 42);
        assert!(db.list_hosts(43).unwrap().is_empty());
    }

    #[test]
    fn test_list_hosts_scoped_to_owner() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();
        db.ensure_user(77).unwrap();
        db.register_host(42, "web1", "10.0.0.5", 8080).unwrap();
        db.register_host(42, "web2", "10.0.0.6", 8080).unwrap();
        db.register_host(77, "db1", "10.0.0.7", 9100).unwrap();

        let mine = db.list_hosts(42).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].name, "web1");
        assert_eq!(mine[1].name, "web2");

        let theirs = db.list_hosts(77).unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].ip, "10.0.0.7");
    }

    #[test]
    fn test_find_host_selectors() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();
        let host = db.register_host(42, "web1", "10.0.0.5", 8080).unwrap();

        assert!(matches!(
            db.find_host(None, None).unwrap_err(),
            RegistryError::MissingSelector
        ));
        assert!(db.find_host(Some(host.id), None).unwrap().is_some());
        assert!(db.find_host(None, Some("10.0.0.5")).unwrap().is_some());
        // Either selector matching is enough
        assert!(db
            .find_host(Some(host.id), Some("no.such.ip"))
            .unwrap()
            .is_some());
        assert!(db.find_host(None, Some("10.9.9.9")).unwrap().is_none());
    }

    #[test]
    fn test_overwrite_metrics_replaces_snapshot() {
        let (_dir, db) = open_test_db();
        db.ensure_user(42).unwrap();
        db.register_host(42, "web1", "10.0.0.5", 8080).unwrap();

        let snapshot = sample_snapshot();
        db.overwrite_metrics("10.0.0.5", &snapshot).unwrap();

        let found = db.find_host(None, Some("10.0.0.5")).unwrap().unwrap();
        assert!(found.host.last_checked.is_some());
        assert_eq!(found.metric.system_name, snapshot.system.name);
        assert_eq!(found.metric.kernel_version, snapshot.system.kernel_version);
        assert_eq!(found.metric.os_version, snapshot.system.os_version);
        assert_eq!(found.metric.host_name, snapshot.system.host_name);
        assert_eq!(found.metric.total_ram_gb, snapshot.memory.total_ram_gb);
        assert_eq!(found.metric.used_ram_mb, snapshot.memory.used_ram_mb);
        assert_eq!(found.metric.ram_percent, snapshot.memory.ram_percent);
        assert_eq!(found.metric.swap_percent, snapshot.memory.swap_percent);
        assert_eq!(found.metric.disks, snapshot.disks);
        assert_eq!(found.metric.components, snapshot.components);
    }

    #[test]
    fn test_overwrite_metrics_unknown_ip() {
        let (_dir, db) = open_test_db();
        let err = db
            .overwrite_metrics("10.9.9.9", &HostSnapshot::zeroed())
            .unwrap_err();
        assert!(matches!(err, RegistryError::HostNotFound { .. }));
    }
}
