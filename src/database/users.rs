use rusqlite::{params, OptionalExtension};

use crate::database::{Database, RegistryError, User, UserSettings};
use crate::logger::{self, LogTag};

impl Database {
    /// Insert a user with default settings if absent. Idempotent.
    pub fn ensure_user(&self, tg_id: i64) -> Result<(), RegistryError> {
        let conn = self.conn()?;
        let settings = serde_json::to_string(&UserSettings::default())?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (tg_id, settings) VALUES (?1, ?2)",
            params![tg_id, settings],
        )?;
        if inserted > 0 {
            logger::info(LogTag::Db, &format!("Registered new user {}", tg_id));
        }
        Ok(())
    }

    /// Look up a user by chat identity
    pub fn get_user(&self, tg_id: i64) -> Result<Option<User>, RegistryError> {
        let conn = self.conn()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, settings FROM users WHERE tg_id = ?1",
                params![tg_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((id, raw)) => {
                let settings: UserSettings = serde_json::from_str(&raw)?;
                Ok(Some(User {
                    id,
                    tg_id,
                    settings,
                }))
            }
        }
    }

    /// Flip the short-format flag and return the new value.
    /// Returns Ok(None) when no such user exists.
    pub fn toggle_short_format(&self, tg_id: i64) -> Result<Option<bool>, RegistryError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let raw: Option<String> = tx
            .query_row(
                "SELECT settings FROM users WHERE tg_id = ?1",
                params![tg_id],
                |row| row.get(0),
            )
            .optional()?;

        let raw = match raw {
            Some(raw) => raw,
            None => {
                logger::warning(
                    LogTag::Db,
                    &format!("Toggle requested for unknown user {}", tg_id),
                );
                return Ok(None);
            }
        };

        let mut settings: UserSettings = serde_json::from_str(&raw)?;
        settings.short = !settings.short;
        tx.execute(
            "UPDATE users SET settings = ?1 WHERE tg_id = ?2",
            params![serde_json::to_string(&settings)?, tg_id],
        )?;
        tx.commit()?;

        logger::debug(
            LogTag::Db,
            &format!("User {} short format is now {}", tg_id, settings.short),
        );
        Ok(Some(settings.short))
    }
}
