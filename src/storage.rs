//! Check history persistence.
//!
//! A thin rusqlite store: one table, point lookup, bounded most-recent
//! listing. The store assigns `id` and `checkedAt` on insert; everything
//! structured (violations, validator messages, extended checks) lives in
//! JSON TEXT columns.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use crate::config::HISTORY_LIMIT;
use crate::report::{AnalysisResult, StoredCheck};

pub struct CheckStore {
    conn: Mutex<Connection>,
}

impl CheckStore {
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS accessibility_checks (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                tested_url TEXT NOT NULL,
                page_title TEXT NOT NULL DEFAULT '',
                checked_at TEXT NOT NULL,
                total_violations INTEGER NOT NULL DEFAULT 0,
                critical_count INTEGER NOT NULL DEFAULT 0,
                serious_count INTEGER NOT NULL DEFAULT 0,
                moderate_count INTEGER NOT NULL DEFAULT 0,
                minor_count INTEGER NOT NULL DEFAULT 0,
                passed_count INTEGER NOT NULL DEFAULT 0,
                violations TEXT NOT NULL,
                passes TEXT NOT NULL,
                incomplete TEXT NOT NULL,
                html_error_count INTEGER NOT NULL DEFAULT 0,
                html_warning_count INTEGER NOT NULL DEFAULT 0,
                html_validation_messages TEXT NOT NULL,
                html_validation_failed INTEGER NOT NULL DEFAULT 0,
                html_validation_error TEXT,
                extended_checks TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_checks_checked_at
                ON accessibility_checks(checked_at);
        ",
        )?;
        Ok(())
    }

    /// Insert one analysis, assigning its id and timestamp.
    pub fn insert_check(&self, result: &AnalysisResult) -> anyhow::Result<StoredCheck> {
        let id = Uuid::new_v4().to_string();
        let checked_at = Utc::now().to_rfc3339();

        let violations = serde_json::to_string(&result.violations)?;
        let passes = serde_json::to_string(&result.passes)?;
        let incomplete = serde_json::to_string(&result.incomplete)?;
        let messages = serde_json::to_string(&result.html_validation_messages)?;
        let extended = serde_json::to_string(&result.extended_checks)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO accessibility_checks (
                id, url, tested_url, page_title, checked_at,
                total_violations, critical_count, serious_count, moderate_count, minor_count, passed_count,
                violations, passes, incomplete,
                html_error_count, html_warning_count, html_validation_messages,
                html_validation_failed, html_validation_error, extended_checks)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                id,
                result.url,
                result.tested_url,
                result.page_title,
                checked_at,
                result.total_violations,
                result.critical_count,
                result.serious_count,
                result.moderate_count,
                result.minor_count,
                result.passed_count,
                violations,
                passes,
                incomplete,
                result.html_error_count,
                result.html_warning_count,
                messages,
                result.html_validation_failed as i64,
                result.html_validation_error,
                extended,
            ],
        )?;

        Ok(StoredCheck {
            id,
            checked_at,
            result: result.clone(),
        })
    }

    pub fn get_check(&self, id: &str) -> anyhow::Result<Option<StoredCheck>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("SELECT {} FROM accessibility_checks WHERE id=?1", COLUMNS),
                params![id],
                CheckRow::from_row,
            )
            .optional()?;
        row.map(CheckRow::into_check).transpose()
    }

    /// Most-recent-first history, capped at [`HISTORY_LIMIT`].
    pub fn list_checks(&self) -> anyhow::Result<Vec<StoredCheck>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accessibility_checks ORDER BY checked_at DESC LIMIT ?1",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![HISTORY_LIMIT as i64], CheckRow::from_row)?;
        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(CheckRow::into_check)
            .collect()
    }
}

const COLUMNS: &str = "id, url, tested_url, page_title, checked_at, \
     total_violations, critical_count, serious_count, moderate_count, minor_count, passed_count, \
     violations, passes, incomplete, \
     html_error_count, html_warning_count, html_validation_messages, \
     html_validation_failed, html_validation_error, extended_checks";

/// Raw row; JSON columns are parsed in a second step so sqlite mapping and
/// serde errors stay in their own layers.
struct CheckRow {
    id: String,
    url: String,
    tested_url: String,
    page_title: String,
    checked_at: String,
    total_violations: u32,
    critical_count: u32,
    serious_count: u32,
    moderate_count: u32,
    minor_count: u32,
    passed_count: u32,
    violations: String,
    passes: String,
    incomplete: String,
    html_error_count: u32,
    html_warning_count: u32,
    html_validation_messages: String,
    html_validation_failed: bool,
    html_validation_error: Option<String>,
    extended_checks: String,
}

impl CheckRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            tested_url: row.get(2)?,
            page_title: row.get(3)?,
            checked_at: row.get(4)?,
            total_violations: row.get(5)?,
            critical_count: row.get(6)?,
            serious_count: row.get(7)?,
            moderate_count: row.get(8)?,
            minor_count: row.get(9)?,
            passed_count: row.get(10)?,
            violations: row.get(11)?,
            passes: row.get(12)?,
            incomplete: row.get(13)?,
            html_error_count: row.get(14)?,
            html_warning_count: row.get(15)?,
            html_validation_messages: row.get(16)?,
            html_validation_failed: row.get::<_, i64>(17)? != 0,
            html_validation_error: row.get(18)?,
            extended_checks: row.get(19)?,
        })
    }

    fn into_check(self) -> anyhow::Result<StoredCheck> {
        Ok(StoredCheck {
            id: self.id,
            checked_at: self.checked_at,
            result: AnalysisResult {
                url: self.url,
                tested_url: self.tested_url,
                page_title: self.page_title,
                total_violations: self.total_violations,
                critical_count: self.critical_count,
                serious_count: self.serious_count,
                moderate_count: self.moderate_count,
                minor_count: self.minor_count,
                passed_count: self.passed_count,
                violations: serde_json::from_str(&self.violations)?,
                passes: serde_json::from_str(&self.passes)?,
                incomplete: serde_json::from_str(&self.incomplete)?,
                html_error_count: self.html_error_count,
                html_warning_count: self.html_warning_count,
                html_validation_messages: serde_json::from_str(&self.html_validation_messages)?,
                html_validation_failed: self.html_validation_failed,
                html_validation_error: self.html_validation_error,
                extended_checks: serde_json::from_str(&self.extended_checks)?,
            },
        })
    }
}
