// ==========================================
// 整车厂运营台账 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少偶发 busy 错误
// - 快照表结构集中在 init_schema，幂等创建
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 创建台账快照所需的表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS model (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            introduction_year INTEGER NOT NULL,
            displacement_cc REAL NOT NULL,
            engine_type INTEGER NOT NULL CHECK (engine_type BETWEEN 0 AND 3),
            sustainability_index REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS factory (
            name TEXT PRIMARY KEY,
            seq INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS production_line (
            name TEXT PRIMARY KEY,
            factory_name TEXT NOT NULL REFERENCES factory(name) ON DELETE CASCADE,
            total_capacity INTEGER NOT NULL CHECK (total_capacity >= 0),
            engine_code INTEGER NOT NULL CHECK (engine_code BETWEEN 0 AND 4),
            allocated INTEGER NOT NULL DEFAULT 0
                CHECK (allocated >= 0 AND allocated <= total_capacity)
        );

        CREATE TABLE IF NOT EXISTS storage_unit (
            name TEXT PRIMARY KEY,
            seq INTEGER NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity > 0)
        );

        CREATE TABLE IF NOT EXISTS stored_car (
            storage_name TEXT NOT NULL REFERENCES storage_unit(name) ON DELETE CASCADE,
            seq INTEGER NOT NULL,
            model_code TEXT NOT NULL REFERENCES model(code),
            PRIMARY KEY (storage_name, seq)
        );

        CREATE TABLE IF NOT EXISTS ledger_setting (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS plan_log (
            plan_id TEXT PRIMARY KEY,
            executed_at TEXT NOT NULL,
            request_json TEXT NOT NULL,
            success INTEGER NOT NULL,
            rolled_back INTEGER NOT NULL,
            allocations_json TEXT NOT NULL,
            unsatisfied_json TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_plan_log_executed_at ON plan_log(executed_at);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
