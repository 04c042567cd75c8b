// ==========================================
// 整车厂运营台账 - 计划执行日志仓储
// ==========================================
// 每次 plan 调用追加一条记录，只增不改
// ==========================================

use crate::domain::plan::{LineAllocation, PlanOutcome, PlanRequest, UnsatisfiedEntry};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// PlanLogRepository - 计划日志仓储
// ==========================================
pub struct PlanLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanLogRepository {
    /// 创建新的计划日志仓储（连接需已完成 init_schema）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一次计划执行结果
    ///
    /// # 返回
    /// - `Ok(plan_id)`: 写入成功
    pub fn append(&self, outcome: &PlanOutcome) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let unsatisfied_json = match &outcome.unsatisfied {
            Some(entry) => Some(serde_json::to_string(entry)?),
            None => None,
        };

        conn.execute(
            r#"
            INSERT INTO plan_log (
                plan_id, executed_at, request_json, success,
                rolled_back, allocations_json, unsatisfied_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                outcome.plan_id,
                outcome.executed_at.to_rfc3339(),
                serde_json::to_string(&outcome.request)?,
                outcome.success,
                outcome.rolled_back,
                serde_json::to_string(&outcome.allocations)?,
                unsatisfied_json,
            ],
        )?;

        Ok(outcome.plan_id.clone())
    }

    /// 最近的计划记录（按执行时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<PlanOutcome>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT plan_id, executed_at, request_json, success,
                   rolled_back, allocations_json, unsatisfied_json
            FROM plan_log
            ORDER BY executed_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PlanLogRow {
                plan_id: row.get(0)?,
                executed_at: row.get(1)?,
                request_json: row.get(2)?,
                success: row.get(3)?,
                rolled_back: row.get(4)?,
                allocations_json: row.get(5)?,
                unsatisfied_json: row.get(6)?,
            })
        })?;

        let mut outcomes = Vec::new();
        for row in rows {
            outcomes.push(row?.into_outcome()?);
        }
        Ok(outcomes)
    }

    /// 日志总条数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM plan_log", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

struct PlanLogRow {
    plan_id: String,
    executed_at: String,
    request_json: String,
    success: bool,
    rolled_back: bool,
    allocations_json: String,
    unsatisfied_json: Option<String>,
}

impl PlanLogRow {
    fn into_outcome(self) -> RepositoryResult<PlanOutcome> {
        let executed_at = DateTime::parse_from_rfc3339(&self.executed_at)
            .map_err(|e| RepositoryError::field_value("executed_at", e.to_string()))?
            .with_timezone(&Utc);
        let request: PlanRequest = serde_json::from_str(&self.request_json)?;
        let allocations: Vec<LineAllocation> = serde_json::from_str(&self.allocations_json)?;
        let unsatisfied: Option<UnsatisfiedEntry> = match self.unsatisfied_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(PlanOutcome {
            plan_id: self.plan_id,
            executed_at,
            request,
            success: self.success,
            allocations,
            unsatisfied,
            rolled_back: self.rolled_back,
        })
    }
}
