// ==========================================
// 整车厂运营台账 - 台账快照仓储
// ==========================================
// 红线: Repository 不含业务逻辑，只做数据映射
// ==========================================
// save: 单事务内整体替换所有快照表
// load: 按写入顺序读回工厂、仓库与在库车辆
// ==========================================

use crate::db;
use crate::domain::model::Model;
use crate::domain::production_line::ProductionLine;
use crate::domain::storage::StorageUnit;
use crate::domain::types::{EngineType, LineEngineCode};
use crate::engine::sustainability::SustainabilityThresholds;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

const THRESHOLDS_KEY: &str = "sustainability_thresholds";

// ==========================================
// LedgerSnapshot - 台账快照
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSnapshot {
    pub models: Vec<Model>,
    pub factories: Vec<String>,        // 按创建顺序
    pub lines: Vec<ProductionLine>,    // 含累计已分配量
    pub storages: Vec<StorageUnit>,    // 按创建顺序，含在库车型
    pub thresholds: Option<SustainabilityThresholds>,
}

impl LedgerSnapshot {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
            && self.factories.is_empty()
            && self.lines.is_empty()
            && self.storages.is_empty()
    }
}

// ==========================================
// LedgerRepository - 台账快照仓储
// ==========================================
pub struct LedgerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LedgerRepository {
    /// 打开数据库文件并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（调用方负责 init_schema）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享连接（供日志仓储复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 保存快照（整体替换）
    #[instrument(skip(self, snapshot), fields(models = snapshot.models.len(), lines = snapshot.lines.len()))]
    pub fn save(&self, snapshot: &LedgerSnapshot) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute_batch(
            r#"
            DELETE FROM stored_car;
            DELETE FROM storage_unit;
            DELETE FROM production_line;
            DELETE FROM factory;
            DELETE FROM model;
            DELETE FROM ledger_setting;
            "#,
        )?;

        for model in &snapshot.models {
            tx.execute(
                r#"
                INSERT INTO model (
                    code, name, introduction_year, displacement_cc,
                    engine_type, sustainability_index
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    model.code,
                    model.name,
                    model.introduction_year,
                    model.displacement_cc as f64,
                    model.engine_type.code(),
                    model.sustainability_index,
                ],
            )?;
        }

        for (seq, factory) in snapshot.factories.iter().enumerate() {
            tx.execute(
                "INSERT INTO factory (name, seq) VALUES (?1, ?2)",
                params![factory, seq as i64],
            )?;
        }

        for line in &snapshot.lines {
            tx.execute(
                r#"
                INSERT INTO production_line (
                    name, factory_name, total_capacity, engine_code, allocated
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    line.name,
                    line.factory_name,
                    line.total_capacity,
                    line.engine_code.value(),
                    line.allocated(),
                ],
            )?;
        }

        for (seq, unit) in snapshot.storages.iter().enumerate() {
            tx.execute(
                "INSERT INTO storage_unit (name, seq, capacity) VALUES (?1, ?2, ?3)",
                params![unit.name, seq as i64, unit.capacity],
            )?;
            for (car_seq, model_code) in unit.stored().iter().enumerate() {
                tx.execute(
                    "INSERT INTO stored_car (storage_name, seq, model_code) VALUES (?1, ?2, ?3)",
                    params![unit.name, car_seq as i64, model_code],
                )?;
            }
        }

        if let Some(thresholds) = &snapshot.thresholds {
            tx.execute(
                "INSERT INTO ledger_setting (key, value) VALUES (?1, ?2)",
                params![THRESHOLDS_KEY, serde_json::to_string(thresholds)?],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!("台账快照已保存");
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 读取快照；空库返回空快照
    #[instrument(skip(self))]
    pub fn load(&self) -> RepositoryResult<LedgerSnapshot> {
        let conn = self.get_conn()?;

        let snapshot = LedgerSnapshot {
            models: load_models(&conn)?,
            factories: load_factories(&conn)?,
            lines: load_lines(&conn)?,
            storages: load_storages(&conn)?,
            thresholds: load_thresholds(&conn)?,
        };

        debug!(
            models = snapshot.models.len(),
            factories = snapshot.factories.len(),
            lines = snapshot.lines.len(),
            storages = snapshot.storages.len(),
            "台账快照已读取"
        );
        Ok(snapshot)
    }
}

// ==========================================
// 行映射
// ==========================================

fn load_models(conn: &Connection) -> RepositoryResult<Vec<Model>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT code, name, introduction_year, displacement_cc,
               engine_type, sustainability_index
        FROM model
        ORDER BY code
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i32>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, f64>(5)?,
        ))
    })?;

    let mut models = Vec::new();
    for row in rows {
        let (code, name, introduction_year, displacement_cc, engine_code, sustainability_index) = row?;
        let engine_type = EngineType::from_code(engine_code).ok_or_else(|| {
            RepositoryError::field_value("engine_type", format!("车型 {} 的动力编码 {} 无效", code, engine_code))
        })?;
        models.push(Model {
            code,
            name,
            introduction_year,
            displacement_cc: displacement_cc as f32,
            engine_type,
            sustainability_index,
        });
    }
    Ok(models)
}

fn load_factories(conn: &Connection) -> RepositoryResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM factory ORDER BY seq")?;
    let factories = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(factories)
}

fn load_lines(conn: &Connection) -> RepositoryResult<Vec<ProductionLine>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT name, factory_name, total_capacity, engine_code, allocated
        FROM production_line
        ORDER BY name
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u32>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, u32>(4)?,
        ))
    })?;

    let mut lines = Vec::new();
    for row in rows {
        let (name, factory_name, total_capacity, engine_code, allocated) = row?;
        let engine_code = LineEngineCode::new(engine_code).ok_or_else(|| {
            RepositoryError::field_value("engine_code", format!("产线 {} 的动力编码 {} 无效", name, engine_code))
        })?;
        lines.push(ProductionLine::restore(
            &name,
            &factory_name,
            total_capacity,
            engine_code,
            allocated,
        ));
    }
    Ok(lines)
}

fn load_storages(conn: &Connection) -> RepositoryResult<Vec<StorageUnit>> {
    let mut cars_stmt = conn.prepare(
        "SELECT storage_name, model_code FROM stored_car ORDER BY storage_name, seq",
    )?;
    let mut stored: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let car_rows = cars_stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in car_rows {
        let (storage_name, model_code) = row?;
        stored.entry(storage_name).or_default().push(model_code);
    }

    let mut stmt = conn.prepare("SELECT name, capacity FROM storage_unit ORDER BY seq")?;
    let unit_rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut units = Vec::with_capacity(unit_rows.len());
    for (name, capacity) in unit_rows {
        let cars = stored.remove(&name).unwrap_or_default();
        units.push(StorageUnit::restore(&name, capacity, cars)?);
    }
    Ok(units)
}

fn load_thresholds(conn: &Connection) -> RepositoryResult<Option<SustainabilityThresholds>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM ledger_setting WHERE key = ?1",
            params![THRESHOLDS_KEY],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
