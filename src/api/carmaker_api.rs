// ==========================================
// 整车厂运营台账 - 台账门面 API
// ==========================================
// 职责: 车型目录、产线、仓库、可持续性与产能分配的统一入口
// 并发: 产线注册表由单一 Mutex 保护，plan 全程持有
// 锁顺序: 目录 → 产线 → 仓库 → 阈值
// ==========================================

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::LedgerConfig;
use crate::domain::model::Model;
use crate::domain::plan::{PlanOutcome, PlanRequest};
use crate::domain::production_line::LineSpec;
use crate::domain::types::{EngineType, SustainabilityLevel};
use crate::engine::allocation::AllocationEngine;
use crate::engine::sustainability::{self, SustainabilityThresholds};
use crate::engine::utilization::{self, UtilizationReport};
use crate::error::LedgerError;
use crate::importer::{ImportSummary, ModelLoader};
use crate::registry::{LineRegistry, ModelCatalog, StorageLedger};
use crate::repository::{LedgerRepository, LedgerSnapshot, PlanLogRepository};

// ==========================================
// Carmaker - 台账门面
// ==========================================

/// 整车厂台账
///
/// 职责：
/// 1. 车型目录维护与批量导入
/// 2. 工厂与产线拓扑
/// 3. 仓库出入库
/// 4. 可持续性分级
/// 5. 产能分配与利用率统计
pub struct Carmaker {
    config: LedgerConfig,
    current_year: i32,
    engine: AllocationEngine,
    catalog: RwLock<ModelCatalog>,
    lines: Mutex<LineRegistry>,
    storages: Mutex<StorageLedger>,
    thresholds: RwLock<SustainabilityThresholds>,
    plan_log: Option<PlanLogRepository>,
}

impl Default for Carmaker {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Carmaker {
    /// 创建空台账
    ///
    /// # 参数
    /// - config: 台账配置（参考年份、在售窗口、分配策略、阈值）
    pub fn new(config: LedgerConfig) -> Self {
        let current_year = config.current_year();
        let thresholds = config.thresholds.unwrap_or_default();
        Self {
            engine: AllocationEngine::with_policy(config.allocation),
            current_year,
            catalog: RwLock::new(ModelCatalog::new()),
            lines: Mutex::new(LineRegistry::new()),
            storages: Mutex::new(StorageLedger::new()),
            thresholds: RwLock::new(thresholds),
            plan_log: None,
            config,
        }
    }

    /// 由快照重建台账
    ///
    /// 快照中的阈值优先于配置中的初始阈值。
    pub fn from_snapshot(config: LedgerConfig, snapshot: LedgerSnapshot) -> ApiResult<Self> {
        let carmaker = Self::new(config);
        {
            let mut catalog = carmaker.write_catalog()?;
            for model in snapshot.models {
                let code = model.code.clone();
                if !catalog.insert(model) {
                    return Err(LedgerError::duplicate("model", &code).into());
                }
            }
        }
        {
            let mut lines = carmaker.lock_lines()?;
            for factory in &snapshot.factories {
                lines.build_factory(factory)?;
            }
            for line in snapshot.lines {
                lines.restore_line(line)?;
            }
        }
        {
            let mut storages = carmaker.lock_storages()?;
            for unit in snapshot.storages {
                storages.restore_unit(unit)?;
            }
        }
        if let Some(thresholds) = snapshot.thresholds {
            *carmaker.write_thresholds()? = thresholds;
        }
        Ok(carmaker)
    }

    /// 从仓储读取快照并重建台账
    pub fn load(config: LedgerConfig, repo: &LedgerRepository) -> ApiResult<Self> {
        let snapshot = repo.load()?;
        let carmaker = Self::from_snapshot(config, snapshot)?;
        info!(
            models = carmaker.count_models()?,
            year = carmaker.current_year,
            "台账已加载"
        );
        Ok(carmaker)
    }

    /// 当前状态的快照
    pub fn snapshot(&self) -> ApiResult<LedgerSnapshot> {
        let catalog = self.read_catalog()?;
        let lines = self.lock_lines()?;
        let storages = self.lock_storages()?;
        let thresholds = *self.read_thresholds()?;

        let mut models: Vec<Model> = catalog.iter().cloned().collect();
        models.sort_by(|a, b| a.code.cmp(&b.code));

        Ok(LedgerSnapshot {
            models,
            factories: lines.list_factories(),
            lines: lines.lines().cloned().collect(),
            storages: storages.units().to_vec(),
            thresholds: Some(thresholds),
        })
    }

    /// 保存当前状态
    pub fn save(&self, repo: &LedgerRepository) -> ApiResult<()> {
        let snapshot = self.snapshot()?;
        repo.save(&snapshot)?;
        Ok(())
    }

    /// 挂接计划日志（之后每次 plan 追加一条记录）
    pub fn with_plan_log(mut self, plan_log: PlanLogRepository) -> Self {
        self.plan_log = Some(plan_log);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// 参考年份（创建时确定）
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    // ==========================================
    // 车型目录
    // ==========================================

    /// 新增车型；代码已存在返回 false，不做修改
    pub fn add_model(
        &self,
        code: &str,
        name: &str,
        introduction_year: i32,
        displacement_cc: f32,
        engine_type: EngineType,
    ) -> ApiResult<bool> {
        if code.trim().is_empty() {
            return Err(ApiError::InvalidInput("车型代码不能为空".to_string()));
        }
        let added = self.write_catalog()?.add_model(
            code,
            name,
            introduction_year,
            displacement_cc,
            engine_type,
            self.current_year,
        );
        if added {
            info!(code, engine = %engine_type, "新增车型");
        } else {
            debug!(code, "车型已存在，忽略");
        }
        Ok(added)
    }

    pub fn count_models(&self) -> ApiResult<usize> {
        Ok(self.read_catalog()?.count_models())
    }

    /// 车型文本 `code,name,year,displacement,engineType`
    pub fn get_model(&self, code: &str) -> ApiResult<Option<String>> {
        Ok(self.read_catalog()?.get_model(code).map(|m| m.to_string()))
    }

    pub fn get_model_record(&self, code: &str) -> ApiResult<Option<Model>> {
        Ok(self.read_catalog()?.get_model(code).cloned())
    }

    /// 在售车型代码（按代码排序）
    pub fn get_active_models(&self) -> ApiResult<Vec<String>> {
        Ok(self
            .read_catalog()?
            .list_active_models(self.current_year, self.config.active_window_years))
    }

    /// 从制表符分隔文件批量导入车型
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> ApiResult<ImportSummary> {
        let loader = ModelLoader::new(self.current_year);
        let mut catalog = self.write_catalog()?;
        let summary = loader.load_file(path, &mut catalog)?;
        Ok(summary)
    }

    // ==========================================
    // 工厂与产线
    // ==========================================

    pub fn build_factory(&self, name: &str) -> ApiResult<()> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("工厂名称不能为空".to_string()));
        }
        self.lock_lines()?.build_factory(name)?;
        info!(factory = name, "工厂已创建");
        Ok(())
    }

    /// 工厂名称（创建顺序）
    pub fn get_factories(&self) -> ApiResult<Vec<String>> {
        Ok(self.lock_lines()?.list_factories())
    }

    /// 按文本规格 `lineName:capacity:engineTypeCode` 创建产线
    ///
    /// # 返回
    /// - Ok(n): 新建产线数
    pub fn set_production_lines(&self, factory_name: &str, specs: &[&str]) -> ApiResult<usize> {
        let created = self.lock_lines()?.set_production_lines_from_text(
            factory_name,
            specs,
            self.config.line_commit,
        )?;
        info!(factory = factory_name, created, "产线已创建");
        Ok(created)
    }

    /// 按已解析规格创建产线
    pub fn set_production_line_specs(&self, factory_name: &str, specs: &[LineSpec]) -> ApiResult<usize> {
        let created = self.lock_lines()?.set_production_lines(
            factory_name,
            specs,
            self.config.line_commit,
        )?;
        info!(factory = factory_name, created, "产线已创建");
        Ok(created)
    }

    /// 工厂年产能估算：动力编码 → 总产能
    pub fn estimate_yearly_production(&self, factory_name: &str) -> ApiResult<BTreeMap<u8, u64>> {
        Ok(self.lock_lines()?.estimate_yearly_production(factory_name)?)
    }

    pub fn get_line_capacity(&self, factory_name: &str, line_name: &str) -> ApiResult<u32> {
        Ok(self.lock_lines()?.get_line_capacity(factory_name, line_name)?)
    }

    pub fn get_line_allocated_capacity(&self, factory_name: &str, line_name: &str) -> ApiResult<u32> {
        Ok(self
            .lock_lines()?
            .get_line_allocated_capacity(factory_name, line_name)?)
    }

    pub fn get_line_remaining_capacity(&self, factory_name: &str, line_name: &str) -> ApiResult<u32> {
        Ok(self
            .lock_lines()?
            .get_line_remaining_capacity(factory_name, line_name)?)
    }

    // ==========================================
    // 仓库
    // ==========================================

    pub fn build_storage(&self, name: &str, capacity: i64) -> ApiResult<()> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("仓库名称不能为空".to_string()));
        }
        self.lock_storages()?.build_storage(name, capacity)?;
        info!(storage = name, capacity, "仓库已创建");
        Ok(())
    }

    /// 仓库名称（创建顺序）
    pub fn get_storage_list(&self) -> ApiResult<Vec<String>> {
        Ok(self.lock_storages()?.list_storages())
    }

    /// 入库；车型须在目录中
    pub fn store_car(&self, storage_name: &str, model_code: &str) -> ApiResult<()> {
        self.ensure_model(model_code)?;
        self.lock_storages()?.store_car(storage_name, model_code)?;
        info!(storage = storage_name, model = model_code, "入库");
        Ok(())
    }

    /// 出库；车型须在目录中且存放于该仓库
    pub fn remove_car(&self, storage_name: &str, model_code: &str) -> ApiResult<()> {
        self.ensure_model(model_code)?;
        self.lock_storages()?.remove_car(storage_name, model_code)?;
        info!(storage = storage_name, model = model_code, "出库");
        Ok(())
    }

    /// 仓库在库统计：车型 → 数量
    pub fn get_storage_summary(&self, storage_name: &str) -> ApiResult<BTreeMap<String, u32>> {
        Ok(self.lock_storages()?.storage_summary(storage_name)?)
    }

    // ==========================================
    // 可持续性
    // ==========================================

    /// 设置分级阈值（全局生效，不改动车型）
    pub fn set_is_thresholds(&self, ismin: f64, ismax: f64) -> ApiResult<()> {
        if !ismin.is_finite() || !ismax.is_finite() {
            return Err(ApiError::InvalidInput(format!(
                "阈值必须为有限数: ismin={}, ismax={}",
                ismin, ismax
            )));
        }
        if ismin > ismax {
            warn!(ismin, ismax, "ismin 大于 ismax，中档为空");
        }
        *self.write_thresholds()? = SustainabilityThresholds::new(ismin, ismax);
        info!(ismin, ismax, "可持续性阈值已更新");
        Ok(())
    }

    pub fn get_is_thresholds(&self) -> ApiResult<SustainabilityThresholds> {
        Ok(*self.read_thresholds()?)
    }

    /// 指定等级的车型代码
    pub fn get_models_sustainability(&self, level: SustainabilityLevel) -> ApiResult<Vec<String>> {
        let catalog = self.read_catalog()?;
        let thresholds = *self.read_thresholds()?;
        Ok(sustainability::models_in_level(&catalog, &thresholds, level))
    }

    /// 在库车辆的平均可持续性指数
    pub fn get_carmaker_sustainability(&self) -> ApiResult<f64> {
        let catalog = self.read_catalog()?;
        let storages = self.lock_storages()?;
        Ok(sustainability::carmaker_sustainability(&catalog, &storages))
    }

    // ==========================================
    // 产能分配
    // ==========================================

    /// 按文本请求 `model:qty,model:qty` 执行分配
    ///
    /// # 返回
    /// - Ok(true): 全部满足
    /// - Ok(false): 某条目产能不足（已分配部分按提交策略保留或回滚）
    /// - Err: 请求格式错误或车型不存在
    pub fn plan(&self, request: &str) -> ApiResult<bool> {
        Ok(self.plan_text(request)?.success)
    }

    /// 按文本请求执行分配，返回完整结果
    pub fn plan_text(&self, request: &str) -> ApiResult<PlanOutcome> {
        let request: PlanRequest = request.parse()?;
        self.plan_request(&request)
    }

    /// 执行分配，返回完整结果
    pub fn plan_request(&self, request: &PlanRequest) -> ApiResult<PlanOutcome> {
        let outcome = {
            let catalog = self.read_catalog()?;
            let mut lines = self.lock_lines()?;
            self.engine.plan(&catalog, &mut lines, request)?
        };

        if let Some(plan_log) = &self.plan_log {
            // 日志写入失败不影响已提交的分配
            if let Err(e) = plan_log.append(&outcome) {
                warn!(plan_id = %outcome.plan_id, error = %e, "计划日志写入失败");
            }
        }
        Ok(outcome)
    }

    /// 最近的计划记录；未挂接日志时为空
    pub fn recent_plans(&self, limit: usize) -> ApiResult<Vec<PlanOutcome>> {
        match &self.plan_log {
            Some(plan_log) => Ok(plan_log.list_recent(limit)?),
            None => Ok(Vec::new()),
        }
    }

    /// 满载产线占比
    pub fn lines_fully_allocated(&self) -> ApiResult<f64> {
        Ok(utilization::fully_allocated_ratio(&*self.lock_lines()?))
    }

    /// 闲置产线占比
    pub fn unused_lines(&self) -> ApiResult<f64> {
        Ok(utilization::unused_lines_ratio(&*self.lock_lines()?))
    }

    pub fn utilization_report(&self) -> ApiResult<UtilizationReport> {
        Ok(utilization::utilization_report(&*self.lock_lines()?))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn ensure_model(&self, model_code: &str) -> ApiResult<()> {
        if !self.read_catalog()?.contains(model_code) {
            return Err(LedgerError::UnknownModel(model_code.to_string()).into());
        }
        Ok(())
    }

    fn read_catalog(&self) -> ApiResult<RwLockReadGuard<'_, ModelCatalog>> {
        self.catalog.read().map_err(|e| lock_error("catalog", e))
    }

    fn write_catalog(&self) -> ApiResult<RwLockWriteGuard<'_, ModelCatalog>> {
        self.catalog.write().map_err(|e| lock_error("catalog", e))
    }

    fn lock_lines(&self) -> ApiResult<MutexGuard<'_, LineRegistry>> {
        self.lines.lock().map_err(|e| lock_error("lines", e))
    }

    fn lock_storages(&self) -> ApiResult<MutexGuard<'_, StorageLedger>> {
        self.storages.lock().map_err(|e| lock_error("storages", e))
    }

    fn read_thresholds(&self) -> ApiResult<RwLockReadGuard<'_, SustainabilityThresholds>> {
        self.thresholds.read().map_err(|e| lock_error("thresholds", e))
    }

    fn write_thresholds(&self) -> ApiResult<RwLockWriteGuard<'_, SustainabilityThresholds>> {
        self.thresholds.write().map_err(|e| lock_error("thresholds", e))
    }
}

fn lock_error(resource: &str, err: impl std::fmt::Display) -> ApiError {
    LedgerError::LockError(format!("{}: {}", resource, err)).into()
}
