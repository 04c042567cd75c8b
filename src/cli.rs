// ==========================================
// 整车厂运营台账 - 命令行
// ==========================================
// 每次调用: 读取快照 → 执行命令 → 写回快照（仅修改类命令）
// 结果输出到 stdout，日志输出到 stderr
// ==========================================

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::api::Carmaker;
use crate::config::LedgerConfig;
use crate::domain::types::{EngineType, SustainabilityLevel};
use crate::i18n::{t, t_with_args, Locale};
use crate::repository::{LedgerRepository, PlanLogRepository};

#[derive(Parser, Debug)]
#[command(
    name = "carmaker-ledger",
    about = "Car-maker ledger: model catalog, production lines, storage and capacity planning",
    version
)]
pub struct Cli {
    /// SQLite snapshot path (overrides config and CARMAKER_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output language: zh-CN or en
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Log filter, e.g. debug or carmaker_ledger::engine=debug
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load models from a tab-separated file
    LoadModels { file: PathBuf },

    /// Add a single model
    AddModel {
        code: String,
        name: String,
        year: i32,
        displacement: f32,
        /// Engine type code (0-3) or name
        engine: EngineType,
    },

    /// Show one model as code,name,year,displacement,engineType
    Model { code: String },

    /// List active models
    Models,

    /// Create a factory
    Factory { name: String },

    /// Add production lines to a factory (lineName:capacity:engineTypeCode)
    Lines {
        factory: String,
        #[arg(required = true, allow_hyphen_values = true)]
        specs: Vec<String>,
    },

    /// Show a line's capacity and allocation
    Capacity { factory: String, line: String },

    /// Yearly production estimate per engine code
    Estimate { factory: String },

    /// Create a storage unit
    Storage {
        name: String,
        #[arg(allow_negative_numbers = true)]
        capacity: i64,
    },

    /// Store one car
    Store { storage: String, model: String },

    /// Remove one car
    Remove { storage: String, model: String },

    /// Show what a storage unit holds
    Summary { storage: String },

    /// Allocate a request such as "M1:50,M2:10"
    Plan {
        request: String,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Utilization report
    Report {
        #[arg(long)]
        json: bool,
    },

    /// Set sustainability thresholds
    Thresholds {
        #[arg(allow_negative_numbers = true)]
        ismin: f64,
        #[arg(allow_negative_numbers = true)]
        ismax: f64,
    },

    /// List models at a sustainability level (0 low, 1 medium, 2 high)
    Sustainability { level: i64 },

    /// Recent plan runs
    Plans {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// 是否修改台账（需写回快照）
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::LoadModels { .. }
                | Command::AddModel { .. }
                | Command::Factory { .. }
                | Command::Lines { .. }
                | Command::Storage { .. }
                | Command::Store { .. }
                | Command::Remove { .. }
                | Command::Plan { .. }
                | Command::Thresholds { .. }
        )
    }
}

/// 解析配置：文件 → 环境变量 → 命令行
pub fn resolve_config(cli: &Cli) -> anyhow::Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => LedgerConfig::from_json_file(path)?,
        None => LedgerConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    Ok(config)
}

/// 执行一次命令
pub fn run<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<()> {
    if let Some(locale) = &cli.locale {
        let locale: Locale = locale.parse().map_err(anyhow::Error::msg)?;
        locale.activate();
    }

    let config = resolve_config(&cli)?;
    let db_path = config.resolve_db_path();
    debug!(db_path = %db_path, "打开台账数据库");

    let repo = LedgerRepository::new(&db_path)
        .with_context(|| format!("cannot open ledger database {}", db_path))?;
    let plan_log = PlanLogRepository::new(repo.connection());
    let carmaker = Carmaker::load(config, &repo)?.with_plan_log(plan_log);

    let mutates = cli.command.mutates();
    let result = execute(&carmaker, cli.command, out);

    // 非原子策略下失败前的修改已生效，同样写回
    if mutates {
        return merge_save_result(result, carmaker.save(&repo));
    }
    result
}

/// 命令失败且写回也失败时，保留命令错误并附上写回错误
fn merge_save_result(
    result: anyhow::Result<()>,
    saved: Result<(), crate::api::ApiError>,
) -> anyhow::Result<()> {
    let Err(save_err) = saved else {
        return result;
    };
    warn!(error = %save_err, "台账快照写回失败");
    match result {
        Ok(()) => Err(save_err.into()),
        Err(command_err) => Err(command_err.context(format!("ledger snapshot not saved: {}", save_err))),
    }
}

fn execute<W: Write>(carmaker: &Carmaker, command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::LoadModels { file } => {
            let summary = carmaker.load_from_file(&file)?;
            writeln!(
                out,
                "{}",
                t_with_args(
                    "import.summary",
                    &[
                        ("total", &summary.total_rows.to_string()),
                        ("loaded", &summary.loaded.to_string()),
                        ("duplicates", &summary.skipped_duplicates.to_string()),
                        ("rejected", &summary.rejected.len().to_string()),
                    ],
                )
            )?;
            for rejected in &summary.rejected {
                writeln!(
                    out,
                    "{}",
                    t_with_args(
                        "import.rejected_row",
                        &[("row", &rejected.row.to_string()), ("reason", &rejected.reason)],
                    )
                )?;
            }
        }
        Command::AddModel {
            code,
            name,
            year,
            displacement,
            engine,
        } => {
            let key = if carmaker.add_model(&code, &name, year, displacement, engine)? {
                "model.added"
            } else {
                "model.duplicate"
            };
            writeln!(out, "{}", t_with_args(key, &[("code", &code)]))?;
        }
        Command::Model { code } => match carmaker.get_model(&code)? {
            Some(text) => writeln!(out, "{}", text)?,
            None => bail!(t_with_args("model.not_found", &[("code", &code)])),
        },
        Command::Models => {
            let models = carmaker.get_active_models()?;
            writeln!(
                out,
                "{}",
                t_with_args("model.active_header", &[("count", &models.len().to_string())])
            )?;
            for code in models {
                writeln!(out, "  {}", code)?;
            }
        }
        Command::Factory { name } => {
            carmaker.build_factory(&name)?;
            writeln!(out, "{}", t_with_args("factory.created", &[("name", &name)]))?;
        }
        Command::Lines { factory, specs } => {
            let specs: Vec<&str> = specs.iter().map(String::as_str).collect();
            let created = carmaker.set_production_lines(&factory, &specs)?;
            writeln!(
                out,
                "{}",
                t_with_args(
                    "lines.added",
                    &[("factory", &factory), ("count", &created.to_string())],
                )
            )?;
        }
        Command::Capacity { factory, line } => {
            let total = carmaker.get_line_capacity(&factory, &line)?;
            let allocated = carmaker.get_line_allocated_capacity(&factory, &line)?;
            writeln!(
                out,
                "{}",
                t_with_args(
                    "lines.capacity",
                    &[
                        ("line", &line),
                        ("total", &total.to_string()),
                        ("allocated", &allocated.to_string()),
                    ],
                )
            )?;
        }
        Command::Estimate { factory } => {
            for (code, capacity) in carmaker.estimate_yearly_production(&factory)? {
                writeln!(out, "{}\t{}", code, capacity)?;
            }
        }
        Command::Storage { name, capacity } => {
            carmaker.build_storage(&name, capacity)?;
            writeln!(
                out,
                "{}",
                t_with_args(
                    "storage.created",
                    &[("name", &name), ("capacity", &capacity.to_string())],
                )
            )?;
        }
        Command::Store { storage, model } => {
            carmaker.store_car(&storage, &model)?;
            writeln!(
                out,
                "{}",
                t_with_args("storage.stored", &[("model", &model), ("storage", &storage)])
            )?;
        }
        Command::Remove { storage, model } => {
            carmaker.remove_car(&storage, &model)?;
            writeln!(
                out,
                "{}",
                t_with_args("storage.removed", &[("model", &model), ("storage", &storage)])
            )?;
        }
        Command::Summary { storage } => {
            let summary = carmaker.get_storage_summary(&storage)?;
            writeln!(out, "{}", t_with_args("storage.summary_header", &[("name", &storage)]))?;
            if summary.is_empty() {
                writeln!(out, "  {}", t("storage.empty"))?;
            }
            for (model, count) in summary {
                writeln!(out, "  {}\t{}", model, count)?;
            }
        }
        Command::Plan { request, json } => {
            let outcome = carmaker.plan_text(&request)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?;
                return Ok(());
            }
            if outcome.success {
                writeln!(
                    out,
                    "{}",
                    t_with_args(
                        "plan.success",
                        &[
                            ("plan_id", &outcome.plan_id),
                            ("quantity", &outcome.committed_quantity().to_string()),
                        ],
                    )
                )?;
            } else if let Some(unsatisfied) = &outcome.unsatisfied {
                writeln!(
                    out,
                    "{}",
                    t_with_args(
                        "plan.failed",
                        &[
                            ("model", &unsatisfied.model_code),
                            ("shortfall", &unsatisfied.shortfall.to_string()),
                        ],
                    )
                )?;
                if outcome.rolled_back {
                    writeln!(out, "{}", t("plan.rolled_back"))?;
                }
            }
            if !outcome.rolled_back {
                for allocation in &outcome.allocations {
                    writeln!(
                        out,
                        "{}",
                        t_with_args(
                            "plan.allocation",
                            &[
                                ("line", &allocation.line_name),
                                ("model", &allocation.model_code),
                                ("quantity", &allocation.quantity.to_string()),
                            ],
                        )
                    )?;
                }
            }
        }
        Command::Report { json } => {
            let report = carmaker.utilization_report()?;
            let sustainability = carmaker.get_carmaker_sustainability()?;
            if json {
                let value = serde_json::json!({
                    "utilization": report,
                    "carmaker_sustainability": sustainability,
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
                return Ok(());
            }
            writeln!(out, "{}", t("report.header"))?;
            writeln!(
                out,
                "{}",
                t_with_args(
                    "report.ratios",
                    &[
                        ("full", &format!("{:.3}", report.fully_allocated_ratio)),
                        ("unused", &format!("{:.3}", report.unused_ratio)),
                        ("total", &report.total_lines.to_string()),
                    ],
                )
            )?;
            for (code, usage) in &report.by_engine_code {
                writeln!(
                    out,
                    "{}",
                    t_with_args(
                        "report.engine_row",
                        &[
                            ("code", &code.to_string()),
                            ("lines", &usage.lines.to_string()),
                            ("capacity", &usage.total_capacity.to_string()),
                            ("allocated", &usage.allocated.to_string()),
                        ],
                    )
                )?;
            }
            writeln!(
                out,
                "{}",
                t_with_args("report.sustainability", &[("value", &format!("{:.3}", sustainability))])
            )?;
        }
        Command::Thresholds { ismin, ismax } => {
            carmaker.set_is_thresholds(ismin, ismax)?;
            writeln!(
                out,
                "{}",
                t_with_args(
                    "thresholds.set",
                    &[("min", &ismin.to_string()), ("max", &ismax.to_string())],
                )
            )?;
        }
        Command::Sustainability { level } => {
            let Some(level) = SustainabilityLevel::from_level(level) else {
                bail!("sustainability level must be 0, 1 or 2, got {}", level);
            };
            writeln!(
                out,
                "{}",
                t_with_args("sustainability.header", &[("level", &level.to_string())])
            )?;
            for code in carmaker.get_models_sustainability(level)? {
                writeln!(out, "  {}", code)?;
            }
        }
        Command::Plans { limit, json } => {
            let plans = carmaker.recent_plans(limit)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&plans)?)?;
                return Ok(());
            }
            if plans.is_empty() {
                writeln!(out, "{}", t("plans.empty"))?;
            }
            for plan in &plans {
                let status = if plan.success {
                    t("common.success")
                } else {
                    t("common.failed")
                };
                writeln!(
                    out,
                    "{}",
                    t_with_args(
                        "plans.row",
                        &[
                            ("time", &plan.executed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
                            ("plan_id", &plan.plan_id),
                            ("status", &status),
                            ("quantity", &plan.committed_quantity().to_string()),
                        ],
                    )
                )?;
            }
        }
    }
    Ok(())
}
