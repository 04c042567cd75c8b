// ==========================================
// 台账快照与命令行端到端测试
// ==========================================
// 测试目标: SQLite 快照保存/恢复、计划日志、命令行整轮调用
// ==========================================


use carmaker_ledger::cli::{self, Cli};
use carmaker_ledger::repository::{LedgerRepository, PlanLogRepository};
use carmaker_ledger::{Carmaker, CommitPolicy, LedgerConfig};
use clap::Parser;
use test_helpers::{create_test_db, gasoline_carmaker, test_config, write_models_file};

// ==========================================
// 快照
// ==========================================

#[test]
fn test_snapshot_preserves_allocations() {
    println!("\n=== 测试: 快照保存与恢复 ===");

    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = LedgerRepository::new(&db_path).unwrap();

    let carmaker = gasoline_carmaker(test_config());
    carmaker.plan("M1:50").unwrap();
    carmaker.build_storage("Hub", 4).unwrap();
    carmaker.store_car("Hub", "M1").unwrap();
    carmaker.set_is_thresholds(5.0, 15.0).unwrap();
    carmaker.save(&repo).unwrap();

    let restored = Carmaker::load(test_config(), &repo).unwrap();

    assert_eq!(restored.get_factories().unwrap(), vec!["F"]);
    assert_eq!(restored.get_line_allocated_capacity("F", "A").unwrap(), 30);
    assert_eq!(restored.get_line_allocated_capacity("F", "B").unwrap(), 20);
    assert_eq!(restored.get_storage_summary("Hub").unwrap().get("M1"), Some(&1));
    assert_eq!(restored.get_is_thresholds().unwrap().ismax, 15.0);
    assert_eq!(
        restored.get_model("M1").unwrap(),
        carmaker.get_model("M1").unwrap()
    );

    // 恢复后继续累加
    assert!(!restored.plan("M1:30").unwrap());
    assert_eq!(restored.lines_fully_allocated().unwrap(), 1.0);

    println!("✓ 分配、库存与阈值均已恢复");
}

#[test]
fn test_plan_log_records_each_plan() {
    println!("\n=== 测试: 计划日志 ===");

    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = LedgerRepository::new(&db_path).unwrap();
    let plan_log = PlanLogRepository::new(repo.connection());

    let carmaker = gasoline_carmaker(test_config()).with_plan_log(plan_log);
    carmaker.plan("M1:50").unwrap();
    carmaker.plan("M1:100").unwrap();

    let recent = carmaker.recent_plans(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert!(!recent[0].success);
    assert_eq!(recent[0].unsatisfied.as_ref().unwrap().shortfall, 80);
    assert!(recent[1].success);
    assert_eq!(recent[1].committed_quantity(), 50);
}

#[test]
fn test_recent_plans_without_log() {
    let carmaker = gasoline_carmaker(test_config());
    carmaker.plan("M1:5").unwrap();
    assert!(carmaker.recent_plans(5).unwrap().is_empty());
}

// ==========================================
// 命令行
// ==========================================

fn run_cli(db_path: &str, args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["carmaker-ledger", "--db", db_path, "--locale", "en"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv)?;

    let mut out = Vec::new();
    cli::run(cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_cli_full_session() {
    println!("\n=== 测试: 命令行多次调用共享快照 ===");

    let (_temp_file, db_path) = create_test_db().unwrap();
    let models = write_models_file(&["M1\tTipo\t2020\t1598\t1", "E1\t500e\t2022\t0\t3"]);
    let models_path = models.path().to_str().unwrap();

    let output = run_cli(&db_path, &["load-models", models_path]).unwrap();
    assert!(output.contains("2 added"), "{}", output);

    run_cli(&db_path, &["factory", "F"]).unwrap();
    run_cli(&db_path, &["lines", "F", "A:30:1", "B:40:1"]).unwrap();

    let output = run_cli(&db_path, &["plan", "M1:50"]).unwrap();
    println!("{}", output);
    assert!(output.contains("Plan succeeded"));

    let output = run_cli(&db_path, &["capacity", "F", "B"]).unwrap();
    assert!(output.contains("allocated 20"), "{}", output);

    let output = run_cli(&db_path, &["plan", "M1:100"]).unwrap();
    assert!(output.contains("short by 80"), "{}", output);

    run_cli(&db_path, &["storage", "S", "1"]).unwrap();
    run_cli(&db_path, &["store", "S", "E1"]).unwrap();
    assert!(run_cli(&db_path, &["store", "S", "M1"]).is_err());

    let output = run_cli(&db_path, &["report", "--json"]).unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["utilization"]["fully_allocated_lines"], 2);

    let output = run_cli(&db_path, &["plans"]).unwrap();
    assert_eq!(output.lines().count(), 2);

    println!("✓ 每次调用都基于上一次写回的快照");
}

#[test]
fn test_cli_partial_commit_persists_after_error() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let models = write_models_file(&["M1\tTipo\t2020\t1598\t1"]);

    run_cli(&db_path, &["load-models", models.path().to_str().unwrap()]).unwrap();
    run_cli(&db_path, &["factory", "F"]).unwrap();
    run_cli(&db_path, &["lines", "F", "A:30:1"]).unwrap();

    // 未知车型报错，但非原子策略下 M1 的分配已生效
    assert!(run_cli(&db_path, &["plan", "M1:10,X9:1"]).is_err());

    let repo = LedgerRepository::new(&db_path).unwrap();
    let carmaker = Carmaker::load(test_config(), &repo).unwrap();
    assert_eq!(carmaker.get_line_allocated_capacity("F", "A").unwrap(), 10);
}

#[test]
fn test_cli_config_file_selects_atomic_lines() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(config_file.path(), r#"{"line_commit": "atomic"}"#).unwrap();
    let config_path = config_file.path().to_str().unwrap();

    run_cli(&db_path, &["--config", config_path, "factory", "F"]).unwrap();
    assert!(run_cli(&db_path, &["--config", config_path, "lines", "F", "A:1:1", "B:x:1"]).is_err());

    let config = LedgerConfig {
        line_commit: CommitPolicy::Atomic,
        ..test_config()
    };
    let repo = LedgerRepository::new(&db_path).unwrap();
    let carmaker = Carmaker::load(config, &repo).unwrap();
    assert!(carmaker.get_line_capacity("F", "A").is_err());
}
