// ==========================================
// 车型批量导入集成测试
// ==========================================
// 测试目标: 制表符文件 → 车型目录
// 覆盖范围: 重复跳过、坏行拒绝、文件不存在
// ==========================================


use carmaker_ledger::importer::ImportError;
use carmaker_ledger::{ApiError, Carmaker};
use test_helpers::{test_config, write_models_file};

#[test]
fn test_load_models_file() {
    println!("\n=== 测试: 导入车型文件 ===");

    let file = write_models_file(&[
        "P1\tPanda\t2012\t1242\t1",
        "T1\tTipo\t2020\t1598\t0",
        "E1\t500e\t2020\t0\t3",
    ]);
    let carmaker = Carmaker::new(test_config());

    let summary = carmaker.load_from_file(file.path()).unwrap();
    println!("导入汇总: {:?}", summary);

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.loaded, 3);
    assert!(summary.rejected.is_empty());
    assert_eq!(carmaker.count_models().unwrap(), 3);
    assert_eq!(
        carmaker.get_model("T1").unwrap().as_deref(),
        Some("T1,Tipo,2020,1598.0,0")
    );
    assert_eq!(carmaker.get_active_models().unwrap(), vec!["E1", "T1"]);
}

#[test]
fn test_existing_models_are_not_overwritten() {
    println!("\n=== 测试: 已存在车型静默跳过 ===");

    let carmaker = Carmaker::new(test_config());
    carmaker
        .add_model("P1", "Panda", 2012, 1242.0, carmaker_ledger::EngineType::Gasoline)
        .unwrap();

    let file = write_models_file(&["P1\tPanda Cross\t2021\t999\t2", "P2\tPunto\t2018\t1368\t1"]);
    let summary = carmaker.load_from_file(file.path()).unwrap();

    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.skipped_duplicates, 1);
    assert_eq!(carmaker.get_model_record("P1").unwrap().unwrap().name, "Panda");
}

#[test]
fn test_bad_rows_are_rejected_and_loading_continues() {
    let file = write_models_file(&[
        "A\tAlfa\t2019",
        "B\tBravo\tyear\t1400\t1",
        "C\tCroma\t2019\t1900\t9",
        "D\tDoblo\t2019\t1600\t0",
    ]);
    let carmaker = Carmaker::new(test_config());

    let summary = carmaker.load_from_file(file.path()).unwrap();

    assert_eq!(summary.loaded, 1);
    let rows: Vec<usize> = summary.rejected.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![1, 2, 3]);
    assert_eq!(carmaker.count_models().unwrap(), 1);
}

#[test]
fn test_missing_file() {
    let carmaker = Carmaker::new(test_config());
    let err = carmaker.load_from_file("/nonexistent/models.tsv").unwrap_err();

    assert!(matches!(err, ApiError::Import(ImportError::FileNotFound(_))));
}
