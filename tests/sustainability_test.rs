// ==========================================
// 可持续性分级集成测试
// ==========================================
// 测试目标: 验证指数计算、阈值分级与在库平均值
// ==========================================


use carmaker_ledger::domain::model::sustainability_index;
use carmaker_ledger::{Carmaker, EngineType, LedgerConfig, SustainabilityLevel, SustainabilityThresholds};
use test_helpers::test_config;

/// 目录: 指数分别为 0 / 10 / 50 / 300
fn create_carmaker() -> Carmaker {
    let carmaker = Carmaker::new(test_config());
    carmaker.add_model("DZ", "Diesel", 2016, 1900.0, EngineType::Diesel).unwrap();
    carmaker.add_model("G10", "Gas", 2016, 1400.0, EngineType::Gasoline).unwrap();
    carmaker.add_model("L50", "Gpl", 2022, 1400.0, EngineType::Gpl).unwrap();
    carmaker.add_model("E300", "Ev", 2025, 0.0, EngineType::Electric).unwrap();
    carmaker
}

#[test]
fn test_index_formula() {
    println!("\n=== 测试: 可持续性指数 ===");

    assert_eq!(sustainability_index(EngineType::Gasoline, 2016, 2026), 10.0);
    assert_eq!(sustainability_index(EngineType::Gpl, 2022, 2026), 50.0);
    assert_eq!(sustainability_index(EngineType::Diesel, 2000, 2026), 0.0);
    // 当年上市按 1 年计
    assert_eq!(sustainability_index(EngineType::Electric, 2026, 2026), 300.0);
    // 未来年份上市，车龄为负
    assert_eq!(sustainability_index(EngineType::Electric, 2030, 2026), -75.0);
}

#[test]
fn test_future_model_lands_in_low_bucket() {
    let carmaker = Carmaker::new(test_config());
    carmaker
        .add_model("F1", "Future", 2030, 1.0, EngineType::Electric)
        .unwrap();

    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::Low).unwrap(),
        vec!["F1"]
    );
    assert!(carmaker
        .get_models_sustainability(SustainabilityLevel::High)
        .unwrap()
        .is_empty());
}

#[test]
fn test_default_thresholds_bucket_everything_positive_as_high() {
    let carmaker = create_carmaker();
    assert_eq!(carmaker.get_is_thresholds().unwrap(), SustainabilityThresholds::default());

    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::Medium).unwrap(),
        vec!["DZ"]
    );
    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::High).unwrap(),
        vec!["E300", "G10", "L50"]
    );
}

#[test]
fn test_threshold_boundaries_are_inclusive_for_medium() {
    println!("\n=== 测试: 阈值边界 ===");

    let carmaker = create_carmaker();
    carmaker.set_is_thresholds(10.0, 50.0).unwrap();

    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::Low).unwrap(),
        vec!["DZ"]
    );
    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::Medium).unwrap(),
        vec!["G10", "L50"]
    );
    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::High).unwrap(),
        vec!["E300"]
    );
}

#[test]
fn test_inverted_thresholds_leave_medium_empty() {
    let carmaker = create_carmaker();
    carmaker.set_is_thresholds(60.0, 5.0).unwrap();

    assert!(carmaker
        .get_models_sustainability(SustainabilityLevel::Medium)
        .unwrap()
        .is_empty());
    assert!(carmaker.set_is_thresholds(f64::NAN, 1.0).is_err());
}

#[test]
fn test_thresholds_from_config() {
    let config = LedgerConfig {
        thresholds: Some(SustainabilityThresholds::new(100.0, 200.0)),
        ..test_config()
    };
    let carmaker = Carmaker::new(config);
    carmaker.add_model("E", "Ev", 2025, 0.0, EngineType::Electric).unwrap();

    assert_eq!(
        carmaker.get_models_sustainability(SustainabilityLevel::High).unwrap(),
        vec!["E"]
    );
}

#[test]
fn test_carmaker_sustainability_average() {
    println!("\n=== 测试: 在库车辆平均指数 ===");

    let carmaker = create_carmaker();
    carmaker.build_storage("S1", 5).unwrap();
    carmaker.build_storage("S2", 5).unwrap();
    assert_eq!(carmaker.get_carmaker_sustainability().unwrap(), 0.0);

    carmaker.store_car("S1", "G10").unwrap();
    carmaker.store_car("S1", "L50").unwrap();
    carmaker.store_car("S2", "E300").unwrap();
    carmaker.store_car("S2", "G10").unwrap();

    // (10 + 50 + 300 + 10) / 4
    let average = carmaker.get_carmaker_sustainability().unwrap();
    println!("平均指数: {}", average);
    assert_eq!(average, 92.5);
}
