use std::fs;

use superword_compiler::config::ScenarioConfig;
use superword_compiler::{
    CompilerError, Decision, ElementKind, ErrorKind, LoopDescriptor, TargetFeature,
    VectorizationConfig, VectorizationPlanner,
};
use tempfile::tempdir;

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("superword.toml");
    fs::write(
        &path,
        r#"
            max_vector_size = 16
            allow_narrowing = true
            features = ["sse4.1", "avx", "avx2"]
        "#,
    )
    .unwrap();

    let config = VectorizationConfig::load(&path).unwrap();
    assert_eq!(config.max_vector_size, 16);
    assert!(config.allow_narrowing);

    assert_eq!(config.features.highest(), Some(TargetFeature::Avx2));
}

#[test]
fn test_planner_from_config() {
    let config = VectorizationConfig::from_toml_str(
        r#"
            max_vector_size = 16
            features = ["avx512", "avx512bw"]
        "#,
    )
    .unwrap();
    let descriptor = LoopDescriptor::new(ElementKind::Int32, 2);

    let planner = VectorizationPlanner::from_config(&config).unwrap();
    assert!(matches!(
        planner.plan(&descriptor),
        Decision::CannotVectorize(_)
    ));

    let config = VectorizationConfig {
        allow_narrowing: true,
        ..config
    };
    let planner = VectorizationPlanner::from_config(&config).unwrap();
    assert_eq!(
        planner.plan(&descriptor),
        Decision::CanVectorize { width_bytes: 8, elements_per_vector: 2 }
    );
}

#[test]
fn test_scenario_override() {
    let config = VectorizationConfig::from_toml_str(
        r#"
            [[scenarios]]
            name = "neon-narrow"
            features = ["neon"]
            max_vector_size = 8

            [[scenarios]]
            name = "scalar"
        "#,
    )
    .unwrap();

    let scenarios = config.scenarios();
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].name, "neon-narrow");
    assert_eq!(scenarios[0].vector_width(ElementKind::Int16), 8);
    assert_eq!(scenarios[1].max_vector_size, 64);
    assert_eq!(scenarios[1].vector_width(ElementKind::Int8), 0);
}

#[test]
fn test_scenario_config_conversion() {
    let scenario = ScenarioConfig {
        name: "custom".to_string(),
        features: "sve".parse().unwrap(),
        max_vector_size: 32,
    }
    .to_scenario();
    assert_eq!(scenario.vector_width(ElementKind::Float64), 32);
}

#[test]
fn test_invalid_vector_width() {
    let err = VectorizationConfig::from_toml_str("max_vector_size = 48").unwrap_err();
    assert!(matches!(err, CompilerError::InvalidVectorWidth(48)));
    assert_eq!(err.kind(), ErrorKind::VectorWidth);

    let text = r#"
        [[scenarios]]
        name = "wide"
        max_vector_size = 256
    "#;
    assert!(matches!(
        VectorizationConfig::from_toml_str(text),
        Err(CompilerError::InvalidVectorWidth(256))
    ));
}

#[test]
fn test_unknown_feature() {
    let err = VectorizationConfig::from_toml_str(r#"features = ["avx2", "altivec"]"#).unwrap_err();
    assert!(matches!(err, CompilerError::TomlParse(_)));
    assert!(err.to_string().contains("altivec"));

    let text = r#"
        [[scenarios]]
        name = "ppc"
        features = ["vsx"]
    "#;
    let err = VectorizationConfig::from_toml_str(text).unwrap_err();
    assert!(err.to_string().contains("vsx"));
}

#[test]
fn test_feature_aliases_in_config() {
    let config = VectorizationConfig::from_toml_str(r#"features = [" NEON ", "sve"]"#).unwrap();
    assert_eq!(config.features.to_string(), "asimd,sve");
}

#[test]
fn test_syntax_error() {
    let err = VectorizationConfig::from_toml_str("max_vector_size = ").unwrap_err();
    assert!(matches!(err, CompilerError::TomlParse(_)));
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_error_mentions_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.toml");
    fs::write(
        &path,
        r#"
            [[scenarios]]
            name = "x"

            [[scenarios]]
            name = "x"
        "#,
    )
    .unwrap();

    let err = VectorizationConfig::load(&path).unwrap_err();
    assert!(matches!(err, CompilerError::Config { path: Some(_), .. }));
    assert!(err.to_string().contains("dup.toml"));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = VectorizationConfig::load(dir.path().join("missing.toml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IO);
}
