use engagement_engine::model::{load_artifact, save_artifact};
use engagement_engine::{
    predict, train, CachedPredictor, CandidatePost, EngineError, HistoricalPost, Language, ModelConfig, Predictor,
};
use std::path::Path;

fn posts(scale: f64) -> Vec<HistoricalPost> {
    let rows = [
        ("Travel", "sunset over the desert dunes", 0.8),
        ("Travel", "hidden beach in the north", 0.7),
        ("Food", "spicy street food tour", 0.3),
        ("Food", "homemade bread recipe", 0.2),
        ("Tech", "new phone camera review", 0.5),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (topic, content, score))| HistoricalPost {
            id: Some(i as i64),
            topic: Some(topic.to_string()),
            language: Some(Language::English),
            provider: Some("gemini".to_string()),
            model_name: Some("writer-v1".to_string()),
            temperature: Some(0.7),
            content_en: Some(content.to_string()),
            engagement_score: Some(score * scale),
            ..HistoricalPost::default()
        })
        .collect()
}

fn config_at(path: &Path) -> ModelConfig {
    ModelConfig {
        artifact_path: path.to_path_buf(),
        n_estimators: 20,
        ..ModelConfig::default()
    }
}

fn travel_candidate() -> CandidatePost {
    CandidatePost {
        topic: "Travel".to_string(),
        language: "English".to_string(),
        provider: "gemini".to_string(),
        model_name: "writer-v1".to_string(),
        temperature: 0.7,
        content: "sunset over the desert dunes".to_string(),
        ..CandidatePost::default()
    }
}

#[test]
fn predict_before_training_is_model_not_trained() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-trained.json");

    let err = predict(&path, &travel_candidate()).unwrap_err();
    match err {
        EngineError::ModelNotTrained(missing) => assert_eq!(missing, path),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn every_call_sees_the_latest_training_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("model.json"));
    let predictor = Predictor::new(&config.artifact_path);
    assert_eq!(predictor.artifact_path(), config.artifact_path.as_path());

    assert!(train(&posts(1.0), &config).success);
    let before = predictor.predict(&travel_candidate()).unwrap();

    assert!(train(&posts(2.0), &config).success);
    let after = predictor.predict(&travel_candidate()).unwrap();

    assert!(after > before, "after {} <= before {}", after, before);
    assert!((after / before - 2.0).abs() < 1e-6);
}

#[test]
fn cached_predictor_reloads_after_retraining() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("model.json"));
    let mut cached = CachedPredictor::new(&config.artifact_path);
    assert!(!cached.is_loaded());

    assert!(train(&posts(1.0), &config).success);
    let first = cached.predict(&travel_candidate()).unwrap();
    assert!(cached.is_loaded());
    assert_eq!(first, cached.predict(&travel_candidate()).unwrap());

    let mut retrained = posts(2.0);
    retrained.push(HistoricalPost {
        id: Some(99),
        topic: Some("Music".to_string()),
        language: Some(Language::English),
        content_en: Some("live jazz night downtown".to_string()),
        engagement_score: Some(0.4),
        ..HistoricalPost::default()
    });
    assert!(train(&retrained, &config).success);

    let reloaded = cached.predict(&travel_candidate()).unwrap();
    let fresh = predict(&config.artifact_path, &travel_candidate()).unwrap();
    assert_eq!(reloaded, fresh);
}

#[test]
fn cached_predictor_forgets_deleted_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("model.json"));
    assert!(train(&posts(1.0), &config).success);

    let mut cached = CachedPredictor::new(&config.artifact_path);
    cached.predict(&travel_candidate()).unwrap();
    std::fs::remove_file(&config.artifact_path).unwrap();

    let err = cached.predict(&travel_candidate()).unwrap_err();
    assert!(matches!(err, EngineError::ModelNotTrained(_)));
    assert!(!cached.is_loaded());
}

#[test]
fn artifact_from_another_feature_layout_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("model.json"));
    assert!(train(&posts(1.0), &config).success);

    let mut artifact = load_artifact(&config.artifact_path).unwrap();
    artifact.schema_fingerprint = "0000000000000000".to_string();
    save_artifact(&config.artifact_path, &artifact).unwrap();

    let err = predict(&config.artifact_path, &travel_candidate()).unwrap_err();
    assert!(matches!(err, EngineError::FeatureMismatch(_)));
}

#[test]
fn corrupt_artifact_is_a_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = predict(&path, &travel_candidate()).unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));
}
