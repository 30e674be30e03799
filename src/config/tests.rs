use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_paper2sw_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        for name in [
            "PAPER2SW_MODEL_ID",
            "PAPER2SW_DEVICE",
            "PAPER2SW_PRECISION",
            "PAPER2SW_BACKEND",
            "PAPER2SW_TOP_K",
            "PAPER2SW_SEED",
            "PAPER2SW_KEEP_RATIO",
            "PAPER2SW_QUERY_HINT",
            "PAPER2SW_CHUNK_CHARS",
            "PAPER2SW_CACHE_ENABLED",
            "PAPER2SW_CACHE_DIR",
            "PAPER2SW_CACHE_SALT",
            "PAPER2SW_MEMORY_CAPACITY",
            "PAPER2SW_FALLBACK_LAYERS",
            "PAPER2SW_OUTPUT",
        ] {
            env::remove_var(name);
        }
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.model_id, "paper2sw/paper2sw-diff-semantic");
    assert_eq!(config.device, "cpu");
    assert_eq!(config.precision, "bf16");
    assert_eq!(config.backend, BackendKind::Semantic);
    assert_eq!(config.top_k, 5);
    assert!(config.seed.is_none());
    assert_eq!(config.keep_ratio, 1.0);
    assert!(config.query_hint.is_none());
    assert_eq!(config.chunk_chars, 2000);
    assert!(config.cache_enabled);
    assert!(config.cache_dir.ends_with(".cache/paper2sw"));
    assert_eq!(config.cache_salt, "v1");
    assert_eq!(config.memory_capacity, 1024);
    assert_eq!(config.fallback_layers, 32);
    assert!(config.output_path.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_effective_version_salt() {
    let config = Config {
        cache_salt: "v3".to_string(),
        device: "cuda".to_string(),
        precision: "fp16".to_string(),
        ..Default::default()
    };
    assert_eq!(config.effective_version_salt(), "v3|cuda|fp16");
    assert_eq!(config.cache_config().version_salt, "v3|cuda|fp16");
}

#[test]
fn test_cache_config_mirrors_fields() {
    let config = Config {
        cache_enabled: false,
        cache_dir: PathBuf::from("/tmp/p2sw"),
        memory_capacity: 7,
        ..Default::default()
    };
    let cache = config.cache_config();
    assert!(!cache.enabled);
    assert_eq!(cache.dir, PathBuf::from("/tmp/p2sw"));
    assert_eq!(cache.memory_capacity, 7);
}

#[test]
fn test_selection_enabled() {
    assert!(!Config::default().selection_enabled());
    let config = Config {
        keep_ratio: 0.5,
        ..Default::default()
    };
    assert!(config.selection_enabled());
}

#[test]
fn test_validate_reports_all_violations() {
    let config = Config {
        model_id: " ".to_string(),
        device: String::new(),
        precision: String::new(),
        keep_ratio: -0.5,
        chunk_chars: 0,
        memory_capacity: 0,
        cache_salt: String::new(),
        fallback_layers: 0,
        ..Default::default()
    };

    match config.validate() {
        Err(ConfigError::Invalid { violations }) => {
            assert_eq!(
                violations,
                vec![
                    ConfigViolation::EmptyModelId,
                    ConfigViolation::EmptyDevice,
                    ConfigViolation::EmptyPrecision,
                    ConfigViolation::KeepRatioOutOfRange { keep_ratio: -0.5 },
                    ConfigViolation::ZeroChunkSize,
                    ConfigViolation::ZeroMemoryCapacity,
                    ConfigViolation::EmptyVersionSalt,
                    ConfigViolation::ZeroFallbackLayers,
                ]
            );
        }
        other => panic!("expected Invalid, got {:?}", other),
    }
}

#[test]
fn test_keep_ratio_bounds() {
    for ratio in [1.0, 0.5, 0.001, 0.0] {
        let config = Config {
            keep_ratio: ratio,
            ..Default::default()
        };
        assert!(config.validate().is_ok(), "ratio: {}", ratio);
    }
    for ratio in [-0.1, 1.01, f64::NAN] {
        let config = Config {
            keep_ratio: ratio,
            ..Default::default()
        };
        assert_eq!(config.violations().len(), 1, "ratio: {}", ratio);
    }
}

#[test]
fn test_invalid_error_message_lists_violations() {
    let config = Config {
        chunk_chars: 0,
        fallback_layers: 0,
        ..Default::default()
    };
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("chunk size"));
    assert!(message.contains("fallback layer"));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_paper2sw_env();

    let config = Config::from_env().expect("should parse with defaults");
    let defaults = Config::default();

    assert_eq!(config, defaults);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_paper2sw_env();

    let config = with_env_vars(
        &[
            ("PAPER2SW_MODEL_ID", "org/custom"),
            ("PAPER2SW_DEVICE", "cuda"),
            ("PAPER2SW_PRECISION", "fp32"),
            ("PAPER2SW_BACKEND", "heuristic"),
            ("PAPER2SW_TOP_K", "12"),
            ("PAPER2SW_SEED", "42"),
            ("PAPER2SW_KEEP_RATIO", "0.25"),
            ("PAPER2SW_QUERY_HINT", "  outlier  "),
            ("PAPER2SW_CHUNK_CHARS", "500"),
            ("PAPER2SW_CACHE_ENABLED", "off"),
            ("PAPER2SW_CACHE_DIR", "/tmp/paper2sw-cache"),
            ("PAPER2SW_CACHE_SALT", "v9"),
            ("PAPER2SW_MEMORY_CAPACITY", "16"),
            ("PAPER2SW_FALLBACK_LAYERS", "24"),
            ("PAPER2SW_OUTPUT", "out/results.csv"),
        ],
        Config::from_env,
    )
    .expect("should parse overrides");

    assert_eq!(config.model_id, "org/custom");
    assert_eq!(config.device, "cuda");
    assert_eq!(config.precision, "fp32");
    assert_eq!(config.backend, BackendKind::Heuristic);
    assert_eq!(config.top_k, 12);
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.keep_ratio, 0.25);
    assert_eq!(config.query_hint.as_deref(), Some("outlier"));
    assert_eq!(config.chunk_chars, 500);
    assert!(!config.cache_enabled);
    assert_eq!(config.cache_dir, PathBuf::from("/tmp/paper2sw-cache"));
    assert_eq!(config.cache_salt, "v9");
    assert_eq!(config.memory_capacity, 16);
    assert_eq!(config.fallback_layers, 24);
    assert_eq!(config.output_path, Some(PathBuf::from("out/results.csv")));
    assert_eq!(config.effective_version_salt(), "v9|cuda|fp32");
}

#[test]
#[serial]
fn test_from_env_empty_seed_is_unset() {
    clear_paper2sw_env();

    let config = with_env_vars(&[("PAPER2SW_SEED", "  ")], Config::from_env)
        .expect("blank seed is unset");
    assert!(config.seed.is_none());
}

#[test]
#[serial]
fn test_from_env_malformed_numbers() {
    clear_paper2sw_env();

    for (name, value) in [
        ("PAPER2SW_TOP_K", "five"),
        ("PAPER2SW_TOP_K", "-1"),
        ("PAPER2SW_SEED", "abc"),
        ("PAPER2SW_KEEP_RATIO", "half"),
        ("PAPER2SW_CHUNK_CHARS", "1.5"),
        ("PAPER2SW_MEMORY_CAPACITY", "lots"),
        ("PAPER2SW_FALLBACK_LAYERS", "x"),
    ] {
        let result = with_env_vars(&[(name, value)], Config::from_env);
        match result {
            Err(ConfigError::ParseError { name: got, value: v, .. }) => {
                assert_eq!(got, name);
                assert_eq!(v, value);
            }
            other => panic!("{}={} should fail to parse, got {:?}", name, value, other),
        }
    }
}

#[test]
#[serial]
fn test_from_env_invalid_backend_and_bool() {
    clear_paper2sw_env();

    let result = with_env_vars(&[("PAPER2SW_BACKEND", "neural")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::ParseError { name: "PAPER2SW_BACKEND", .. })
    ));

    let result = with_env_vars(&[("PAPER2SW_CACHE_ENABLED", "maybe")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::ParseError { name: "PAPER2SW_CACHE_ENABLED", .. })
    ));
}

#[test]
#[serial]
fn test_from_env_bool_spellings() {
    clear_paper2sw_env();

    for (value, expected) in [("TRUE", true), ("1", true), ("yes", true), ("0", false), ("False", false)] {
        let config = with_env_vars(&[("PAPER2SW_CACHE_ENABLED", value)], Config::from_env)
            .expect("valid boolean");
        assert_eq!(config.cache_enabled, expected, "value: {}", value);
    }
}

#[test]
#[serial]
fn test_from_env_does_not_validate() {
    clear_paper2sw_env();

    let config = with_env_vars(&[("PAPER2SW_KEEP_RATIO", "2.0")], Config::from_env)
        .expect("parses");
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
}
