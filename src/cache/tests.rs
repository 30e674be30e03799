use super::*;
use crate::telemetry::testing::counting_telemetry;
use std::fs;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

const MODEL: &str = "paper2sw/test-model";
const TEXT: &str = "Super weights live in the early MLP down_proj layers.";

fn create_test_cache() -> (PredictionCache, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = PredictionCache::open(&CacheConfig::new(dir.path())).expect("Failed to open cache");
    (cache, dir)
}

fn sample_predictions() -> Vec<SuperWeightPrediction> {
    vec![
        SuperWeightPrediction::new("Llama-7B", 2, 1024, 2533, 0.1 + 0.2),
        SuperWeightPrediction::new("Llama-7B", 1, 7, 4095, -13.370000000000001),
        SuperWeightPrediction::new("Llama-7B", 0, 0, 0, 1e-300),
    ]
}

#[test]
fn test_put_then_get_is_bit_exact() {
    let (cache, _dir) = create_test_cache();
    let preds = sample_predictions();

    assert!(cache.put(MODEL, TEXT, 3, Some(42), &preds));
    cache.clear_memory();

    let loaded = cache.get(MODEL, TEXT, 3, Some(42)).expect("entry should exist");
    assert_eq!(loaded.len(), preds.len());
    for (a, b) in loaded.iter().zip(&preds) {
        assert_eq!(a.model_family, b.model_family);
        assert_eq!(a.coordinate(), b.coordinate());
        assert_eq!(a.value.to_bits(), b.value.to_bits());
    }
}

#[test]
fn test_miss_on_empty_cache() {
    let (cache, _dir) = create_test_cache();
    let lookup = cache.lookup(MODEL, TEXT, 3, None);
    assert_eq!(lookup.status, CacheStatus::Miss);
    assert!(lookup.predictions.is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_memory_then_disk_then_promoted() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, Some(1), &sample_predictions());

    assert_eq!(cache.lookup(MODEL, TEXT, 3, Some(1)).status, CacheStatus::HitMemory);

    cache.clear_memory();
    assert_eq!(cache.lookup(MODEL, TEXT, 3, Some(1)).status, CacheStatus::HitDisk);
    assert_eq!(cache.lookup(MODEL, TEXT, 3, Some(1)).status, CacheStatus::HitMemory);

    let stats = cache.stats();
    assert_eq!(stats.memory_hits, 2);
    assert_eq!(stats.disk_hits, 1);
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.hit_ratio(), 1.0);
}

#[test]
fn test_entries_survive_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = CacheConfig::new(dir.path());

    {
        let cache = PredictionCache::open(&config).expect("open");
        cache.put(MODEL, TEXT, 3, None, &sample_predictions());
    }

    let cache = PredictionCache::open(&config).expect("reopen");
    let lookup = cache.lookup(MODEL, TEXT, 3, None);
    assert_eq!(lookup.status, CacheStatus::HitDisk);
    assert_eq!(lookup.predictions, Some(sample_predictions()));
}

#[test]
fn test_put_overwrites() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, Some(5), &sample_predictions());

    let replacement = vec![SuperWeightPrediction::new("Gpt", 1, 2, 3, 4.0)];
    cache.put(MODEL, TEXT, 3, Some(5), &replacement);
    assert_eq!(cache.get(MODEL, TEXT, 3, Some(5)), Some(replacement.clone()));

    cache.clear_memory();
    assert_eq!(cache.get(MODEL, TEXT, 3, Some(5)), Some(replacement));
    assert_eq!(cache.len_on_disk(), 1);
}

#[test]
fn test_key_components_separate_entries() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, Some(5), &sample_predictions());

    assert!(cache.get(MODEL, TEXT, 4, Some(5)).is_none());
    assert!(cache.get(MODEL, TEXT, 3, Some(6)).is_none());
    assert!(cache.get(MODEL, TEXT, 3, None).is_none());
    assert!(cache.get("other/model", TEXT, 3, Some(5)).is_none());
    assert!(cache.get(MODEL, "different text", 3, Some(5)).is_none());
    // Whitespace-only differences share the entry.
    let spaced = format!("  {}  ", TEXT.replace(' ', "\n "));
    assert!(cache.get(MODEL, &spaced, 3, Some(5)).is_some());
}

#[test]
fn test_version_salt_invalidates() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let v1 = PredictionCache::open(&CacheConfig::new(dir.path())).expect("open v1");
    v1.put(MODEL, TEXT, 3, None, &sample_predictions());

    let v2 = PredictionCache::open(&CacheConfig::new(dir.path()).with_version_salt("v2"))
        .expect("open v2");
    assert_eq!(v2.version_salt(), "v2");
    assert!(v2.get(MODEL, TEXT, 3, None).is_none());
}

#[test]
fn test_corrupt_file_is_full_miss() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, None, &sample_predictions());
    cache.clear_memory();

    let key = cache.fingerprint(MODEL, TEXT, 3, None);
    let path = cache.dir().expect("enabled").join(format!("{}.jsonl", key));
    let mut contents = fs::read_to_string(&path).expect("read entry");
    contents.push_str("{not json}\n");
    fs::write(&path, contents).expect("corrupt entry");

    let lookup = cache.lookup(MODEL, TEXT, 3, None);
    assert_eq!(lookup.status, CacheStatus::Miss);
    assert!(lookup.predictions.is_none());
    assert_eq!(cache.stats().failures, 1);
}

#[test]
fn test_file_format_is_five_field_jsonl() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, None, &sample_predictions());

    let key = cache.fingerprint(MODEL, TEXT, 3, None);
    let path = cache.dir().expect("enabled").join(format!("{}.jsonl", key));
    let contents = fs::read_to_string(path).expect("read entry");

    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).expect("valid json");
        let object = value.as_object().expect("object");
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["col", "layer", "model_family", "row", "value"]);
    }
}

#[test]
fn test_empty_list_round_trips() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, None, &[]);
    cache.clear_memory();
    assert_eq!(cache.get(MODEL, TEXT, 3, None), Some(Vec::new()));
}

#[test]
fn test_remove() {
    let (cache, _dir) = create_test_cache();
    cache.put(MODEL, TEXT, 3, None, &sample_predictions());
    assert_eq!(cache.len_on_disk(), 1);

    assert!(cache.remove(MODEL, TEXT, 3, None));
    assert!(!cache.remove(MODEL, TEXT, 3, None));
    assert_eq!(cache.len_on_disk(), 0);
    assert!(cache.get(MODEL, TEXT, 3, None).is_none());
}

#[test]
fn test_disabled_cache() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = PredictionCache::open(&CacheConfig::new(dir.path().join("never")).disabled())
        .expect("open disabled");

    assert!(!cache.is_enabled());
    assert!(cache.dir().is_none());
    assert!(!cache.put(MODEL, TEXT, 3, None, &sample_predictions()));

    let lookup = cache.lookup(MODEL, TEXT, 3, None);
    assert_eq!(lookup.status, CacheStatus::Disabled);
    assert!(!lookup.status.is_hit());
    assert_eq!(cache.len_on_disk(), 0);
    assert_eq!(cache.stats(), CacheStats::default());
    assert!(!dir.path().join("never").exists());
}

#[test]
fn test_open_creates_nested_directory() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let nested = dir.path().join("a").join("b");
    let cache = PredictionCache::open(&CacheConfig::new(&nested)).expect("open nested");
    assert!(nested.is_dir());
    assert_eq!(cache.dir(), Some(nested.as_path()));
}

#[test]
fn test_open_fails_when_path_is_a_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let file = dir.path().join("occupied");
    fs::write(&file, b"x").expect("write file");

    let err = PredictionCache::open(&CacheConfig::new(file.join("cache"))).unwrap_err();
    assert!(matches!(err, CacheError::DirectoryUnavailable { .. }));
}

#[test]
fn test_status_labels() {
    assert_eq!(CacheStatus::HitMemory.to_string(), "HIT_MEMORY");
    assert_eq!(CacheStatus::HitDisk.as_str(), "HIT_DISK");
    assert!(CacheStatus::HitDisk.is_hit());
    assert!(!CacheStatus::Miss.is_hit());
}

#[test]
fn test_lookup_logs_through_telemetry() {
    let (telemetry, events) = counting_telemetry();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = PredictionCache::open(&CacheConfig::new(dir.path()))
        .expect("open")
        .with_telemetry(telemetry);

    cache.lookup(MODEL, TEXT, 3, None);
    assert!(events.load(Ordering::SeqCst) > 0);
}

#[test]
fn test_memory_tier_capacity_bound() {
    let tier = MemoryTier::with_capacity(2);
    for i in 0..10 {
        tier.insert(&format!("key-{}", i), &sample_predictions());
    }
    tier.run_pending_tasks();
    assert!(tier.len() <= 2);
}

#[test]
fn test_disk_tier_missing_entry_is_none() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let disk = DiskTier::new(dir.path().to_path_buf());
    assert!(disk.load("absent").expect("load").is_none());
    assert!(!disk.exists("absent"));
    assert!(disk.is_empty().expect("len"));
}
