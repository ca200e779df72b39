use rstest::rstest;
use weighid_config::{SamplingMode, load_toml};

const BASE: &str = r#"
offset = 1.5

[store]
path = "nv.bin"
address = 16
capacity = 128

[detector]
change_threshold = 0.05
no_object_threshold = 0.04
match_samples = 3

[sampling]
mode = "paced"
sample_rate_hz = 25
sensor_ms = 80

[logging]
level = "debug"
rotation = "daily"

[[objects]]
slot = 1
weight = 100.0
tolerance = 5.0

[[objects]]
slot = 3
weight = 500.0
tolerance = 7.5
"#;

#[test]
fn accepts_full_config() {
    let cfg = load_toml(BASE).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.sampling.mode, SamplingMode::Paced);
    assert_eq!(cfg.sampling.sensor_timeout_ms, 80);
    assert_eq!(cfg.objects.len(), 2);
    assert_eq!(cfg.objects[1].slot, 3);
    assert_eq!(cfg.offset, Some(1.5));
}

#[test]
fn rejects_missing_store_section() {
    let toml = "[detector]\nmatch_samples = 4\n";
    assert!(load_toml(toml).is_err());
}

#[test]
fn rejects_unknown_sampling_mode() {
    let toml = BASE.replace("mode = \"paced\"", "mode = \"burst\"");
    assert!(load_toml(&toml).is_err());
}

#[rstest]
#[case("capacity = 128", "capacity = 59", "store.capacity")]
#[case("address = 16", "address = 100", "store.capacity")]
#[case("change_threshold = 0.05", "change_threshold = 0.0", "change_threshold")]
#[case("no_object_threshold = 0.04", "no_object_threshold = -1.0", "no_object_threshold")]
#[case("match_samples = 3", "match_samples = 0", "match_samples must be >= 2")]
#[case("match_samples = 3", "match_samples = 1", "match_samples must be >= 2")]
#[case("sample_rate_hz = 25", "sample_rate_hz = 0", "sample_rate_hz must be > 0")]
#[case("sensor_ms = 80", "sensor_ms = 0", "sensor_timeout_ms")]
#[case("rotation = \"daily\"", "rotation = \"weekly\"", "logging.rotation")]
#[case("slot = 3", "slot = 4", "out of range")]
#[case("slot = 3", "slot = 1", "duplicate slot")]
#[case("tolerance = 7.5", "tolerance = -0.5", "tolerance must be finite")]
fn rejects_invalid_values(#[case] from: &str, #[case] to: &str, #[case] needle: &str) {
    let toml = BASE.replace(from, to);
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "error {err} should mention {needle}"
    );
}

#[test]
fn record_must_fit_exactly_at_end() {
    // 84 + 44 = 128
    let toml = BASE.replace("address = 16", "address = 84");
    load_toml(&toml).unwrap().validate().unwrap();
    let toml = BASE.replace("address = 16", "address = 85");
    assert!(load_toml(&toml).unwrap().validate().is_err());
}
