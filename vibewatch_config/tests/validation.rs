use vibewatch_config::load_toml;
use rstest::rstest;

const FULL: &str = r#"
[thresholds]
vib_range_max = 2.0
temp_range_max = 60.0
min_floor = 0.16
floor_enabled = true

[timing]
sample_period_ms = 33
resume_period_ms = 28
second_read_delay_ms = 15
debounce_ms = 10
vibration_visual_ms = 100
temperature_effect_ms = 500
digital_pin_delay_us = 10
control_period_ms = 500
splash_ms = 1000

[tone]
hz_per_g = 1000.0
duty = 0.5
min_activation = 0.001

[storage]
path = "Vib.txt"
retry_ms = 500

[logging]
level = "info"
rotation = "daily"
"#;

#[test]
fn accepts_full_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case("[timing]\nsample_period_ms = 15\n", "sample_period_ms must exceed")]
#[case("[timing]\nresume_period_ms = 10\n", "resume_period_ms must exceed")]
#[case("[timing]\nresume_period_ms = 40\n", "resume_period_ms must not exceed")]
#[case("[timing]\ndebounce_ms = 20\n", "debounce_ms must not exceed")]
#[case("[timing]\ncontrol_period_ms = 0\n", "control_period_ms must be >= 1")]
#[case("[thresholds]\nmin_floor = 0.0\n", "min_floor must be > 0")]
#[case("[thresholds]\nmin_floor = 3.0\n", "min_floor must be below")]
#[case("[thresholds]\ntemp_range_max = -5.0\n", "temp_range_max must be > 0")]
#[case("[tone]\nduty = 1.5\n", "tone.duty must be in")]
#[case("[tone]\nmin_activation = 0.0\n", "min_activation must be > 0")]
#[case("[storage]\npath = \"  \"\n", "storage.path must not be empty")]
#[case("[inputs]\nvibration_knob = 2.0\n", "vibration_knob must be in")]
#[case("[logging]\nrotation = \"weekly\"\n", "rotation must be one of")]
#[case("[board]\nspeaker_pin = 40\n", "outside the BCM range")]
#[case("[board]\nred_pin = 18\n", "assigned more than once")]
fn rejects_invalid_values(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(expected),
        "expected '{expected}' in '{err}'"
    );
}

#[test]
fn unknown_value_types_fail_to_parse() {
    assert!(load_toml("[timing]\nsample_period_ms = \"fast\"\n").is_err());
}

#[test]
fn shipped_config_matches_defaults() {
    let cfg = load_toml(include_str!("../../etc/vibewatch.toml")).expect("parse shipped config");
    cfg.validate().expect("shipped config is valid");
    let defaults = load_toml("").expect("parse empty TOML");
    assert_eq!(cfg.timing.sample_period_ms, defaults.timing.sample_period_ms);
    assert_eq!(cfg.board.pins(), defaults.board.pins());
    assert_eq!(cfg.storage.path, defaults.storage.path);
}
