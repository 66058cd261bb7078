#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary TOML must either fail to parse or validate without panicking.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = vibewatch_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // Accepted timings keep the second read inside one sampling period.
            assert!(cfg.timing.second_read_delay_ms < cfg.timing.sample_period_ms);
            assert!(cfg.timing.second_read_delay_ms < cfg.timing.resume_period_ms);
        }
    }
});
