use proptest::prelude::*;
use vibewatch_core::{
    AlarmKind, AlarmLatch, AlarmTransition, ThresholdAlarmEngine, ToneCfg, TonePlan,
    VibrationSample,
};

proptest! {
    #[test]
    fn total_is_euclidean_norm(x in -4.0f32..4.0, y in -4.0f32..4.0, z in -4.0f32..4.0) {
        let s = VibrationSample::from_delta([x, y, z]);
        prop_assert!(s.total >= 0.0);
        let expected = ((x as f64).powi(2) + (y as f64).powi(2) + (z as f64).powi(2)).sqrt();
        prop_assert!((s.total as f64 - expected).abs() < 1e-4);
        prop_assert!(s.total + 1e-6 >= x.abs().max(y.abs()).max(z.abs()));
    }

    #[test]
    fn vibration_latch_captures_first_exceedance(
        totals in prop::collection::vec(0.0f32..4.0, 1..64),
        threshold in 0.5f32..3.0,
    ) {
        let mut e = ThresholdAlarmEngine::new();
        let mut seen_trigger = false;
        for &t in &totals {
            let before = e.latch(AlarmKind::Vibration);
            let tr = e.evaluate(t, 0.0, threshold, 1000.0);
            if seen_trigger {
                prop_assert_eq!(tr, AlarmTransition::None);
            } else if t > threshold {
                prop_assert_eq!(tr, AlarmTransition::VibrationTriggered { activation: t });
                seen_trigger = true;
            }
            // Never goes back to Idle.
            if before == AlarmLatch::Triggered {
                prop_assert_eq!(e.latch(AlarmKind::Vibration), AlarmLatch::Triggered);
            }
        }
        let first = totals.iter().copied().find(|&t| t > threshold);
        prop_assert_eq!(e.activation_vibration(), first);
    }

    #[test]
    fn temperature_latch_needs_vibration_first(
        temps in prop::collection::vec(-20.0f32..150.0, 1..32),
    ) {
        let mut e = ThresholdAlarmEngine::new();
        for &c in &temps {
            e.evaluate(0.0, c, 2.0, 60.0);
        }
        prop_assert_eq!(e.latch(AlarmKind::Temperature), AlarmLatch::Idle);
    }

    #[test]
    fn tone_period_is_always_finite(a in -10.0f32..1.0e6) {
        let plan = TonePlan::for_activation(a, &ToneCfg::default());
        prop_assert!(plan.period_s.is_finite());
        prop_assert!(plan.period_s > 0.0);
    }
}
