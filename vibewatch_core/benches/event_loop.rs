use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use vibewatch_core::Monitor;
use vibewatch_core::mocks::{
    MemoryLog, NullDisplay, RecordingActuators, ScriptedAccelerometer, SharedThermometer,
};
use vibewatch_traits::LogStore;

// Synthetic vibration totals: mostly quiet with periodic bursts.
fn synth_totals(n: usize, seed: u32) -> Vec<f32> {
    let mut state = seed.max(1);
    let mut next_f32 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x as f32) / (u32::MAX as f32 + 1.0)
    };
    (0..n)
        .map(|i| {
            let base = next_f32() * 0.2;
            if i % 50 == 49 { base + 2.5 } else { base }
        })
        .collect()
}

fn build(totals: &[f32]) -> Monitor {
    let mut log = MemoryLog::new();
    let _ = log.open();
    Monitor::builder()
        .with_sensors(
            ScriptedAccelerometer::from_totals(totals.iter().copied()),
            SharedThermometer::new(25.0),
        )
        .with_actuators(RecordingActuators::new())
        .with_log_store(log)
        .with_display(NullDisplay)
        .build()
        .expect("bench monitor")
}

// Ten seconds of virtual time, 1 ms steps, control tick every 500 ms.
fn drive(mut m: Monitor) -> u64 {
    m.start(Duration::ZERO);
    for step in 1..=10_000u64 {
        let now = Duration::from_millis(step);
        m.advance_to(now);
        if step % 500 == 0 {
            m.control_tick(now);
        }
    }
    m.cycles()
}

pub fn bench_event_loop(c: &mut Criterion) {
    let mut g = c.benchmark_group("event_loop");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p vibewatch_core --bench event_loop
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    } else {
        g.sample_size(30);
    }

    let totals = synth_totals(400, 0x5eed);
    g.bench_function("ten_virtual_seconds", |b| {
        b.iter_batched(
            || build(&totals),
            |m| black_box(drive(m)),
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(benches, bench_event_loop);
criterion_main!(benches);
