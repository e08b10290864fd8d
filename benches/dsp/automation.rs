//! Benchmarks for parameter timeline evaluation.

use std::hint::black_box;

use criterion::Criterion;
use keysynth::dsp::automation::ParamTimeline;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    // Typical voice: attack, decay, then a release that cancelled nothing
    let mut timeline = ParamTimeline::new(0.001);
    timeline.set_value_at_time(0.001, 0.0);
    timeline.exponential_ramp_to_value_at_time(0.2, 0.02);
    timeline.exponential_ramp_to_value_at_time(0.1, 0.12);
    timeline.set_value_at_time(0.1, 0.5);
    timeline.exponential_ramp_to_value_at_time(0.001, 0.75);

    group.bench_function("value_at_ramp", |b| {
        b.iter(|| timeline.value_at(black_box(0.6)))
    });
    group.bench_function("value_at_hold", |b| {
        b.iter(|| timeline.value_at(black_box(0.3)))
    });

    group.bench_function("release_reschedule", |b| {
        b.iter(|| {
            let mut t = timeline.clone();
            let now = black_box(0.01);
            let current = t.value_at(now);
            t.cancel_scheduled_values(now);
            t.set_value_at_time(current, now);
            t.exponential_ramp_to_value_at_time(0.001, now + 0.25);
            t
        })
    });

    group.finish();
}
