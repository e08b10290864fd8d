//! Benchmarks for the exponential ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::dsp::envelope::{Envelope, EnvelopeConfig};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::new(EnvelopeConfig::default());
        env.attack(0.0);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(0.001), sample_rate);
            })
        });

        // Sustain phase (holding steady)
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(1.0), sample_rate);
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::new(EnvelopeConfig::default());
        env.attack(0.0);
        env.release(0.5);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(0.6), sample_rate);
            })
        });
    }

    group.finish();
}
