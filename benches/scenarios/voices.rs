//! Benchmarks for complete voices, one per synthesis mode.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{
    dsp::{envelope::EnvelopeConfig, oscillator::OscillatorWaveform},
    graph::node::RenderCtx,
    synth::{registry::VoiceRegistry, FrequencyTable, ModulationParams, Patch, SynthMode},
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    // Past attack and decay, so every voice is sustaining
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.5);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for mode in SynthMode::ALL {
            let patch = Patch {
                mode,
                waveform: OscillatorWaveform::Sawtooth,
                modulation: ModulationParams::default(),
            };
            let mut registry =
                VoiceRegistry::new(FrequencyTable::default(), EnvelopeConfig::default(), SAMPLE_RATE);
            registry.note_on(90, &patch, 0.0);

            group.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    registry.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
