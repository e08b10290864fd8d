//! Benchmarks for the whole engine: dispatch, voices, tremolo, master gain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{synth::SynthMode, EngineConfig, SynthEngine};

use crate::BLOCK_SIZES;

/// Two octaves of a C major chord
const CHORD: [u32; 6] = [90, 67, 66, 81, 69, 84];

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for mode in SynthMode::ALL {
            let mut engine = SynthEngine::new(EngineConfig::default()).unwrap();
            engine.set_synth_mode(mode);
            for key in CHORD {
                engine.key_down(key);
            }

            group.bench_with_input(
                BenchmarkId::new(format!("chord_{}", mode.name()), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.render_block(black_box(&mut buffer));
                    })
                },
            );
        }

        // Arpeggiator splits blocks at tick boundaries
        let mut engine = SynthEngine::new(EngineConfig::default()).unwrap();
        engine.set_arpeggiator(true);
        for key in CHORD {
            engine.key_down(key);
        }
        group.bench_with_input(BenchmarkId::new("arpeggio", size), &size, |b, _| {
            b.iter(|| {
                engine.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
