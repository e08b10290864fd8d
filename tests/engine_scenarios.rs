use keysynth::{
    dsp::envelope::EnvelopeStage,
    synth::{voice::Timbre, ModParam, SynthMode},
    EngineConfig, SynthEngine,
};

const SR: f64 = 48_000.0;

fn engine() -> SynthEngine {
    SynthEngine::new(EngineConfig::default()).unwrap()
}

/// Render until the clock reaches `time`, returning the rendered audio.
fn render_until(engine: &mut SynthEngine, time: f64) -> Vec<f32> {
    let target = (time * SR).round() as u64;
    let frames = target.saturating_sub(engine.frames()) as usize;
    let mut out = vec![0.0f32; frames];
    engine.render_block(&mut out);
    out
}

fn close(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn basic_note_follows_adsr_and_stops() {
    let mut engine = engine();
    engine.key_down(90);

    let voice = engine.registry().voice_for_key(90).unwrap();
    assert!(close(voice.base_frequency(), 261.63, 0.01));
    assert_eq!(voice.mode(), SynthMode::Basic);
    match voice.timbre() {
        Timbre::Basic(osc) => assert!(close(osc.frequency(), 261.63, 0.01)),
        _ => panic!("expected a single oscillator"),
    }

    // 0.001 → 0.2 over 20 ms, then 0.2 → 0.1 over 100 ms
    assert!(close(voice.gain_at(0.0), 0.001, 1e-6));
    assert!(close(voice.gain_at(0.02), 0.2, 1e-5));
    assert!(close(voice.gain_at(0.12), 0.1, 1e-5));
    assert_eq!(voice.stage_at(0.01), EnvelopeStage::Attack);
    assert_eq!(voice.stage_at(0.05), EnvelopeStage::Decay);
    assert_eq!(voice.stage_at(0.3), EnvelopeStage::Sustain);

    let held = render_until(&mut engine, 0.5);
    assert!(held.iter().any(|s| s.abs() > 0.01));

    engine.key_up(90);
    assert!(!engine.registry().is_sounding(90));
    let fading = &engine.registry().live_voices()[0];
    assert_eq!(fading.stop_time(), Some(0.75));
    assert!(close(fading.gain_at(0.5), 0.1, 1e-5));
    assert!(close(fading.gain_at(0.75), 0.001, 1e-6));

    render_until(&mut engine, 0.76);
    assert_eq!(engine.registry().live_count(), 0);
    let tail = render_until(&mut engine, 0.8);
    assert!(tail.iter().all(|&s| s == 0.0));
}

#[test]
fn arpeggiator_alternates_two_held_keys() {
    let mut engine = engine();
    engine.set_arpeggiator(true);
    engine.key_down(90);
    render_until(&mut engine, 0.01);
    engine.key_down(83);

    // Nothing sounds before the first tick
    render_until(&mut engine, 0.149);
    assert_eq!(engine.registry().live_count(), 0);

    render_until(&mut engine, 0.16);
    assert_eq!(engine.arpeggiator().current(), Some(90));
    assert!(engine.registry().is_sounding(90));

    render_until(&mut engine, 0.31);
    assert_eq!(engine.arpeggiator().current(), Some(83));
    assert!(!engine.registry().is_sounding(90));
    assert_eq!(engine.registry().active_count(), 1);

    render_until(&mut engine, 0.46);
    assert_eq!(engine.arpeggiator().current(), Some(90));
    assert!(!engine.registry().is_sounding(83));

    // The first '90' voice stopped at 0.30 + 0.25; the new one is still keyed
    render_until(&mut engine, 0.56);
    let nineties: Vec<_> = engine
        .registry()
        .live_voices()
        .iter()
        .filter(|v| v.key() == 90)
        .collect();
    assert_eq!(nineties.len(), 1);
    assert!((nineties[0].started_at() - 0.45).abs() < 1e-9);
}

#[test]
fn arpeggiator_cycles_three_keys_in_press_order() {
    let mut engine = engine();
    engine.set_arpeggiator(true);
    for key in [90, 83, 88] {
        engine.key_down(key);
    }

    let mut order = Vec::new();
    for step in 1..=6 {
        render_until(&mut engine, step as f64 * 0.15 + 0.001);
        order.extend(engine.arpeggiator().current());
    }
    assert_eq!(order, vec![90, 83, 88, 90, 83, 88]);
}

#[test]
fn enabling_arpeggiator_without_keys_stays_silent() {
    let mut engine = engine();
    engine.set_arpeggiator(true);
    assert!(!engine.arpeggiator().is_running());

    let out = render_until(&mut engine, 1.0);
    assert_eq!(engine.registry().live_count(), 0);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn brightness_reaches_every_active_additive_voice() {
    let mut engine = engine();
    engine.set_synth_mode(SynthMode::Additive);
    engine.key_down(90);
    engine.key_down(83);
    engine.set_synth_mode(SynthMode::Basic);
    engine.key_down(88);

    let updated = engine.set_parameter(ModParam::Brightness, 2.0);
    assert_eq!(updated, 2);

    for key in [90, 83] {
        let voice = engine.registry().voice_for_key(key).unwrap();
        let Timbre::Additive(bank) = voice.timbre() else {
            panic!("expected additive timbre");
        };
        let levels: Vec<f32> = bank.partials.iter().map(|p| p.osc.level()).collect();
        assert!(close(levels[0], 0.6, 1e-6));
        assert!(close(levels[1], 0.5, 1e-6));
        assert!(close(levels[2], 0.3, 1e-6));
    }
    // Voices created later read the new value
    engine.set_synth_mode(SynthMode::Additive);
    engine.key_down(68);
    let voice = engine.registry().voice_for_key(68).unwrap();
    assert_eq!(voice.live_parameter(ModParam::Brightness), Some(2.0));
}

#[test]
fn released_voices_keep_their_parameters() {
    let mut engine = engine();
    engine.set_synth_mode(SynthMode::Fm);
    engine.key_down(90);
    engine.key_up(90);

    assert_eq!(engine.set_parameter(ModParam::FmRatio, 4.0), 0);
    let fading = &engine.registry().live_voices()[0];
    assert_eq!(fading.live_parameter(ModParam::FmRatio), Some(2.0));
}

#[test]
fn release_mid_attack_starts_from_current_gain() {
    let mut engine = engine();
    engine.key_down(90);
    render_until(&mut engine, 0.005);
    engine.key_up(90);

    let voice = &engine.registry().live_voices()[0];
    // 0.001 · 200^(5/20)
    let expected = 0.001 * 200f32.powf(0.25);
    let at_release = voice.gain_at(0.005);
    assert!(close(at_release, expected, 1e-5), "gain {at_release}");
    assert_eq!(voice.stage_at(0.006), EnvelopeStage::Release);

    let mut previous = at_release;
    for step in 1..=25 {
        let gain = voice.gain_at(0.005 + step as f64 * 0.01);
        assert!(gain <= previous + 1e-7);
        previous = gain;
    }
    assert!(close(previous, 0.001, 1e-6));
}

#[test]
fn redundant_key_up_changes_nothing() {
    let mut engine = engine();
    engine.key_up(90);
    assert!(engine.held_keys().is_empty());
    assert_eq!(engine.registry().live_count(), 0);

    engine.key_down(83);
    engine.key_up(90);
    assert_eq!(engine.held_keys().as_slice(), &[83]);
    assert!(engine.registry().is_sounding(83));
}

#[test]
fn rapid_repress_overlaps_fading_voice() {
    let mut engine = engine();
    engine.key_down(90);
    render_until(&mut engine, 0.2);
    engine.key_up(90);
    render_until(&mut engine, 0.25);
    engine.key_down(90);

    assert_eq!(engine.registry().live_count(), 2);
    assert_eq!(engine.registry().active_count(), 1);

    render_until(&mut engine, 0.46);
    assert_eq!(engine.registry().live_count(), 1);
    assert!(engine.registry().is_sounding(90));
}

#[test]
fn disabling_arpeggiator_leaves_held_keys_silent() {
    let mut engine = engine();
    engine.set_arpeggiator(true);
    engine.key_down(90);
    render_until(&mut engine, 0.2);
    assert!(engine.registry().is_sounding(90));

    engine.set_arpeggiator(false);
    assert_eq!(engine.registry().active_count(), 0);
    assert!(!engine.arpeggiator().is_running());

    // Still held; a new key plays directly
    engine.key_down(83);
    assert!(engine.registry().is_sounding(83));
    assert!(!engine.registry().is_sounding(90));
}
