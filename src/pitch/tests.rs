use super::estimator::peak_bin;
use super::{
    note_name, zone_for_position, FrequencyEstimator, FrequencySmoother, PitchWindow,
    SpectrumFrame, Zone, ZoneMapper,
};

const MIN_MAGNITUDE: f32 = 80.0;

fn window() -> PitchWindow {
    PitchWindow::new(80.0, 350.0)
}

/// 1024 bins at 2048 Hz sample rate, so bin `i` sits exactly at `i` Hz.
fn frame_with_peak(bin: usize, magnitude: f32) -> SpectrumFrame {
    let mut magnitudes = vec![0.0f32; 1024];
    magnitudes[bin] = magnitude;
    SpectrumFrame::new(magnitudes, 2048)
}

#[test]
fn bin_to_hz_is_linear_in_nyquist() {
    let frame = SpectrumFrame::new(vec![0.0; 1024], 48_000);
    assert!((frame.hz_per_bin() - 23.4375).abs() < 1e-4);
    assert!((frame.bin_to_hz(4) - 93.75).abs() < 1e-4);
}

#[test]
fn estimator_accepts_loud_in_range_peak() {
    let estimator = FrequencyEstimator::new(window(), MIN_MAGNITUDE);
    assert_eq!(estimator.estimate(&frame_with_peak(220, 200.0)), Some(220.0));
}

#[test]
fn estimator_rejects_magnitudes_at_or_below_floor() {
    let estimator = FrequencyEstimator::new(window(), MIN_MAGNITUDE);
    for bin in [80usize, 150, 220, 350] {
        for magnitude in [0.0f32, 1.0, 79.9, 80.0] {
            assert_eq!(
                estimator.estimate(&frame_with_peak(bin, magnitude)),
                None,
                "bin {bin} magnitude {magnitude}"
            );
        }
    }
}

#[test]
fn estimator_rejects_frequencies_outside_window() {
    let estimator = FrequencyEstimator::new(window(), MIN_MAGNITUDE);
    for bin in [1usize, 40, 79, 351, 500, 1023] {
        assert_eq!(estimator.estimate(&frame_with_peak(bin, 255.0)), None, "bin {bin}");
    }
    assert_eq!(estimator.estimate(&frame_with_peak(80, 255.0)), Some(80.0));
    assert_eq!(estimator.estimate(&frame_with_peak(350, 255.0)), Some(350.0));
}

#[test]
fn estimator_treats_empty_frame_as_no_signal() {
    let estimator = FrequencyEstimator::new(window(), MIN_MAGNITUDE);
    assert_eq!(estimator.estimate(&SpectrumFrame::new(Vec::new(), 48_000)), None);
}

#[test]
fn estimator_skips_non_finite_bins() {
    let estimator = FrequencyEstimator::new(window(), MIN_MAGNITUDE);
    let mut frame = frame_with_peak(200, 120.0);
    let mut magnitudes = frame.magnitudes().to_vec();
    magnitudes[10] = f32::NAN;
    magnitudes[11] = f32::INFINITY;
    frame = SpectrumFrame::new(magnitudes, frame.sample_rate());
    assert_eq!(estimator.estimate(&frame), Some(200.0));
}

#[test]
fn peak_bin_prefers_first_on_ties() {
    assert_eq!(peak_bin(&[1.0, 5.0, 3.0, 5.0]), Some((1, 5.0)));
    assert_eq!(peak_bin(&[]), None);
}

#[test]
fn smoother_is_empty_until_first_sample() {
    let smoother = FrequencySmoother::new(8);
    assert!(smoother.is_empty());
    assert_eq!(smoother.current(), None);
}

#[test]
fn smoother_weights_newest_sample_heaviest() {
    let mut smoother = FrequencySmoother::new(8);
    smoother.push(Some(100.0));
    let out = smoother.push(Some(200.0)).unwrap();
    // (1*100 + 2*200) / 3
    assert!((out - 166.666_67).abs() < 1e-3, "got {out}");
}

#[test]
fn smoother_converges_to_constant_input() {
    let mut smoother = FrequencySmoother::new(8);
    smoother.push(Some(120.0));
    smoother.push(None);
    smoother.push(Some(330.0));
    let mut out = None;
    for _ in 0..8 {
        out = smoother.push(Some(261.63));
    }
    assert_eq!(smoother.len(), 8);
    let out = out.unwrap();
    assert!((out - 261.63).abs() < 1e-3, "got {out}");
}

#[test]
fn smoother_drops_oldest_sample_beyond_capacity() {
    let mut smoother = FrequencySmoother::new(8);
    smoother.push(Some(1_000.0));
    for _ in 0..8 {
        smoother.push(Some(200.0));
    }
    assert_eq!(smoother.len(), 8);
    assert_eq!(smoother.current(), Some(200.0));
}

#[test]
fn smoother_counts_silence_as_zero() {
    let mut smoother = FrequencySmoother::new(8);
    for _ in 0..7 {
        smoother.push(Some(300.0));
    }
    let out = smoother.push(None).unwrap();
    // weights 1..=7 carry 300 Hz, weight 8 carries 0 Hz: 300 * 28 / 36
    assert!((out - 233.333_33).abs() < 1e-3, "got {out}");
}

#[test]
fn smoother_reports_no_signal_for_silent_window() {
    let mut smoother = FrequencySmoother::new(4);
    assert_eq!(smoother.push(None), None);
    assert_eq!(smoother.push(None), None);
}

#[test]
fn zone_boundaries_are_exact() {
    assert_eq!(zone_for_position(0.0), Zone::Low);
    assert_eq!(zone_for_position(24.999), Zone::Low);
    assert_eq!(zone_for_position(25.0), Zone::Mid);
    assert_eq!(zone_for_position(49.999), Zone::Mid);
    assert_eq!(zone_for_position(50.0), Zone::High);
    assert_eq!(zone_for_position(74.999), Zone::High);
    assert_eq!(zone_for_position(75.0), Zone::Submit);
    assert_eq!(zone_for_position(100.0), Zone::Submit);
}

#[test]
fn zone_mapper_uses_window_quartiles() {
    let mapper = ZoneMapper::new(window());
    assert_eq!(mapper.map(147.4), Zone::Low);
    assert_eq!(mapper.map(147.5), Zone::Mid);
    assert_eq!(mapper.map(215.0), Zone::High);
    assert_eq!(mapper.map(282.5), Zone::Submit);
}

#[test]
fn zone_mapper_clamps_outside_window() {
    let mapper = ZoneMapper::new(window());
    assert_eq!(mapper.position_percent(20.0), 0.0);
    assert_eq!(mapper.position_percent(900.0), 100.0);
    assert_eq!(mapper.map(20.0), Zone::Low);
    assert_eq!(mapper.map(900.0), Zone::Submit);
}

#[test]
fn note_names_follow_equal_temperament() {
    assert_eq!(note_name(440.0).as_deref(), Some("A4"));
    assert_eq!(note_name(261.63).as_deref(), Some("C4"));
    assert_eq!(note_name(0.0), None);
}
