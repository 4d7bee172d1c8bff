const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Nearest equal-tempered note for display, e.g. `220.0 -> "A3"`.
pub fn note_name(hz: f32) -> Option<String> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    let midi = (69.0 + 12.0 * (hz / 440.0).log2()).round() as i32;
    if !(0..=127).contains(&midi) {
        return None;
    }
    let name = NOTE_NAMES[(midi % 12) as usize];
    let octave = midi / 12 - 1;
    Some(format!("{name}{octave}"))
}
