use super::PitchWindow;
use serde::Serialize;

/// Quartile of the pitch window the smoothed frequency falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Low,
    Mid,
    High,
    Submit,
}

impl Zone {
    pub fn label(self) -> &'static str {
        match self {
            Zone::Low => "low",
            Zone::Mid => "mid",
            Zone::High => "high",
            Zone::Submit => "submit",
        }
    }

    pub fn is_navigation(self) -> bool {
        !matches!(self, Zone::Submit)
    }
}

/// Maps a percentage position (`0..=100`) onto a zone.
pub fn zone_for_position(percent: f32) -> Zone {
    if percent < 25.0 {
        Zone::Low
    } else if percent < 50.0 {
        Zone::Mid
    } else if percent < 75.0 {
        Zone::High
    } else {
        Zone::Submit
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ZoneMapper {
    window: PitchWindow,
}

impl ZoneMapper {
    pub fn new(window: PitchWindow) -> Self {
        Self { window }
    }

    pub fn position_percent(&self, hz: f32) -> f32 {
        self.window.position_percent(hz)
    }

    pub fn map(&self, hz: f32) -> Zone {
        zone_for_position(self.position_percent(hz))
    }
}
