use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::detectors::traits::DetectorKind;

/// Baseline strictness: a multiplier of exactly 1.0.
pub const BASELINE_STRICTNESS: u8 = 7;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiTheme {
    Day,
    Night,
    Haunted,
}

impl UiTheme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Some(UiTheme::Day),
            "night" => Some(UiTheme::Night),
            "haunted" => Some(UiTheme::Haunted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UiTheme::Day => "day",
            UiTheme::Night => "night",
            UiTheme::Haunted => "haunted",
        }
    }
}

/// Which detectors run. Missing keys in persisted JSON default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveAgents {
    pub spam_detector: bool,
    pub deepfake_detector: bool,
    pub toxicity_detector: bool,
    pub scam_detector: bool,
}

impl Default for ActiveAgents {
    fn default() -> Self {
        Self {
            spam_detector: true,
            deepfake_detector: true,
            toxicity_detector: true,
            scam_detector: true,
        }
    }
}

impl ActiveAgents {
    pub fn is_active(&self, kind: DetectorKind) -> bool {
        match kind {
            DetectorKind::Spam => self.spam_detector,
            DetectorKind::Deepfake => self.deepfake_detector,
            DetectorKind::Toxicity => self.toxicity_detector,
            DetectorKind::Scam => self.scam_detector,
        }
    }

    pub fn set(&mut self, kind: DetectorKind, active: bool) {
        match kind {
            DetectorKind::Spam => self.spam_detector = active,
            DetectorKind::Deepfake => self.deepfake_detector = active,
            DetectorKind::Toxicity => self.toxicity_detector = active,
            DetectorKind::Scam => self.scam_detector = active,
        }
    }
}

/// User-tunable detection settings.
///
/// Persisted as JSON. Stored records are loaded through [`from_stored`],
/// which merges field by field over the defaults, so older, partial or
/// partly invalid records still load.
///
/// [`from_stored`]: SteeringConfig::from_stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// 1-10, 7 is neutral
    pub detection_strictness: u8,
    /// 1-10, only consumed by display layers
    pub visual_haunting: u8,
    pub active_agents: ActiveAgents,
    pub ui_theme: UiTheme,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            detection_strictness: BASELINE_STRICTNESS,
            visual_haunting: 8,
            active_agents: ActiveAgents::default(),
            ui_theme: UiTheme::Haunted,
        }
    }
}

impl SteeringConfig {
    /// Confidence multiplier: strictness / 7.
    pub fn strictness_multiplier(&self) -> f64 {
        f64::from(self.detection_strictness) / f64::from(BASELINE_STRICTNESS)
    }

    /// Effect-intensity multiplier for display layers: visual_haunting / 5.
    pub fn haunting_multiplier(&self) -> f64 {
        f64::from(self.visual_haunting) / 5.0
    }

    pub fn is_agent_active(&self, kind: DetectorKind) -> bool {
        self.active_agents.is_active(kind)
    }

    /// Merge a persisted record over the defaults one field at a time.
    ///
    /// Levels are read as integers and clamped into 1-10. A field with the
    /// wrong shape (or an unknown theme) keeps its default and is reported
    /// by name in the returned list.
    pub fn from_stored(stored: &Value) -> (Self, Vec<&'static str>) {
        let mut config = Self::default();
        let mut rejected = Vec::new();

        match stored.get("detection_strictness").map(stored_level) {
            Some(Some(level)) => config.detection_strictness = level,
            Some(None) => rejected.push("detection_strictness"),
            None => {}
        }
        match stored.get("visual_haunting").map(stored_level) {
            Some(Some(level)) => config.visual_haunting = level,
            Some(None) => rejected.push("visual_haunting"),
            None => {}
        }

        match stored.get("active_agents") {
            Some(Value::Object(agents)) => {
                for (key, kind) in AGENT_KEYS {
                    match agents.get(key).map(Value::as_bool) {
                        Some(Some(active)) => config.active_agents.set(kind, active),
                        Some(None) => rejected.push(key),
                        None => {}
                    }
                }
            }
            Some(_) => rejected.push("active_agents"),
            None => {}
        }

        match stored.get("ui_theme").map(|v| v.as_str().and_then(UiTheme::parse)) {
            Some(Some(theme)) => config.ui_theme = theme,
            Some(None) => rejected.push("ui_theme"),
            None => {}
        }

        (config, rejected)
    }

    /// Pull both 1-10 levels back into range.
    pub fn clamped(mut self) -> Self {
        self.detection_strictness = self.detection_strictness.clamp(MIN_LEVEL, MAX_LEVEL);
        self.visual_haunting = self.visual_haunting.clamp(MIN_LEVEL, MAX_LEVEL);
        self
    }

    /// Merge a partial update over this config.
    pub fn merged(&self, update: &SteeringUpdate) -> Self {
        let mut next = self.clone();
        if let Some(s) = update.detection_strictness {
            next.detection_strictness = s;
        }
        if let Some(v) = update.visual_haunting {
            next.visual_haunting = v;
        }
        for (kind, active) in &update.agents {
            next.active_agents.set(*kind, *active);
        }
        if let Some(theme) = update.ui_theme {
            next.ui_theme = theme;
        }
        next.clamped()
    }
}

const AGENT_KEYS: [(&str, DetectorKind); 4] = [
    ("spam_detector", DetectorKind::Spam),
    ("deepfake_detector", DetectorKind::Deepfake),
    ("toxicity_detector", DetectorKind::Toxicity),
    ("scam_detector", DetectorKind::Scam),
];

/// An integer level clamped into 1-10. Fractional values round.
fn stored_level(value: &Value) -> Option<u8> {
    let level = value
        .as_i64()
        .or_else(|| value.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))?;
    let clamped = level.clamp(i64::from(MIN_LEVEL), i64::from(MAX_LEVEL));
    u8::try_from(clamped).ok()
}

/// A partial change to the steering config. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SteeringUpdate {
    pub detection_strictness: Option<u8>,
    pub visual_haunting: Option<u8>,
    pub agents: Vec<(DetectorKind, bool)>,
    pub ui_theme: Option<UiTheme>,
}

impl SteeringUpdate {
    pub fn strictness(mut self, level: u8) -> Self {
        self.detection_strictness = Some(level);
        self
    }

    pub fn haunting(mut self, level: u8) -> Self {
        self.visual_haunting = Some(level);
        self
    }

    pub fn agent(mut self, kind: DetectorKind, active: bool) -> Self {
        self.agents.push((kind, active));
        self
    }

    pub fn theme(mut self, theme: UiTheme) -> Self {
        self.ui_theme = Some(theme);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
