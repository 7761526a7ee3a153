use crate::error::{PluckError, Result};
use crate::interaction::HandPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PluckConfig {
    pub source: SourceConfig,
    pub classifier: ClassifierConfig,
    pub detector: DetectorConfig,
    pub interaction: InteractionConfig,
    pub object: ObjectConfig,
    pub logging: LoggingConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    /// Where landmark frames come from
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,

    /// JSON-lines recording used by the replay source
    #[serde(default)]
    pub replay_path: Option<String>,

    /// Tick rate of the interaction loop (frames per second)
    #[serde(default = "default_source_fps")]
    pub fps: u32,

    /// Detections below this confidence are treated as absent
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Landmarks come from a horizontally flipped (selfie) image
    #[serde(default = "default_mirrored")]
    pub mirrored: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Replay a recorded landmark stream
    Replay,
    /// Built-in scripted demonstration
    Demo,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Thumb-tip to index-tip distance below which the hand pinches
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,

    /// Tip-to-MCP length, relative to hand size, above which a finger counts as extended
    #[serde(default = "default_extension_ratio")]
    pub extension_ratio: f32,

    /// Require the palm to face the camera for an open hand
    #[serde(default = "default_require_palm_facing")]
    pub require_palm_facing: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Rolling history length per hand (K)
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Consecutive frames a pose must hold to be confirmed (M)
    #[serde(default = "default_confirm_frames")]
    pub confirm_frames: usize,

    /// Consecutive absent frames before the hand is considered gone (G)
    #[serde(default = "default_grace_frames")]
    pub grace_frames: usize,

    /// Moving-average window applied to the depth proxy
    #[serde(default = "default_depth_smoothing_window")]
    pub depth_smoothing_window: usize,

    /// Depth proxy increase over the anchor that counts as a pull
    #[serde(default = "default_pull_threshold")]
    pub pull_threshold: f32,

    /// Depth proxy increase that maps to a full (1.0) pull
    #[serde(default = "default_pull_range")]
    pub pull_range: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InteractionConfig {
    /// How events from several tracked hands are arbitrated
    #[serde(default = "default_hand_policy")]
    pub policy: HandPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ObjectConfig {
    /// Resting position of the object (normalized screen coordinates)
    #[serde(default = "default_anchor")]
    pub anchor: (f32, f32),

    /// Offset applied at full pull depth while attracted
    #[serde(default = "default_attract_offset")]
    pub attract_offset: (f32, f32),

    #[serde(default = "default_base_scale")]
    pub base_scale: f32,

    #[serde(default = "default_min_scale")]
    pub min_scale: f32,

    #[serde(default = "default_max_scale")]
    pub max_scale: f32,

    /// Scale reached at full pull depth
    #[serde(default = "default_attracted_scale")]
    pub attracted_scale: f32,

    /// Scale while held in the hand
    #[serde(default = "default_grabbed_scale")]
    pub grabbed_scale: f32,

    #[serde(default = "default_idle_opacity")]
    pub idle_opacity: f32,

    #[serde(default = "default_responding_opacity")]
    pub responding_opacity: f32,

    /// Fraction of the remaining distance covered per reference frame, in (0, 1)
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,

    /// Frame rate at which `smoothing` applies unscaled
    #[serde(default = "default_reference_fps")]
    pub reference_fps: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Directory for rolling log files (stdout only when unset)
    #[serde(default)]
    pub directory: Option<String>,

    /// Log file name prefix
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Ticks between statistics log lines (0 disables)
    #[serde(default = "default_stats_interval_ticks")]
    pub stats_interval_ticks: u64,
}

impl PluckConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from_file("pluck.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("source.kind", "demo")?
            .set_default("source.fps", default_source_fps())?
            .set_default("source.min_confidence", default_min_confidence() as f64)?
            .set_default("source.mirrored", default_mirrored())?
            .set_default(
                "classifier.pinch_threshold",
                default_pinch_threshold() as f64,
            )?
            .set_default(
                "classifier.extension_ratio",
                default_extension_ratio() as f64,
            )?
            .set_default(
                "classifier.require_palm_facing",
                default_require_palm_facing(),
            )?
            .set_default("detector.history_len", default_history_len() as i64)?
            .set_default("detector.confirm_frames", default_confirm_frames() as i64)?
            .set_default("detector.grace_frames", default_grace_frames() as i64)?
            .set_default(
                "detector.depth_smoothing_window",
                default_depth_smoothing_window() as i64,
            )?
            .set_default("detector.pull_threshold", default_pull_threshold() as f64)?
            .set_default("detector.pull_range", default_pull_range() as f64)?
            .set_default("interaction.policy", "first_active")?
            .set_default(
                "object.anchor",
                vec![default_anchor().0 as f64, default_anchor().1 as f64],
            )?
            .set_default(
                "object.attract_offset",
                vec![
                    default_attract_offset().0 as f64,
                    default_attract_offset().1 as f64,
                ],
            )?
            .set_default("object.base_scale", default_base_scale() as f64)?
            .set_default("object.min_scale", default_min_scale() as f64)?
            .set_default("object.max_scale", default_max_scale() as f64)?
            .set_default("object.attracted_scale", default_attracted_scale() as f64)?
            .set_default("object.grabbed_scale", default_grabbed_scale() as f64)?
            .set_default("object.idle_opacity", default_idle_opacity() as f64)?
            .set_default(
                "object.responding_opacity",
                default_responding_opacity() as f64,
            )?
            .set_default("object.smoothing", default_smoothing() as f64)?
            .set_default("object.reference_fps", default_reference_fps() as f64)?
            .set_default("logging.file_prefix", default_log_file_prefix())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .set_default(
                "system.stats_interval_ticks",
                default_stats_interval_ticks() as i64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Environment variables, e.g. PLUCK__DETECTOR__CONFIRM_FRAMES=3
            .add_source(
                Environment::with_prefix("PLUCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: PluckConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values. Must pass before the tick loop starts.
    pub fn validate(&self) -> Result<()> {
        let source = &self.source;
        if source.fps == 0 {
            return Err(PluckError::invalid_config(
                "source.fps",
                "must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&source.min_confidence) {
            return Err(PluckError::invalid_config(
                "source.min_confidence",
                "must be within [0, 1]",
            ));
        }
        if source.kind == SourceKind::Replay && source.replay_path.is_none() {
            return Err(PluckError::invalid_config(
                "source.replay_path",
                "required when source.kind = \"replay\"",
            ));
        }

        let classifier = &self.classifier;
        if !(classifier.pinch_threshold > 0.0) {
            return Err(PluckError::invalid_config(
                "classifier.pinch_threshold",
                "must be greater than 0",
            ));
        }
        if !(classifier.extension_ratio > 0.0) {
            return Err(PluckError::invalid_config(
                "classifier.extension_ratio",
                "must be greater than 0",
            ));
        }

        let detector = &self.detector;
        if detector.confirm_frames == 0 {
            return Err(PluckError::invalid_config(
                "detector.confirm_frames",
                "must be at least 1",
            ));
        }
        if detector.confirm_frames > detector.history_len {
            return Err(PluckError::invalid_config(
                "detector.confirm_frames",
                format!(
                    "{} exceeds history_len {}",
                    detector.confirm_frames, detector.history_len
                ),
            ));
        }
        if detector.grace_frames < detector.confirm_frames {
            return Err(PluckError::invalid_config(
                "detector.grace_frames",
                format!(
                    "{} is shorter than confirm_frames {}",
                    detector.grace_frames, detector.confirm_frames
                ),
            ));
        }
        if detector.depth_smoothing_window == 0 {
            return Err(PluckError::invalid_config(
                "detector.depth_smoothing_window",
                "must be at least 1",
            ));
        }
        if !(detector.pull_threshold > 0.0) {
            return Err(PluckError::invalid_config(
                "detector.pull_threshold",
                "must be greater than 0",
            ));
        }
        if !(detector.pull_range > detector.pull_threshold) {
            return Err(PluckError::invalid_config(
                "detector.pull_range",
                "must be greater than pull_threshold",
            ));
        }

        let object = &self.object;
        if !(object.smoothing > 0.0 && object.smoothing < 1.0) {
            return Err(PluckError::invalid_config(
                "object.smoothing",
                format!("{} is outside (0, 1)", object.smoothing),
            ));
        }
        if !(object.reference_fps > 0.0) {
            return Err(PluckError::invalid_config(
                "object.reference_fps",
                "must be greater than 0",
            ));
        }
        if !(object.min_scale > 0.0 && object.min_scale <= object.max_scale) {
            return Err(PluckError::invalid_config(
                "object.min_scale",
                "must be positive and not above max_scale",
            ));
        }
        let scale_range = object.min_scale..=object.max_scale;
        for (field, value) in [
            ("object.base_scale", object.base_scale),
            ("object.attracted_scale", object.attracted_scale),
            ("object.grabbed_scale", object.grabbed_scale),
        ] {
            if !scale_range.contains(&value) {
                return Err(PluckError::invalid_config(
                    field,
                    format!(
                        "{} is outside [{}, {}]",
                        value, object.min_scale, object.max_scale
                    ),
                ));
            }
        }
        for (field, value) in [
            ("object.idle_opacity", object.idle_opacity),
            ("object.responding_opacity", object.responding_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PluckError::invalid_config(field, "must be within [0, 1]"));
            }
        }

        if self.system.event_bus_capacity == 0 {
            return Err(PluckError::invalid_config(
                "system.event_bus_capacity",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Interval between ticks of the interaction loop
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.source.fps.max(1) as f64)
    }
}

impl Default for PluckConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                kind: default_source_kind(),
                replay_path: None,
                fps: default_source_fps(),
                min_confidence: default_min_confidence(),
                mirrored: default_mirrored(),
            },
            classifier: ClassifierConfig {
                pinch_threshold: default_pinch_threshold(),
                extension_ratio: default_extension_ratio(),
                require_palm_facing: default_require_palm_facing(),
            },
            detector: DetectorConfig {
                history_len: default_history_len(),
                confirm_frames: default_confirm_frames(),
                grace_frames: default_grace_frames(),
                depth_smoothing_window: default_depth_smoothing_window(),
                pull_threshold: default_pull_threshold(),
                pull_range: default_pull_range(),
            },
            interaction: InteractionConfig {
                policy: default_hand_policy(),
            },
            object: ObjectConfig {
                anchor: default_anchor(),
                attract_offset: default_attract_offset(),
                base_scale: default_base_scale(),
                min_scale: default_min_scale(),
                max_scale: default_max_scale(),
                attracted_scale: default_attracted_scale(),
                grabbed_scale: default_grabbed_scale(),
                idle_opacity: default_idle_opacity(),
                responding_opacity: default_responding_opacity(),
                smoothing: default_smoothing(),
                reference_fps: default_reference_fps(),
            },
            logging: LoggingConfig {
                directory: None,
                file_prefix: default_log_file_prefix(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
                stats_interval_ticks: default_stats_interval_ticks(),
            },
        }
    }
}

// Default value functions
fn default_source_kind() -> SourceKind {
    SourceKind::Demo
}
fn default_source_fps() -> u32 {
    30
}
fn default_min_confidence() -> f32 {
    0.7
}
fn default_mirrored() -> bool {
    true
}

fn default_pinch_threshold() -> f32 {
    0.06
}
fn default_extension_ratio() -> f32 {
    0.55
}
fn default_require_palm_facing() -> bool {
    true
}

fn default_history_len() -> usize {
    8
}
fn default_confirm_frames() -> usize {
    2
}
fn default_grace_frames() -> usize {
    15
}
fn default_depth_smoothing_window() -> usize {
    6
}
fn default_pull_threshold() -> f32 {
    0.02
}
fn default_pull_range() -> f32 {
    0.12
}

fn default_hand_policy() -> HandPolicy {
    HandPolicy::FirstActive
}

fn default_anchor() -> (f32, f32) {
    (0.5, 0.5)
}
fn default_attract_offset() -> (f32, f32) {
    (0.0, 0.08)
}
fn default_base_scale() -> f32 {
    0.6
}
fn default_min_scale() -> f32 {
    0.3
}
fn default_max_scale() -> f32 {
    2.5
}
fn default_attracted_scale() -> f32 {
    1.2
}
fn default_grabbed_scale() -> f32 {
    0.9
}
fn default_idle_opacity() -> f32 {
    0.6
}
fn default_responding_opacity() -> f32 {
    1.0
}
fn default_smoothing() -> f32 {
    0.15
}
fn default_reference_fps() -> f32 {
    30.0
}

fn default_log_file_prefix() -> String {
    "pluck.log".to_string()
}

fn default_event_bus_capacity() -> usize {
    100
}
fn default_stats_interval_ticks() -> u64 {
    300
}
