use crate::error::{WandClashError, WcResult};
use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Canonical resample length shared by every normalized stroke.
pub const DEFAULT_RESAMPLE_POINTS: usize = 64;
pub const DEFAULT_ATTACK_THRESHOLD: u32 = 50;
pub const DEFAULT_COUNTER_THRESHOLD: u32 = 52;
pub const DEFAULT_TOTAL_ROUNDS: u32 = 10;
pub const DEFAULT_TURN_SECONDS: u64 = 60;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[command(flatten)]
    #[serde(default)]
    pub recognition: RecognitionParams,
    #[command(flatten)]
    #[serde(default)]
    pub thresholds: MatchThresholds,
    #[command(flatten)]
    #[serde(default)]
    pub rules: DuelRules,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionParams {
    #[arg(long, default_value_t = DEFAULT_RESAMPLE_POINTS)]
    pub resample_points: usize,

    // === SIMILARITY ===
    #[arg(long, default_value_t = 0.9)]
    pub point_tolerance: f32,
    #[arg(long, default_value_t = 0.35)]
    pub line_tolerance: f32,
    // Term weights are relative: the blend divides by their sum, so
    // 0.5/0.3/0.2 and 5/3/2 score identically.
    #[arg(long, default_value_t = 0.5)]
    pub weight_point: f32,
    #[arg(long, default_value_t = 0.3)]
    pub weight_line: f32,
    #[arg(long, default_value_t = 0.2)]
    pub weight_angle: f32,

    // === VALIDITY (normalized space) ===
    #[arg(long, default_value_t = 0.02)]
    pub min_axis_extent: f32,
    #[arg(long, default_value_t = 0.02)]
    pub min_box_area: f32,
    #[arg(long, default_value_t = 0.25)]
    pub min_path_length: f32,

    // Raw input units. Anything smaller is a tap.
    #[arg(long, default_value_t = 10.0)]
    pub min_raw_extent: f32,
}

impl Default for RecognitionParams {
    fn default() -> Self {
        Self {
            resample_points: DEFAULT_RESAMPLE_POINTS,
            point_tolerance: 0.9,
            line_tolerance: 0.35,
            weight_point: 0.5,
            weight_line: 0.3,
            weight_angle: 0.2,
            min_axis_extent: 0.02,
            min_box_area: 0.02,
            min_path_length: 0.25,
            min_raw_extent: 10.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchThresholds {
    /// Minimum accuracy for an attack to be recognized.
    #[arg(long, default_value_t = DEFAULT_ATTACK_THRESHOLD)]
    pub attack_threshold: u32,
    /// Minimum accuracy for a counter to succeed.
    #[arg(long, default_value_t = DEFAULT_COUNTER_THRESHOLD)]
    pub counter_threshold: u32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            attack_threshold: DEFAULT_ATTACK_THRESHOLD,
            counter_threshold: DEFAULT_COUNTER_THRESHOLD,
        }
    }
}

/// Who opens a bonus round.
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BonusAttacker {
    /// Player one attacks first in every bonus round.
    #[default]
    PlayerOne,
    /// Bonus round k is treated as round `total_rounds + 1 + k` for turn order.
    RoundParity,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DuelRules {
    #[arg(long, default_value_t = DEFAULT_TOTAL_ROUNDS)]
    pub total_rounds: u32,
    #[arg(long, default_value_t = DEFAULT_TURN_SECONDS)]
    pub turn_seconds: u64,
    #[arg(long, value_enum, default_value_t = BonusAttacker::PlayerOne)]
    pub bonus_attacker: BonusAttacker,
}

impl Default for DuelRules {
    fn default() -> Self {
        Self {
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            turn_seconds: DEFAULT_TURN_SECONDS,
            bonus_attacker: BonusAttacker::PlayerOne,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WcResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WcResult<()> {
        let r = &self.recognition;
        if r.resample_points < 2 {
            return Err(WandClashError::Config(format!(
                "resample_points must be at least 2 (got {})",
                r.resample_points
            )));
        }
        if r.point_tolerance <= 0.0 || r.line_tolerance <= 0.0 {
            return Err(WandClashError::Config(
                "similarity tolerances must be positive".to_string(),
            ));
        }
        let weights = [r.weight_point, r.weight_line, r.weight_angle];
        if weights.iter().any(|w| *w < 0.0) || weights.iter().sum::<f32>() <= 0.0 {
            return Err(WandClashError::Config(
                "term weights must be non-negative with a positive sum".to_string(),
            ));
        }

        let t = &self.thresholds;
        if t.attack_threshold > 100 || t.counter_threshold > 100 {
            return Err(WandClashError::Config(
                "thresholds are accuracies and cannot exceed 100".to_string(),
            ));
        }

        if self.rules.total_rounds == 0 {
            return Err(WandClashError::Config(
                "total_rounds must be at least 1".to_string(),
            ));
        }
        if self.rules.turn_seconds == 0 {
            return Err(WandClashError::Config(
                "turn_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlays only the flags that were typed on the command line.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        self.recognition.merge_from_cli(&cli.recognition, matches);
        self.thresholds.merge_from_cli(&cli.thresholds, matches);
        self.rules.merge_from_cli(&cli.rules, matches);
    }
}

macro_rules! update_if_present {
    ($target:ident, $source:ident, $matches:ident, $field:ident) => {
        if $matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
            $target.$field = $source.$field.clone();
        }
    };
}

impl RecognitionParams {
    pub fn merge_from_cli(&mut self, cli: &RecognitionParams, matches: &ArgMatches) {
        update_if_present!(self, cli, matches, resample_points);
        update_if_present!(self, cli, matches, point_tolerance);
        update_if_present!(self, cli, matches, line_tolerance);
        update_if_present!(self, cli, matches, weight_point);
        update_if_present!(self, cli, matches, weight_line);
        update_if_present!(self, cli, matches, weight_angle);
        update_if_present!(self, cli, matches, min_axis_extent);
        update_if_present!(self, cli, matches, min_box_area);
        update_if_present!(self, cli, matches, min_path_length);
        update_if_present!(self, cli, matches, min_raw_extent);
    }
}

impl MatchThresholds {
    pub fn merge_from_cli(&mut self, cli: &MatchThresholds, matches: &ArgMatches) {
        update_if_present!(self, cli, matches, attack_threshold);
        update_if_present!(self, cli, matches, counter_threshold);
    }
}

impl DuelRules {
    pub fn merge_from_cli(&mut self, cli: &DuelRules, matches: &ArgMatches) {
        update_if_present!(self, cli, matches, total_rounds);
        update_if_present!(self, cli, matches, turn_seconds);
        update_if_present!(self, cli, matches, bonus_attacker);
    }

    /// Distinct attacks one player may need: their regulation turns plus the
    /// first bonus round. Tied bonus replays free every attack again.
    pub fn attacks_per_player(&self) -> usize {
        self.total_rounds.div_ceil(2) as usize + 1
    }

    pub fn turn_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.turn_seconds)
    }
}
