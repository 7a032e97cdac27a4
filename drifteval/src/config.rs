use crate::source::DateRange;
use crate::Error;

use serde::{Deserialize, Serialize};

/// what to do with a drift segment that has too few rows for a line fit
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// leave the segment out, its samples stay uncorrected and are dropped
    #[default]
    Skip,
    /// abort the correction
    Fail,
}

/// drift segmentation settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Drift {
    /// minimum change of the drift between two rows to count as a clock jump, unit: seconds
    #[serde(default = "Drift::default_jump_limit")]
    pub jump_limit: f64,
    #[serde(default)]
    pub degenerate: DegeneratePolicy,
}

impl Drift {
    fn default_jump_limit() -> f64 {
        2.0
    }
}

impl Default for Drift {
    fn default() -> Self {
        Self {
            jump_limit: Self::default_jump_limit(),
            degenerate: DegeneratePolicy::default(),
        }
    }
}

/// driving interval extraction settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Driving {
    /// speeds with a magnitude up to this count as stationary, unit: m/s
    #[serde(default = "Driving::default_stationary_speed")]
    pub stationary_speed: f64,
    /// speed intervals this short or shorter are noise, unit: seconds
    #[serde(default = "Driving::default_speed_noise_window")]
    pub speed_noise_window: f64,
    /// detector latency allowance before each motion start, unit: seconds
    #[serde(default = "Driving::default_buffer_time")]
    pub buffer_time: f64,
    /// motion label of a parked vehicle, every other label means driving
    #[serde(default = "Driving::default_stationary_label")]
    pub stationary_label: String,
}

impl Driving {
    fn default_stationary_speed() -> f64 {
        0.5
    }

    fn default_speed_noise_window() -> f64 {
        0.5
    }

    fn default_buffer_time() -> f64 {
        30.0
    }

    fn default_stationary_label() -> String {
        "stationary".to_string()
    }
}

impl Default for Driving {
    fn default() -> Self {
        Self {
            stationary_speed: Self::default_stationary_speed(),
            speed_noise_window: Self::default_speed_noise_window(),
            buffer_time: Self::default_buffer_time(),
            stationary_label: Self::default_stationary_label(),
        }
    }
}

/// where to read the recordings from
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Data {
    /// directory of the file based data source, relative to the config file
    #[serde(default = "Data::default_root")]
    pub root: std::path::PathBuf,
    /// first day to evaluate, required
    pub start: chrono::NaiveDate,
    /// last day to evaluate, defaults to `start`
    #[serde(default)]
    pub end: Option<chrono::NaiveDate>,
    /// the trace is fetched with this many extra days on both sides
    #[serde(default = "Data::default_trace_margin_days")]
    pub trace_margin_days: u32,
}

impl Data {
    fn default_root() -> std::path::PathBuf {
        std::path::PathBuf::from("data")
    }

    fn default_trace_margin_days() -> u32 {
        1
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start, self.end.unwrap_or(self.start))
    }
}

/// global configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub data: Data,
    #[serde(default)]
    pub drift: Drift,
    #[serde(default)]
    pub driving: Driving,
}

/// parse a config, unknown keys are reported and rejected
pub fn parse(buffer: &str) -> Result<Config, Error> {
    let value: toml::Value = toml::from_str(buffer)?;
    let mut has_unsupported: bool = false;
    let cfg: Config = serde_ignored::deserialize(value, |path| {
        log::error!("unsupported config: {}", path);
        has_unsupported = true;
    })?;
    if has_unsupported {
        return Err(Error::UnsupportedConfigs);
    }

    Ok(cfg)
}

/// load config file
pub fn load<P: AsRef<std::path::Path>>(filename: P) -> Result<Config, Error> {
    let cfgdir = filename
        .as_ref()
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));

    let buffer = std::fs::read_to_string(filename.as_ref())?;
    let mut cfg = parse(&buffer)?;

    // make all paths absolute
    cfg.data.root = cfgdir.join(&cfg.data.root);

    Ok(cfg)
}
