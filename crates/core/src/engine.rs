//! Pipeline orchestration: reflow, duration floor, then gap cascade.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cue::Cue;
use crate::reflow::reflow;
use crate::timing::{cascade, enforce_duration, secs_to_ms};

/// Caller supplied limits. The engine has no defaults of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetimeConfig {
    /// Shortest time on screen, in seconds.
    pub min_duration: f64,
    /// Advisory upper bound in seconds. Longer cues are reported, never cut.
    pub max_duration: f64,
    /// Required distance between a cue's end and the next start, in seconds.
    pub min_gap: f64,
    /// Reading speed used to derive a duration from text length.
    pub chars_per_sec: f64,
    pub chars_per_line: usize,
    pub max_lines: usize,
}

/// Upper bound for every duration-like setting. Keeps millisecond
/// arithmetic far from `u64` saturation.
pub const MAX_SECONDS: f64 = 86_400.0;

/// Configuration rejected before any cue is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("chars_per_sec must be greater than zero, got {0}")]
    NonPositiveCharsPerSec(f64),
    #[error("chars_per_line must be at least 1")]
    ZeroCharsPerLine,
    #[error("max_lines must be at least 1")]
    ZeroMaxLines,
    #[error("{field} must be between 0 and 86400 seconds, got {value}")]
    InvalidSeconds { field: &'static str, value: f64 },
}

impl RetimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Written so NaN fails too.
        if !(self.chars_per_sec > 0.0 && self.chars_per_sec.is_finite()) {
            return Err(ConfigError::NonPositiveCharsPerSec(self.chars_per_sec));
        }
        if self.chars_per_line == 0 {
            return Err(ConfigError::ZeroCharsPerLine);
        }
        if self.max_lines == 0 {
            return Err(ConfigError::ZeroMaxLines);
        }
        for (field, value) in [
            ("min_duration", self.min_duration),
            ("max_duration", self.max_duration),
            ("min_gap", self.min_gap),
        ] {
            if !(0.0..=MAX_SECONDS).contains(&value) {
                return Err(ConfigError::InvalidSeconds { field, value });
            }
        }
        Ok(())
    }
}

/// What the engine did to a sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub cues: usize,
    /// Cues whose text changed during reflow.
    pub reflowed: usize,
    /// Cues lengthened to meet their reading duration.
    pub extended: usize,
    pub clipped: usize,
    pub cascades: usize,
    pub shifted_ms: u64,
    /// Cues still longer than `max_duration` after processing.
    pub over_max_duration: usize,
}

/// A validated configuration ready to process cue sequences.
///
/// One engine may process any number of sequences; it keeps no state
/// between calls.
#[derive(Debug, Clone)]
pub struct Engine {
    config: RetimeConfig,
    min_duration_ms: u64,
    max_duration_ms: u64,
    min_gap_ms: u64,
}

impl Engine {
    pub fn new(config: RetimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            min_duration_ms: secs_to_ms(config.min_duration),
            max_duration_ms: secs_to_ms(config.max_duration),
            min_gap_ms: secs_to_ms(config.min_gap),
        })
    }

    pub fn process(&self, cues: Vec<Cue>) -> Vec<Cue> {
        self.process_with_report(cues).0
    }

    /// Run the full pipeline and report what changed.
    pub fn process_with_report(&self, mut cues: Vec<Cue>) -> (Vec<Cue>, ProcessReport) {
        let mut report = ProcessReport {
            cues: cues.len(),
            ..ProcessReport::default()
        };

        for cue in &mut cues {
            let text = reflow(&cue.text, self.config.chars_per_line, self.config.max_lines);
            if text != cue.text {
                report.reflowed += 1;
                cue.text = text;
            }
            let chars = cue.char_count();
            if enforce_duration(cue, chars, self.min_duration_ms, self.config.chars_per_sec) {
                report.extended += 1;
            }
        }

        let stats = cascade(&mut cues, self.min_gap_ms, self.min_duration_ms);
        report.clipped = stats.clipped;
        report.cascades = stats.cascades;
        report.shifted_ms = stats.shifted_ms;

        for cue in cues.iter().filter(|c| c.duration_ms() > self.max_duration_ms) {
            debug!(
                index = cue.index.as_str(),
                duration_ms = cue.duration_ms(),
                "cue longer than max_duration"
            );
            report.over_max_duration += 1;
        }
        if report.over_max_duration > 0 {
            warn!(
                count = report.over_max_duration,
                max_duration = self.config.max_duration,
                "cues exceed max_duration, left unchanged"
            );
        }

        info!(
            cues = report.cues,
            reflowed = report.reflowed,
            extended = report.extended,
            clipped = report.clipped,
            cascades = report.cascades,
            shifted_ms = report.shifted_ms,
            "processed cue sequence"
        );
        (cues, report)
    }
}

/// Validate `config` and run the pipeline over `cues` once.
pub fn process(cues: Vec<Cue>, config: &RetimeConfig) -> Result<Vec<Cue>, ConfigError> {
    Ok(Engine::new(*config)?.process(cues))
}
