//! Subtitle cue retiming and reflow.
//!
//! The engine takes an ordered list of cues and
//! 1. reflows each cue's text into bounded lines ([`reflow()`]),
//! 2. stretches each cue to its reading duration ([`timing::enforce_duration`]),
//! 3. enforces the minimum gap, delaying later cues when needed ([`timing::cascade`]).
//!
//! SRT reading/writing and file batching live around it in [`srt`] and [`batch`].

pub mod batch;
pub mod cue;
pub mod engine;
pub mod reflow;
pub mod srt;
pub mod timecode;
pub mod timing;

pub use cue::Cue;
pub use engine::{process, ConfigError, Engine, ProcessReport, RetimeConfig};
pub use reflow::reflow;
