//! This module is responsible for reading and writing SRT files.
//! Parsing is lenient about layout but reports every block it had to drop.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::cue::Cue;
use crate::timecode::{format_timecode, parse_time_range};

/// Why a block could not be turned into a cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum SkipReason {
    #[error("block has no timecode line")]
    MissingTimecode,
    #[error("unparsable timecode line '{0}'")]
    BadTimecode(String),
}

/// A block dropped during extraction. `block` counts from 1 in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    pub block: usize,
    pub reason: SkipReason,
}

/// Result of reading an SRT document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub cues: Vec<Cue>,
    pub skipped: Vec<SkippedBlock>,
}

/// Parse SRT text into cues, keeping input order.
///
/// Blocks are separated by blank lines and every line is trimmed. A block
/// needs an index line and a timecode line; the remaining lines are text.
pub fn parse(input: &str) -> Extraction {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut out = Extraction::default();
    let mut block: Vec<&str> = Vec::new();
    let mut number = 0;
    for line in input.lines().map(str::trim) {
        if !line.is_empty() {
            block.push(line);
            continue;
        }
        if !block.is_empty() {
            number += 1;
            push_block(&mut out, number, &block);
            block.clear();
        }
    }
    if !block.is_empty() {
        number += 1;
        push_block(&mut out, number, &block);
    }
    out
}

fn push_block(out: &mut Extraction, number: usize, lines: &[&str]) {
    match block_to_cue(lines) {
        Ok(cue) => out.cues.push(cue),
        Err(reason) => out.skipped.push(SkippedBlock {
            block: number,
            reason,
        }),
    }
}

fn block_to_cue(lines: &[&str]) -> Result<Cue, SkipReason> {
    let [index, times, text @ ..] = lines else {
        return Err(SkipReason::MissingTimecode);
    };
    let (start_ms, end_ms) = parse_time_range(times).map_err(|e| {
        debug!("rejecting timecode line: {e}");
        SkipReason::BadTimecode(times.to_string())
    })?;
    Ok(Cue::new(
        *index,
        start_ms,
        end_ms,
        text.iter().map(|l| l.to_string()).collect(),
    ))
}

/// Format cues back to SRT text.
/// The way this works is by writing each cue sequentially followed by a blank line.
pub fn format(cues: &[Cue]) -> String {
    let mut out = String::new();
    for cue in cues {
        out.push_str(&format!(
            "{}\n{} --> {}\n",
            cue.index,
            format_timecode(cue.start_ms),
            format_timecode(cue.end_ms)
        ));
        for line in &cue.text {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
