//! Timing adjustments: reading-speed duration floor and gap cascade.
//!
//! All arithmetic happens on whole milliseconds. Configured seconds are
//! converted once with [`secs_to_ms`]; the reading-speed term is rounded
//! up so a cue is never shown for less than its text needs.

use serde::Serialize;
use tracing::debug;

use crate::cue::Cue;

/// Convert a non-negative number of seconds to the nearest millisecond.
pub fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

/// Duration a cue with `char_count` characters must stay on screen.
pub fn required_duration_ms(char_count: usize, min_duration_ms: u64, chars_per_sec: f64) -> u64 {
    let reading_ms = (char_count as f64 * 1000.0 / chars_per_sec).ceil() as u64;
    min_duration_ms.max(reading_ms)
}

/// Extend the end of `cue` so it satisfies the required duration.
/// Returns true if the cue was changed.
pub fn enforce_duration(
    cue: &mut Cue,
    char_count: usize,
    min_duration_ms: u64,
    chars_per_sec: f64,
) -> bool {
    let required = required_duration_ms(char_count, min_duration_ms, chars_per_sec);
    if cue.end_ms >= cue.start_ms && cue.duration_ms() >= required {
        return false;
    }
    let end = cue.start_ms.saturating_add(required);
    debug!(
        index = cue.index.as_str(),
        from = cue.end_ms,
        to = end,
        "extended cue to reading duration"
    );
    cue.end_ms = end;
    true
}

/// Counters collected by [`cascade`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeStats {
    /// Cues shortened to make room for their successor.
    pub clipped: usize,
    /// Times the remaining tail had to be pushed later.
    pub cascades: usize,
    /// Sum of all tail shifts.
    pub shifted_ms: u64,
}

/// Enforce `min_gap_ms` between neighbours in a single forward pass.
///
/// A cue that runs into the gap before its successor is clipped to end
/// `min_gap_ms` before it (never before its own start). If the clipped cue
/// is now shorter than `min_duration_ms` and its floor end would reach past
/// the successor's start, every later cue moves forward by exactly that
/// overlap. Starts only ever move later.
///
/// Tail shifts are accumulated in `carry` and applied to each cue when the
/// pass reaches it, which is equivalent to shifting the whole tail at once.
pub fn cascade(cues: &mut [Cue], min_gap_ms: u64, min_duration_ms: u64) -> CascadeStats {
    let mut stats = CascadeStats::default();
    let mut carry = 0u64;
    for i in 1..cues.len() {
        let (done, tail) = cues.split_at_mut(i);
        let current = &mut done[i - 1];
        let next = &mut tail[0];
        if carry > 0 {
            next.shift(carry);
        }
        if current.end_ms.saturating_add(min_gap_ms) <= next.start_ms {
            continue;
        }

        let end = next
            .start_ms
            .saturating_sub(min_gap_ms)
            .max(current.start_ms);
        debug!(
            index = current.index.as_str(),
            from = current.end_ms,
            to = end,
            "clipped cue to keep gap"
        );
        current.end_ms = end;
        stats.clipped += 1;

        if current.duration_ms() >= min_duration_ms {
            continue;
        }
        let needed_end = current.start_ms.saturating_add(min_duration_ms);
        if needed_end > next.start_ms {
            let shift = needed_end - next.start_ms;
            debug!(
                index = current.index.as_str(),
                next = next.index.as_str(),
                shift_ms = shift,
                "clipped cue below duration floor, delaying following cues"
            );
            next.shift(shift);
            carry += shift;
            stats.cascades += 1;
            stats.shifted_ms += shift;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: &str, start: u64, end: u64) -> Cue {
        Cue::new(index, start, end, vec!["x".into()])
    }

    fn times(cues: &[Cue]) -> Vec<(u64, u64)> {
        cues.iter().map(|c| (c.start_ms, c.end_ms)).collect()
    }

    #[test]
    fn converts_seconds() {
        assert_eq!(secs_to_ms(0.066), 66);
        assert_eq!(secs_to_ms(0.6), 600);
        assert_eq!(secs_to_ms(8.0), 8000);
    }

    /// "Hi" at 25 chars/s needs 80 ms, so the 0.6 s floor wins.
    #[test]
    fn extends_short_cue_to_min_duration() {
        let mut c = Cue::new("1", 1000, 1500, vec!["Hi".into()]);
        assert!(enforce_duration(&mut c, 2, 600, 25.0));
        assert_eq!(c.end_ms, 1600);
    }

    /// Long text is governed by reading speed, rounded up to the millisecond.
    #[test]
    fn reading_speed_rounds_up() {
        assert_eq!(required_duration_ms(37, 600, 25.0), 1480);
        assert_eq!(required_duration_ms(10, 0, 18.0), 556);
    }

    #[test]
    fn leaves_long_enough_cue_alone() {
        let mut c = cue("1", 0, 5000);
        assert!(!enforce_duration(&mut c, 10, 600, 25.0));
        assert_eq!(c.end_ms, 5000);
    }

    /// An inverted input interval is repaired instead of kept.
    #[test]
    fn repairs_inverted_cue() {
        let mut c = cue("1", 3000, 1000);
        assert!(enforce_duration(&mut c, 0, 0, 25.0));
        assert_eq!(c.end_ms, 3000);
    }

    /// A cue running into the gap is shortened when its floor allows it.
    #[test]
    fn clips_into_gap() {
        let mut cues = vec![cue("A", 1000, 5000), cue("B", 5030, 7000)];
        let stats = cascade(&mut cues, 66, 600);
        assert_eq!(times(&cues), vec![(1000, 4964), (5030, 7000)]);
        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.cascades, 0);
    }

    /// A clip below the floor delays the tail by the floor's overlap with the successor.
    #[test]
    fn cascades_when_clip_breaks_floor() {
        let mut cues = vec![
            cue("A", 5000, 5600),
            cue("B", 5230, 6000),
            cue("C", 7000, 8000),
        ];
        let stats = cascade(&mut cues, 66, 600);
        // needed_end 5600 - B.start 5230 = 370 ms for B and everything after it.
        assert_eq!(
            times(&cues),
            vec![(5000, 5164), (5600, 6370), (7370, 8370)]
        );
        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.cascades, 1);
        assert_eq!(stats.shifted_ms, 370);
    }

    /// A short clipped cue whose floor still ends before the successor delays nothing.
    #[test]
    fn no_cascade_when_floor_fits_before_next() {
        let mut cues = vec![cue("A", 5000, 5700), cue("B", 5650, 7000)];
        let stats = cascade(&mut cues, 100, 600);
        assert_eq!(times(&cues), vec![(5000, 5550), (5650, 7000)]);
        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.cascades, 0);
    }

    /// Successive shifts accumulate for cues further down the sequence.
    #[test]
    fn shifts_accumulate_down_the_tail() {
        let mut cues = vec![
            cue("1", 0, 600),
            cue("2", 100, 700),
            cue("3", 200, 800),
            cue("4", 10_000, 11_000),
        ];
        let stats = cascade(&mut cues, 100, 600);
        // "4" did not conflict with anything but still rides along with the tail.
        assert_eq!(
            times(&cues),
            vec![(0, 0), (600, 600), (1200, 1800), (11_000, 12_000)]
        );
        assert_eq!(stats.cascades, 2);
        assert_eq!(stats.shifted_ms, 1000);
    }

    /// A successor starting inside the gap clips the cue to its own start, never before.
    #[test]
    fn no_inversion_near_zero() {
        let mut cues = vec![cue("1", 0, 600), cue("2", 30, 900)];
        let stats = cascade(&mut cues, 66, 600);
        assert_eq!(times(&cues), vec![(0, 0), (600, 1470)]);
        assert_eq!(stats.shifted_ms, 570);
    }

    #[test]
    fn single_and_empty_sequences_are_untouched() {
        let mut empty: Vec<Cue> = Vec::new();
        assert_eq!(cascade(&mut empty, 66, 600), CascadeStats::default());
        let mut one = vec![cue("1", 0, 100)];
        cascade(&mut one, 66, 600);
        assert_eq!(times(&one), vec![(0, 100)]);
    }

    /// Gap floor, non-delay and ordered intervals hold over a dense sequence.
    #[test]
    fn invariants_hold_on_dense_sequence() {
        let input: Vec<Cue> = (0..50)
            .map(|i| cue(&i.to_string(), i * 137, i * 137 + 900))
            .collect();
        let mut cues = input.clone();
        cascade(&mut cues, 66, 600);
        for pair in cues.windows(2) {
            assert!(pair[0].end_ms + 66 <= pair[1].start_ms);
        }
        for (out, orig) in cues.iter().zip(&input) {
            assert!(out.end_ms >= out.start_ms);
            assert!(out.start_ms >= orig.start_ms);
        }
        // Each delayed cue starts exactly where its predecessor's floor ends.
        assert_eq!(cues[1].start_ms, cues[0].start_ms + 600);
    }
}
