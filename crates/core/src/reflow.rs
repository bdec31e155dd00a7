//! Re-wrapping of cue text into a bounded number of bounded-width lines.
//!
//! Long lines are broken at the rightmost punctuation mark that fits,
//! then by greedy word wrap, and if the cue still has too many lines the
//! tail is collapsed into one final line and truncated with an ellipsis.
//! Widths are measured in characters, not bytes.

/// Marks a long line may be broken after.
pub const BREAK_MARKS: [char; 7] = [',', '.', '-', ';', '!', '?', '…'];

/// Appended to a collapsed final line that had to be cut.
pub const ELLIPSIS: &str = "...";

/// Reflow `text` so it obeys `chars_per_line` and `max_lines`.
///
/// Each input line is handled independently and the pieces are
/// concatenated before the line-count limit is applied. Zero limits are
/// rejected by [`crate::engine::Engine`]; here they degrade to a single
/// unwrapped line instead of panicking.
pub fn reflow(text: &[String], chars_per_line: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(text.len());
    for line in text {
        wrap_line(line, chars_per_line, &mut lines);
    }
    collapse(lines, chars_per_line, max_lines)
}

/// Lay out a single authored line, appending the pieces to `out`.
///
/// A punctuation split always yields a head that fits, so only the
/// remainder needs more work. It is carried in a loop rather than by
/// recursion so a huge unbroken line costs no stack.
fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let mut rest = line.to_string();
    loop {
        if char_len(&rest) <= width {
            out.push(rest);
            return;
        }
        match punctuation_split(&rest, width) {
            Some((head, tail)) => {
                out.push(head);
                match tail {
                    Some(tail) => rest = tail,
                    None => return,
                }
            }
            None => {
                out.extend(word_wrap(&rest, width));
                return;
            }
        }
    }
}

/// Split after the rightmost break mark located before column `width`.
/// Returns the trimmed head and, unless it is blank, the trimmed tail.
fn punctuation_split(line: &str, width: usize) -> Option<(String, Option<String>)> {
    let (split_at, mark) = line
        .char_indices()
        .take(width)
        .filter(|(_, c)| BREAK_MARKS.contains(c))
        .last()?;
    let cut = split_at + mark.len_utf8();
    let head = line[..cut].trim().to_string();
    let tail = line[cut..].trim();
    let tail = (!tail.is_empty()).then(|| tail.to_string());
    Some((head, tail))
}

/// Greedy two-line word wrap.
///
/// The first line takes words while they fit; everything after the first
/// word that does not fit goes to the second line, whatever its length.
fn word_wrap(line: &str, width: usize) -> Vec<String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };
    let mut head = first.to_string();
    let mut head_len = char_len(first);
    let mut tail: Vec<&str> = Vec::new();
    for word in words {
        let len = char_len(word);
        if tail.is_empty() && head_len + 1 + len <= width {
            head.push(' ');
            head.push_str(word);
            head_len += 1 + len;
        } else {
            tail.push(word);
        }
    }
    if tail.is_empty() {
        vec![head]
    } else {
        vec![head, tail.join(" ")]
    }
}

/// Fold everything past `max_lines - 1` into one final line.
fn collapse(mut lines: Vec<String>, width: usize, max_lines: usize) -> Vec<String> {
    if lines.len() <= max_lines.max(1) {
        return lines;
    }
    let overflow = lines.split_off(max_lines.saturating_sub(1));
    let mut last = overflow.join(" ");
    if char_len(&last) > width {
        last = truncate(&last, width);
    }
    lines.push(last);
    lines
}

/// Cut `line` to exactly `width` characters, ellipsis included.
fn truncate(line: &str, width: usize) -> String {
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut out: String = line.chars().take(keep).collect();
    out.extend(ELLIPSIS.chars().take(width - keep));
    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
