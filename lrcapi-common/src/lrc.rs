//! LRC normalization
//!
//! Parses LRC-like text into timed lines and renders the canonical form
//! served to players:
//!
//! ```text
//! [ar:Artist]
//! [00:00.50]Intro
//! [00:01.00]La la
//! ```
//!
//! # Rules
//!
//! - A line may carry several leading timestamp tags (`[00:05.00][00:15.00]Hello`);
//!   each tag becomes its own entry sharing the payload text
//! - Accepted tags: `[mm:ss]`, `[mm:ss.x]`, `[mm:ss.xx]`, `[mm:ss.xxx]`, `[mm:ss:xx]`
//! - Anything else (metadata such as `[ar:Artist]`, plain text, malformed
//!   digits) is an untimed line and is kept verbatim
//! - Timed entries are sorted ascending with a stable sort; untimed entries
//!   keep their index in the entry sequence
//! - Timestamps are truncated to centiseconds, the precision of the canonical form
//! - Byte order marks are dropped from the start of each line
//!
//! Normalization is total: unparseable input degrades to untimed lines, never
//! to an error. `normalize(doc.serialize()) == doc` for every normalized `doc`.

use std::fmt;
use std::time::Duration;

use crate::fingerprint::fingerprint_text;

/// A single lyric line, timed or untimed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedLyricLine {
    /// Offset from the start of the track (None for metadata and plain text)
    pub timestamp: Option<Duration>,
    /// Payload text (for untimed lines, the whole original line)
    pub text: String,
}

impl TimedLyricLine {
    pub fn timed(timestamp: Duration, text: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp),
            text: text.into(),
        }
    }

    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            text: text.into(),
        }
    }

    /// Render the line in canonical form
    ///
    /// ```
    /// use lrcapi_common::lrc::TimedLyricLine;
    /// use std::time::Duration;
    ///
    /// let line = TimedLyricLine::timed(Duration::from_millis(65_120), "Hello");
    /// assert_eq!(line.render(), "[01:05.12]Hello");
    /// ```
    pub fn render(&self) -> String {
        match self.timestamp {
            Some(ts) => format!("{}{}", format_timestamp(ts), self.text),
            None => self.text.clone(),
        }
    }
}

/// Normalized lyric document
///
/// Immutable once built; the canonical text and fingerprint are derived at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricDocument {
    lines: Vec<TimedLyricLine>,
    canonical: String,
    fingerprint: String,
}

impl LyricDocument {
    fn from_lines(lines: Vec<TimedLyricLine>) -> Self {
        let canonical = lines
            .iter()
            .map(TimedLyricLine::render)
            .collect::<Vec<_>>()
            .join("\n");
        let fingerprint = fingerprint_text(&canonical);
        Self {
            lines,
            canonical,
            fingerprint,
        }
    }

    pub fn lines(&self) -> &[TimedLyricLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Content fingerprint of the canonical text
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Canonical serialized form (newline-joined, no trailing newline)
    pub fn serialize(&self) -> &str {
        &self.canonical
    }

    /// Consume the document, keeping only the canonical text
    pub fn into_text(self) -> String {
        self.canonical
    }
}

impl fmt::Display for LyricDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Normalize raw LRC-like text into a [`LyricDocument`]
///
/// # Examples
///
/// ```
/// use lrcapi_common::lrc::normalize;
///
/// let doc = normalize("[00:01.00]La la\n[00:00.50]Intro");
/// assert_eq!(doc.serialize(), "[00:00.50]Intro\n[00:01.00]La la");
/// ```
pub fn normalize(raw: &str) -> LyricDocument {
    let mut entries = Vec::new();
    for line in physical_lines(raw) {
        // byte order marks can survive concatenation at any line start
        let line = line.trim_start_matches('\u{feff}').trim_end();
        if line.is_empty() {
            continue;
        }
        match split_timestamps(line) {
            Some((timestamps, text)) => {
                entries.extend(
                    timestamps
                        .into_iter()
                        .map(|ts| TimedLyricLine::timed(ts, text)),
                );
            }
            None => entries.push(TimedLyricLine::untimed(line)),
        }
    }

    LyricDocument::from_lines(sort_timed_in_place(entries))
}

/// Split on `\n`, `\r\n` and lone `\r`
fn physical_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('\n').flat_map(|line| {
        line.strip_suffix('\r')
            .unwrap_or(line)
            .split('\r')
    })
}

/// Stable-sort timed entries while untimed entries keep their slots
fn sort_timed_in_place(entries: Vec<TimedLyricLine>) -> Vec<TimedLyricLine> {
    let mut timed: Vec<TimedLyricLine> = entries
        .iter()
        .filter(|e| e.timestamp.is_some())
        .cloned()
        .collect();
    // sort_by_key is stable: equal instants keep input order
    timed.sort_by_key(|e| e.timestamp);

    let mut timed = timed.into_iter();
    entries
        .into_iter()
        .map(|entry| match entry.timestamp {
            Some(_) => timed.next().unwrap_or(entry),
            None => entry,
        })
        .collect()
}

/// Extract leading timestamp tags
///
/// Returns None when the line does not start with at least one valid tag.
fn split_timestamps(line: &str) -> Option<(Vec<Duration>, &str)> {
    let mut timestamps = Vec::new();
    let mut rest = line;

    loop {
        let candidate = rest.trim_start();
        let Some(inner_start) = candidate.strip_prefix('[') else {
            break;
        };
        let Some(end) = inner_start.find(']') else {
            break;
        };
        match parse_timestamp(&inner_start[..end]) {
            Some(ts) => {
                timestamps.push(ts);
                rest = &inner_start[end + 1..];
            }
            None => break,
        }
    }

    if timestamps.is_empty() {
        None
    } else {
        Some((timestamps, rest.trim()))
    }
}

/// Parse `mm:ss`, `mm:ss.f{1,3}` or `mm:ss:ff` into a centisecond-precision duration
pub fn parse_timestamp(s: &str) -> Option<Duration> {
    let (minutes, remainder) = s.split_once(':')?;
    let (seconds, fraction) = match remainder.split_once(['.', ':']) {
        Some((sec, frac)) => (sec, Some(frac)),
        None => (remainder, None),
    };

    if !is_digits(minutes) || !is_digits(seconds) || seconds.len() > 2 {
        return None;
    }

    let centis = match fraction {
        None => 0,
        Some(frac) if is_digits(frac) && frac.len() <= 3 => {
            let value: u64 = frac.parse().ok()?;
            match frac.len() {
                1 => value * 10,
                2 => value,
                _ => value / 10,
            }
        }
        Some(_) => return None,
    };

    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let total_centis = minutes
        .checked_mul(6000)?
        .checked_add(seconds * 100)?
        .checked_add(centis)?;

    Some(Duration::from_millis(total_centis.checked_mul(10)?))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Format a timestamp tag as `[mm:ss.xx]` (minutes widen past 99)
pub fn format_timestamp(ts: Duration) -> String {
    let centis = ts.as_millis() / 10;
    let minutes = centis / 6000;
    let seconds = (centis / 100) % 60;
    let hundredths = centis % 100;
    format!("[{:02}:{:02}.{:02}]", minutes, seconds, hundredths)
}
