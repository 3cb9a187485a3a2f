//! Output scanning — line splitting, ANSI stripping, results-path extraction.
//!
//! The engine announces its results file with a single log line:
//!
//! ```text
//! [RdapConformaceTool] ==> Results path is: /path/to/results.json
//! ```
//!
//! The prefix is emitted by the engine verbatim, misspelling included, and
//! must match exactly. This is the only place that knows about it.

use std::borrow::Cow;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use super::capture::CapturedOutput;


/// Prefix of the line announcing the results artifact.
pub const RESULTS_PATH_MARKER: &str = "[RdapConformaceTool] ==> Results path is: ";

/// ANSI select-graphic-rendition sequences (`ESC [ params m`).
static ANSI_SGR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1B\[[;\d]*m").expect("SGR pattern is valid"));


// ---------------------------------------------------------------------------
// OutputLine
// ---------------------------------------------------------------------------

/// A single captured line with terminal colors removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub line_number: usize,
}


// ---------------------------------------------------------------------------
// ScanReport
// ---------------------------------------------------------------------------

/// What a scan found in one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub lines: Vec<OutputLine>,
    pub results_path: Option<PathBuf>,
}


/// Remove ANSI color sequences from `line`.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_SGR.replace_all(line, "")
}


/// Split `text` on `\n` into cleaned, numbered lines.
///
/// A trailing `\r` is dropped from each line; a final empty segment after
/// the last newline is not reported.
pub fn split_lines(text: &str) -> Vec<OutputLine> {
    let mut segments: Vec<&str> = text.split('\n').collect();
    if segments.last() == Some(&"") {
        segments.pop();
    }
    segments
        .into_iter()
        .enumerate()
        .map(|(i, raw)| OutputLine {
            text: strip_ansi(raw.strip_suffix('\r').unwrap_or(raw)).into_owned(),
            line_number: i + 1,
        })
        .collect()
}


/// The results path announced by a single cleaned line, if any.
pub fn results_path_in_line(line: &str) -> Option<&str> {
    line.strip_prefix(RESULTS_PATH_MARKER)
}


/// Scan lines for the results marker. The last announcement wins.
pub fn find_results_path(lines: &[OutputLine]) -> Option<PathBuf> {
    lines
        .iter()
        .filter_map(|line| results_path_in_line(&line.text))
        .last()
        .map(PathBuf::from)
}


/// Scan a captured run.
pub fn scan(output: &CapturedOutput) -> ScanReport {
    let lines = split_lines(&output.text());
    let results_path = find_results_path(&lines);
    ScanReport {
        lines,
        results_path,
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
