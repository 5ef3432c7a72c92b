//! Candidate filtering.
//!
//! The positional pattern runs once over the whole word source; every found
//! letter then narrows that output with a plain substring match. The actual
//! line matching is delegated to a [`LineFilter`], either in-process through
//! the `regex` crate or by piping through an external `rg`.

use crate::constraints::Matcher;
use crate::debug_log;
use crate::wordbank::WordSource;
use regex::Regex;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid filter pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error talking to the filter process: {0}")]
    Io(#[from] io::Error),
    #[error("filter process exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Result of one matching pass. Nothing matching is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Matched(String),
    NoMatch,
}

impl FilterOutcome {
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            FilterOutcome::Matched(text) => text.lines().map(str::to_string).collect(),
            FilterOutcome::NoMatch => Vec::new(),
        }
    }
}

/// A line-oriented pattern matcher: given a pattern and newline-delimited
/// input, returns the lines that match.
pub trait LineFilter {
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the match could not be carried out at
    /// all. No matching lines is [`FilterOutcome::NoMatch`], not an error.
    fn matching_lines(&self, pattern: &str, input: &str) -> Result<FilterOutcome, FilterError>;
}

/// In-process matching with the `regex` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexFilter;

impl LineFilter for RegexFilter {
    fn matching_lines(&self, pattern: &str, input: &str) -> Result<FilterOutcome, FilterError> {
        let re = Regex::new(pattern).map_err(|source| FilterError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut out = String::new();
        for line in input.lines().filter(|line| re.is_match(line)) {
            out.push_str(line);
            out.push('\n');
        }

        if out.is_empty() {
            Ok(FilterOutcome::NoMatch)
        } else {
            Ok(FilterOutcome::Matched(out))
        }
    }
}

/// Pipes the input through ripgrep.
///
/// ripgrep exits with status 1 when nothing matched, which maps to
/// [`FilterOutcome::NoMatch`]; any other non-zero status is a failure.
#[derive(Debug, Clone)]
pub struct RipgrepFilter {
    program: String,
}

impl RipgrepFilter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for RipgrepFilter {
    fn default() -> Self {
        Self::new("rg")
    }
}

impl LineFilter for RipgrepFilter {
    fn matching_lines(&self, pattern: &str, input: &str) -> Result<FilterOutcome, FilterError> {
        let mut child = Command::new(&self.program)
            .args(["--no-config", "--no-line-number", "--color", "never", "-e"])
            .arg(pattern)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FilterError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "filter process has no stdin")
        })?;

        // Feed stdin while the child's stdout is drained, so a large word list
        // can't fill both pipes.
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || {
                let result = stdin.write_all(input.as_bytes());
                drop(stdin);
                result
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            match written {
                // rg may stop reading early; a closed pipe is not our failure.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => output,
                Err(e) => Err(e),
                Ok(()) => output,
            }
        })?;

        match output.status.code() {
            Some(0) => Ok(FilterOutcome::Matched(
                String::from_utf8_lossy(&output.stdout).into_owned(),
            )),
            Some(1) => Ok(FilterOutcome::NoMatch),
            _ => Err(FilterError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// Runs the matcher's pattern over the word source, then narrows the result
/// by each found letter in discovery order.
///
/// Returns the surviving words in source order. An empty vector means no word
/// fits the known constraints.
///
/// # Errors
///
/// Propagates any [`FilterError`] raised by the line filter.
pub fn filter_candidates<F: LineFilter + ?Sized>(
    filter: &F,
    matcher: &Matcher,
    source: &WordSource,
) -> Result<Vec<String>, FilterError> {
    let mut current = match filter.matching_lines(matcher.pattern(), source.as_text())? {
        FilterOutcome::Matched(text) => text,
        FilterOutcome::NoMatch => {
            debug_log!("pattern {} matched nothing", matcher.pattern());
            return Ok(Vec::new());
        }
    };

    for c in matcher.found() {
        let outcome = narrow_by_letter(filter, &current, *c)?;
        match outcome {
            FilterOutcome::Matched(text) => current = text,
            FilterOutcome::NoMatch => {
                debug_log!("no candidate contains '{}'", c);
                return Ok(Vec::new());
            }
        }
    }

    Ok(FilterOutcome::Matched(current).lines())
}

/// Keeps the lines of `input` that contain `letter` anywhere.
///
/// # Errors
///
/// Propagates any [`FilterError`] raised by the line filter.
pub fn narrow_by_letter<F: LineFilter + ?Sized>(
    filter: &F,
    input: &str,
    letter: char,
) -> Result<FilterOutcome, FilterError> {
    filter.matching_lines(&regex::escape(&letter.to_string()), input)
}
