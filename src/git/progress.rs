//! Phase-weighted parsing of git's textual progress output
//!
//! Git reports network transfers on stderr as a sequence of phases
//! ("Receiving objects", "Resolving deltas", ...), each counting from 0%
//! to 100% on its own. This module maps those per-phase percentages onto
//! a single `[0, 1]` value by giving each expected phase a fixed slice of
//! the overall bar. The mapping is an approximation: git may skip phases
//! (small transfers), repeat percentages, or restart a count, and the
//! output format itself is not a stable interface. All pattern matching
//! for it lives in this file so format drift in future git versions
//! touches nothing else.

use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());

/// One expected progress phase and the slice of the overall bar it owns.
#[derive(Debug, Clone, Copy)]
pub struct ProgressStep {
    /// Literal prefix git uses for the phase, without the trailing colon.
    pub prefix: &'static str,
    /// Fraction of the overall bar this phase occupies. Weights of a step
    /// table should sum to 1.
    pub weight: f64,
}

/// Outcome of parsing one output line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// The line carried a recognized phase percentage, mapped to `[0, 1]`.
    Progress(f64),
    /// Anything else. Malformed or unrecognized input never errors; it
    /// degrades to this, with the raw line still available to the caller.
    Context,
}

/// Incremental parser for one operation's output stream.
///
/// Phase matching only moves forward: once a later phase has been seen,
/// lines from earlier phases are treated as context, so the reported
/// value never decreases within a phase and only jumps at phase
/// boundaries.
pub struct ProgressParser {
    steps: &'static [ProgressStep],
    current_step: usize,
}

impl ProgressParser {
    pub fn new(steps: &'static [ProgressStep]) -> Self {
        debug_assert!(!steps.is_empty());
        Self {
            steps,
            current_step: 0,
        }
    }

    /// Parse the next output line. Never fails.
    pub fn parse(&mut self, line: &str) -> ParsedLine {
        for (index, step) in self.steps.iter().enumerate().skip(self.current_step) {
            if !matches_step(line, step.prefix) {
                continue;
            }
            let Some(percent) = extract_percent(line) else {
                // Phase prefix with a truncated or missing percentage.
                // Surface as context rather than guessing.
                return ParsedLine::Context;
            };
            self.current_step = index;
            let start: f64 = self.steps[..index].iter().map(|s| s.weight).sum();
            let value = start + step.weight * percent;
            return ParsedLine::Progress(value.clamp(0.0, 1.0));
        }
        ParsedLine::Context
    }
}

fn matches_step(line: &str, prefix: &str) -> bool {
    line.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with(':'))
}

fn extract_percent(line: &str) -> Option<f64> {
    let captures = PERCENT_RE.captures(line)?;
    let percent: u32 = captures[1].parse().ok()?;
    Some(f64::from(percent.min(100)) / 100.0)
}

/// Phases of `git clone --progress` in the order git emits them.
pub const CLONE_STEPS: &[ProgressStep] = &[
    ProgressStep {
        prefix: "remote: Compressing objects",
        weight: 0.1,
    },
    ProgressStep {
        prefix: "Receiving objects",
        weight: 0.6,
    },
    ProgressStep {
        prefix: "Resolving deltas",
        weight: 0.1,
    },
    ProgressStep {
        prefix: "Checking out files",
        weight: 0.2,
    },
];

/// Phases of `git fetch --progress`. No checkout happens, so receiving
/// and delta resolution carry more of the bar.
pub const FETCH_STEPS: &[ProgressStep] = &[
    ProgressStep {
        prefix: "remote: Compressing objects",
        weight: 0.1,
    },
    ProgressStep {
        prefix: "Receiving objects",
        weight: 0.7,
    },
    ProgressStep {
        prefix: "Resolving deltas",
        weight: 0.2,
    },
];
