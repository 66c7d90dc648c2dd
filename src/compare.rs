//! Scoring of a recall attempt against the stimulus.
//!
//! Both comparators are pure and case-insensitive. The score is always taken
//! over the length of the expected sequence; an empty expected sequence
//! scores 0.

use std::collections::BTreeSet;

/// Placeholder shown for the shorter side of an ordered comparison
pub const MISSING: &str = "(missing)";

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// One aligned index of an ordered comparison
#[derive(Clone, Debug, PartialEq)]
pub struct PositionVerdict {
    pub index: usize,
    pub expected: Option<String>,
    pub submitted: Option<String>,
    pub verdict: Verdict,
}

impl PositionVerdict {
    pub fn expected_or_missing(&self) -> &str {
        self.expected.as_deref().unwrap_or(MISSING)
    }

    pub fn submitted_or_missing(&self) -> &str {
        self.submitted.as_deref().unwrap_or(MISSING)
    }

    /// Submitted past the end of the stimulus
    pub fn is_extra(&self) -> bool {
        self.expected.is_none()
    }
}

/// Set view of an unordered comparison, each side sorted
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetDiff {
    pub correct: Vec<String>,
    pub missed: Vec<String>,
    pub extra: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComparisonDetail {
    Ordered(Vec<PositionVerdict>),
    Unordered(SetDiff),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonResult {
    pub score_percent: f64,
    pub correct: usize,
    pub total: usize,
    pub detail: ComparisonDetail,
}

fn fold(token: &str) -> String {
    token.to_lowercase()
}

fn percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Compare token by token; a position counts only when both sides have the
/// same token at the same index.
pub fn compare_ordered<E, S>(expected: &[E], submitted: &[S]) -> ComparisonResult
where
    E: AsRef<str>,
    S: AsRef<str>,
{
    let len = expected.len().max(submitted.len());
    let positions: Vec<PositionVerdict> = (0..len)
        .map(|index| {
            let exp = expected.get(index).map(|t| t.as_ref().to_string());
            let sub = submitted.get(index).map(|t| fold(t.as_ref()));
            let verdict = match (&exp, &sub) {
                (Some(e), Some(s)) if fold(e) == *s => Verdict::Correct,
                _ => Verdict::Incorrect,
            };
            PositionVerdict {
                index,
                expected: exp,
                submitted: sub,
                verdict,
            }
        })
        .collect();

    let correct = positions
        .iter()
        .filter(|p| p.verdict == Verdict::Correct)
        .count();

    ComparisonResult {
        score_percent: percent(correct, expected.len()),
        correct,
        total: expected.len(),
        detail: ComparisonDetail::Ordered(positions),
    }
}

/// Compare as sets: only membership matters.
pub fn compare_unordered<E, S>(expected: &[E], submitted: &[S]) -> ComparisonResult
where
    E: AsRef<str>,
    S: AsRef<str>,
{
    let expected: BTreeSet<String> = expected.iter().map(|t| fold(t.as_ref())).collect();
    let submitted: BTreeSet<String> = submitted.iter().map(|t| fold(t.as_ref())).collect();

    let diff = SetDiff {
        correct: expected.intersection(&submitted).cloned().collect(),
        missed: expected.difference(&submitted).cloned().collect(),
        extra: submitted.difference(&expected).cloned().collect(),
    };

    let correct = diff.correct.len();
    ComparisonResult {
        score_percent: percent(correct, expected.len()),
        correct,
        total: expected.len(),
        detail: ComparisonDetail::Unordered(diff),
    }
}
