use unicode_width::UnicodeWidthStr;

use super::{Span, Tone};
use crate::compare::{ComparisonDetail, ComparisonResult, PositionVerdict, SetDiff, Verdict};

/// Render verdicts as toned lines; coloring is left to the screen
pub fn comparison_lines(result: &ComparisonResult) -> Vec<Vec<Span>> {
    match &result.detail {
        ComparisonDetail::Ordered(positions) => ordered_lines(positions),
        ComparisonDetail::Unordered(diff) => unordered_lines(diff),
    }
}

pub fn score_line(result: &ComparisonResult) -> String {
    format!(
        "Score: {:.1}% ({}/{})",
        result.score_percent, result.correct, result.total
    )
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

fn ordered_lines(positions: &[PositionVerdict]) -> Vec<Vec<Span>> {
    let column = positions
        .iter()
        .map(|p| p.submitted_or_missing().width())
        .max()
        .unwrap_or(0);
    let numbers = positions.len().to_string().len();

    positions
        .iter()
        .map(|p| {
            let number = Span::plain(format!("{:>numbers$}. ", p.index + 1));
            match p.verdict {
                Verdict::Correct => vec![
                    number,
                    Span::new(Tone::Good, p.submitted_or_missing()),
                    Span::plain(" ✓"),
                ],
                Verdict::Incorrect => vec![
                    number,
                    Span::new(Tone::Bad, pad(p.submitted_or_missing(), column)),
                    Span::plain(" (correct: "),
                    Span::new(Tone::Good, p.expected_or_missing()),
                    Span::plain(")"),
                ],
            }
        })
        .collect()
}

fn section(title: &str, words: &[String], tone: Tone, mark: &str) -> Vec<Vec<Span>> {
    let mut lines = vec![vec![Span::new(Tone::Heading, title)]];
    if words.is_empty() {
        lines.push(vec![Span::new(Tone::Dim, "  None")]);
    }
    for word in words {
        lines.push(vec![
            Span::plain("  "),
            Span::new(tone, word.as_str()),
            Span::plain(format!(" {mark}")),
        ]);
    }
    lines
}

fn unordered_lines(diff: &SetDiff) -> Vec<Vec<Span>> {
    let mut lines = section("Words you got RIGHT:", &diff.correct, Tone::Good, "✓");
    lines.push(vec![]);
    lines.extend(section("Words you MISSED:", &diff.missed, Tone::Bad, "✗"));
    lines.push(vec![]);
    lines.extend(section("WRONG words you entered:", &diff.extra, Tone::Bad, "✗"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare_ordered, compare_unordered};

    fn plain(lines: &[Vec<Span>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn ordered_lines_mark_hits_and_show_expected_for_misses() {
        let result = compare_ordered(&["cat", "dog"], &["cat", "sun", "moon"]);
        assert_eq!(
            plain(&comparison_lines(&result)),
            [
                "1. cat ✓",
                "2. sun  (correct: dog)",
                "3. moon (correct: (missing))",
            ]
        );
    }

    #[test]
    fn ordered_tones_follow_verdicts() {
        let result = compare_ordered(&["cat", "dog"], &["cat", "sun"]);
        let lines = comparison_lines(&result);
        assert_eq!(lines[0][1].tone, Tone::Good);
        assert_eq!(lines[1][1].tone, Tone::Bad);
        assert_eq!(lines[1][3].tone, Tone::Good);
    }

    #[test]
    fn unordered_sections_list_none_when_empty() {
        let result = compare_unordered(&["cat", "dog"], &["dog", "cat"]);
        let text = plain(&comparison_lines(&result));
        assert_eq!(
            text,
            [
                "Words you got RIGHT:",
                "  cat ✓",
                "  dog ✓",
                "",
                "Words you MISSED:",
                "  None",
                "",
                "WRONG words you entered:",
                "  None",
            ]
        );
    }

    #[test]
    fn score_line_rounds_to_one_decimal() {
        let result = compare_ordered(&["cat", "dog", "sun"], &["cat", "sun", "dog"]);
        assert_eq!(score_line(&result), "Score: 33.3% (1/3)");
    }
}
