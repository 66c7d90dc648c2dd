use crate::store::{ModeSummary, StoredSession};

/// Table of past rounds followed by per-mode statistics
pub fn history_lines(sessions: &[StoredSession], summary: &[ModeSummary]) -> Vec<String> {
    if sessions.is_empty() {
        return vec!["No sessions recorded yet.".to_string()];
    }

    let mut lines = vec![format!(
        "{:<19}  {:<10}  {:<9}  {:>5}  {:>6}  {}",
        "when", "display", "quiz", "items", "score", "math"
    )];
    for session in sessions {
        let r = &session.record;
        let math = match (&r.challenge_question, r.failed_challenge_attempts) {
            (Some(question), Some(failed)) => format!("{question} ({failed} wrong)"),
            _ => "-".to_string(),
        };
        lines.push(format!(
            "{:<19}  {:<10}  {:<9}  {:>5}  {:>6}  {}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.display_mode.to_string(),
            r.quiz_mode.to_string(),
            r.word_count,
            format!("{:.1}%", r.score_percent),
            math
        ));
    }

    if !summary.is_empty() {
        lines.push(String::new());
    }
    for mode in summary {
        lines.push(format!(
            "{}: {} sessions, mean {:.1}%, std dev {:.1}, best {:.1}%",
            mode.quiz_mode, mode.sessions, mode.mean_score, mode.std_dev, mode.best_score
        ));
    }
    lines
}
