pub mod comparison;
pub mod history;
pub mod screen;

use crate::compare::ComparisonResult;
use screen::Screen;

/// How a piece of text should be emphasized. Screens decide what that looks
/// like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Good,
    Bad,
    Warn,
    Dim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub tone: Tone,
    pub text: String,
}

impl Span {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Tone::Plain, text)
    }
}

const RULE_WIDTH: usize = 30;

pub fn show_title(screen: &mut dyn Screen) {
    screen.say(Tone::Heading, "=== WORD MEMORY GAME ===");
}

pub fn show_full_stimulus(screen: &mut dyn Screen, tokens: &[String]) {
    screen.say(Tone::Heading, "Remember these words:");
    screen.say(Tone::Dim, &"-".repeat(RULE_WIDTH));
    screen.say(Tone::Plain, &tokens.join(" "));
    screen.say(Tone::Dim, &"-".repeat(RULE_WIDTH));
}

pub fn show_stimulus_item(screen: &mut dyn Screen, position: usize, total: usize, token: &str) {
    screen.say(Tone::Heading, &format!("Word {position}/{total}:"));
    screen.blank();
    screen.say(Tone::Plain, token);
}

pub fn show_countdown(screen: &mut dyn Screen, seconds_left: u64) {
    screen.say(Tone::Dim, &format!("Waiting... ({seconds_left}s left)"));
}

/// Full verdict breakdown followed by the score line
pub fn show_comparison(screen: &mut dyn Screen, result: &ComparisonResult) {
    screen.blank();
    screen.say(Tone::Heading, "Comparison:");
    screen.say(Tone::Dim, &"-".repeat(RULE_WIDTH * 2));
    for line in comparison::comparison_lines(result) {
        screen.line(&line);
    }
    screen.blank();
    screen.say(Tone::Heading, &comparison::score_line(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_ordered;
    use screen::RecordingScreen;

    #[test]
    fn full_stimulus_is_framed() {
        let mut screen = RecordingScreen::new();
        show_full_stimulus(&mut screen, &["cat".to_string(), "dog".to_string()]);
        assert_eq!(
            screen.lines(),
            [
                "Remember these words:",
                "------------------------------",
                "cat dog",
                "------------------------------",
            ]
        );
    }

    #[test]
    fn sequential_item_shows_position() {
        let mut screen = RecordingScreen::new();
        show_stimulus_item(&mut screen, 2, 5, "moon");
        assert_eq!(screen.lines(), ["Word 2/5:", "", "moon"]);
    }

    #[test]
    fn comparison_ends_with_score() {
        let mut screen = RecordingScreen::new();
        show_comparison(&mut screen, &compare_ordered(&["cat", "dog"], &["cat"]));
        assert_eq!(screen.lines().last().map(String::as_str), Some("Score: 50.0% (1/2)"));
    }
}
