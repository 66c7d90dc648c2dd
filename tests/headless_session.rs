use std::collections::VecDeque;
use std::time::Duration;

use recall::config::{Config, DisplayMode, QuizMode};
use recall::runtime::{ScriptedLineSource, TestClock};
use recall::session::{Collaborators, Phase, Quiz, SessionEnd, SessionRecord, SessionReport};
use recall::stimulus::RandomSource;
use recall::store::{RecordSink, SessionDb, StoreError};
use recall::ui::screen::RecordingScreen;
use recall::vocabulary::{Vocabularies, VocabularyKind};

// Headless sessions: scripted answers, a recording screen and a clock that
// never blocks. The random source always draws the first tokens of the list
// so expected scores can be worked out by hand.

/// Takes the first `n` tokens and hands out queued numbers for `range`
#[derive(Default)]
struct FirstTokens {
    draws: VecDeque<i64>,
}

impl FirstTokens {
    fn with_draws(draws: impl IntoIterator<Item = i64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl RandomSource for FirstTokens {
    fn sample(&mut self, tokens: &[String], n: usize) -> Vec<String> {
        tokens.iter().take(n).cloned().collect()
    }

    fn range(&mut self, low: i64, high: i64) -> i64 {
        self.draws.pop_front().unwrap_or(low).clamp(low, high)
    }
}

#[derive(Default)]
struct CollectingSink {
    records: Vec<SessionRecord>,
}

impl RecordSink for CollectingSink {
    fn save(&mut self, record: &SessionRecord) -> Result<String, StoreError> {
        self.records.push(record.clone());
        Ok(format!("memory #{}", self.records.len()))
    }
}

struct BrokenSink;

impl RecordSink for BrokenSink {
    fn save(&mut self, _record: &SessionRecord) -> Result<String, StoreError> {
        Err(StoreError::Io(std::io::Error::other("read-only file system")))
    }
}

struct Outcome {
    report: SessionReport,
    visited: Vec<Phase>,
    config: Option<Config>,
}

fn play(
    input: &mut ScriptedLineSource,
    screen: &mut RecordingScreen,
    clock: &mut TestClock,
    rng: &mut dyn RandomSource,
    sink: &mut dyn RecordSink,
    preset: Option<Config>,
) -> Outcome {
    let vocabularies = Vocabularies::load().unwrap();
    let mut quiz = Quiz::new(
        Collaborators {
            input,
            screen,
            clock,
            rng,
            sink,
        },
        vocabularies,
    )
    .with_preset(preset)
    .with_hostname("testhost");

    let report = quiz.run().unwrap();
    Outcome {
        report,
        visited: quiz.visited().to_vec(),
        config: quiz.config().cloned(),
    }
}

fn first_words(n: usize) -> Vec<String> {
    Vocabularies::load().unwrap().get(VocabularyKind::Words).tokens()[..n].to_vec()
}

fn basic_config() -> Config {
    Config {
        display_mode: DisplayMode::Full,
        quiz_mode: QuizMode::Ordered,
        delay_seconds: 1.5,
        word_count: 3,
        math_challenge: false,
        fixed_delay: false,
        letters_only: false,
    }
}

#[test]
fn ordered_round_is_scored_and_saved() {
    // Arrange: full display, ordered, three words, nothing optional
    let words = first_words(3);
    let answer = format!("{} {} nope", words[0], words[1]);
    let mut input = ScriptedLineSource::new(["1", "1", "1.5", "n", "3", "n", "n", answer.as_str(), "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    // Act
    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    // Assert
    assert_eq!(outcome.report.end, SessionEnd::Finished);
    assert_eq!(outcome.report.rounds_completed, 1);
    assert_eq!(outcome.report.records_saved, 1);
    assert_eq!(outcome.config, Some(basic_config()));
    assert_eq!(
        outcome.visited,
        [
            Phase::Configuring,
            Phase::GeneratingStimulus,
            Phase::Presenting,
            Phase::AwaitingRecall,
            Phase::Scoring,
            Phase::Persisting,
            Phase::AskReplay,
            Phase::Terminated,
        ]
    );
    assert_eq!(
        clock.sleeps(),
        [Duration::from_secs(2), Duration::from_millis(1500)]
    );

    assert!(screen.contains("Remember these words:"));
    assert!(screen.contains(&words.join(" ")));
    assert!(screen.contains("ORDERED QUIZ"));
    assert!(screen.contains(&format!("(correct: {})", words[2])));
    assert!(screen.contains("Score: 66.7% (2/3)"));
    assert!(screen.contains("Quiz data saved to: memory #1"));
    assert!(screen.contains("Thanks for playing!"));

    let record = &sink.records[0];
    assert_eq!(record.hostname, "testhost");
    assert_eq!(record.stimulus, words.join(" "));
    assert_eq!(record.submission, answer);
    assert_eq!(record.score_percent, 66.7);
    assert_eq!(record.challenge_question, None);
    assert_eq!(record.failed_challenge_attempts, None);
}

#[test]
fn sequential_letters_with_every_option() {
    // Arrange: draws pick addition with 1000 + 2345
    let mut input = ScriptedLineSource::new([
        "2", "2", "0.5", "y", "4", "y", "y", // configuration
        "abc", "3000", "3345", // challenge
        "d c b a", // recall
        "n",
    ]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut rng = FirstTokens::with_draws([0, 1000, 2345]);
    let mut sink = CollectingSink::default();

    // Act
    let outcome = play(&mut input, &mut screen, &mut clock, &mut rng, &mut sink, None);

    // Assert: every optional phase ran, in order
    assert_eq!(
        outcome.visited,
        [
            Phase::Configuring,
            Phase::GeneratingStimulus,
            Phase::Presenting,
            Phase::Delaying,
            Phase::Challenging,
            Phase::AwaitingRecall,
            Phase::Scoring,
            Phase::Persisting,
            Phase::AskReplay,
            Phase::Terminated,
        ]
    );

    // start pause, one wait per letter, then the thirty second countdown
    assert_eq!(clock.sleeps().len(), 1 + 4 + 30);
    assert_eq!(clock.total(), Duration::from_secs(2 + 2 + 30));
    assert!(screen.contains("Word 4/4:"));
    assert!(screen.contains("Waiting... (30s left)"));
    assert!(screen.contains("Waiting... (1s left)"));

    assert!(screen.contains("Solve this problem: 1000 + 2345"));
    assert!(screen.contains("Please enter a valid number."));
    assert_eq!(screen.count("Incorrect. Try again!"), 1);
    assert!(screen.contains("Correct! You got it in 2 attempts."));

    assert!(screen.contains("UNORDERED QUIZ"));
    assert!(screen.contains("Score: 100.0% (4/4)"));

    let record = &sink.records[0];
    assert!(record.letters_only);
    assert_eq!(record.display_mode, DisplayMode::Sequential);
    assert_eq!(record.quiz_mode, QuizMode::Unordered);
    assert_eq!(record.stimulus, "A B C D");
    assert_eq!(record.challenge_question.as_deref(), Some("1000 + 2345"));
    assert_eq!(record.failed_challenge_attempts, Some(1));
}

#[test]
fn replay_reuses_the_configuration() {
    let words = first_words(3).join(" ");
    let mut input = ScriptedLineSource::new([
        "1", "2", "0", "n", "3", "n", "n", // configuration
        words.as_str(), "y", "", "n",
    ]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    assert_eq!(outcome.report.rounds_completed, 2);
    assert_eq!(outcome.report.scores, [100.0, 0.0]);
    assert_eq!(
        input
            .prompts()
            .iter()
            .filter(|p| p.starts_with("Choose display type"))
            .count(),
        1
    );
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.records[0].quiz_mode, sink.records[1].quiz_mode);
    assert_eq!(sink.records[0].word_count, sink.records[1].word_count);
    assert_eq!(sink.records[1].submission, "");
    assert_eq!(screen.count("Starting in 2 seconds..."), 1);
}

#[test]
fn interrupt_while_viewing_saves_nothing() {
    // the start pause passes, the viewing wait is cut short
    let mut input = ScriptedLineSource::new(["1", "1", "5", "n", "3", "n", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::interrupting_after(1);
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    assert_eq!(outcome.report.end, SessionEnd::Interrupted);
    assert_eq!(outcome.report.rounds_completed, 0);
    assert_eq!(outcome.visited.last(), Some(&Phase::Presenting));
    assert!(sink.records.is_empty());
    assert!(screen.contains("Session interrupted. Goodbye!"));
    assert!(!screen.contains("Score:"));
}

#[test]
fn interrupt_at_the_recall_prompt_saves_nothing() {
    let mut input = ScriptedLineSource::new(["1", "1", "0", "n", "3", "n", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    assert_eq!(outcome.report.end, SessionEnd::Interrupted);
    assert_eq!(outcome.visited.last(), Some(&Phase::AwaitingRecall));
    assert!(sink.records.is_empty());
    assert_eq!(input.prompts().last().map(String::as_str), Some("Your answer: "));
}

#[test]
fn interrupt_during_the_challenge_saves_nothing() {
    // math on, but no answer ever arrives
    let mut input = ScriptedLineSource::new(["1", "1", "0", "n", "3", "y", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    assert_eq!(outcome.report.end, SessionEnd::Interrupted);
    assert_eq!(outcome.report.rounds_completed, 0);
    assert_eq!(outcome.visited.last(), Some(&Phase::Challenging));
    assert!(sink.records.is_empty());
    assert!(screen.contains("Solve this problem:"));
    assert!(screen.contains("Session interrupted. Goodbye!"));
    assert!(!screen.contains("Score:"));
}

#[test]
fn interrupt_during_the_countdown_saves_nothing() {
    // start pause and viewing pass, then the fourth countdown second is cut
    let mut input = ScriptedLineSource::new(["1", "1", "0", "n", "3", "n", "y"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::interrupting_after(5);
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    assert_eq!(outcome.report.end, SessionEnd::Interrupted);
    assert_eq!(outcome.visited.last(), Some(&Phase::Delaying));
    assert_eq!(clock.sleeps().len(), 5);
    assert!(screen.contains("Waiting... (27s left)"));
    assert!(!screen.contains("Waiting... (26s left)"));
    assert!(sink.records.is_empty());
    assert_eq!(input.remaining(), 0);
    assert!(!input.prompts().iter().any(|p| p == "Your answer: "));
}

#[test]
fn interrupt_during_configuration_leaves_no_config() {
    let mut input = ScriptedLineSource::new(["2"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        None,
    );

    assert_eq!(outcome.report.end, SessionEnd::Interrupted);
    assert_eq!(outcome.config, None);
    assert_eq!(outcome.visited, [Phase::Configuring]);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn failed_save_still_shows_the_score() {
    let mut input = ScriptedLineSource::new(["1", "1", "0", "n", "2", "n", "n", "", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut BrokenSink,
        None,
    );

    assert_eq!(outcome.report.end, SessionEnd::Finished);
    assert_eq!(outcome.report.rounds_completed, 1);
    assert_eq!(outcome.report.records_saved, 0);
    assert!(screen.contains("Score: 0.0% (0/2)"));
    assert!(screen.contains("(missing)"));
    assert!(screen.contains("Warning: this session could not be saved"));
    assert!(screen.contains("Thanks for playing!"));
}

#[test]
fn preset_skips_the_questions() {
    let words = first_words(3).join(" ");
    let mut input = ScriptedLineSource::new([words.as_str(), "no"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        Some(basic_config()),
    );

    assert!(screen.contains("Using your last settings."));
    assert_eq!(input.prompts(), ["Your answer: ", "Play again? (y/n): "]);
    assert_eq!(outcome.config, Some(basic_config()));
    assert_eq!(sink.records[0].score_percent, 100.0);
}

#[test]
fn enormous_delay_saturates_instead_of_wrapping() {
    let preset = Config {
        delay_seconds: 1e300,
        ..basic_config()
    };
    let mut input = ScriptedLineSource::new(["", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        Some(preset),
    );

    assert_eq!(outcome.report.end, SessionEnd::Finished);
    assert_eq!(clock.sleeps()[1], Duration::MAX);
}

#[test]
fn invalid_preset_falls_back_to_questions() {
    let mut preset = basic_config();
    preset.letters_only = true;
    preset.word_count = 40;

    let mut input = ScriptedLineSource::new(["1", "1", "0", "y", "2", "n", "n", "a b", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut sink = CollectingSink::default();

    let outcome = play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut sink,
        Some(preset),
    );

    assert!(!screen.contains("Using your last settings."));
    assert_eq!(input.prompts()[0], "Choose display type (1 or 2): ");
    assert_eq!(outcome.config.map(|c| c.word_count), Some(2));
    assert_eq!(sink.records[0].score_percent, 100.0);
}

#[test]
fn rounds_land_in_the_session_database() {
    let mut input = ScriptedLineSource::new(["1", "2", "0", "y", "3", "n", "n", "c x a", "n"]);
    let mut screen = RecordingScreen::new();
    let mut clock = TestClock::new();
    let mut db = SessionDb::open_in_memory().unwrap();

    play(
        &mut input,
        &mut screen,
        &mut clock,
        &mut FirstTokens::default(),
        &mut db,
        None,
    );

    let sessions = db.recent_sessions(5).unwrap();
    assert_eq!(sessions.len(), 1);
    let record = &sessions[0].record;
    assert_eq!(record.stimulus, "A B C");
    assert_eq!(record.submission, "c x a");
    assert_eq!(record.score_percent, 66.7);
    assert!(screen.contains("Words you MISSED:"));
    assert!(screen.contains("Quiz data saved to: memory (session #1)"));
}
