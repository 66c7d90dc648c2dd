use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::challenge::{generate_challenge, run_challenge_loop};
use crate::compare::{compare_ordered, compare_unordered, ComparisonResult};
use crate::config::{Config, DisplayMode, QuizMode};
use crate::prompt::{collect_config, is_yes};
use crate::runtime::{Clock, InputError, LineSource};
use crate::stimulus::{generate_stimulus, RandomSource, Stimulus, StimulusError};
use crate::store::RecordSink;
use crate::ui::{self, comparison::score_line, screen::Screen, Tone};
use crate::util::{hostname, round_to};
use crate::vocabulary::{Vocabularies, VocabularyKind};

/// Extra wait before recall when the fixed delay is on
pub const FIXED_DELAY_SECS: u64 = 30;
const START_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Configuring,
    GeneratingStimulus,
    Presenting,
    Delaying,
    Challenging,
    AwaitingRecall,
    Scoring,
    Persisting,
    AskReplay,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeOutcome {
    pub question: String,
    pub failed_attempts: u32,
}

/// Everything worth keeping about one completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Local>,
    pub hostname: String,
    pub display_mode: DisplayMode,
    pub quiz_mode: QuizMode,
    pub delay_seconds: f64,
    pub word_count: usize,
    pub math_challenge: bool,
    pub fixed_delay: bool,
    pub letters_only: bool,
    pub stimulus: String,
    pub submission: String,
    pub score_percent: f64,
    pub challenge_question: Option<String>,
    pub failed_challenge_attempts: Option<u32>,
}

impl SessionRecord {
    pub fn build(
        timestamp: DateTime<Local>,
        hostname: &str,
        config: &Config,
        stimulus: &Stimulus,
        submission: &[String],
        result: &ComparisonResult,
        challenge: Option<&ChallengeOutcome>,
    ) -> Self {
        Self {
            timestamp,
            hostname: hostname.to_string(),
            display_mode: config.display_mode,
            quiz_mode: config.quiz_mode,
            delay_seconds: config.delay_seconds,
            word_count: config.word_count,
            math_challenge: config.math_challenge,
            fixed_delay: config.fixed_delay,
            letters_only: config.letters_only,
            stimulus: stimulus.joined(),
            submission: submission.join(" "),
            score_percent: round_to(result.score_percent, 1),
            challenge_question: challenge.map(|c| c.question.clone()),
            failed_challenge_attempts: challenge.map(|c| c.failed_attempts),
        }
    }
}

#[derive(Debug, Error)]
pub enum QuizError {
    /// Handled inside [`Quiz::run`]; never returned from it.
    #[error("session interrupted")]
    Interrupted,
    #[error("terminal failure: {0}")]
    Terminal(#[source] std::io::Error),
    #[error("configuration error: {0}")]
    Stimulus(#[from] StimulusError),
}

impl From<InputError> for QuizError {
    fn from(e: InputError) -> Self {
        match e {
            InputError::Interrupted => QuizError::Interrupted,
            InputError::Io(io) => QuizError::Terminal(io),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user declined another round
    Finished,
    /// The user cancelled at a prompt or during a wait
    Interrupted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub end: SessionEnd,
    pub rounds_completed: usize,
    pub records_saved: usize,
    pub scores: Vec<f64>,
}

/// The external pieces a quiz talks to
pub struct Collaborators<'a> {
    pub input: &'a mut dyn LineSource,
    pub screen: &'a mut dyn Screen,
    pub clock: &'a mut dyn Clock,
    pub rng: &'a mut dyn RandomSource,
    pub sink: &'a mut dyn RecordSink,
}

/// In-flight round data; dropped without saving if the round is cut short
#[derive(Debug)]
struct Round {
    config: Config,
    started_at: DateTime<Local>,
    stimulus: Stimulus,
    challenge: Option<ChallengeOutcome>,
    submission: Vec<String>,
}

#[derive(Debug)]
enum State {
    Configuring,
    GeneratingStimulus,
    Presenting(Round),
    Delaying(Round),
    Challenging(Round),
    AwaitingRecall(Round),
    Scoring(Round),
    Persisting(Box<SessionRecord>),
    AskReplay,
    Terminated,
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            State::Configuring => Phase::Configuring,
            State::GeneratingStimulus => Phase::GeneratingStimulus,
            State::Presenting(_) => Phase::Presenting,
            State::Delaying(_) => Phase::Delaying,
            State::Challenging(_) => Phase::Challenging,
            State::AwaitingRecall(_) => Phase::AwaitingRecall,
            State::Scoring(_) => Phase::Scoring,
            State::Persisting(_) => Phase::Persisting,
            State::AskReplay => Phase::AskReplay,
            State::Terminated => Phase::Terminated,
        }
    }
}

/// Drives rounds until the user stops. Configuration happens once; every
/// later round reuses it.
pub struct Quiz<'a> {
    io: Collaborators<'a>,
    vocabularies: Vocabularies,
    preset: Option<Config>,
    config: Option<Config>,
    hostname: String,
    visited: Vec<Phase>,
    rounds_completed: usize,
    records_saved: usize,
    scores: Vec<f64>,
}

impl<'a> Quiz<'a> {
    pub fn new(io: Collaborators<'a>, vocabularies: Vocabularies) -> Self {
        Self {
            io,
            vocabularies,
            preset: None,
            config: None,
            hostname: hostname(),
            visited: Vec::new(),
            rounds_completed: 0,
            records_saved: 0,
            scores: Vec::new(),
        }
    }

    /// Skip the questions and use `config` if it is valid
    pub fn with_preset(mut self, config: Option<Config>) -> Self {
        self.preset = config;
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// The configuration in use, once the first phase has completed
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Every phase entered so far, in order
    pub fn visited(&self) -> &[Phase] {
        &self.visited
    }

    pub fn run(&mut self) -> Result<SessionReport, QuizError> {
        let mut state = State::Configuring;
        let end = loop {
            let phase = state.phase();
            self.visited.push(phase);
            tracing::debug!(%phase, "entering phase");
            if let State::Terminated = state {
                break SessionEnd::Finished;
            }

            state = match self.step(state) {
                Ok(next) => next,
                Err(QuizError::Interrupted) => {
                    tracing::info!(%phase, "session interrupted");
                    self.io.screen.blank();
                    self.io.screen.say(Tone::Warn, "Session interrupted. Goodbye!");
                    break SessionEnd::Interrupted;
                }
                Err(e) => return Err(e),
            };
        };

        Ok(SessionReport {
            end,
            rounds_completed: self.rounds_completed,
            records_saved: self.records_saved,
            scores: self.scores.clone(),
        })
    }

    fn step(&mut self, state: State) -> Result<State, QuizError> {
        let next = match state {
            State::Configuring => {
                self.configure()?;
                State::GeneratingStimulus
            }
            State::GeneratingStimulus => {
                let Some(config) = &self.config else {
                    return Ok(State::Configuring);
                };
                let vocab = self
                    .vocabularies
                    .get(VocabularyKind::from_letters_only(config.letters_only));
                let stimulus = generate_stimulus(vocab, config.word_count, &mut *self.io.rng)?;
                State::Presenting(Round {
                    config: config.clone(),
                    started_at: Local::now(),
                    stimulus,
                    challenge: None,
                    submission: Vec::new(),
                })
            }
            State::Presenting(round) => {
                self.present(&round)?;
                if round.config.fixed_delay {
                    State::Delaying(round)
                } else {
                    Self::before_recall(round)
                }
            }
            State::Delaying(round) => {
                self.fixed_delay()?;
                Self::before_recall(round)
            }
            State::Challenging(mut round) => {
                let challenge = generate_challenge(&mut *self.io.rng);
                let failed_attempts =
                    run_challenge_loop(&challenge, &mut *self.io.input, &mut *self.io.screen)?;
                self.io.screen.clear();
                round.challenge = Some(ChallengeOutcome {
                    question: challenge.question(),
                    failed_attempts,
                });
                State::AwaitingRecall(round)
            }
            State::AwaitingRecall(mut round) => {
                let screen = &mut *self.io.screen;
                match round.config.quiz_mode {
                    QuizMode::Ordered => {
                        screen.say(Tone::Heading, "ORDERED QUIZ");
                        screen.say(
                            Tone::Plain,
                            "Enter the words in the EXACT order they appeared, separated by spaces:",
                        );
                    }
                    QuizMode::Unordered => {
                        screen.say(Tone::Heading, "UNORDERED QUIZ");
                        screen.say(
                            Tone::Plain,
                            "Enter all the words (order doesn't matter), separated by spaces:",
                        );
                    }
                }
                round.submission = self.io.input.read_tokens("Your answer: ")?;
                State::Scoring(round)
            }
            State::Scoring(round) => {
                let config = &round.config;
                let result = match config.quiz_mode {
                    QuizMode::Ordered => compare_ordered(round.stimulus.tokens(), &round.submission),
                    QuizMode::Unordered => {
                        compare_unordered(round.stimulus.tokens(), &round.submission)
                    }
                };
                ui::show_comparison(&mut *self.io.screen, &result);
                tracing::info!(score = %score_line(&result), mode = %config.quiz_mode, "round scored");
                self.scores.push(result.score_percent);

                State::Persisting(Box::new(SessionRecord::build(
                    round.started_at,
                    &self.hostname,
                    config,
                    &round.stimulus,
                    &round.submission,
                    &result,
                    round.challenge.as_ref(),
                )))
            }
            State::Persisting(record) => {
                self.rounds_completed += 1;
                match self.io.sink.save(&record) {
                    Ok(destination) => {
                        self.records_saved += 1;
                        self.io
                            .screen
                            .say(Tone::Dim, &format!("Quiz data saved to: {destination}"));
                    }
                    Err(e) => {
                        tracing::warn!("failed to save session: {e}");
                        self.io.screen.say(
                            Tone::Warn,
                            &format!("Warning: this session could not be saved ({e})"),
                        );
                    }
                }
                State::AskReplay
            }
            State::AskReplay => {
                self.io.screen.blank();
                self.io.screen.say(Tone::Dim, &"=".repeat(50));
                let answer = self.io.input.read_line("Play again? (y/n): ")?;
                if is_yes(&answer) {
                    self.io.screen.clear();
                    State::GeneratingStimulus
                } else {
                    self.io.screen.say(Tone::Heading, "Thanks for playing!");
                    State::Terminated
                }
            }
            State::Terminated => State::Terminated,
        };
        Ok(next)
    }

    fn before_recall(round: Round) -> State {
        if round.config.math_challenge {
            State::Challenging(round)
        } else {
            State::AwaitingRecall(round)
        }
    }

    fn configure(&mut self) -> Result<(), QuizError> {
        self.io.screen.clear();
        ui::show_title(&mut *self.io.screen);

        let preset = self.preset.take().filter(|cfg| {
            let available = self
                .vocabularies
                .get(VocabularyKind::from_letters_only(cfg.letters_only))
                .len();
            match cfg.validate(available) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("saved configuration rejected: {e}");
                    false
                }
            }
        });

        let config = match preset {
            Some(cfg) => {
                self.io
                    .screen
                    .say(Tone::Plain, "Using your last settings.");
                cfg
            }
            None => collect_config(&mut *self.io.input, &mut *self.io.screen, &self.vocabularies)?,
        };
        tracing::debug!(?config, "configured");

        self.io.screen.clear();
        self.io.screen.blank();
        self.io.screen.say(Tone::Heading, "Starting in 2 seconds...");
        self.io.clock.sleep(START_PAUSE)?;
        self.config = Some(config);
        Ok(())
    }

    fn present(&mut self, round: &Round) -> Result<(), QuizError> {
        let stimulus = &round.stimulus;
        let view_time =
            Duration::try_from_secs_f64(round.config.delay_seconds).unwrap_or(Duration::MAX);
        let screen = &mut *self.io.screen;
        let clock = &mut *self.io.clock;

        screen.clear();
        match round.config.display_mode {
            DisplayMode::Full => {
                ui::show_full_stimulus(screen, stimulus.tokens());
                clock.sleep(view_time)?;
            }
            DisplayMode::Sequential => {
                for (i, token) in stimulus.tokens().iter().enumerate() {
                    screen.clear();
                    ui::show_stimulus_item(screen, i + 1, stimulus.len(), token);
                    clock.sleep(view_time)?;
                }
            }
        }
        screen.clear();
        Ok(())
    }

    fn fixed_delay(&mut self) -> Result<(), QuizError> {
        for left in (1..=FIXED_DELAY_SECS).rev() {
            ui::show_countdown(&mut *self.io.screen, left);
            self.io.clock.sleep(Duration::from_secs(1))?;
        }
        Ok(())
    }
}
