use std::io::{self, stdin};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use recall::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, QuizMode},
    runtime::{Clock, LineSource, StdinLineSource, SystemClock, TerminalClock, TerminalLineSource},
    session::{Collaborators, Quiz, SessionEnd},
    stimulus::{RandomSource, RngSource},
    store::{CsvRecordWriter, RecordSink, SessionDb},
    ui::{history::history_lines, screen::ConsoleScreen},
    vocabulary::Vocabularies,
};

/// memory training quiz: memorize words or letters, then recall them
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Shows a random set of words or letters for a while, asks you to recall them, and scores the answer by exact order or by membership. Every round is saved so progress can be reviewed with `recall history`."
)]
pub struct Cli {
    /// directory holding the session database, CSV exports and saved settings
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// seed the random source for a reproducible run
    #[clap(long)]
    seed: Option<u64>,

    /// reuse the settings of the previous run instead of asking
    #[clap(long)]
    last: bool,

    /// also export every round to its own CSV file
    #[clap(long)]
    csv: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// play rounds until you stop (default)
    Play,
    /// list recent rounds and score statistics
    History {
        /// number of rounds to list
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// only show rounds of this quiz type
        #[clap(short, long, value_enum)]
        mode: Option<QuizMode>,
    },
}

impl Cli {
    fn dirs(&self) -> AppDirs {
        match &self.data_dir {
            Some(dir) => AppDirs::with_data_dir(dir),
            None => AppDirs::resolve(),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.data_dir {
            Some(dir) => FileConfigStore::with_path(dir.join("config.json")),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Some(Command::History { limit, mode }) => history(&cli, *limit, *mode),
        Some(Command::Play) | None => play(&cli),
    }
}

fn play(cli: &Cli) -> anyhow::Result<()> {
    let dirs = cli.dirs();
    let vocabularies = Vocabularies::load()?;
    let config_store = cli.config_store();

    let preset = if cli.last {
        let saved = config_store.load();
        if saved.is_none() {
            println!("No saved settings found, asking instead.");
        }
        saved
    } else {
        None
    };

    let db = SessionDb::open(dirs.db_path())
        .with_context(|| format!("opening session database {}", dirs.db_path().display()))?;
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(db)];
    if cli.csv {
        sinks.push(Box::new(CsvRecordWriter::new(dirs.csv_dir())));
    }

    let mut rng: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(RngSource::seeded(seed)),
        None => Box::new(RngSource::from_entropy()),
    };

    // piped input gets plain line reads and uninterruptible sleeps
    let interactive = stdin().is_tty();
    let (mut input, mut clock): (Box<dyn LineSource>, Box<dyn Clock>) = if interactive {
        (Box::new(TerminalLineSource::new()), Box::new(TerminalClock))
    } else {
        (Box::new(StdinLineSource::stdin()), Box::new(SystemClock))
    };
    let mut screen = ConsoleScreen::new();

    let mut quiz = Quiz::new(
        Collaborators {
            input: input.as_mut(),
            screen: &mut screen,
            clock: clock.as_mut(),
            rng: rng.as_mut(),
            sink: &mut sinks,
        },
        vocabularies,
    )
    .with_preset(preset);

    let report = quiz.run()?;
    if let Some(config) = quiz.config() {
        if let Err(e) = config_store.save(config) {
            tracing::warn!("could not remember settings: {e}");
        }
    }

    tracing::info!(
        rounds = report.rounds_completed,
        saved = report.records_saved,
        interrupted = report.end == SessionEnd::Interrupted,
        "quiz finished"
    );
    Ok(())
}

fn history(cli: &Cli, limit: usize, mode: Option<QuizMode>) -> anyhow::Result<()> {
    let db_path = cli.dirs().db_path();
    if !db_path.exists() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    let db = SessionDb::open(&db_path)
        .with_context(|| format!("opening session database {}", db_path.display()))?;
    let sessions = match mode {
        Some(quiz_mode) => db.sessions_by_mode(quiz_mode, limit)?,
        None => db.recent_sessions(limit)?,
    };
    let mut summary = db.summary()?;
    summary.retain(|s| mode.map_or(true, |m| s.quiz_mode == m));
    for line in history_lines(&sessions, &summary) {
        println!("{line}");
    }
    Ok(())
}
