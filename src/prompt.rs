//! Prompt-until-valid helpers used to collect the configuration.

use crate::config::{valid_delay, Config, DisplayMode, QuizMode};
use crate::runtime::{InputError, LineSource};
use crate::ui::{screen::Screen, Tone};
use crate::vocabulary::{Vocabularies, VocabularyKind};

/// One question: shown until `parse` accepts the answer. Rejected answers
/// print `error` and ask again; only an interrupt ends the loop early.
pub fn ask<T>(
    input: &mut dyn LineSource,
    screen: &mut dyn Screen,
    prompt: &str,
    error: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, InputError> {
    loop {
        let line = input.read_line(prompt)?;
        if let Some(value) = parse(line.trim()) {
            return Ok(value);
        }
        screen.say(Tone::Warn, error);
    }
}

pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Loose "yes" check for questions where anything else means no
pub fn is_yes(answer: &str) -> bool {
    parse_yes_no(answer.trim()) == Some(true)
}

fn parse_choice(answer: &str) -> Option<u8> {
    match answer.parse::<u8>() {
        Ok(n @ (1 | 2)) => Some(n),
        _ => None,
    }
}

pub fn ask_yes_no(
    input: &mut dyn LineSource,
    screen: &mut dyn Screen,
    prompt: &str,
) -> Result<bool, InputError> {
    ask(input, screen, prompt, "Please select either y or n", parse_yes_no)
}

/// Walk through every configuration question. The letters question comes
/// before the count so the count can be checked against the right list.
pub fn collect_config(
    input: &mut dyn LineSource,
    screen: &mut dyn Screen,
    vocabularies: &Vocabularies,
) -> Result<Config, InputError> {
    screen.blank();
    screen.say(Tone::Heading, "Display Options:");
    screen.say(Tone::Plain, "1. Full display (show all words at once)");
    screen.say(Tone::Plain, "2. Sequential display (show words one at a time)");
    let display_mode = match ask(
        input,
        screen,
        "Choose display type (1 or 2): ",
        "Please enter 1 or 2",
        parse_choice,
    )? {
        1 => DisplayMode::Full,
        _ => DisplayMode::Sequential,
    };

    screen.blank();
    screen.say(Tone::Heading, "Quiz Options:");
    screen.say(Tone::Plain, "1. Ordered quiz (order matters)");
    screen.say(Tone::Plain, "2. Unordered quiz (order doesn't matter)");
    let quiz_mode = match ask(
        input,
        screen,
        "Choose quiz type (1 or 2): ",
        "Please enter 1 or 2",
        parse_choice,
    )? {
        1 => QuizMode::Ordered,
        _ => QuizMode::Unordered,
    };

    let delay_seconds = ask(
        input,
        screen,
        "Delay in seconds: ",
        "Please enter a valid number of seconds (0 or more)",
        |s| s.parse::<f64>().ok().filter(|d| valid_delay(*d)),
    )?;

    let letters_only = ask_yes_no(input, screen, "Use letters instead of words? (y/n) ")?;

    let available = vocabularies
        .get(VocabularyKind::from_letters_only(letters_only))
        .len();
    let word_count = ask(
        input,
        screen,
        &format!("Items to display (1-{available}): "),
        &format!("Please enter a whole number from 1 to {available}"),
        |s| {
            s.parse::<usize>()
                .ok()
                .filter(|n| (1..=available).contains(n))
        },
    )?;

    let math_challenge = ask_yes_no(input, screen, "Math question before answer? (y/n) ")?;
    let fixed_delay = ask_yes_no(input, screen, "30 second delay before answer? (y/n) ")?;

    Ok(Config {
        display_mode,
        quiz_mode,
        delay_seconds,
        word_count,
        math_challenge,
        fixed_delay,
        letters_only,
    })
}
