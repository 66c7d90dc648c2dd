use crate::runtime::{InputError, LineSource};
use crate::stimulus::RandomSource;
use crate::ui::{screen::Screen, Tone};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "×")]
    Multiply,
}

impl Operator {
    const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    /// Inclusive operand range: four digits to add, three to subtract, two to
    /// multiply.
    pub fn operand_range(self) -> (i64, i64) {
        match self {
            Operator::Add => (1000, 9999),
            Operator::Subtract => (100, 999),
            Operator::Multiply => (10, 99),
        }
    }
}

/// An arithmetic problem solved between viewing and recall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub left: i64,
    pub right: i64,
    pub operator: Operator,
}

impl Challenge {
    pub fn question(&self) -> String {
        format!("{} {} {}", self.left, self.operator, self.right)
    }

    pub fn answer(&self) -> i64 {
        match self.operator {
            Operator::Add => self.left + self.right,
            Operator::Subtract => self.left - self.right,
            Operator::Multiply => self.left * self.right,
        }
    }
}

pub fn generate_challenge(rng: &mut dyn RandomSource) -> Challenge {
    let operator = Operator::ALL[rng.range(0, Operator::ALL.len() as i64 - 1) as usize];
    let (low, high) = operator.operand_range();
    let mut left = rng.range(low, high);
    let mut right = rng.range(low, high);
    if operator == Operator::Subtract && left < right {
        std::mem::swap(&mut left, &mut right);
    }
    Challenge {
        left,
        right,
        operator,
    }
}

/// Prompt until the right answer is given and return how many wrong numbers
/// came before it. Lines that are not numbers are not counted.
pub fn run_challenge_loop(
    challenge: &Challenge,
    input: &mut dyn LineSource,
    screen: &mut dyn Screen,
) -> Result<u32, InputError> {
    screen.say(Tone::Heading, &format!("Solve this problem: {}", challenge.question()));

    let mut wrong = 0u32;
    loop {
        let line = input.read_line("Your answer: ")?;
        match line.trim().parse::<i64>() {
            Err(_) => screen.say(Tone::Warn, "Please enter a valid number."),
            Ok(n) if n == challenge.answer() => {
                if wrong == 0 {
                    screen.say(Tone::Good, "Correct! Well done!");
                } else {
                    screen.say(
                        Tone::Good,
                        &format!("Correct! You got it in {} attempts.", wrong + 1),
                    );
                }
                tracing::debug!(question = %challenge.question(), wrong, "challenge solved");
                return Ok(wrong);
            }
            Ok(_) => {
                wrong += 1;
                screen.say(Tone::Bad, "Incorrect. Try again!");
            }
        }
    }
}
