use crate::constraints::{ConstraintError, ContradictionPolicy};
use crate::filter::{LineFilter, RegexFilter, RipgrepFilter};
use crate::game_state::{DEFAULT_MAX_TURNS, SessionConfig, TurnInterface, UserAction};
use crate::guess::{Token, describe_tokens};
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Narrows a word list from coded guess results.
///
/// Enter one guess result per turn: a bare letter is not in the word,
/// `-x` means x is in the word but not here, `+x` means x is right here.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a newline-delimited word list file
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<PathBuf>,

    /// Number of turns before the session ends
    #[arg(short = 't', long = "turns", default_value_t = DEFAULT_MAX_TURNS)]
    pub max_turns: usize,

    /// Line matcher used for filtering
    #[arg(long, value_enum, default_value_t = Backend::Regex)]
    pub backend: Backend,

    /// ripgrep executable used by the ripgrep backend
    #[arg(long = "rg-path", default_value = "rg")]
    pub rg_path: String,

    /// How to treat a letter marked both absent and present
    #[arg(long = "contradictions", value_enum, default_value_t = ContradictionPolicy::Keep)]
    pub policy: ContradictionPolicy,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Match in-process
    Regex,
    /// Pipe through an external `rg`
    Ripgrep,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_turns: self.max_turns,
            policy: self.policy,
        }
    }

    pub fn line_filter(&self) -> Box<dyn LineFilter> {
        match self.backend {
            Backend::Regex => Box::new(RegexFilter),
            Backend::Ripgrep => Box::new(RipgrepFilter::new(self.rg_path.clone())),
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

fn is_stop_word(input: &str) -> bool {
    input.is_empty() || input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

pub fn read_guess<R: BufRead>(reader: &mut R, turn: usize, max_turns: usize) -> io::Result<UserAction> {
    println!("\nEnter guess result {turn}/{max_turns} (empty line or 'exit' to stop):");
    io::stdout().flush()?;
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(UserAction::Exit);
    }
    let input = input.trim();
    if is_stop_word(input) {
        Ok(UserAction::Exit)
    } else {
        Ok(UserAction::Guess(input.to_string()))
    }
}

pub fn display_guess(tokens: &[Token]) {
    println!("You guessed '{}'", describe_tokens(tokens));
}

pub fn display_pattern(pattern: &str) {
    println!("regex: {pattern}");
}

pub fn display_candidates(candidates: &[String]) {
    println!("Possible matches ({}):", candidates.len());
    for word in candidates {
        println!("{word}");
    }
}

pub fn display_rejected_guess(guess: &str, error: &ConstraintError) {
    println!("Ignoring '{guess}': {error}. Try again.");
}

pub fn display_contradictions(letters: &[char]) {
    let letters: String = letters.iter().collect();
    println!("Warning: '{letters}' marked both absent and present.");
}

pub fn display_no_candidates_message() {
    println!("No candidates remain. Check your inputs.");
}

pub fn display_solution_found(solution: &str) {
    println!("Solution found: {solution}");
}

pub fn display_exit_message() {
    println!("Exiting.");
}

/// Stdin/stdout implementation of [`TurnInterface`].
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> TurnInterface for CliInterface<R> {
    fn read_guess(&mut self, turn: usize, max_turns: usize) -> io::Result<UserAction> {
        read_guess(&mut self.reader, turn, max_turns)
    }

    fn display_guess(&mut self, tokens: &[Token]) {
        display_guess(tokens);
    }

    fn display_pattern(&mut self, pattern: &str) {
        display_pattern(pattern);
    }

    fn display_candidates(&mut self, candidates: &[String]) {
        display_candidates(candidates);
    }

    fn display_rejected_guess(&mut self, guess: &str, error: &ConstraintError) {
        display_rejected_guess(guess, error);
    }

    fn display_contradictions(&mut self, letters: &[char]) {
        display_contradictions(letters);
    }

    fn display_no_candidates_message(&mut self) {
        display_no_candidates_message();
    }

    fn display_solution_found(&mut self, solution: &str) {
        display_solution_found(solution);
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }
}
