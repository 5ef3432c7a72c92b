use crate::constraints::{ConstraintError, ContradictionPolicy, Matcher, matcher_from_tokens};
use crate::debug_log;
use crate::filter::{FilterError, LineFilter, filter_candidates};
use crate::guess::{Token, parse_guess_result};
use crate::wordbank::WordSource;
use std::io;
use std::iter;
use thiserror::Error;

pub const DEFAULT_MAX_TURNS: usize = 6;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("filtering failed: {0}")]
    Filter(#[from] FilterError),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Why a single turn produced no result.
#[derive(Error, Debug)]
pub enum TurnError {
    /// The guess was malformed; the session can ask again.
    #[error(transparent)]
    Guess(#[from] ConstraintError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}

pub enum UserAction {
    Guess(String),
    Exit,
}

/// Line-based I/O for a session. The CLI implements it over stdin/stdout;
/// tests script it.
pub trait TurnInterface {
    fn read_guess(&mut self, turn: usize, max_turns: usize) -> io::Result<UserAction>;
    fn display_guess(&mut self, tokens: &[Token]);
    fn display_pattern(&mut self, pattern: &str);
    fn display_candidates(&mut self, candidates: &[String]);
    fn display_rejected_guess(&mut self, guess: &str, error: &ConstraintError);
    fn display_contradictions(&mut self, letters: &[char]);
    fn display_no_candidates_message(&mut self);
    fn display_solution_found(&mut self, solution: &str);
    fn display_exit_message(&mut self);
}

/// Every guess result accepted so far, oldest first, kept with its tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessHistory {
    guesses: Vec<String>,
    tokens: Vec<Vec<Token>>,
}

impl GuessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, guess: impl Into<String>, tokens: Vec<Token>) {
        self.guesses.push(guess.into());
        self.tokens.push(tokens);
    }

    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.guesses
    }

    /// The constraints implied by the whole history plus one more guess.
    /// The history itself is left untouched.
    pub fn matcher_with(
        &self,
        tokens: &[Token],
        policy: ContradictionPolicy,
    ) -> Result<Matcher, ConstraintError> {
        let replayed = self.tokens.iter().map(Vec::as_slice);
        matcher_from_tokens(replayed.chain(iter::once(tokens)), policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_turns: usize,
    pub policy: ContradictionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            policy: ContradictionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    Continue,
    Solved(String),
    NoSolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    OutOfTurns,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub history: GuessHistory,
    /// Candidates after the last accepted turn.
    pub candidates: Vec<String>,
    pub end: SessionEnd,
}

fn check_game_state(candidates: &[String]) -> GameState {
    match candidates {
        [] => GameState::NoSolution,
        [only] => GameState::Solved(only.clone()),
        _ => GameState::Continue,
    }
}

/// Outcome of one accepted turn.
pub struct TurnResult {
    pub tokens: Vec<Token>,
    pub matcher: Matcher,
    pub candidates: Vec<String>,
}

/// Parses `guess`, builds the constraints for `history` + `guess` and
/// filters the source.
///
/// # Errors
///
/// [`TurnError::Guess`] for a malformed guess, [`TurnError::Filter`] when
/// the line filter cannot run.
pub fn run_turn<F: LineFilter + ?Sized>(
    history: &GuessHistory,
    guess: &str,
    source: &WordSource,
    filter: &F,
    policy: ContradictionPolicy,
) -> Result<TurnResult, TurnError> {
    let tokens = parse_guess_result(guess)?;
    let matcher = history.matcher_with(&tokens, policy)?;
    let candidates = filter_candidates(filter, &matcher, source)?;
    Ok(TurnResult {
        tokens,
        matcher,
        candidates,
    })
}

/// Runs turns until the turn limit is reached or the user stops.
///
/// Zero or one candidate is reported but does not end the session: a later
/// guess can fix a different letter into a slot, or under
/// [`ContradictionPolicy::PreferPresent`] lift an exclusion.
///
/// # Errors
///
/// Returns [`SessionError`] when reading input fails or the line filter
/// cannot run. Malformed guesses are reported through the interface and do
/// not use up a turn.
pub fn game_loop<F, I>(
    source: &WordSource,
    filter: &F,
    config: SessionConfig,
    interface: &mut I,
) -> Result<SessionSummary, SessionError>
where
    F: LineFilter + ?Sized,
    I: TurnInterface + ?Sized,
{
    let mut history = GuessHistory::new();
    let mut candidates = source.words().to_vec();

    while history.len() < config.max_turns {
        let raw = match interface.read_guess(history.len() + 1, config.max_turns)? {
            UserAction::Exit => {
                interface.display_exit_message();
                return Ok(SessionSummary {
                    history,
                    candidates,
                    end: SessionEnd::Stopped,
                });
            }
            UserAction::Guess(raw) => raw,
        };

        let turn = match run_turn(&history, &raw, source, filter, config.policy) {
            Ok(turn) => turn,
            Err(TurnError::Guess(e)) => {
                log::warn!("Rejected guess '{raw}': {e}");
                interface.display_rejected_guess(&raw, &e);
                continue;
            }
            Err(TurnError::Filter(e)) => return Err(e.into()),
        };
        interface.display_guess(&turn.tokens);
        history.push(raw.trim().to_lowercase(), turn.tokens);

        if !turn.matcher.contradictions().is_empty() {
            log::warn!(
                "Letters marked both absent and present: {:?} (policy {:?})",
                turn.matcher.contradictions(),
                config.policy
            );
            interface.display_contradictions(turn.matcher.contradictions());
        }

        log::info!(
            "turn {}: regex {} -> {} candidates",
            history.len(),
            turn.matcher.pattern(),
            turn.candidates.len()
        );
        debug_log!("found letters: {:?}", turn.matcher.found());

        interface.display_pattern(turn.matcher.pattern());
        interface.display_candidates(&turn.candidates);
        candidates = turn.candidates;

        match check_game_state(&candidates) {
            GameState::Continue => {}
            GameState::Solved(word) => interface.display_solution_found(&word),
            GameState::NoSolution => interface.display_no_candidates_message(),
        }
    }

    Ok(SessionSummary {
        history,
        candidates,
        end: SessionEnd::OutOfTurns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOutcome, RegexFilter};
    use crate::wordbank::load_wordbank_from_str;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedInterface {
        inputs: VecDeque<String>,
        patterns: Vec<String>,
        candidate_lists: Vec<Vec<String>>,
        rejected: Vec<String>,
        contradictions: Vec<Vec<char>>,
        no_candidates: bool,
        solution: Option<String>,
        exited: bool,
    }

    impl ScriptedInterface {
        fn new(inputs: &[&str]) -> Self {
            Self {
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl TurnInterface for ScriptedInterface {
        fn read_guess(&mut self, _turn: usize, _max_turns: usize) -> io::Result<UserAction> {
            Ok(match self.inputs.pop_front() {
                Some(line) => UserAction::Guess(line),
                None => UserAction::Exit,
            })
        }
        fn display_guess(&mut self, _tokens: &[Token]) {}
        fn display_pattern(&mut self, pattern: &str) {
            self.patterns.push(pattern.to_string());
        }
        fn display_candidates(&mut self, candidates: &[String]) {
            self.candidate_lists.push(candidates.to_vec());
        }
        fn display_rejected_guess(&mut self, guess: &str, _error: &ConstraintError) {
            self.rejected.push(guess.to_string());
        }
        fn display_contradictions(&mut self, letters: &[char]) {
            self.contradictions.push(letters.to_vec());
        }
        fn display_no_candidates_message(&mut self) {
            self.no_candidates = true;
        }
        fn display_solution_found(&mut self, solution: &str) {
            self.solution = Some(solution.to_string());
        }
        fn display_exit_message(&mut self) {
            self.exited = true;
        }
    }

    fn source() -> WordSource {
        WordSource::new(load_wordbank_from_str(
            "apple\nspasm\nspray\nshout\ncrane\nopera\nstoop\nsport\nupset\nmouth\n",
        ))
    }

    fn play(inputs: &[&str], config: SessionConfig) -> (SessionSummary, ScriptedInterface) {
        play_with(&source(), inputs, config)
    }

    fn play_with(
        source: &WordSource,
        inputs: &[&str],
        config: SessionConfig,
    ) -> (SessionSummary, ScriptedInterface) {
        let mut interface = ScriptedInterface::new(inputs);
        let summary = game_loop(source, &RegexFilter, config, &mut interface).unwrap();
        (summary, interface)
    }

    #[test]
    fn test_history_push_and_len() {
        let mut history = GuessHistory::new();
        assert!(history.is_empty());
        history.push("crane", parse_guess_result("crane").unwrap());
        history.push(String::from("-s+p"), parse_guess_result("-s+p").unwrap());
        assert_eq!(history.len(), 2);
        assert_eq!(history.as_slice(), &["crane".to_string(), "-s+p".to_string()]);
    }

    #[test]
    fn test_matcher_with_does_not_commit() {
        let mut history = GuessHistory::new();
        history.push("crane", parse_guess_result("crane").unwrap());
        let tokens = parse_guess_result("-s+p").unwrap();
        let matcher = history.matcher_with(&tokens, ContradictionPolicy::Keep).unwrap();
        assert_eq!(history.len(), 1);
        assert!(matcher.pattern().contains("[^cranes]"));
    }

    #[test]
    fn test_immediate_exit() {
        let (summary, interface) = play(&[], SessionConfig::default());
        assert!(interface.exited);
        assert_eq!(summary.end, SessionEnd::Stopped);
        assert!(summary.history.is_empty());
        assert_eq!(summary.candidates.len(), source().len());
    }

    #[test]
    fn test_turns_are_cumulative() {
        let (summary, interface) = play(&["crane", "-s+p"], SessionConfig::default());
        assert_eq!(summary.history.len(), 2);
        assert_eq!(
            interface.patterns,
            vec![
                "^[^crane][^crane][^crane][^crane][^crane]$".to_string(),
                "^[^cranes]p[^crane][^crane][^crane]$".to_string(),
            ]
        );
        // shout, stoop and mouth survive the first turn, nothing fits the second
        assert_eq!(
            interface.candidate_lists[0],
            vec!["shout".to_string(), "stoop".to_string(), "mouth".to_string()]
        );
        assert!(interface.no_candidates);
        assert!(summary.candidates.is_empty());
        assert_eq!(summary.end, SessionEnd::Stopped);
    }

    #[test]
    fn test_single_candidate_is_reported_and_session_continues() {
        let (summary, interface) = play(&["-s+p", "crane"], SessionConfig::default());
        assert_eq!(interface.solution.as_deref(), Some("upset"));
        assert_eq!(interface.candidate_lists[0], vec!["upset".to_string()]);
        assert_eq!(summary.history.len(), 2);
        assert_eq!(summary.end, SessionEnd::Stopped);
    }

    #[test]
    fn test_no_candidates_does_not_end_session() {
        let source = WordSource::new(load_wordbank_from_str("spasm\nspray\n"));
        let config = SessionConfig {
            policy: ContradictionPolicy::PreferPresent,
            ..SessionConfig::default()
        };
        let (summary, interface) = play_with(&source, &["s", "+s"], config);
        assert!(interface.no_candidates);
        assert!(interface.candidate_lists[0].is_empty());
        assert_eq!(summary.history.len(), 2);
        assert_eq!(summary.candidates, vec!["spasm".to_string(), "spray".to_string()]);
    }

    #[test]
    fn test_later_fixed_letter_overwrites_slot() {
        let (summary, interface) = play(&["+c", "+s"], SessionConfig::default());
        assert_eq!(interface.solution.as_deref(), Some("crane"));
        assert_eq!(
            summary.candidates,
            vec!["spasm", "spray", "shout", "stoop", "sport"]
        );
    }

    #[test]
    fn test_malformed_guess_does_not_use_a_turn() {
        let config = SessionConfig {
            max_turns: 1,
            ..SessionConfig::default()
        };
        let (summary, interface) = play(&["cr-", "crane"], config);
        assert_eq!(interface.rejected, vec!["cr-".to_string()]);
        assert_eq!(summary.history.as_slice(), &["crane".to_string()]);
        assert_eq!(summary.end, SessionEnd::OutOfTurns);
    }

    #[test]
    fn test_turn_limit() {
        let config = SessionConfig {
            max_turns: 2,
            ..SessionConfig::default()
        };
        let (summary, interface) = play(&["zzzzz", "qqqqq", "xxxxx"], config);
        assert_eq!(summary.end, SessionEnd::OutOfTurns);
        assert_eq!(summary.history.len(), 2);
        assert!(!interface.exited);
    }

    #[test]
    fn test_contradiction_is_reported() {
        let (_, interface) = play(&["shout", "-s"], SessionConfig::default());
        assert_eq!(interface.contradictions, vec![vec!['s']]);
    }

    #[test]
    fn test_prefer_present_policy_keeps_candidates() {
        let config = SessionConfig {
            policy: ContradictionPolicy::PreferPresent,
            ..SessionConfig::default()
        };
        let (summary, _) = play(&["zzzzs", "-s"], config);
        assert!(!summary.candidates.is_empty());
        assert!(summary.candidates.iter().all(|w| w.contains('s') && !w.starts_with('s')));
    }

    #[test]
    fn test_check_game_state() {
        assert_eq!(check_game_state(&[]), GameState::NoSolution);
        assert_eq!(
            check_game_state(&["crane".to_string()]),
            GameState::Solved("crane".to_string())
        );
        assert_eq!(
            check_game_state(&["crane".to_string(), "spray".to_string()]),
            GameState::Continue
        );
    }

    struct BrokenFilter;

    impl LineFilter for BrokenFilter {
        fn matching_lines(&self, _: &str, _: &str) -> Result<FilterOutcome, FilterError> {
            Err(FilterError::Io(io::Error::other("pipe closed")))
        }
    }

    #[test]
    fn test_filter_failure_ends_session_with_error() {
        let mut interface = ScriptedInterface::new(&["crane"]);
        let err = game_loop(&source(), &BrokenFilter, SessionConfig::default(), &mut interface)
            .unwrap_err();
        assert!(matches!(err, SessionError::Filter(_)));
    }
}
