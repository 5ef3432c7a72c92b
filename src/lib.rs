// Library interface for wordle-regex
// This allows integration tests to access internal modules

pub mod cli;
pub mod constraints;
pub mod filter;
pub mod game_state;
pub mod guess;
pub mod logging;
pub mod wordbank;

pub use constraints::{ConstraintError, ContradictionPolicy, Matcher, build_matcher, matcher_from_tokens};
pub use filter::{FilterError, FilterOutcome, LineFilter, RegexFilter, RipgrepFilter, filter_candidates};
pub use game_state::{GuessHistory, SessionConfig, SessionEnd, SessionError, TurnError, game_loop};
pub use guess::{Token, WORD_LENGTH, parse_guess_result};
pub use wordbank::{WordSource, load_wordbank_from_file, load_wordbank_from_str};
