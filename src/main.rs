use std::io;
use std::process;
use wordle_regex::cli::{CliInterface, parse_cli};
use wordle_regex::game_state::{SessionEnd, game_loop};
use wordle_regex::info_log;
use wordle_regex::logging::init_logger;
use wordle_regex::wordbank::WordSource;

fn main() {
    let cli = parse_cli();
    init_logger(cli.verbose);

    let source = match WordSource::resolve(cli.wordbank_path.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            log::error!("Failed to load word list: {e}");
            process::exit(1);
        }
    };
    log::info!("Loaded {} words.", source.len());

    info_log!("Filtering with the {:?} backend", cli.backend);
    let filter = cli.line_filter();
    let mut interface = CliInterface::new(io::stdin().lock());

    match game_loop(&source, &*filter, cli.session_config(), &mut interface) {
        Ok(summary) => {
            if summary.end == SessionEnd::OutOfTurns {
                log::info!(
                    "Out of turns with {} candidates left.",
                    summary.candidates.len()
                );
            }
        }
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    }
}
