use crate::guess::WORD_LENGTH;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const EMBEDDED_WORDBANK: &str = include_str!("resources/wordlist.txt");

const CONFIG_DIR_NAME: &str = "wordle-regex";
const WORDLIST_FILE_NAME: &str = "wordlist.txt";

fn normalize(line: &str) -> Option<String> {
    let word = line.trim().to_lowercase();
    (word.len() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_alphabetic())).then_some(word)
}

pub fn load_wordbank_from_str(data: &str) -> Vec<String> {
    data.lines().filter_map(normalize).collect()
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();
    for line in reader.lines() {
        if let Some(word) = normalize(&line?) {
            words.push(word);
        }
    }
    Ok(words)
}

/// `<config dir>/wordle-regex/wordlist.txt`, if the platform has a config dir.
pub fn default_wordbank_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(WORDLIST_FILE_NAME))
}

/// The word list every turn is filtered against, loaded once.
#[derive(Debug, Clone)]
pub struct WordSource {
    words: Vec<String>,
    text: String,
}

impl WordSource {
    pub fn new(words: Vec<String>) -> Self {
        let mut text = String::with_capacity(words.len() * (WORD_LENGTH + 1));
        for word in &words {
            text.push_str(word);
            text.push('\n');
        }
        Self { words, text }
    }

    pub fn embedded() -> Self {
        Self::new(load_wordbank_from_str(EMBEDDED_WORDBANK))
    }

    /// Picks the word list: an explicit path, else the user's config-dir
    /// list if one exists, else the embedded list.
    pub fn resolve(explicit: Option<&Path>) -> io::Result<Self> {
        if let Some(path) = explicit {
            return load_wordbank_from_file(path).map(Self::new);
        }
        match default_wordbank_path() {
            Some(path) if path.is_file() => {
                log::info!("Using word list at {}", path.display());
                load_wordbank_from_file(&path).map(Self::new)
            }
            _ => Ok(Self::embedded()),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Newline-delimited form handed to the line filter.
    pub fn as_text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
