use crate::generator::{DEFAULT_SYMBOLS, PassphraseRequest, PasswordRequest};
use crate::wordlist::{WordlistId, get_wordlist, parse_words};
use serde::{Deserialize, Serialize};

/// Flat generator preferences.
///
/// Storage belongs to the caller. Missing keys fall back to the defaults
/// when deserializing, so an older or partial record still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub length: usize,
    pub include_upper: bool,
    pub include_lower: bool,
    pub include_digits: bool,
    pub include_symbols: bool,
    pub exclude_ambiguous: bool,
    pub symbol_alphabet: String,
    pub word_count: usize,
    pub separator: String,
    pub wordlist: WordlistId,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            length: 16,
            include_upper: true,
            include_lower: true,
            include_digits: true,
            include_symbols: true,
            exclude_ambiguous: false,
            symbol_alphabet: DEFAULT_SYMBOLS.to_string(),
            word_count: 4,
            separator: "-".to_string(),
            wordlist: WordlistId::PortugueseBasic,
        }
    }
}

impl Settings {
    pub fn password_request(&self) -> PasswordRequest {
        PasswordRequest {
            length: self.length,
            upper: self.include_upper,
            lower: self.include_lower,
            digits: self.include_digits,
            symbols: self.include_symbols,
            symbol_alphabet: self.symbol_alphabet.clone(),
            exclude_ambiguous: self.exclude_ambiguous,
        }
    }

    /// `custom_words` is only read when the selected list is
    /// [`WordlistId::Custom`].
    pub fn passphrase_request(&self, custom_words: &str) -> PassphraseRequest {
        match get_wordlist(self.wordlist) {
            Some(words) => {
                PassphraseRequest::new(self.word_count, &self.separator, words.iter().copied())
            }
            None => PassphraseRequest::new(self.word_count, &self.separator, parse_words(custom_words)),
        }
    }

    pub fn apply_password_request(&mut self, request: &PasswordRequest) {
        self.length = request.length;
        self.include_upper = request.upper;
        self.include_lower = request.lower;
        self.include_digits = request.digits;
        self.include_symbols = request.symbols;
        self.symbol_alphabet = request.symbol_alphabet.clone();
        self.exclude_ambiguous = request.exclude_ambiguous;
    }
}
