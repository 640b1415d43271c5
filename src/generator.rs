use crate::entropy;
use crate::error::{GenerationError, Result};
use crate::rng::SecureRng;
use std::fmt;
use zeroize::Zeroizing;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const DEFAULT_SYMBOLS: &str = "!@#$%^&*";

/// Glyphs easily confused when read back or transcribed.
pub const AMBIGUOUS: &[char] = &['I', 'l', '1', 'O', '0', 'o'];

pub fn is_ambiguous(c: char) -> bool {
    AMBIGUOUS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

impl CharacterClass {
    pub const ALL: [Self; 4] = [Self::Upper, Self::Lower, Self::Digit, Self::Symbol];

    /// The class alphabet. Only `Symbol` depends on the caller.
    pub fn alphabet<'a>(&self, symbols: &'a str) -> &'a str {
        match self {
            Self::Upper => UPPERCASE,
            Self::Lower => LOWERCASE,
            Self::Digit => DIGITS,
            Self::Symbol => symbols,
        }
    }

    pub fn contains(&self, c: char, symbols: &str) -> bool {
        match self {
            Self::Upper => c.is_ascii_uppercase(),
            Self::Lower => c.is_ascii_lowercase(),
            Self::Digit => c.is_ascii_digit(),
            Self::Symbol => symbols.contains(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordRequest {
    pub length: usize,
    pub upper: bool,
    pub lower: bool,
    pub digits: bool,
    pub symbols: bool,
    pub symbol_alphabet: String,
    pub exclude_ambiguous: bool,
}

impl Default for PasswordRequest {
    fn default() -> Self {
        Self {
            length: 16,
            upper: true,
            lower: true,
            digits: true,
            symbols: true,
            symbol_alphabet: DEFAULT_SYMBOLS.to_string(),
            exclude_ambiguous: false,
        }
    }
}

impl PasswordRequest {
    pub fn is_enabled(&self, class: CharacterClass) -> bool {
        match class {
            CharacterClass::Upper => self.upper,
            CharacterClass::Lower => self.lower,
            CharacterClass::Digit => self.digits,
            CharacterClass::Symbol => self.symbols,
        }
    }

    pub fn enabled_classes(&self) -> Vec<CharacterClass> {
        CharacterClass::ALL
            .into_iter()
            .filter(|class| self.is_enabled(*class))
            .collect()
    }

    /// Alphabet of one class after ambiguity filtering.
    fn resolved_alphabet(&self, class: CharacterClass) -> Vec<char> {
        class
            .alphabet(&self.symbol_alphabet)
            .chars()
            .filter(|c| !(self.exclude_ambiguous && is_ambiguous(*c)))
            .collect()
    }

    /// Every character the generator may emit, in class order.
    ///
    /// Characters are kept as supplied, so a symbol alphabet with repeats
    /// weighs those symbols more and counts them more than once.
    pub fn pool(&self) -> Vec<char> {
        self.enabled_classes()
            .into_iter()
            .flat_map(|class| self.resolved_alphabet(class))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseRequest {
    pub word_count: usize,
    pub separator: String,
    pub words: Vec<String>,
}

impl PassphraseRequest {
    pub fn new<I, S>(word_count: usize, separator: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            word_count,
            separator: separator.to_string(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

/// What the caller wants generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRequest {
    Password(PasswordRequest),
    Passphrase(PassphraseRequest),
}

impl CredentialRequest {
    pub fn generate(&self) -> Result<GeneratedCredential> {
        match self {
            Self::Password(request) => generate_password(request),
            Self::Passphrase(request) => generate_passphrase(request),
        }
    }

    pub fn is_passphrase(&self) -> bool {
        matches!(self, Self::Passphrase(_))
    }
}

/// A freshly generated credential and the entropy of the process that
/// produced it. Both are set together by the generator and cannot be
/// changed afterwards.
#[derive(Clone)]
pub struct GeneratedCredential {
    text: Zeroizing<String>,
    entropy_bits: f64,
}

impl fmt::Debug for GeneratedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedCredential")
            .field("text", &"<redacted>")
            .field("entropy_bits", &self.entropy_bits)
            .finish()
    }
}

impl GeneratedCredential {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entropy_bits(&self) -> f64 {
        self.entropy_bits
    }

    pub fn into_text(self) -> Zeroizing<String> {
        self.text
    }
}

pub fn generate_password(request: &PasswordRequest) -> Result<GeneratedCredential> {
    let mut rng = SecureRng::from_os()?;
    generate_password_with(&mut rng, request)
}

pub fn generate_password_with(
    rng: &mut SecureRng,
    request: &PasswordRequest,
) -> Result<GeneratedCredential> {
    let mut pool: Vec<char> = Vec::new();
    let mut guaranteed: Zeroizing<Vec<char>> = Zeroizing::new(Vec::new());

    for class in request.enabled_classes() {
        let alphabet = request.resolved_alphabet(class);
        if let Some(&c) = rng.choose(&alphabet) {
            guaranteed.push(c);
        }
        pool.extend(alphabet);
    }

    if pool.is_empty() {
        return Err(GenerationError::NoAlphabetSelected);
    }

    // Too short to hold one of each class: keep the pool, drop guarantees.
    guaranteed.truncate(request.length);
    let remaining = request.length - guaranteed.len();

    let mut chars: Zeroizing<Vec<char>> = Zeroizing::new(Vec::with_capacity(request.length));
    chars.extend_from_slice(&guaranteed);
    for _ in 0..remaining {
        chars.push(pool[rng.below(pool.len())]);
    }

    rng.shuffle(chars.as_mut_slice());

    let text: Zeroizing<String> = Zeroizing::new(chars.iter().collect());
    let entropy_bits = entropy::bits(chars.len(), pool.len());

    log::debug!(
        "Generated password: length={}, pool={}, guaranteed={}, entropy={:.2}",
        chars.len(),
        pool.len(),
        guaranteed.len(),
        entropy_bits
    );

    Ok(GeneratedCredential { text, entropy_bits })
}

pub fn generate_passphrase(request: &PassphraseRequest) -> Result<GeneratedCredential> {
    let mut rng = SecureRng::from_os()?;
    generate_passphrase_with(&mut rng, request)
}

pub fn generate_passphrase_with(
    rng: &mut SecureRng,
    request: &PassphraseRequest,
) -> Result<GeneratedCredential> {
    if request.words.is_empty() {
        return Err(GenerationError::EmptyWordList);
    }

    let mut chosen = Vec::with_capacity(request.word_count);
    while chosen.len() < request.word_count {
        let index = rng.below(request.words.len());
        chosen.push(request.words[index].as_str());
    }

    let text = Zeroizing::new(chosen.join(&request.separator));
    let entropy_bits = entropy::bits(request.word_count, request.words.len());

    log::debug!(
        "Generated passphrase: words={}, list_size={}, entropy={:.2}",
        request.word_count,
        request.words.len(),
        entropy_bits
    );

    Ok(GeneratedCredential { text, entropy_bits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn request(length: usize, upper: bool, lower: bool, digits: bool, symbols: bool) -> PasswordRequest {
        PasswordRequest {
            length,
            upper,
            lower,
            digits,
            symbols,
            symbol_alphabet: DEFAULT_SYMBOLS.to_string(),
            exclude_ambiguous: false,
        }
    }

    #[test]
    fn test_class_alphabets() {
        assert_eq!(CharacterClass::Upper.alphabet("").len(), 26);
        assert_eq!(CharacterClass::Lower.alphabet("").len(), 26);
        assert_eq!(CharacterClass::Digit.alphabet("").len(), 10);
        assert_eq!(CharacterClass::Symbol.alphabet("+-"), "+-");

        let unique: HashSet<char> = CharacterClass::ALL
            .iter()
            .flat_map(|class| class.alphabet(DEFAULT_SYMBOLS).chars())
            .collect();
        assert_eq!(unique.len(), 70, "Default pool should have 70 distinct characters");
    }

    #[test]
    fn test_default_request_pool() {
        let pool = PasswordRequest::default().pool();
        assert_eq!(pool.len(), 70);
    }

    #[test]
    fn test_password_full_example() {
        let req = request(16, true, true, true, true);
        let credential = generate_password(&req).unwrap();
        let pool = req.pool();

        assert_eq!(credential.text().chars().count(), 16);
        assert!(credential.text().chars().all(|c| pool.contains(&c)));
        assert!(
            (credential.entropy_bits() - 16.0 * 70f64.log2()).abs() < 1e-9,
            "Entropy was {}",
            credential.entropy_bits()
        );
    }

    #[test]
    fn test_password_deterministic_with_seed() {
        let req = PasswordRequest::default();
        let key = [42u8; 32];

        let a = generate_password_with(&mut SecureRng::from_seed(&key), &req).unwrap();
        let b = generate_password_with(&mut SecureRng::from_seed(&key), &req).unwrap();
        assert_eq!(a.text(), b.text());
    }

    #[test]
    fn test_password_exact_length() {
        for length in [0usize, 1, 4, 8, 16, 33, 64, 128] {
            let credential = generate_password(&request(length, true, true, true, true)).unwrap();
            assert_eq!(
                credential.text().chars().count(),
                length,
                "Requested {} characters",
                length
            );
        }
    }

    #[test]
    fn test_password_no_classes() {
        let result = generate_password(&request(16, false, false, false, false));
        assert_eq!(result.unwrap_err(), GenerationError::NoAlphabetSelected);
    }

    #[test]
    fn test_password_symbols_with_empty_alphabet() {
        let mut req = request(12, false, false, false, true);
        req.symbol_alphabet.clear();
        assert_eq!(
            generate_password(&req).unwrap_err(),
            GenerationError::NoAlphabetSelected
        );
    }

    #[test]
    fn test_password_pool_exhausted_by_ambiguity_filter() {
        let mut req = request(12, false, false, false, true);
        req.symbol_alphabet = "Il1O0o".to_string();
        req.exclude_ambiguous = true;

        assert_eq!(
            generate_password(&req).unwrap_err(),
            GenerationError::NoAlphabetSelected
        );
    }

    #[test]
    fn test_password_excludes_ambiguous() {
        let mut req = request(64, true, true, true, true);
        req.exclude_ambiguous = true;

        for _ in 0..200 {
            let credential = generate_password(&req).unwrap();
            assert!(
                !credential.text().chars().any(is_ambiguous),
                "Ambiguous character in {}",
                credential.text()
            );
        }

        assert_eq!(req.pool().len(), 70 - AMBIGUOUS.len());
    }

    #[test]
    fn test_password_contains_every_enabled_class() {
        let req = request(4, true, true, true, true);

        for _ in 0..500 {
            let credential = generate_password(&req).unwrap();
            for class in CharacterClass::ALL {
                assert!(
                    credential
                        .text()
                        .chars()
                        .any(|c| class.contains(c, &req.symbol_alphabet)),
                    "{} is missing a {:?} character",
                    credential.text(),
                    class
                );
            }
        }
    }

    #[test]
    fn test_password_every_class_survives_ambiguity_filter() {
        let mut req = request(4, true, true, true, true);
        req.exclude_ambiguous = true;

        for _ in 0..500 {
            let credential = generate_password(&req).unwrap();
            assert!(credential.text().chars().any(|c| c.is_ascii_digit()));
            assert!(credential.text().chars().any(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_password_shorter_than_class_count() {
        let req = request(2, true, true, true, true);

        for _ in 0..100 {
            let credential = generate_password(&req).unwrap();
            assert_eq!(credential.text().chars().count(), 2);
            assert!((credential.entropy_bits() - 2.0 * 70f64.log2()).abs() < 1e-9);
        }

        let empty = generate_password(&request(0, true, true, true, true)).unwrap();
        assert_eq!(empty.text(), "");
        assert_eq!(empty.entropy_bits(), 0.0);
    }

    #[test]
    fn test_guaranteed_characters_not_clustered() {
        let req = request(8, true, false, true, false);
        let mut upper_first = 0;

        for _ in 0..2000 {
            let credential = generate_password(&req).unwrap();
            if credential.text().starts_with(|c: char| c.is_ascii_uppercase()) {
                upper_first += 1;
            }
        }

        // 26 of 36 pool characters are uppercase; an unshuffled guarantee
        // would sit at index 0 every time.
        assert!(
            (1200..=1700).contains(&upper_first),
            "Uppercase led {} of 2000 passwords",
            upper_first
        );
    }

    #[test]
    fn test_entropy_monotonic_in_classes() {
        let length = 20;
        let toggles = [
            (true, false, false, false),
            (true, true, false, false),
            (true, true, true, false),
            (true, true, true, true),
        ];

        let mut previous = 0.0;
        for (upper, lower, digits, symbols) in toggles {
            let entropy = generate_password(&request(length, upper, lower, digits, symbols))
                .unwrap()
                .entropy_bits();
            assert!(entropy >= previous, "{} < {}", entropy, previous);
            previous = entropy;
        }
    }

    #[test]
    fn test_entropy_strictly_increases_with_length() {
        let mut previous = -1.0;
        for length in 1..40 {
            let entropy = generate_password(&request(length, false, true, true, false))
                .unwrap()
                .entropy_bits();
            assert!(entropy > previous);
            previous = entropy;
        }
    }

    #[test]
    fn test_entropy_ignores_drawn_characters() {
        let req = request(10, false, false, true, false);
        let a = generate_password(&req).unwrap();
        let b = generate_password(&req).unwrap();
        assert_eq!(a.entropy_bits(), b.entropy_bits());
        assert!((a.entropy_bits() - 10.0 * 10f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_passphrase_two_word_list() {
        let req = PassphraseRequest::new(4, "-", ["a", "b"]);

        for _ in 0..100 {
            let credential = generate_passphrase(&req).unwrap();
            let words: Vec<&str> = credential.text().split('-').collect();
            assert_eq!(words.len(), 4, "Unexpected shape: {}", credential.text());
            assert!(words.iter().all(|w| *w == "a" || *w == "b"));
            assert_eq!(credential.entropy_bits(), 4.0);
        }
    }

    #[test]
    fn test_passphrase_empty_word_list() {
        let req = PassphraseRequest::new(4, "-", Vec::<String>::new());
        assert_eq!(
            generate_passphrase(&req).unwrap_err(),
            GenerationError::EmptyWordList
        );
    }

    #[test]
    fn test_passphrase_repeats_allowed() {
        let req = PassphraseRequest::new(5, " ", ["solo"]);
        let credential = generate_passphrase(&req).unwrap();
        assert_eq!(credential.text(), "solo solo solo solo solo");
        assert_eq!(credential.entropy_bits(), 0.0);
    }

    #[test]
    fn test_passphrase_multichar_separator() {
        let req = PassphraseRequest::new(3, " :: ", ["alpha", "beta", "gamma", "delta"]);
        let credential = generate_passphrase(&req).unwrap();
        assert_eq!(credential.text().split(" :: ").count(), 3);
        assert_eq!(credential.entropy_bits(), 6.0);
    }

    #[test]
    fn test_passphrase_deterministic_with_seed() {
        let req = PassphraseRequest::new(6, "-", ["one", "two", "three", "four", "five"]);
        let key = [9u8; 32];

        let a = generate_passphrase_with(&mut SecureRng::from_seed(&key), &req).unwrap();
        let b = generate_passphrase_with(&mut SecureRng::from_seed(&key), &req).unwrap();
        assert_eq!(a.text(), b.text());
    }

    #[test]
    fn test_debug_redacts_text() {
        let credential = generate_password(&PasswordRequest::default()).unwrap();
        let debug = format!("{:?}", credential);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(credential.text()));
    }

    #[test]
    fn test_credential_request_dispatch() {
        let password = CredentialRequest::Password(PasswordRequest::default());
        let passphrase = CredentialRequest::Passphrase(PassphraseRequest::new(4, "-", ["a", "b"]));

        assert!(!password.is_passphrase());
        assert!(passphrase.is_passphrase());

        assert_eq!(password.generate().unwrap().text().chars().count(), 16);
        assert_eq!(passphrase.generate().unwrap().text().len(), 7);
    }
}
