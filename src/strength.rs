//! Structural password rules and the presence-based entropy estimate.
//!
//! [`estimate_entropy`] looks only at the characters a password actually
//! contains. It is meant for pasted or historical passwords. For a freshly
//! generated password it will usually disagree with the generator's figure,
//! which is based on the full pool. The two are kept separate on purpose.

use crate::entropy;
use serde::Serialize;
use std::fmt;

pub const MIN_LENGTH: usize = 10;

/// Lowercase given names and organization terms a password must not contain.
pub const COMMON_NAMES: &[&str] = &["joao", "maria", "ana", "pedro", "paulo", "unimed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    LengthOk,
    CaseOk,
    HasNumber,
    HasSymbol,
    NoCommonNames,
}

impl Rule {
    pub const ALL: [Self; 5] = [
        Self::LengthOk,
        Self::CaseOk,
        Self::HasNumber,
        Self::HasSymbol,
        Self::NoCommonNames,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LengthOk => "length_ok",
            Self::CaseOk => "case_ok",
            Self::HasNumber => "has_number",
            Self::HasSymbol => "has_symbol",
            Self::NoCommonNames => "no_common_names",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::LengthOk => "At least 10 characters",
            Self::CaseOk => "Upper and lower case letters",
            Self::HasNumber => "Contains a digit (0-9)",
            Self::HasSymbol => "Contains a symbol (!@#$...)",
            Self::NoCommonNames => "No common names",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pass/fail for every rule. No aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub length_ok: bool,
    pub case_ok: bool,
    pub has_number: bool,
    pub has_symbol: bool,
    pub no_common_names: bool,
}

impl StrengthReport {
    pub fn get(&self, rule: Rule) -> bool {
        match rule {
            Rule::LengthOk => self.length_ok,
            Rule::CaseOk => self.case_ok,
            Rule::HasNumber => self.has_number,
            Rule::HasSymbol => self.has_symbol,
            Rule::NoCommonNames => self.no_common_names,
        }
    }

    /// Rules in fixed order with their outcome.
    pub fn iter(&self) -> impl Iterator<Item = (Rule, bool)> + '_ {
        Rule::ALL.into_iter().map(|rule| (rule, self.get(rule)))
    }

    pub fn failed(&self) -> Vec<Rule> {
        self.iter()
            .filter(|(_, passed)| !passed)
            .map(|(rule, _)| rule)
            .collect()
    }
}

pub fn analyze(password: &str) -> StrengthReport {
    StrengthReport {
        length_ok: has_minimum_length(password),
        case_ok: has_upper_and_lower_case(password),
        has_number: password.chars().any(|c| c.is_ascii_digit()),
        has_symbol: password.chars().any(|c| c.is_ascii_punctuation()),
        no_common_names: has_no_common_names(password),
    }
}

fn has_minimum_length(password: &str) -> bool {
    password.chars().count() >= MIN_LENGTH
}

fn has_upper_and_lower_case(password: &str) -> bool {
    password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase)
}

fn has_no_common_names(password: &str) -> bool {
    let lowered = password.to_lowercase();
    !COMMON_NAMES.iter().any(|name| lowered.contains(name))
}

/// Entropy from the character classes present in `password`: 26 for ASCII
/// lowercase, 26 for ASCII uppercase, 10 for digits and the size of
/// `special_pool` if any of its characters appears. Zero when none match.
pub fn estimate_entropy(password: &str, special_pool: &str) -> f64 {
    let mut pool = 0;

    if password.chars().any(|c| c.is_ascii_lowercase()) {
        pool += 26;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        pool += 26;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        pool += 10;
    }
    if password.chars().any(|c| special_pool.contains(c)) {
        pool += special_pool.chars().count();
    }

    entropy::bits(password.chars().count(), pool)
}
