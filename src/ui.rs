use anyhow::{Context, Result};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use passforge::breach::BreachResult;
use passforge::generator::CharacterClass;
use passforge::strength::StrengthReport;
use rpassword::read_password;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

pub const MIN_SAFE_ENTROPY: f64 = 80.0;
pub const PARANOID_ENTROPY: f64 = 128.0;

pub const MIN_SAFE_PASSWORD_LENGTH: usize = 12;
pub const MIN_SAFE_WORD_COUNT: usize = 5;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

pub enum OutputConfig {
    Password {
        length: usize,
        classes: Vec<CharacterClass>,
        pool_size: usize,
        exclude_ambiguous: bool,
    },
    Passphrase {
        word_count: usize,
        wordlist_label: &'static str,
        wordlist_size: usize,
    },
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn status_style(options: &DisplayOptions, ok: bool) -> Style {
    if !options.color_support {
        Style::new()
    } else if ok {
        Style::new().green()
    } else {
        Style::new().yellow()
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn validate_control_characters(s: &str, input_name: &str) -> Result<String> {
    let control_chars: Vec<usize> = s
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .map(|(pos, _)| pos)
        .collect();

    if !control_chars.is_empty() {
        let term = Term::stderr();

        let warning_msg = format!(
            "WARNING: {} contains {} control character(s) at position(s): {}",
            input_name,
            control_chars.len(),
            control_chars
                .iter()
                .map(|pos| pos.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        term.write_line(&warning_msg)?;
        term.write_str("Continue anyway? [y/N]: ")?;
        term.flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;
        let response = response.trim().to_lowercase();

        term.clear_last_lines(2)?;

        if response != "y" && response != "yes" {
            anyhow::bail!("Aborted");
        }
    }

    Ok(s.to_string())
}

pub fn normalize_and_validate(s: &str, input_name: &str) -> Result<String> {
    let trimmed = s.trim();
    let normalized: String = trimmed.nfc().collect();
    validate_control_characters(&normalized, input_name)
}

/// Reads a password without echo and NFC-normalizes it. Surrounding
/// whitespace is kept; it is part of the password.
pub fn prompt_secret() -> Result<Zeroizing<String>> {
    print!("Password: ");
    io::stdout().flush()?;

    let password = Zeroizing::new(read_password().context("Failed to read password")?);
    let normalized: Zeroizing<String> = Zeroizing::new(password.nfc().collect());

    Ok(Zeroizing::new(validate_control_characters(
        &normalized,
        "Password",
    )?))
}

pub fn show_progress<F, T>(unicode_support: bool, message: &'static str, f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let term = Term::stdout();
    term.hide_cursor().ok();

    let pb = ProgressBar::new_spinner();

    if unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    term.show_cursor().ok();

    result.map(|r| (r, elapsed))
}

fn entropy_status(entropy: f64) -> (bool, &'static str) {
    if entropy >= PARANOID_ENTROPY {
        (true, "Paranoid")
    } else if entropy >= MIN_SAFE_ENTROPY {
        (true, "Strong")
    } else {
        (false, "Weak")
    }
}

fn breach_status(result: BreachResult) -> (bool, String) {
    match result {
        BreachResult::Found { occurrences } => (
            false,
            format!(
                "Found in {} {}",
                occurrences,
                plural(occurrences as usize, "breach record", "breach records")
            ),
        ),
        BreachResult::NotFound => (true, "Not found".to_string()),
        BreachResult::Unknown => (false, "Unknown (lookup failed, not verified)".to_string()),
    }
}

pub fn display_output(
    outputs: &[(&str, f64)],
    config: &OutputConfig,
    breach: Option<BreachResult>,
    options: &DisplayOptions,
) {
    if options.quiet {
        for (i, (output, _)) in outputs.iter().enumerate() {
            println!("Out[{}]: {}", i, output);
        }
        if let Some(result) = breach {
            display_breach(result, options);
        }
        return;
    }

    for (i, (output, entropy)) in outputs.iter().enumerate() {
        let (ok, _) = entropy_status(*entropy);
        let style = status_style(options, ok);
        println!("Out[{}]: {}  {}", i, output, style.apply_to(format!("({:.1} bits)", entropy)));
    }
    println!();

    display_settings(config, options);

    if let Some((first, entropy)) = outputs.first() {
        display_stats(*entropy, first.chars().count(), config, breach, options);
    }
}

fn display_settings(config: &OutputConfig, options: &DisplayOptions) {
    println!("Settings:");

    match config {
        OutputConfig::Password {
            length,
            classes,
            pool_size,
            exclude_ambiguous,
        } => {
            let names: Vec<&str> = classes
                .iter()
                .map(|class| match class {
                    CharacterClass::Upper => "A-Z",
                    CharacterClass::Lower => "a-z",
                    CharacterClass::Digit => "0-9",
                    CharacterClass::Symbol => "symbols",
                })
                .collect();

            let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
            let length_ok = *length >= MIN_SAFE_PASSWORD_LENGTH;
            let style = status_style(options, length_ok);

            println!("  ├─ Classes    {}", names.join(", "));
            println!("  ├─ Pool       {} chars", pool_size);
            println!(
                "  ├─ Ambiguous  {}",
                if *exclude_ambiguous { "excluded" } else { "allowed" }
            );
            println!("  ├─ Sampling   Unbiased rejection");
            println!(
                "  └─ Output     {} {} {}",
                style.apply_to(format!("[{}]", if length_ok { check_ok } else { check_warn })),
                style.apply_to(length),
                plural(*length, "char", "chars")
            );
        }
        OutputConfig::Passphrase {
            word_count,
            wordlist_label,
            wordlist_size,
        } => {
            let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
            let words_ok = *word_count >= MIN_SAFE_WORD_COUNT;
            let style = status_style(options, words_ok);

            println!("  ├─ Wordlist   {} ({} words)", wordlist_label, wordlist_size);
            println!("  ├─ Sampling   Unbiased rejection");
            println!(
                "  └─ Output     {} {} {}",
                style.apply_to(format!("[{}]", if words_ok { check_ok } else { check_warn })),
                style.apply_to(word_count),
                plural(*word_count, "word", "words")
            );
        }
    }

    println!();
}

fn display_stats(
    entropy: f64,
    length: usize,
    config: &OutputConfig,
    breach: Option<BreachResult>,
    options: &DisplayOptions,
) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (secure, status_text) = entropy_status(entropy);
    let entropy_style = status_style(options, secure);
    let status_icon = if secure { check_ok } else { check_warn };

    println!("Stats:");
    println!(
        "  ├─ Entropy    {} {} bits ({})",
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(format!("{:.1}", entropy)),
        entropy_style.apply_to(status_text)
    );

    let is_last = breach.is_none();
    println!(
        "  {} Length     {} {}",
        if is_last { "└─" } else { "├─" },
        length,
        plural(length, "char", "chars")
    );

    if let Some(result) = breach {
        let (ok, text) = breach_status(result);
        let style = status_style(options, ok);
        println!(
            "  └─ Breach     {} {}",
            style.apply_to(format!("[{}]", if ok { check_ok } else { check_warn })),
            style.apply_to(text)
        );
    }

    let kind = match config {
        OutputConfig::Password { .. } => "password",
        OutputConfig::Passphrase { .. } => "passphrase",
    };

    println!(
        "\n{} Security: {} {}",
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(status_text),
        kind
    );
}

pub fn display_report(
    report: &StrengthReport,
    estimated_entropy: f64,
    length: usize,
    breach: Option<BreachResult>,
    options: &DisplayOptions,
) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);

    println!("Rules:");
    let rules: Vec<_> = report.iter().collect();
    for (i, (rule, passed)) in rules.iter().enumerate() {
        let branch = if i + 1 == rules.len() { "└─" } else { "├─" };
        let style = status_style(options, *passed);
        println!(
            "  {} {} {}",
            branch,
            style.apply_to(format!("[{}]", if *passed { check_ok } else { check_warn })),
            rule.description()
        );
    }
    println!();

    let (secure, status_text) = entropy_status(estimated_entropy);
    let style = status_style(options, secure);

    println!("Stats:");
    println!(
        "  ├─ Estimate   {} bits ({})",
        style.apply_to(format!("{:.1}", estimated_entropy)),
        style.apply_to(status_text)
    );
    println!(
        "  {} Length     {} {}",
        if breach.is_none() { "└─" } else { "├─" },
        length,
        plural(length, "char", "chars")
    );

    if let Some(result) = breach {
        let (ok, text) = breach_status(result);
        let style = status_style(options, ok);
        println!(
            "  └─ Breach     {} {}",
            style.apply_to(format!("[{}]", if ok { check_ok } else { check_warn })),
            style.apply_to(text)
        );
    }
}

pub fn display_breach(result: BreachResult, options: &DisplayOptions) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (ok, text) = breach_status(result);
    let style = status_style(options, ok);

    println!(
        "Breach: {} {}",
        style.apply_to(format!("[{}]", if ok { check_ok } else { check_warn })),
        style.apply_to(text)
    );
}
