mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use passforge::breach::{BreachChecker, BreachConfig, BreachResult};
use passforge::generator::{CredentialRequest, DEFAULT_SYMBOLS};
use passforge::{History, Settings, WordlistId, analyze, estimate_entropy};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "passforge",
    version,
    author,
    about = "Random passwords and passphrases with entropy, strength rules and breach lookup"
)]
struct Cli {
    /// Log generation and lookup details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print only the generated output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Breach lookup timeout in seconds
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=30))]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate random passwords from character classes
    Password(PasswordArgs),
    /// Generate a passphrase from a word list
    Passphrase(PassphraseArgs),
    /// Check a password against the strength rules and the breach corpus
    Analyze(AnalyzeArgs),
    /// Only look a password up in the breach corpus
    Check,
}

#[derive(Args)]
struct PasswordArgs {
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(8..=64))]
    length: Option<u16>,

    #[arg(long)]
    no_upper: bool,

    #[arg(long)]
    no_lower: bool,

    #[arg(long)]
    no_digits: bool,

    #[arg(long)]
    no_symbols: bool,

    /// Symbol alphabet
    #[arg(long, value_name = "CHARS")]
    symbols: Option<String>,

    /// Leave out I, l, 1, O, 0 and o
    #[arg(short = 'x', long)]
    exclude_ambiguous: bool,

    /// Number of passwords to generate
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=10))]
    count: u8,

    /// Look the newest password up in the breach corpus
    #[arg(long)]
    check: bool,
}

#[derive(Args)]
struct PassphraseArgs {
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(3..=10))]
    words: Option<u8>,

    #[arg(short, long)]
    separator: Option<String>,

    #[arg(long, value_enum)]
    wordlist: Option<Wordlist>,

    /// Whitespace-separated words to use as a custom list
    #[arg(long, value_name = "FILE")]
    custom: Option<PathBuf>,

    #[arg(long)]
    check: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum Wordlist {
    PortugueseBasic,
    EnglishBasic,
    Animals,
    /// Words read from --custom FILE
    Custom,
}

impl From<Wordlist> for WordlistId {
    fn from(wordlist: Wordlist) -> Self {
        match wordlist {
            Wordlist::PortugueseBasic => WordlistId::PortugueseBasic,
            Wordlist::EnglishBasic => WordlistId::EnglishBasic,
            Wordlist::Animals => WordlistId::Animals,
            Wordlist::Custom => WordlistId::Custom,
        }
    }
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Symbol pool used for the entropy estimate
    #[arg(long, value_name = "CHARS")]
    symbols: Option<String>,

    /// Skip the breach lookup
    #[arg(long)]
    offline: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn breach_config(timeout: Option<u64>) -> BreachConfig {
    let mut config = BreachConfig::from_env();
    if let Some(secs) = timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config
}

/// Runs the lookup off the main thread behind a spinner. A client that
/// cannot be built counts as a failed lookup.
fn check_in_background(
    password: &str,
    config: &BreachConfig,
    options: &ui::DisplayOptions,
) -> Result<BreachResult> {
    let checker = match BreachChecker::from_config(config) {
        Ok(checker) => checker,
        Err(e) => {
            log::warn!("Could not build breach client, result unknown: {}", e);
            return Ok(BreachResult::Unknown);
        }
    };
    let pending = checker.spawn_check(password);
    let deadline = config.timeout + Duration::from_secs(1);

    let (result, elapsed) = ui::show_progress(
        options.unicode_support,
        "Checking breach corpus...",
        || Ok(pending.wait_timeout(deadline)),
    )?;

    log::debug!("Breach lookup finished in {:.1}s", elapsed.as_secs_f64());

    Ok(result)
}

fn run_password(args: PasswordArgs, config: &BreachConfig, options: &ui::DisplayOptions) -> Result<()> {
    let mut settings = Settings::default();

    if let Some(length) = args.length {
        settings.length = usize::from(length);
    }
    settings.include_upper = !args.no_upper;
    settings.include_lower = !args.no_lower;
    settings.include_digits = !args.no_digits;
    settings.include_symbols = !args.no_symbols;
    settings.exclude_ambiguous = args.exclude_ambiguous;
    if let Some(symbols) = args.symbols {
        settings.symbol_alphabet = ui::normalize_and_validate(&symbols, "Symbol alphabet")?;
    }

    let password_request = settings.password_request();
    let request = CredentialRequest::Password(password_request.clone());

    let mut history = History::default();
    let mut entropy = 0.0;
    for _ in 0..args.count {
        let credential = request.generate().context("Failed to generate password")?;
        entropy = credential.entropy_bits();
        history.push(credential.text());
    }

    let breach = match history.get(0) {
        Some(newest) if args.check => Some(check_in_background(newest, config, options)?),
        _ => None,
    };

    let outputs: Vec<(&str, f64)> = history.iter().map(|p| (p, entropy)).collect();
    let output_config = ui::OutputConfig::Password {
        length: password_request.length,
        classes: password_request.enabled_classes(),
        pool_size: password_request.pool().len(),
        exclude_ambiguous: password_request.exclude_ambiguous,
    };

    ui::display_output(&outputs, &output_config, breach, options);

    Ok(())
}

fn run_passphrase(args: PassphraseArgs, config: &BreachConfig, options: &ui::DisplayOptions) -> Result<()> {
    let mut settings = Settings::default();

    if let Some(words) = args.words {
        settings.word_count = usize::from(words);
    }
    if let Some(separator) = args.separator {
        settings.separator = separator;
    }
    if let Some(wordlist) = args.wordlist {
        settings.wordlist = wordlist.into();
    }

    let custom_text = match &args.custom {
        Some(path) => {
            settings.wordlist = WordlistId::Custom;
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read word list {}", path.display()))?
        }
        None if settings.wordlist == WordlistId::Custom => {
            anyhow::bail!("--wordlist custom needs --custom FILE");
        }
        None => String::new(),
    };

    let passphrase_request = settings.passphrase_request(&custom_text);
    let wordlist_size = passphrase_request.words.len();
    let word_count = passphrase_request.word_count;

    let credential = CredentialRequest::Passphrase(passphrase_request)
        .generate()
        .context("Failed to generate passphrase")?;

    let breach = if args.check {
        Some(check_in_background(credential.text(), config, options)?)
    } else {
        None
    };

    let output_config = ui::OutputConfig::Passphrase {
        word_count,
        wordlist_label: settings.wordlist.label(),
        wordlist_size,
    };

    ui::display_output(
        &[(credential.text(), credential.entropy_bits())],
        &output_config,
        breach,
        options,
    );

    Ok(())
}

fn run_analyze(args: AnalyzeArgs, config: &BreachConfig, options: &ui::DisplayOptions) -> Result<()> {
    let password = ui::prompt_secret()?;
    let symbols = args.symbols.as_deref().unwrap_or(DEFAULT_SYMBOLS);

    let report = analyze(&password);
    let estimate = estimate_entropy(&password, symbols);

    let breach = if args.offline {
        None
    } else {
        Some(check_in_background(&password, config, options)?)
    };

    ui::display_report(&report, estimate, password.chars().count(), breach, options);

    Ok(())
}

fn run_check(config: &BreachConfig, options: &ui::DisplayOptions) -> Result<()> {
    let password = ui::prompt_secret()?;
    let result = check_in_background(&password, config, options)?;

    ui::display_breach(result, options);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: ui::detect_color_support(),
        quiet: cli.quiet,
    };
    let config = breach_config(cli.timeout);

    match cli.command {
        Command::Password(args) => run_password(args, &config, &options),
        Command::Passphrase(args) => run_passphrase(args, &config, &options),
        Command::Analyze(args) => run_analyze(args, &config, &options),
        Command::Check => run_check(&config, &options),
    }
}
