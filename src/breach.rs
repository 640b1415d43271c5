//! Breach lookup against a Pwned Passwords style range API.
//!
//! Only the first five hex characters of the SHA-1 digest leave the
//! process. The service answers with every known suffix under that prefix
//! and the match happens locally.
//!
//! A lookup that cannot complete yields [`BreachResult::Unknown`]. Callers
//! are expected to treat it as "not verified" and let the credential be
//! used. That keeps generation usable when the service is down, and it
//! means `Unknown` is never evidence that a password is safe.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use sha1::{Digest, Sha1};
use std::env;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;
use zeroize::Zeroizing;

pub const RANGE_API_BASE_URL: &str = "https://api.pwnedpasswords.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const RANGE_URL_ENV: &str = "PASSFORGE_RANGE_URL";
const RANGE_TIMEOUT_ENV: &str = "PASSFORGE_RANGE_TIMEOUT_SECS";

const PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachResult {
    /// The password appears in the corpus this many times.
    Found { occurrences: u64 },
    NotFound,
    /// The lookup did not complete. Not the same as `NotFound`.
    Unknown,
}

impl BreachResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BreachError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            endpoint: RANGE_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BreachConfig {
    /// Defaults, with the endpoint and timeout taken from
    /// `PASSFORGE_RANGE_URL` and `PASSFORGE_RANGE_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var(RANGE_URL_ENV)
            && !url.trim().is_empty()
        {
            config.endpoint = url.trim().to_string();
        }

        if let Ok(raw) = env::var(RANGE_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!("Ignoring invalid {}={:?}", RANGE_TIMEOUT_ENV, raw),
            }
        }

        config
    }
}

/// SHA-1 of a password split into the part that is sent and the part
/// that is kept.
pub struct RangeQuery {
    prefix: String,
    suffix: Zeroizing<String>,
}

impl RangeQuery {
    pub fn new(password: &str) -> Self {
        let digest = Zeroizing::new(hex::encode_upper(Sha1::digest(password.as_bytes())));
        let (prefix, suffix) = digest.split_at(PREFIX_LEN);

        Self {
            prefix: prefix.to_string(),
            suffix: Zeroizing::new(suffix.to_string()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

/// Something that answers range queries. The body is the raw
/// `SUFFIX:COUNT` listing.
pub trait RangeSource {
    fn fetch_range(&self, prefix: &str) -> Result<String, BreachError>;
}

#[derive(Debug, Clone)]
pub struct HttpRangeSource {
    client: Client,
    endpoint: String,
}

impl HttpRangeSource {
    pub fn new(config: &BreachConfig) -> Result<Self, BreachError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl RangeSource for HttpRangeSource {
    fn fetch_range(&self, prefix: &str) -> Result<String, BreachError> {
        let url = format!("{}/range/{}", self.endpoint, prefix);

        log::debug!("Fetching breach range {}", url);

        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(BreachError::Status(response.status()));
        }

        Ok(response.text()?)
    }
}

/// Occurrence count of `suffix` in a range listing, if present.
///
/// A count of zero marks a padding entry and is not a match. A listed
/// suffix whose count is missing or unreadable still counts once.
pub fn find_suffix(body: &str, suffix: &str) -> Option<u64> {
    body.lines().find_map(|line| {
        let line = line.trim();
        let (candidate, count) = match line.split_once(':') {
            Some((candidate, count)) => (candidate, count.trim().parse::<u64>().ok()),
            None => (line, None),
        };

        if !candidate.trim().eq_ignore_ascii_case(suffix) {
            return None;
        }

        match count {
            Some(0) => None,
            Some(occurrences) => Some(occurrences),
            None => Some(1),
        }
    })
}

#[derive(Debug, Clone)]
pub struct BreachChecker<S = HttpRangeSource> {
    source: S,
}

impl BreachChecker<HttpRangeSource> {
    pub fn from_config(config: &BreachConfig) -> Result<Self, BreachError> {
        Ok(Self::with_source(HttpRangeSource::new(config)?))
    }
}

impl<S: RangeSource> BreachChecker<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Blocking lookup, bounded by the source's timeout.
    ///
    /// `Unknown` means the service could not be asked. It does not block
    /// use of the password and it must not be reported as "not breached".
    pub fn check(&self, password: &str) -> BreachResult {
        if password.is_empty() {
            return BreachResult::NotFound;
        }

        self.check_query(&RangeQuery::new(password))
    }

    fn check_query(&self, query: &RangeQuery) -> BreachResult {
        match self.source.fetch_range(query.prefix()) {
            Ok(body) => match find_suffix(&body, query.suffix()) {
                Some(occurrences) => BreachResult::Found { occurrences },
                None => BreachResult::NotFound,
            },
            Err(e) => {
                log::warn!(
                    "Breach lookup for prefix {} failed, result unknown: {}",
                    query.prefix(),
                    e
                );
                BreachResult::Unknown
            }
        }
    }
}

impl<S: RangeSource + Clone + Send + 'static> BreachChecker<S> {
    /// Runs the lookup on a background thread. The password is hashed
    /// before the thread starts, so only the digest crosses over.
    pub fn spawn_check(&self, password: &str) -> PendingCheck {
        if password.is_empty() {
            return PendingCheck::ready(BreachResult::NotFound);
        }

        let query = RangeQuery::new(password);
        let checker = self.clone();
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("breach-check".to_string())
            .spawn(move || {
                // Receiver gone means the caller cancelled.
                let _ = tx.send(checker.check_query(&query));
            });

        if let Err(e) = spawned {
            log::warn!("Could not start breach check thread: {}", e);
        }

        PendingCheck { rx }
    }
}

/// Result of [`BreachChecker::spawn_check`]. Dropping it cancels the check.
pub struct PendingCheck {
    rx: Receiver<BreachResult>,
}

impl PendingCheck {
    fn ready(result: BreachResult) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Non-blocking poll; `None` while the lookup is still running.
    pub fn try_result(&self) -> Option<BreachResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(BreachResult::Unknown),
        }
    }

    pub fn wait(self) -> BreachResult {
        self.rx.recv().unwrap_or(BreachResult::Unknown)
    }

    /// Gives up after `timeout`, resolving to `Unknown`.
    pub fn wait_timeout(self, timeout: Duration) -> BreachResult {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                BreachResult::Unknown
            }
        }
    }
}

/// One-shot lookup with [`BreachConfig::from_env`]. An empty password
/// returns `NotFound` without touching the network.
pub fn check_breach(password: &str) -> BreachResult {
    if password.is_empty() {
        return BreachResult::NotFound;
    }

    match BreachChecker::from_config(&BreachConfig::from_env()) {
        Ok(checker) => checker.check(password),
        Err(e) => {
            log::warn!("Could not build breach client, result unknown: {}", e);
            BreachResult::Unknown
        }
    }
}
