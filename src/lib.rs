pub mod breach;
pub mod entropy;
pub mod error;
pub mod generator;
pub mod history;
pub mod rng;
pub mod settings;
pub mod strength;
pub mod wordlist;

pub use breach::{BreachChecker, BreachConfig, BreachResult, check_breach};
pub use error::GenerationError;
pub use generator::{
    CharacterClass, CredentialRequest, GeneratedCredential, PassphraseRequest, PasswordRequest,
    generate_passphrase, generate_password,
};
pub use history::History;
pub use settings::Settings;
pub use strength::{StrengthReport, analyze, estimate_entropy};
pub use wordlist::{WordlistId, get_wordlist, parse_words};
