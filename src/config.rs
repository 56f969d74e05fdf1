use std::env;
use std::str::FromStr;

use crate::core::{Result, StoreError};

pub const STUB_LENGTH_ENV: &str = "TALKSTORE_STUB_LENGTH";
pub const MAX_STUB_ATTEMPTS_ENV: &str = "TALKSTORE_MAX_STUB_ATTEMPTS";
pub const DUPLICATE_REMOVAL_ENV: &str = "TALKSTORE_DUPLICATE_REMOVAL";
pub const PER_TALK_LOCKING_ENV: &str = "TALKSTORE_PER_TALK_LOCKING";

/// What a speaker removal does when several rows on the talk share the
/// removed display name.
///
/// Names are the only identity the reconciler sees, so two different
/// unclaimed speakers called "Sam" cannot be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateRemoval {
    /// Delete every row whose display name matches.
    #[default]
    AllMatching,
    /// Delete only the oldest (lowest id) matching row.
    FirstMatching,
}

impl FromStr for DuplicateRemoval {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" | "all_matching" | "all-matching" => Ok(Self::AllMatching),
            "first" | "first_matching" | "first-matching" => Ok(Self::FirstMatching),
            other => Err(StoreError::Config(format!(
                "{} must be one of: all, first (got '{}')",
                DUPLICATE_REMOVAL_ENV, other
            ))),
        }
    }
}

/// Tuning for the consistency components
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Length of generated stubs
    pub stub_length: usize,

    /// Stub writes attempted before giving up and leaving the stub unset
    pub max_stub_attempts: usize,

    /// Behaviour of speaker removal on duplicate display names
    pub duplicate_removal: DuplicateRemoval,

    /// Serialize identifier, speaker and delete operations per talk
    pub per_talk_locking: bool,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self {
            stub_length: 5,
            max_stub_attempts: 5,
            duplicate_removal: DuplicateRemoval::AllMatching,
            per_talk_locking: false,
        }
    }

    pub fn stub_length(mut self, length: usize) -> Self {
        self.stub_length = length;
        self
    }

    pub fn max_stub_attempts(mut self, attempts: usize) -> Self {
        self.max_stub_attempts = attempts;
        self
    }

    pub fn duplicate_removal(mut self, policy: DuplicateRemoval) -> Self {
        self.duplicate_removal = policy;
        self
    }

    pub fn per_talk_locking(mut self, enabled: bool) -> Self {
        self.per_talk_locking = enabled;
        self
    }

    /// Defaults overridden by any `TALKSTORE_*` variables that are set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Some(length) = read_env::<usize>(STUB_LENGTH_ENV)? {
            config.stub_length = length;
        }
        if let Some(attempts) = read_env::<usize>(MAX_STUB_ATTEMPTS_ENV)? {
            config.max_stub_attempts = attempts;
        }
        if let Some(policy) = read_env::<DuplicateRemoval>(DUPLICATE_REMOVAL_ENV)? {
            config.duplicate_removal = policy;
        }
        if let Some(locking) = read_env::<bool>(PER_TALK_LOCKING_ENV)? {
            config.per_talk_locking = locking;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stub_length == 0 || self.stub_length > 32 {
            return Err(StoreError::Config(
                "stub_length must be between 1 and 32".to_string(),
            ));
        }

        if self.max_stub_attempts == 0 {
            return Err(StoreError::Config(
                "max_stub_attempts must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| StoreError::Config(format!("{} is invalid: {}", key, err))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(StoreError::Config(format!("{}: {}", key, err))),
    }
}
