use std::collections::VecDeque;
use std::sync::Mutex;

use uuid::Uuid;

/// Source of random stub candidates.
///
/// Injected into the identifier assigner so tests can script collisions.
pub trait TokenSource: Send + Sync {
    /// A fresh token of exactly `length` characters.
    fn next_token(&self, length: usize) -> String;
}

// Hex digits 0..12 of a v4 UUID carry no version or variant bits.
const RANDOM_HEX_PER_UUID: usize = 12;

/// Lowercase hex drawn from the fully random digits of v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenSource;

impl TokenSource for UuidTokenSource {
    fn next_token(&self, length: usize) -> String {
        let mut token = String::with_capacity(length + RANDOM_HEX_PER_UUID);
        while token.len() < length {
            let hex = Uuid::new_v4().simple().to_string();
            token.push_str(&hex[..RANDOM_HEX_PER_UUID]);
        }
        token.truncate(length);
        token
    }
}

/// Replays a fixed list of tokens, then falls back to random ones.
#[derive(Debug, Default)]
pub struct ScriptedTokenSource {
    script: Mutex<VecDeque<String>>,
}

impl ScriptedTokenSource {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(tokens.into_iter().map(Into::into).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .map(|script| script.len())
            .unwrap_or_default()
    }
}

impl TokenSource for ScriptedTokenSource {
    fn next_token(&self, length: usize) -> String {
        let scripted = match self.script.lock() {
            Ok(mut script) => script.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        scripted.unwrap_or_else(|| UuidTokenSource.next_token(length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_tokens_have_requested_length() {
        let source = UuidTokenSource;
        for length in [1, 5, 32, 40] {
            let token = source.next_token(length);
            assert_eq!(token.len(), length);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_long_tokens_skip_fixed_uuid_digits() {
        let source = UuidTokenSource;
        let tokens: Vec<String> = (0..64).map(|_| source.next_token(32)).collect();

        // Position 12 would always be the version digit '4' in a raw UUID.
        assert!(tokens.iter().any(|t| t.as_bytes()[12] != b'4'));
        let variant_digits = ['8', '9', 'a', 'b'];
        assert!(
            tokens
                .iter()
                .any(|t| !variant_digits.contains(&(t.as_bytes()[16] as char)))
        );
    }

    #[test]
    fn test_scripted_tokens_replay_in_order() {
        let source = ScriptedTokenSource::new(["aaaaa", "bbbbb"]);
        assert_eq!(source.next_token(5), "aaaaa");
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_token(5), "bbbbb");
        assert_eq!(source.next_token(5).len(), 5);
    }
}
