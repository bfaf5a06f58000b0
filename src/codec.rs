//! Balance codec and storage key derivation.
//!
//! Balances are stored as canonical decimal text: ASCII digits, no sign, no
//! leading zeros (except `"0"` itself). Anything else found in the store is
//! treated as corruption rather than read as zero.

use std::fmt;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceKind {
    Savings,
    Checkings,
}

impl BalanceKind {
    pub fn suffix(self) -> &'static str {
        match self {
            BalanceKind::Savings => "savings",
            BalanceKind::Checkings => "checkings",
        }
    }
}

impl fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Storage key of one balance slot, e.g. `alice_checkings`.
pub fn balance_key(account: &str, kind: BalanceKind) -> String {
    format!("{}_{}", account, kind.suffix())
}

pub fn encode(amount: i64) -> Vec<u8> {
    amount.to_string().into_bytes()
}

/// Decodes a stored balance. `key` is only used for error reporting.
pub fn decode(key: &str, bytes: &[u8]) -> Result<i64> {
    let malformed = || Error::MalformedBalance {
        key: key.to_owned(),
    };

    let canonical = match bytes {
        [] => false,
        [b'0'] => true,
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
    };
    if !canonical {
        return Err(malformed());
    }

    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(malformed)
}

/// Parses an integer request argument. Sign rules are applied by the caller.
pub fn parse_amount(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| Error::InvalidAmount(raw.to_owned()))
}
