//! Driver credential tokens
//!
//! A token is whatever the driver presents to start a session: an RFID
//! card UID, an app-issued remote credential, or a Plug&Charge contract
//! id. The adapter never issues tokens; it only parses and forwards them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum accepted token length after trimming
const MAX_TOKEN_LEN: usize = 64;

/// How a token was presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Rfid,
    RemoteApp,
    PlugAndCharge,
}

/// A parsed driver token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub uid: String,
    pub kind: TokenKind,
}

/// Errors from [`Token::parse`]
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,

    #[error("token contains invalid characters: {0:?}")]
    InvalidCharacters(String),

    #[error("token exceeds {MAX_TOKEN_LEN} characters")]
    TooLong,
}

impl Token {
    /// Parse a raw token string.
    ///
    /// Bare strings are treated as RFID UIDs; the prefixes `app:` and
    /// `pnc:` select remote-app and Plug&Charge credentials. UIDs may
    /// contain ASCII alphanumerics, `-` and `*`.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TokenError::Empty);
        }

        let (kind, uid) = if let Some(rest) = trimmed.strip_prefix("app:") {
            (TokenKind::RemoteApp, rest)
        } else if let Some(rest) = trimmed.strip_prefix("pnc:") {
            (TokenKind::PlugAndCharge, rest)
        } else {
            (TokenKind::Rfid, trimmed)
        };

        if uid.is_empty() {
            return Err(TokenError::Empty);
        }
        if uid.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong);
        }
        if !uid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '*')
        {
            return Err(TokenError::InvalidCharacters(uid.to_string()));
        }

        Ok(Self {
            uid: uid.to_string(),
            kind,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Rfid => write!(f, "{}", self.uid),
            TokenKind::RemoteApp => write!(f, "app:{}", self.uid),
            TokenKind::PlugAndCharge => write!(f, "pnc:{}", self.uid),
        }
    }
}
