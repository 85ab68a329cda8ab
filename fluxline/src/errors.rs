//! Error types for fluxline.
//!
//! Type mismatches, exhausted `seek` searches and unconvertible `emit`
//! arguments are compile errors and have no variant here. What remains are
//! the run-time conditions of the dynamic multicast path.

use thiserror::Error;

use crate::multicast::Token;

/// The main error type for fluxline operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FluxError {
    /// A token that is not attached (never was, or already detached).
    #[error("Unknown token {token} in {scope}")]
    UnknownToken {
        /// The token that was looked up.
        token: Token,
        /// Where it was looked up: `"flux"` (lanes and handlers) or `"except"`.
        scope: &'static str,
    },
}

impl FluxError {
    /// Creates an unknown-token error.
    pub fn unknown_token(token: Token, scope: &'static str) -> Self {
        Self::UnknownToken { token, scope }
    }

    /// Returns the token this error refers to.
    pub fn token(&self) -> Token {
        match self {
            Self::UnknownToken { token, .. } => *token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_display() {
        let token = Token::new();
        let err = FluxError::unknown_token(token, "except");

        let msg = err.to_string();
        assert!(msg.starts_with("Unknown token "));
        assert!(msg.contains(&token.to_string()));
        assert!(msg.ends_with("in except"));
    }

    #[test]
    fn test_token_accessor() {
        let token = Token::new();
        assert_eq!(FluxError::unknown_token(token, "flux").token(), token);
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(FluxError::unknown_token(Token::new(), "flux"));
        assert!(err.source().is_none());
    }
}
