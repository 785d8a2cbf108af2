//! Basic-token derivation for the token endpoint.
//!
//! The API issues short-lived bearer tokens in exchange for a Basic
//! credential derived from the account's client id and secret. The Basic
//! token is computed once per [`Client`](crate::Client) and never changes;
//! bearer tokens are fetched and refreshed as needed.

use crate::errors::RedactError;
use base64::{Engine as _, engine::general_purpose};

/// Derives the Basic authorization header value from a client id/secret pair.
///
/// # Errors
///
/// Returns [`RedactError::Credentials`] if either input is empty.
///
/// # Example
///
/// ```
/// use secure_redact::build_basic_token;
///
/// let token = build_basic_token("clientId", "clientSecret").unwrap();
/// assert_eq!(token, "Basic Y2xpZW50SWQ6Y2xpZW50U2VjcmV0");
/// ```
pub fn build_basic_token(client_id: &str, client_secret: &str) -> Result<String, RedactError> {
    if client_id.is_empty() || client_secret.is_empty() {
        return Err(RedactError::Credentials(
            "client id and client secret must be non-empty".to_string(),
        ));
    }
    let encoded = general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"));
    Ok(format!("Basic {encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_fail() {
        for (id, secret) in [("", ""), ("", "secret"), ("id", "")] {
            let err = build_basic_token(id, secret).unwrap_err();
            assert!(matches!(err, RedactError::Credentials(_)));
            assert_eq!(err.status_code(), 500);
        }
    }

    #[test]
    fn test_token_is_deterministic() {
        let token = build_basic_token("my_id", "my_secret").unwrap();
        assert_eq!(token, build_basic_token("my_id", "my_secret").unwrap());
        assert!(token.starts_with("Basic "));

        let encoded = token.strip_prefix("Basic ").unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "my_id:my_secret");
    }

    #[test]
    fn test_known_value() {
        assert_eq!(
            build_basic_token("clientId", "clientSecret").unwrap(),
            "Basic Y2xpZW50SWQ6Y2xpZW50U2VjcmV0"
        );
    }
}
