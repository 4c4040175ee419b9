//! Skip-token codec.
//!
//! A skip token is the one serialized artifact this layer owns: an ordered
//! list of (literal value, literal type) pairs, one per active order-by
//! column, plus the signed rendering of that order. Encoding is versioned
//! base64url JSON and must stay stable across releases; malformed input is
//! rejected at this boundary, never deep inside query construction.

use crate::{Error, LiteralKind};

/// One skip-token entry: the last-seen row's value for a sort column,
/// rendered as a string, tagged with its protocol literal type.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenValue {
    #[serde(rename = "v")]
    pub value: String,
    #[serde(rename = "t")]
    pub kind: LiteralKind,
}

impl TokenValue {
    pub fn new(value: impl Into<String>, kind: LiteralKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// Structured continuation cursor for keyset pagination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkipToken {
    /// One pair per active order-by column, in column precedence order.
    pub values: Vec<TokenValue>,
    /// Signed rendering ("+a,-b/c") of the order the token was minted under.
    pub order: String,
}

impl SkipToken {
    pub fn new(values: Vec<TokenValue>, order: impl Into<String>) -> Self {
        Self {
            values,
            order: order.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode to an opaque base64url string.
    ///
    /// # Errors
    /// Returns a JSON serialization error if encoding fails.
    pub fn encode(&self) -> serde_json::Result<String> {
        #[derive(serde::Serialize)]
        struct Wire<'a> {
            v: u8,
            k: &'a [TokenValue],
            s: &'a str,
        }
        let w = Wire {
            v: 1,
            k: &self.values,
            s: &self.order,
        };
        serde_json::to_vec(&w).map(|x| base64_url::encode(&x))
    }

    /// Decode from an opaque base64url string.
    ///
    /// # Errors
    /// Returns `Error::TokenInvalidBase64` if base64 decoding fails.
    /// Returns `Error::TokenInvalidJson` if JSON parsing fails.
    /// Returns `Error::TokenInvalidVersion` if the version is unsupported.
    /// Returns `Error::TokenInvalidValues` if the value list or order is empty.
    pub fn decode(token: &str) -> Result<Self, Error> {
        #[derive(serde::Deserialize)]
        struct Wire {
            v: u8,
            k: Vec<TokenValue>,
            s: String,
        }

        let bytes = base64_url::decode(token).map_err(|_| Error::TokenInvalidBase64)?;
        let w: Wire = serde_json::from_slice(&bytes).map_err(|_| Error::TokenInvalidJson)?;
        if w.v != 1 {
            return Err(Error::TokenInvalidVersion);
        }
        if w.k.is_empty() || w.s.trim().is_empty() {
            return Err(Error::TokenInvalidValues);
        }
        Ok(SkipToken {
            values: w.k,
            order: w.s,
        })
    }
}

// base64url helpers (no padding)
mod base64_url {
    use base64::Engine;

    pub fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::{SkipToken, TokenValue};
    use crate::{Error, LiteralKind};

    fn sample() -> SkipToken {
        SkipToken::new(
            vec![
                TokenValue::new("2", LiteralKind::I64),
                TokenValue::new("name", LiteralKind::String),
            ],
            "+id,-name",
        )
    }

    #[test]
    fn encode_decode_round_trip() {
        let token = sample();
        let encoded = token.encode().unwrap();
        let decoded = SkipToken::decode(&encoded).unwrap();
        assert_eq!(decoded, token);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.values[0].kind, LiteralKind::I64);
        assert_eq!(decoded.values[1].kind, LiteralKind::String);
    }

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(matches!(
            SkipToken::decode("not base64!!"),
            Err(Error::TokenInvalidBase64)
        ));
    }

    #[test]
    fn decode_rejects_bad_json() {
        let garbage = {
            use base64::Engine;
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"{not json")
        };
        assert!(matches!(
            SkipToken::decode(&garbage),
            Err(Error::TokenInvalidJson)
        ));
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let wire = {
            use base64::Engine;
            base64::engine::general_purpose::URL_SAFE_NO_PAD
                .encode(br#"{"v":2,"k":[{"v":"1","t":"i64"}],"s":"+id"}"#)
        };
        assert!(matches!(
            SkipToken::decode(&wire),
            Err(Error::TokenInvalidVersion)
        ));
    }

    #[test]
    fn decode_rejects_empty_values_or_order() {
        use base64::Engine;
        let no_values = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"v":1,"k":[],"s":"+id"}"#);
        assert!(matches!(
            SkipToken::decode(&no_values),
            Err(Error::TokenInvalidValues)
        ));

        let no_order = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"v":1,"k":[{"v":"1","t":"i64"}],"s":"  "}"#);
        assert!(matches!(
            SkipToken::decode(&no_order),
            Err(Error::TokenInvalidValues)
        ));
    }

    #[test]
    fn encoding_is_url_safe() {
        let encoded = sample().encode().unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
