use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const EXPIRY_BUFFER: Duration = Duration::minutes(5);

/// OAuth token exactly as the provider returned it.
///
/// The store persists it verbatim; only the agent peeks at the handful of
/// fields it needs to authenticate and refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Map<String, Value>);

impl Token {
    /// Build a token from a fresh token endpoint response, stamping
    /// `expires_at` from `expires_in` the way oauthlib-style clients do.
    pub fn issued(mut fields: Map<String, Value>, now: DateTime<Utc>) -> Self {
        if let Some(expires_in) = fields.get("expires_in").and_then(Value::as_f64) {
            let expires_at = now.timestamp() as f64 + expires_in;
            fields.insert("expires_at".to_string(), Value::from(expires_at));
        }
        Self(fields)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.0.get("access_token").and_then(Value::as_str)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.0.get("refresh_token").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let seconds = self.0.get("expires_at").and_then(Value::as_f64)?;
        DateTime::from_timestamp(seconds.trunc() as i64, 0)
    }

    /// Tokens without an expiry are trusted until the server says otherwise.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at <= now + EXPIRY_BUFFER,
            None => false,
        }
    }

    /// Refresh responses may omit the refresh token, in which case the
    /// previous one stays valid.
    pub fn inherit_refresh_token(mut self, previous: &Token) -> Self {
        if self.refresh_token().is_none() {
            if let Some(refresh_token) = previous.refresh_token() {
                self.0.insert(
                    "refresh_token".to_string(),
                    Value::String(refresh_token.to_string()),
                );
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(value: Value) -> Token {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn issued_token_gets_expires_at() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let fields = json!({ "access_token": "abc", "expires_in": 3600 });
        let issued = Token::issued(fields.as_object().unwrap().clone(), now);

        assert_eq!(
            issued.expires_at(),
            DateTime::from_timestamp(1_700_003_600, 0)
        );
        assert_eq!(issued.access_token(), Some("abc"));
    }

    #[test]
    fn expiry_uses_buffer() {
        let now = Utc::now();
        let soon = token(json!({ "expires_at": (now + Duration::minutes(2)).timestamp() }));
        let later = token(json!({ "expires_at": (now + Duration::hours(1)).timestamp() }));
        let never = token(json!({ "access_token": "abc" }));

        assert!(soon.is_expired(now));
        assert!(!later.is_expired(now));
        assert!(!never.is_expired(now));
    }

    #[test]
    fn refresh_token_is_inherited_only_when_missing() {
        let previous = token(json!({ "refresh_token": "old" }));

        let without = token(json!({ "access_token": "new" })).inherit_refresh_token(&previous);
        assert_eq!(without.refresh_token(), Some("old"));

        let with = token(json!({ "refresh_token": "rotated" })).inherit_refresh_token(&previous);
        assert_eq!(with.refresh_token(), Some("rotated"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let raw = json!({ "access_token": "abc", "scope": "api:read", "expires_in": 3600 });
        let parsed = token(raw.clone());
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }
}
