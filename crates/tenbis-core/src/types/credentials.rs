//! Credential set and its named fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::Secret;

/// A well-known field of the credential set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialField {
    /// Short-lived session token, sent as bearer and `Authorization` cookie.
    AccessToken,
    /// Long-lived token exchanged for a new access token.
    RefreshToken,
    /// Amount to load on each balance top-up.
    Amount,
    /// Identifier of the money card the top-up is charged to.
    MoneycardId,
    /// Optional Teams incoming webhook used for notifications.
    TeamsWebhookUrl,
}

impl CredentialField {
    pub const ALL: [CredentialField; 5] = [
        CredentialField::AccessToken,
        CredentialField::RefreshToken,
        CredentialField::Amount,
        CredentialField::MoneycardId,
        CredentialField::TeamsWebhookUrl,
    ];

    /// Key used in the configuration file and in response bodies.
    pub fn key(self) -> &'static str {
        match self {
            CredentialField::AccessToken => "AccessToken",
            CredentialField::RefreshToken => "RefreshToken",
            CredentialField::Amount => "Amount",
            CredentialField::MoneycardId => "MoneycardId",
            CredentialField::TeamsWebhookUrl => "TeamsWebhookUrl",
        }
    }

    /// Environment variable carrying this field.
    pub fn env_var(self) -> &'static str {
        match self {
            CredentialField::AccessToken => "ACCESS_TOKEN",
            CredentialField::RefreshToken => "REFRESH_TOKEN",
            CredentialField::Amount => "AMOUNT",
            CredentialField::MoneycardId => "MONEYCARD_ID",
            CredentialField::TeamsWebhookUrl => "TEAMS_WEBHOOK_URL",
        }
    }

    /// Step output name reported when this field is rotated.
    pub fn output_name(self) -> &'static str {
        match self {
            CredentialField::AccessToken => "access_token",
            CredentialField::RefreshToken => "refresh_token",
            CredentialField::Amount => "amount",
            CredentialField::MoneycardId => "moneycard_id",
            CredentialField::TeamsWebhookUrl => "teams_webhook_url",
        }
    }

    /// Whether the value must be masked before reaching any log sink.
    pub fn is_secret(self) -> bool {
        matches!(
            self,
            CredentialField::AccessToken
                | CredentialField::RefreshToken
                | CredentialField::TeamsWebhookUrl
        )
    }
}

impl AsRef<str> for CredentialField {
    fn as_ref(&self) -> &str {
        self.key()
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CredentialField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CredentialField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown credential field '{}'", s)))
    }
}

/// The named bundle of secrets and parameters driving one scheduled action.
///
/// Values are kept as JSON so numeric fields (an `Amount` of `100`) and keys
/// this crate does not know about survive a load/save round trip untouched.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialSet(Map<String, Value>);

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidInput(format!(
                "credential set must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Set a string value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    /// Set a raw JSON value, replacing any previous one.
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the value for `key` rendered as a string.
    ///
    /// Numbers and booleans are stringified; `null`, arrays and objects read
    /// as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Returns the raw JSON value for `key`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a well-known field, treating blank values as absent.
    pub fn field(&self, field: CredentialField) -> Option<String> {
        self.get(field.key()).filter(|v| !v.trim().is_empty())
    }

    /// Returns a well-known field wrapped as a [`Secret`].
    pub fn secret(&self, field: CredentialField) -> Option<Secret> {
        self.field(field).map(Secret::new)
    }

    /// True when `key` is absent or its value is empty after trimming.
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).is_none_or(|v| v.trim().is_empty())
    }

    /// Check that every required field is present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming every missing field, in the order
    /// they were requested.
    pub fn validate<K: AsRef<str>>(&self, required: &[K]) -> Result<(), Error> {
        let missing: Vec<String> = required
            .iter()
            .map(|key| key.as_ref())
            .filter(|key| self.is_blank(key))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { missing })
        }
    }

    /// Right-biased merge: values in `updates` replace values for the same
    /// key, every other key survives.
    pub fn merged(&self, updates: &CredentialSet) -> CredentialSet {
        let mut merged = self.0.clone();
        for (key, value) in &updates.0 {
            merged.insert(key.clone(), value.clone());
        }
        CredentialSet(merged)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keep only the listed well-known fields.
    pub fn retain_fields(&mut self, allowed: &[CredentialField]) {
        self.0
            .retain(|key, _| allowed.iter().any(|field| field.key() == key));
    }
}

// Values may be secrets; only keys are printed.
impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_names_blank_field_only() {
        let set = CredentialSet::new()
            .with("AccessToken", "")
            .with("RefreshToken", "x");

        let err = set
            .validate(&["AccessToken", "RefreshToken"])
            .unwrap_err();
        match err {
            Error::Validation { missing } => assert_eq!(missing, vec!["AccessToken"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_names_every_absent_field() {
        let err = CredentialSet::new().validate(&["A", "B"]).unwrap_err();
        match err {
            Error::Validation { missing } => assert_eq!(missing, vec!["A", "B"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let set = CredentialSet::new().with("RefreshToken", "   \t");
        assert!(set.validate(&[CredentialField::RefreshToken]).is_err());
    }

    #[test]
    fn numeric_values_are_present() {
        let set = CredentialSet::from_json(json!({ "Amount": 100, "MoneycardId": 5 })).unwrap();
        assert!(
            set.validate(&[CredentialField::Amount, CredentialField::MoneycardId])
                .is_ok()
        );
        assert_eq!(set.field(CredentialField::Amount).as_deref(), Some("100"));
    }

    #[test]
    fn merge_is_right_biased() {
        let current = CredentialSet::new()
            .with("Amount", "100")
            .with("MoneycardId", "5");
        let updates = CredentialSet::new().with("Amount", "200");

        let merged = current.merged(&updates);
        assert_eq!(merged.get("Amount").as_deref(), Some("200"));
        assert_eq!(merged.get("MoneycardId").as_deref(), Some("5"));
        assert_eq!(current.get("Amount").as_deref(), Some("100"));
    }

    #[test]
    fn debug_hides_values() {
        let set = CredentialSet::new().with("AccessToken", "super-secret-token");
        let debug = format!("{:?}", set);
        assert!(debug.contains("AccessToken"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(CredentialSet::from_json(json!(["AccessToken"])).is_err());
    }

    #[test]
    fn field_names_round_trip() {
        for field in CredentialField::ALL {
            assert_eq!(field.key().parse::<CredentialField>().unwrap(), field);
        }
        assert!("Password".parse::<CredentialField>().is_err());
    }
}
