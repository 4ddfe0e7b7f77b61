//! Extraction of rotated credentials from a response.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::{CredentialField, CredentialSet, HttpResponse};

/// Where an extracted value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    SetCookie,
    AuthorizationHeader,
    CustomHeader,
    Body,
}

impl TokenSource {
    pub fn is_header(self) -> bool {
        !matches!(self, TokenSource::Body)
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenSource::SetCookie => "Set-Cookie header",
            TokenSource::AuthorizationHeader => "Authorization header",
            TokenSource::CustomHeader => "custom header",
            TokenSource::Body => "response body",
        })
    }
}

/// A partial credential set carried by a response.
///
/// Header-sourced values win over body-sourced values for the same field.
#[derive(Debug, Clone, Default)]
pub struct TokenUpdate {
    values: CredentialSet,
    sources: BTreeMap<CredentialField, TokenSource>,
}

impl TokenUpdate {
    /// Inspect headers and JSON body of `response`.
    pub fn from_response(response: &HttpResponse) -> Self {
        let mut update = TokenUpdate::default();

        if let Some(body) = response.json() {
            update.apply_body(&body);
        }
        // Headers last so they overwrite body values.
        update.apply_headers(response);

        update
    }

    fn apply_body(&mut self, body: &Value) {
        for field in [CredentialField::AccessToken, CredentialField::RefreshToken] {
            if let Some(token) = body.get(field.key()).and_then(Value::as_str)
                && !token.is_empty()
            {
                self.insert(field, Value::String(token.to_string()), TokenSource::Body);
            }
        }

        match body.get(CredentialField::Amount.key()) {
            Some(amount @ (Value::String(_) | Value::Number(_))) => {
                self.insert(CredentialField::Amount, amount.clone(), TokenSource::Body);
            }
            _ => {}
        }
    }

    fn apply_headers(&mut self, response: &HttpResponse) {
        for cookie in response.header_all("set-cookie") {
            for (name, value) in cookie_pairs(cookie) {
                let field = match name {
                    "Authorization" => CredentialField::AccessToken,
                    "RefreshToken" => CredentialField::RefreshToken,
                    _ => continue,
                };
                self.insert_str(field, value, TokenSource::SetCookie);
            }
        }

        if let Some(auth) = response.header("authorization") {
            let token = strip_bearer(auth);
            if !token.is_empty() {
                self.insert_str(
                    CredentialField::AccessToken,
                    token,
                    TokenSource::AuthorizationHeader,
                );
            }
        }

        if let Some(token) = response.header("x-access-token").map(str::trim)
            && !token.is_empty()
        {
            self.insert_str(CredentialField::AccessToken, token, TokenSource::CustomHeader);
        }

        if let Some(token) = response.header("x-refresh-token").map(str::trim)
            && !token.is_empty()
        {
            self.insert_str(CredentialField::RefreshToken, token, TokenSource::CustomHeader);
        }
    }

    fn insert_str(&mut self, field: CredentialField, value: &str, source: TokenSource) {
        self.insert(field, Value::String(value.to_string()), source);
    }

    fn insert(&mut self, field: CredentialField, value: Value, source: TokenSource) {
        self.values.set_value(field.key(), value);
        self.sources.insert(field, source);
    }

    /// Drop every field the caller does not accept from this response.
    pub fn restrict(&mut self, allowed: &[CredentialField]) {
        self.values.retain_fields(allowed);
        self.sources.retain(|field, _| allowed.contains(field));
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Extracted fields in a stable order.
    pub fn fields(&self) -> Vec<CredentialField> {
        self.sources.keys().copied().collect()
    }

    pub fn source(&self, field: CredentialField) -> Option<TokenSource> {
        self.sources.get(&field).copied()
    }

    pub fn header_count(&self) -> usize {
        self.sources.values().filter(|s| s.is_header()).count()
    }

    pub fn body_count(&self) -> usize {
        self.sources.values().filter(|s| !s.is_header()).count()
    }

    pub fn get(&self, field: CredentialField) -> Option<String> {
        self.values.get(field.key())
    }

    /// Fields whose extracted value differs from `current`.
    pub fn changed_fields(&self, current: &CredentialSet) -> Vec<CredentialField> {
        self.fields()
            .into_iter()
            .filter(|field| self.get(*field) != current.get(field.key()))
            .collect()
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.values
    }
}

/// Split a `Set-Cookie` (or `Cookie`) value into name/value pairs.
fn cookie_pairs(cookie: &str) -> impl Iterator<Item = (&str, &str)> {
    cookie.split(';').filter_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        let value = value.trim();
        (!value.is_empty()).then_some((name.trim(), value))
    })
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim_start(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> HttpResponse {
        HttpResponse::new(200, body.to_string())
    }

    #[test]
    fn header_wins_over_body() {
        let resp = response(json!({ "AccessToken": "B1" }))
            .with_header("Set-Cookie", "Authorization=H1; Path=/; HttpOnly");

        let update = TokenUpdate::from_response(&resp);
        assert_eq!(update.get(CredentialField::AccessToken).as_deref(), Some("H1"));
        assert_eq!(
            update.source(CredentialField::AccessToken),
            Some(TokenSource::SetCookie)
        );
    }

    #[test]
    fn body_fills_fields_headers_do_not_carry() {
        let resp = response(json!({ "AccessToken": "B1", "RefreshToken": "R1" }))
            .with_header("Set-Cookie", "Authorization=H1; Secure");

        let update = TokenUpdate::from_response(&resp);
        assert_eq!(update.get(CredentialField::AccessToken).as_deref(), Some("H1"));
        assert_eq!(update.get(CredentialField::RefreshToken).as_deref(), Some("R1"));
        assert_eq!(update.header_count(), 1);
        assert_eq!(update.body_count(), 1);
    }

    #[test]
    fn refresh_token_from_separate_cookie() {
        let resp = HttpResponse::new(200, "")
            .with_header("Set-Cookie", "Authorization=A2; Path=/")
            .with_header("Set-Cookie", "RefreshToken=R2; Path=/; HttpOnly");

        let update = TokenUpdate::from_response(&resp);
        assert_eq!(update.get(CredentialField::AccessToken).as_deref(), Some("A2"));
        assert_eq!(update.get(CredentialField::RefreshToken).as_deref(), Some("R2"));
    }

    #[test]
    fn authorization_header_strips_bearer() {
        let resp = HttpResponse::new(200, "").with_header("Authorization", "bearer  abc.def");
        let update = TokenUpdate::from_response(&resp);
        assert_eq!(
            update.get(CredentialField::AccessToken).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn custom_headers_override_cookies() {
        let resp = HttpResponse::new(200, "")
            .with_header("Set-Cookie", "Authorization=cookie-token")
            .with_header("X-Access-Token", "custom-token")
            .with_header("X-Refresh-Token", "custom-refresh");

        let update = TokenUpdate::from_response(&resp);
        assert_eq!(
            update.get(CredentialField::AccessToken).as_deref(),
            Some("custom-token")
        );
        assert_eq!(
            update.get(CredentialField::RefreshToken).as_deref(),
            Some("custom-refresh")
        );
    }

    #[test]
    fn numeric_amount_from_body() {
        let update = TokenUpdate::from_response(&response(json!({ "Amount": 150 })));
        assert_eq!(update.get(CredentialField::Amount).as_deref(), Some("150"));
        assert_eq!(
            update.credentials().get_value("Amount"),
            Some(&json!(150))
        );
    }

    #[test]
    fn empty_response_yields_nothing() {
        let update = TokenUpdate::from_response(&HttpResponse::new(204, ""));
        assert!(update.is_empty());

        let update = TokenUpdate::from_response(&response(json!({ "AccessToken": "" })));
        assert!(update.is_empty());
    }

    #[test]
    fn restrict_drops_unaccepted_fields() {
        let mut update = TokenUpdate::from_response(&response(json!({
            "AccessToken": "A",
            "Amount": "300"
        })));
        update.restrict(&[CredentialField::AccessToken, CredentialField::RefreshToken]);

        assert_eq!(update.fields(), vec![CredentialField::AccessToken]);
        assert!(!update.credentials().contains_key("Amount"));
    }

    #[test]
    fn changed_fields_compares_against_current() {
        let current = CredentialSet::new()
            .with("AccessToken", "same")
            .with("RefreshToken", "old");
        let update = TokenUpdate::from_response(&response(json!({
            "AccessToken": "same",
            "RefreshToken": "new"
        })));

        assert_eq!(
            update.changed_fields(&current),
            vec![CredentialField::RefreshToken]
        );
    }
}
