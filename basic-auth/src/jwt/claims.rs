use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::errors::TokenError;

/// Reserved claim carrying the issuer.
pub const ISSUER: &str = "iss";
/// Reserved claim carrying the audience.
pub const AUDIENCE: &str = "aud";
/// Issued-at claim (Unix timestamp).
pub const ISSUED_AT: &str = "iat";
/// Expiration claim (Unix timestamp).
pub const EXPIRATION: &str = "exp";

/// Untyped claim set carried by a token.
///
/// Mapping from claim name to JSON value. This is what the token service signs
/// and what it hands back before the claims are decoded into a caller type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a claim set from any serializable identity.
    ///
    /// # Errors
    /// * `Signing` - Serialization failed or the identity is not a JSON object
    pub fn from_identity<T: Serialize>(identity: &T) -> Result<Self, TokenError> {
        match serde_json::to_value(identity) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(TokenError::Signing(format!(
                "identity must serialize to a JSON object, got {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(TokenError::Signing(e.to_string())),
        }
    }

    /// Set a claim, replacing any previous value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`Claims::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Issuer (`iss`) if present and a string.
    pub fn issuer(&self) -> Option<&str> {
        self.0.get(ISSUER).and_then(Value::as_str)
    }

    /// Audience (`aud`), accepting both the single-string and array forms.
    pub fn audience(&self) -> Vec<String> {
        match self.0.get(AUDIENCE) {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Expiration (`exp`) as a Unix timestamp.
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(EXPIRATION).and_then(Value::as_i64)
    }

    /// Decode the claim set into a caller-defined shape.
    ///
    /// # Errors
    /// * `ClaimsDecode` - The claims do not fit `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, TokenError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| TokenError::ClaimsDecode(e.to_string()))
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Registered (RFC 7519) claims, all optional.
///
/// Flatten this into an application claim type to get typed access to the
/// standard fields next to the application ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegisteredClaims {
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (user/entity identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience. Tokens may carry a single string or an array.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub aud: Vec<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not before (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// JWT ID (unique token identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Minimal identity: a username plus the registered claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BasicUser {
    pub username: String,

    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

impl BasicUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            registered: RegisteredClaims::default(),
        }
    }

    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.registered.sub = Some(sub.into());
        self
    }

    pub fn issuer(&self) -> Option<&str> {
        self.registered.iss.as_deref()
    }

    pub fn audience(&self) -> &[String] {
        &self.registered.aud
    }
}
