use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, RemoteError, Result};

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "wrapAPIKey";

/// Input and response field carrying the session's cookie state.
pub const STATE_TOKEN_FIELD: &str = "stateToken";

static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{32}$").expect("invalid api key regex"));

/// Characters that would move a path segment or cut the URL short.
const RESERVED_SEGMENT_CHARS: [char; 3] = ['/', '?', '#'];

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("invalid version regex"));

// ─── ApiKey ──────────────────────────────────────────────────────────────

/// A WrapAPI key: exactly 32 ASCII letters or digits.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn parse(key: &str) -> Result<Self> {
        if !API_KEY_RE.is_match(key) {
            return Err(Error::InvalidArgument(format!(
                "{key} is not a valid WrapAPI key. It should be a 32-character alphanumeric string"
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key with everything but its last four characters masked.
    pub fn redacted(&self) -> String {
        let tail = &self.0[self.0.len() - 4..];
        format!("{}{}", "*".repeat(self.0.len() - 4), tail)
    }
}

impl FromStr for ApiKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.redacted()).finish()
    }
}

// ─── Element ─────────────────────────────────────────────────────────────

/// Address of a hosted API element.
///
/// Fields are not checked on construction; [`crate::Client::run`] reports
/// every problem at once when the element is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub owner: String,
    pub repository: String,
    pub name: String,
    pub version: String,
}

impl Element {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Same element, pinned to `latest`.
    pub fn latest(
        owner: impl Into<String>,
        repository: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(owner, repository, name, "latest")
    }

    /// Parse `owner/repository/name[/version]`. A missing version means `latest`.
    pub fn parse(path: &str) -> Result<Self> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        match parts.as_slice() {
            [owner, repository, name] => Ok(Self::latest(*owner, *repository, *name)),
            [owner, repository, name, version] => {
                Ok(Self::new(*owner, *repository, *name, *version))
            }
            _ => Err(Error::InvalidArgument(format!(
                "{path} is not in the form owner/repository/name[/version]"
            ))),
        }
    }

    /// Request path relative to the host, e.g. `use/acme/shop/prices/latest`.
    pub fn path(&self) -> String {
        format!("use/{self}")
    }

    /// Every argument violation, in a fixed order. Empty when the element is usable.
    pub(crate) fn violations(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (label, segment) in [
            ("owner", &self.owner),
            ("repository", &self.repository),
            ("name", &self.name),
        ] {
            if segment.is_empty() {
                errors.push(format!("{label} is missing"));
            } else if segment.contains(RESERVED_SEGMENT_CHARS) {
                errors.push(format!(
                    "{label} ({segment}) must not contain '/', '?' or '#'"
                ));
            }
        }
        if !is_valid_version(&self.version) {
            errors.push(format!(
                "the version entered ({}) is not \"latest\" or in the form \"x.y.z\"",
                self.version
            ));
        }
        errors
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.owner, self.repository, self.name, self.version
        )
    }
}

impl FromStr for Element {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `latest`, or a strict `major.minor.patch` of decimal numbers.
pub fn is_valid_version(version: &str) -> bool {
    version == "latest" || VERSION_RE.is_match(version)
}

// ─── Envelope ────────────────────────────────────────────────────────────

/// Truthiness as the service's JSON envelopes use it: `null`, `false`, `0`
/// and `""` are falsy, everything else (including empty objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Name of a JSON value's kind, for argument error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turn a response body into the call's outcome.
///
/// A missing or falsy body is an unexpected response. A body with a truthy
/// `success` is returned whole. Anything else becomes a [`RemoteError`] built
/// from the body's `messages` and `errTypes`; without a `messages` array
/// there is nothing to report, so that also counts as unexpected.
pub fn classify_envelope(body: Option<Value>) -> Result<Value> {
    let body = match body {
        Some(body) if is_truthy(&body) => body,
        _ => return Err(RemoteError::unexpected_response().into()),
    };

    if body.get("success").is_some_and(is_truthy) {
        return Ok(body);
    }

    let Some(messages) = body.get("messages").and_then(Value::as_array) else {
        return Err(RemoteError::unexpected_response().into());
    };
    let err_types = body
        .get("errTypes")
        .and_then(Value::as_array)
        .map(|v| string_list(v))
        .unwrap_or_default();

    Err(RemoteError::new(string_list(messages), err_types).into())
}

fn string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}
