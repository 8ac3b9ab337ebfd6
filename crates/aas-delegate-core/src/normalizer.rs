//! Invocation payload normalization.
//!
//! A delegated Operation may be invoked with one of two body shapes:
//!
//! - **Argument list**: the AAS `OperationVariable` array, where each entry wraps
//!   a property in a `value` object carrying `idShort` and `value`:
//!   `[{"value": {"modelType": "Property", "idShort": "pumpValue", "value": "7"}}]`
//! - **Flat object**: a plain JSON object holding the value under a known key:
//!   `{"pumpValue": 42}`
//!
//! Both shapes reduce to exactly one [`ExtractedValue`]. When several accepted
//! aliases are present, the first one in payload order wins.

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Accepted names for the value of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// idShorts accepted when the body is an argument list
    pub argument_aliases: Vec<String>,
    /// Keys accepted when the body is a flat object
    pub field_aliases: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            argument_aliases: vec![
                "pumpValue".to_string(),
                "ExamplePropertyInput".to_string(),
            ],
            field_aliases: vec!["pumpValue".to_string()],
        }
    }
}

/// A parsed invocation body.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationRequest {
    /// Ordered list of argument wrappers
    Arguments(Vec<Value>),
    /// Flat key/value object, in payload order
    Fields(Map<String, Value>),
}

impl InvocationRequest {
    /// Parse a raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::MalformedBody`] if the bytes are not JSON,
    /// or are JSON but neither an array nor an object.
    pub fn parse(body: &[u8]) -> Result<Self, NormalizationError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| NormalizationError::MalformedBody {
                detail: e.to_string(),
            })?;
        Self::from_value(value)
    }

    /// Classify an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::MalformedBody`] for scalars and `null`.
    pub fn from_value(value: Value) -> Result<Self, NormalizationError> {
        match value {
            Value::Array(arguments) => Ok(Self::Arguments(arguments)),
            Value::Object(fields) => Ok(Self::Fields(fields)),
            other => Err(NormalizationError::MalformedBody {
                detail: format!(
                    "expected an argument list or an object, found {}",
                    json_kind(&other)
                ),
            }),
        }
    }

    /// Short name of the body shape, for logging.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Arguments(_) => "arguments",
            Self::Fields(_) => "fields",
        }
    }
}

/// The single scalar carried by an invocation.
///
/// Serializes as a bare JSON scalar, which is what the `$value` endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedValue {
    /// JSON string (kept as a string even if it looks numeric)
    String(String),
    /// JSON number
    Number(Number),
    /// JSON boolean
    Bool(bool),
}

impl ExtractedValue {
    /// Convert a JSON value into a scalar, if it is one.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The value as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl std::fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Extracts the value of interest from invocation bodies.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with the given aliases.
    #[must_use]
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Parse and normalize a raw request body.
    ///
    /// # Errors
    ///
    /// Returns the [`NormalizationError`] describing why no value was extracted.
    pub fn normalize_bytes(&self, body: &[u8]) -> Result<ExtractedValue, NormalizationError> {
        let request = InvocationRequest::parse(body)?;
        self.normalize(&request)
    }

    /// Extract the value of interest from a parsed request.
    ///
    /// # Errors
    ///
    /// - [`NormalizationError::NoMatch`] if no argument carries an accepted idShort
    /// - [`NormalizationError::MissingKey`] if the object has no accepted key
    /// - [`NormalizationError::NonScalarValue`] if the first match is not a scalar
    pub fn normalize(
        &self,
        request: &InvocationRequest,
    ) -> Result<ExtractedValue, NormalizationError> {
        match request {
            InvocationRequest::Arguments(arguments) => self.extract_from_arguments(arguments),
            InvocationRequest::Fields(fields) => self.extract_from_fields(fields),
        }
    }

    fn extract_from_arguments(
        &self,
        arguments: &[Value],
    ) -> Result<ExtractedValue, NormalizationError> {
        // Entries without a nested value object are skipped.
        let mut matches = arguments
            .iter()
            .filter_map(|argument| argument.get("value").and_then(Value::as_object))
            .filter(|variable| {
                variable
                    .get("idShort")
                    .and_then(Value::as_str)
                    .is_some_and(|id_short| accepts(&self.config.argument_aliases, id_short))
            });

        let first = matches.next().ok_or(NormalizationError::NoMatch)?;
        if matches.next().is_some() {
            tracing::debug!(
                id_short = first.get("idShort").and_then(serde_json::Value::as_str),
                "Several accepted arguments present, using the first"
            );
        }

        scalar(first.get("value"))
    }

    fn extract_from_fields(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<ExtractedValue, NormalizationError> {
        let mut matches = fields
            .iter()
            .filter(|(key, _)| accepts(&self.config.field_aliases, key));

        let (key, value) = matches.next().ok_or(NormalizationError::MissingKey)?;
        if matches.next().is_some() {
            tracing::debug!(key = %key, "Several accepted keys present, using the first");
        }

        scalar(Some(value))
    }
}

fn accepts(aliases: &[String], name: &str) -> bool {
    aliases.iter().any(|alias| alias == name)
}

fn scalar(value: Option<&Value>) -> Result<ExtractedValue, NormalizationError> {
    value
        .and_then(ExtractedValue::from_json)
        .ok_or(NormalizationError::NonScalarValue)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reasons an invocation body yields no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// Argument list is empty or has no accepted idShort
    #[error("no input argument with an accepted idShort found in request")]
    NoMatch,
    /// Object has none of the accepted keys
    #[error("no accepted key found in request")]
    MissingKey,
    /// Body is not JSON, or is neither a list nor an object
    #[error("malformed request body: {detail}")]
    MalformedBody {
        /// What was wrong with the body
        detail: String,
    },
    /// The matched element holds null, an object or an array
    #[error("matched element does not carry a scalar value")]
    NonScalarValue,
}

impl NormalizationError {
    /// Stable machine-readable reason code.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoMatch => "no-match",
            Self::MissingKey => "missing-key",
            Self::MalformedBody { .. } => "malformed-body",
            Self::NonScalarValue => "non-scalar-value",
        }
    }
}
