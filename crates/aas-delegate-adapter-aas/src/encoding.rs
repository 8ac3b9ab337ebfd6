//! AAS Part 2 path encoding.
//!
//! Repository URLs address elements by two different encodings:
//!
//! - the Identifiable's `id` (a submodel or shell identifier) is base64url-encoded
//!   without padding and used as a single path segment
//! - the element's idShort path is percent-encoded, keeping `.` and `[]` intact

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside an idShort path segment.
const IDSHORT_PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'$');

/// Encode an Identifiable's `id` for use in a repository path.
///
/// # Examples
///
/// ```
/// use aas_delegate_adapter_aas::encode_id_base64url;
///
/// assert_eq!(
///     encode_id_base64url("urn:example:sm:ops:1"),
///     "dXJuOmV4YW1wbGU6c206b3BzOjE"
/// );
/// ```
#[must_use]
pub fn encode_id_base64url(id: &str) -> String {
    URL_SAFE_NO_PAD.encode(id.as_bytes())
}

/// Decode a base64url path segment back into an identifier.
///
/// # Errors
///
/// Returns error if the segment is not base64url or not UTF-8.
///
/// # Examples
///
/// ```
/// use aas_delegate_adapter_aas::decode_id_base64url;
///
/// let id = decode_id_base64url("dXJuOmV4YW1wbGU6c206b3BzOjE").unwrap();
/// assert_eq!(id, "urn:example:sm:ops:1");
/// ```
pub fn decode_id_base64url(encoded: &str) -> Result<String, EncodingError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|e| EncodingError::Base64Decode(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| EncodingError::Utf8Decode(e.to_string()))
}

/// Percent-encode an idShort path for use in a repository path.
///
/// # Examples
///
/// ```
/// use aas_delegate_adapter_aas::encode_idshort_path;
///
/// assert_eq!(encode_idshort_path("pumpValue"), "pumpValue");
/// assert_eq!(encode_idshort_path("Pumps[0].Set Point"), "Pumps[0].Set%20Point");
/// ```
#[must_use]
pub fn encode_idshort_path(path: &str) -> String {
    utf8_percent_encode(path, IDSHORT_PATH_ESCAPE).to_string()
}

/// Errors decoding repository path segments.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EncodingError {
    /// Segment is not valid base64url
    #[error("base64 decode error: {0}")]
    Base64Decode(String),
    /// Decoded bytes are not UTF-8
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(String),
}
