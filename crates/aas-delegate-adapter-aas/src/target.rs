//! Fixed `$value` endpoint of the property updated by the bridge.

use crate::encoding::{encode_id_base64url, encode_idshort_path};
use url::Url;

/// The repository property whose value the bridge replaces.
///
/// Built once from configuration; request contents never influence it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTarget {
    url: Url,
}

impl PropertyTarget {
    /// Build the `$value` URL for a property in a submodel repository.
    ///
    /// The submodel id is base64url-encoded and the idShort path percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns error if the resulting URL is invalid or not http(s).
    ///
    /// # Examples
    ///
    /// ```
    /// use aas_delegate_adapter_aas::PropertyTarget;
    ///
    /// let target = PropertyTarget::new(
    ///     "http://localhost:8081/",
    ///     "urn:example:sm:ops:1",
    ///     "pumpValue",
    /// )
    /// .unwrap();
    /// assert_eq!(
    ///     target.as_str(),
    ///     "http://localhost:8081/submodels/dXJuOmV4YW1wbGU6c206b3BzOjE/submodel-elements/pumpValue/$value"
    /// );
    /// ```
    pub fn new(
        repo_url: &str,
        submodel_id: &str,
        id_short_path: &str,
    ) -> Result<Self, TargetError> {
        if submodel_id.is_empty() {
            return Err(TargetError::Empty("submodel id"));
        }
        if id_short_path.is_empty() {
            return Err(TargetError::Empty("idShort path"));
        }

        let url = format!(
            "{}/submodels/{}/submodel-elements/{}/$value",
            repo_url.trim_end_matches('/'),
            encode_id_base64url(submodel_id),
            encode_idshort_path(id_short_path)
        );
        Self::parse(&url)
    }

    /// Use a pre-built `$value` URL as the target.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or not http(s).
    pub fn parse(url: &str) -> Result<Self, TargetError> {
        let url = Url::parse(url).map_err(|e| TargetError::InvalidUrl(format!("{url}: {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        }

        if !url.path().ends_with("/$value") {
            tracing::warn!(
                url = %url,
                "Target URL does not address a $value sub-resource"
            );
        }

        Ok(Self { url })
    }

    /// The target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The target URL as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl std::fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors building a [`PropertyTarget`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    /// URL could not be parsed
    #[error("invalid target URL {0}")]
    InvalidUrl(String),
    /// URL scheme is not http or https
    #[error("unsupported target URL scheme: {0}")]
    UnsupportedScheme(String),
    /// A required component is empty
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_path_is_encoded() {
        let target =
            PropertyTarget::new("https://repo.example", "urn:example:sm:ops:1", "Pump A.Speed")
                .unwrap();
        assert_eq!(target.url().scheme(), "https");
        assert!(target
            .as_str()
            .ends_with("/submodel-elements/Pump%20A.Speed/$value"));
    }

    #[test]
    fn base_path_is_kept() {
        let target = PropertyTarget::new(
            "http://basyx:8081/api/v3.0",
            "urn:example:sm:ops:1",
            "pumpValue",
        )
        .unwrap();
        assert_eq!(
            target.url().path(),
            "/api/v3.0/submodels/dXJuOmV4YW1wbGU6c206b3BzOjE/submodel-elements/pumpValue/$value"
        );
    }

    #[test]
    fn prebuilt_url_is_kept_verbatim() {
        let raw = "http://localhost:8081/submodels/dXJuOmV4YW1wbGU6c206b3BzOjE/submodel-elements/pumpValue/$value";
        let target = PropertyTarget::parse(raw).unwrap();
        assert_eq!(target.as_str(), raw);
        assert_eq!(target.to_string(), raw);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = PropertyTarget::parse("ftp://repo/submodels/x/$value").unwrap_err();
        assert!(matches!(err, TargetError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn rejects_relative_url() {
        assert!(matches!(
            PropertyTarget::parse("/submodels/x/$value"),
            Err(TargetError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_empty_components() {
        assert!(PropertyTarget::new("http://repo", "", "pumpValue").is_err());
        assert!(PropertyTarget::new("http://repo", "urn:x", "").is_err());
    }
}
