use serde::{Deserialize, Serialize};


/// Returned when the run options contradict each other.
pub const BAD_ARGUMENTS: &str = "bad arguments";

/// Returned when the engine ran but announced no results path.
pub const OK_MARKER: &str = "ok";

/// Returned when a results path was announced but could not be read.
pub const ERROR_MARKER: &str = "error";


/// One conformance run, as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub url: String,
    pub gtld_registrar: bool,
    pub gtld_registry: bool,
    pub thin: bool,
}

impl RunRequest {
    /// A request against `url` with every optional check switched off.
    pub fn new(url: &str) -> Self {
        RunRequest {
            url: url.to_string(),
            gtld_registrar: false,
            gtld_registry: false,
            thin: false,
        }
    }
}


/// Query parameters accepted by `POST /check`.
///
/// The flag names keep the `gltd` spelling deployed clients send; the
/// corrected `gtld` spelling is accepted as an alias. A flag counts as set
/// only when its value is exactly `"1"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckParams {
    pub url: Option<String>,
    #[serde(rename = "gltdRegistrar", alias = "gtldRegistrar")]
    pub gltd_registrar: Option<String>,
    #[serde(rename = "gltdRegistry", alias = "gtldRegistry")]
    pub gltd_registry: Option<String>,
    pub thin: Option<String>,
}

impl CheckParams {
    /// Convert into a `RunRequest`. Returns `None` when `url` is missing.
    pub fn into_request(self) -> Option<RunRequest> {
        let url = self.url?;
        Some(RunRequest {
            url,
            gtld_registrar: flag_set(&self.gltd_registrar),
            gtld_registry: flag_set(&self.gltd_registry),
            thin: flag_set(&self.thin),
        })
    }
}

fn flag_set(value: &Option<String>) -> bool {
    value.as_deref() == Some("1")
}


/// The single-field mapping returned for every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub data: String,
}

impl RunOutcome {
    pub fn new(data: impl Into<String>) -> Self {
        RunOutcome { data: data.into() }
    }

    pub fn ok() -> Self {
        Self::new(OK_MARKER)
    }

    pub fn error() -> Self {
        Self::new(ERROR_MARKER)
    }

    pub fn bad_arguments() -> Self {
        Self::new(BAD_ARGUMENTS)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &[(&str, &str)]) -> CheckParams {
        let value = serde_json::Value::Object(
            query
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
        );
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flags_require_exact_one() {
        let req = params(&[
            ("url", "https://rdap.example/domain/example.com"),
            ("gltdRegistrar", "true"),
            ("gltdRegistry", "1"),
            ("thin", "yes"),
        ])
        .into_request()
        .unwrap();
        assert!(!req.gtld_registrar);
        assert!(req.gtld_registry);
        assert!(!req.thin);
    }

    #[test]
    fn corrected_spelling_is_accepted() {
        let req = params(&[("url", "https://rdap.example"), ("gtldRegistrar", "1")])
            .into_request()
            .unwrap();
        assert!(req.gtld_registrar);
    }

    #[test]
    fn missing_url_yields_none() {
        assert!(params(&[("thin", "1")]).into_request().is_none());
    }

    #[test]
    fn outcome_serializes_as_single_key() {
        let json = serde_json::to_string(&RunOutcome::ok()).unwrap();
        assert_eq!(json, r#"{"data":"ok"}"#);
    }
}
