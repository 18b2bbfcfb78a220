//! Row source boundary: local fixture files and HTTP endpoints.

use std::path::PathBuf;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::Value;

use crate::rows::Row;

/// Where a view's rows come from. Classified by string parsing only, no
/// filesystem calls; the grid is agnostic to which variant produced its rows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RowSource {
    Local(PathBuf),
    Http(String),
}

impl RowSource {
    /// Classify a locator as an HTTP/HTTPS endpoint or a local path.
    pub fn parse(locator: &str) -> RowSource {
        if let Some(i) = locator.find("://") {
            let scheme = locator[..i].to_lowercase();
            if scheme == "http" || scheme == "https" {
                return RowSource::Http(locator.to_string());
            }
        }
        RowSource::Local(PathBuf::from(locator))
    }

    /// Short description for the header line.
    pub fn describe(&self) -> String {
        match self {
            RowSource::Local(path) => path.display().to_string(),
            RowSource::Http(url) => url.clone(),
        }
    }

    /// Load and parse this source's rows. Each load is a full snapshot; the
    /// caller replaces its dataset wholesale.
    pub fn load_rows(&self, timeout_secs: u64) -> Result<Vec<Row>> {
        let body = self.fetch(timeout_secs)?;
        parse_rows(&body)
    }

    #[cfg(feature = "http")]
    fn fetch(&self, timeout_secs: u64) -> Result<String> {
        match self {
            RowSource::Local(path) => std::fs::read_to_string(path)
                .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e)),
            RowSource::Http(url) => {
                let agent = ureq::AgentBuilder::new()
                    .timeout(std::time::Duration::from_secs(timeout_secs))
                    .build();
                let body = agent
                    .get(url)
                    .call()
                    .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
                    .into_string()?;
                Ok(body)
            }
        }
    }

    #[cfg(not(feature = "http"))]
    fn fetch(&self, _timeout_secs: u64) -> Result<String> {
        match self {
            RowSource::Local(path) => std::fs::read_to_string(path)
                .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e)),
            RowSource::Http(url) => Err(eyre!(
                "{} is an HTTP source, but trakui was built without the http feature",
                url
            )),
        }
    }
}

/// Parse a response body into rows. Accepts a bare JSON array of records or
/// an object carrying the array under `data` (the order API wraps its payload
/// in a `{source, data}` envelope). Non-object elements are skipped.
pub(crate) fn parse_rows(body: &str) -> Result<Vec<Row>> {
    let value: Value = serde_json::from_str(body).map_err(|e| eyre!("Invalid JSON: {}", e))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(eyre!(
                    "Expected a JSON array of records or a {{\"data\": [...]}} envelope"
                ))
            }
        },
        _ => {
            return Err(eyre!(
                "Expected a JSON array of records or a {{\"data\": [...]}} envelope"
            ))
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect())
}
