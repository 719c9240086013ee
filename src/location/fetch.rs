//! Living wage page retrieval.

use super::types::{FetchError, LocationKind};
use crate::document::HtmlDocument;
use chrono::Utc;
use std::time::{Duration, Instant};

pub const DEFAULT_BASE_URL: &str = "https://livingwage.mit.edu";

const USER_AGENT: &str =
    "COL-Compare-Tool/0.3 (cost-of-living research; respects 10-location fair-use policy)";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Canonical page URL for a location, e.g. `{base}/counties/06075`.
pub fn location_url(base: &str, kind: LocationKind, code: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), kind.path_segment(), code)
}

/// Fetch a page and parse it into a document.
pub fn fetch_document(url: &str) -> Result<HtmlDocument, FetchError> {
    let start = Instant::now();

    let response = ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .timeout(TIMEOUT)
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(code, _) => {
                log_request(url, &code.to_string(), start);
                FetchError::Status { url: url.to_string(), code }
            }
            ureq::Error::Transport(t) => {
                log_request(url, "failed", start);
                FetchError::Transport { url: url.to_string(), message: t.to_string() }
            }
        })?;

    let status = response.status();
    let body = response
        .into_string()
        .map_err(|e| FetchError::Body { url: url.to_string(), source: e })?;
    log_request(url, &status.to_string(), start);

    Ok(HtmlDocument::parse(&body))
}

fn log_request(url: &str, outcome: &str, start: Instant) {
    eprintln!(
        "[{}] GET {} -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        url,
        outcome,
        start.elapsed().as_secs_f64() * 1000.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_url() {
        assert_eq!(
            location_url(DEFAULT_BASE_URL, LocationKind::Metro, "35620"),
            "https://livingwage.mit.edu/metros/35620"
        );
        assert_eq!(
            location_url("http://localhost:8080/", LocationKind::County, "06075"),
            "http://localhost:8080/counties/06075"
        );
        assert_eq!(
            location_url(DEFAULT_BASE_URL, LocationKind::State, "06"),
            "https://livingwage.mit.edu/states/06"
        );
    }

    #[test]
    fn test_fetch_unreachable_host() {
        // Port 9 on localhost is the discard port and normally closed.
        let err = fetch_document("http://127.0.0.1:9/metros/1").unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
