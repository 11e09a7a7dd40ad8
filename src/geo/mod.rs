//! Geocoding through the write-once cache
//!
//! Institution names are resolved to coordinates with a text-search
//! geocoder. Raw responses are cached under the full lookup URL, so an
//! institution is looked up over the network at most once. Replies whose
//! status is anything but `OK` or `ZERO_RESULTS` (quota, denied key) are
//! never cached and are retried on the next build. Only the first
//! candidate of a response is consulted; ambiguous names are not
//! disambiguated.

use crate::cache::CacheTable;
use crate::config::GeocoderConfig;
use crate::crawler::Fetcher;
use crate::ScoutError;
use serde::Deserialize;
use std::sync::Arc;

/// A resolved latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    #[serde(default)]
    status: Option<String>,
}

/// Statuses that describe the lookup itself rather than a refused request
const CACHEABLE_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

#[derive(Debug, Deserialize)]
struct PlaceResult {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

/// Resolves institution names to coordinates
pub struct GeoResolver {
    fetcher: Arc<Fetcher>,
    endpoint: String,
    api_key: String,
}

impl GeoResolver {
    pub fn new(fetcher: Arc<Fetcher>, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(fetcher: Arc<Fetcher>, config: &GeocoderConfig) -> Self {
        Self::new(fetcher, config.endpoint.clone(), config.api_key.clone())
    }

    /// Builds the full lookup URL used as the cache key
    pub fn lookup_url(&self, institution_name: &str) -> String {
        let separator = if self.endpoint.ends_with('?') || self.endpoint.ends_with('&') {
            ""
        } else if self.endpoint.contains('?') {
            "&"
        } else {
            "?"
        };

        format!(
            "{}{}input={}&inputtype=textquery&fields=location,name&key={}",
            self.endpoint,
            separator,
            lookup_query(institution_name),
            self.api_key
        )
    }

    /// Resolves a name to coordinates
    ///
    /// Returns `Ok(None)` when the geocoder has no candidate or the first
    /// candidate lacks coordinates. Transport failures and refused lookups
    /// propagate without touching the cache.
    pub async fn resolve(&self, institution_name: &str) -> Result<Option<Coordinates>, ScoutError> {
        let url = self.lookup_url(institution_name);
        let body = self
            .fetcher
            .fetch_validated(CacheTable::Geocodes, &url, |body| check_status(&url, body))
            .await?;
        let coordinates = parse_first_result(&body)?;

        if coordinates.is_none() {
            tracing::debug!("No coordinates for {}", institution_name);
        }
        Ok(coordinates)
    }
}

/// Turns an institution name into a text-search query
///
/// `--`, `-` and spaces all become `+`; anything else outside the
/// unreserved set is percent-encoded.
///
/// ```
/// use college_scout::geo::lookup_query;
///
/// assert_eq!(lookup_query("Michigan State University"), "Michigan+State+University");
/// assert_eq!(lookup_query("Indiana University--Bloomington"), "Indiana+University+Bloomington");
/// ```
pub fn lookup_query(institution_name: &str) -> String {
    institution_name
        .replace("--", "+")
        .replace('-', "+")
        .replace(' ', "+")
        .split('+')
        .map(|part| url::form_urlencoded::byte_serialize(part.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join("+")
}

/// Rejects a response the geocoder refused to answer
///
/// A missing status is accepted. A body that is not JSON is left for
/// [`parse_first_result`] to report.
pub fn check_status(url: &str, body: &str) -> Result<(), ScoutError> {
    let Ok(response) = serde_json::from_str::<TextSearchResponse>(body) else {
        return Ok(());
    };

    match response.status {
        Some(status) if !CACHEABLE_STATUSES.contains(&status.as_str()) => {
            Err(ScoutError::Geocoder {
                url: url.to_string(),
                status,
            })
        }
        _ => Ok(()),
    }
}

/// Reads the coordinates of the first candidate in a raw response
pub fn parse_first_result(body: &str) -> Result<Option<Coordinates>, ScoutError> {
    let response: TextSearchResponse = serde_json::from_str(body)?;

    let coordinates = response
        .results
        .into_iter()
        .next()
        .and_then(|first| first.geometry)
        .and_then(|geometry| geometry.location)
        .and_then(|location| match (location.lat, location.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        });

    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PageCache;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MSU: &str = r#"{
        "results": [
            {"name": "Michigan State University",
             "geometry": {"location": {"lat": 42.701848, "lng": -84.4821719}}},
            {"name": "Michigan State University Detroit",
             "geometry": {"location": {"lat": 42.33, "lng": -83.04}}}
        ],
        "status": "OK"
    }"#;

    fn resolver(endpoint: &str) -> GeoResolver {
        let cache = Arc::new(PageCache::open_in_memory().unwrap());
        let fetcher = Arc::new(Fetcher::new(reqwest::Client::new(), cache));
        GeoResolver::new(fetcher, endpoint, "test-key")
    }

    #[test]
    fn test_lookup_query_separators() {
        assert_eq!(lookup_query("Harvard College"), "Harvard+College");
        assert_eq!(lookup_query("a--b-c d"), "a+b+c+d");
        assert_eq!(lookup_query("William & Mary"), "William+%26+Mary");
    }

    #[test]
    fn test_lookup_url() {
        let resolver = resolver("https://maps.example.com/textsearch/json");
        assert_eq!(
            resolver.lookup_url("Harvard College"),
            "https://maps.example.com/textsearch/json?input=Harvard+College&inputtype=textquery&fields=location,name&key=test-key"
        );
    }

    #[test]
    fn test_parse_first_result_only() {
        let coordinates = parse_first_result(MSU).unwrap().unwrap();
        assert!((coordinates.lat - 42.701848).abs() < 1e-6);
        assert!((coordinates.lng - (-84.4821719)).abs() < 1e-6);
    }

    #[test]
    fn test_parse_empty_results() {
        assert_eq!(parse_first_result(r#"{"results": []}"#).unwrap(), None);
        assert_eq!(parse_first_result(r#"{"status": "ZERO_RESULTS"}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_missing_coordinates() {
        let body = r#"{"results": [{"name": "Somewhere", "geometry": {}}]}"#;
        assert_eq!(parse_first_result(body).unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_first_result("<html>quota exceeded</html>"),
            Err(ScoutError::Json(_))
        ));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("u", MSU).is_ok());
        assert!(check_status("u", r#"{"results": [], "status": "ZERO_RESULTS"}"#).is_ok());
        assert!(check_status("u", r#"{"results": []}"#).is_ok());
        assert!(matches!(
            check_status("u", r#"{"results": [], "status": "REQUEST_DENIED"}"#),
            Err(ScoutError::Geocoder { status, .. }) if status == "REQUEST_DENIED"
        ));
    }

    #[tokio::test]
    async fn test_refused_lookup_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/textsearch/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"results": [], "status": "OVER_QUERY_LIMIT"}"#),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/textsearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MSU))
            .mount(&server)
            .await;

        let resolver = resolver(&format!("{}/textsearch/json", server.uri()));
        let key = resolver.lookup_url("Michigan State University");

        let refused = resolver.resolve("Michigan State University").await;
        assert!(matches!(
            refused,
            Err(ScoutError::Geocoder { ref status, .. }) if status == "OVER_QUERY_LIMIT"
        ));
        assert!(!resolver
            .fetcher
            .cache()
            .contains(CacheTable::Geocodes, &key)
            .unwrap());

        let retried = resolver.resolve("Michigan State University").await.unwrap();
        assert!(retried.is_some());
        assert!(resolver
            .fetcher
            .cache()
            .contains(CacheTable::Geocodes, &key)
            .unwrap());
    }

    #[tokio::test]
    async fn test_resolve_caches_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/textsearch/json"))
            .and(query_param("input", "Michigan State University"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MSU))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver(&format!("{}/textsearch/json", server.uri()));

        let first = resolver.resolve("Michigan State University").await.unwrap();
        let second = resolver.resolve("Michigan State University").await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_some());

        let key = resolver.lookup_url("Michigan State University");
        assert!(resolver
            .fetcher
            .cache()
            .contains(CacheTable::Geocodes, &key)
            .unwrap());
    }
}
