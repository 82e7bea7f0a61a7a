//! Collection API client.
//!
//! The pipeline talks to the museum through the [`CollectionApi`] trait so
//! every stage can be exercised against a mock. The production implementation
//! is [`MetApi`], a blocking `reqwest` client: the pipeline is strictly
//! sequential, so each call blocks until the response (or an error) arrives.
//!
//! ## Endpoints
//!
//! | Call | Request | Response |
//! |---|---|---|
//! | [`search`](CollectionApi::search) | `GET {search_url}?q=..&geoLocation=..&hasImages=true` | `{"total": n, "objectIDs": [..] \| null}` |
//! | [`object`](CollectionApi::object) | `GET {object_url}/{id}` | object JSON (`primaryImage`, `isPublicDomain`, `title`, ...) |
//! | [`download`](CollectionApi::download) | `GET {image url}` | raw bytes |
//!
//! Any status other than 200 is an [`ApiError::Status`]. Nothing is retried.

use crate::config::ApiConfig;
use crate::types::{ObjectId, ObjectRecord};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters of one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text keyword.
    pub text: String,
    /// Also send `text` as the `geoLocation` filter.
    pub geo_location: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, geo_location: bool) -> Self {
        Self {
            text: text.into(),
            geo_location,
        }
    }

    /// Query-string pairs in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("q", self.text.as_str())];
        if self.geo_location {
            params.push(("geoLocation", self.text.as_str()));
        }
        params.push(("hasImages", "true"));
        params
    }
}

/// The three calls the pipeline makes against a collection.
pub trait CollectionApi {
    /// Object identifiers matching the query; empty when there are none.
    fn search(&self, query: &SearchQuery) -> Result<Vec<ObjectId>, ApiError>;

    /// Detail record for one object.
    fn object(&self, id: ObjectId) -> Result<ObjectRecord, ApiError>;

    /// Raw bytes behind an image URL.
    fn download(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

/// Wire format of the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "objectIDs", default)]
    object_ids: Option<Vec<ObjectId>>,
}

/// Wire format of the object endpoint (only the fields we read).
#[derive(Debug, Deserialize)]
struct ObjectResponse {
    #[serde(rename = "primaryImage", default)]
    primary_image: Option<String>,
    #[serde(rename = "isPublicDomain", default)]
    is_public_domain: Option<bool>,
    #[serde(default)]
    title: Option<String>,
}

/// Parse a search body. A missing or `null` `objectIDs` is an empty result.
pub(crate) fn parse_search(body: &[u8]) -> Result<Vec<ObjectId>, ApiError> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response.object_ids.unwrap_or_default())
}

/// Parse an object body into a record for `id`.
pub(crate) fn parse_object(id: ObjectId, body: &[u8]) -> Result<ObjectRecord, ApiError> {
    let response: ObjectResponse = serde_json::from_slice(body)?;
    Ok(ObjectRecord {
        id,
        primary_image: response.primary_image.filter(|url| !url.trim().is_empty()),
        is_public_domain: response.is_public_domain,
        title: response.title.filter(|t| !t.trim().is_empty()),
    })
}

/// Blocking client for the Metropolitan Museum of Art Collection API
/// (or any service with the same endpoints).
#[derive(Debug, Clone)]
pub struct MetApi {
    client: Client,
    search_url: String,
    object_url: String,
}

impl MetApi {
    /// Build a client from the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .build()?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            object_url: config.object_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_endpoint(&self, id: ObjectId) -> String {
        format!("{}/{}", self.object_url, id)
    }

    /// GET `url`, failing on any status other than 200.
    fn get_bytes(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<u8>, ApiError> {
        let started = Instant::now();
        let response = self.client.get(url).query(params).send()?;
        let status = response.status().as_u16();
        tracing::debug!(
            "GET {} -> {} ({} ms)",
            response.url(),
            status,
            started.elapsed().as_millis()
        );

        if status != 200 {
            return Err(ApiError::Status(status));
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl CollectionApi for MetApi {
    fn search(&self, query: &SearchQuery) -> Result<Vec<ObjectId>, ApiError> {
        let body = self.get_bytes(&self.search_url, &query.params())?;
        parse_search(&body)
    }

    fn object(&self, id: ObjectId) -> Result<ObjectRecord, ApiError> {
        let body = self.get_bytes(&self.object_endpoint(id), &[])?;
        parse_object(id, &body)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let bytes = self.get_bytes(url, &[])?;
        tracing::trace!("downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory collection that records every call it receives.
    ///
    /// Unknown objects and image URLs answer 404.
    #[derive(Default)]
    pub struct MockApi {
        pub search_result: Option<Result<Vec<ObjectId>, u16>>,
        pub objects: HashMap<ObjectId, Result<ObjectRecord, u16>>,
        pub images: HashMap<String, Result<Vec<u8>, u16>>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        Search(SearchQuery),
        Object(ObjectId),
        Download(String),
    }

    impl MockApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_search(mut self, ids: Vec<ObjectId>) -> Self {
            self.search_result = Some(Ok(ids));
            self
        }

        pub fn with_search_status(mut self, status: u16) -> Self {
            self.search_result = Some(Err(status));
            self
        }

        /// Object with a primary image (public domain).
        pub fn with_object(mut self, id: ObjectId, url: &str) -> Self {
            self.objects.insert(
                id,
                Ok(ObjectRecord {
                    id,
                    primary_image: Some(url.to_string()),
                    is_public_domain: Some(true),
                    title: None,
                }),
            );
            self
        }

        pub fn with_record(mut self, record: ObjectRecord) -> Self {
            self.objects.insert(record.id, Ok(record));
            self
        }

        pub fn with_object_status(mut self, id: ObjectId, status: u16) -> Self {
            self.objects.insert(id, Err(status));
            self
        }

        pub fn with_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
            self.images.insert(url.to_string(), Ok(bytes));
            self
        }

        pub fn with_image_status(mut self, url: &str, status: u16) -> Self {
            self.images.insert(url.to_string(), Err(status));
            self
        }

        pub fn get_calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CollectionApi for MockApi {
        fn search(&self, query: &SearchQuery) -> Result<Vec<ObjectId>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(RecordedCall::Search(query.clone()));
            match &self.search_result {
                Some(Ok(ids)) => Ok(ids.clone()),
                Some(Err(status)) => Err(ApiError::Status(*status)),
                None => Ok(Vec::new()),
            }
        }

        fn object(&self, id: ObjectId) -> Result<ObjectRecord, ApiError> {
            self.calls.lock().unwrap().push(RecordedCall::Object(id));
            match self.objects.get(&id) {
                Some(Ok(record)) => Ok(record.clone()),
                Some(Err(status)) => Err(ApiError::Status(*status)),
                None => Err(ApiError::Status(404)),
            }
        }

        fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(RecordedCall::Download(url.to_string()));
            match self.images.get(url) {
                Some(Ok(bytes)) => Ok(bytes.clone()),
                Some(Err(status)) => Err(ApiError::Status(*status)),
                None => Err(ApiError::Status(404)),
            }
        }
    }

    // =========================================================================
    // Wire parsing
    // =========================================================================

    #[test]
    fn parse_search_with_ids() {
        let ids = parse_search(br#"{"total": 3, "objectIDs": [436535, 1, 2]}"#).unwrap();
        assert_eq!(ids, vec![436535, 1, 2]);
    }

    #[test]
    fn parse_search_null_ids_is_empty() {
        assert!(parse_search(br#"{"total": 0, "objectIDs": null}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_search_missing_ids_is_empty() {
        assert!(parse_search(br#"{"total": 0}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_search_invalid_json() {
        assert!(matches!(parse_search(b"<html>"), Err(ApiError::Json(_))));
    }

    #[test]
    fn parse_object_full_record() {
        let body = br#"{
            "objectID": 436535,
            "isPublicDomain": true,
            "primaryImage": "https://images.metmuseum.org/CRDImages/ep/original/DT1567.jpg",
            "title": "Wheat Field with Cypresses",
            "department": "European Paintings"
        }"#;
        let record = parse_object(436535, body).unwrap();
        assert_eq!(record.id, 436535);
        assert_eq!(record.is_public_domain, Some(true));
        assert_eq!(
            record.primary_image.as_deref(),
            Some("https://images.metmuseum.org/CRDImages/ep/original/DT1567.jpg")
        );
        assert_eq!(record.title.as_deref(), Some("Wheat Field with Cypresses"));
    }

    #[test]
    fn parse_object_empty_primary_image_is_none() {
        let record = parse_object(9, br#"{"primaryImage": "", "isPublicDomain": false}"#).unwrap();
        assert_eq!(record.primary_image, None);
        assert_eq!(record.is_public_domain, Some(false));
    }

    #[test]
    fn parse_object_missing_fields() {
        let record = parse_object(9, br#"{}"#).unwrap();
        assert_eq!(record.primary_image, None);
        assert_eq!(record.is_public_domain, None);
        assert_eq!(record.title, None);
    }

    // =========================================================================
    // SearchQuery
    // =========================================================================

    #[test]
    fn search_params_with_geo_location() {
        let query = SearchQuery::new("Spain", true);
        assert_eq!(
            query.params(),
            vec![("q", "Spain"), ("geoLocation", "Spain"), ("hasImages", "true")]
        );
    }

    #[test]
    fn search_params_without_geo_location() {
        let query = SearchQuery::new("Spain", false);
        assert_eq!(query.params(), vec![("q", "Spain"), ("hasImages", "true")]);
    }

    #[test]
    fn met_api_joins_object_url() {
        let config = ApiConfig {
            object_url: "https://example.org/objects/".to_string(),
            ..ApiConfig::default()
        };
        let api = MetApi::new(&config).unwrap();
        assert_eq!(api.object_endpoint(42), "https://example.org/objects/42");
    }

    #[test]
    fn mock_records_calls() {
        let api = MockApi::new()
            .with_search(vec![1])
            .with_object(1, "https://img/1.jpg");

        api.search(&SearchQuery::new("x", false)).unwrap();
        api.object(1).unwrap();
        assert!(matches!(api.object(2), Err(ApiError::Status(404))));
        assert!(matches!(api.download("https://img/1.jpg"), Err(ApiError::Status(404))));

        assert_eq!(
            api.get_calls(),
            vec![
                RecordedCall::Search(SearchQuery::new("x", false)),
                RecordedCall::Object(1),
                RecordedCall::Object(2),
                RecordedCall::Download("https://img/1.jpg".to_string()),
            ]
        );
    }
}
