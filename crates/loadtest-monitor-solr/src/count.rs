//! Document count via `/select?q=*:*&rows=0`.

use crate::error::SolrCountError;
use async_trait::async_trait;
use loadtest_monitor::{CountSource, ReadError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound")]
    num_found: u64,
}

/// Extract `response.numFound` from a Solr select response body.
pub fn parse_num_found(body: &str) -> Result<u64, ReadError> {
    serde_json::from_str::<SelectResponse>(body)
        .map(|r| r.response.num_found)
        .map_err(|e| ReadError::Parse(format!("response.numFound: {e}")))
}

/// Count source backed by a Solr collection.
#[derive(Debug)]
pub struct SolrCount {
    client: Client,
    select_url: String,
    credentials: Option<(String, String)>,
    label: String,
}

impl SolrCount {
    /// `collection_url` is the collection base, e.g.
    /// `http://localhost:8983/solr/planes`.
    pub fn new(
        collection_url: &str,
        username: Option<String>,
        password: Option<String>,
        accept_invalid_certs: bool,
    ) -> Result<Self, SolrCountError> {
        let base = collection_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(SolrCountError::InvalidUrl(collection_url.to_string()));
        }

        let credentials = match (username, password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            (None, None) => None,
            _ => return Err(SolrCountError::PartialCredentials),
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            select_url: format!("{base}/select?q=*:*&wt=json&rows=0"),
            credentials,
            label: format!("solr {base}"),
        })
    }

    pub fn select_url(&self) -> &str {
        &self.select_url
    }
}

#[async_trait]
impl CountSource for SolrCount {
    fn name(&self) -> &str {
        &self.label
    }

    async fn read_count(&self) -> Result<u64, ReadError> {
        let mut request = self.client.get(&self.select_url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReadError::Request(format!("{}: {e}", self.select_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadError::Request(format!(
                "{} returned status {status}",
                self.select_url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReadError::Request(format!("{}: {e}", self.select_url)))?;
        tracing::trace!("Solr select response: {body}");

        parse_num_found(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_num_found() {
        let body = r#"{
            "responseHeader": {"status": 0, "QTime": 1, "params": {"q": "*:*", "rows": "0"}},
            "response": {"numFound": 123456, "start": 0, "docs": []}
        }"#;
        assert_eq!(parse_num_found(body).unwrap(), 123456);
    }

    #[test]
    fn test_parse_missing_field() {
        let body = r#"{"error": {"msg": "undefined collection", "code": 404}}"#;
        assert!(matches!(parse_num_found(body), Err(ReadError::Parse(_))));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_num_found("<html>busy</html>"),
            Err(ReadError::Parse(_))
        ));
    }

    #[test]
    fn test_select_url() {
        let count = SolrCount::new("http://localhost:8983/solr/planes/", None, None, false).unwrap();
        assert_eq!(
            count.select_url(),
            "http://localhost:8983/solr/planes/select?q=*:*&wt=json&rows=0"
        );
        assert_eq!(count.name(), "solr http://localhost:8983/solr/planes");
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            SolrCount::new("localhost:8983/solr/planes", None, None, false),
            Err(SolrCountError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_partial_credentials() {
        assert!(matches!(
            SolrCount::new("https://solr:8983/solr/planes", Some("admin".into()), None, false),
            Err(SolrCountError::PartialCredentials)
        ));
    }
}
