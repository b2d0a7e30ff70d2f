//! Error types for the Solr adapter.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolrCountError {
    /// The collection URL is missing or not an http(s) URL.
    #[error("Invalid Solr URL '{0}': expected http(s)://host:port/solr/<collection>")]
    InvalidUrl(String),

    /// Username given without a password or the other way around.
    #[error("Solr username and password must be given together")]
    PartialCredentials,

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
