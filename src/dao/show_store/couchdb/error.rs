//! Failures of the CouchDB show store.

use reqwest::StatusCode;
use thiserror::Error;

/// Result of a CouchDB store operation.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures talking to CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// A required environment variable is not set.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The database could not be probed or created.
    #[error("failed to reach CouchDB database `{database}`")]
    Database {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    /// Probing or creating the database returned an unexpected status.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        database: String,
        status: StatusCode,
    },
    /// The request never got an answer.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with an error status.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// The response body was not the expected JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A document in an `_all_docs` page did not match the expected shape.
    #[error("failed to deserialize CouchDB document `{doc_id}`")]
    DeserializeDocument {
        doc_id: String,
        #[source]
        source: serde_json::Error,
    },
}
