use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::storage::RecordKind;

/// Result of a MongoDB store operation.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures talking to MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// A required environment variable is not set.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    /// The driver rejected the client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The server never answered a ping while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A periodic health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// The unique id index could not be created.
    #[error("failed to ensure id index on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    /// An upsert failed.
    #[error("failed to save {kind} `{id}`")]
    Save {
        kind: RecordKind,
        id: String,
        #[source]
        source: MongoError,
    },
    /// A lookup by id failed.
    #[error("failed to load {kind} `{id}`")]
    Load {
        kind: RecordKind,
        id: String,
        #[source]
        source: MongoError,
    },
    /// Reading a collection failed.
    #[error("failed to list {}", kind.collection())]
    List {
        kind: RecordKind,
        #[source]
        source: MongoError,
    },
    /// A delete by id failed.
    #[error("failed to delete {kind} `{id}`")]
    Delete {
        kind: RecordKind,
        id: String,
        #[source]
        source: MongoError,
    },
}
