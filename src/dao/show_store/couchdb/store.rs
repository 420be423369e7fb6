use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::dao::{
    models::{ExpertEntity, GameEntity, QuestionEntity, Record, RoundEntity, ViewerEntity},
    show_store::ShowStore,
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{AllDocsResponse, CouchDocument, END_SUFFIX, RevisionOnly, doc_id, kind_prefix},
};

const ALL_DOCS: &str = "_all_docs";

/// Entities that can be stored as CouchDB documents.
trait CouchRecord: Record + Serialize + DeserializeOwned + Send + 'static {}

impl<T> CouchRecord for T where T: Record + Serialize + DeserializeOwned + Send + 'static {}

/// CouchDB-backed [`ShowStore`]; every record is a document named `<kind>::<id>`.
#[derive(Clone)]
pub struct CouchShowStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<Arc<(String, String)>>,
}

impl CouchShowStore {
    /// Build the HTTP client and make sure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            database: Arc::from(config.database),
            auth: config.credentials.map(Arc::new),
        };
        store.ensure_database().await?;
        Ok(store)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth.as_deref() {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.authorize(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();
        let database_error = |source: reqwest::Error| CouchDaoError::Database {
            database: database.clone(),
            source,
        };

        let probe = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(database_error)?;

        let status = match probe.status() {
            StatusCode::NOT_FOUND => self
                .authorize(self.client.put(&url))
                .send()
                .await
                .map_err(database_error)?
                .status(),
            other => other,
        };

        if status.is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::DatabaseStatus { database, status })
        }
    }

    async fn get_document<T: DeserializeOwned>(&self, path: &str) -> CouchResult<Option<T>> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response.json::<T>().await.map(Some).map_err(
                |source| CouchDaoError::DecodeResponse {
                    path: path.to_owned(),
                    source,
                },
            ),
            status => Err(CouchDaoError::RequestStatus {
                path: path.to_owned(),
                status,
            }),
        }
    }

    async fn current_rev(&self, path: &str) -> CouchResult<Option<String>> {
        Ok(self
            .get_document::<RevisionOnly>(path)
            .await?
            .map(|doc| doc.rev))
    }

    async fn upsert<T: CouchRecord>(&self, record: T) -> CouchResult<()> {
        let path = doc_id(T::KIND, record.record_id());
        let document = CouchDocument {
            rev: self.current_rev(&path).await?,
            doc_id: path.clone(),
            body: record,
        };

        let response = self
            .request(Method::PUT, &path)
            .json(&document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path,
                status: response.status(),
            })
        }
    }

    async fn find<T: CouchRecord>(&self, id: String) -> CouchResult<Option<T>> {
        let path = doc_id(T::KIND, &id);
        Ok(self
            .get_document::<CouchDocument<T>>(&path)
            .await?
            .map(|doc| doc.body))
    }

    async fn list<T: CouchRecord>(&self) -> CouchResult<Vec<T>> {
        let prefix = kind_prefix(T::KIND);
        let query = [
            ("include_docs", "true".to_owned()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_owned(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_owned(),
                status: response.status(),
            });
        }

        let page = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_owned(),
                source,
            }
        })?;

        page.rows
            .into_iter()
            .filter_map(|row| row.doc.map(|doc| (row.id, doc)))
            .map(|(doc_id, doc)| {
                serde_json::from_value::<CouchDocument<T>>(doc)
                    .map(|document| document.body)
                    .map_err(|source| CouchDaoError::DeserializeDocument { doc_id, source })
            })
            .collect()
    }

    async fn delete<T: CouchRecord>(&self, id: String) -> CouchResult<bool> {
        let path = doc_id(T::KIND, &id);
        let Some(rev) = self.current_rev(&path).await? else {
            return Ok(false);
        };

        let response = self
            .request(Method::DELETE, &path)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(CouchDaoError::RequestStatus { path, status }),
        }
    }

    async fn ping(&self) -> CouchResult<()> {
        let url = self.database_url();
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: url.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: url,
                status: response.status(),
            })
        }
    }

    /// Rounds of one game are filtered client-side after the prefix scan.
    async fn list_rounds_of(&self, game_id: Option<String>) -> CouchResult<Vec<RoundEntity>> {
        let rounds = self.list::<RoundEntity>().await?;
        Ok(match game_id {
            Some(game_id) => rounds
                .into_iter()
                .filter(|round| round.game_id == game_id)
                .collect(),
            None => rounds,
        })
    }
}

impl ShowStore for CouchShowStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list().await.map_err(Into::into) })
    }

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(round).await.map_err(Into::into) })
    }

    fn find_round(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RoundEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn list_rounds(
        &self,
        game_id: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_rounds_of(game_id).await.map_err(Into::into) })
    }

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(question).await.map_err(Into::into) })
    }

    fn find_question(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list().await.map_err(Into::into) })
    }

    fn save_viewer(&self, viewer: ViewerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(viewer).await.map_err(Into::into) })
    }

    fn find_viewer(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ViewerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn list_viewers(&self) -> BoxFuture<'static, StorageResult<Vec<ViewerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list().await.map_err(Into::into) })
    }

    fn delete_viewer(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete::<ViewerEntity>(id)
                .await
                .map_err(Into::into)
        })
    }

    fn save_expert(&self, expert: ExpertEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(expert).await.map_err(Into::into) })
    }

    fn find_expert(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ExpertEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn list_experts(&self) -> BoxFuture<'static, StorageResult<Vec<ExpertEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list().await.map_err(Into::into) })
    }

    fn delete_expert(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete::<ExpertEntity>(id)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
