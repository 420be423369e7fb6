use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
};
use crate::dao::{
    models::{ExpertEntity, GameEntity, QuestionEntity, Record, RoundEntity, ViewerEntity},
    show_store::ShowStore,
    storage::{RecordKind, StorageResult},
};

const INDEXED_KINDS: [RecordKind; 5] = [
    RecordKind::Game,
    RecordKind::Round,
    RecordKind::Question,
    RecordKind::Viewer,
    RecordKind::Expert,
];

/// Entities that can live in a MongoDB collection.
trait MongoRecord: Record + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static {}

impl<T> MongoRecord for T where
    T: Record + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static
{
}

fn by_id(id: &str) -> Document {
    doc! { "id": id }
}

/// MongoDB-backed [`ShowStore`]; each record kind has its own collection keyed by `id`.
#[derive(Clone)]
pub struct MongoShowStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept so the driver's connection pool lives as long as the store.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.state.read().await.database.clone();
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoShowStore {
    /// Connect to MongoDB and ensure the `id` indexes exist.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self {
            inner: Arc::new(MongoInner {
                state: RwLock::new(MongoState { client, database }),
                config,
            }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        for kind in INDEXED_KINDS {
            let index = IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{}_id_idx", kind.label())))
                        .unique(Some(true))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(kind.collection())
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: kind.collection(),
                    source,
                })?;
        }
        Ok(())
    }

    async fn database(&self) -> Database {
        self.inner.state.read().await.database.clone()
    }

    async fn collection<T: MongoRecord>(&self) -> Collection<T> {
        self.database().await.collection::<T>(T::KIND.collection())
    }

    async fn upsert<T: MongoRecord>(&self, record: T) -> MongoResult<()> {
        let id = record.record_id().to_owned();
        self.collection::<T>()
            .await
            .replace_one(by_id(&id), &record)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                kind: T::KIND,
                id,
                source,
            })?;
        Ok(())
    }

    async fn find<T: MongoRecord>(&self, id: String) -> MongoResult<Option<T>> {
        self.collection::<T>()
            .await
            .find_one(by_id(&id))
            .await
            .map_err(|source| MongoDaoError::Load {
                kind: T::KIND,
                id,
                source,
            })
    }

    async fn list<T: MongoRecord>(&self, filter: Document) -> MongoResult<Vec<T>> {
        let list_error = |source: mongodb::error::Error| MongoDaoError::List {
            kind: T::KIND,
            source,
        };
        self.collection::<T>()
            .await
            .find(filter)
            .await
            .map_err(list_error)?
            .try_collect()
            .await
            .map_err(list_error)
    }

    async fn delete<T: MongoRecord>(&self, id: String) -> MongoResult<bool> {
        let result = self
            .collection::<T>()
            .await
            .delete_one(by_id(&id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                kind: T::KIND,
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }
}

impl ShowStore for MongoShowStore {
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
        Box::pin(async move { store.list(doc! {}).await.map_err(Into::into) })
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
        let filter = match game_id {
            Some(game_id) => doc! { "game_id": game_id },
            None => doc! {},
        };
        Box::pin(async move { store.list(filter).await.map_err(Into::into) })
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
        Box::pin(async move { store.list(doc! {}).await.map_err(Into::into) })
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
        Box::pin(async move { store.list(doc! {}).await.map_err(Into::into) })
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
        Box::pin(async move { store.list(doc! {}).await.map_err(Into::into) })
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
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
