//! Qdrant binding for the vector-store contract.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, ScoredPoint,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder, value::Kind,
};
use uuid::Uuid;

use crate::{ScoredRecord, StoreError, VectorRecord, VectorStore};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Namespace for deterministic uuid-v5 point ids derived from document ids.
/// Qdrant only accepts uuid or integer point ids, so the document id itself
/// travels in the payload under [`DOC_ID_FIELD`].
const POINT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x8f, 0x2a, 0x51, 0x0c, 0x3e, 0x7d, 0x4b, 0x96, 0xb1, 0x04, 0x5d, 0xe9, 0x27, 0x61, 0x88, 0x43,
]);

const DOC_ID_FIELD: &str = "doc_id";
const DOCUMENT_FIELD: &str = "document";

/// Qdrant-backed store; collections are created with cosine distance.
#[derive(Clone)]
pub struct QdrantStore {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore").finish_non_exhaustive()
    }
}

impl QdrantStore {
    /// Connect to a Qdrant instance at the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    fn point_id(doc_id: &str) -> String {
        Uuid::new_v5(&POINT_NAMESPACE, doc_id.as_bytes()).to_string()
    }

    fn record_to_point(record: VectorRecord) -> Result<PointStruct, StoreError> {
        let mut payload = serde_json::Map::with_capacity(record.metadata.len() + 2);
        payload.insert(
            DOC_ID_FIELD.into(),
            serde_json::Value::String(record.id.clone()),
        );
        payload.insert(
            DOCUMENT_FIELD.into(),
            serde_json::Value::String(record.text),
        );
        for (k, v) in record.metadata {
            payload.insert(k, v);
        }
        let payload: HashMap<String, qdrant_client::qdrant::Value> =
            serde_json::from_value(serde_json::Value::Object(payload))
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(PointStruct::new(
            Self::point_id(&record.id),
            record.vector,
            payload,
        ))
    }
}

fn scored_point_to_record(point: ScoredPoint) -> ScoredRecord {
    let mut metadata: HashMap<String, serde_json::Value> = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| {
            let json_val = match v.kind? {
                Kind::StringValue(s) => serde_json::Value::String(s),
                Kind::IntegerValue(i) => serde_json::Value::Number(i.into()),
                Kind::DoubleValue(d) => {
                    serde_json::Number::from_f64(d).map(serde_json::Value::Number)?
                }
                Kind::BoolValue(b) => serde_json::Value::Bool(b),
                _ => return None,
            };
            Some((k, json_val))
        })
        .collect();

    let id = metadata
        .remove(DOC_ID_FIELD)
        .and_then(|v| v.as_str().map(ToOwned::to_owned))
        .unwrap_or_default();
    let text = metadata
        .remove(DOCUMENT_FIELD)
        .and_then(|v| v.as_str().map(ToOwned::to_owned))
        .unwrap_or_default();

    // Qdrant reports cosine *similarity*; the contract speaks in distance.
    ScoredRecord {
        id,
        text,
        metadata,
        distance: 1.0 - point.score,
    }
}

impl VectorStore for QdrantStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            if self
                .client
                .collection_exists(&collection)
                .await
                .map_err(|e| StoreError::Collection(e.to_string()))?
            {
                return Ok(());
            }
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&collection)
                        .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
                )
                .await
                .map_err(|e| StoreError::Collection(e.to_string()))?;
            tracing::info!(
                collection = %collection,
                dimensions = vector_size,
                "created Qdrant collection"
            );
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.client
                .collection_exists(&collection)
                .await
                .map_err(|e| StoreError::Collection(e.to_string()))
        })
    }

    fn upsert(
        &self,
        collection: &str,
        records: Vec<VectorRecord>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let points: Vec<PointStruct> = records
                .into_iter()
                .map(Self::record_to_point)
                .collect::<Result<_, _>>()?;
            self.client
                .upsert_points(UpsertPointsBuilder::new(&collection, points))
                .await
                .map_err(|e| StoreError::Upsert(e.to_string()))?;
            Ok(())
        })
    }

    fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> BoxFuture<'_, Result<Vec<ScoredRecord>, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let limit = u64::try_from(k).map_err(|e| StoreError::Query(e.to_string()))?;
            let results = self
                .client
                .search_points(
                    SearchPointsBuilder::new(&collection, vector, limit).with_payload(true),
                )
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
            Ok(results
                .result
                .into_iter()
                .map(scored_point_to_record)
                .collect())
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<usize, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let response = self
                .client
                .count(CountPointsBuilder::new(&collection).exact(true))
                .await
                .map_err(|e| StoreError::Count(e.to_string()))?;
            let count = response
                .result
                .ok_or_else(|| StoreError::Count("missing count result".into()))?
                .count;
            usize::try_from(count).map_err(|e| StoreError::Count(e.to_string()))
        })
    }
}
