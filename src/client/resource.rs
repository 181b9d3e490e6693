//! Typed CRUD operations for one resource kind.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::transport::{Transport, TransportError, TransportRequest};
use crate::client::types::{ListEnvelope, Resource};
use crate::resilience::{ApiError, ApiResult, RetryExecutor};

/// `list_all`, `get_by_id`, `create` and `delete_by_id` for resource `R`.
///
/// Every operation builds one closure performing a single request and hands
/// it to the [`RetryExecutor`]. Nothing here retries or classifies on its own.
pub struct ResourceClient<R: Resource> {
    transport: Arc<dyn Transport>,
    executor: RetryExecutor,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            executor: self.executor.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("path", &R::PATH)
            .field("policy", self.executor.policy())
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(transport: Arc<dyn Transport>, executor: RetryExecutor) -> Self {
        Self {
            transport,
            executor,
            _resource: PhantomData,
        }
    }

    /// `GET /{resource}`, unwrapping the `{data: [...]}` envelope.
    pub async fn list_all(&self) -> ApiResult<Vec<R>> {
        let segments = [R::PATH];
        let envelope: ListEnvelope<R> = self
            .executor
            .execute(|| self.fetch(TransportRequest::get(&segments)))
            .await?;
        Ok(envelope.data)
    }

    /// `GET /{resource}/{id}`. An unknown id surfaces as a 404 client error.
    pub async fn get_by_id(&self, id: &str) -> ApiResult<R> {
        let segments = [R::PATH, id];
        self.executor
            .execute(|| self.fetch(TransportRequest::get(&segments)))
            .await
    }

    /// `POST /{resource}`. Not idempotent: a retried attempt may create a
    /// second resource if an earlier one landed but its response was lost.
    pub async fn create(&self, payload: &R::Create) -> ApiResult<R> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ApiError::client(400, TransportError::Encode(e.to_string())))?;
        let segments = [R::PATH];
        self.executor
            .execute(|| self.fetch(TransportRequest::post(&segments, &body)))
            .await
    }

    /// `DELETE /{resource}/{id}`. Any success response counts, whatever its body.
    pub async fn delete_by_id(&self, id: &str) -> ApiResult<()> {
        let segments = [R::PATH, id];
        self.executor
            .execute(|| self.discard(TransportRequest::delete(&segments)))
            .await
    }

    /// One attempt: send and decode. A body that does not decode carries the
    /// success status, so it ends the call instead of repeating the request.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: TransportRequest<'_>,
    ) -> Result<T, TransportError> {
        self.transport.send(request).await?.decode()
    }

    async fn discard(&self, request: TransportRequest<'_>) -> Result<(), TransportError> {
        self.transport.send(request).await.map(drop)
    }
}
