//! Route handlers.
//!
//! Each handler is generic over the resource kind and passes the client's
//! result or error straight through. Creation bodies are validated here,
//! before any upstream call.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::client::{ResourceClient, Resource, Validate};
use crate::http::response::AppError;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /{resource}` and `POST /{resource}`, `GET` and `DELETE` on `/{resource}/{id}`.
pub fn resource_routes<R: Resource>(client: ResourceClient<R>) -> Router {
    let collection = format!("/{}", R::PATH);
    let item = format!("/{}/{{id}}", R::PATH);

    Router::new()
        .route(&collection, get(list_all::<R>).post(create::<R>))
        .route(&item, get(get_by_id::<R>).delete(delete_by_id::<R>))
        .with_state(client)
}

pub async fn list_all<R: Resource>(
    State(client): State<ResourceClient<R>>,
) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(client.list_all().await?))
}

pub async fn get_by_id<R: Resource>(
    State(client): State<ResourceClient<R>>,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError> {
    Ok(Json(client.get_by_id(&id).await?))
}

pub async fn create<R: Resource>(
    State(client): State<ResourceClient<R>>,
    payload: Result<Json<R::Create>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;

    payload.validate().map_err(|errors| {
        AppError::Validation(errors.iter().map(ToString::to_string).collect())
    })?;

    tracing::debug!(resource = R::NAME, "Creating resource");
    let created = client.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_by_id<R: Resource>(
    State(client): State<ResourceClient<R>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    client.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
