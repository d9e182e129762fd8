use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, MethodRouter},
};
use serde_json::{json, Map, Value};

use crate::{
    forms::normalize,
    models::Model,
    repository::{RepoError, Repositories},
    state::AppState,
};

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn method_not_allowed(method: &Method, allow: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        format!("Method {} Not Allowed", method),
    )
        .into_response()
}

fn parse_id(raw: &str) -> Result<i64, Response> {
    raw.trim()
        .parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "ID must be a number"))
}

fn parse_body<M: Model>(body: &Bytes) -> Result<M, Response> {
    let raw: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "Request body must be a JSON object"))?;

    M::from_draft(&normalize::<M>(&raw)).map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string(), "field": err.field })),
        )
            .into_response()
    })
}

fn singular<M: Model>() -> String {
    M::LABEL.to_lowercase()
}

/// `GET` and `POST` on `/api/<path>`.
pub fn collection<M: Model>() -> MethodRouter<AppState> {
    get(list::<M>)
        .post(create::<M>)
        .fallback(|method: Method| async move { method_not_allowed(&method, "GET, POST") })
}

/// `GET`, `PUT` and `DELETE` on `/api/<path>/:id`.
pub fn item<M: Model>() -> MethodRouter<AppState> {
    get(fetch::<M>)
        .put(update::<M>)
        .delete(remove::<M>)
        .fallback(|method: Method| async move { method_not_allowed(&method, "GET, PUT, DELETE") })
}

pub async fn list<M: Model>(State(repos): State<Repositories>) -> Response {
    match repos.of::<M>().list().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            log::error!("Failed to list {}: {}", M::PLURAL, e);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch {}", M::PLURAL),
            )
        }
    }
}

pub async fn create<M: Model>(State(repos): State<Repositories>, body: Bytes) -> Response {
    let fields = match parse_body::<M>(&body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    match repos.of::<M>().add(fields).await {
        Ok(record) => {
            log::info!("Created {} {}", singular::<M>(), record.id);
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => {
            log::error!("Failed to create {}: {}", singular::<M>(), e);
            json_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to create {}", singular::<M>()),
            )
        }
    }
}

pub async fn fetch<M: Model>(
    State(repos): State<Repositories>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match repos.of::<M>().get(id).await {
        Ok(record) => Json(record).into_response(),
        Err(RepoError::NotFound(_)) => {
            json_error(StatusCode::NOT_FOUND, format!("{} not found", M::LABEL))
        }
        Err(e) => {
            log::error!("Failed to fetch {} {}: {}", singular::<M>(), id, e);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch {}", singular::<M>()),
            )
        }
    }
}

pub async fn update<M: Model>(
    State(repos): State<Repositories>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let fields = match parse_body::<M>(&body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    match repos.of::<M>().update(id, fields).await {
        Ok(record) => {
            log::info!("Updated {} {}", singular::<M>(), id);
            Json(record).into_response()
        }
        Err(RepoError::NotFound(_)) => {
            json_error(StatusCode::NOT_FOUND, format!("{} not found", M::LABEL))
        }
        Err(e) => {
            log::error!("Failed to update {} {}: {}", singular::<M>(), id, e);
            json_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to update {}", singular::<M>()),
            )
        }
    }
}

/// Any failure, including an unknown id, is a 500.
pub async fn remove<M: Model>(
    State(repos): State<Repositories>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match repos.of::<M>().delete(id).await {
        Ok(()) => {
            log::info!("Deleted {} {}", singular::<M>(), id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            log::warn!("Failed to delete {} {}: {}", singular::<M>(), id, e);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to delete {}", singular::<M>()),
            )
        }
    }
}
