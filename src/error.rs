use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::{forms::ValidationError, repository::RepoError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("record {0} not found")]
    NotFound(i64),

    #[error("store failure: {0}")]
    Store(#[source] sqlx::Error),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("login required")]
    LoginRequired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Upload(String),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => AppError::NotFound(id),
            RepoError::Store(e) => AppError::Store(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials | AppError::LoginRequired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upload(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::LoginRequired = self {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        let message = match &self {
            AppError::Store(e) => {
                log::error!("Store error: {:?}", e);
                "Something went wrong while talking to the database.".to_string()
            }
            AppError::Template(e) => {
                log::error!("Template error: {:?}", e);
                "The page could not be rendered.".to_string()
            }
            other => other.to_string(),
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                log::error!("Failed to render error page: {:?}", e);
                (status, page.message).into_response()
            }
        }
    }
}
