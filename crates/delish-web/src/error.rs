//! HTTP-layer error type and its rendering.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use delish_core::error::DelishError;
use thiserror::Error;
use tracing::{error, warn};

use crate::views;

#[derive(Debug, Error)]
pub enum WebError {
    /// The uploaded file is not an image.
    #[error("That filetype is not allowed!")]
    Rejected { content_type: String },

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Malformed form submission: {0}")]
    Form(#[from] MultipartError),

    /// The photo, or the photo resized to the configured width, exceeds
    /// the configured maximum dimension.
    #[error("That image is too large!")]
    TooLarge,

    #[error("Image processing failed: {0}")]
    Image(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Core(#[from] DelishError),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Rejected { .. } | WebError::UnexpectedField(_) => StatusCode::BAD_REQUEST,
            // Body limit violations surface here as 413.
            WebError::Form(err) => err.status(),
            WebError::TooLarge => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::Image(_) | WebError::Io(_) | WebError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebError::Core(err) => match err {
                DelishError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                DelishError::NotFound { .. } => StatusCode::NOT_FOUND,
                DelishError::AlreadyExists { .. } => StatusCode::CONFLICT,
                DelishError::Database(_) | DelishError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Text shown to the visitor. Server-side failures stay generic.
    fn public_message(&self) -> String {
        match self {
            WebError::Rejected { .. } | WebError::UnexpectedField(_) | WebError::TooLarge => {
                self.to_string()
            }
            WebError::Form(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "That upload is too large.".into()
            }
            WebError::Form(_) => "The form submission could not be read.".into(),
            WebError::NotFound => "That page could not be found.".into(),
            WebError::Core(DelishError::Validation { message }) => message.clone(),
            WebError::Core(DelishError::AlreadyExists { .. }) => {
                "A store with that name was just created, please try again.".into()
            }
            WebError::Core(DelishError::NotFound { .. }) => "That page could not be found.".into(),
            _ => "Something went wrong.".into(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        } else if status != StatusCode::NOT_FOUND {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let page = views::error_page(status, &self.public_message());
        (status, Html(page.into_string())).into_response()
    }
}
