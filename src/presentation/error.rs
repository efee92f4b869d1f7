// API error mapping
use crate::application::reminder_service::ReminderError;
use crate::application::room_service::UnknownStatusFilter;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    BadFilter(#[from] UnknownStatusFilter),

    #[error(transparent)]
    Reminder(#[from] ReminderError),

    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadFilter(_) => StatusCode::BAD_REQUEST,
            ApiError::Reminder(ReminderError::MachineNotFound { .. })
            | ApiError::Reminder(ReminderError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Reminder(ReminderError::NotRunning { .. })
            | ApiError::Reminder(ReminderError::AlreadySet(_)) => StatusCode::CONFLICT,
            ApiError::Reminder(ReminderError::Upstream(_)) | ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:#}", self);
        }

        (status, Json(json!({ "error": format!("{:#}", self) }))).into_response()
    }
}
