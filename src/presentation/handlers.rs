// HTTP request handlers
use crate::application::room_service::{MachineFilter, StatusFilter};
use crate::domain::status::{classify, ClassificationResult};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct MachineQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl MachineQuery {
    fn into_filter(self) -> Result<MachineFilter, ApiError> {
        let status = match self.status {
            Some(status) => status.parse::<StatusFilter>()?,
            None => StatusFilter::All,
        };
        Ok(MachineFilter {
            search: self.search.unwrap_or_default(),
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub status: Option<String>,
    pub minutes: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    #[serde(flatten)]
    pub classification: ClassificationResult,
    pub primary_text: String,
    pub secondary_text: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all rooms, sorted by name
pub async fn list_rooms(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let rooms = state.room_service.list_rooms().await?;
    Ok(json_response(&rooms, accepts_brotli(&headers)).await.into_response())
}

/// Classified machines of one room
pub async fn room_detail(
    Path(id): Path<String>,
    Query(query): Query<MachineQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let filter = query.into_filter()?;
    let mut detail = state.room_service.room_detail(&id, &filter).await?;
    state.reminder_service.mark_reminders(&mut detail).await;

    Ok(json_response(&detail, accepts_brotli(&headers)).await.into_response())
}

/// Stream room snapshots until the client disconnects
pub async fn watch_room(
    Path(id): Path<String>,
    Query(query): Query<MachineQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let filter = query.into_filter()?;
    let rx = state.watch_service.watch_room(id, filter);
    Ok(stream_from_receiver(rx, accepts_brotli(&headers)).await.into_response())
}

pub async fn list_reminders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.reminder_service.list_reminders().await)
}

pub async fn set_reminder(
    Path((id, machine_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let reminder = state.reminder_service.set_reminder(&id, &machine_id).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn remove_reminder(
    Path((id, machine_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let reminder = state.reminder_service.remove_reminder(&id, &machine_id).await?;
    Ok(Json(reminder))
}

/// Run the classifier on an arbitrary status string
pub async fn classify_status(Query(query): Query<ClassifyQuery>) -> Json<ClassifyResponse> {
    let classification = classify(query.status.as_deref(), query.minutes);
    Json(ClassifyResponse {
        primary_text: classification.primary_text().to_string(),
        secondary_text: classification.secondary_text().map(str::to_string),
        classification,
    })
}
