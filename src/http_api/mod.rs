use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Datelike, Local, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::calendar::MonthView;
use crate::config::AppConfig;
use crate::date_util::{self, LocalDate};
use crate::event::{NewEvent, ScheduleEvent};
use crate::export::{self, ExportOptions};
use crate::generator::ScheduleGenerator;
use crate::holidays::{Holiday, HolidayCalendar};
use crate::persistence::{PersistenceError, ScheduleStore};
use crate::schedule::{Continuation, ScheduleSummary};
use crate::{Schedule, ScheduleError};

#[derive(Clone)]
pub struct AppState {
    schedule: Arc<RwLock<Schedule>>,
    store: Option<Arc<dyn ScheduleStore + Send + Sync>>,
    generator: Arc<ScheduleGenerator>,
    continue_months: u32,
    export_domain: Arc<str>,
}

impl AppState {
    pub fn new(schedule: Schedule) -> Self {
        Self::with_config(schedule, &AppConfig::default())
    }

    pub fn with_config(schedule: Schedule, config: &AppConfig) -> Self {
        Self {
            schedule: Arc::new(RwLock::new(schedule)),
            store: None,
            generator: Arc::new(config.generator()),
            continue_months: config.continue_months,
            export_domain: Arc::from(config.export_domain.as_str()),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ScheduleStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    fn schedule(&self) -> Arc<RwLock<Schedule>> {
        self.schedule.clone()
    }

    /// Persist `next` and make it the current schedule. The caller holds the
    /// write lock, so mutations are applied one at a time.
    fn commit(&self, current: &mut Schedule, next: Schedule) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_schedule(&next)?;
        }
        *current = next;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::EventNotFound(_) => ApiError::NotFound(value.to_string()),
            ScheduleError::NothingToContinue => ApiError::Conflict(value.to_string()),
            ScheduleError::InvalidDate(_)
            | ScheduleError::InvalidEvent(_)
            | ScheduleError::HorizonTooLong(_) => {
                ApiError::Invalid(value.to_string())
            }
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        error!(error = %value, "failed to persist schedule");
        ApiError::Internal(format!("failed to persist schedule: {value}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ContinuePayload {
    months: Option<u32>,
    through: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum ContinueStatus {
    Extended,
    AlreadyCovered,
}

#[derive(Debug, Serialize)]
struct ContinueResponse {
    status: ContinueStatus,
    added: Vec<ScheduleEvent>,
    summary: ScheduleSummary,
}

#[derive(Debug, Deserialize)]
struct CleanupPayload {
    before: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResetPayload {
    reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportQuery {
    from: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule", get(get_summary))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/schedule/continue", post(continue_schedule))
        .route("/schedule/cleanup", post(cleanup_schedule))
        .route("/schedule/reset", post(reset_schedule))
        .route("/calendar/:year/:month", get(month_view))
        .route("/holidays/:year", get(list_holidays))
        .route("/export.ics", get(export_ics))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "custody schedule HTTP API listening");
    axum::serve(listener, app).await
}

fn optional_date(raw: Option<&str>) -> Result<Option<LocalDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(Some(date_util::parse_date(raw)?)),
        None => Ok(None),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_summary(State(state): State<AppState>) -> Json<ScheduleSummary> {
    let schedule = state.schedule();
    let summary = schedule.read().summary();
    Json(summary)
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<ScheduleEvent>> {
    let schedule = state.schedule();
    let events = schedule.read().sorted_events();
    Json(events)
}

async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ScheduleEvent>, ApiError> {
    let schedule = state.schedule();
    let found = schedule.read().find_event(&event_id).cloned();
    found
        .map(Json)
        .ok_or_else(|| ScheduleError::EventNotFound(event_id).into())
}

async fn create_event(
    State(state): State<AppState>,
    Json(event): Json<NewEvent>,
) -> Result<(StatusCode, Json<ScheduleEvent>), ApiError> {
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let (next, created) = guard.with_event(event)?;
    state.commit(&mut guard, next)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(event): Json<NewEvent>,
) -> Result<Json<ScheduleEvent>, ApiError> {
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let next = guard.with_updated_event(&event_id, event)?;
    let updated = next
        .find_event(&event_id)
        .cloned()
        .ok_or_else(|| ApiError::Internal("event missing after update".into()))?;
    state.commit(&mut guard, next)?;
    Ok(Json(updated))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let next = guard.without_event(&event_id)?;
    state.commit(&mut guard, next)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn continue_schedule(
    State(state): State<AppState>,
    Json(payload): Json<ContinuePayload>,
) -> Result<Json<ContinueResponse>, ApiError> {
    let through = optional_date(payload.through.as_deref())?;
    let months = payload.months.unwrap_or(state.continue_months);
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let outcome = match through {
        Some(until) => guard.continued_through(until, &state.generator)?,
        None => guard.continued(months, &state.generator)?,
    };
    let response = match outcome {
        Continuation::Extended {
            schedule: next,
            added,
        } => {
            state.commit(&mut guard, next)?;
            info!(added = added.len(), "continued custody schedule");
            ContinueResponse {
                status: ContinueStatus::Extended,
                added,
                summary: guard.summary(),
            }
        }
        Continuation::AlreadyCovered => ContinueResponse {
            status: ContinueStatus::AlreadyCovered,
            added: Vec::new(),
            summary: guard.summary(),
        },
    };
    Ok(Json(response))
}

async fn cleanup_schedule(
    State(state): State<AppState>,
    Json(payload): Json<CleanupPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let (next, removed) = guard.without_events_before(&payload.before)?;
    if removed > 0 {
        state.commit(&mut guard, next)?;
    }
    Ok(Json(json!({ "removed": removed, "summary": guard.summary() })))
}

async fn reset_schedule(
    State(state): State<AppState>,
    Json(payload): Json<ResetPayload>,
) -> Result<Json<ScheduleSummary>, ApiError> {
    let reference =
        optional_date(payload.reference.as_deref())?.unwrap_or_else(|| Local::now().date_naive());
    let schedule = state.schedule();
    let mut guard = schedule.write();
    let next = guard.regenerated(reference, &state.generator);
    state.commit(&mut guard, next)?;
    Ok(Json(guard.summary()))
}

async fn month_view(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthView>, ApiError> {
    let holidays = HolidayCalendar::for_year(year);
    let schedule = state.schedule();
    let view = MonthView::build(year, month, &schedule.read(), &holidays)?;
    Ok(Json(view))
}

async fn list_holidays(Path(year): Path<i32>) -> Result<Json<Vec<Holiday>>, ApiError> {
    if !(1583..=9999).contains(&year) {
        return Err(ApiError::invalid(format!("unsupported year {year}")));
    }
    let calendar = HolidayCalendar::for_year(year);
    let holidays = calendar.holidays_in_year(year).into_iter().cloned().collect();
    Ok(Json(holidays))
}

async fn export_ics(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let from = optional_date(query.from.as_deref())?;
    let options = ExportOptions::new(Utc::now().naive_utc())
        .with_domain(state.export_domain.as_ref())
        .from_date(from);
    let schedule = state.schedule();
    let body = export::export_ics(schedule.read().events(), &options);
    let filename = format!(
        "attachment; filename=\"custody-schedule-{}.ics\"",
        Local::now().date_naive().year()
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        body,
    )
        .into_response())
}
