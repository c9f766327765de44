//! Calendar endpoints
//!
//! The calendar page posts the event records it fetched for a week and gets
//! back occurrences expanded for display.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use teamcal_core::{
    DisplayWindow, EventOccurrence, EventRecord, ExpandOptions, WeekView, build_week_view,
    expand_records, parse_timezone,
};

use crate::{AppState, error::ApiError};

/// Week view request
#[derive(Debug, Deserialize)]
pub struct WeekRequest {
    /// First day of the displayed week
    pub week_start: Option<NaiveDate>,
    /// Last day of the displayed week, checked against `week_start`
    pub week_end: Option<NaiveDate>,
    /// Date used to pick the current week when `week_start` is absent
    pub today: Option<NaiveDate>,
    /// IANA timezone of the viewer, defaults to the configured one
    pub timezone: Option<String>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// Expand request
#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    pub timezone: Option<String>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// Expand response
#[derive(Debug, Serialize)]
pub struct ExpandResponse {
    pub occurrences: Vec<EventOccurrence>,
    pub rejected: usize,
}

fn options(state: &AppState, timezone: Option<&str>) -> Result<ExpandOptions, ApiError> {
    let options = ExpandOptions::from_config(&state.config);
    Ok(match timezone {
        Some(tz) => options.with_timezone(parse_timezone(tz)?),
        None => options,
    })
}

fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

impl WeekRequest {
    fn window(&self, state: &AppState, tz: &Tz) -> Result<DisplayWindow, ApiError> {
        let window = match (self.week_start, self.week_end) {
            (Some(start), Some(end)) => DisplayWindow::between(start, end)?,
            (Some(start), None) => DisplayWindow::starting(start)?,
            (None, _) => {
                let today = self.today.unwrap_or_else(|| today_in(tz));
                DisplayWindow::containing(today, state.config.week_start)?
            }
        };
        Ok(window)
    }
}

/// Build the week view for the calendar page
async fn week_view(
    State(state): State<AppState>,
    Json(request): Json<WeekRequest>,
) -> Result<Json<WeekView>, ApiError> {
    let options = options(&state, request.timezone.as_deref())?;
    let window = request.window(&state, &options.timezone)?;

    tracing::info!(
        week_start = %window.start(),
        events = request.events.len(),
        timezone = %options.timezone.name(),
        "Building week view"
    );

    Ok(Json(build_week_view(request.events, &window, &options)))
}

/// Expand every record without a display window
async fn expand_events(
    State(state): State<AppState>,
    Json(request): Json<ExpandRequest>,
) -> Result<Json<ExpandResponse>, ApiError> {
    let options = options(&state, request.timezone.as_deref())?;
    let expanded = expand_records(request.events, &options);

    Ok(Json(ExpandResponse {
        occurrences: expanded.occurrences,
        rejected: expanded.rejected,
    }))
}

/// Calendar routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/calendar/week", post(week_view))
        .route("/events/expand", post(expand_events))
}
