use super::AppState;
use crate::core::presence::PresenceLogic;
use crate::core::punch::PunchLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::punch_kind::PunchKind;
use crate::models::wire::{MessageBody, PresenceUpdate, PresenceView, PunchRequest, PunchResponse};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

/// HTTP status for an error leaving the server.
pub fn status_code(err: &AppError) -> StatusCode {
    match err {
        AppError::AlreadyTimedIn
        | AppError::NoActiveTimeIn
        | AppError::InvalidRequest(_)
        | AppError::InvalidDate(_)
        | AppError::InvalidTime(_)
        | AppError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: AppError) -> Response {
    let status = status_code(&err);
    let message = if status.is_server_error() {
        log::error!("request failed: {}", err);
        "Internal server error".to_string()
    } else {
        err.to_string()
    };
    (status, Json(MessageBody { message })).into_response()
}

fn authorize(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    if state.api_token.is_empty() {
        return Ok(());
    }
    let expected = format!("Bearer {}", state.api_token);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

/// Turn an extractor rejection into the usual 400 `{message}` reply.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

/// Run database work off the async workers with a fresh connection.
async fn with_db<T, F>(state: &AppState, work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut DbPool) -> AppResult<T> + Send + 'static,
{
    let db_path = state.db_path.clone();
    tokio::task::spawn_blocking(move || {
        let mut pool = DbPool::new(&db_path)?;
        work(&mut pool)
    })
    .await
    .map_err(|e| AppError::Other(e.to_string()))?
}

async fn punch(
    state: AppState,
    headers: HeaderMap,
    payload: Result<Json<PunchRequest>, JsonRejection>,
    kind: PunchKind,
) -> Response {
    let body = match authorize(&state, &headers).and_then(|_| json_body(payload)) {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };

    let result = with_db(&state, move |pool| match kind {
        PunchKind::TimeIn => PunchLogic::time_in(&mut pool.conn, &body, Utc::now()),
        PunchKind::TimeOut => PunchLogic::time_out(&mut pool.conn, &body, Utc::now()),
    })
    .await;

    match result {
        Ok(session) => {
            let (status, message) = match kind {
                PunchKind::TimeIn => (StatusCode::CREATED, "Time-in recorded."),
                PunchKind::TimeOut => (StatusCode::OK, "Time-out recorded."),
            };
            (
                status,
                Json(PunchResponse {
                    message: message.to_string(),
                    session,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn time_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PunchRequest>, JsonRejection>,
) -> Response {
    punch(state, headers, payload, PunchKind::TimeIn).await
}

pub async fn time_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PunchRequest>, JsonRejection>,
) -> Response {
    punch(state, headers, payload, PunchKind::TimeOut).await
}

pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(worker_id): Path<String>,
) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return error_response(e);
    }
    match with_db(&state, move |pool| PunchLogic::status(&pool.conn, &worker_id)).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn set_presence(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PresenceUpdate>, JsonRejection>,
) -> Response {
    let body = match authorize(&state, &headers).and_then(|_| json_body(payload)) {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };
    if body.worker_id.trim().is_empty() {
        return error_response(AppError::InvalidRequest("workerId is required".into()));
    }
    let result = with_db(&state, move |pool| {
        PresenceLogic::set_status(&pool.conn, &body.worker_id, body.status, Utc::now())
    })
    .await;
    match result {
        Ok(()) => Json(MessageBody {
            message: "Status updated.".to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn presence(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(worker_id): Path<String>,
) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return error_response(e);
    }
    let result = with_db(&state, move |pool| {
        let p = PresenceLogic::presence(&pool.conn, &worker_id, Utc::now())?;
        Ok(PresenceView {
            worker_id,
            tier: p.tier,
            tooltip: p.tooltip,
        })
    })
    .await;
    match result {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}
