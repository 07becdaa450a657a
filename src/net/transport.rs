//! Client side of the punch server API.

use crate::errors::{AppError, AppResult};
use crate::models::intent::PunchIntent;
use crate::models::presence::RawStatus;
use crate::models::session::TimeLogSession;
use crate::models::wire::{
    MessageBody, PresenceUpdate, PresenceView, PunchResponse, WorkerStatus,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Calls the direct-submit path and the sync engine share.
pub trait PunchTransport: Send + Sync {
    /// Deliver one punch to `time-in` / `time-out`; returns the server's session.
    fn send_punch(&self, intent: &PunchIntent) -> AppResult<TimeLogSession>;

    fn fetch_status(&self, worker_id: &str) -> AppResult<WorkerStatus>;

    fn set_presence(&self, worker_id: &str, status: RawStatus) -> AppResult<()>;

    fn fetch_presence(&self, worker_id: &str) -> AppResult<PresenceView>;
}

/// JSON over HTTP with a bearer token and a bounded request timeout.
pub struct HttpTransport {
    base_url: String,
    api_token: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_token: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::TransientNetwork(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        if self.api_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_token)
        }
    }

    fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> AppResult<T> {
        let resp = self
            .authorized(req)
            .send()
            .map_err(|e| AppError::TransientNetwork(e.to_string()))?;
        decode(resp)
    }
}

fn error_message(resp: Response) -> String {
    let status = resp.status();
    resp.json::<MessageBody>()
        .map(|b| b.message)
        .unwrap_or_else(|_| format!("HTTP {}", status))
}

fn decode<T: DeserializeOwned>(resp: Response) -> AppResult<T> {
    let status = resp.status();

    if status.is_success() {
        return resp
            .json::<T>()
            .map_err(|e| AppError::TransientNetwork(format!("invalid response body: {}", e)));
    }

    log::warn!("server answered {}", status);
    match status {
        StatusCode::UNAUTHORIZED => Err(AppError::Unauthorized),
        s if s.is_server_error() => Err(AppError::TransientNetwork(format!(
            "server error {}: {}",
            s,
            error_message(resp)
        ))),
        _ => Err(rejection(status, error_message(resp))),
    }
}

/// Only the state-machine refusals are conflicts; anything else is a bad request.
fn rejection(status: StatusCode, message: String) -> AppError {
    let state_machine = [
        AppError::AlreadyTimedIn.to_string(),
        AppError::NoActiveTimeIn.to_string(),
    ];
    if status == StatusCode::BAD_REQUEST && state_machine.contains(&message) {
        AppError::Conflict(message)
    } else {
        AppError::Rejected(message)
    }
}

impl PunchTransport for HttpTransport {
    fn send_punch(&self, intent: &PunchIntent) -> AppResult<TimeLogSession> {
        log::debug!("sending {}", intent.describe());
        let req = self
            .client
            .post(self.url(intent.kind.endpoint()))
            .json(&intent.to_request());
        let body: PunchResponse = self.execute(req)?;
        Ok(body.session)
    }

    fn fetch_status(&self, worker_id: &str) -> AppResult<WorkerStatus> {
        let req = self.client.get(self.url(&format!("status/{}", worker_id)));
        self.execute(req)
    }

    fn set_presence(&self, worker_id: &str, status: RawStatus) -> AppResult<()> {
        let req = self.client.post(self.url("presence")).json(&PresenceUpdate {
            worker_id: worker_id.to_string(),
            status,
        });
        let _: MessageBody = self.execute(req)?;
        Ok(())
    }

    fn fetch_presence(&self, worker_id: &str) -> AppResult<PresenceView> {
        let req = self.client.get(self.url(&format!("presence/{}", worker_id)));
        self.execute(req)
    }
}
