//! Punch client: direct submit when online, durable queue when offline.

use crate::core::clock_state::ClockDisplay;
use crate::core::device::DeviceContext;
use crate::errors::{AppError, AppResult};
use crate::models::intent::PunchIntent;
use crate::models::punch_kind::PunchKind;
use crate::models::session::TimeLogSession;
use crate::net::connectivity::ConnectivityMonitor;
use crate::net::transport::PunchTransport;
use crate::store::kv::KeyValueStore;
use crate::store::queue::{SharedQueue, lock_queue};
use crate::ui::notifier::{Notice, Notifier};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Plan features that affect punching.
#[derive(Debug, Clone, Copy)]
pub struct PunchPolicy {
    pub offline_punch_allowed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PunchOutcome {
    /// The server accepted the punch.
    Accepted(TimeLogSession),
    /// Stored locally; the sync engine delivers it on reconnect.
    Queued,
}

pub struct PunchClient {
    queue: SharedQueue,
    transport: Arc<dyn PunchTransport>,
    connectivity: Arc<ConnectivityMonitor>,
    notifier: Arc<dyn Notifier>,
    device: DeviceContext,
    policy: PunchPolicy,
    display: ClockDisplay,
    display_store: Box<dyn KeyValueStore>,
}

impl PunchClient {
    pub fn new(
        queue: SharedQueue,
        transport: Arc<dyn PunchTransport>,
        connectivity: Arc<ConnectivityMonitor>,
        notifier: Arc<dyn Notifier>,
        device: DeviceContext,
        policy: PunchPolicy,
        display_store: Box<dyn KeyValueStore>,
    ) -> AppResult<Self> {
        let display = ClockDisplay::load(display_store.as_ref())?;
        Ok(Self {
            queue,
            transport,
            connectivity,
            notifier,
            device,
            policy,
            display,
            display_store,
        })
    }

    pub fn display(&self) -> &ClockDisplay {
        &self.display
    }

    pub fn now_local(&self) -> NaiveDateTime {
        self.device.clock.now().naive_local()
    }

    fn fail<T>(&self, err: AppError) -> AppResult<T> {
        self.notifier.notify(Notice::Error, &err.to_string());
        Err(err)
    }

    /// Persist the display; it is a projection, so a failed save only warns.
    fn set_display(&mut self, display: ClockDisplay) {
        self.display = display;
        if let Err(e) = self.display.save(self.display_store.as_mut()) {
            log::warn!("could not persist clock display: {}", e);
        }
    }

    fn flip(&mut self, kind: PunchKind, at: NaiveDateTime) {
        let mut next = self.display.clone();
        next.apply(kind, at);
        self.set_display(next);
    }

    /// Capture and deliver (or queue) one punch for `worker_id`.
    pub fn submit_punch(&mut self, worker_id: &str, kind: PunchKind) -> AppResult<PunchOutcome> {
        let captured_at = self.device.clock.now();

        let location = match self.device.geolocator.locate() {
            Ok(p) => p,
            Err(e) => return self.fail(e),
        };

        let intent = PunchIntent::new(
            worker_id,
            kind,
            captured_at,
            Some(location),
            &self.device.descriptor,
            &self.device.time_zone,
        );

        if !self.connectivity.is_connected() {
            if !self.policy.offline_punch_allowed {
                return self.fail(AppError::Policy(
                    "offline punching is not included in your plan".into(),
                ));
            }

            let queued = lock_queue(&self.queue).and_then(|mut q| q.enqueue(intent.clone()));
            if let Err(e) = queued {
                return self.fail(e);
            }

            log::info!("queued {}", intent.describe());
            self.flip(kind, captured_at.naive_local());
            self.notifier.notify(
                Notice::Info,
                &format!(
                    "{} queued; it will be sent when you are back online.",
                    kind.label()
                ),
            );
            return Ok(PunchOutcome::Queued);
        }

        match self.transport.send_punch(&intent) {
            Ok(session) => {
                self.flip(kind, captured_at.naive_local());
                self.notifier
                    .notify(Notice::Success, &format!("{} recorded.", kind.label()));
                Ok(PunchOutcome::Accepted(session))
            }
            // online failures are reported, never deferred
            Err(e) => self.fail(e),
        }
    }

    /// Re-derive the display from the server; offline, the local view is kept.
    pub fn reconcile(&mut self, worker_id: &str) -> AppResult<&ClockDisplay> {
        if !self.connectivity.is_connected() {
            return Ok(&self.display);
        }

        let status = self.transport.fetch_status(worker_id)?;
        let mut next = ClockDisplay::from_status(&status);

        // queued punches are newer than anything the server knows about
        let pending = lock_queue(&self.queue)?.drain();
        let mut pending: Vec<PunchIntent> = pending
            .into_iter()
            .filter(|i| i.worker_id == worker_id)
            .collect();
        pending.sort_by_key(|i| i.captured_at);
        for intent in &pending {
            next.apply(intent.kind, intent.captured_at.naive_local());
        }

        self.set_display(next);
        Ok(&self.display)
    }
}
