//! Drains the punch queue against the server after reconnecting.

use crate::errors::AppResult;
use crate::models::intent::PunchIntent;
use crate::net::connectivity::ConnectivityEvent;
use crate::net::transport::PunchTransport;
use crate::store::queue::{SharedQueue, lock_queue};
use crate::ui::notifier::{Notice, Notifier};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;

/// Outcome of one pass over the queue.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<PunchIntent>,
    pub failures: Vec<(PunchIntent, String)>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.synced.is_empty() && self.failures.is_empty()
    }
}

/// Clears the in-flight flag when a pass ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncEngine {
    queue: SharedQueue,
    transport: Arc<dyn PunchTransport>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl SyncEngine {
    pub fn new(
        queue: SharedQueue,
        transport: Arc<dyn PunchTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queue,
            transport,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one pass. Returns `Ok(None)` when another pass is already running;
    /// the dropped trigger is not replayed.
    pub fn sync(&self) -> AppResult<Option<SyncReport>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("sync already in flight, trigger dropped");
            return Ok(None);
        }
        let _guard = InFlight(&self.in_flight);

        let snapshot = lock_queue(&self.queue)?.drain();
        let mut report = SyncReport::default();

        for intent in snapshot {
            // the queue lock is not held across the network call
            match self.transport.send_punch(&intent) {
                Ok(_) => match lock_queue(&self.queue).and_then(|mut q| q.remove(&intent)) {
                    Ok(_) => report.synced.push(intent),
                    Err(e) => {
                        log::error!("{} accepted but still queued: {}", intent.describe(), e);
                        let msg = format!("accepted by the server but not removed locally: {}", e);
                        report.failures.push((intent, msg));
                    }
                },
                Err(e) => {
                    log::warn!("sync of {} failed: {}", intent.describe(), e);
                    report.failures.push((intent, e.to_string()));
                }
            }
        }

        self.announce(&report);
        Ok(Some(report))
    }

    /// One aggregate notice for successes and one for failures.
    fn announce(&self, report: &SyncReport) {
        if !report.synced.is_empty() {
            let items: Vec<String> = report.synced.iter().map(|i| i.describe()).collect();
            self.notifier.notify(
                Notice::Success,
                &format!(
                    "Synced {} queued punch(es): {}",
                    report.synced.len(),
                    items.join("; ")
                ),
            );
        }

        if !report.failures.is_empty() {
            let items: Vec<String> = report
                .failures
                .iter()
                .map(|(i, msg)| format!("{}: {}", i.describe(), msg))
                .collect();
            self.notifier.notify(
                Notice::Error,
                &format!(
                    "{} queued punch(es) could not be synced: {}",
                    report.failures.len(),
                    items.join("; ")
                ),
            );
        }
    }

    /// Sync on every `Connected` edge until the subscription closes.
    pub fn run(&self, events: Receiver<ConnectivityEvent>) {
        for event in events {
            if event != ConnectivityEvent::Connected {
                continue;
            }
            match self.sync() {
                Ok(Some(report)) => log::info!(
                    "sync pass done: {} synced, {} failed",
                    report.synced.len(),
                    report.failures.len()
                ),
                Ok(None) => {}
                Err(e) => log::error!("sync pass aborted: {}", e),
            }
        }
    }
}
