#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rpunch::core::client::{PunchClient, PunchPolicy};
use rpunch::core::device::{Clock, DeviceContext, FixedLocation};
use rpunch::core::punch::PunchLogic;
use rpunch::core::presence::PresenceLogic;
use rpunch::core::sync::SyncEngine;
use rpunch::db::initialize::init_db;
use rpunch::db::pool::DbPool;
use rpunch::errors::{AppError, AppResult};
use rpunch::models::intent::PunchIntent;
use rpunch::models::location::GeoPoint;
use rpunch::models::presence::RawStatus;
use rpunch::models::punch_kind::PunchKind;
use rpunch::models::session::TimeLogSession;
use rpunch::models::wire::{PresenceView, WorkerStatus};
use rpunch::net::connectivity::ConnectivityMonitor;
use rpunch::net::transport::PunchTransport;
use rpunch::store::kv::{KeyValueStore, SqliteKvStore};
use rpunch::store::queue::{PunchQueue, SharedQueue};
use rpunch::ui::notifier::{Notice, Notifier};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn rp() -> Command {
    cargo_bin_cmd!("rpunch")
}

/// Device-local time used by most scenarios: 2025-03-10 08:30:00 +01:00.
pub fn local_time(h: u32, m: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .expect("offset")
        .with_ymd_and_hms(2025, 3, 10, h, m, 0)
        .single()
        .expect("valid time")
}

pub fn office() -> GeoPoint {
    GeoPoint::new(45.4642, 9.19).expect("valid point")
}

pub fn intent(worker: &str, kind: PunchKind, h: u32, m: u32) -> PunchIntent {
    PunchIntent::new(
        worker,
        kind,
        local_time(h, m),
        Some(office()),
        "test-device",
        "Europe/Rome",
    )
}

/// Clock that only moves when told to.
pub struct FixedClock(pub Mutex<DateTime<FixedOffset>>);

impl FixedClock {
    pub fn at(t: DateTime<FixedOffset>) -> Self {
        Self(Mutex::new(t))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.0.lock().expect("clock lock")
    }
}

/// Notifier that keeps every notice for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<(Notice, String)>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<(Notice, String)> {
        self.notices.lock().expect("notices lock").clone()
    }

    pub fn count(&self, level: Notice) -> usize {
        self.all().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: Notice, message: &str) {
        self.notices
            .lock()
            .expect("notices lock")
            .push((level, message.to_string()));
    }
}

/// Transport that applies punches straight to a server database.
pub struct LocalTransport {
    pub server: Mutex<DbPool>,
    pub reachable: AtomicBool,
    pub calls: AtomicUsize,
}

impl LocalTransport {
    pub fn new() -> Self {
        let pool = DbPool::in_memory().expect("server db");
        init_db(&pool.conn).expect("init server db");
        Self {
            server: Mutex::new(pool),
            reachable: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_reachable(&self, up: bool) {
        self.reachable.store(up, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn server_status(&self, worker: &str) -> WorkerStatus {
        let pool = self.server.lock().expect("server lock");
        PunchLogic::status(&pool.conn, worker).expect("status")
    }

    fn check(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::TransientNetwork("connection refused".into()))
        }
    }
}

impl PunchTransport for LocalTransport {
    fn send_punch(&self, intent: &PunchIntent) -> AppResult<TimeLogSession> {
        self.check()?;
        let mut pool = self.server.lock().expect("server lock");
        PunchLogic::apply(&mut pool.conn, &intent.to_request(), Utc::now())
    }

    fn fetch_status(&self, worker_id: &str) -> AppResult<WorkerStatus> {
        self.check()?;
        let pool = self.server.lock().expect("server lock");
        PunchLogic::status(&pool.conn, worker_id)
    }

    fn set_presence(&self, worker_id: &str, status: RawStatus) -> AppResult<()> {
        self.check()?;
        let pool = self.server.lock().expect("server lock");
        PresenceLogic::set_status(&pool.conn, worker_id, status, Utc::now())
    }

    fn fetch_presence(&self, worker_id: &str) -> AppResult<PresenceView> {
        self.check()?;
        let pool = self.server.lock().expect("server lock");
        let p = PresenceLogic::presence(&pool.conn, worker_id, Utc::now())?;
        Ok(PresenceView {
            worker_id: worker_id.to_string(),
            tier: p.tier,
            tooltip: p.tooltip,
        })
    }
}

/// Store whose writes always fail; reads see nothing.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    fn put(&mut self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Persistence("disk full".into()))
    }
}

pub fn memory_queue() -> SharedQueue {
    PunchQueue::load(Box::new(SqliteKvStore::in_memory().expect("kv")))
        .expect("load queue")
        .into_shared()
}

/// Everything a client-side scenario needs, wired to in-process fakes.
pub struct Harness {
    pub queue: SharedQueue,
    pub transport: Arc<LocalTransport>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: SyncEngine,
}

impl Harness {
    pub fn new(connected: bool) -> Self {
        Self::with_queue(connected, memory_queue())
    }

    pub fn with_queue(connected: bool, queue: SharedQueue) -> Self {
        let transport = Arc::new(LocalTransport::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = SyncEngine::new(queue.clone(), transport.clone(), notifier.clone());
        Self {
            queue,
            transport,
            monitor: Arc::new(ConnectivityMonitor::new(connected)),
            notifier,
            engine,
        }
    }

    pub fn client(&self, at: DateTime<FixedOffset>, location: Option<GeoPoint>, offline_ok: bool) -> PunchClient {
        let device = DeviceContext::new(
            "test-device",
            "Europe/Rome",
            Box::new(FixedClock::at(at)),
            Box::new(FixedLocation(location)),
        );
        PunchClient::new(
            self.queue.clone(),
            self.transport.clone(),
            self.monitor.clone(),
            self.notifier.clone(),
            device,
            PunchPolicy {
                offline_punch_allowed: offline_ok,
            },
            Box::new(SqliteKvStore::in_memory().expect("display kv")),
        )
        .expect("client")
    }

    pub fn queued(&self) -> Vec<PunchIntent> {
        self.queue.lock().expect("queue lock").drain()
    }
}
