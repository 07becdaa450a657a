//! Wires the device-side components from the configuration.

use crate::config::Config;
use crate::core::client::{PunchClient, PunchPolicy};
use crate::core::device::{DeviceContext, FixedLocation, SystemClock};
use crate::core::sync::SyncEngine;
use crate::errors::AppResult;
use crate::models::location::GeoPoint;
use crate::net::connectivity::{ConnectivityMonitor, ReachabilityCheck, StaticCheck, TcpCheck};
use crate::net::transport::{HttpTransport, PunchTransport};
use crate::store::kv::SqliteKvStore;
use crate::store::queue::{PunchQueue, SharedQueue};
use crate::ui::notifier::{ConsoleNotifier, Notifier};
use std::sync::Arc;
use std::time::Duration;

pub struct ClientContext {
    pub queue: SharedQueue,
    pub transport: Arc<dyn PunchTransport>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub notifier: Arc<dyn Notifier>,
    pub engine: SyncEngine,
    pub reachability: Box<dyn ReachabilityCheck + Send>,
}

impl ClientContext {
    /// Open the local queue and check the server once.
    pub fn open(cfg: &Config, force_offline: bool) -> AppResult<Self> {
        let timeout = Duration::from_secs(cfg.request_timeout_secs.max(1));

        let queue = PunchQueue::load(Box::new(SqliteKvStore::open(&cfg.queue_database)?))?
            .into_shared();
        let transport: Arc<dyn PunchTransport> =
            Arc::new(HttpTransport::new(&cfg.server_url, &cfg.api_token, timeout)?);
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

        let reachability: Box<dyn ReachabilityCheck + Send> = if force_offline {
            Box::new(StaticCheck(false))
        } else {
            Box::new(TcpCheck::for_server(&cfg.server_url, timeout)?)
        };
        let monitor = Arc::new(ConnectivityMonitor::new(reachability.is_reachable()));

        let engine = SyncEngine::new(queue.clone(), transport.clone(), notifier.clone());

        Ok(Self {
            queue,
            transport,
            monitor,
            notifier,
            engine,
            reachability,
        })
    }

    pub fn punch_client(&self, cfg: &Config, location: Option<GeoPoint>) -> AppResult<PunchClient> {
        let descriptor = if cfg.device_name.trim().is_empty() {
            DeviceContext::default_descriptor()
        } else {
            cfg.device_name.clone()
        };

        let device = DeviceContext::new(
            &descriptor,
            &cfg.time_zone,
            Box::new(SystemClock),
            Box::new(FixedLocation(location.or_else(|| cfg.location()))),
        );

        PunchClient::new(
            self.queue.clone(),
            self.transport.clone(),
            self.monitor.clone(),
            self.notifier.clone(),
            device,
            PunchPolicy {
                offline_punch_allowed: cfg.offline_punch_allowed,
            },
            Box::new(SqliteKvStore::open(&cfg.queue_database)?),
        )
    }
}
