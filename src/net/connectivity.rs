//! Edge-triggered view of network reachability.

use crate::errors::{AppError, AppResult};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Connected,
    Disconnected,
}

/// Turns level reports ("reachable: yes/no") into transition events.
///
/// Only a change of value produces an event; repeated identical reports are
/// swallowed here so subscribers never see them.
pub struct ConnectivityMonitor {
    last_known_connected: AtomicBool,
    subscribers: Mutex<Vec<Sender<ConnectivityEvent>>>,
}

impl ConnectivityMonitor {
    pub fn new(initially_connected: bool) -> Self {
        Self {
            last_known_connected: AtomicBool::new(initially_connected),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.last_known_connected.load(Ordering::SeqCst)
    }

    /// Register a new listener for edge events.
    pub fn subscribe(&self) -> AppResult<Receiver<ConnectivityEvent>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .map_err(|_| AppError::Other("connectivity subscribers lock poisoned".into()))?
            .push(tx);
        Ok(rx)
    }

    /// Feed one status report; returns the edge it produced, if any.
    pub fn report(&self, connected: bool) -> Option<ConnectivityEvent> {
        let previous = self.last_known_connected.swap(connected, Ordering::SeqCst);
        if previous == connected {
            return None;
        }

        let event = if connected {
            ConnectivityEvent::Connected
        } else {
            ConnectivityEvent::Disconnected
        };
        log::info!("connectivity changed: {:?}", event);

        // the sender list stays whole even if a holder panicked
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // receivers that went away are pruned
        subs.retain(|tx| tx.send(event).is_ok());

        Some(event)
    }
}

/// Source of raw reachability reports.
pub trait ReachabilityCheck {
    fn is_reachable(&self) -> bool;
}

/// Reports the server reachable when a TCP connection to its host:port succeeds.
pub struct TcpCheck {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpCheck {
    pub fn for_server(server_url: &str, timeout: Duration) -> AppResult<Self> {
        let url = reqwest::Url::parse(server_url)
            .map_err(|e| AppError::Config(format!("invalid server_url '{}': {}", server_url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::Config(format!("server_url '{}' has no host", server_url)))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| AppError::Config(format!("server_url '{}' has no port", server_url)))?;
        Ok(Self {
            host,
            port,
            timeout,
        })
    }
}

impl ReachabilityCheck for TcpCheck {
    fn is_reachable(&self) -> bool {
        let Ok(addrs) = (self.host.as_str(), self.port).to_socket_addrs() else {
            return false;
        };
        addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok())
    }
}

/// Check fixed to one answer, used for `--offline` runs.
pub struct StaticCheck(pub bool);

impl ReachabilityCheck for StaticCheck {
    fn is_reachable(&self) -> bool {
        self.0
    }
}
