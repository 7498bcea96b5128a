//! Network reachability
//!
//! [`Connectivity`] is a shared flag read by every request. Only
//! [`ConnectivityMonitor`] writes it, from a background task that
//! periodically opens a TCP connection to a probe endpoint. Readers may see a
//! stale value; the flag only lets a client skip requests that are bound to
//! fail.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Last known reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// Nothing observed yet
    Unknown,
    /// The last probe succeeded
    Reachable,
    /// The last probe failed
    Unreachable,
}

impl Reachability {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Reachability::Reachable,
            2 => Reachability::Unreachable,
            _ => Reachability::Unknown,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Reachability::Unknown => 0,
            Reachability::Reachable => 1,
            Reachability::Unreachable => 2,
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reachability::Unknown => "unknown",
            Reachability::Reachable => "reachable",
            Reachability::Unreachable => "unreachable",
        })
    }
}

/// Shared reachability flag
///
/// Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    state: Arc<AtomicU8>,
}

impl Connectivity {
    /// A flag in the [`Reachability::Unknown`] state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reachability
    pub fn reachability(&self) -> Reachability {
        Reachability::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Overwrite the reachability, returning the previous value
    pub fn set(&self, reachability: Reachability) -> Reachability {
        Reachability::from_u8(self.state.swap(reachability.as_u8(), Ordering::Relaxed))
    }

    /// Whether connectivity is known to be absent
    ///
    /// [`Reachability::Unknown`] counts as connected.
    pub fn is_unreachable(&self) -> bool {
        self.reachability() == Reachability::Unreachable
    }
}

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivitySettings {
    /// Start a monitor when the client is built from settings
    pub enabled: bool,
    /// Host to connect to
    pub probe_host: String,
    /// Port to connect to
    pub probe_port: u16,
    /// Seconds between probes
    pub interval_secs: u64,
    /// Seconds before a probe counts as failed
    pub timeout_secs: u64,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            probe_host: "1.1.1.1".to_string(),
            probe_port: 443,
            interval_secs: 10,
            timeout_secs: 3,
        }
    }
}

impl ConnectivitySettings {
    fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Background task keeping a [`Connectivity`] flag up to date
///
/// The task is aborted when the monitor is dropped.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    connectivity: Connectivity,
    task: Option<JoinHandle<()>>,
}

impl ConnectivityMonitor {
    /// Spawn the probe loop on the current tokio runtime
    pub fn start(connectivity: Connectivity, settings: &ConnectivitySettings) -> Self {
        let address = format!("{}:{}", settings.probe_host, settings.probe_port);
        tracing::debug!("Starting connectivity monitor probing {}", address);

        let task = tokio::spawn(probe_loop(
            connectivity.clone(),
            address,
            settings.interval(),
            settings.timeout(),
        ));

        Self {
            connectivity,
            task: Some(task),
        }
    }

    /// The flag this monitor writes
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            tracing::debug!("Stopping connectivity monitor");
            task.abort();
        }
    }
}

async fn probe(address: &str, timeout: Duration) -> Reachability {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_)) => Reachability::Reachable,
        Ok(Err(e)) => {
            tracing::trace!("Connectivity probe to {} failed: {}", address, e);
            Reachability::Unreachable
        }
        Err(_) => {
            tracing::trace!("Connectivity probe to {} timed out", address);
            Reachability::Unreachable
        }
    }
}

async fn probe_loop(
    connectivity: Connectivity,
    address: String,
    interval: Duration,
    timeout: Duration,
) {
    loop {
        let current = probe(&address, timeout).await;
        let previous = connectivity.set(current);
        if previous != current {
            tracing::info!("Network reachability changed: {} -> {}", previous, current);
        }
        tokio::time::sleep(interval).await;
    }
}
