//! Art-Net redirector
//!
//! Receives OpDmx frames on a local UDP endpoint, writes every accepted
//! universe into the shared [`UniverseBuffer`] and relays the raw datagram
//! to an optional downstream endpoint. One background task per session;
//! malformed and unauthenticated datagrams are dropped and counted inside
//! that task and never reach the caller.
//!
//! ```rust,no_run
//! use lightshow_control::redirector::{Redirector, RedirectorConfig};
//! use lightshow_core::{Endpoint, UniverseBuffer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let buffer = UniverseBuffer::new();
//! let redirector = Redirector::new(buffer.clone());
//!
//! let config = RedirectorConfig::new(Endpoint::new("0.0.0.0", 6454))
//!     .with_forward(Endpoint::new("10.0.0.20", 6454))
//!     .with_key("backstage");
//! redirector.start(config).await?;
//!
//! // ... tick the show from `buffer` ...
//!
//! redirector.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;

pub use auth::{FrameVerifier, OpenAccess, SharedKey, TAG_LEN};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lightshow_core::settings::ARTNET_PORT;
use lightshow_core::{ArtNetSettings, Endpoint, UniverseBuffer};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::dmx::ArtDmx;
use crate::error::{StartError, StopError};

/// Receive buffer size; larger than any valid OpDmx frame plus tag
const RECV_BUFFER_LEN: usize = 2048;

/// Lifecycle of a redirector session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectorStatus {
    /// No socket is bound
    Stopped,
    /// Resolving endpoints and binding
    Starting,
    /// Listening for frames
    Running,
    /// Listener task is shutting down
    Stopping,
}

/// Operator-facing outcome of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    /// The session is starting (code `1`)
    Starting,
    /// A session was already running (code `0`)
    AlreadyRunning,
    /// An endpoint was invalid or startup timed out (code `-1`)
    Failed,
}

impl StartStatus {
    /// Status code shown to the operator
    pub fn code(self) -> i8 {
        match self {
            StartStatus::Starting => 1,
            StartStatus::AlreadyRunning => 0,
            StartStatus::Failed => -1,
        }
    }
}

impl<T> From<&Result<T, StartError>> for StartStatus {
    fn from(result: &Result<T, StartError>) -> Self {
        match result {
            Ok(_) => StartStatus::Starting,
            Err(StartError::AlreadyStarted) => StartStatus::AlreadyRunning,
            Err(StartError::InvalidAddress { .. } | StartError::Timeout(_)) => StartStatus::Failed,
        }
    }
}

/// Operator status code of a stop request: `1` stopping, `0` not running
pub fn stop_code(result: &Result<(), StopError>) -> i8 {
    match result {
        Ok(()) => 1,
        Err(StopError::NotRunning) => 0,
    }
}

/// Everything one session needs
#[derive(Debug, Clone)]
pub struct RedirectorConfig {
    /// Local endpoint to receive on
    pub listen: Endpoint,
    /// Where accepted datagrams are relayed
    pub forward: Option<Endpoint>,
    /// Decides which datagrams are accepted
    pub verifier: Arc<dyn FrameVerifier>,
    /// Upper bound for resolving and binding
    pub timeout: Duration,
}

impl RedirectorConfig {
    /// Open listener on `listen`, no forwarding, 5 s startup timeout
    pub fn new(listen: Endpoint) -> Self {
        Self {
            listen,
            forward: None,
            verifier: Arc::new(OpenAccess),
            timeout: Duration::from_secs(5),
        }
    }

    /// Session described by the show settings
    pub fn from_settings(settings: &ArtNetSettings) -> Self {
        let mut config = Self::new(settings.listen.clone()).with_timeout(settings.timeout());
        config.forward = settings.forward.clone();
        if let Some(key) = settings.shared_key() {
            config = config.with_key(key);
        }
        config
    }

    /// Replace endpoints with operator input of the form `<ip>[:port]`.
    ///
    /// A missing port means the Art-Net port.
    pub fn with_overrides(
        mut self,
        listen: Option<&str>,
        forward: Option<&str>,
    ) -> crate::Result<Self> {
        if let Some(listen) = listen {
            self.listen = Endpoint::parse(listen, ARTNET_PORT)?;
        }
        if let Some(forward) = forward {
            self.forward = Some(Endpoint::parse(forward, ARTNET_PORT)?);
        }
        Ok(self)
    }

    /// Relay accepted datagrams to `forward`
    pub fn with_forward(mut self, forward: Endpoint) -> Self {
        self.forward = Some(forward);
        self
    }

    /// Require the shared-key tag on every datagram
    pub fn with_key(self, key: &str) -> Self {
        self.with_verifier(SharedKey::new(key))
    }

    /// Use a custom verifier
    pub fn with_verifier(mut self, verifier: impl FrameVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    /// Set the startup timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Datagram counters of the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RedirectorStats {
    /// Datagrams written into the universe buffer
    pub accepted: u64,
    /// Malformed or unauthenticated datagrams
    pub dropped: u64,
    /// Datagrams relayed downstream
    pub forwarded: u64,
    /// Relays that failed to send
    pub forward_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    dropped: AtomicU64,
    forwarded: AtomicU64,
    forward_errors: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> RedirectorStats {
        RedirectorStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            forward_errors: self.forward_errors.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in [
            &self.accepted,
            &self.dropped,
            &self.forwarded,
            &self.forward_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// State shared with the listener task
struct Shared {
    status: watch::Sender<RedirectorStatus>,
    counters: Counters,
    last_error: Mutex<Option<String>>,
}

impl Shared {
    fn record_error(&self, reason: String) {
        *self.last_error.lock() = Some(reason);
    }

    /// Move to `to` only from `from`; false if the status was different
    fn transition(&self, from: RedirectorStatus, to: RedirectorStatus) -> bool {
        self.status.send_if_modified(|status| {
            if *status == from {
                *status = to;
                true
            } else {
                false
            }
        })
    }
}

struct Session {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

/// Owned handle of one redirector session
pub struct Redirector {
    buffer: UniverseBuffer,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl Redirector {
    /// Create a stopped redirector writing into `buffer`
    pub fn new(buffer: UniverseBuffer) -> Self {
        let (status, _) = watch::channel(RedirectorStatus::Stopped);
        Self {
            buffer,
            shared: Arc::new(Shared {
                status,
                counters: Counters::default(),
                last_error: Mutex::new(None),
            }),
            session: Mutex::new(None),
        }
    }

    /// Resolve both endpoints, bind the listen socket and spawn the listener.
    ///
    /// Fails with [`StartError::AlreadyStarted`] unless the session is
    /// `Stopped`. On any other failure the session stays `Stopped` and the
    /// reason is kept in [`Redirector::last_error`]. Dropping the future
    /// before it completes also leaves the session `Stopped`.
    pub async fn start(&self, config: RedirectorConfig) -> Result<SocketAddr, StartError> {
        if !self
            .shared
            .transition(RedirectorStatus::Stopped, RedirectorStatus::Starting)
        {
            return Err(StartError::AlreadyStarted);
        }
        let mut guard = StartGuard {
            shared: &self.shared,
            armed: true,
        };

        self.shared.counters.reset();
        *self.shared.last_error.lock() = None;

        let bound = match tokio::time::timeout(config.timeout, bind(&config)).await {
            Ok(bound) => bound,
            Err(_) => Err(StartError::Timeout(config.timeout)),
        };
        let (socket, forward, local_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                tracing::warn!("Art-Net redirector failed to start: {}", e);
                self.shared.record_error(e.to_string());
                self.shared.status.send_replace(RedirectorStatus::Stopped);
                return Err(e);
            }
        };

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(listen(
            socket,
            forward,
            config.verifier.clone(),
            self.buffer.clone(),
            self.shared.clone(),
            shutdown_rx,
        ));

        *self.session.lock() = Some(Session {
            shutdown,
            task,
            local_addr,
        });
        guard.armed = false;
        self.shared.status.send_replace(RedirectorStatus::Running);

        tracing::info!(
            "Art-Net redirector listening on {} (forward: {}, verifier: {:?})",
            local_addr,
            forward.map_or_else(|| "none".to_string(), |addr| addr.to_string()),
            config.verifier
        );

        Ok(local_addr)
    }

    /// Cancel the listener and close its socket.
    ///
    /// Stopping a session that is not `Running` returns
    /// [`StopError::NotRunning`] and changes nothing.
    pub async fn stop(&self) -> Result<(), StopError> {
        if !self
            .shared
            .transition(RedirectorStatus::Running, RedirectorStatus::Stopping)
        {
            return Err(StopError::NotRunning);
        }

        let session = self.session.lock().take();
        if let Some(session) = session {
            // The receiver is gone only if the task already ended
            let _ = session.shutdown.send(());
            if let Err(e) = session.task.await {
                tracing::warn!("Art-Net listener task ended abnormally: {}", e);
            }
        }

        self.shared.status.send_replace(RedirectorStatus::Stopped);
        tracing::info!(
            "Art-Net redirector stopped ({:?})",
            self.shared.counters.snapshot()
        );
        Ok(())
    }

    /// Current lifecycle status
    pub fn status(&self) -> RedirectorStatus {
        *self.shared.status.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<RedirectorStatus> {
        self.shared.status.subscribe()
    }

    /// Counters of the current (or last) session
    pub fn stats(&self) -> RedirectorStats {
        self.shared.counters.snapshot()
    }

    /// Reason of the last start failure or socket error
    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error.lock().clone()
    }

    /// Address the listener is bound to, while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.session.lock().as_ref().map(|session| session.local_addr)
    }

    /// Buffer the listener writes into
    pub fn buffer(&self) -> &UniverseBuffer {
        &self.buffer
    }
}

impl Drop for Redirector {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            let _ = session.shutdown.send(());
        }
    }
}

/// Puts a start that is dropped mid-flight back to `Stopped`
struct StartGuard<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if self.armed
            && self
                .shared
                .transition(RedirectorStatus::Starting, RedirectorStatus::Stopped)
        {
            tracing::debug!("Art-Net redirector start cancelled");
        }
    }
}

async fn resolve(endpoint: &Endpoint) -> Result<SocketAddr, StartError> {
    let invalid = |reason: String| StartError::InvalidAddress {
        endpoint: endpoint.to_string(),
        reason,
    };

    tokio::net::lookup_host((endpoint.ip.as_str(), endpoint.port))
        .await
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("no address found".to_string()))
}

async fn bind(
    config: &RedirectorConfig,
) -> Result<(UdpSocket, Option<SocketAddr>, SocketAddr), StartError> {
    let listen = resolve(&config.listen).await?;
    let forward = match &config.forward {
        Some(endpoint) => Some(resolve(endpoint).await?),
        None => None,
    };

    let bind_error = |e: std::io::Error| StartError::InvalidAddress {
        endpoint: config.listen.to_string(),
        reason: e.to_string(),
    };
    let socket = UdpSocket::bind(listen).await.map_err(bind_error)?;
    let local_addr = socket.local_addr().map_err(bind_error)?;

    if let Some(forward) = forward {
        if relays_to_itself(local_addr, forward).await {
            return Err(StartError::InvalidAddress {
                endpoint: config.listen.to_string(),
                reason: format!("forward endpoint {} reaches the listen socket", forward),
            });
        }
    }

    Ok((socket, forward, local_addr))
}

/// Whether datagrams sent to `forward` land back on a socket bound to `local`
async fn relays_to_itself(local: SocketAddr, forward: SocketAddr) -> bool {
    if local.port() != forward.port() {
        return false;
    }
    let (local_ip, forward_ip) = (local.ip(), forward.ip());
    if local_ip == forward_ip || forward_ip.is_unspecified() {
        return true;
    }
    if !local_ip.is_unspecified() {
        return false;
    }
    if forward_ip.is_loopback() {
        return true;
    }
    // Any address this host can bind is one of its own interfaces
    !forward_ip.is_multicast() && UdpSocket::bind((forward_ip, 0)).await.is_ok()
}

/// Verified and decoded frame, or `None` for any reason to drop it
fn accept(verifier: &dyn FrameVerifier, datagram: &[u8]) -> Option<ArtDmx> {
    let frame = verifier.verify(datagram)?;
    ArtDmx::parse(frame).ok()
}

async fn listen(
    socket: UdpSocket,
    forward: Option<SocketAddr>,
    verifier: Arc<dyn FrameVerifier>,
    buffer: UniverseBuffer,
    shared: Arc<Shared>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut recv_buf = vec![0u8; RECV_BUFFER_LEN];
    let counters = &shared.counters;

    loop {
        let (len, peer) = tokio::select! {
            _ = &mut shutdown => break,
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    tracing::warn!("Art-Net receive error: {}", e);
                    shared.record_error(e.to_string());
                    continue;
                }
            },
        };
        let datagram = &recv_buf[..len];

        let Some(frame) = accept(verifier.as_ref(), datagram) else {
            counters.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Dropped {} byte datagram from {}", len, peer);
            continue;
        };

        buffer.replace(frame.universe, &frame.data);
        counters.accepted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            "Universe {} updated from {} ({} channels)",
            frame.universe,
            peer,
            frame.data.len()
        );

        if let Some(target) = forward {
            match socket.send_to(datagram, target).await {
                Ok(_) => {
                    counters.forwarded.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    counters.forward_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Failed to forward to {}: {}", target, e);
                    shared.record_error(format!("forward to {}: {}", target, e));
                }
            }
        }
    }

    tracing::debug!("Art-Net listener task finished");
}
