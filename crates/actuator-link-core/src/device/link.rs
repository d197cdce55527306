//! Reconnecting device link.
//!
//! A [`DeviceLink`] owns a background task that keeps one WebSocket session
//! open to the device. Every inbound message is dispatched to a [`LinkView`];
//! outbound messages are queued to the task and written to the open socket.
//! When the socket closes (or an attempt to open it fails) the task waits a
//! fixed delay and tries again, forever, until the link is shut down.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::device::connection::Connection;
use crate::error::{CoreError, LinkError};
use crate::panel::{dispatch, LinkView};
use crate::protocol::{ButtonAction, OutboundMessage, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a running device link.
///
/// Dropping the handle cancels the link; [`DeviceLink::shutdown`] also waits
/// for the socket to be closed.
pub struct DeviceLink {
    url: String,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    state: watch::Receiver<LinkState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DeviceLink {
    /// Start the link task. Must be called from within a tokio runtime.
    pub fn spawn<V: LinkView>(config: &LinkConfig, view: V) -> Result<Self, CoreError> {
        let url = config.url()?;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
        let cancel = CancellationToken::new();

        let task = LinkTask {
            url: url.clone(),
            connect_timeout: config.connect_timeout(),
            retry_delay: config.retry_delay(),
            view,
            outbound: outbound_rx,
            state: state_tx,
            cancel: cancel.clone(),
        };

        Ok(Self {
            url,
            outbound: outbound_tx,
            state: state_rx,
            cancel,
            task: Some(tokio::spawn(task.run())),
        })
    }

    /// Endpoint this link connects to.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// Wait until the link is connected, up to `limit`.
    pub async fn wait_connected(&self, limit: Duration) -> Result<(), LinkError> {
        let mut state = self.state.clone();
        timeout(limit, state.wait_for(|s| *s == LinkState::Connected))
            .await
            .map_err(|_| LinkError::NotConnected)?
            .map_err(|_| LinkError::Closed)?;
        Ok(())
    }

    /// Queue a message for the open socket.
    ///
    /// Messages are never held across a reconnect: sending while the link is
    /// not connected fails with [`LinkError::NotConnected`], and anything
    /// still queued when the socket closes is dropped.
    pub fn send(&self, message: OutboundMessage) -> Result<(), LinkError> {
        if self.state() != LinkState::Connected {
            warn!(url = %self.url, ?message, "dropping message, link not connected");
            return Err(LinkError::NotConnected);
        }

        self.outbound.send(message).map_err(|_| LinkError::Closed)
    }

    pub fn send_button(&self, action: ButtonAction) -> Result<(), LinkError> {
        self.send(OutboundMessage::button(action))
    }

    pub fn send_settings(&self, settings: Settings) -> Result<(), LinkError> {
        self.send(OutboundMessage::Settings(settings))
    }

    /// Cancel the link and wait for the task to finish.
    ///
    /// An open socket is closed with a close frame; a pending reconnect is
    /// abandoned.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(url = %self.url, error = %e, "device link task failed");
            }
        }
    }
}

impl Drop for DeviceLink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Closed,
    Cancelled,
}

struct LinkTask<V> {
    url: String,
    connect_timeout: Duration,
    retry_delay: Duration,
    view: V,
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    state: watch::Sender<LinkState>,
    cancel: CancellationToken,
}

impl<V: LinkView> LinkTask<V> {
    async fn run(mut self) {
        loop {
            self.set_state(LinkState::Connecting);
            info!(url = %self.url, "trying to open websocket connection");

            let opened = tokio::select! {
                _ = self.cancel.cancelled() => break,
                opened = Connection::open(&self.url, self.connect_timeout) => opened,
            };

            match opened {
                Ok(conn) => {
                    self.drop_queued("queued before connect");
                    self.set_state(LinkState::Connected);
                    info!(url = %self.url, "connection opened");

                    let end = self.run_session(conn).await;

                    self.set_state(LinkState::Disconnected);
                    self.drop_queued("queued when connection closed");
                    if end == SessionEnd::Cancelled {
                        break;
                    }
                    info!(url = %self.url, "connection closed");
                }
                Err(e) => {
                    self.set_state(LinkState::Disconnected);
                    warn!(url = %self.url, error = %e, "connection failed");
                }
            }

            debug!(
                url = %self.url,
                delay_ms = self.retry_delay.as_millis() as u64,
                "scheduling reconnect"
            );
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.retry_delay) => {}
            }
        }

        self.set_state(LinkState::Disconnected);
        debug!(url = %self.url, "device link stopped");
    }

    async fn run_session(&mut self, conn: Connection) -> SessionEnd {
        let (mut sink, mut stream) = conn.split();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    sink.close().await;
                    return SessionEnd::Cancelled;
                }
                inbound = stream.next_message() => match inbound {
                    Some(Ok(message)) => {
                        if !dispatch(&mut self.view, &message) {
                            debug!(url = %self.url, "ignoring message of unknown type");
                        }
                    }
                    Some(Err(e)) => {
                        warn!(url = %self.url, error = %e, "dropping malformed message");
                    }
                    None => return SessionEnd::Closed,
                },
                Some(message) = self.outbound.recv() => {
                    if let Err(e) = sink.send(&message).await {
                        warn!(url = %self.url, error = %e, "send failed, closing session");
                        return SessionEnd::Closed;
                    }
                }
            }
        }
    }

    fn set_state(&mut self, state: LinkState) {
        if *self.state.borrow() == state {
            return;
        }
        self.state.send_replace(state);
        self.view.state_changed(state);
    }

    fn drop_queued(&mut self, reason: &str) {
        while let Ok(message) = self.outbound.try_recv() {
            warn!(url = %self.url, ?message, reason, "dropping outbound message");
        }
    }
}
