use crossterm::style::Color;
use oncat_auth::{AgentError, SessionAgent};
use std::fmt::Display;

/// Callback notified with the fresh connection state.
pub type StatusObserver = Box<dyn FnMut(bool)>;

/// Tracks whether the agent can currently talk to ONCat.
///
/// Nothing is cached between probes: every [`ConnectionStatus::update_status`]
/// asks the service again and tells every observer the result.
#[derive(Default)]
pub struct ConnectionStatus {
    observers: Vec<StatusObserver>,
    last_known: Option<bool>,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(bool) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Probe the service with a facility listing. Any failure, whatever its
    /// cause, counts as disconnected.
    pub async fn is_connected<A>(agent: &A) -> bool
    where
        A: SessionAgent + ?Sized,
    {
        match agent.list_facilities().await {
            Ok(_) => true,
            Err(AgentError::InvalidRefreshToken) | Err(AgentError::LoginRequired) => {
                tracing::debug!("ONCat probe: login required");
                false
            }
            Err(e) => {
                tracing::warn!("ONCat probe failed: {}", e);
                false
            }
        }
    }

    /// Re-probe and broadcast the result to every observer.
    pub async fn update_status<A>(&mut self, agent: &A) -> bool
    where
        A: SessionAgent + ?Sized,
    {
        let connected = Self::is_connected(agent).await;
        self.last_known = Some(connected);

        tracing::info!(connected, "ONCat connection status updated");
        for observer in self.observers.iter_mut() {
            observer(connected);
        }

        connected
    }

    pub fn last_known(&self) -> Option<bool> {
        self.last_known
    }

    pub fn label(&self) -> StatusLabel {
        StatusLabel {
            connected: self.last_known.unwrap_or(false),
        }
    }
}

/// Text and colour of the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabel {
    pub connected: bool,
}

impl StatusLabel {
    pub fn color(&self) -> Color {
        if self.connected {
            Color::Green
        } else {
            Color::Red
        }
    }
}

impl Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.connected {
            f.write_str("ONCat: Connected")
        } else {
            f.write_str("ONCat: Disconnected")
        }
    }
}
