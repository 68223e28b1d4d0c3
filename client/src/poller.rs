//! Liveness polling for an issued attendance session.
//!
//! A [`SessionView`] owns at most one [`PollerHandle`]. Each handle drives one
//! spawned task that asks the issuer for the session's remaining time on a
//! fixed interval and publishes [`PollSnapshot`]s on a watch channel. The
//! task stops when the session expires (under [`ExpiryPolicy::Stop`]) or when
//! the handle is cancelled, dropped, or replaced by a new generation.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, IssuedSession};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::IssueRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Stop polling once the session has expired.
    #[default]
    Stop,
    /// Issue a fresh session with the same parameters and keep polling it.
    Regenerate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active { remaining_secs: u64 },
    /// Terminal.
    Expired,
}

/// What a view renders for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSnapshot {
    pub token: String,
    pub qr_code_url: String,
    pub state: SessionState,
    /// Presentation hint only.
    pub expiring_soon: bool,
}

impl PollSnapshot {
    fn active(session: &IssuedSession, remaining_secs: u64, low_water_mark: u64) -> Self {
        Self {
            token: session.qr_data.clone(),
            qr_code_url: session.qr_code_url.clone(),
            state: SessionState::Active { remaining_secs },
            expiring_soon: remaining_secs <= low_water_mark,
        }
    }

    fn expired(self) -> Self {
        Self {
            state: SessionState::Expired,
            expiring_soon: false,
            ..self
        }
    }

    pub fn is_expired(&self) -> bool {
        self.state == SessionState::Expired
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: Duration,
    pub low_water_mark: u64,
    pub policy: ExpiryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            low_water_mark: 5,
            policy: ExpiryPolicy::Stop,
        }
    }
}

impl From<&ClientConfig> for PollerConfig {
    fn from(c: &ClientConfig) -> Self {
        Self {
            interval: c.poll_interval,
            low_water_mark: c.expiring_soon_secs,
            policy: c.expiry_policy,
        }
    }
}

/// Owns one polling task. Cancels it on drop.
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    snapshots: watch::Receiver<PollSnapshot>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Starts polling `session`, which was just issued for `request`.
    pub fn spawn(
        api: ApiClient,
        request: IssueRequest,
        session: IssuedSession,
        config: PollerConfig,
    ) -> Self {
        let initial = PollSnapshot::active(&session, session.expires_in, config.low_water_mark);
        let (tx, rx) = watch::channel(initial);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(api, request, session, config, tx, cancel.clone()));

        Self {
            cancel,
            snapshots: rx,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> PollSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the polling task has exited, by expiry or cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    api: ApiClient,
    request: IssueRequest,
    mut session: IssuedSession,
    config: PollerConfig,
    tx: watch::Sender<PollSnapshot>,
    cancel: CancellationToken,
) {
    let period = config.interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(token = %session.qr_data, "poller started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            res = api.qr_status(&session.qr_data) => res,
        };

        match status {
            Ok(s) if s.active => {
                tx.send_replace(PollSnapshot::active(
                    &session,
                    s.time_remaining,
                    config.low_water_mark,
                ));
            }
            Ok(_) => {
                info!(token = %session.qr_data, "attendance session expired");
                if config.policy == ExpiryPolicy::Stop {
                    let last = tx.borrow().clone();
                    tx.send_replace(last.expired());
                    break;
                }

                let issued = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    res = api.generate_qr(&request) => res,
                };
                match issued {
                    Ok(next) => {
                        info!(token = %next.qr_data, "regenerated attendance session");
                        tx.send_replace(PollSnapshot::active(
                            &next,
                            next.expires_in,
                            config.low_water_mark,
                        ));
                        session = next;
                        ticker.reset();
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to regenerate attendance session");
                        let last = tx.borrow().clone();
                        tx.send_replace(last.expired());
                        break;
                    }
                }
            }
            Err(e @ (ClientError::Domain(_) | ClientError::Status(401 | 403))) => {
                warn!(token = %session.qr_data, error = %e, "qr-status refused, treating session as expired");
                let last = tx.borrow().clone();
                tx.send_replace(last.expired());
                break;
            }
            Err(e) => {
                warn!(token = %session.qr_data, error = %e, "qr-status poll failed");
            }
        }
    }

    debug!(token = %session.qr_data, "poller stopped");
}

/// The admin's "generate attendance QR" view: at most one live session.
pub struct SessionView {
    api: ApiClient,
    config: PollerConfig,
    current: Option<PollerHandle>,
}

impl SessionView {
    pub fn new(api: ApiClient, config: PollerConfig) -> Self {
        Self {
            api,
            config,
            current: None,
        }
    }

    /// Validates `request` and issues a new session. Once issued, any running
    /// poller is cancelled and the new session is polled instead.
    ///
    /// A failed validation or issuance leaves the current session untouched.
    pub async fn generate(&mut self, request: IssueRequest) -> Result<IssuedSession, ClientError> {
        let session = self.api.generate_qr(&request).await?;
        self.teardown();

        self.current = Some(PollerHandle::spawn(
            self.api.clone(),
            request,
            session.clone(),
            self.config,
        ));
        Ok(session)
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<PollSnapshot>> {
        self.current.as_ref().map(PollerHandle::subscribe)
    }

    pub fn snapshot(&self) -> Option<PollSnapshot> {
        self.current.as_ref().map(PollerHandle::snapshot)
    }

    pub fn handle(&self) -> Option<&PollerHandle> {
        self.current.as_ref()
    }

    /// Stops polling. No status request is started after this returns.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }
}

impl Drop for SessionView {
    fn drop(&mut self) {
        self.teardown();
    }
}
