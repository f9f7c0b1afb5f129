//! The control loop.
//!
//! [`Controller`] is the single owner of the roster, the scan session and
//! the actuator timers. Each [`step`](Controller::step) performs, in order:
//!
//! 1. advance the actuator timers,
//! 2. poll the card reader (check, read, decide, release),
//! 3. apply up to `max_requests_per_tick` queued channel requests,
//! 4. write changed output levels to the hardware.
//!
//! Nothing in a step blocks. Channel front-ends never touch the state
//! directly; they hold a cloneable [`ControllerHandle`] that enqueues
//! requests and awaits the reply.

use std::time::Instant;

use modulock_core::{Channel, Error, Result, Uid};
use modulock_hardware::{ActuatorOutputs, CardReader};
use modulock_protocol::{Command, Origin, Reply};
use modulock_storage::CredentialStore;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::actuator::ActuatorScheduler;
use crate::authorization::{AuthorizationEngine, Decision};
use crate::config::ControllerConfig;
use crate::dispatcher::CommandDispatcher;
use crate::notice::{Notice, NoticeKind};
use crate::scan_session::ScanSession;
use crate::state_machine::{ScanState, ScanStateMachine};

/// Request from a channel front-end to the control loop.
#[derive(Debug)]
pub enum ControlRequest {
    /// Run an administrative command.
    Execute {
        origin: Origin,
        command: Command,
        reply: oneshot::Sender<Result<Reply>>,
    },

    /// Read the last scanned UID, if still fresh.
    LastScannedUid { reply: oneshot::Sender<Option<Uid>> },
}

/// What a single step did, for tests and tracing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Channels whose pulse ended this step
    pub expired: Vec<Channel>,

    /// Decision for a card scanned this step
    pub decision: Option<Decision>,

    /// Number of channel requests applied
    pub requests: usize,
}

/// Cloneable entry point for channel front-ends.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    requests: mpsc::Sender<ControlRequest>,
    notices: broadcast::Sender<Notice>,
}

impl ControllerHandle {
    /// Submit `command` and wait for the loop to apply it.
    ///
    /// # Errors
    ///
    /// Returns the command's own error, or `Error::Unavailable` if the
    /// control loop has stopped.
    pub async fn execute(&self, origin: Origin, command: Command) -> Result<Reply> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(ControlRequest::Execute {
                origin,
                command,
                reply,
            })
            .await
            .map_err(|_| Error::Unavailable)?;
        response.await.map_err(|_| Error::Unavailable)?
    }

    /// The last scanned UID, or `None` if nothing was scanned within the
    /// staleness window.
    pub async fn last_scanned_uid(&self) -> Result<Option<Uid>> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(ControlRequest::LastScannedUid { reply })
            .await
            .map_err(|_| Error::Unavailable)?;
        response.await.map_err(|_| Error::Unavailable)
    }

    /// Subscribe to activity notices published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }
}

/// Owner of all access-control state.
pub struct Controller {
    config: ControllerConfig,
    store: CredentialStore,
    actuators: ActuatorScheduler,
    session: ScanSession,
    machine: ScanStateMachine,
    reader: Box<dyn CardReader>,
    outputs: Box<dyn ActuatorOutputs>,
    applied: [bool; 3],
    requests: mpsc::Receiver<ControlRequest>,
    notices: broadcast::Sender<Notice>,
}

impl Controller {
    /// Build a controller around a loaded store and its peripherals.
    pub fn new(
        config: ControllerConfig,
        store: CredentialStore,
        reader: impl CardReader + 'static,
        outputs: impl ActuatorOutputs + 'static,
    ) -> (Self, ControllerHandle) {
        let (request_tx, request_rx) = mpsc::channel(config.request_queue_depth);
        let (notice_tx, _) = broadcast::channel(config.notice_capacity);

        let controller = Self {
            actuators: ActuatorScheduler::from_config(&config),
            session: ScanSession::from_config(&config),
            machine: ScanStateMachine::new(),
            config,
            store,
            reader: Box::new(reader),
            outputs: Box::new(outputs),
            applied: [false; 3],
            requests: request_rx,
            notices: notice_tx.clone(),
        };

        let handle = ControllerHandle {
            requests: request_tx,
            notices: notice_tx,
        };

        (controller, handle)
    }

    /// Run one loop iteration at time `now`.
    pub fn step(&mut self, now: Instant) -> StepReport {
        let expired = self.actuators.advance(now);
        let decision = self.poll_reader(now);
        let requests = self.drain_requests(now);
        self.sync_outputs();

        StepReport {
            expired,
            decision,
            requests,
        }
    }

    /// Tick until `shutdown` resolves, then release every output.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            tick_ms = self.config.tick_interval.as_millis() as u64,
            users = self.store.len(),
            "Controller loop started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.step(tokio::time::Instant::now().into_std());
                }
            }
        }

        self.requests.close();
        self.release_outputs();
        info!("Controller loop stopped");
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn actuators(&self) -> &ActuatorScheduler {
        &self.actuators
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn state_machine(&self) -> &ScanStateMachine {
        &self.machine
    }

    fn poll_reader(&mut self, now: Instant) -> Option<Decision> {
        if !self.reader.detect() {
            return None;
        }
        self.transition(ScanState::Detected, now);

        let read = self.reader.read_id();
        self.reader.release();

        let uid = match read.map(|raw| Uid::from_bytes(&raw)) {
            Ok(Ok(uid)) => uid,
            Ok(Err(e)) => {
                warn!(error = %e, "Card returned no identifier");
                self.transition(ScanState::Idle, now);
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Card read failed");
                self.transition(ScanState::Idle, now);
                return None;
            }
        };

        self.session.record_scan(uid.clone(), now);
        let decision = AuthorizationEngine::new(&self.store).check(&uid);

        match &decision {
            Decision::Admit(name) => {
                self.actuators.trigger(Channel::Lock, now);
                self.actuators.trigger(Channel::OkIndicator, now);
                self.transition(ScanState::Admitted, now);
                info!(%uid, name = %name, "Access granted");
                self.publish(NoticeKind::ScanAdmitted {
                    name: name.clone(),
                    uid,
                });
            }
            Decision::Deny => {
                self.actuators.trigger(Channel::AlertIndicator, now);
                self.transition(ScanState::Denied, now);
                info!(%uid, "Access denied");
                self.publish(NoticeKind::ScanDenied { uid });
            }
        }

        self.transition(ScanState::Idle, now);
        Some(decision)
    }

    fn drain_requests(&mut self, now: Instant) -> usize {
        let mut applied = 0;
        while applied < self.config.max_requests_per_tick {
            let Ok(request) = self.requests.try_recv() else {
                break;
            };
            self.apply(request, now);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, request: ControlRequest, now: Instant) {
        match request {
            ControlRequest::Execute {
                origin,
                command,
                reply,
            } => {
                let kind = command.kind();
                let opens_door = matches!(command, Command::OpenDoor);
                let result =
                    CommandDispatcher::new(&mut self.store, &mut self.actuators).dispatch(command, now);

                match &result {
                    Ok(_) => info!(%origin, command = %kind, "Command applied"),
                    Err(e) => warn!(%origin, command = %kind, error = %e, "Command failed"),
                }
                if opens_door && result.is_ok() {
                    self.publish(NoticeKind::DoorOpened { origin });
                }

                if reply.send(result).is_err() {
                    debug!(%origin, command = %kind, "Requester went away before the reply");
                }
            }
            ControlRequest::LastScannedUid { reply } => {
                let _ = reply.send(self.session.last_uid(now).cloned());
            }
        }
    }

    fn sync_outputs(&mut self) {
        for channel in Channel::ALL {
            let level = self.actuators.is_active(channel);
            if self.applied[channel.index()] != level {
                self.write_output(channel, level);
            }
        }
    }

    fn release_outputs(&mut self) {
        for channel in Channel::ALL {
            if self.applied[channel.index()] {
                self.write_output(channel, false);
            }
        }
    }

    fn write_output(&mut self, channel: Channel, level: bool) {
        match self.outputs.set(channel, level) {
            Ok(()) => self.applied[channel.index()] = level,
            // Left unapplied so the next step retries.
            Err(e) => error!(%channel, level, error = %e, "Failed to drive output"),
        }
    }

    fn transition(&mut self, state: ScanState, now: Instant) {
        match self.machine.transition_to(state, now) {
            Ok(transition) => trace!(from = %transition.from, to = %transition.to, "Scan state"),
            Err(e) => {
                error!(error = %e, "Scan state machine out of sync, resetting");
                self.machine.reset();
            }
        }
    }

    fn publish(&self, kind: NoticeKind) {
        if self.notices.send(Notice::new(kind)).is_err() {
            trace!("No notice subscribers");
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("store", &self.store)
            .field("state", &self.machine.current_state())
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}
