//! Line-oriented text console over TCP.
//!
//! Each session reads newline-terminated commands, submits them to the
//! controller and writes one reply line per command. Activity notices are
//! interleaved as they happen.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use modulock_engine::{ControllerHandle, Notice};
use modulock_protocol::{CommandLineCodec, Origin, render_text};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, broadcast};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ConsoleConfig;
use crate::error::NetworkError;

/// Sent to a client turned away because every session slot is taken.
pub const BUSY_LINE: &str = "ERR: Too many console sessions";

/// TCP listener for console sessions.
pub struct ConsoleServer {
    listener: TcpListener,
    config: ConsoleConfig,
    controller: ControllerHandle,
    slots: Arc<Semaphore>,
}

impl ConsoleServer {
    pub async fn bind(config: ConsoleConfig, controller: ControllerHandle) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|_| NetworkError::BindFailed(config.bind_addr))?;

        info!(
            addr = %listener.local_addr()?,
            max_connections = config.max_connections,
            "Console listening"
        );

        Ok(Self {
            listener,
            slots: Arc::new(Semaphore::new(config.max_connections)),
            config,
            controller,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept sessions until `shutdown` is cancelled.
    ///
    /// Open sessions observe the same token and close with the listener.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), NetworkError> {
        loop {
            let (stream, addr) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted?,
            };

            let Ok(permit) = self.slots.clone().try_acquire_owned() else {
                warn!(
                    %addr,
                    max_connections = self.config.max_connections,
                    "Console session rejected: maximum connections reached"
                );
                let mut framed = Framed::new(stream, CommandLineCodec::new());
                let _ = framed.send(BUSY_LINE.to_string()).await;
                continue;
            };

            if let Err(e) = stream.set_nodelay(true) {
                warn!(%addr, error = %e, "Failed to set TCP_NODELAY");
            }

            let session = Session {
                framed: Framed::new(
                    stream,
                    CommandLineCodec::with_max_line_length(self.config.max_line_length),
                ),
                addr,
                controller: self.controller.clone(),
                notices: self.controller.subscribe(),
            };
            let shutdown = shutdown.clone();

            tokio::spawn(async move {
                session.run(shutdown).await;
                drop(permit);
            });
        }

        info!("Console stopped");
        Ok(())
    }
}

struct Session {
    framed: Framed<TcpStream, CommandLineCodec>,
    addr: SocketAddr,
    controller: ControllerHandle,
    notices: broadcast::Receiver<Notice>,
}

impl Session {
    async fn run(mut self, shutdown: CancellationToken) {
        info!(addr = %self.addr, "Console session opened");

        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => break,
                frame = self.framed.next() => match frame {
                    Some(Ok(Ok(command))) => {
                        debug!(addr = %self.addr, command = %command.kind(), "Console command");
                        render_text(&self.controller.execute(Origin::Console, command).await)
                    }
                    Some(Ok(Err(e))) => render_text(&Err(e)),
                    Some(Err(e)) => {
                        warn!(addr = %self.addr, error = %e, "Console read failed");
                        break;
                    }
                    None => break,
                },
                notice = self.notices.recv() => match notice {
                    Ok(notice) => notice.to_string(),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(addr = %self.addr, skipped, "Console session lagging behind notices");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            if let Err(e) = self.framed.send(line).await {
                error!(addr = %self.addr, error = %e, "Console write failed");
                break;
            }
        }

        info!(addr = %self.addr, "Console session closed");
    }
}
