use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while setting up or running a front-end listener.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Failed to bind to {0}")]
    BindFailed(SocketAddr),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
