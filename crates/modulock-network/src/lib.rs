//! Network front-ends of the modulock access controller.
//!
//! Two independent channels funnel into the same
//! [`ControllerHandle`](modulock_engine::ControllerHandle):
//!
//! - [`web`]: an axum HTTP interface with a login page, a dashboard and a
//!   registration-assist page, guarded by a pluggable [`Authenticator`]
//! - [`console`]: a TCP text console speaking `OPEN DOOR`, `ADD USER`,
//!   `REMOVE USER` and `GET USERS`, one command per line
//!
//! Neither front-end holds controller state; both only enqueue requests and
//! render the replies.

pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod pages;
pub mod web;

pub use auth::{Authenticator, PresenceCookieAuth};
pub use config::{ConsoleConfig, WebConfig};
pub use console::ConsoleServer;
pub use error::NetworkError;
pub use web::{AppState, WebServer, build_router};
