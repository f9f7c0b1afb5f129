//! HTTP interface.
//!
//! Handlers never touch controller state: every action becomes a request on
//! the [`ControllerHandle`] and the reply is mapped to a status code and a
//! plain-text or JSON body.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use modulock_core::constants::NO_UID;
use modulock_core::{Error, ErrorKind};
use modulock_engine::ControllerHandle;
use modulock_protocol::{Command, Origin, Reply};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::config::WebConfig;
use crate::error::NetworkError;
use crate::pages;

const USAGE_REGISTER: &str = "Required form fields: ra, name, uid";
const USAGE_REMOVE: &str = "Required form field: ra";

type FormFields = Result<Form<HashMap<String, String>>, FormRejection>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub controller: ControllerHandle,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(controller: ControllerHandle, auth: impl Authenticator + 'static) -> Self {
        Self {
            controller,
            auth: Arc::new(auth),
        }
    }
}

/// Build the router with every route of the web interface.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", post(login))
        .route("/dashboard", get(dashboard))
        .route("/openDoor", post(open_door))
        .route("/getUsers", get(get_users))
        .route("/register", get(register))
        .route("/registerUser", post(register_user))
        .route("/removeUser", post(remove_user))
        .route("/getLastScannedUid", get(last_scanned_uid))
        .fallback(not_found)
        .with_state(state)
}

/// HTTP status for a command error.
pub fn status_for(error: &Error) -> StatusCode {
    match error.kind() {
        ErrorKind::Validation | ErrorKind::Parse => StatusCode::BAD_REQUEST,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Persistence | ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &Error) -> Response {
    (status_for(error), error.to_string()).into_response()
}

/// `302 Found` with a `Location` header.
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

fn unauthorized() -> Response {
    error_response(&Error::Auth)
}

fn field<'a>(form: &'a FormFields, name: &str) -> Option<&'a str> {
    form.as_ref()
        .ok()
        .and_then(|Form(fields)| fields.get(name))
        .map(String::as_str)
}

fn require<'a>(form: &'a FormFields, name: &str, usage: &str) -> Result<&'a str, Error> {
    field(form, name).ok_or_else(|| Error::parse(format!("missing parameter '{name}'"), usage))
}

/// Submit a command and render its reply, or map its error to a status.
async fn execute(
    state: &AppState,
    command: Command,
    render: impl FnOnce(Reply) -> Response,
) -> Response {
    let kind = command.kind();
    match state.controller.execute(Origin::Web, command).await {
        Ok(reply) => render(reply),
        Err(e) => {
            debug!(command = %kind, error = %e, "Web command failed");
            error_response(&e)
        }
    }
}

fn unexpected(reply: Reply) -> Response {
    warn!(?reply, "Unexpected reply");
    (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected reply").into_response()
}

/// `GET /`
async fn root(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.auth.is_authenticated(&headers) {
        return found("/dashboard");
    }
    Html(pages::login_page()).into_response()
}

/// `POST /login`
async fn login(State(state): State<AppState>, form: FormFields) -> Response {
    let (Some(username), Some(password)) = (field(&form, "username"), field(&form, "password"))
    else {
        debug!("Login form without credentials");
        return found("/?error=1");
    };

    if !state.auth.verify_login(username, password) {
        warn!(username, "Login rejected");
        return found("/?error=1");
    }

    info!(username, "Administrator logged in");
    (
        StatusCode::FOUND,
        [
            (LOCATION, "/dashboard".to_string()),
            (SET_COOKIE, state.auth.session_cookie()),
        ],
    )
        .into_response()
}

/// `GET /dashboard`
async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.auth.is_authenticated(&headers) {
        return found("/?error=2");
    }
    Html(pages::dashboard_page(state.auth.cookie_name())).into_response()
}

/// `GET /register`
async fn register(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.auth.is_authenticated(&headers) {
        return found("/?error=2");
    }
    Html(pages::register_page()).into_response()
}

/// `POST /openDoor`
async fn open_door(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.auth.is_authenticated(&headers) {
        return unauthorized();
    }
    execute(&state, Command::OpenDoor, |reply| match reply {
        Reply::DoorOpened => "Door opened successfully".into_response(),
        other => unexpected(other),
    })
    .await
}

/// `GET /getUsers`
async fn get_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.auth.is_authenticated(&headers) {
        return unauthorized();
    }
    execute(&state, Command::GetUsers, |reply| match reply {
        Reply::Roster(roster) => Json(roster).into_response(),
        other => unexpected(other),
    })
    .await
}

/// `POST /registerUser`
async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: FormFields,
) -> Response {
    if !state.auth.is_authenticated(&headers) {
        return unauthorized();
    }

    let command = match add_user_command(&form) {
        Ok(command) => command,
        Err(e) => return error_response(&e),
    };

    execute(&state, command, |reply| match reply {
        Reply::UserAdded(credential) => format!(
            "User {} (RA: {}) registered successfully",
            credential.name, credential.ra
        )
        .into_response(),
        other => unexpected(other),
    })
    .await
}

fn add_user_command(form: &FormFields) -> Result<Command, Error> {
    Ok(Command::AddUser {
        ra: require(form, "ra", USAGE_REGISTER)?.to_string(),
        name: require(form, "name", USAGE_REGISTER)?.to_string(),
        uid: require(form, "uid", USAGE_REGISTER)?.to_string(),
    })
}

/// `POST /removeUser`
async fn remove_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: FormFields,
) -> Response {
    if !state.auth.is_authenticated(&headers) {
        return unauthorized();
    }

    let ra = match require(&form, "ra", USAGE_REMOVE) {
        Ok(ra) => ra.to_string(),
        Err(e) => return error_response(&e),
    };

    execute(&state, Command::RemoveUser { ra }, |reply| match reply {
        Reply::UserRemoved(ra) => format!("User with RA '{ra}' removed successfully").into_response(),
        other => unexpected(other),
    })
    .await
}

/// `GET /getLastScannedUid`
async fn last_scanned_uid(State(state): State<AppState>) -> Response {
    match state.controller.last_scanned_uid().await {
        Ok(Some(uid)) => uid.to_string().into_response(),
        Ok(None) => NO_UID.into_response(),
        Err(e) => error_response(&e),
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Page not found").into_response()
}

/// HTTP listener serving [`build_router`].
pub struct WebServer {
    listener: TcpListener,
    router: Router,
}

impl WebServer {
    pub async fn bind(config: &WebConfig, state: AppState) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|_| NetworkError::BindFailed(config.bind_addr))?;

        info!(addr = %listener.local_addr()?, "Web interface listening");

        Ok(Self {
            listener,
            router: build_router(state),
        })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr, NetworkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then finish in-flight requests.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), NetworkError> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Web interface stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modulock_core::CredentialKey;
    use rstest::rstest;

    #[rstest]
    #[case(Error::validation("RA must not be empty"), StatusCode::BAD_REQUEST)]
    #[case(Error::parse("missing parameter 'ra'", USAGE_REMOVE), StatusCode::BAD_REQUEST)]
    #[case(Error::Auth, StatusCode::UNAUTHORIZED)]
    #[case(Error::NotFound { ra: "R9".to_string() }, StatusCode::NOT_FOUND)]
    #[case(Error::Conflict { key: CredentialKey::Ra, value: "R1".to_string() }, StatusCode::CONFLICT)]
    #[case(Error::persistence("disk full"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(Error::Unavailable, StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(status_for(&error), status);
    }
}
