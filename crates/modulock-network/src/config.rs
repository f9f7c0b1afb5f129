//! Front-end configuration.

use std::net::SocketAddr;

use modulock_core::constants::DEFAULT_MAX_LINE_LENGTH;

/// HTTP interface configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind the HTTP listener
    pub bind_addr: SocketAddr,

    /// Administrator login name
    pub admin_username: String,

    /// Administrator password
    pub admin_password: String,

    /// Name of the session cookie
    pub session_cookie: String,

    /// Value written into the session cookie on login
    pub session_value: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            admin_username: "admin".to_string(),
            admin_password: "123".to_string(),
            session_cookie: "session_id".to_string(),
            session_value: "admin_session".to_string(),
        }
    }
}

impl WebConfig {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_username = username.into();
        self.admin_password = password.into();
        self
    }

    pub fn session_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self.session_value = value.into();
        self
    }
}

/// Text console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Address to bind the console listener
    pub bind_addr: SocketAddr,

    /// Maximum simultaneous sessions
    pub max_connections: usize,

    /// Longest accepted command line, in bytes
    pub max_line_length: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 2323)),
            max_connections: 4,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ConsoleConfig {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let web = WebConfig::default();
        assert_eq!(web.bind_addr.port(), 8080);
        assert_eq!(web.admin_username, "admin");
        assert_eq!(web.session_cookie, "session_id");

        let console = ConsoleConfig::default();
        assert_eq!(console.bind_addr.port(), 2323);
        assert_eq!(console.max_connections, 4);
        assert_eq!(console.max_line_length, 256);
    }
}
