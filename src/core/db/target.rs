/// Connection Target Module
///
/// Parses the single host specifier string accepted by `connect` into
/// its host, port and socket-path components. The grammar is the classic
/// client-library one:
///
/// ```text
/// hostname:port:/path/to/socket
/// hostname:port
/// hostname:/path/to/socket
/// hostname
/// :/path/to/socket
/// ```
///
/// A missing specifier means the driver's built-in default target.
use serde::{Deserialize, Serialize};

/// Protocol-standard port used when the specifier names none.
pub const DEFAULT_PORT: u16 = 3306;

/// Parsed connection target. Derived once from a specifier string and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionTarget {
    /// Host name, absent when the specifier starts with `:` or only
    /// names a socket path
    pub host: Option<String>,
    /// TCP port, `DEFAULT_PORT` unless the specifier names one
    pub port: u16,
    /// Unix socket path, absent unless the specifier names one
    pub socket: Option<String>,
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        ConnectionTarget {
            host: None,
            port: DEFAULT_PORT,
            socket: None,
        }
    }
}

impl ConnectionTarget {
    /// Parses an optional specifier string.
    ///
    /// `None` yields the default target. Consecutive `:` delimiters
    /// collapse, a leading `:` means the host is absent, and a token
    /// starting with `/` is the socket path. Port parsing is permissive:
    /// the leading decimal digit run is taken as the port and anything
    /// else degrades to 0 — a known weak spot kept for compatibility
    /// with the permissive numeric parse in existing deployments, not a
    /// validation layer.
    pub fn parse(spec: Option<&str>) -> Self {
        match spec {
            Some(spec) => Self::parse_spec(spec),
            None => ConnectionTarget::default(),
        }
    }

    fn parse_spec(spec: &str) -> Self {
        let mut target = ConnectionTarget::default();

        if !spec.contains(':') {
            if !spec.is_empty() {
                target.host = Some(spec.to_string());
            }
            return target;
        }

        let mut tokens = spec.split(':').filter(|token| !token.is_empty());
        if !spec.starts_with(':') {
            target.host = tokens.next().map(str::to_string);
        }
        match tokens.next() {
            Some(token) if token.starts_with('/') => {
                target.socket = Some(token.to_string());
            }
            Some(token) => {
                target.port = permissive_port(token);
                target.socket = tokens.next().map(str::to_string);
            }
            None => {}
        }
        target
    }
}

/// `atoi`-style port parse: the leading digit run, 0 on anything else
/// (including values that overflow a port number).
fn permissive_port(token: &str) -> u16 {
    let digits = token
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    token[..digits].parse().unwrap_or(0)
}
