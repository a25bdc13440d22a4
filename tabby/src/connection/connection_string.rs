use crate::common::{INVALID_DATABASE_NAME_CHARS, MAX_DATABASE_NAME_LEN};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A parsed `scheme://host[:port]/databaseName` address.
///
/// The scheme selects the store module, the database name selects the
/// database inside that store. Query strings are not supported.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionString {
    scheme: String,
    host: String,
    port: Option<u16>,
    database: String,
}

impl ConnectionString {
    pub fn parse(uri: &str) -> TabbyResult<ConnectionString> {
        let uri = uri.trim();
        let Some((scheme, rest)) = uri.split_once("://") else {
            return invalid(uri, "missing '://' after the scheme");
        };

        let scheme = scheme.to_ascii_lowercase();
        if !valid_scheme(&scheme) {
            return invalid(uri, "scheme must start with a letter and hold only letters, digits, '+', '-' or '.'");
        }
        if rest.contains('?') || rest.contains('#') {
            return invalid(uri, "query strings and fragments are not supported");
        }

        let Some((authority, database)) = rest.split_once('/') else {
            return invalid(uri, "missing database name");
        };
        let (host, port) = split_authority(uri, authority)?;
        validate_database_name(uri, database)?;

        Ok(ConnectionString {
            scheme,
            host: host.to_string(),
            port,
            database: database.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl FromStr for ConnectionString {
    type Err = TabbyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectionString::parse(s)
    }
}

impl Display for ConnectionString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}/{}", self.scheme, self.host, port, self.database),
            None => write!(f, "{}://{}/{}", self.scheme, self.host, self.database),
        }
    }
}

fn invalid<T>(uri: &str, problem: &str) -> TabbyResult<T> {
    log::error!("Invalid connection string {}: {}", uri, problem);
    Err(TabbyError::new(
        &format!("Invalid connection string '{}': {}", uri, problem),
        ErrorKind::InvalidConnectionString,
    ))
}

fn valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn split_authority<'a>(uri: &str, authority: &'a str) -> TabbyResult<(&'a str, Option<u16>)> {
    // bracketed ipv6 literal, e.g. [::1]:27017
    let (host, port) = if let Some(stripped) = authority.strip_prefix('[') {
        let Some((host, after)) = stripped.split_once(']') else {
            return invalid(uri, "unterminated '[' in host");
        };
        match after {
            "" => (host, None),
            _ => match after.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return invalid(uri, "unexpected characters after host"),
            },
        }
    } else {
        match authority.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return invalid(uri, "missing host");
    }
    if host.contains('@') {
        return invalid(uri, "credentials are not supported");
    }

    let port = match port {
        None => None,
        Some(port) => match port.parse::<u16>() {
            Ok(0) | Err(_) => return invalid(uri, "port must be a number between 1 and 65535"),
            Ok(port) => Some(port),
        },
    };
    Ok((host, port))
}

fn validate_database_name(uri: &str, database: &str) -> TabbyResult<()> {
    if database.is_empty() {
        return invalid(uri, "missing database name");
    }
    if database.len() > MAX_DATABASE_NAME_LEN {
        return invalid(
            uri,
            &format!("database name is longer than {} bytes", MAX_DATABASE_NAME_LEN),
        );
    }
    if database
        .chars()
        .any(|c| c.is_whitespace() || INVALID_DATABASE_NAME_CHARS.contains(&c))
    {
        return invalid(uri, "database name contains a forbidden character");
    }
    Ok(())
}
