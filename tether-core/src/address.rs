//! Destination argument parsing.
//!
//! `user@host:path` selects remote mode, anything else is a local path.
//! When several `@`/`:` split points exist the right-most `@` that still
//! leaves a non-empty `host:path` wins, and the host extends to the last `:`.

use std::path::{Path, PathBuf};

use crate::error::AddressError;
use crate::types::{Credential, Destination, RemoteEndpoint};

/// `~/.ssh/id_rsa`
pub fn default_key_path(home: &Path) -> PathBuf {
    home.join(".ssh").join("id_rsa")
}

/// Split `user@host:path` into its parts, or `None` for a local path.
pub fn split_remote(arg: &str) -> Option<(&str, &str, &str)> {
    for (at, _) in arg.rmatch_indices('@') {
        let user = &arg[..at];
        let rest = &arg[at + 1..];
        let Some(colon) = rest.rfind(':') else { continue };
        let host = &rest[..colon];
        let path = &rest[colon + 1..];
        if !user.is_empty() && !host.is_empty() && !path.is_empty() {
            return Some((user, host, path));
        }
    }
    None
}

/// Interpret the destination argument.
///
/// Credential precedence for remote destinations: explicit password, then
/// explicit key file, then `default_key`. `default_key` is only consulted in
/// remote mode; passing `None` there is an error.
pub fn parse_destination(
    arg: &str,
    password: Option<String>,
    key: Option<PathBuf>,
    default_key: Option<PathBuf>,
) -> Result<Destination, AddressError> {
    let Some((user, host, root)) = split_remote(arg) else {
        return Ok(Destination::Local(PathBuf::from(arg)));
    };

    let credential = match (password, key) {
        (Some(password), _) => Credential::Password(password),
        (None, Some(key)) => Credential::KeyFile(key),
        (None, None) => Credential::KeyFile(default_key.ok_or(AddressError::HomeNotFound)?),
    };

    Ok(Destination::Remote(RemoteEndpoint {
        user: user.to_string(),
        host: host.to_string(),
        root: root.to_string(),
        credential,
    }))
}
