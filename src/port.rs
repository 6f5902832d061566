//! Agent port derivation.
//!
//! Every agent service binds to `base_port + (n mod 1000)` where `n` is the
//! integer parsed from the last four characters of its agent id. The client
//! library resolves agents with the same function, so the two sides cannot
//! drift apart.

use thiserror::Error;

/// Default base port for agent services
pub const DEFAULT_AGENT_BASE_PORT: u16 = 4021;

const SUFFIX_LEN: usize = 4;
const PORT_SPREAD: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortDerivationError {
    #[error("agent id '{agent_id}' does not end in a numeric suffix (got '{suffix}')")]
    NotNumeric { agent_id: String, suffix: String },

    #[error("agent id '{agent_id}' derives port {port}, which is not a valid TCP port")]
    OutOfRange { agent_id: String, port: i64 },
}

/// Derive the listening port of the agent identified by `agent_id`.
pub fn derive_agent_port(agent_id: &str, base_port: u16) -> Result<u16, PortDerivationError> {
    let suffix = trailing_suffix(agent_id);
    let n = parse_leading_int(suffix).ok_or_else(|| PortDerivationError::NotNumeric {
        agent_id: agent_id.to_string(),
        suffix: suffix.to_string(),
    })?;

    // `%` keeps the sign of the dividend, so "-007" lands below the base port.
    let port = i64::from(base_port) + n % PORT_SPREAD;
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(PortDerivationError::OutOfRange {
            agent_id: agent_id.to_string(),
            port,
        }),
    }
}

/// The last four UTF-16 code units of `agent_id`, widened to a char boundary.
/// Counting in UTF-16 keeps ids with astral-plane characters on the same port
/// as JavaScript `slice(-4)`; a widened surrogate pair is never a digit, so
/// the parse result matches too.
fn trailing_suffix(agent_id: &str) -> &str {
    let mut units = 0;
    for (i, c) in agent_id.char_indices().rev() {
        units += c.len_utf16();
        if units >= SUFFIX_LEN {
            return &agent_id[i..];
        }
    }
    agent_id
}

/// Integer parsing with JavaScript `parseInt(s, 10)` semantics: leading
/// whitespace, an optional sign, then the longest run of decimal digits.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
