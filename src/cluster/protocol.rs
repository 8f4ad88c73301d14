//! Info protocol wire codec
//!
//! Every message starts with an 8-byte big-endian header: protocol version
//! (1 byte), message type (1 byte) and body length (6 bytes). An info
//! request body is each command followed by `\n`; the reply body holds one
//! `command\tvalue` line per answered command.

use crate::collector::{CollectResult, RawReply};
use crate::error::CollectorError;

/// Protocol version carried in every header
pub const PROTO_VERSION: u8 = 2;
/// Message type of info requests and replies
pub const INFO_MESSAGE_TYPE: u8 = 1;
/// Size of the message header in bytes
pub const HEADER_SIZE: usize = 8;
/// Largest reply body accepted from a node
pub const MAX_BODY_SIZE: u64 = 128 * 1024 * 1024;

const LENGTH_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Encode a header for a body of `len` bytes
pub fn encode_header(len: u64) -> [u8; HEADER_SIZE] {
    let proto =
        (u64::from(PROTO_VERSION) << 56) | (u64::from(INFO_MESSAGE_TYPE) << 48) | (len & LENGTH_MASK);
    proto.to_be_bytes()
}

/// Validate a reply header and return the body length
pub fn decode_header(header: [u8; HEADER_SIZE]) -> CollectResult<u64> {
    let version = header[0];
    let message_type = header[1];

    if version != PROTO_VERSION {
        return Err(CollectorError::Protocol(format!(
            "unsupported protocol version {}",
            version
        )));
    }
    if message_type != INFO_MESSAGE_TYPE {
        return Err(CollectorError::Protocol(format!(
            "unexpected message type {}",
            message_type
        )));
    }

    let len = u64::from_be_bytes(header) & LENGTH_MASK;
    if len > MAX_BODY_SIZE {
        return Err(CollectorError::ResponseTooLarge(len));
    }

    Ok(len)
}

/// Encode one info request carrying all `commands`
pub fn encode_request(commands: &[String]) -> Vec<u8> {
    let body_len: usize = commands.iter().map(|c| c.len() + 1).sum();

    let mut buf = Vec::with_capacity(HEADER_SIZE + body_len);
    buf.extend_from_slice(&encode_header(body_len as u64));
    for command in commands {
        buf.extend_from_slice(command.as_bytes());
        buf.push(b'\n');
    }
    buf
}

/// Decode a reply body into command -> raw line.
///
/// A line without a tab becomes a key with an empty value; this is how a
/// node reports a request-level failure such as `ERROR:NOT_AUTHENTICATED`.
pub fn parse_reply(body: &[u8]) -> RawReply {
    String::from_utf8_lossy(body)
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('\t') {
            Some((command, value)) => (command.to_string(), value.to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}
