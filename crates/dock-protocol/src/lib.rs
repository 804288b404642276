//! Headphone Holder Protocol Library
//!
//! This crate defines the line-oriented serial protocol spoken by the
//! headphone holder firmware:
//!
//! - **Handshake**: the host sends `Are you a headphone holder?` and the
//!   firmware answers `Yes I am!`. Any other answer means the port belongs
//!   to some other device.
//! - **Status**: the host sends `Docked?` and the firmware answers `Yes!`
//!   (headphones seated) or `No!` (headphones removed).
//!
//! Requests are terminated with a bare `\n`. The firmware terminates its
//! replies with `\r\n`; [`LineCodec`] accepts either ending.
//!
//! # Example
//!
//! ```rust
//! use dock_protocol::{LineCodec, PollResponse};
//!
//! let mut codec = LineCodec::new();
//! codec.push_bytes(b"Ye");
//! assert!(codec.next_line().is_none());
//!
//! codec.push_bytes(b"s!\r\n");
//! let line = codec.next_line().unwrap();
//! assert_eq!(PollResponse::classify(&line), PollResponse::Docked);
//! ```

pub mod codec;

pub use codec::{LineCodec, MAX_LINE_LEN};

/// Challenge sent by the host to identify the holder
pub const HANDSHAKE_CHALLENGE: &str = "Are you a headphone holder?";

/// Acknowledgement the holder firmware sends back (compared after trimming)
pub const HANDSHAKE_ACK: &str = "Yes I am!";

/// Status query sent on every poll cycle
pub const STATUS_QUERY: &str = "Docked?";

/// Status reply meaning the headphones are seated
pub const DOCKED_REPLY: &str = "Yes!";

/// Status reply meaning the headphones were removed
pub const UNDOCKED_REPLY: &str = "No!";

/// Terminator appended to host requests
pub const REQUEST_TERMINATOR: &[u8] = b"\n";

/// Terminator the firmware appends to its replies
pub const REPLY_TERMINATOR: &[u8] = b"\r\n";

/// A request sent from the host to the holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockRequest {
    /// Identification challenge
    Handshake,
    /// Docked status query
    Status,
}

impl DockRequest {
    /// Request text without terminator
    pub fn text(&self) -> &'static str {
        match self {
            DockRequest::Handshake => HANDSHAKE_CHALLENGE,
            DockRequest::Status => STATUS_QUERY,
        }
    }

    /// Encode the request as it goes on the wire
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.text().len() + REQUEST_TERMINATOR.len());
        out.extend_from_slice(self.text().as_bytes());
        out.extend_from_slice(REQUEST_TERMINATOR);
        out
    }

    /// Recognize a request line on the device side
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            HANDSHAKE_CHALLENGE => Some(DockRequest::Handshake),
            STATUS_QUERY => Some(DockRequest::Status),
            _ => None,
        }
    }
}

/// Classified result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollResponse {
    /// Holder reported the headphones are seated
    Docked,
    /// Holder reported the headphones are removed
    Undocked,
    /// A line arrived but was not part of the status vocabulary
    Unrecognized,
    /// No complete line arrived within the read timeout
    Timeout,
}

impl PollResponse {
    /// Classify one received line (terminator already stripped)
    ///
    /// Only the two exact literals are accepted; there is no trimming or
    /// case folding here.
    pub fn classify(line: &str) -> Self {
        match line {
            DOCKED_REPLY => PollResponse::Docked,
            UNDOCKED_REPLY => PollResponse::Undocked,
            _ => PollResponse::Unrecognized,
        }
    }

    /// Docked state carried by this response, if any
    pub fn docked(&self) -> Option<bool> {
        match self {
            PollResponse::Docked => Some(true),
            PollResponse::Undocked => Some(false),
            PollResponse::Unrecognized | PollResponse::Timeout => None,
        }
    }
}

/// Check a handshake reply against the expected acknowledgement
///
/// Surrounding whitespace is ignored, everything else must match exactly.
pub fn is_handshake_ack(line: &str) -> bool {
    line.trim() == HANDSHAKE_ACK
}

/// Status reply text for a docked state
pub fn status_reply(docked: bool) -> &'static str {
    if docked {
        DOCKED_REPLY
    } else {
        UNDOCKED_REPLY
    }
}

/// Encode a reply line the way the firmware sends it
pub fn encode_reply(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + REPLY_TERMINATOR.len());
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(REPLY_TERMINATOR);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_requests() {
        assert_eq!(
            DockRequest::Handshake.encode(),
            b"Are you a headphone holder?\n"
        );
        assert_eq!(DockRequest::Status.encode(), b"Docked?\n");
    }

    #[test]
    fn test_parse_requests() {
        assert_eq!(
            DockRequest::parse("Are you a headphone holder?"),
            Some(DockRequest::Handshake)
        );
        assert_eq!(DockRequest::parse("Docked?\r"), Some(DockRequest::Status));
        assert_eq!(DockRequest::parse("docked?"), None);
    }

    #[test]
    fn test_classify_status_replies() {
        assert_eq!(PollResponse::classify("Yes!"), PollResponse::Docked);
        assert_eq!(PollResponse::classify("No!"), PollResponse::Undocked);
        assert_eq!(PollResponse::classify("yes!"), PollResponse::Unrecognized);
        assert_eq!(PollResponse::classify("Yes"), PollResponse::Unrecognized);
        assert_eq!(PollResponse::classify(" No!"), PollResponse::Unrecognized);
        assert_eq!(PollResponse::classify(""), PollResponse::Unrecognized);
    }

    #[test]
    fn test_poll_response_docked() {
        assert_eq!(PollResponse::Docked.docked(), Some(true));
        assert_eq!(PollResponse::Undocked.docked(), Some(false));
        assert_eq!(PollResponse::Unrecognized.docked(), None);
        assert_eq!(PollResponse::Timeout.docked(), None);
    }

    #[test]
    fn test_handshake_ack_is_strict() {
        assert!(is_handshake_ack("Yes I am!"));
        assert!(is_handshake_ack("  Yes I am!\t"));

        assert!(!is_handshake_ack("yes i am!"));
        assert!(!is_handshake_ack("Yes I am"));
        assert!(!is_handshake_ack("Yes I am!!"));
        assert!(!is_handshake_ack("Yes I am! really"));
        assert!(!is_handshake_ack(""));
    }

    #[test]
    fn test_reply_encoding() {
        assert_eq!(status_reply(true), "Yes!");
        assert_eq!(status_reply(false), "No!");
        assert_eq!(encode_reply(HANDSHAKE_ACK), b"Yes I am!\r\n");
    }
}
