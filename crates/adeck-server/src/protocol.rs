//! Live reload messages.
//!
//! The client reports the hash of the deck it displays; the server answers
//! with a reload request whenever that hash is not the latest one.

use serde::{Deserialize, Serialize};

/// Client to server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ClientMessage {
    pub hash: String,
}

/// Server to client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ServerMessage {
    pub reload: bool,
}

impl ServerMessage {
    pub const RELOAD: Self = Self { reload: true };
}

/// Whether a client showing `client_hash` must reload.
///
/// Clients that have not reported a hash yet are left alone.
pub(crate) fn is_stale(client_hash: Option<&str>, latest: &str) -> bool {
    client_hash.is_some_and(|hash| hash != latest)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_messages() {
        let message: ClientMessage = serde_json::from_str(r#"{"hash": "1a2b3c4d5e6f"}"#).unwrap();
        assert_eq!(message.hash, "1a2b3c4d5e6f");
        assert_eq!(
            serde_json::to_string(&ServerMessage::RELOAD).unwrap(),
            r#"{"reload":true}"#
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"reload": true}"#).is_err());
    }

    #[test]
    fn test_is_stale() {
        assert!(is_stale(Some("old"), "new"));
        assert!(!is_stale(Some("new"), "new"));
        assert!(!is_stale(None, "new"));
    }
}
