//! Codec trait and implementations for serializing commands and events.
//!
//! The gateway doesn't care HOW a [`ClientCommand`](crate::ClientCommand)
//! or [`ServerEvent`](crate::ServerEvent) becomes bytes, it only needs
//! something implementing [`Codec`]. [`JsonCodec`] is the one browsers
//! speak.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` for malformed input, unknown command
    /// tags, or missing required fields.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use draftforge_protocol::{ClientCommand, Codec, JsonCodec, RoomCode};
///
/// let codec = JsonCodec;
/// let cmd = ClientCommand::SetReady { room_code: RoomCode::new("AB12") };
///
/// let bytes = codec.encode(&cmd).unwrap();
/// let decoded: ClientCommand = codec.decode(&bytes).unwrap();
/// assert_eq!(cmd, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientCommand, EntityId, RoomCode, ServerEvent, TickUpdate};

    #[test]
    fn test_json_codec_decodes_browser_command() {
        let raw = br#"{"type":"submit","room_code":"Q9X2","entity_id":"furina"}"#;
        let cmd: ClientCommand = JsonCodec.decode(raw).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Submit {
                room_code: RoomCode::new("Q9X2"),
                entity_id: EntityId::new("furina"),
            }
        );
    }

    #[test]
    fn test_json_codec_encodes_event_as_utf8_json() {
        let event = ServerEvent::Tick(TickUpdate {
            countdown: 59,
            reserve_a: 300,
            reserve_b: 300,
        });
        let bytes = JsonCodec.encode(&event).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with('{'));
        assert!(text.contains("\"countdown\":59"));
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<ClientCommand, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
