//! Codec trait and the JSON implementation.
//!
//! The gateway doesn't care how frames become bytes, only that something
//! implements [`Codec`]. [`JsonCodec`] is the default: chat clients and
//! browser tooling can read it without help.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into an owned value.
    ///
    /// # Errors
    /// `ProtocolError::Decode` if the bytes are malformed or don't match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use codehunt_protocol::{Codec, Envelope, Frame, JsonCodec};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(1, 5000, Frame::Heartbeat { client_time: 5000 });
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
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
    use crate::{ActorId, Envelope, Frame, Intent};

    #[test]
    fn test_decode_intent_frame_from_client_json() {
        let raw = br#"{"seq":4,"timestamp":0,"frame":{"type":"Intent","intent":{"kind":"Text","text":"K3ZQ"}}}"#;
        let envelope: Envelope = JsonCodec.decode(raw).unwrap();
        assert_eq!(
            envelope.frame,
            Frame::Intent {
                intent: Intent::Text {
                    text: "K3ZQ".into()
                }
            }
        );
    }

    #[test]
    fn test_decode_malformed_bytes_is_decode_error() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_handshake_ack_carries_actor() {
        let bytes = JsonCodec
            .encode(&Envelope::new(
                0,
                0,
                Frame::HandshakeAck {
                    actor_id: ActorId(8),
                    server_time: 0,
                },
            ))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""actor_id":8"#));
    }
}
