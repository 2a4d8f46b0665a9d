//! Codec trait and the JSON implementation.
//!
//! The server only needs two things from a codec: turn an incoming frame
//! into a [`ClientRequest`](crate::ClientRequest) and turn outgoing
//! notices and snapshots into bytes. Keeping that behind a trait lets the
//! handler stay format-agnostic.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do not
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. The browser client speaks JSON.
///
/// ```rust
/// use leapfrog_protocol::{Action, ClientRequest, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let req: ClientRequest = codec
///     .decode(br#"{"type":"leg_bet","gameCode":"000001","frogIdx":0}"#)
///     .unwrap();
/// let ClientRequest::Event(event) = req else { panic!() };
/// assert_eq!(event.action, Action::LegBet { frog_idx: 0 });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl JsonCodec {
    /// Encodes straight to a `String`, for text websocket frames.
    pub fn encode_text<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }
}

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
    use crate::{ClientRequest, ServerNotice};

    #[test]
    fn test_json_codec_decode_malformed_returns_decode_error() {
        let result: Result<ClientRequest, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encode_text_matches_encode() {
        let notice = ServerNotice::Hosted {
            game_code: "000123".into(),
        };
        let text = JsonCodec.encode_text(&notice).unwrap();
        let bytes = JsonCodec.encode(&notice).unwrap();
        assert_eq!(text.as_bytes(), bytes.as_slice());
    }
}
