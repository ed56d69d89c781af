use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::message::*;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame has no `type` field")]
    MissingType,
    #[error("frame has an empty `type` field")]
    EmptyType,
    #[error("invalid `{kind}` payload: {source}")]
    InvalidPayload {
        kind: String,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Decodes one text or binary frame into a [`Message`].
pub fn decode(frame: &[u8]) -> Result<Message, DecodeError> {
    let Envelope { kind, data } = serde_json::from_slice(frame)?;
    let kind = kind.ok_or(DecodeError::MissingType)?;
    if kind.is_empty() {
        return Err(DecodeError::EmptyType);
    }

    let message = match kind.as_str() {
        CLIENT_READY => Message::ClientReady(data),
        GET_CANVAS_STATE => Message::GetCanvasState(data),
        CANVAS_STATE => Message::CanvasState(data),
        CANVAS_STATE_FROM_SERVER => Message::CanvasStateFromServer(data),
        DRAW_LINE => {
            let line = serde_json::from_value::<DrawLine>(data).map_err(|source| {
                DecodeError::InvalidPayload {
                    kind: DRAW_LINE.to_owned(),
                    source,
                }
            })?;
            Message::DrawLine(line)
        }
        CLEAR => Message::Clear(data),
        _ => Message::Unknown {
            kind: kind.clone(),
            data,
        },
    };
    Ok(message)
}

pub fn encode(message: &Message) -> String {
    json!({ "type": message.kind(), "data": message.data() }).to_string()
}
