use serde::Deserialize;
use serde_json::{Map, Value};

pub type ConnectionId = u64;

pub const CLIENT_READY: &str = "client-ready";
pub const GET_CANVAS_STATE: &str = "get-canvas-state";
pub const CANVAS_STATE: &str = "canvas-state";
pub const CANVAS_STATE_FROM_SERVER: &str = "canvas-state-from-server";
pub const DRAW_LINE: &str = "draw-line";
pub const CLEAR: &str = "clear";

/// Pixel coordinates on the shared canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One segment of a stroke. `previous_point` is `None` at the start of a stroke.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawLine {
    #[serde(default, alias = "prevPoint")]
    pub previous_point: Option<Point>,
    pub current_point: Point,
    pub color: String,
    /// Payload fields the relay does not interpret, forwarded as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A frame exchanged with browser clients, keyed by its `type` tag.
///
/// Payloads the relay never looks into are kept as raw JSON so they are
/// forwarded exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    ClientReady(Value),
    GetCanvasState(Value),
    CanvasState(Value),
    CanvasStateFromServer(Value),
    DrawLine(DrawLine),
    Clear(Value),
    Unknown { kind: String, data: Value },
}

impl Message {
    pub fn kind(&self) -> &str {
        match self {
            Message::ClientReady(_) => CLIENT_READY,
            Message::GetCanvasState(_) => GET_CANVAS_STATE,
            Message::CanvasState(_) => CANVAS_STATE,
            Message::CanvasStateFromServer(_) => CANVAS_STATE_FROM_SERVER,
            Message::DrawLine(_) => DRAW_LINE,
            Message::Clear(_) => CLEAR,
            Message::Unknown { kind, .. } => kind,
        }
    }

    pub(crate) fn data(&self) -> Value {
        match self {
            Message::ClientReady(data)
            | Message::GetCanvasState(data)
            | Message::CanvasState(data)
            | Message::CanvasStateFromServer(data)
            | Message::Clear(data)
            | Message::Unknown { data, .. } => data.clone(),
            Message::DrawLine(line) => Value::from(line),
        }
    }
}

impl From<&Point> for Value {
    fn from(point: &Point) -> Self {
        let mut object = Map::new();
        object.insert("x".to_owned(), Value::from(point.x));
        object.insert("y".to_owned(), Value::from(point.y));
        Value::Object(object)
    }
}

impl From<&DrawLine> for Value {
    fn from(line: &DrawLine) -> Self {
        let mut object = line.extra.clone();
        object.insert(
            "previousPoint".to_owned(),
            line.previous_point
                .as_ref()
                .map(Value::from)
                .unwrap_or(Value::Null),
        );
        object.insert("currentPoint".to_owned(), Value::from(&line.current_point));
        object.insert("color".to_owned(), Value::from(line.color.as_str()));
        Value::Object(object)
    }
}
