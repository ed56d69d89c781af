use system::serde_json::Value;
use system::Message;

/// Where an inbound message goes after it was decoded.
#[derive(Debug, PartialEq)]
pub enum Route {
    /// Written back to the originating connection only.
    Reply(Message),
    /// Queued for fan-out to every registered connection, sender included.
    Broadcast(Message),
    Ignore,
}

pub fn route(message: Message) -> Route {
    match message {
        // The asker's payload is not echoed: whoever answers supplies the canvas.
        Message::ClientReady(_) => Route::Reply(Message::GetCanvasState(Value::Null)),
        Message::CanvasState(snapshot) => {
            Route::Broadcast(Message::CanvasStateFromServer(snapshot))
        }
        message @ (Message::DrawLine(_) | Message::Clear(_)) => Route::Broadcast(message),
        // Server-to-client types arriving from a client are treated like unknown ones.
        Message::GetCanvasState(_)
        | Message::CanvasStateFromServer(_)
        | Message::Unknown { .. } => Route::Ignore,
    }
}
