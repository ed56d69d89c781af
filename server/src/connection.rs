use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, AsyncContext, Handler, Running, StreamHandler};
use actix_http::ws::Item;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws::{self, CloseCode, CloseReason};

use system::{decode, encode, ConnectionId};

use crate::config::Config;
use crate::dispatcher::DispatcherHandle;
use crate::registry::next_connection_id;
use crate::router::{route, Route};

/// An encoded broadcast frame handed over by the dispatcher.
#[derive(actix::Message)]
#[rtype(result = "()")]
struct Outbound(String);

/// The dispatcher dropped this connection's outbox and every queued frame
/// has been written.
#[derive(actix::Message)]
#[rtype(result = "()")]
struct OutboxClosed;

/// One browser session. The websocket context is the only writer to the
/// socket, so direct replies and broadcasts never interleave within a frame.
pub struct ConnectionActor {
    connection_id: ConnectionId,
    dispatcher: DispatcherHandle,
    outbox_capacity: usize,
    max_frame_size: usize,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    last_heartbeat: Instant,
    /// Fragments of a message split across continuation frames.
    fragments: Option<Vec<u8>>,
}

impl ConnectionActor {
    pub fn new(dispatcher: DispatcherHandle, config: &Config) -> Self {
        Self {
            connection_id: next_connection_id(),
            dispatcher,
            outbox_capacity: config.outbox_capacity.max(1),
            max_frame_size: config.max_frame_size,
            heartbeat_interval: config.heartbeat_interval(),
            client_timeout: config.client_timeout(),
            last_heartbeat: Instant::now(),
            fragments: None,
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let client_timeout = self.client_timeout;
        ctx.run_interval(self.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > client_timeout {
                log::info!(
                    "Connection {} has been silent for over {:?}, disconnecting",
                    act.connection_id,
                    client_timeout
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn handle_continuation(&mut self, item: Item, ctx: &mut ws::WebsocketContext<Self>) {
        let (first, last, bytes) = match item {
            Item::FirstText(bytes) | Item::FirstBinary(bytes) => (true, false, bytes),
            Item::Continue(bytes) => (false, false, bytes),
            Item::Last(bytes) => (false, true, bytes),
        };

        let buffer = match (first, self.fragments.take()) {
            (true, None) => bytes.to_vec(),
            (false, Some(mut buffer)) => {
                buffer.extend_from_slice(&bytes);
                buffer
            }
            _ => {
                log::warn!(
                    "Closing connection {}: unexpected continuation frame",
                    self.connection_id
                );
                ctx.close(Some(CloseReason {
                    code: CloseCode::Protocol,
                    description: Some("unexpected continuation".to_owned()),
                }));
                ctx.stop();
                return;
            }
        };

        if buffer.len() > self.max_frame_size {
            log::warn!(
                "Closing connection {}: fragmented message exceeds {} bytes",
                self.connection_id,
                self.max_frame_size
            );
            ctx.close(Some(CloseReason {
                code: CloseCode::Size,
                description: None,
            }));
            ctx.stop();
            return;
        }

        if last {
            self.handle_frame(&buffer, ctx);
        } else {
            self.fragments = Some(buffer);
        }
    }

    fn handle_frame(&mut self, frame: &[u8], ctx: &mut ws::WebsocketContext<Self>) {
        let message = match decode(frame) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("Closing connection {}: {}", self.connection_id, err);
                ctx.close(Some(CloseReason {
                    code: CloseCode::Invalid,
                    description: Some("malformed frame".to_owned()),
                }));
                ctx.stop();
                return;
            }
        };
        log::debug!("Ingress {} from connection {}", message.kind(), self.connection_id);

        match route(message) {
            Route::Reply(reply) => {
                log::debug!("Egress {} to connection {}", reply.kind(), self.connection_id);
                ctx.text(encode(&reply));
            }
            Route::Broadcast(message) => {
                if let Err(err) = self.dispatcher.broadcast(message) {
                    log::warn!("Closing connection {}: {}", self.connection_id, err);
                    ctx.stop();
                }
            }
            Route::Ignore => {
                log::debug!("No route for message on connection {}", self.connection_id);
            }
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(self.outbox_capacity);

        if let Err(err) = self.dispatcher.register(self.connection_id, tx) {
            log::warn!(
                "Connection {} could not be registered: {}",
                self.connection_id,
                err
            );
            ctx.stop();
            return;
        }

        let addr = ctx.address();
        let connection_id = self.connection_id;
        actix::spawn(async move {
            log::debug!("connection {} outbox - started", connection_id);
            while let Some(frame) = rx.recv().await {
                if addr.send(Outbound(frame)).await.is_err() {
                    break;
                }
            }
            addr.do_send(OutboxClosed);
            log::debug!("connection {} outbox - terminated", connection_id);
        });

        self.heartbeat(ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let Err(err) = self.dispatcher.unregister(self.connection_id) {
            log::warn!(
                "Connection {} could not be unregistered: {}",
                self.connection_id,
                err
            );
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        self.last_heartbeat = Instant::now();
        match msg {
            Ok(ws::Message::Ping(bytes)) => ctx.pong(&bytes),
            Ok(ws::Message::Text(text)) => self.handle_frame(text.as_bytes(), ctx),
            Ok(ws::Message::Binary(bin)) => self.handle_frame(&bin, ctx),
            Ok(ws::Message::Close(reason)) => {
                log::debug!("Connection {} closed by peer", self.connection_id);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(item)) => self.handle_continuation(item, ctx),
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => (),
            Err(err) => {
                log::warn!("Protocol error on connection {}: {}", self.connection_id, err);
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<Outbound> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0);
    }
}

impl Handler<OutboxClosed> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, _: OutboxClosed, ctx: &mut Self::Context) -> Self::Result {
        log::info!(
            "Connection {} was dropped by the dispatcher, closing",
            self.connection_id
        );
        ctx.close(Some(CloseReason {
            code: CloseCode::Again,
            description: None,
        }));
        ctx.stop();
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    dispatcher: web::Data<DispatcherHandle>,
    config: web::Data<Config>,
) -> Result<HttpResponse, Error> {
    ws::WsResponseBuilder::new(
        ConnectionActor::new(dispatcher.get_ref().clone(), config.get_ref()),
        &req,
        stream,
    )
    .frame_size(config.max_frame_size)
    .start()
    .map_err(|err| {
        log::warn!("Websocket upgrade failed: {}", err);
        err
    })
}
