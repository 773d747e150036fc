use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::auth::JwtValidator;
use crate::features::media::models::MediaPermission;
use crate::features::media::AccessService;
use crate::features::realtime::hub::{ConnectionId, RoomHub, RoomMessage};
use crate::features::realtime::protocol::{ClientEvent, ServerEvent};
use crate::features::users::models::User;
use crate::features::users::UserService;

/// Frames queued per connection before room forwarders wait on the socket
const OUTBOUND_BUFFER: usize = 256;

/// State for the WebSocket endpoint
#[derive(Clone)]
pub struct RealtimeState {
    pub hub: Arc<RoomHub>,
    pub validator: Arc<JwtValidator>,
    pub users: Arc<UserService>,
    pub access: Arc<AccessService>,
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Access token; browsers cannot set headers on a WebSocket handshake
    pub token: Option<String>,
}

fn require_token(token: Option<String>) -> Result<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token query parameter".to_string()))
}

/// Upgrade to a WebSocket after authenticating the `token` query parameter.
///
/// The token is checked before the upgrade headers, so an unauthenticated
/// request is answered with 401 whatever else it carries.
pub async fn ws_handler(
    State(state): State<RealtimeState>,
    AppQuery(query): AppQuery<WsQuery>,
    ws: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response> {
    let token = require_token(query.token)?;
    let identity = state.validator.validate_token(&token).await?;
    let user = state.users.resolve(&identity).await?;

    match ws {
        Ok(ws) => Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user))),
        Err(rejection) => Ok(rejection.into_response()),
    }
}

async fn handle_socket(socket: WebSocket, state: RealtimeState, user: User) {
    let conn_id = Uuid::new_v4();
    state.hub.connection_opened();
    info!(conn = %conn_id, user = %user.id, "Realtime client connected");

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(conn_id, user, state.clone(), out_tx);

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => session.handle_frame(text.as_str()).await,
            Ok(Message::Binary(_)) => {
                session
                    .reply(ServerEvent::error("Binary frames are not supported"))
                    .await
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    let user_id = session.user.id;
    session.close().await;
    writer.abort();
    state.hub.connection_closed();
    info!(conn = %conn_id, user = %user_id, "Realtime client disconnected");
}

/// Per-connection state: joined rooms and their forwarder tasks
struct Session {
    conn_id: ConnectionId,
    user: User,
    state: RealtimeState,
    out: mpsc::Sender<String>,
    rooms: HashMap<Uuid, JoinHandle<()>>,
}

impl Session {
    fn new(
        conn_id: ConnectionId,
        user: User,
        state: RealtimeState,
        out: mpsc::Sender<String>,
    ) -> Self {
        Self {
            conn_id,
            user,
            state,
            out,
            rooms: HashMap::new(),
        }
    }

    async fn reply(&self, event: ServerEvent) {
        if self.out.send(event.encode()).await.is_err() {
            debug!(conn = %self.conn_id, "Dropping reply, socket writer is gone");
        }
    }

    async fn handle_frame(&mut self, frame: &str) {
        let event = match ClientEvent::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                debug!(conn = %self.conn_id, "Malformed frame: {}", e);
                self.reply(ServerEvent::error(format!("Malformed event: {}", e)))
                    .await;
                return;
            }
        };

        match event {
            ClientEvent::JoinMedia(media_id) => self.join(media_id).await,
            ClientEvent::LeaveMedia(media_id) => self.leave(media_id).await,
            ClientEvent::NewComment { media_id, comment } => {
                self.relay(media_id, ServerEvent::NewComment(comment), "new-comment")
                    .await
            }
            ClientEvent::NewAnnotation {
                media_id,
                annotation,
            } => {
                self.relay(
                    media_id,
                    ServerEvent::NewAnnotation(annotation),
                    "new-annotation",
                )
                .await
            }
        }
    }

    async fn join(&mut self, media_id: Uuid) {
        if let Err(e) = self
            .state
            .access
            .require(media_id, self.user.id, MediaPermission::Viewer)
            .await
        {
            self.reply(ServerEvent::error(join_error_message(e))).await;
            return;
        }

        if !self.rooms.contains_key(&media_id) {
            let rx = self.state.hub.join(media_id, self.conn_id).await;
            let forwarder = spawn_forwarder(rx, self.conn_id, media_id, self.out.clone());
            self.rooms.insert(media_id, forwarder);
            let members = self.state.hub.member_count(media_id).await;
            info!(
                conn = %self.conn_id,
                user = %self.user.id,
                media = %media_id,
                members = members,
                "Joined media room"
            );
        }

        self.reply(ServerEvent::JoinedMedia { media_id }).await;
    }

    async fn leave(&mut self, media_id: Uuid) {
        if let Some(forwarder) = self.rooms.remove(&media_id) {
            forwarder.abort();
            self.state.hub.leave(media_id, self.conn_id).await;
            info!(conn = %self.conn_id, media = %media_id, "Left media room");
        }
        self.reply(ServerEvent::LeftMedia { media_id }).await;
    }

    async fn relay(&self, media_id: Uuid, event: ServerEvent, kind: &str) {
        match self
            .state
            .hub
            .broadcast(media_id, self.conn_id, event.encode())
            .await
        {
            Ok(reached) => info!(
                conn = %self.conn_id,
                media = %media_id,
                event = kind,
                peers = reached.saturating_sub(1),
                "Broadcast event"
            ),
            Err(e) => self.reply(ServerEvent::error(e.to_string())).await,
        }
    }

    /// Leave every joined room
    async fn close(mut self) {
        for (media_id, forwarder) in self.rooms.drain() {
            forwarder.abort();
            self.state.hub.leave(media_id, self.conn_id).await;
        }
    }
}

fn join_error_message(e: AppError) -> String {
    match e {
        AppError::Forbidden(msg) | AppError::NotFound(msg) => msg,
        other => {
            warn!("Failed to check media access: {}", other);
            "Failed to join media".to_string()
        }
    }
}

/// Forward room frames to one connection, skipping the ones it sent itself
pub(crate) fn spawn_forwarder(
    mut rx: broadcast::Receiver<RoomMessage>,
    conn_id: ConnectionId,
    media_id: Uuid,
    out: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) if message.origin == conn_id => continue,
                Ok(message) => {
                    if out.send(message.frame.to_string()).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        conn = %conn_id,
                        media = %media_id,
                        skipped,
                        "Connection lagged, frames dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::JwksClient;
    use crate::features::realtime::hub::RoomError;
    use crate::shared::test_helpers::{create_user, lazy_pool};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn test_state() -> RealtimeState {
        let pool = lazy_pool();
        let jwks = Arc::new(JwksClient::new(
            "http://127.0.0.1:9/realms/framesync/protocol/openid-connect/certs",
            Duration::from_secs(60),
        ));
        RealtimeState {
            hub: Arc::new(RoomHub::new(16)),
            validator: Arc::new(JwtValidator::new(
                jwks,
                "http://127.0.0.1:9/realms/framesync".to_string(),
                None,
                None,
                Duration::from_secs(0),
            )),
            users: Arc::new(UserService::new(pool.clone())),
            access: Arc::new(AccessService::new(pool)),
        }
    }

    fn test_session(state: RealtimeState) -> (Session, mpsc::Receiver<String>) {
        let (out_tx, out_rx) = mpsc::channel(8);
        let session = Session::new(Uuid::new_v4(), create_user("alice"), state, out_tx);
        (session, out_rx)
    }

    #[tokio::test]
    async fn test_ws_without_token_is_unauthorized() {
        let server = TestServer::new(crate::features::realtime::routes::routes(test_state())).unwrap();

        let response = server.get("/ws").await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["success"], false);

        server
            .get("/ws")
            .add_query_param("token", "   ")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_malformed_frame_replies_error_and_session_continues() {
        let (mut session, mut out_rx) = test_session(test_state());

        session.handle_frame("not json").await;
        let reply: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
        assert_eq!(reply["event"], "error");
        assert!(reply["data"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Malformed event"));

        let media = Uuid::new_v4();
        session
            .handle_frame(&json!({"event": "leave-media", "data": media}).to_string())
            .await;
        assert_eq!(
            out_rx.recv().await.unwrap(),
            ServerEvent::LeftMedia { media_id: media }.encode()
        );
    }

    #[tokio::test]
    async fn test_emit_before_join_replies_error() {
        let (mut session, mut out_rx) = test_session(test_state());
        let media = Uuid::new_v4();

        session
            .handle_frame(
                &json!({
                    "event": "new-comment",
                    "data": {"mediaId": media, "comment": {"content": "early"}}
                })
                .to_string(),
            )
            .await;

        assert_eq!(
            out_rx.recv().await.unwrap(),
            ServerEvent::error(RoomError::NotJoined(media).to_string()).encode()
        );
    }

    #[tokio::test]
    async fn test_emit_reaches_peer_in_room() {
        let state = test_state();
        let hub = state.hub.clone();
        let (mut session, mut out_rx) = test_session(state);
        let media = Uuid::new_v4();

        let _own_rx = hub.join(media, session.conn_id).await;
        let mut peer_rx = hub.join(media, Uuid::new_v4()).await;

        session
            .handle_frame(
                &json!({
                    "event": "new-annotation",
                    "data": {"mediaId": media, "annotation": {"x": 0.5, "y": 0.25}}
                })
                .to_string(),
            )
            .await;

        let message = peer_rx.recv().await.unwrap();
        assert_eq!(message.origin, session.conn_id);
        assert_eq!(relayed_data(&message.frame).unwrap()["x"], 0.5);
        assert!(out_rx.try_recv().is_err());
    }

    fn relayed_data(frame: &str) -> Option<Value> {
        serde_json::from_str::<Value>(frame)
            .ok()
            .and_then(|v| v.get("data").cloned())
    }

    #[test]
    fn test_require_token() {
        assert_eq!(require_token(Some(" abc ".into())).unwrap(), "abc");
        assert!(matches!(require_token(None), Err(AppError::Unauthorized(_))));
        assert!(matches!(
            require_token(Some("   ".into())),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_forwarder_skips_own_frames() {
        let hub = RoomHub::new(16);
        let media = Uuid::new_v4();
        let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());

        let rx = hub.join(media, me).await;
        let _peer_rx = hub.join(media, peer).await;
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let forwarder = spawn_forwarder(rx, me, media, out_tx);

        let own = ServerEvent::NewComment(json!({"content": "mine"})).encode();
        let theirs = ServerEvent::NewComment(json!({"content": "theirs"})).encode();
        hub.broadcast(media, me, own).await.unwrap();
        hub.broadcast(media, peer, theirs.clone()).await.unwrap();

        let received = out_rx.recv().await.unwrap();
        assert_eq!(received, theirs);
        assert_eq!(relayed_data(&received).unwrap()["content"], "theirs");
        assert!(out_rx.try_recv().is_err());

        forwarder.abort();
    }

    #[test]
    fn test_join_error_message_hides_internal_errors() {
        assert_eq!(
            join_error_message(AppError::Forbidden("no".into())),
            "no"
        );
        assert_eq!(
            join_error_message(AppError::Internal("db down".into())),
            "Failed to join media"
        );
    }
}
