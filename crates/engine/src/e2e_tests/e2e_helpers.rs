//! E2E test helpers for constructing the full application stack.
//!
//! A `TestWorld` is a fully wired `App` over an in-memory SQLite store, with
//! a stub art service, a recording event sink and scripted dice.

use std::sync::Arc;
use std::time::Duration;

use hexrealm_domain::{ConnectionId, Item, Room, User, UserId};
use hexrealm_shared::{AuthRequest, LogKind, ServerMessage};

use crate::app::{App, Repositories};
use crate::infrastructure::clock::{CyclingRandom, SystemClock};
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::sqlite::SqliteRepositories;
use crate::test_fixtures::{RecordingSink, StubArtService};
use crate::use_cases::Reply;

/// Long enough for background work on a loaded CI box.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestWorld {
    pub app: Arc<App>,
    pub repos: SqliteRepositories,
    pub sink: Arc<RecordingSink>,
    pub art: Arc<StubArtService>,
}

/// One logged-in player with their own connection.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub id: UserId,
    pub connection: ConnectionId,
}

impl TestWorld {
    /// Dice alternate 6 for the player and 1 for the enemy.
    pub async fn new() -> Self {
        Self::with_rolls(vec![6, 1]).await
    }

    pub async fn with_rolls(rolls: Vec<i32>) -> Self {
        let config = EngineConfig {
            combat_tick: Duration::from_millis(10),
            generation_timeout: Duration::from_secs(5),
            ..EngineConfig::default()
        };
        let repos = SqliteRepositories::in_memory()
            .await
            .expect("in-memory store");
        let sink = Arc::new(RecordingSink::new());
        let art = Arc::new(StubArtService::new());
        let app = Arc::new(App::with_ports(
            Repositories::from(&repos),
            art.clone(),
            sink.clone(),
            Arc::new(SystemClock::new()),
            Arc::new(CyclingRandom::new(rolls)),
            &config,
        ));
        Self {
            app,
            repos,
            sink,
            art,
        }
    }

    /// Sign a player up in realm `alpha` and open a session for them.
    pub async fn join(&self, handle: &str) -> Player {
        let response = self
            .app
            .use_cases
            .auth
            .signup(&AuthRequest {
                handle: handle.to_string(),
                password: "secret1".to_string(),
                access_code: None,
                server_code: "alpha".to_string(),
            })
            .await
            .expect("signup");
        let token = response.token.expect("token");
        let user = self
            .app
            .use_cases
            .auth
            .verify_token(&token)
            .await
            .expect("token lookup")
            .expect("user for token");
        Player {
            id: user.id,
            connection: ConnectionId::new(),
        }
    }

    pub async fn send(&self, player: Player, raw: &str) -> Reply {
        self.app
            .use_cases
            .dispatcher
            .dispatch(player.id, player.connection, raw)
            .await
    }

    /// Send each line in order, returning the last reply.
    pub async fn script(&self, player: Player, lines: &[&str]) -> Reply {
        let mut last = Reply::new();
        for line in lines {
            last = self.send(player, line).await;
        }
        last
    }

    pub async fn user(&self, player: Player) -> User {
        self.app
            .repositories
            .users
            .get(player.id)
            .await
            .expect("user lookup")
            .expect("user exists")
    }

    pub async fn room_here(&self, player: Player) -> Option<Room> {
        let user = self.user(player).await;
        self.app
            .repositories
            .rooms
            .get_at(&user.server_code, user.position)
            .await
            .expect("room lookup")
    }

    pub async fn items_here(&self, player: Player) -> Vec<Item> {
        match self.room_here(player).await {
            Some(room) => self
                .app
                .repositories
                .items
                .list_in_room(room.id)
                .await
                .expect("item listing"),
            None => Vec::new(),
        }
    }

    pub async fn inventory(&self, player: Player) -> Vec<Item> {
        self.app
            .repositories
            .items
            .list_owned(player.id)
            .await
            .expect("inventory")
    }

    /// Wait for the background art job of `player`'s last wizard to end.
    pub async fn wait_for_world(&self) {
        self.sink
            .wait_for(EVENT_TIMEOUT, |m| {
                log_text(m).is_some_and(|t| t.starts_with("Your world is complete"))
            })
            .await
            .expect("art generation finished");
    }

    /// Walk north into the void and author a room with the given objects.
    ///
    /// Each object is the list of wizard answers after "y" (name onwards).
    pub async fn build_room(&self, author: Player, objects: &[&[&str]]) {
        self.script(author, &["n", "Test Chamber", "Bare stone walls.", "6", "0"])
            .await;
        for answers in objects {
            self.send(author, "y").await;
            self.script(author, answers).await;
        }
        self.send(author, "n").await;
        self.wait_for_world().await;
    }
}

pub fn log_text(message: &ServerMessage) -> Option<&str> {
    match message {
        ServerMessage::GameLog(line) => Some(line.text.as_str()),
        _ => None,
    }
}

/// All log lines in a reply.
pub fn texts(reply: &Reply) -> Vec<String> {
    reply
        .messages()
        .iter()
        .filter_map(log_text)
        .map(str::to_string)
        .collect()
}

pub fn errors(reply: &Reply) -> Vec<String> {
    reply
        .messages()
        .iter()
        .filter_map(|m| match m {
            ServerMessage::GameLog(line) if line.kind == LogKind::Error => Some(line.text.clone()),
            _ => None,
        })
        .collect()
}

pub fn has_text(reply: &Reply, needle: &str) -> bool {
    texts(reply).iter().any(|t| t.contains(needle))
}
