//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    ports::{
        AnimationRepo, ArtGenPort, AuthTokenRepo, ClockPort, EventSink, ItemRepo, RandomPort,
        RoomRepo, UserRepo,
    },
    sqlite::SqliteRepositories,
};
use crate::stores::{BattleRegistry, GenerationJobs, WizardStore};
use crate::use_cases::{
    AssetGenerator, Authenticate, CombatEngine, CommandDispatcher, CreationWizard, Interact,
    MoveUser, RegenerateRoomArt, SessionLifecycle, WorldView,
};

/// Main application state.
///
/// Holds the repositories, the transient stores and the use cases.
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub stores: Stores,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepo>,
    pub rooms: Arc<dyn RoomRepo>,
    pub items: Arc<dyn ItemRepo>,
    pub animations: Arc<dyn AnimationRepo>,
    pub tokens: Arc<dyn AuthTokenRepo>,
}

impl From<&SqliteRepositories> for Repositories {
    fn from(repos: &SqliteRepositories) -> Self {
        Self {
            users: repos.users.clone(),
            rooms: repos.rooms.clone(),
            items: repos.items.clone(),
            animations: repos.animations.clone(),
            tokens: repos.tokens.clone(),
        }
    }
}

/// Per-process state that does not survive a restart.
pub struct Stores {
    pub wizard: Arc<WizardStore>,
    pub battles: Arc<BattleRegistry>,
    pub generation: Arc<GenerationJobs>,
}

/// Container for all use cases.
pub struct UseCases {
    pub auth: Authenticate,
    pub dispatcher: CommandDispatcher,
    pub session: SessionLifecycle,
    pub view: WorldView,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repos: &SqliteRepositories,
        art: Arc<dyn ArtGenPort>,
        events: Arc<dyn EventSink>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_ports(
            Repositories::from(repos),
            art,
            events,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
            config,
        )
    }

    /// Wire the app from explicit ports. Tests swap in fixed clocks and dice.
    pub fn with_ports(
        repositories: Repositories,
        art: Arc<dyn ArtGenPort>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        config: &EngineConfig,
    ) -> Self {
        let stores = Stores {
            wizard: Arc::new(WizardStore::new(config.wizard_ttl)),
            battles: Arc::new(BattleRegistry::new()),
            generation: Arc::new(GenerationJobs::new()),
        };

        let view = WorldView::new(
            repositories.users.clone(),
            repositories.rooms.clone(),
            repositories.items.clone(),
            repositories.animations.clone(),
            config.view_radius,
        );
        let assets = AssetGenerator::new(
            art,
            repositories.rooms.clone(),
            repositories.animations.clone(),
            clock.clone(),
            config.generation_timeout,
        );

        let wizard = Arc::new(CreationWizard::new(
            repositories.users.clone(),
            repositories.rooms.clone(),
            repositories.items.clone(),
            stores.wizard.clone(),
            stores.generation.clone(),
            assets.clone(),
            events.clone(),
            view.clone(),
            clock.clone(),
        ));
        let combat = CombatEngine::new(
            repositories.users.clone(),
            repositories.items.clone(),
            stores.battles.clone(),
            events.clone(),
            random.clone(),
            view.clone(),
            config.combat_tick,
        );
        let movement = MoveUser::new(
            repositories.users.clone(),
            repositories.rooms.clone(),
            stores.wizard.clone(),
            view.clone(),
        );
        let interact = Interact::new(
            repositories.users.clone(),
            repositories.items.clone(),
            repositories.animations.clone(),
            clock.clone(),
            view.clone(),
        );
        let regenerate = RegenerateRoomArt::new(
            repositories.rooms.clone(),
            repositories.items.clone(),
            assets,
            stores.generation.clone(),
            events,
            view.clone(),
        );

        let use_cases = UseCases {
            auth: Authenticate::new(
                repositories.users.clone(),
                repositories.tokens.clone(),
                clock,
                random,
                config.token_ttl,
                config.realm_access_codes.clone(),
            ),
            session: SessionLifecycle::new(
                view.clone(),
                wizard.clone(),
                combat.clone(),
                stores.wizard.clone(),
            ),
            dispatcher: CommandDispatcher::new(
                repositories.users.clone(),
                view.clone(),
                movement,
                wizard,
                combat,
                interact,
                regenerate,
            ),
            view,
        };

        Self {
            repositories,
            stores,
            use_cases,
        }
    }
}
