//! Creation wizard E2E tests: void step through to finished art.

use hexrealm_domain::{AnimationType, EffectKind, HexCoord, Mood, UserMode};
use hexrealm_shared::ServerMessage;

use super::*;
use crate::test_fixtures::art_mocks::STUB_SYMBOL;

#[tokio::test]
async fn test_room_wizard_round_trip() {
    let world = TestWorld::new().await;
    let author = world.join("builder").await;

    let reply = world.send(author, "n").await;
    assert!(has_text(&reply, "into unexplored void"));
    assert_eq!(world.user(author).await.mode, UserMode::CreatingRoomTitle);
    assert_eq!(world.user(author).await.position, HexCoord::new(0, -1));

    world
        .script(author, &["Hall", "A big hall with a vaulted roof.", "2"])
        .await;
    let scratch = world
        .app
        .stores
        .wizard
        .get(author.id)
        .await
        .expect("scratch while authoring");
    assert_eq!(scratch.room.mood, Some(Mood::Eerie));
    assert!(
        world.room_here(author).await.is_none(),
        "room is not committed before the shroud step"
    );

    let reply = world.send(author, "3").await;
    assert!(has_text(&reply, "Add an object to this room? (y/n)"));
    let room = world.room_here(author).await.expect("room committed");
    assert_eq!(room.title, "Hall");
    assert_eq!(room.shroud.value(), 3);
    assert_eq!(room.creator_id, Some(author.id));
    assert_eq!(
        world.user(author).await.mode,
        UserMode::CreatingObjectConfirm
    );

    let reply = world.send(author, "n").await;
    assert!(has_text(&reply, "Generating art"));
    world.wait_for_world().await;

    assert_eq!(world.user(author).await.mode, UserMode::Idle);
    assert!(world.app.stores.wizard.get(author.id).await.is_none());
    let room = world.room_here(author).await.expect("room still there");
    assert_eq!(room.symbol.as_deref(), Some(STUB_SYMBOL));
    let tapestry = world
        .app
        .repositories
        .animations
        .find_for_room(room.id, AnimationType::Tapestry)
        .await
        .expect("animation lookup");
    assert!(tapestry.is_some());
}

#[tokio::test]
async fn test_invalid_answers_reprompt_without_advancing() {
    let world = TestWorld::new().await;
    let author = world.join("fumbler").await;
    world.script(author, &["n", "Cellar", "Damp."]).await;

    let reply = world.send(author, "9").await;
    assert!(!errors(&reply).is_empty());
    assert!(has_text(&reply, "Choose a mood"));
    assert_eq!(world.user(author).await.mode, UserMode::CreatingRoomMood);

    let reply = world.send(author, "   ").await;
    assert!(!errors(&reply).is_empty());
    assert_eq!(world.user(author).await.mode, UserMode::CreatingRoomMood);
}

#[tokio::test]
async fn test_object_loop_creates_each_kind() {
    let world = TestWorld::new().await;
    let author = world.join("curator").await;
    world
        .build_room(
            author,
            &[
                &["Fountain", "Water trickles.", "1", "y", "You feel calm."],
                &["Chest", "An iron chest.", "2", "25", "", "Coins spill out."],
                &["Spikes", "Rusty spikes.", "3", "-5", "touch", "Ouch."],
                &["Goblin", "A snarling goblin.", "5", "12, 3, 25", "y", "It falls."],
            ],
        )
        .await;

    let items = world.items_here(author).await;
    assert_eq!(items.len(), 4);

    let chest = items.iter().find(|i| i.name == "Chest").expect("chest");
    assert_eq!(chest.effect, EffectKind::Gold);
    assert_eq!(chest.effect_value, 25);
    assert_eq!(chest.verb.as_str(), "open");

    let spikes = items.iter().find(|i| i.name == "Spikes").expect("spikes");
    assert_eq!(spikes.effect, EffectKind::Damage);
    assert_eq!(spikes.effect_value, 5);

    let goblin = items.iter().find(|i| i.name == "Goblin").expect("goblin");
    assert!(goblin.is_enemy());
    assert_eq!(goblin.combat.max_hp, 12);
    assert_eq!(goblin.combat.attack, 3);
    assert_eq!(goblin.combat.xp_value, 25);
    assert_eq!(goblin.verb.as_str(), "fight");

    let fountain = items.iter().find(|i| i.name == "Fountain").expect("fountain");
    assert_eq!(fountain.verb.as_str(), "examine");
}

#[tokio::test]
async fn test_reserved_custom_verb_is_rejected() {
    let world = TestWorld::new().await;
    let author = world.join("wordsmith").await;
    world
        .script(
            author,
            &["n", "Study", "Books everywhere.", "1", "0", "y", "Lamp", "Brass lamp.", "1"],
        )
        .await;

    let reply = world.send(author, "look").await;
    assert!(!errors(&reply).is_empty());
    assert_eq!(world.user(author).await.mode, UserMode::CreatingObjectVerb);

    world.send(author, "rub").await;
    assert_eq!(
        world.user(author).await.mode,
        UserMode::CreatingObjectMessage
    );
}

#[tokio::test]
async fn test_reconnect_resumes_wizard_prompt() {
    let world = TestWorld::new().await;
    let author = world.join("wanderer").await;
    world.script(author, &["n", "Atrium"]).await;

    let user = world.user(author).await;
    world
        .app
        .use_cases
        .session
        .disconnect(author.id, author.connection, 1)
        .await;
    let greeting = world
        .app
        .use_cases
        .session
        .connect(&user)
        .await
        .expect("greeting");

    assert!(has_text(&greeting, "Describe this place"));
    assert_eq!(
        world.user(author).await.mode,
        UserMode::CreatingRoomDescription
    );
}

#[tokio::test]
async fn test_last_disconnect_drops_scratch_and_expires_session() {
    let world = TestWorld::new().await;
    let author = world.join("quitter").await;
    world.script(author, &["n", "Atrium"]).await;

    world
        .app
        .use_cases
        .session
        .disconnect(author.id, author.connection, 0)
        .await;
    assert!(world.app.stores.wizard.get(author.id).await.is_none());

    let reply = world.send(author, "A round room.").await;
    assert!(has_text(&reply, "Your creation session expired"));
    assert_eq!(world.user(author).await.mode, UserMode::Idle);
    assert!(world.room_here(author).await.is_none());
}

#[tokio::test]
async fn test_failed_interaction_art_still_completes_world() {
    let world = TestWorld::new().await;
    world.art.fail_interactions();
    let author = world.join("unlucky").await;
    world
        .script(
            author,
            &["n", "Forge", "Hot coals.", "3", "0", "y", "Anvil", "Heavy.", "1", "", "Clang."],
        )
        .await;
    world.send(author, "n").await;

    let done = world
        .sink
        .wait_for(EVENT_TIMEOUT, |m| {
            log_text(m).is_some_and(|t| t.starts_with("Your world is complete"))
        })
        .await
        .expect("completion notice");
    assert_eq!(
        done,
        ServerMessage::info("Your world is complete, though some of its art could not be drawn.")
    );
    assert_eq!(world.user(author).await.mode, UserMode::Idle);
}
