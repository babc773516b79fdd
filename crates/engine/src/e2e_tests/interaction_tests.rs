//! Object interaction E2E tests with more than one player in a room.

use hexrealm_domain::UserMode;
use hexrealm_shared::ServerMessage;

use super::*;

const BRASS_KEY: &[&str] = &["Brass Key", "A small brass key.", "4", "1", "y", "Cold metal."];
const GEM: &[&str] = &["Gem", "A glittering gem.", "4", "1", "", "It sparkles."];
const TORCH: &[&str] = &["Torch", "A bundle of torches.", "4", "2", "", "You light one."];
const CHEST: &[&str] = &["Chest", "An iron chest.", "2", "10", "", "Coins!"];

/// The gate is authored before its key; the wizard only warns.
#[tokio::test]
async fn test_gate_requires_key_in_inventory() {
    let world = TestWorld::new().await;
    let author = world.join("keeper").await;
    world
        .script(author, &["n", "Vault", "A sealed vault.", "1", "0", "y"])
        .await;
    let reply = world
        .script(author, &["Door", "A heavy door.", "6", "brass key"])
        .await;
    assert!(has_text(&reply, "Warning: no item named 'brass key'"));
    world.script(author, &["y", "The door swings open."]).await;
    world.send(author, "y").await;
    world.script(author, BRASS_KEY).await;
    world.send(author, "n").await;
    world.wait_for_world().await;

    let explorer = world.join("explorer").await;
    world.send(explorer, "n").await;

    let reply = world.send(explorer, "open door").await;
    assert_eq!(errors(&reply), vec!["You need a specific item to do that."]);

    let reply = world.send(explorer, "take brass key").await;
    assert!(has_text(&reply, "You take the Brass Key."));

    let reply = world.send(explorer, "open door").await;
    assert!(errors(&reply).is_empty());
    assert!(has_text(&reply, "The door swings open."));
    assert!(reply
        .messages()
        .iter()
        .any(|m| matches!(m, ServerMessage::AnimationPlay(_))));
}

#[tokio::test]
async fn test_unique_pickup_goes_to_first_taker_only() {
    let world = TestWorld::new().await;
    let author = world.join("jeweler").await;
    world.build_room(author, &[GEM]).await;

    let first = world.join("quick").await;
    let second = world.join("slow").await;
    world.send(first, "n").await;
    world.send(second, "n").await;

    let reply = world.send(first, "take gem").await;
    assert!(has_text(&reply, "You take the Gem."));
    let reply = world.send(second, "take 1").await;
    assert_eq!(errors(&reply), vec!["There is no object at position 1."]);
    let reply = world.send(second, "take gem").await;
    assert_eq!(errors(&reply), vec!["You don't see 'gem' here."]);

    assert_eq!(world.inventory(first).await.len(), 1);
    assert!(world.inventory(second).await.is_empty());
    assert!(world.items_here(author).await.is_empty());
}

#[tokio::test]
async fn test_infinite_pickup_clones_once_per_player() {
    let world = TestWorld::new().await;
    let author = world.join("quartermaster").await;
    world.build_room(author, &[TORCH]).await;

    let a = world.join("scout").await;
    let b = world.join("ranger").await;
    world.send(a, "n").await;
    world.send(b, "n").await;

    assert!(has_text(&world.send(a, "take torch").await, "You take the Torch."));
    assert!(has_text(&world.send(b, "take torch").await, "You take the Torch."));
    let reply = world.send(a, "take torch").await;
    assert_eq!(errors(&reply), vec!["You already have the Torch."]);

    let original = world.items_here(author).await;
    assert_eq!(original.len(), 1);
    let held_a = world.inventory(a).await;
    let held_b = world.inventory(b).await;
    assert_eq!(held_a.len(), 1);
    assert_eq!(held_b.len(), 1);
    assert_eq!(held_a[0].template_id, Some(original[0].id));
    assert_ne!(held_a[0].id, held_b[0].id);
}

#[tokio::test]
async fn test_treasure_pays_out_and_wrong_verb_is_refused() {
    let world = TestWorld::new().await;
    let author = world.join("banker").await;
    world.build_room(author, &[CHEST]).await;

    let reply = world.send(author, "kick chest").await;
    assert_eq!(errors(&reply), vec!["You can't kick the Chest."]);

    let reply = world.send(author, "open 1").await;
    assert!(has_text(&reply, "Coins! (+10 gold)"));
    assert_eq!(world.user(author).await.gold, 10);

    world.send(author, "open chest").await;
    assert_eq!(world.user(author).await.gold, 20);
}

#[tokio::test]
async fn test_lethal_trap_respawns_at_origin() {
    let world = TestWorld::new().await;
    let author = world.join("trapper").await;
    world
        .build_room(author, &[&["Pit", "A deep pit.", "3", "-50", "jump", "You fall."]])
        .await;

    let victim = world.join("victim").await;
    world.send(victim, "n").await;

    let reply = world.send(victim, "jump pit").await;
    assert!(has_text(&reply, "wake at the origin"));
    let user = world.user(victim).await;
    assert_eq!(user.hp, user.max_hp);
    assert_eq!(user.position, hexrealm_domain::HexCoord::ORIGIN);
    assert_eq!(user.mode, UserMode::Idle);
}

#[tokio::test]
async fn test_interaction_is_refused_while_authoring() {
    let world = TestWorld::new().await;
    let author = world.join("busybody").await;
    world.build_room(author, &[CHEST]).await;
    world.send(author, "s").await;
    assert_eq!(world.user(author).await.mode, UserMode::CreatingRoomTitle);

    // Inside the wizard the line is an answer, not a command.
    world.send(author, "open chest").await;
    let scratch = world
        .app
        .stores
        .wizard
        .get(author.id)
        .await
        .expect("scratch");
    assert_eq!(scratch.room.title.as_deref(), Some("open chest"));
    assert_eq!(world.user(author).await.gold, 0);
}
