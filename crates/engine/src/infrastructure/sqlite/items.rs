//! SQLite item repository.

use async_trait::async_trait;
use hexrealm_domain::{
    CombatStats, EffectKind, Item, ItemId, ItemPlacement, RoomId, ServerCode, UserId, Verb,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::codec::{decode, decode_opt, decode_time, encode_time};
use super::db_error;
use crate::infrastructure::ports::{ItemRepo, RepoError};

const ITEM_COLUMNS: &str = "id, server_code, room_id, owner_id, name, description, \
     success_message, verb, effect, effect_value, hidden, required_item, hp, max_hp, attack, \
     xp_value, infinite, template_id, creator_id, created_at";

pub struct SqliteItemRepo {
    pool: SqlitePool,
}

impl SqliteItemRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn item_from_row(row: &SqliteRow) -> Result<Item, RepoError> {
    let column_err = |e: sqlx::Error| RepoError::database("items.row", e);
    let int = |column: &'static str| -> Result<i32, RepoError> {
        row.try_get::<i64, _>(column)
            .map(|v| v as i32)
            .map_err(column_err)
    };
    let id: String = row.try_get("id").map_err(column_err)?;
    let server_code: String = row.try_get("server_code").map_err(column_err)?;
    let verb: String = row.try_get("verb").map_err(column_err)?;
    let effect: String = row.try_get("effect").map_err(column_err)?;
    let created_at: String = row.try_get("created_at").map_err(column_err)?;

    let placement = ItemPlacement::from_columns(
        decode_opt("items.room_id", row.try_get("room_id").map_err(column_err)?)?,
        decode_opt("items.owner_id", row.try_get("owner_id").map_err(column_err)?)?,
    )
    .map_err(RepoError::serialization)?;

    Ok(Item {
        id: decode("items.id", &id)?,
        server_code: ServerCode::new(server_code).map_err(RepoError::serialization)?,
        placement,
        name: row.try_get("name").map_err(column_err)?,
        description: row.try_get("description").map_err(column_err)?,
        success_message: row.try_get("success_message").map_err(column_err)?,
        verb: Verb::new(verb).map_err(RepoError::serialization)?,
        effect: decode::<EffectKind>("items.effect", &effect)?,
        effect_value: int("effect_value")?,
        hidden: row.try_get("hidden").map_err(column_err)?,
        required_item: row.try_get("required_item").map_err(column_err)?,
        combat: CombatStats {
            hp: int("hp")?,
            max_hp: int("max_hp")?,
            attack: int("attack")?,
            xp_value: int("xp_value")?,
        },
        infinite: row.try_get("infinite").map_err(column_err)?,
        template_id: decode_opt("items.template_id", row.try_get("template_id").map_err(column_err)?)?,
        creator_id: decode_opt("items.creator_id", row.try_get("creator_id").map_err(column_err)?)?,
        created_at: decode_time(&created_at)?,
    })
}

#[async_trait]
impl ItemRepo for SqliteItemRepo {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepoError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("items.get", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn create(&self, item: &Item) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO items (id, server_code, room_id, owner_id, name, description,
                               success_message, verb, effect, effect_value, hidden,
                               required_item, hp, max_hp, attack, xp_value, infinite,
                               template_id, creator_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.server_code.as_str())
        .bind(item.room_id().map(|id| id.to_string()))
        .bind(item.owner_id().map(|id| id.to_string()))
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.success_message)
        .bind(item.verb.as_str())
        .bind(item.effect.as_str())
        .bind(item.effect_value)
        .bind(item.hidden)
        .bind(item.required_item.as_deref())
        .bind(item.combat.hp)
        .bind(item.combat.max_hp)
        .bind(item.combat.attack)
        .bind(item.combat.xp_value)
        .bind(item.infinite)
        .bind(item.template_id.map(|id| id.to_string()))
        .bind(item.creator_id.map(|id| id.to_string()))
        .bind(encode_time(item.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("items.create", e))?;
        Ok(())
    }

    async fn list_in_room(&self, room_id: RoomId) -> Result<Vec<Item>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE room_id = ? ORDER BY created_at, rowid"
        ))
        .bind(room_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("items.list_in_room", e))?;
        rows.iter().map(item_from_row).collect()
    }

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Item>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ? ORDER BY created_at, rowid"
        ))
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("items.list_owned", e))?;
        rows.iter().map(item_from_row).collect()
    }

    async fn take(&self, id: ItemId, owner_id: UserId) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE items SET room_id = NULL, owner_id = ? \
             WHERE id = ? AND room_id IS NOT NULL AND infinite = 0",
        )
        .bind(owner_id.to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("items.take", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_combat_hp(&self, id: ItemId, hp: i32) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE items SET hp = MAX(0, ?) WHERE id = ?")
            .bind(hp)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("items.set_combat_hp", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Item", id));
        }
        Ok(())
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("items.delete", e))?;
        sqlx::query("DELETE FROM animations WHERE item_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("items.delete", e))?;
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("items.delete", e))?;
        tx.commit()
            .await
            .map_err(|e| db_error("items.delete", e))?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{AnimationRepo, RoomRepo, UserRepo};
    use crate::infrastructure::sqlite::SqliteRepositories;
    use chrono::Utc;
    use hexrealm_domain::{
        Animation, AnimationType, Handle, HexCoord, Room, ShroudLevel, User,
    };

    struct Fixture {
        repos: SqliteRepositories,
        room: Room,
        alice: User,
        bob: User,
    }

    async fn fixture() -> Fixture {
        let repos = SqliteRepositories::in_memory().await.unwrap();
        let realm = ServerCode::new("alpha").unwrap();
        let room = Room::new(
            realm.clone(),
            HexCoord::new(0, -1),
            "Vault",
            "Cold.",
            ShroudLevel::new(0).unwrap(),
            None,
            Utc::now(),
        );
        repos.rooms.create(&room).await.unwrap();
        let alice = User::new(Handle::new("alice").unwrap(), realm.clone(), Utc::now());
        let bob = User::new(Handle::new("bob").unwrap(), realm, Utc::now());
        repos.users.create(&alice, "x").await.unwrap();
        repos.users.create(&bob, "x").await.unwrap();
        Fixture {
            repos,
            room,
            alice,
            bob,
        }
    }

    fn key(room_id: RoomId, infinite: bool) -> Item {
        Item {
            id: ItemId::new(),
            server_code: ServerCode::new("alpha").unwrap(),
            placement: ItemPlacement::InRoom(room_id),
            name: "Brass Key".to_string(),
            description: "Warm to the touch.".to_string(),
            success_message: "You pocket it.".to_string(),
            verb: Verb::new("take").unwrap(),
            effect: EffectKind::Item,
            effect_value: 0,
            hidden: false,
            required_item: None,
            combat: CombatStats::default(),
            infinite,
            template_id: None,
            creator_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn only_one_session_can_take_a_unique_item() {
        let f = fixture().await;
        let item = key(f.room.id, false);
        f.repos.items.create(&item).await.unwrap();

        assert!(f.repos.items.take(item.id, f.alice.id).await.unwrap());
        assert!(!f.repos.items.take(item.id, f.bob.id).await.unwrap());

        let owned = f.repos.items.list_owned(f.alice.id).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].owner_id(), Some(f.alice.id));
        assert!(f.repos.items.list_in_room(f.room.id).await.unwrap().is_empty());
        assert!(f.repos.items.list_owned(f.bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn infinite_templates_are_never_moved() {
        let f = fixture().await;
        let template = key(f.room.id, true);
        f.repos.items.create(&template).await.unwrap();
        assert!(!f.repos.items.take(template.id, f.alice.id).await.unwrap());

        let copy = template.clone_for(f.alice.id, Utc::now());
        f.repos.items.create(&copy).await.unwrap();
        let loaded = f.repos.items.get(copy.id).await.unwrap().unwrap();
        assert_eq!(loaded.template_id, Some(template.id));
        assert_eq!(f.repos.items.list_in_room(f.room.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_follows_creation_order() {
        let f = fixture().await;
        let mut names = Vec::new();
        for name in ["Lamp", "Anvil", "Mirror"] {
            let mut item = key(f.room.id, false);
            item.name = name.to_string();
            f.repos.items.create(&item).await.unwrap();
            names.push(name.to_string());
        }
        let listed: Vec<String> = f
            .repos
            .items
            .list_in_room(f.room.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(listed, names);
    }

    #[tokio::test]
    async fn deleting_an_item_removes_its_animations() {
        let f = fixture().await;
        let item = key(f.room.id, false);
        f.repos.items.create(&item).await.unwrap();
        let animation = Animation::for_item(
            Some(f.room.id),
            item.id,
            AnimationType::Interaction,
            vec!["*".to_string()],
            6,
            Utc::now(),
        );
        f.repos.animations.save(&animation).await.unwrap();

        assert!(f.repos.items.delete(item.id).await.unwrap());
        assert!(!f.repos.items.delete(item.id).await.unwrap());
        assert!(f
            .repos
            .animations
            .find_for_item(item.id, AnimationType::Interaction)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn placement_must_be_exclusive() {
        let f = fixture().await;
        // Bypass the domain type to prove the table itself refuses it.
        let err = sqlx::query(
            "INSERT INTO items (id, server_code, room_id, owner_id, name, description, \
             success_message, verb, effect, created_at) \
             VALUES ('x', 'alpha', ?, ?, 'n', 'd', 'm', 'take', 'ITEM', '2026-01-01T00:00:00Z')",
        )
        .bind(f.room.id.to_string())
        .bind(f.alice.id.to_string())
        .execute(&f.repos.pool)
        .await
        .unwrap_err();
        assert!(err.as_database_error().is_some());
    }
}
