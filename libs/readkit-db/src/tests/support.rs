//! Shared fixtures: an in-memory `SQLite` database, two related entities,
//! their metadata maps, and gate stand-ins.

use readkit_odata::LiteralKind;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, RelationTrait, Set,
};

use crate::gate::{AccessAction, AuthGate};
use crate::meta::{EntityMeta, RelationMeta};

pub mod owner {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "owners")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::item::Entity")]
        Items,
    }

    impl Related<super::item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod item {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub weight: i64,
        pub owner_id: Option<i64>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::owner::Entity",
            from = "Column::OwnerId",
            to = "super::owner::Column::Id"
        )]
        Owner,
    }

    impl Related<super::owner::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Owner.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub fn item_meta() -> EntityMeta<item::Entity> {
    EntityMeta::new("id")
        .field_with_extractor("id", item::Column::Id, LiteralKind::I64, |m: &item::Model| {
            m.id.to_string()
        })
        .field_with_extractor(
            "name",
            item::Column::Name,
            LiteralKind::String,
            |m: &item::Model| m.name.clone(),
        )
        .field_with_extractor(
            "weight",
            item::Column::Weight,
            LiteralKind::I64,
            |m: &item::Model| m.weight.to_string(),
        )
        .relation(
            "owner",
            RelationMeta::new("owners", || item::Relation::Owner.def())
                .field("id", "id", LiteralKind::I64)
                .field("name", "name", LiteralKind::String),
        )
}

pub fn owner_meta() -> EntityMeta<owner::Entity> {
    EntityMeta::new("id")
        .field_with_extractor(
            "id",
            owner::Column::Id,
            LiteralKind::I64,
            |m: &owner::Model| m.id.to_string(),
        )
        .field("name", owner::Column::Name, LiteralKind::String)
}

/// In-memory `SQLite` with a single pooled connection (separate pooled
/// connections would each see their own empty `:memory:` database).
pub async fn connect_sqlite() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    Database::connect(opts).await.expect("in-memory sqlite")
}

pub async fn setup() -> DatabaseConnection {
    let conn = connect_sqlite().await;
    conn.execute_unprepared(
        "CREATE TABLE owners (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL
        )",
    )
    .await
    .expect("create owners");
    conn.execute_unprepared(
        "CREATE TABLE items (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            weight INTEGER NOT NULL,
            owner_id INTEGER NULL
        )",
    )
    .await
    .expect("create items");
    conn
}

pub async fn seed_owners(conn: &DatabaseConnection, rows: &[(i64, &str)]) {
    for (id, name) in rows {
        owner::Entity::insert(owner::ActiveModel {
            id: Set(*id),
            name: Set((*name).to_owned()),
        })
        .exec(conn)
        .await
        .expect("seed owner");
    }
}

pub async fn seed_items(conn: &DatabaseConnection, rows: &[(i64, &str, i64, Option<i64>)]) {
    for (id, name, weight, owner_id) in rows {
        item::Entity::insert(item::ActiveModel {
            id: Set(*id),
            name: Set((*name).to_owned()),
            weight: Set(*weight),
            owner_id: Set(*owner_id),
        })
        .exec(conn)
        .await
        .expect("seed item");
    }
}

/// Gate that denies everything; used to prove denial reads as absence.
pub struct DenyAll;

impl<E: EntityTrait> AuthGate<E> for DenyAll {
    fn can_auth(&self, _action: AccessAction, _instance: Option<&E::Model>) -> bool {
        false
    }
}

/// Gate that denies only instances matching a predicate, allowing
/// class-level checks through.
pub struct DenyItemsNamed(pub &'static str);

impl AuthGate<item::Entity> for DenyItemsNamed {
    fn can_auth(&self, _action: AccessAction, instance: Option<&item::Model>) -> bool {
        match instance {
            Some(model) => model.name != self.0,
            None => true,
        }
    }
}
