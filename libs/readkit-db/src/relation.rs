//! Relation resolver: single-entity and to-one navigation reads under the
//! authorization gate.
//!
//! The source of a single-entity read is a tagged variant rather than a
//! runtime type probe: an already-resolved instance, an unresolved to-one
//! relation, or an unresolved to-many relation. Whatever the variant, the
//! gate is consulted exactly once against the resolved instance, and denial
//! is answered with `None` so it cannot be told apart from absence.

use readkit_odata::Error;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Related, Select,
};

use crate::gate::{AccessAction, AuthGate};
use crate::translate::{validate_eager_load, ReadQuery};

/// Where a single-entity read starts from.
pub enum RelationSource<E: EntityTrait> {
    /// An instance the caller already holds.
    Instance(E::Model),
    /// An unresolved single-valued relation query.
    ToOne(Select<E>),
    /// An unresolved multi-valued relation query; its first row is the
    /// resource.
    ToMany(Select<E>),
}

impl<'a, E, G> ReadQuery<'a, E, G>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    G: AuthGate<E>,
{
    /// Resolve a single resource from `source`.
    ///
    /// Returns `None` when no row exists or the gate denies access; the two
    /// outcomes are indistinguishable by design.
    ///
    /// # Errors
    /// `InvalidEagerLoad` for empty eager-load entries (before any store
    /// access); store failures as `Error::Db`.
    pub async fn get_resource<C>(
        &self,
        source: RelationSource<E>,
        filter: Option<Condition>,
        eager_load: Option<&[String]>,
        conn: &C,
    ) -> Result<Option<E::Model>, Error>
    where
        C: ConnectionTrait,
    {
        validate_eager_load(eager_load)?;

        let instance = match source {
            RelationSource::Instance(model) => Some(model),
            RelationSource::ToOne(query) => {
                let query = match filter {
                    Some(cond) => query.filter(cond),
                    None => query,
                };
                query.one(conn).await.map_err(|e| Error::Db(e.to_string()))?
            }
            RelationSource::ToMany(query) => {
                let query = match filter {
                    Some(cond) => query.filter(cond),
                    None => query,
                };
                let rows = query.all(conn).await.map_err(|e| Error::Db(e.to_string()))?;
                rows.into_iter().next()
            }
        };

        Ok(instance.filter(|model| self.gate.can_auth(AccessAction::Read, Some(model))))
    }

    /// Resolve a to-one navigation reference from `entity`.
    ///
    /// A missing related row is a normal `None`, not an error; gate denial
    /// on the source entity is answered the same way.
    ///
    /// # Errors
    /// Store failures surface as `Error::Db`.
    pub async fn get_related_reference<T, C>(
        &self,
        entity: &E::Model,
        conn: &C,
    ) -> Result<Option<T::Model>, Error>
    where
        T: EntityTrait,
        E: Related<T>,
        C: ConnectionTrait,
    {
        if !self.gate.can_auth(AccessAction::Read, Some(entity)) {
            return Ok(None);
        }
        entity
            .find_related(T::default())
            .one(conn)
            .await
            .map_err(|e| Error::Db(e.to_string()))
    }
}
