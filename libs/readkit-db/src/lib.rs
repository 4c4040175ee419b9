//! `SeaORM` translation layer for normalized read-collection requests.
//!
//! This crate turns a protocol-level read request (`readkit_odata` types:
//! query kind, order-by spec, skip token, top/skip, eager-load hints) into
//! concrete store operations on a `sea_orm::Select`:
//!
//! - `meta`: entity metadata map (fields, literal kinds, primary key,
//!   navigation relations, skip-token value extractors)
//! - `orderby`: order-by normalizer producing qualified sort columns and
//!   the joins they need
//! - `translate`: the query translator (`ReadQuery::get_resource_set`) with
//!   composite keyset pagination
//! - `relation`: relation resolver over a tagged source variant, gated by
//!   an injected authorization check
//! - `project`: expansion decisions and next-page-link construction

pub mod gate;
pub mod meta;
pub mod orderby;
pub mod project;
pub mod relation;
pub mod translate;

pub use gate::{AccessAction, AllowAll, AuthGate};
pub use meta::{EntityMeta, FieldMeta, RelatedField, RelationMeta, TokenExtractor};
pub use orderby::{resolve_order_by, ResolvedOrder, SortCol, SortKey};
pub use project::Projector;
pub use relation::RelationSource;
pub use translate::{keyset_predicate, QueryDescriptor, ReadQuery};

#[cfg(test)]
mod tests;
