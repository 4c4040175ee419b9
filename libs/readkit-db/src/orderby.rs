//! Order-by normalizer.
//!
//! Walks the ordered (navigation-path, direction) segments of an
//! `OrderBySpec` and resolves each terminal field against the entity
//! metadata, producing a flat ordered list of qualified sort columns. The
//! same resolution feeds SQL `ORDER BY`, the keyset predicate, and
//! next-page-link construction, so the three can never disagree on column
//! order.

use readkit_odata::{Error, LiteralKind, OrderBySpec, SortDir};
use sea_orm::sea_query::{Alias, ColumnRef, IntoColumnRef};
use sea_orm::{EntityTrait, RelationDef};

use crate::meta::EntityMeta;

/// A sort column: either one of the entity's own columns, or a
/// table-qualified column reached through one navigation hop.
pub enum SortCol<E: EntityTrait> {
    Own(E::Column),
    Related {
        table: &'static str,
        column: &'static str,
    },
}

impl<E: EntityTrait> SortCol<E>
where
    E::Column: Copy,
{
    #[must_use]
    pub fn column_ref(&self) -> ColumnRef {
        match self {
            SortCol::Own(col) => (*col).into_column_ref(),
            SortCol::Related { table, column } => {
                (Alias::new(*table), Alias::new(*column)).into_column_ref()
            }
        }
    }
}

impl<E: EntityTrait> Clone for SortCol<E>
where
    E::Column: Copy,
{
    fn clone(&self) -> Self {
        match self {
            SortCol::Own(col) => SortCol::Own(*col),
            SortCol::Related { table, column } => SortCol::Related { table, column },
        }
    }
}

/// One normalized sort key, in effective column precedence order.
pub struct SortKey<E: EntityTrait> {
    pub col: SortCol<E>,
    pub kind: LiteralKind,
    pub dir: SortDir,
    /// Path name as the protocol spells it ("id", "owner/name").
    pub name: String,
}

impl<E: EntityTrait> SortKey<E> {
    fn signed(&self) -> String {
        let sign = match self.dir {
            SortDir::Asc => '+',
            SortDir::Desc => '-',
        };
        format!("{sign}{}", self.name)
    }
}

/// Normalized ordering plus the joins the qualified columns require.
pub struct ResolvedOrder<E: EntityTrait> {
    pub keys: Vec<SortKey<E>>,
    pub joins: Vec<RelationDef>,
}

impl<E: EntityTrait> ResolvedOrder<E> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Render as "+f1,-nav/f2", the form embedded in skip tokens.
    #[must_use]
    pub fn to_signed_tokens(&self) -> String {
        self.keys
            .iter()
            .map(SortKey::signed)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Resolve the effective ordering for a read request.
///
/// An absent (or empty) spec defaults to the primary key ascending, so a
/// total order always exists and skip-token pagination stays well-defined.
/// Relation-qualified segments support exactly one navigation hop.
///
/// # Errors
/// Returns `Error::InvalidOrderByField` for unknown fields or relations,
/// empty paths, or paths deeper than one hop.
pub fn resolve_order_by<E>(
    spec: Option<&OrderBySpec>,
    meta: &EntityMeta<E>,
) -> Result<ResolvedOrder<E>, Error>
where
    E: EntityTrait,
    E::Column: Copy,
{
    let mut keys = Vec::new();
    let mut joins = Vec::new();

    let spec = match spec {
        Some(s) if !s.is_empty() => s,
        _ => {
            let pk = meta.primary_key();
            let field = meta
                .get(pk)
                .ok_or_else(|| Error::InvalidOrderByField(pk.to_owned()))?;
            keys.push(SortKey {
                col: SortCol::Own(field.col),
                kind: field.kind,
                dir: SortDir::Asc,
                name: pk.to_owned(),
            });
            return Ok(ResolvedOrder { keys, joins });
        }
    };

    let mut joined: Vec<String> = Vec::new();
    for seg in &spec.0 {
        match seg.path.as_slice() {
            [] => return Err(Error::InvalidOrderByField("(empty path)".to_owned())),
            [field] => {
                let f = meta
                    .get(field)
                    .ok_or_else(|| Error::InvalidOrderByField(field.clone()))?;
                keys.push(SortKey {
                    col: SortCol::Own(f.col),
                    kind: f.kind,
                    dir: seg.dir,
                    name: field.to_lowercase(),
                });
            }
            [nav, field] => {
                let name = format!("{}/{}", nav.to_lowercase(), field.to_lowercase());
                let rel = meta
                    .get_relation(nav)
                    .ok_or_else(|| Error::InvalidOrderByField(name.clone()))?;
                let rf = rel
                    .get(field)
                    .ok_or_else(|| Error::InvalidOrderByField(name.clone()))?;
                if !joined.contains(nav) {
                    joins.push(rel.join());
                    joined.push(nav.clone());
                }
                keys.push(SortKey {
                    col: SortCol::Related {
                        table: rel.table(),
                        column: rf.column,
                    },
                    kind: rf.kind,
                    dir: seg.dir,
                    name,
                });
            }
            path => {
                return Err(Error::InvalidOrderByField(format!(
                    "{}: ordering supports exactly one navigation hop",
                    path.join("/")
                )))
            }
        }
    }

    Ok(ResolvedOrder { keys, joins })
}
