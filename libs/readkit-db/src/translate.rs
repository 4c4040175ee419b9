//! Query translator: normalized read request in, executed `SeaORM` query out.
//!
//! Builds a fully ordered, keyset-paginated select from an order-by spec and
//! an optional skip token, computes the total count for count-bearing query
//! kinds, and reports whether more matching rows exist beyond the page.
//! All input contracts are checked before the first store access; store
//! failures propagate without retry or suppression.

use chrono::Utc;
use readkit_odata::{
    Error, LiteralKind, OrderBySpec, QueryKind, ReadLimits, ResourceSetResult, SkipToken,
};
use sea_orm::sea_query::{Expr, Order, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use crate::gate::{AccessAction, AuthGate};
use crate::meta::EntityMeta;
use crate::orderby::{resolve_order_by, ResolvedOrder, SortKey};

/// A normalized "read a collection" request.
///
/// `filter` is opaque to this layer and passed through untouched; `top` and
/// `skip` describe the page window; `skip_token` resumes a previous page and
/// takes precedence over `skip` when both are present.
#[must_use]
pub struct QueryDescriptor<'a> {
    pub kind: QueryKind,
    pub filter: Option<Condition>,
    pub order_by: Option<&'a OrderBySpec>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    pub skip_token: Option<&'a SkipToken>,
    pub eager_load: Option<&'a [String]>,
}

impl<'a> QueryDescriptor<'a> {
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            filter: None,
            order_by: None,
            top: None,
            skip: None,
            skip_token: None,
            eager_load: None,
        }
    }

    pub fn with_filter(mut self, filter: Condition) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, order_by: &'a OrderBySpec) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_skip_token(mut self, token: &'a SkipToken) -> Self {
        self.skip_token = Some(token);
        self
    }

    pub fn with_eager_load(mut self, paths: &'a [String]) -> Self {
        self.eager_load = Some(paths);
        self
    }
}

/// Read-query translator and relation resolver for one entity.
///
/// Holds no cross-request state: metadata and the authorization gate are
/// borrowed, and each call drives exactly one sequence of store queries.
#[must_use]
pub struct ReadQuery<'a, E: EntityTrait, G> {
    pub(crate) meta: &'a EntityMeta<E>,
    pub(crate) gate: &'a G,
    limits: ReadLimits,
}

impl<'a, E, G> ReadQuery<'a, E, G>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    G: AuthGate<E>,
{
    pub fn new(meta: &'a EntityMeta<E>, gate: &'a G) -> Self {
        Self {
            meta,
            gate,
            limits: ReadLimits::default(),
        }
    }

    /// Override the default input caps.
    pub fn limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Translate and execute a resource-set read.
    ///
    /// `source` is the base query; the caller keeps ownership of the
    /// connection. Gate denial is answered with an empty result, not an
    /// error.
    ///
    /// # Errors
    /// Invalid-input violations (`InvalidEagerLoad`, `TokenCardinality`,
    /// `TokenTypeMismatch`, `OrderMismatch`, `InvalidLimit`,
    /// `InvalidOrderByField`) are returned before any store access;
    /// store failures surface as `Error::Db`.
    pub async fn get_resource_set<C>(
        &self,
        desc: QueryDescriptor<'_>,
        source: Select<E>,
        conn: &C,
    ) -> Result<ResourceSetResult<E::Model>, Error>
    where
        C: ConnectionTrait,
        E::Model: sea_orm::FromQueryResult + Send + Sync,
    {
        validate_eager_load(desc.eager_load)?;
        if let Some(top) = desc.top {
            self.limits.validate_top(top)?;
        }
        if let Some(order_by) = desc.order_by {
            self.limits.validate_orderby_count(order_by.len())?;
        }

        let order = resolve_order_by(desc.order_by, self.meta)?;
        if let Some(token) = desc.skip_token {
            validate_token(token, &order)?;
        }

        if !self.gate.can_auth(AccessAction::Read, None) {
            return Ok(ResourceSetResult::empty());
        }

        let mut select = source;
        if let Some(filter) = desc.filter {
            select = select.filter(filter);
        }
        let order_tokens = order.to_signed_tokens();
        for def in order.joins {
            select = select.join(JoinType::LeftJoin, def);
        }
        if let Some(token) = desc.skip_token {
            select = select.filter(keyset_predicate(token, &order.keys)?);
        }
        for key in &order.keys {
            let ord = match key.dir {
                readkit_odata::SortDir::Asc => Order::Asc,
                readkit_odata::SortDir::Desc => Order::Desc,
            };
            select = select.order_by(SimpleExpr::Column(key.col.column_ref()), ord);
        }

        tracing::debug!(
            kind = ?desc.kind,
            order = %order_tokens,
            resumed = desc.skip_token.is_some(),
            "translated resource-set read"
        );

        // Count is taken over the filtered set (keyset predicate included),
        // independent of the top/skip window.
        let count = if desc.kind.wants_count() {
            select
                .clone()
                .count(conn)
                .await
                .map_err(|e| Error::Db(e.to_string()))?
        } else {
            0
        };

        if !desc.kind.wants_results() {
            return Ok(ResourceSetResult {
                results: Vec::new(),
                count,
                has_more: false,
            });
        }

        // Offset and keyset resumption are mutually exclusive within one
        // call; the token wins.
        if desc.skip_token.is_none() {
            if let Some(skip) = desc.skip {
                select = select.offset(skip);
            }
        }
        if let Some(top) = desc.top {
            // Look-ahead row detects "more results exist" without a second query.
            select = select.limit(top + 1);
        }

        let mut rows = select.all(conn).await.map_err(|e| Error::Db(e.to_string()))?;
        let has_more = desc.top.is_some_and(|top| (rows.len() as u64) > top);
        if has_more {
            if let Some(top) = desc.top {
                rows.truncate(usize::try_from(top).unwrap_or(usize::MAX));
            }
        }

        Ok(ResourceSetResult {
            results: rows,
            count,
            has_more,
        })
    }
}

pub(crate) fn validate_eager_load(paths: Option<&[String]>) -> Result<(), Error> {
    if let Some(paths) = paths {
        if paths.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidEagerLoad);
        }
    }
    Ok(())
}

fn validate_token<E>(token: &SkipToken, order: &ResolvedOrder<E>) -> Result<(), Error>
where
    E: EntityTrait,
{
    if token.len() != order.len() {
        return Err(Error::TokenCardinality {
            expected: order.len(),
            got: token.len(),
        });
    }
    if !order.to_signed_tokens().eq_ignore_ascii_case(&token.order) {
        return Err(Error::OrderMismatch);
    }
    Ok(())
}

/// Build the composite keyset predicate that resumes a stable multi-column
/// sort after the token's row.
///
/// For columns c1..cN with directions d1..dN and token values v1..vN the
/// predicate is the disjunction of "prefix equal, first differing column
/// past the boundary":
/// `(c1 >d1 v1) OR (c1 = v1 AND c2 >d2 v2) OR ...`, where `>d` is `>` for
/// ascending and `<` for descending.
///
/// # Errors
/// Returns `TokenCardinality` on a pair-count mismatch, `TokenTypeMismatch`
/// when a pair's literal kind differs from the column's, and
/// `TokenInvalidLiteral` when a literal does not parse as its kind.
pub fn keyset_predicate<E>(token: &SkipToken, keys: &[SortKey<E>]) -> Result<Condition, Error>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    if token.len() != keys.len() {
        return Err(Error::TokenCardinality {
            expected: keys.len(),
            got: token.len(),
        });
    }

    let mut values = Vec::with_capacity(keys.len());
    for (pair, key) in token.values.iter().zip(keys.iter()) {
        if pair.kind != key.kind {
            return Err(Error::TokenTypeMismatch {
                field: key.name.clone(),
                expected: key.kind,
                got: pair.kind,
            });
        }
        values.push(parse_token_literal(&key.name, key.kind, &pair.value)?);
    }

    let mut predicate = Condition::any();
    for i in 0..keys.len() {
        let mut prefix = Condition::all();
        for j in 0..i {
            prefix = prefix.add(Expr::col(keys[j].col.column_ref()).eq(values[j].clone()));
        }
        let boundary = match keys[i].dir {
            readkit_odata::SortDir::Asc => {
                Expr::col(keys[i].col.column_ref()).gt(values[i].clone())
            }
            readkit_odata::SortDir::Desc => {
                Expr::col(keys[i].col.column_ref()).lt(values[i].clone())
            }
        };
        prefix = prefix.add(boundary);
        predicate = predicate.add(prefix);
    }

    Ok(predicate)
}

/// Parse one skip-token literal into a store value, by its protocol kind.
fn parse_token_literal(
    field: &str,
    kind: LiteralKind,
    raw: &str,
) -> Result<sea_orm::Value, Error> {
    use sea_orm::Value as V;

    let invalid = || Error::TokenInvalidLiteral {
        field: field.to_owned(),
        kind,
    };

    let value = match kind {
        LiteralKind::String => V::String(Some(Box::new(raw.to_owned()))),
        LiteralKind::I64 => V::BigInt(Some(raw.parse::<i64>().map_err(|_| invalid())?)),
        LiteralKind::F64 => V::Double(Some(raw.parse::<f64>().map_err(|_| invalid())?)),
        LiteralKind::Bool => V::Bool(Some(raw.parse::<bool>().map_err(|_| invalid())?)),
        LiteralKind::Uuid => V::Uuid(Some(Box::new(
            raw.parse::<uuid::Uuid>().map_err(|_| invalid())?,
        ))),
        LiteralKind::DateTimeUtc => {
            let dt = chrono::DateTime::parse_from_rfc3339(raw)
                .map_err(|_| invalid())?
                .with_timezone(&Utc);
            V::ChronoDateTimeUtc(Some(Box::new(dt)))
        }
        LiteralKind::Date => V::ChronoDate(Some(Box::new(
            raw.parse::<chrono::NaiveDate>().map_err(|_| invalid())?,
        ))),
        LiteralKind::Time => V::ChronoTime(Some(Box::new(
            raw.parse::<chrono::NaiveTime>().map_err(|_| invalid())?,
        ))),
        LiteralKind::Decimal => V::Decimal(Some(Box::new(
            raw.parse::<rust_decimal::Decimal>().map_err(|_| invalid())?,
        ))),
    };

    Ok(value)
}
