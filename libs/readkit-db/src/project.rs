//! Expansion & pagination-link projector.
//!
//! During response projection the serializer descends into navigation
//! properties; the projector tracks that descent with a request-scoped
//! stack of frames and answers two questions: "expand this navigation
//! property inline?" and "does this page need a next-page link, and what
//! does its skip token look like?".
//!
//! Frames live in an arena (`Vec` with index-based parent references);
//! they are pushed on descent, popped on ascent, and never outlive the
//! projection pass that created them.

use std::collections::HashMap;

use readkit_odata::{Error, OrderBySpec, SkipToken, TokenValue};
use sea_orm::EntityTrait;

use crate::meta::EntityMeta;
use crate::orderby::{resolve_order_by, SortKey};
use crate::translate::validate_eager_load;

struct Frame {
    name: String,
    #[allow(dead_code)] // parent chain kept for debugging walks
    parent: Option<usize>,
    overrides: HashMap<String, bool>,
}

/// Per-response expansion decisions and next-page-link construction.
///
/// Must be created with the *same* order-by spec and `top` the translator
/// ran with, so the re-derived skip token resumes the page correctly.
#[must_use]
pub struct Projector<'a, E: EntityTrait> {
    meta: &'a EntityMeta<E>,
    keys: Vec<SortKey<E>>,
    signed_order: String,
    top: Option<u64>,
    expand_paths: Vec<Vec<String>>,
    frames: Vec<Frame>,
    stack: Vec<usize>,
}

impl<'a, E> Projector<'a, E>
where
    E: EntityTrait,
    E::Column: Copy,
{
    /// # Errors
    /// `InvalidEagerLoad` for empty eager-load entries,
    /// `InvalidOrderByField` if the order-by spec does not resolve against
    /// the metadata.
    pub fn new(
        meta: &'a EntityMeta<E>,
        order_by: Option<&OrderBySpec>,
        top: Option<u64>,
        eager_load: Option<&[String]>,
    ) -> Result<Self, Error> {
        validate_eager_load(eager_load)?;
        let order = resolve_order_by(order_by, meta)?;
        let signed_order = order.to_signed_tokens();
        let expand_paths = eager_load
            .unwrap_or(&[])
            .iter()
            .map(|p| p.split('/').map(str::to_lowercase).collect())
            .collect();

        let root = Frame {
            name: String::new(),
            parent: None,
            overrides: HashMap::new(),
        };
        Ok(Self {
            meta,
            keys: order.keys,
            signed_order,
            top,
            expand_paths,
            frames: vec![root],
            stack: vec![0],
        })
    }

    fn current(&self) -> usize {
        // The root frame is never popped, so the stack is never empty.
        *self.stack.last().unwrap_or(&0)
    }

    /// Depth of the current descent (0 at the top level).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Descend into a navigation property.
    pub fn push_segment(&mut self, name: impl Into<String>) {
        let frame = Frame {
            name: name.into().to_lowercase(),
            parent: Some(self.current()),
            overrides: HashMap::new(),
        };
        self.frames.push(frame);
        let idx = self.frames.len() - 1;
        self.stack.push(idx);
    }

    /// Ascend out of the current navigation property. Returns its name, or
    /// `None` when already at the top level.
    pub fn pop_segment(&mut self) -> Option<String> {
        if self.stack.len() <= 1 {
            return None;
        }
        let idx = self.stack.pop()?;
        Some(self.frames[idx].name.clone())
    }

    /// Record an explicit expand/collapse decision for `name` on the
    /// current frame. Explicit decisions win over the eager-load policy.
    pub fn set_expansion(&mut self, name: impl Into<String>, expand: bool) {
        let idx = self.current();
        self.frames[idx]
            .overrides
            .insert(name.into().to_lowercase(), expand);
    }

    /// Should the named navigation property be expanded inline at the
    /// current position?
    #[must_use]
    pub fn should_expand_segment(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if let Some(decision) = self.frames[self.current()].overrides.get(&name) {
            return *decision;
        }

        let mut path: Vec<&str> = self.stack[1..]
            .iter()
            .map(|&i| self.frames[i].name.as_str())
            .collect();
        path.push(&name);

        self.expand_paths.iter().any(|p| {
            p.len() >= path.len() && p.iter().zip(path.iter()).all(|(a, b)| a == b)
        })
    }

    /// Does this page need a next-page link? True exactly when a page-size
    /// limit was in effect and the page filled it.
    #[must_use]
    pub fn need_next_page_link(&self, result_set_count: u64) -> bool {
        self.top.is_some_and(|top| result_set_count >= top)
    }

    /// Re-derive the continuation token from the last entity emitted in the
    /// current page, in the same column order and direction the translator
    /// used to build it.
    ///
    /// # Errors
    /// `InvalidOrderByField` when a sort key has no registered token-value
    /// extractor (relation-qualified keys cannot be re-derived from the
    /// root model).
    pub fn next_link_token(&self, last: &E::Model) -> Result<SkipToken, Error> {
        let mut values = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let rendered = self
                .meta
                .encode_token_value(last, &key.name)
                .ok_or_else(|| Error::InvalidOrderByField(key.name.clone()))?;
            values.push(TokenValue::new(rendered, key.kind));
        }
        Ok(SkipToken::new(values, self.signed_order.clone()))
    }

    /// Compose the next-page reference for `base` (a collection URI, with
    /// or without an existing query string).
    ///
    /// # Errors
    /// Same as [`Projector::next_link_token`], plus `TokenInvalidValues` if
    /// encoding fails.
    pub fn next_link_uri(&self, base: &str, last: &E::Model) -> Result<String, Error> {
        let token = self
            .next_link_token(last)?
            .encode()
            .map_err(|_| Error::TokenInvalidValues)?;
        let sep = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{base}{sep}$skiptoken={token}"))
    }
}
