//! Entity metadata: the in-crate realization of the metadata-provider
//! contract. Maps protocol field names to entity columns and literal kinds,
//! names the primary key, and describes navigation relations for one-hop
//! relation-qualified ordering.

use std::collections::HashMap;

use readkit_odata::LiteralKind;
use sea_orm::{EntityTrait, RelationDef};

/// Renders a model's value for one field as a skip-token literal.
pub type TokenExtractor<E> = fn(&<E as EntityTrait>::Model) -> String;

#[derive(Clone)]
pub struct FieldMeta<E: EntityTrait> {
    pub col: E::Column,
    pub kind: LiteralKind,
    pub to_token_value: Option<TokenExtractor<E>>,
}

/// One sortable field on a related entity.
#[derive(Clone, Copy, Debug)]
pub struct RelatedField {
    pub column: &'static str,
    pub kind: LiteralKind,
}

/// A navigation relation usable as a one-hop order-by qualifier.
pub struct RelationMeta {
    def: fn() -> RelationDef,
    table: &'static str,
    fields: HashMap<String, RelatedField>,
}

impl RelationMeta {
    pub fn new(table: &'static str, def: fn() -> RelationDef) -> Self {
        Self {
            def,
            table,
            fields: HashMap::new(),
        }
    }

    #[must_use]
    pub fn field(
        mut self,
        api_name: impl Into<String>,
        column: &'static str,
        kind: LiteralKind,
    ) -> Self {
        self.fields
            .insert(api_name.into().to_lowercase(), RelatedField { column, kind });
        self
    }

    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    #[must_use]
    pub fn join(&self) -> RelationDef {
        (self.def)()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RelatedField> {
        self.fields.get(&name.to_lowercase())
    }
}

#[must_use]
pub struct EntityMeta<E: EntityTrait> {
    primary_key: String,
    fields: HashMap<String, FieldMeta<E>>,
    relations: HashMap<String, RelationMeta>,
}

impl<E: EntityTrait> EntityMeta<E> {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into().to_lowercase(),
            fields: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    pub fn field(mut self, api_name: impl Into<String>, col: E::Column, kind: LiteralKind) -> Self {
        self.fields.insert(
            api_name.into().to_lowercase(),
            FieldMeta {
                col,
                kind,
                to_token_value: None,
            },
        );
        self
    }

    pub fn field_with_extractor(
        mut self,
        api_name: impl Into<String>,
        col: E::Column,
        kind: LiteralKind,
        to_token_value: TokenExtractor<E>,
    ) -> Self {
        self.fields.insert(
            api_name.into().to_lowercase(),
            FieldMeta {
                col,
                kind,
                to_token_value: Some(to_token_value),
            },
        );
        self
    }

    pub fn relation(mut self, nav_name: impl Into<String>, meta: RelationMeta) -> Self {
        self.relations.insert(nav_name.into().to_lowercase(), meta);
        self
    }

    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldMeta<E>> {
        self.fields.get(&name.to_lowercase())
    }

    #[must_use]
    pub fn get_relation(&self, name: &str) -> Option<&RelationMeta> {
        self.relations.get(&name.to_lowercase())
    }

    /// Render `model`'s value for `field_name` as a skip-token literal,
    /// if an extractor was registered for that field.
    pub fn encode_token_value(&self, model: &E::Model, field_name: &str) -> Option<String> {
        let f = self.get(field_name)?;
        f.to_token_value.map(|f| f(model))
    }
}
