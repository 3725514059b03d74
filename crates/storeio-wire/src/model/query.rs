//! Structured queries (spec §3 "Query").

use serde::{Deserialize, Serialize};

/// Comparison operator of a property filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyFilterOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    HasAncestor,
}

impl PropertyFilterOp {
    #[must_use]
    pub const fn is_inequality(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    pub property: String,
    pub op: PropertyFilterOp,
    pub value: super::value::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeOp {
    And,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    pub op: CompositeOp,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum Filter {
    Composite(CompositeFilter),
    Property(PropertyFilter),
}

impl Filter {
    /// Whether this filter tree contains an inequality comparison
    /// anywhere (spec §3: a query with inequality filters is
    /// unsplittable).
    #[must_use]
    pub fn has_inequality(&self) -> bool {
        match self {
            Self::Property(p) => p.op.is_inequality(),
            Self::Composite(c) => c.filters.iter().any(Self::has_inequality),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOrder {
    pub property: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindExpression {
    pub name: String,
}

/// A structured query: exactly one `kind`, optional filter/order, an
/// optional user-set positive `limit`, and optional cursors (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub kind: Vec<KindExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<PropertyOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

impl Query {
    #[must_use]
    pub fn for_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: vec![KindExpression { name: kind.into() }],
            filter: None,
            order: Vec::new(),
            limit: None,
            start_cursor: None,
            end_cursor: None,
        }
    }

    #[must_use]
    pub fn order_by(mut self, property: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(PropertyOrder {
            property: property.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The single kind this query targets, or `None` if the query is
    /// malformed (zero or more than one kind — spec §3 requires exactly
    /// one).
    #[must_use]
    pub fn single_kind(&self) -> Option<&str> {
        match self.kind.as_slice() {
            [k] => Some(k.name.as_str()),
            _ => None,
        }
    }

    /// Spec §3: "a query has an inequality/limit property: it is
    /// unsplittable if it has a user limit or inequality filters;
    /// otherwise it is splittable."
    #[must_use]
    pub fn is_unsplittable(&self) -> bool {
        self.limit.is_some() || self.filter.as_ref().is_some_and(Filter::has_inequality)
    }
}
