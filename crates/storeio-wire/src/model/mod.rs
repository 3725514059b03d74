//! Data model for the Store's proto-shaped messages (spec §3).

pub(crate) mod int_string;

mod entity;
mod key;
mod mutation;
mod partition;
mod query;
mod value;

pub use entity::Entity;
pub use key::{Key, PathElement};
pub use mutation::{CommitMode, Mutation, MutationResult};
pub use partition::PartitionId;
pub use query::{
    CompositeFilter, CompositeOp, Filter, KindExpression, PropertyFilter, PropertyFilterOp,
    PropertyOrder, Query, SortDirection,
};
pub use value::Value;
