//! sea-orm adapter for `listkit`: compiles a [`listing_core::QuerySpec`]
//! into a `sea_orm::Select` and runs it.

mod condition;
mod repo;

pub use condition::{coerce, predicate_to_condition, Field, FieldKind, FieldMap, QuerySpecExt};
pub use repo::SeaOrmRepository;
