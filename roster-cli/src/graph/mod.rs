//! Identity resolution and graph accumulation for the roster model.

mod context;
mod models;
pub mod roles;

pub use context::BuildContext;
pub use models::{
    Assignment, AssignmentKey, ContactRecord, EntityChain, EntityNode, EntityType, Person,
};
