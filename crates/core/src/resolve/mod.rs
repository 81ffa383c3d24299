//! Resolvers consulted by the emitter: types, response branches and request bodies.

pub mod body;
pub mod response;
pub mod types;

pub use body::{BodyEncoding, BodyPlan};
pub use response::{ResponseBranch, ResponsePlan, StatusPredicate};
pub use types::{Instance, NameTable, TypeRef, TypeResolver};
