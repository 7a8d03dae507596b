//! Pure resolvers bridging DSL intent to generated-code shape.
//!
//! Everything here operates on the extracted [`crate::context::Context`]
//! and returns new structures; nothing is mutated in place and nothing
//! errors: an unresolvable input is a valid outcome the backends
//! degrade around.

pub mod bind;
pub mod relations;
pub mod routes;

pub use bind::{BindChain, binding_base, binding_path, is_binding, resolve_bind_chain};
pub use relations::{FkEdge, ManyToMany, RelationGraph, resolve_relations};
pub use routes::{MutationRouteMatch, find_matching_route};
