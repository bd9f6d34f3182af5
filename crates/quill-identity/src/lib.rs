// src/lib.rs
//
// Source identity primitives shared by the input tree and the code emitter.

mod node;
mod span;

pub use node::NodeId;
pub use span::Span;
