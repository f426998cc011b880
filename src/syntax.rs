mod code;
mod errors;
pub mod traverse;
mod tree;

pub use code::Code;
pub use errors::AstError;
pub use traverse::{traverse, NodePath, Visitor};
pub use tree::*;
