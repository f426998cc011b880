#![deny(unused, nonstandard_style, rust_2018_idioms)]

pub mod arena;
pub mod asm;
pub mod compiler;
pub mod semantic;
pub mod syntax;

mod util;

pub use compiler::compile;
