//! Assembly source parsing and register-initialization file loading.
//!
//! Both stand apart from the core engines: a program needs to come from
//! somewhere before it can be stepped.

pub mod operand;
pub mod parser;
pub mod regfile_init;

pub use parser::Parser;
