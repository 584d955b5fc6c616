//! Diagnostic, execution-independent analysis over a parsed program.

pub mod dependency;

pub use dependency::{analyze, render, Dependency, Kind};
