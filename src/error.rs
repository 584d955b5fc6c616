//! Parse-time and runtime error types.
//!
//! Control signals (`Halt`, `RawDependency`, `Jump`, `StageNotFinished`,
//! `FunctionalUnitNotFinished`) are not errors and never appear here — they
//! live in [`crate::isa::Signal`] and are consumed entirely within a single
//! `step()` call.

use thiserror::Error;

/// Errors raised while parsing an assembly source or register-init file.
///
/// Each variant carries the 0-based source line number of the offending
/// line, matching the line-numbering scheme of the two-pass assembler in
/// [`crate::asm`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: malformed instruction")]
    MalformedInstruction { line: usize },

    #[error("line {line}: invalid opcode '{token}'")]
    InvalidOpcode { line: usize, token: String },

    #[error("line {line}: invalid operand '{token}'")]
    InvalidOperand { line: usize, token: String },

    #[error("line {line}: invalid label '{token}'")]
    InvalidLabel { line: usize, token: String },

    #[error("line {line}: register R{id} does not exist")]
    InvalidRegister { line: usize, id: i64 },

    #[error("line {line}: not enough operands")]
    NotEnoughOperands { line: usize },

    #[error("line {line}: malformed register-init assignment")]
    InvalidInitFile { line: usize },
}

/// Errors raised by the simulator engines while executing `step()`.
///
/// Runtime errors leave the CPU's state untouched: every precondition that
/// could raise one of these is checked before any state is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("memory address {addr} is out of range")]
    InvalidAddress { addr: i64 },

    #[error("register R{id} does not exist")]
    InvalidRegister { id: i64 },

    #[error("step() called on a halted CPU")]
    HaltedCpu,

    #[error("fetch at address {addr} found data, not an instruction")]
    IllegalFetch { addr: i64 },
}
