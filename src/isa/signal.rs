//! Control signals returned by the four instruction phases.
//!
//! The source this simulator is modeled on raises these as exceptions across
//! phase calls. Exceptions are non-local and invisible at a call site; here
//! every phase returns `Result<(), Signal>` instead, so the engine that
//! drives a phase always sees, in its own return type, whether anything
//! other than plain completion happened.

/// Non-error outcome of a phase call that the owning engine must react to.
///
/// These are not [`crate::error::RuntimeError`]s: they are expected,
/// frequent, and fully consumed within the `step()` call that produced them.
/// They never cross a cycle boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A `Halt` instruction reached decode.
    Halt,
    /// A source register is locked; the instruction must stay where it is
    /// and retry next cycle.
    RawDependency,
    /// A taken branch or an unconditional jump; carries the target address.
    Jump(i64),
    /// A stage (or the instruction occupying it) has not finished its
    /// configured multi-cycle latency yet.
    StageNotFinished,
    /// The functional unit holding this instruction has not finished its
    /// configured latency yet.
    FunctionalUnitNotFinished,
}
