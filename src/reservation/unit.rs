//! Heterogeneous functional units for the reservation-station engine.

use crate::chronogram::Chronogram;
use crate::error::RuntimeError;
use crate::isa::{AluOp, Context, Instruction, MemOp, Signal};

/// Error surfaced from [`FunctionalUnit::execute`].
///
/// Either a control signal the owning engine must react to (only
/// `Signal::Halt` ever escapes this far — `RawDependency` and
/// `FunctionalUnitNotFinished` are consumed in-unit and retried next cycle),
/// or a runtime error from a LOAD/STORE's memory access during the unit's
/// in-line decode/execute/memory sequence. Unlike `Signal`, this must cross
/// out of `execute()` as a real `Result` rather than being swallowed, since
/// spec.md §7 requires runtime errors to surface to the caller of `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStepError {
    Signal(Signal),
    Memory(RuntimeError),
}

impl From<RuntimeError> for UnitStepError {
    fn from(e: RuntimeError) -> Self {
        UnitStepError::Memory(e)
    }
}

/// The three functional-unit kinds spec.md §3/§4.5 requires, each with its
/// own acceptance set of opcodes. Every kind additionally accepts `HALT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Add,
    Mult,
    Memory,
}

impl UnitKind {
    /// Whether a unit of this kind may accept `instruction`.
    ///
    /// Branches, jumps, and bubbles are never accepted by any kind — this
    /// mirrors the teacher's `ExecutionUnit.allows`, whose base case only
    /// ever returns `true` for `HALT`; no subclass adds a branch or jump
    /// opcode to its acceptance set.
    pub fn allows(self, instruction: &Instruction) -> bool {
        if instruction.is_halt() {
            return true;
        }
        match (self, instruction) {
            (UnitKind::Add, Instruction::Alu { opcode: AluOp::Add, .. }) => true,
            (UnitKind::Add, Instruction::Alu { opcode: AluOp::Sub, .. }) => true,
            (UnitKind::Mult, Instruction::Alu { opcode: AluOp::Mult, .. }) => true,
            (UnitKind::Mult, Instruction::Alu { opcode: AluOp::Div, .. }) => true,
            (UnitKind::Memory, Instruction::Mem { opcode: MemOp::Load, .. }) => true,
            (UnitKind::Memory, Instruction::Mem { opcode: MemOp::Store, .. }) => true,
            _ => false,
        }
    }
}

/// One functional unit: holds at most one in-flight instruction, its own
/// per-opcode latency countdown, and a `completed` flag that defers
/// writeback to the cycle *after* execution finishes (spec.md §4.5's
/// commit phase).
pub struct FunctionalUnit {
    id: usize,
    kind: UnitKind,
    latency: i32,
    held: Option<(Instruction, i64)>,
    remaining_cycles: i32,
    completed: bool,
}

impl FunctionalUnit {
    pub fn new(id: usize, kind: UnitKind, latency: i32) -> Self {
        Self {
            id,
            kind,
            latency,
            held: None,
            remaining_cycles: (latency - 1).max(0),
            completed: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn allows(&self, instruction: &Instruction) -> bool {
        self.kind.allows(instruction)
    }

    pub fn is_free(&self) -> bool {
        self.held.is_none()
    }

    /// Whether this unit is currently holding a `Halt` instruction — used
    /// by the CPU's drain check, which must not wait on a halted unit to
    /// free up (it never will; halt is only cleared by `writeback` no-op,
    /// same as any other instruction, so this is really just documentation
    /// of intent mirroring the teacher's `has_halt`).
    pub fn holds_halt(&self) -> bool {
        matches!(&self.held, Some((inst, _)) if inst.is_halt())
    }

    pub fn held_id(&self) -> Option<i64> {
        self.held.as_ref().map(|(_, id)| id)
    }

    /// Assigns `instruction` to this unit. Caller must have already checked
    /// [`FunctionalUnit::is_free`] and [`FunctionalUnit::allows`].
    pub fn assign(&mut self, instruction: Instruction, id: i64) {
        self.held = Some((instruction, id));
    }

    /// Advances this unit by one cycle: either commits a completed
    /// instruction's writeback, decrements a latency countdown, or attempts
    /// the decode/execute/memory sequence once latency has elapsed.
    ///
    /// Returns whether this call committed a retiring instruction (a
    /// non-`Bubble`, non-`Halt` writeback), so the owning engine can feed
    /// [`crate::stats::Statistics::record_retirement`].
    ///
    /// A `Signal::Halt` surfacing from decode is deliberately *not*
    /// swallowed here — it propagates to the caller so the owning engine
    /// can transition to `Stopping`, matching the teacher's
    /// `ExecutionUnit.execute` only catching `RawDependencySignal` and
    /// `FunctionalUnitNotFinishedSignal`. A failed LOAD/STORE memory access
    /// propagates the same way, as a `UnitStepError::Memory`, rather than
    /// panicking.
    pub fn execute(
        &mut self,
        ctx: &mut Context,
        chronogram: &mut Chronogram,
        cycle: u64,
    ) -> Result<bool, UnitStepError> {
        let Some((_, held_id)) = self.held else {
            return Ok(false);
        };

        if self.completed {
            chronogram.record(held_id, cycle, crate::chronogram::STAGE_WRITEBACK);
            let (mut inst, _) = self.held.take().expect("completed unit must hold an instruction");
            let retires = !inst.is_bubble() && !inst.is_halt();
            let _ = inst.writeback(ctx);
            self.remaining_cycles = (self.latency - 1).max(0);
            self.completed = false;
            return Ok(retires);
        }

        chronogram.record(held_id, cycle, crate::chronogram::STAGE_EXECUTE);

        if self.remaining_cycles > 0 {
            self.remaining_cycles -= 1;
            return Ok(false);
        }

        let (inst, _) = self.held.as_mut().expect("non-completed unit must hold an instruction");
        match run_phases(inst, ctx) {
            Ok(()) => {
                self.completed = true;
                Ok(false)
            }
            Err(UnitStepError::Signal(Signal::RawDependency))
            | Err(UnitStepError::Signal(Signal::FunctionalUnitNotFinished)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Runs `decode`, `execute`, and `memory_access` back to back inside one
/// functional unit, matching spec.md §4.5's "try the full decode/execute/
/// memory sequence in-line" rule. A failed memory access surfaces as
/// `UnitStepError::Memory` rather than panicking, per spec.md §7.
fn run_phases(inst: &mut Instruction, ctx: &mut Context) -> Result<(), UnitStepError> {
    inst.decode(ctx).map_err(UnitStepError::Signal)?;
    inst.execute(ctx).map_err(UnitStepError::Signal)?;
    inst.memory_access(ctx)?;
    Ok(())
}
