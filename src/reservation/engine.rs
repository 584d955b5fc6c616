//! The centralized reservation-station CPU: issue, dispatch, execute, drain.

use crate::chronogram::Chronogram;
use crate::error::RuntimeError;
use crate::isa::{Context, Signal};
use crate::memory::Memory;
use crate::regfile::RegisterFile;
use crate::reservation::buffer::ShelvingBuffer;
use crate::reservation::unit::{FunctionalUnit, UnitKind, UnitStepError};
use crate::stats::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuStatus {
    Running,
    Stopping,
    Halted,
}

/// Per-opcode-class functional-unit latencies, mirroring
/// [`crate::config::ReservationStationConfig`].
#[derive(Debug, Clone, Copy)]
pub struct UnitLatencies {
    pub add: i32,
    pub mult: i32,
    pub memory: i32,
}

/// Reservation-station CPU: a single shelving buffer feeding four fixed
/// units in order `[Add, Mult, Mult, Memory]` (spec.md §4.7), issuing up to
/// `scalability` instructions per cycle in program order and executing out
/// of order across units, with writeback committed in ascending held-id
/// order within a cycle.
pub struct ReservationStationCpu {
    regs: RegisterFile,
    memory: Memory,
    pc: i64,
    status: CpuStatus,
    scalability: usize,
    buffer: ShelvingBuffer,
    units: Vec<FunctionalUnit>,
    next_id: i64,
    stats: Statistics,
    chronogram: Chronogram,
}

impl ReservationStationCpu {
    pub fn new(memory: Memory, scalability: usize, latencies: UnitLatencies) -> Self {
        let units = vec![
            FunctionalUnit::new(0, UnitKind::Add, latencies.add),
            FunctionalUnit::new(1, UnitKind::Mult, latencies.mult),
            FunctionalUnit::new(2, UnitKind::Mult, latencies.mult),
            FunctionalUnit::new(3, UnitKind::Memory, latencies.memory),
        ];
        Self {
            regs: RegisterFile::new(),
            memory,
            pc: 0,
            status: CpuStatus::Halted,
            scalability: scalability.max(1),
            buffer: ShelvingBuffer::new(),
            units,
            next_id: 0,
            stats: Statistics::new(),
            chronogram: Chronogram::new(),
        }
    }

    pub fn start(&mut self) {
        self.status = CpuStatus::Running;
    }

    pub fn is_halted(&self) -> bool {
        self.status == CpuStatus::Halted
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn chronogram(&self) -> &Chronogram {
        &self.chronogram
    }

    /// Advances the simulation by one cycle: issue, dispatch, execute, then
    /// the halt/drain check, per spec.md §4.7.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        if self.status == CpuStatus::Halted {
            return Err(RuntimeError::HaltedCpu);
        }

        let cycle = self.stats.cycles_elapsed + 1;
        let halted_this_cycle = match self.run_cycle(cycle) {
            Ok(()) => false,
            Err(UnitStepError::Signal(Signal::Halt)) => true,
            Err(UnitStepError::Signal(other)) => {
                unreachable!("functional units never surface {other:?} to the CPU")
            }
            Err(UnitStepError::Memory(e)) => return Err(e),
        };

        if halted_this_cycle && self.status == CpuStatus::Running {
            self.status = CpuStatus::Stopping;
        }

        self.stats.record_cycle();

        if self.status == CpuStatus::Stopping && self.buffer.is_empty() && self.all_units_drained() {
            self.status = CpuStatus::Halted;
        }

        Ok(())
    }

    fn run_cycle(&mut self, cycle: u64) -> Result<(), UnitStepError> {
        self.issue(cycle);
        self.buffer.dispatch_one(&mut self.units);
        self.execute(cycle)
    }

    /// Issues up to `scalability` instructions this cycle, stopping early if
    /// the next memory cell is not an `Instruction` (the teacher's "ugly
    /// fix" bound-reached check) or the CPU is no longer `Running`.
    fn issue(&mut self, cycle: u64) {
        for _ in 0..self.scalability {
            if self.status != CpuStatus::Running {
                break;
            }
            let Ok(inst) = self.memory.read_instruction(self.pc) else {
                break;
            };
            self.pc += 1;
            let id = self.next_id;
            self.next_id += 1;
            self.buffer.add((*inst).clone(), id);
            self.chronogram.record(id, cycle, crate::chronogram::STAGE_FETCH);
        }
    }

    /// Executes every unit, in ascending held-instruction-id order so older
    /// instructions commit first within a cycle (spec.md §4.7's commit-order
    /// rule). A `Signal::Halt` or failed memory access from any unit stops
    /// the scan for this cycle, matching the teacher's uncaught-exception
    /// propagation out of the `for execution_unit in ...` loop. Every unit
    /// that commits a retiring writeback this cycle feeds
    /// `self.stats` directly, since a unit has no access to `Statistics`
    /// itself.
    fn execute(&mut self, cycle: u64) -> Result<(), UnitStepError> {
        let mut order: Vec<usize> = (0..self.units.len()).collect();
        order.sort_by_key(|&i| self.units[i].held_id().unwrap_or(i64::MAX));

        for i in order {
            let mut ctx = Context::new(&mut self.regs, &mut self.memory);
            if self.units[i].execute(&mut ctx, &mut self.chronogram, cycle)? {
                self.stats.record_retirement();
            }
        }
        Ok(())
    }

    /// A unit counts as drained if it's free, or if it's still holding the
    /// `Halt` instruction itself (which never clears on its own — `Halt`'s
    /// `writeback` is a no-op, but it does still run the full decode →
    /// complete → writeback cycle and frees its unit exactly like any other
    /// instruction, so this mirrors the teacher's `has_halt` skip only for
    /// symmetry with spec.md §4.7 step 5's wording).
    fn all_units_drained(&self) -> bool {
        self.units.iter().all(|u| u.is_free() || u.holds_halt())
    }
}
