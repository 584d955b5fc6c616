//! The five-stage in-order pipeline CPU.

use crate::chronogram::Chronogram;
use crate::error::RuntimeError;
use crate::isa::{Context, Instruction, Signal};
use crate::memory::Memory;
use crate::pipeline::latches::{PipelineState, Stage};
use crate::regfile::RegisterFile;
use crate::stats::Statistics;

/// Run status shared in spirit with the reservation-station engine: a CPU
/// starts `Halted` and must be explicitly [`PipelineCpu::start`]ed, then
/// moves to `Stopping` once a `Halt` instruction reaches decode, and finally
/// back to `Halted` once the pipeline has drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuStatus {
    Running,
    Stopping,
    Halted,
}

enum RunStageError {
    Signal(Stage, Signal),
    Runtime(RuntimeError),
}

impl From<RuntimeError> for RunStageError {
    fn from(e: RuntimeError) -> Self {
        RunStageError::Runtime(e)
    }
}

/// The classic five-stage in-order pipeline: Fetch, Decode, Execute, Memory,
/// Writeback. Stalls on RAW hazards (via register locks) and flushes on any
/// taken branch or jump. No forwarding, no branch prediction.
pub struct PipelineCpu {
    regs: RegisterFile,
    memory: Memory,
    pc: i64,
    state: PipelineState,
    status: CpuStatus,
    next_id: i64,
    stats: Statistics,
    chronogram: Chronogram,
}

impl PipelineCpu {
    pub fn new(memory: Memory, phase_cycles: [i32; 5]) -> Self {
        Self {
            regs: RegisterFile::new(),
            memory,
            pc: 0,
            state: PipelineState::new(phase_cycles),
            status: CpuStatus::Halted,
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

    /// Advances the simulation by one cycle.
    ///
    /// Mirrors, stage by stage, the reverse-order cycle algorithm of
    /// spec.md §4.4: WB, then MEM, then EX, then ID, then a fresh fetch into
    /// IF. Whichever stage raises a signal first ends that stage's
    /// processing for the cycle; every stage still unprocessed this cycle
    /// (those between it and IF) is left exactly as it was.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        if self.status == CpuStatus::Halted {
            return Err(RuntimeError::HaltedCpu);
        }

        match self.run_stages() {
            Ok(()) => {}
            Err(RunStageError::Runtime(e)) => return Err(e),
            Err(RunStageError::Signal(_, Signal::Halt)) => {
                if self.status == CpuStatus::Running {
                    self.status = CpuStatus::Stopping;
                    self.state.insert_bubble(Stage::If);
                }
                self.do_fetch(Instruction::Bubble);
            }
            Err(RunStageError::Signal(_, Signal::RawDependency)) => {
                self.stall(Stage::Id);
            }
            Err(RunStageError::Signal(_, Signal::Jump(addr))) => {
                self.state.insert_bubble(Stage::If);
                self.pc = addr;
                let next = self.next_fetch_instruction();
                self.do_fetch(next);
            }
            Err(RunStageError::Signal(stage, Signal::StageNotFinished))
            | Err(RunStageError::Signal(stage, Signal::FunctionalUnitNotFinished)) => {
                self.stall(stage);
            }
        }

        self.record_chronogram_snapshot();
        self.stats.record_cycle();

        if self.status == CpuStatus::Stopping && self.state.is_drained() {
            self.status = CpuStatus::Halted;
        }

        Ok(())
    }

    fn run_stages(&mut self) -> Result<(), RunStageError> {
        self.process_stage(Stage::Wb)?;
        self.process_stage(Stage::Mem)?;
        self.process_stage(Stage::Ex)?;
        self.process_stage(Stage::Id)?;
        let next = self.next_fetch_instruction();
        self.do_fetch(next);
        Ok(())
    }

    /// Reads whatever sits at `pc`, advancing it, while `Running`.
    ///
    /// A cell that isn't code is treated as nothing-to-fetch rather than a
    /// hard error: the slot this lands in is one cycle away from being
    /// flushed by the real `Halt` working its way through decode, so it is
    /// never actually decoded. Mirrors the reservation-station engine's
    /// `issue()`, which stops rather than errors once memory stops holding
    /// instructions.
    fn next_fetch_instruction(&mut self) -> Instruction {
        if self.status != CpuStatus::Running {
            return Instruction::Bubble;
        }
        match self.memory.read_instruction(self.pc) {
            Ok(inst) => {
                self.pc += 1;
                (*inst).clone()
            }
            Err(_) => Instruction::Bubble,
        }
    }

    fn do_fetch(&mut self, next: Instruction) {
        let vacating = self.state.get(Stage::If).clone();
        self.state
            .install(Stage::Id, vacating.instruction, vacating.id);
        let id = self.next_id;
        self.next_id += 1;
        self.state.install(Stage::If, next, id);
    }

    fn stall(&mut self, stage: Stage) {
        if let Some(next) = stage.next() {
            self.state.insert_bubble(next);
        }
    }

    fn move_forward(&mut self, stage: Stage) {
        if let Some(next) = stage.next() {
            let slot = self.state.get(stage).clone();
            self.state.install(next, slot.instruction, slot.id);
        }
    }

    /// Generic ID/EX/MEM/WB processing: gates on the stage's own latency
    /// first, then invokes the corresponding phase method.
    fn process_stage(&mut self, stage: Stage) -> Result<(), RunStageError> {
        let not_bubble = !self.state.get(stage).instruction.is_bubble();

        if not_bubble && self.state.get(stage).remaining_cycles > 1 {
            self.state.get_mut(stage).remaining_cycles -= 1;
            return Err(RunStageError::Signal(stage, Signal::StageNotFinished));
        }
        if not_bubble {
            let reset = self.state.phase_cycles(stage);
            self.state.get_mut(stage).remaining_cycles = reset;
        }

        match stage {
            Stage::Wb => {
                {
                    let mut ctx = Context::new(&mut self.regs, &mut self.memory);
                    let _ = self.state.get_mut(Stage::Wb).instruction.writeback(&mut ctx);
                }
                if not_bubble {
                    self.stats.record_retirement();
                }
                Ok(())
            }
            Stage::Mem => {
                let result = {
                    let mut ctx = Context::new(&mut self.regs, &mut self.memory);
                    self.state.get_mut(Stage::Mem).instruction.memory_access(&mut ctx)
                };
                result?;
                self.move_forward(Stage::Mem);
                Ok(())
            }
            Stage::Ex => {
                let result = {
                    let mut ctx = Context::new(&mut self.regs, &mut self.memory);
                    self.state.get_mut(Stage::Ex).instruction.execute(&mut ctx)
                };
                match result {
                    Ok(()) => {
                        self.move_forward(Stage::Ex);
                        Ok(())
                    }
                    Err(sig) => Err(RunStageError::Signal(Stage::Ex, sig)),
                }
            }
            Stage::Id => {
                let result = {
                    let mut ctx = Context::new(&mut self.regs, &mut self.memory);
                    self.state.get_mut(Stage::Id).instruction.decode(&mut ctx)
                };
                match result {
                    Ok(()) => {
                        self.move_forward(Stage::Id);
                        Ok(())
                    }
                    Err(sig @ Signal::Halt) | Err(sig @ Signal::Jump(_)) => {
                        self.move_forward(Stage::Id);
                        Err(RunStageError::Signal(Stage::Id, sig))
                    }
                    Err(sig) => Err(RunStageError::Signal(Stage::Id, sig)),
                }
            }
            Stage::If => unreachable!("IF is driven by do_fetch, not process_stage"),
        }
    }

    fn record_chronogram_snapshot(&mut self) {
        let cycle_number = self.stats.cycles_elapsed + 1;
        for stage in Stage::ALL {
            let slot = self.state.get(stage);
            if !slot.instruction.is_bubble() {
                self.chronogram.record(slot.id, cycle_number, stage.label());
            }
        }
    }
}
