//! Execution context threaded through the four instruction phases.

use crate::memory::Memory;
use crate::regfile::RegisterFile;

/// Mutable access to the register file and memory shared by every phase
/// method. Instructions hold register ids and memory addresses, never
/// references, so phases reach shared state only through this context.
pub struct Context<'a> {
    pub regs: &'a mut RegisterFile,
    pub memory: &'a mut Memory,
}

impl<'a> Context<'a> {
    pub fn new(regs: &'a mut RegisterFile, memory: &'a mut Memory) -> Self {
        Self { regs, memory }
    }
}
