//! The shelving buffer: a FIFO of issued-but-not-dispatched instructions.

use std::collections::VecDeque;

use crate::isa::Instruction;
use crate::reservation::unit::FunctionalUnit;

/// FIFO queue of `(instruction, id)` pairs awaiting dispatch to a functional
/// unit. Head-of-line blocking: if the head instruction cannot be dispatched
/// this cycle, later entries do not overtake it, matching the teacher's
/// `ShelvingBuffer.dispatch_next_instruction_to_eu`.
#[derive(Debug, Default)]
pub struct ShelvingBuffer {
    entries: VecDeque<(Instruction, i64)>,
}

impl ShelvingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instruction` to the tail of the buffer under `id`, an id
    /// assigned by the owning engine's own monotonic counter (spec.md §4.6
    /// calls this "process-wide" for the reservation-station engine).
    pub fn add(&mut self, instruction: Instruction, id: i64) {
        self.entries.push_back((instruction, id));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inspects the head entry and scans `units` in the order given,
    /// dispatching to the first free unit that allows the head instruction.
    /// No-op if the buffer is empty or no unit currently accepts the head.
    pub fn dispatch_one(&mut self, units: &mut [FunctionalUnit]) {
        let Some((head, _)) = self.entries.front() else {
            return;
        };
        let Some(unit) = units.iter_mut().find(|u| u.is_free() && u.allows(head)) else {
            return;
        };
        let (inst, id) = self.entries.pop_front().expect("front already checked above");
        unit.assign(inst, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{AluOp, MemOp};
    use crate::reservation::unit::UnitKind;

    fn units() -> Vec<FunctionalUnit> {
        vec![
            FunctionalUnit::new(0, UnitKind::Add, 1),
            FunctionalUnit::new(1, UnitKind::Mult, 1),
            FunctionalUnit::new(2, UnitKind::Mult, 1),
            FunctionalUnit::new(3, UnitKind::Memory, 1),
        ]
    }

    #[test]
    fn dispatches_head_to_first_matching_free_unit() {
        let mut buf = ShelvingBuffer::new();
        buf.add(Instruction::alu(AluOp::Mult, 1, 2, 3, 1), 0);
        let mut us = units();
        buf.dispatch_one(&mut us);
        assert!(buf.is_empty());
        assert!(!us[1].is_free());
        assert!(us[0].is_free());
    }

    #[test]
    fn head_of_line_blocks_when_no_unit_matches() {
        let mut buf = ShelvingBuffer::new();
        buf.add(Instruction::mem(MemOp::Load, 1, 2, 0, 1), 0);
        buf.add(Instruction::alu(AluOp::Add, 4, 5, 6, 1), 1);
        let mut us = vec![FunctionalUnit::new(0, UnitKind::Mult, 1)];
        buf.dispatch_one(&mut us);
        assert_eq!(buf.len(), 2);
    }
}
