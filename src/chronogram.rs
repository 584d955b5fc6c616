//! Per-instruction, per-cycle stage-occupancy recording and rendering.
//!
//! Storage and rendering are kept separate: [`Chronogram`] only records which
//! stage an instruction occupied on which cycle; [`Chronogram::render`]
//! consumes that record to produce the tab-delimited table. Instruction ids
//! are assigned monotonically by the owning engine and cycle numbers only
//! ever increase for a given id, so a `BTreeMap` keyed on each reproduces
//! insertion order without pulling in an ordered-map dependency.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One-character stage labels, in the order spec.md's rendering table uses.
pub const STAGE_FETCH: char = 'F';
pub const STAGE_DECODE: char = 'D';
pub const STAGE_EXECUTE: char = 'X';
pub const STAGE_MEMORY: char = 'M';
pub const STAGE_WRITEBACK: char = 'W';

/// Records stage occupancy per instruction id per cycle.
#[derive(Debug, Clone, Default)]
pub struct Chronogram {
    rows: BTreeMap<i64, BTreeMap<u64, char>>,
}

impl Chronogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that instruction `id` occupied `stage` during `cycle`
    /// (1-based). Overwrites any prior record for the same id/cycle pair.
    pub fn record(&mut self, id: i64, cycle: u64, stage: char) {
        self.rows.entry(id).or_default().insert(cycle, stage);
    }

    /// Whether any instruction has been recorded at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn last_cycle(&self) -> u64 {
        self.rows
            .values()
            .filter_map(|row| row.keys().next_back().copied())
            .max()
            .unwrap_or(0)
    }

    /// Renders the tab-delimited table: a header of cycle numbers `1..=N`
    /// inclusive, then one row per instruction in issue (ascending-id)
    /// order, blank before its first recorded stage and blank again once
    /// its recorded stages end.
    pub fn render(&self) -> String {
        let last = self.last_cycle();
        let mut out = String::new();

        for cycle in 1..=last {
            let _ = write!(out, "\t{cycle}");
        }
        out.push('\n');

        for (id, row) in &self.rows {
            let _ = write!(out, "{id}");
            for cycle in 1..=last {
                out.push('\t');
                if let Some(stage) = row.get(&cycle) {
                    out.push(*stage);
                }
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chronogram_has_no_rows() {
        let c = Chronogram::new();
        assert!(c.is_empty());
        assert_eq!(c.render(), "\n");
    }

    #[test]
    fn single_instruction_pads_leading_blank_cycles() {
        let mut c = Chronogram::new();
        c.record(0, 2, STAGE_FETCH);
        c.record(0, 3, STAGE_DECODE);
        let rendered = c.render();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("\t1\t2\t3"));
        assert_eq!(lines.next(), Some("0\t\tF\tD"));
    }

    #[test]
    fn rows_are_ordered_by_ascending_id() {
        let mut c = Chronogram::new();
        c.record(1, 1, STAGE_FETCH);
        c.record(0, 1, STAGE_FETCH);
        let rendered = c.render();
        let mut lines = rendered.lines();
        lines.next();
        assert_eq!(lines.next(), Some("0\tF"));
        assert_eq!(lines.next(), Some("1\tF"));
    }
}
