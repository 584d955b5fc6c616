//! Diagnostic, execution-independent dependency analysis.
//!
//! Grounded in `original_source/pipeline_simulator/core/compilers.py`'s
//! `DependencyAnalyzer`: a pairwise scan over the full instruction sequence
//! reporting RAW, WAW, and WAR register dependencies. This is diagnostic
//! only — spec.md §9 calls it out as present in the original but out of
//! core-engine scope, and spec.md §1's Non-goals exclude WAW/WAR
//! *enforcement*; reporting them here does not feed back into either
//! engine's execution.

use crate::isa::Instruction;

/// Which hazard kind a [`Dependency`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Raw,
    Waw,
    War,
}

/// One pairwise dependency: instruction at `earlier` and instruction at
/// `later` (both 0-based program-order indices) share register `register`
/// under the relation named by `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub kind: Kind,
    pub earlier: usize,
    pub later: usize,
    pub register: usize,
}

/// Scans `program` for every pairwise RAW/WAW/WAR register dependency.
///
/// Quadratic in program length, same as the source it's modeled on — this
/// never runs on the hot path of either engine, only on demand from the
/// CLI.
pub fn analyze(program: &[Instruction]) -> Vec<Dependency> {
    let mut deps = Vec::new();
    for (i, earlier) in program.iter().enumerate() {
        for (j, later) in program.iter().enumerate().skip(i + 1) {
            for &w in &earlier.write_set() {
                for &r in &later.read_set() {
                    if w == r {
                        deps.push(Dependency {
                            kind: Kind::Raw,
                            earlier: i,
                            later: j,
                            register: w,
                        });
                    }
                }
            }
            for &w1 in &earlier.write_set() {
                for &w2 in &later.write_set() {
                    if w1 == w2 {
                        deps.push(Dependency {
                            kind: Kind::Waw,
                            earlier: i,
                            later: j,
                            register: w1,
                        });
                    }
                }
            }
            for &r in &earlier.read_set() {
                for &w in &later.write_set() {
                    if r == w {
                        deps.push(Dependency {
                            kind: Kind::War,
                            earlier: i,
                            later: j,
                            register: r,
                        });
                    }
                }
            }
        }
    }
    deps
}

/// Renders a human-readable report, one line per dependency, grouped by
/// kind. The source this is modeled on prints its labels in Spanish; this
/// renders in English since the crate's other user-facing text does.
pub fn render(deps: &[Dependency]) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    for kind in [Kind::Raw, Kind::Waw, Kind::War] {
        let label = match kind {
            Kind::Raw => "RAW",
            Kind::Waw => "WAW",
            Kind::War => "WAR",
        };
        let _ = writeln!(out, "-- {label} dependencies --");
        for dep in deps.iter().filter(|d| d.kind == kind) {
            let _ = writeln!(
                out,
                "instruction {} -> instruction {} (R{})",
                dep.earlier, dep.later, dep.register
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{AluOp, MemOp};

    #[test]
    fn finds_raw_between_producer_and_consumer() {
        let program = vec![
            Instruction::alu(AluOp::Add, 1, 2, 3, 1),
            Instruction::alu(AluOp::Add, 4, 1, 5, 1),
        ];
        let deps = analyze(&program);
        assert!(deps
            .iter()
            .any(|d| d.kind == Kind::Raw && d.earlier == 0 && d.later == 1 && d.register == 1));
    }

    #[test]
    fn finds_waw_between_two_writers_of_the_same_register() {
        let program = vec![
            Instruction::alu(AluOp::Add, 1, 2, 3, 1),
            Instruction::mem(MemOp::Load, 1, 2, 0, 1),
        ];
        let deps = analyze(&program);
        assert!(deps.iter().any(|d| d.kind == Kind::Waw && d.register == 1));
    }

    #[test]
    fn finds_war_when_a_later_write_targets_an_earlier_read() {
        let program = vec![
            Instruction::alu(AluOp::Add, 1, 2, 3, 1),
            Instruction::alu(AluOp::Add, 2, 4, 5, 1),
        ];
        let deps = analyze(&program);
        assert!(deps.iter().any(|d| d.kind == Kind::War && d.register == 2));
    }

    #[test]
    fn independent_instructions_report_nothing() {
        let program = vec![
            Instruction::alu(AluOp::Add, 1, 2, 3, 1),
            Instruction::alu(AluOp::Add, 4, 5, 6, 1),
        ];
        assert!(analyze(&program).is_empty());
    }
}
