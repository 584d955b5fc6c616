//! Two-pass line-oriented assembly parser.
//!
//! Pass one scans non-comment, non-blank lines, numbering them 0-based and
//! recording any `label:` prefix. Pass two re-parses each line into an
//! [`Instruction`], resolving `BEQ`/`BNE`/`JMP` operands through the label
//! table built in pass one. Grounded in
//! `original_source/pipeline_simulator/core/compilers.py`'s `Parser.parse`.

use std::collections::HashMap;

use crate::asm::operand::{parse_mem_operand, parse_register};
use crate::error::ParseError;
use crate::isa::{AluOp, BranchOp, Instruction, MemOp};
use crate::reservation::UnitLatencies;

/// Builds [`Instruction`]s from assembly source text, gated on the
/// functional-unit latency table shared by both engines (spec.md §9: an
/// `ALU`/`Mem` instruction's own `remaining_cycles` is seeded from the same
/// `fu_cycles` table the reservation-station units use).
pub struct Parser {
    latencies: UnitLatencies,
}

impl Parser {
    pub fn new(latencies: UnitLatencies) -> Self {
        Self { latencies }
    }

    pub fn parse(&self, source: &str) -> Result<Vec<Instruction>, ParseError> {
        let labels = self.scan_labels(source)?;

        let mut program = Vec::new();
        for (line_no, raw) in source.lines().enumerate() {
            let Some(code) = strip_comment_and_trim(raw) else {
                continue;
            };
            let parsed = split_line(code, line_no)?;
            program.push(self.build_instruction(&parsed, line_no, &labels)?);
        }
        Ok(program)
    }

    /// Pass one: maps every label to the 0-based index of the instruction
    /// it prefixes.
    fn scan_labels(&self, source: &str) -> Result<HashMap<String, i64>, ParseError> {
        let mut labels = HashMap::new();
        let mut index: i64 = 0;
        for (line_no, raw) in source.lines().enumerate() {
            let Some(code) = strip_comment_and_trim(raw) else {
                continue;
            };
            let parsed = split_line(code, line_no)?;
            if let Some(label) = parsed.label {
                labels.insert(label.to_string(), index);
            }
            index += 1;
        }
        Ok(labels)
    }

    fn build_instruction(
        &self,
        line: &ParsedLine,
        line_no: usize,
        labels: &HashMap<String, i64>,
    ) -> Result<Instruction, ParseError> {
        let opcode = line.opcode.to_ascii_uppercase();
        let ops = &line.operands;

        let need = |n: usize| -> Result<(), ParseError> {
            if ops.len() < n {
                Err(ParseError::NotEnoughOperands { line: line_no })
            } else {
                Ok(())
            }
        };

        match opcode.as_str() {
            "ADD" | "SUB" | "MULT" | "DIV" => {
                need(3)?;
                let rd = parse_register(ops[0], line_no)?;
                let rs = parse_register(ops[1], line_no)?;
                let rt = parse_register(ops[2], line_no)?;
                let (op, latency) = match opcode.as_str() {
                    "ADD" => (AluOp::Add, self.latencies.add),
                    "SUB" => (AluOp::Sub, self.latencies.add),
                    "MULT" => (AluOp::Mult, self.latencies.mult),
                    _ => (AluOp::Div, self.latencies.mult),
                };
                Ok(Instruction::alu(op, rd, rs, rt, latency))
            }
            "LOAD" => {
                need(2)?;
                let rd = parse_register(ops[0], line_no)?;
                let (offset, rs) = parse_mem_operand(ops[1], line_no)?;
                Ok(Instruction::mem(MemOp::Load, rd, rs, offset, self.latencies.memory))
            }
            "STORE" => {
                need(2)?;
                let rs = parse_register(ops[0], line_no)?;
                let (offset, rd) = parse_mem_operand(ops[1], line_no)?;
                Ok(Instruction::mem(MemOp::Store, rd, rs, offset, self.latencies.memory))
            }
            "BEQ" | "BNE" => {
                need(3)?;
                let rs = parse_register(ops[0], line_no)?;
                let rt = parse_register(ops[1], line_no)?;
                let target = resolve_label(labels, ops[2], line_no)?;
                let op = if opcode == "BEQ" { BranchOp::Beq } else { BranchOp::Bne };
                Ok(Instruction::branch(op, rs, rt, target))
            }
            "JMP" => {
                need(1)?;
                let target = resolve_label(labels, ops[0], line_no)?;
                Ok(Instruction::jump(target))
            }
            "HALT" => Ok(Instruction::Halt),
            other => Err(ParseError::InvalidOpcode {
                line: line_no,
                token: other.to_string(),
            }),
        }
    }
}

fn resolve_label(labels: &HashMap<String, i64>, token: &str, line: usize) -> Result<i64, ParseError> {
    labels.get(token).copied().ok_or_else(|| ParseError::InvalidLabel {
        line,
        token: token.to_string(),
    })
}

/// Strips a trailing `#...` comment and surrounding whitespace; returns
/// `None` for a line that is blank after stripping (nothing to parse, and
/// it does not consume an instruction index).
fn strip_comment_and_trim(raw: &str) -> Option<&str> {
    let code = match raw.find('#') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let trimmed = code.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

struct ParsedLine<'a> {
    label: Option<&'a str>,
    opcode: &'a str,
    operands: Vec<&'a str>,
}

/// Splits one already-comment-stripped, non-blank line into an optional
/// label, an opcode, and a comma-separated operand list. Operand tokens may
/// be separated by any mix of whitespace around the commas — tokens are
/// rejoined with a single space before splitting on `,` so `R1,R2` and
/// `R1, R2` parse identically.
fn split_line(code: &str, line_no: usize) -> Result<ParsedLine<'_>, ParseError> {
    let tokens: Vec<&str> = code.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ParseError::MalformedInstruction { line: line_no });
    }

    let (label, rest) = match tokens[0].strip_suffix(':') {
        Some(name) if !name.is_empty() && is_identifier(name) => (Some(name), &tokens[1..]),
        _ => (None, &tokens[..]),
    };

    let opcode = rest.first().ok_or(ParseError::MalformedInstruction { line: line_no })?;
    let operand_tokens = &rest[1..];
    let joined = operand_tokens.join(" ");
    let operands = if joined.is_empty() {
        Vec::new()
    } else {
        joined.split(',').map(str::trim).collect()
    };

    Ok(ParsedLine {
        label,
        opcode,
        operands,
    })
}

fn is_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_alphanumeric() || c == '_')
}
