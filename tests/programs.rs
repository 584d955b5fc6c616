//! End-to-end scenarios: assemble a whole program, run an engine to halt,
//! and check the final register/memory state. Mirrors
//! `original_source/tests/__main__.py`'s `test_pipeline_code*` methods,
//! which assert on a fully-run CPU rather than on an isolated unit.

use risc_pipesim::asm::Parser;
use risc_pipesim::memory::Memory;
use risc_pipesim::pipeline::PipelineCpu;
use risc_pipesim::reservation::{ReservationStationCpu, UnitLatencies};

fn default_latencies() -> UnitLatencies {
    UnitLatencies { add: 1, mult: 1, memory: 1 }
}

fn assemble(source: &str) -> Vec<risc_pipesim::isa::Instruction> {
    Parser::new(default_latencies()).parse(source).expect("source should parse")
}

fn run_pipeline_to_halt(cpu: &mut PipelineCpu, max_cycles: u64) {
    cpu.start();
    let mut cycles = 0;
    while !cpu.is_halted() {
        cpu.step().expect("program should not raise a runtime error");
        cycles += 1;
        assert!(cycles < max_cycles, "program never halted within {max_cycles} cycles");
    }
}

fn run_rs_to_halt(cpu: &mut ReservationStationCpu, max_cycles: u64) {
    cpu.start();
    let mut cycles = 0;
    while !cpu.is_halted() {
        cpu.step().expect("program should not raise a runtime error");
        cycles += 1;
        assert!(cycles < max_cycles, "program never halted within {max_cycles} cycles");
    }
}

/// code1: a five-iteration RAW loop that stores a decrementing counter to
/// consecutive memory cells, run on the in-order pipeline.
#[test]
fn raw_loop_writes_decrementing_counter_to_memory() {
    let source = "
        Loop: STORE R2, 0(R1)
        ADD R1, R1, R3
        SUB R2, R2, R3
        BNE R2, R4, Loop
        HALT
    ";
    let program = assemble(source);

    let mut memory = Memory::new(128);
    memory.load_program(program, 0).unwrap();
    let mut cpu = PipelineCpu::new(memory, [1, 1, 1, 1, 1]);
    cpu.regs_mut().write(1, 100);
    cpu.regs_mut().write(2, 5);
    cpu.regs_mut().write(3, 1);

    run_pipeline_to_halt(&mut cpu, 1_000);

    for (i, expected) in [5, 4, 3, 2, 1].into_iter().enumerate() {
        assert_eq!(cpu.memory().read_word(100 + i as i64).unwrap(), expected);
    }
    assert_eq!(cpu.regs().read(2), 0);
    assert_eq!(cpu.regs().read(1), 105);
}

/// code2: a nested loop building a 10x10 multiplication table.
#[test]
fn nested_loop_builds_a_multiplication_table() {
    let source = "
        Loop: MULT R10, R5, R6
        STORE R10, 0(R2)
        ADD R2, R2, R1
        ADD R7, R7, R1
        ADD R8, R8, R1
        ADD R6, R6, R1
        BNE R6, R11, Loop
        ADD R5, R5, R1
        ADD R6, R0, R1
        BNE R5, R11, Loop
        HALT
    ";
    let program = assemble(source);

    let mut memory = Memory::new(2048);
    memory.load_program(program, 0).unwrap();
    let mut cpu = PipelineCpu::new(memory, [1, 1, 1, 1, 1]);
    cpu.regs_mut().write(1, 1);
    cpu.regs_mut().write(2, 1000);
    cpu.regs_mut().write(5, 1);
    cpu.regs_mut().write(6, 1);
    cpu.regs_mut().write(11, 11);

    run_pipeline_to_halt(&mut cpu, 20_000);

    for i in 0..10i64 {
        for j in 0..10i64 {
            let addr = 1000 + 10 * i + j;
            assert_eq!(
                cpu.memory().read_word(addr).unwrap(),
                (i + 1) * (j + 1),
                "mismatch at row {i} col {j}"
            );
        }
    }
    assert_eq!(cpu.regs().read(5), 11);
    assert_eq!(cpu.regs().read(6), 1);
    assert_eq!(cpu.regs().read(7), 100);
    assert_eq!(cpu.regs().read(8), 100);
}

/// code3: a branchless three-instruction program takes exactly
/// `stages + instructions - 1` cycles to drain (spec.md §8).
#[test]
fn branchless_program_takes_stages_plus_instructions_minus_one_cycles() {
    let source = "
        ADD R1, R2, R3
        SUB R4, R5, R6
        MULT R7, R8, R9
        HALT
    ";
    let program = assemble(source);
    let instruction_count = program.len() as u64;

    let mut memory = Memory::new(16);
    memory.load_program(program, 0).unwrap();
    let mut cpu = PipelineCpu::new(memory, [1, 1, 1, 1, 1]);

    run_pipeline_to_halt(&mut cpu, 1_000);

    assert_eq!(cpu.stats().cycles_elapsed, 5 + instruction_count - 1);
}

/// code5: independent LOAD/MULT/ADD instructions dispatched to three
/// different functional units and committed out of order under a
/// reservation-station engine with `scalability = 5`.
#[test]
fn reservation_station_commits_out_of_order_instructions_correctly() {
    let source = "
        LOAD R2, 89(R1)
        MULT R4, R10, R11
        ADD R6, R12, R13
        HALT
    ";
    let program = assemble(source);

    let mut memory = Memory::new(128);
    memory.write_word(89, 99).unwrap();
    memory.load_program(program, 0).unwrap();
    let mut cpu = ReservationStationCpu::new(memory, 5, default_latencies());
    cpu.regs_mut().write(10, 8);
    cpu.regs_mut().write(11, 9);
    cpu.regs_mut().write(12, 40);
    cpu.regs_mut().write(13, 44);

    run_rs_to_halt(&mut cpu, 1_000);

    assert_eq!(cpu.regs().read(2), 99);
    assert_eq!(cpu.regs().read(4), 72);
    assert_eq!(cpu.regs().read(6), 84);
}
