//! `pipesim` — CLI entrypoint driving the pipelined or reservation-station
//! engine over an assembly program.

use std::path::PathBuf;
use std::{fs, process};

use clap::{Parser as ClapParser, ValueEnum};

use risc_pipesim::asm::{regfile_init, Parser as AsmParser};
use risc_pipesim::config::Config;
use risc_pipesim::diag;
use risc_pipesim::memory::Memory;
use risc_pipesim::pipeline::PipelineCpu;
use risc_pipesim::reservation::{ReservationStationCpu, UnitLatencies};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    Pipeline,
    ReservationStation,
}

/// Cycle-accurate simulator of a pipelined and a reservation-station RISC
/// core.
#[derive(ClapParser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Assembly source file.
    program: PathBuf,

    /// Optional register-initialization file (`R<n>=<int>` per line).
    #[arg(long)]
    regfile: Option<PathBuf>,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which micro-architecture to simulate.
    #[arg(long, value_enum, default_value_t = Engine::Pipeline)]
    engine: Engine,

    /// Force the chronogram to render even if the config disables it.
    #[arg(long)]
    chronogram: bool,

    /// Print the diagnostic RAW/WAW/WAR dependency report before running.
    #[arg(long)]
    show_dependencies: bool,

    /// Safety bound on the number of cycles to run — the core engines have
    /// no notion of this; it exists purely to keep a non-halting program
    /// from looping this CLI forever.
    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Pipeline => write!(f, "pipeline"),
            Engine::ReservationStation => write!(f, "reservation-station"),
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("error: cannot read config '{}': {e}", path.display());
                process::exit(1);
            });
            toml::from_str(&text).unwrap_or_else(|e| {
                eprintln!("error: malformed config '{}': {e}", path.display());
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    let source = fs::read_to_string(&args.program).unwrap_or_else(|e| {
        eprintln!("error: cannot read program '{}': {e}", args.program.display());
        process::exit(1);
    });

    let latencies = UnitLatencies {
        add: config.reservation_station.add_latency,
        mult: config.reservation_station.mult_latency,
        memory: config.reservation_station.memory_latency,
    };

    let parser = AsmParser::new(latencies);
    let program = parser.parse(&source).unwrap_or_else(|e| {
        eprintln!("parse error: {e}");
        process::exit(1);
    });
    log::info!("parsed {} instructions", program.len());

    if args.show_dependencies {
        let deps = diag::analyze(&program);
        print!("{}", diag::render(&deps));
    }

    let mut memory = Memory::new(config.memory.size_words);
    memory.load_program(program, 0).unwrap_or_else(|e| {
        eprintln!("error: program does not fit in memory: {e}");
        process::exit(1);
    });

    let show_chronogram = args.chronogram || config.pipeline.show_chronogram;

    match args.engine {
        Engine::Pipeline => {
            let mut cpu = PipelineCpu::new(memory, config.pipeline.phase_cycles);
            if let Some(path) = &args.regfile {
                load_regfile(path, cpu.regs_mut());
            }
            cpu.start();
            run_to_halt(&mut cpu, args.max_cycles);
            println!("{}", cpu.stats());
            if show_chronogram {
                print!("{}", cpu.chronogram().render());
            }
        }
        Engine::ReservationStation => {
            let mut cpu = ReservationStationCpu::new(memory, config.reservation_station.scalability, latencies);
            if let Some(path) = &args.regfile {
                load_regfile(path, cpu.regs_mut());
            }
            cpu.start();
            run_to_halt(&mut cpu, args.max_cycles);
            println!("{}", cpu.stats());
            if show_chronogram {
                print!("{}", cpu.chronogram().render());
            }
        }
    }
}

fn load_regfile(path: &PathBuf, regs: &mut risc_pipesim::RegisterFile) {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: cannot read regfile '{}': {e}", path.display());
        process::exit(1);
    });
    regfile_init::apply(&text, regs).unwrap_or_else(|e| {
        eprintln!("error: malformed regfile '{}': {e}", path.display());
        process::exit(1);
    });
}

/// Either simulated micro-architecture, enough to drive a uniform run loop
/// from the CLI.
trait Steppable {
    fn step(&mut self) -> Result<(), risc_pipesim::RuntimeError>;
    fn is_halted(&self) -> bool;
}

impl Steppable for PipelineCpu {
    fn step(&mut self) -> Result<(), risc_pipesim::RuntimeError> {
        PipelineCpu::step(self)
    }
    fn is_halted(&self) -> bool {
        PipelineCpu::is_halted(self)
    }
}

impl Steppable for ReservationStationCpu {
    fn step(&mut self) -> Result<(), risc_pipesim::RuntimeError> {
        ReservationStationCpu::step(self)
    }
    fn is_halted(&self) -> bool {
        ReservationStationCpu::is_halted(self)
    }
}

/// Steps `cpu` until it halts, a runtime error occurs, or `max_cycles` is
/// exceeded.
fn run_to_halt(cpu: &mut impl Steppable, max_cycles: u64) {
    for cycle in 0..max_cycles {
        if cpu.is_halted() {
            log::info!("halted after {cycle} cycles");
            return;
        }
        if let Err(e) = cpu.step() {
            eprintln!("runtime error: {e}");
            process::exit(1);
        }
    }
    eprintln!("error: program did not halt within {max_cycles} cycles");
    process::exit(1);
}
