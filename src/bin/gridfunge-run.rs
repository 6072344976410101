//! gridfunge-run - Headless runner for grid programs
//!
//! # Usage
//!
//! ```bash
//! # Run until every pointer terminates (at most 1000 ticks)
//! gridfunge-run programs/countdown.bf
//!
//! # Fixed tick budget with a custom board size
//! gridfunge-run --ticks 50 --config board.json programs/countdown.bf
//!
//! # Print every tick
//! gridfunge-run -v programs/countdown.bf
//! ```
//!
//! # Exit Codes
//!
//! - 0: Program ran (faults are reported, not fatal)
//! - 1: Board or config failed to load
//! - 2: Invalid arguments

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use gridfunge::vm::SharedScheduler;
use gridfunge::{
    load_path, AnimationScheduler, Clock, Config, Direction, InstructionPointer, Interpreter,
    PointerId, Positionable, TickReport, Toggle, ToroidalGrid,
};

const DEFAULT_TICKS: u64 = 1000;

struct Options {
    board: PathBuf,
    ticks: Option<u64>,
    config: Option<PathBuf>,
    verbose: bool,
}

fn main() -> ExitCode {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("Error: {}\n", msg);
            print_help();
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, String> {
    let mut board = None;
    let mut ticks = None;
    let mut config = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => return Ok(None),
            "-t" | "--ticks" => {
                let value = args.next().ok_or("--ticks needs a value")?;
                let n = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid tick count: {}", value))?;
                ticks = Some(n);
            }
            "-c" | "--config" => {
                let value = args.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(value));
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ if board.is_none() => board = Some(PathBuf::from(arg)),
            _ => return Err(format!("Unexpected argument: {}", arg)),
        }
    }

    let board = board.ok_or("No board file specified")?;
    Ok(Some(Options {
        board,
        ticks,
        config,
        verbose,
    }))
}

fn run(options: &Options) -> anyhow::Result<()> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut grid = load_path(&options.board, &config)?;

    let scheduler: SharedScheduler = Rc::new(RefCell::new(AnimationScheduler::new()));
    let ip = InstructionPointer::new(
        PointerId(0),
        &grid,
        0,
        0,
        Direction::Right,
        &scheduler,
        config.animation_duration(),
    )?;
    let mut clock = Clock::new(config.tick_period(), Interpreter::new())
        .context("Failed to create clock")?;
    clock.add_pointer(ip);

    let budget = options.ticks.unwrap_or(DEFAULT_TICKS);
    if budget > 0 {
        if let Toggle::Started(report) = clock.toggle(Duration::ZERO, &mut grid) {
            print_report(&report, &clock, options.verbose);
        }
    }
    while clock.is_running() && clock.ticks() < budget {
        let report = clock.tick(&mut grid);
        print_report(&report, &clock, options.verbose);
    }

    print_final(&grid, &clock);
    Ok(())
}

fn print_report(report: &TickReport, clock: &Clock, verbose: bool) {
    for (id, e) in report.faults() {
        eprintln!("  tick {}: {} fault: {}", report.tick, id, e);
    }
    if !verbose {
        return;
    }
    println!("tick {}", report.tick);
    for ip in clock.pointers() {
        println!(
            "  {} at {} facing {} stack {}",
            ip.id(),
            ip.position(),
            ip.direction(),
            ip.stack()
        );
    }
    for id in &report.terminated {
        println!("  {} terminated", id);
    }
}

fn print_final(grid: &ToroidalGrid, clock: &Clock) {
    println!("{}", grid);
    println!("{} ticks", clock.ticks());
    if clock.pointers().is_empty() {
        println!("all pointers terminated");
    }
    for ip in clock.pointers() {
        println!("{} at {} stack {}", ip.id(), ip.position(), ip.stack());
    }
}

fn print_help() {
    eprintln!("gridfunge-run - Run a grid program without a display");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    gridfunge-run [OPTIONS] <BOARD>");
    eprintln!();
    eprintln!("ARGS:");
    eprintln!("    <BOARD>    Program text, one line per row");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -t, --ticks <N>        Stop after N ticks (default {})", DEFAULT_TICKS);
    eprintln!("    -c, --config <FILE>    Board config JSON (rows, cols, tick_period_ms, ...)");
    eprintln!("    -v, --verbose          Print pointer state after every tick");
    eprintln!("    -h, --help             Print this help message");
    eprintln!();
    eprintln!("EXIT CODES:");
    eprintln!("    0    Program ran");
    eprintln!("    1    Board or config failed to load");
    eprintln!("    2    Invalid arguments");
}
