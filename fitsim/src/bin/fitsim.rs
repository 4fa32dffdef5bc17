use std::{io::BufWriter, process::ExitCode};

use clap::error::ErrorKind;
use fitsim::*;

/// A simulator of contiguous memory allocation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Placement algorithm
    #[arg(value_enum)]
    fit:            Option<FitKind>,

    /// Read the workload from a file instead of stdin
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:          Option<PathBuf>,

    /// Memory size
    #[arg(short, long, default_value_t = 100)]
    #[arg(value_parser = clap::value_parser!(Units))]
    memory_size:    Units,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 100)]
    #[arg(value_parser = clap::value_parser!(Units))]
    total_time:     Units,

    /// Number of processes to read
    #[arg(short = 'n', long, default_value_t = 50)]
    #[arg(value_parser = clap::value_parser!(usize))]
    processes:      usize,

    /// Only print the final summary
    #[arg(short, long, default_value_t = false)]
    quiet:          bool,

    /// Run all four algorithms on the workload and compare them
    #[arg(short, long, default_value_t = false)]
    compare:        bool,

    /// Log placement decisions to stderr (twice to also log merges)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose:        u8,
}

/// Prints log records to stderr, one per line.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn level_for(verbose: u8) -> log::LevelFilter {
    match verbose {
        0   => log::LevelFilter::Warn,
        1   => log::LevelFilter::Debug,
        _   => log::LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    let prog = std::env::args()
        .next()
        .unwrap_or_else(|| String::from("fitsim"));
    // Bad usage is not an error: explain and leave quietly.
    let cli = match Args::try_parse() {
        Ok(cli)     => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        },
        Err(_)      => {
            instructions(&prog);
            return ExitCode::SUCCESS;
        },
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_for(cli.verbose));
    }
    if cli.fit.is_none() && !cli.compare {
        instructions(&prog);
        return ExitCode::SUCCESS;
    }

    match simulate(cli) {
        Ok(())  => ExitCode::SUCCESS,
        Err(e)  => {
            eprintln!("{prog}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn simulate(cli: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = SimConfig {
        memory_size:    cli.memory_size,
        total_time:     cli.total_time,
        processes:      cli.processes,
    };
    config.validate()?;
    let specs = match cli.input {
        Some(path)  => TextWorkload::from_path(path)?.read_specs(config.processes)?,
        None        => TextWorkload::new(std::io::stdin().lock()).read_specs(config.processes)?,
    };
    println!("Finished reading");

    if cli.compare {
        for s in compare(config, &specs)? {
            print!("{s}");
            println!(
                "\t{} finished, {} never placed, {} holes left ({} units free, largest {})",
                s.finished,
                s.never_placed,
                s.fragmentation.holes,
                s.fragmentation.free,
                s.fragmentation.largest_hole
            );
        }
        return Ok(());
    }

    let Some(fit) = cli.fit else { return Ok(()); };
    let mut sim = Simulator::new(config, fit, specs)?;
    let summary = if cli.quiet {
        sim.run(&mut Silent)?
    } else {
        let mut reporter = TextReporter::new(BufWriter::new(std::io::stdout().lock()));
        sim.run(&mut reporter)?
    };
    print!("{summary}");

    Ok(())
}

fn instructions(command: &str) {
    println!("Usage: {command} fit-type");
    println!("  where fit-type is");
    println!("     f   for first fit");
    println!("     n   for next fit");
    println!("     b   for best fit");
    println!("     w   for worst fit");
    println!("  (run with --help for the remaining options)");
}
