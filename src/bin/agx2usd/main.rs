//! agx2usd - Convert AGX animated geometry into a time-sampled USD mesh.

use std::env;
use std::process;

use agx_usd::{ConvertError, ConvertOptions, Converter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Verbosity levels
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

/// Exit code for bad command lines.
const EXIT_USAGE: i32 = 1;

#[derive(Debug, PartialEq)]
struct Args {
    input: String,
    output: String,
    log_level: u8,
    options: ConvertOptions,
}

enum Command {
    Help,
    Convert(Args),
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let args = match parse_args(&args) {
        Ok(Command::Convert(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return;
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!();
            print_help();
            process::exit(EXIT_USAGE);
        }
    };

    init_tracing(args.log_level);

    if args.log_level >= LOG_INFO {
        println!("Converting AGX to USD:");
        println!("  Input:  {}", args.input);
        println!("  Output: {}", args.output);
    }

    let mut converter = Converter::new(args.options);
    match converter.convert_file(&args.input, &args.output) {
        Ok(report) => {
            if args.log_level >= LOG_INFO {
                println!();
                println!("Summary:");
                println!("  Time steps:       {}", report.time_steps_processed);
                println!("  Point samples:    {}", report.point_samples);
                println!("  Normal samples:   {}", report.normal_samples);
                println!("  Topology samples: {}", report.topology_samples);
                if !report.constant_arrays.is_empty() {
                    println!("  Constant arrays:  {}", report.constant_arrays.join(", "));
                }
                if report.skipped_params > 0 {
                    println!("  Skipped params:   {}", report.skipped_params);
                }
            }
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: ConvertError) -> ! {
    eprintln!("Error: {}", e);
    process::exit(e.exit_code());
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut log_level = LOG_INFO;
    let mut options = ConvertOptions::default();
    let mut positional: Vec<&str> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--verbose" => log_level = LOG_DEBUG,
            "-vv" | "--trace" => log_level = LOG_TRACE,
            "-q" | "--quiet" => log_level = LOG_QUIET,
            "--custom-primvars" => options.custom_primvars = true,
            "--no-mmap" => options.use_mmap = false,
            s if s.starts_with('-') && s.len() > 1 => return Err(format!("Unknown option '{}'", s)),
            s => positional.push(s),
        }
    }

    match positional.as_slice() {
        [input, output] => Ok(Command::Convert(Args {
            input: input.to_string(),
            output: output.to_string(),
            log_level,
            options,
        })),
        _ => Err(format!("Expected <input.agx> <output.usda>, got {} argument(s)", positional.len())),
    }
}

/// Install the stdout subscriber. `RUST_LOG` overrides the verbosity flags.
fn init_tracing(log_level: u8) {
    let level = match log_level {
        LOG_QUIET => "error",
        LOG_INFO => "info",
        LOG_DEBUG => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agx_usd={}", level)));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .without_time(),
    );
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging already initialized");
    }
}

fn print_help() {
    println!("agx2usd - Convert AGX animated geometry to USD");
    println!();
    println!("USAGE:");
    println!("    agx2usd [OPTIONS] <input.agx> <output.usda>");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only report errors");
    println!("    --custom-primvars    Write unmapped numeric arrays as primvars");
    println!("    --no-mmap            Read the input without memory mapping");
    println!("    -h, --help           Show this help");
    println!();
    println!("EXIT CODES:");
    println!("    0  success");
    println!("    1  usage error");
    println!("    2  input could not be opened");
    println!("    3  conversion failed");
    println!();
    println!("NOTES:");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - Output is written as .usda text (.usd is accepted as an alias)");
}
