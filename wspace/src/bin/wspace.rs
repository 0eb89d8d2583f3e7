use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wspace::error::UsageError;
use wspace::vm::Vm;
use wspace_syntax::Stream;

/// Run a Whitespace program.
#[derive(Debug, Parser)]
#[command(name = "wspace", version, about)]
struct Cli {
    /// Path to the Whitespace source file
    file: PathBuf,
    /// Trace each instruction to stderr before it executes
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let src = match fs::read(&cli.file) {
        Ok(src) => src,
        Err(err) => fail(UsageError::from_io(&cli.file, err)),
    };
    let stream = Stream::filter(&src);

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let res = Vm::new(stream, stdin, &mut stdout).and_then(|mut vm| vm.execute());
    if let Err(err) = res {
        fail(err);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("wspace=debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn fail<E: Display>(err: E) -> ! {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "wspace: {err}");
    let _ = stderr.flush();
    process::exit(1)
}
