//! Gullian compiler CLI.
//!
//! `gullian <infile> <outfile>`: compiles one `.gullian` source file into
//! one C translation unit. Exit code 0 on success; nonzero with a stderr
//! diagnostic on failure.

use std::path::Path;

use tracing_subscriber::EnvFilter;

fn main() {
    let filter =
        EnvFilter::try_from_env("GULLIAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        print_usage();
        std::process::exit(1);
    }

    let infile = Path::new(&args[1]);
    let outfile = Path::new(&args[2]);

    if let Err(diagnostic) = gullianc::compile_file(infile, outfile) {
        eprintln!("{diagnostic}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Gullian Compiler");
    println!();
    println!("Usage: gullian <infile> <outfile>");
    println!();
    println!("  <infile>   entry source file (.gullian)");
    println!("  <outfile>  destination for the emitted C");
    println!();
    println!("Environment:");
    println!("  GULLIAN_HOME  fallback search root for imports");
    println!("  GULLIAN_LOG   tracing filter for compiler internals");
}
