//! bundlecheck CLI
//!
//! Runs bundler conformance fixtures.

use std::path::PathBuf;

use bc_fixture::FixtureCategory;
use bcheck::commands::{list_cases, run_tests};
use bcheck::HarnessConfig;

fn main() {
    bcheck::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "test" | "list" => {
            // Root is optional, flags can come before or after
            let mut root: Option<String> = None;
            let mut config = HarnessConfig::default();
            let mut categories: Vec<FixtureCategory> = Vec::new();

            for arg in args.iter().skip(2) {
                if let Some(filter) = arg.strip_prefix("--filter=") {
                    config.filter = Some(filter.to_string());
                } else if arg == "--verbose" || arg == "-v" {
                    config.verbose = true;
                } else if arg == "--no-parallel" {
                    config.parallel = false;
                } else if let Some(name) = arg.strip_prefix("--category=") {
                    match name.parse() {
                        Ok(category) => categories.push(category),
                        Err(e) => {
                            eprintln!("error: {e}");
                            std::process::exit(1);
                        }
                    }
                } else if let Some(node) = arg.strip_prefix("--node=") {
                    config.node = PathBuf::from(node);
                } else if let Some(bundler) = arg.strip_prefix("--bundler=") {
                    config.bundler = Some(bundler.to_string());
                } else if let Some(transformer) = arg.strip_prefix("--transformer=") {
                    config.transformer = Some(transformer.to_string());
                } else if !arg.starts_with('-') && root.is_none() {
                    root = Some(arg.clone());
                } else {
                    eprintln!("Unknown option: {arg}");
                    std::process::exit(1);
                }
            }

            if !categories.is_empty() {
                config.categories = categories;
            }
            if let Some(root) = root {
                config.root = PathBuf::from(root);
            }

            if command == "list" {
                list_cases(&config);
            } else {
                run_tests(&config);
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" => {
            println!("bundlecheck {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("bundlecheck - conformance tests for module bundlers");
    println!();
    println!("Usage: bcheck <command> [root] [options]");
    println!();
    println!("Commands:");
    println!("  test [root]          Run fixtures (default root: ./test)");
    println!("  list [root]          List the cases that would run");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --bundler=<command>      Bundler bridge command (required for test)");
    println!("  --transformer=<command>  Transformer bridge command");
    println!("  --node=<path>            node executable (default: node)");
    println!("  --category=<name>        Only run function, form or sourcemaps (repeatable)");
    println!("  --filter=<pattern>       Only run cases whose id contains pattern");
    println!("  --verbose, -v            Show passing and skipped cases");
    println!("  --no-parallel            Run cases sequentially");
    println!();
    println!("Bridge commands are split into words; quote words containing spaces,");
    println!("e.g. --bundler='node \"/opt/my tools/bridge.js\"'.");
    println!();
    println!("Environment:");
    println!("  RUST_LOG                 Log filter (default: warn)");
}
