use clap::Parser;
use hall_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to create async runtime: {}", e);
            process::exit(1);
        });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    eprintln!("Failed to listen for CTRL+C: {}", e);
                }
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(hall_processor::Error::processing_interrupted(
                    "Processing interrupted by user",
                ))
            }
        }
    });

    match result {
        // Stats have already been reported by the command
        Ok(stats) if stats.has_failures() => process::exit(1),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Hall Processor - Lake Shore Hall Measurement Converter");
    println!("======================================================");
    println!();
    println!("Convert Lake Shore Hall measurement logs and instrument templates");
    println!("into structured YAML or JSON archive records.");
    println!();
    println!("USAGE:");
    println!("    hall-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process       Convert measurement logs into measurement and experiment records");
    println!("    instrument    Convert instrument templates into instrument records");
    println!("    inspect       Print the parsed sections, steps and fields of a log");
    println!("    help          Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process every log in a directory:");
    println!("    hall-processor process ./logs --output ./archives");
    println!();
    println!("    # Process logs as JSON archives for a given upload:");
    println!("    hall-processor process 'runs/*.txt' --upload-id abc123 --format json");
    println!();
    println!("    # Map an instrument template:");
    println!("    hall-processor instrument setup.yaml");
    println!();
    println!("    # See what the parser extracts from a log:");
    println!("    hall-processor inspect sample.txt --all-sections");
    println!();
    println!("For detailed help on any command, use:");
    println!("    hall-processor <COMMAND> --help");
}
