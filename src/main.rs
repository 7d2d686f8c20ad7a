use clap::Parser;
use traffic_analyser::cli::{Cli, Commands};
use traffic_analyser::commands::{load_config, run_analyze, run_export, run_stats};
use traffic_analyser::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref())
        .map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) })
        .and_then(|config| match cli.command {
            Commands::Analyze(args) => run_analyze(args, config),
            Commands::Export(args) => run_export(args, config),
            Commands::Stats(args) => run_stats(args, cli.verbose),
        });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
