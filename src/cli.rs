use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdfharvest")]
#[command(about = "Bulk-download PDF reports listed in a spreadsheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every report not yet marked as downloaded
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Configuration file (defaults to $PDFHARVEST_CONFIG or config/pdfharvest.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Candidate list with identifier and URL columns
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Status table read at start and rewritten at the end
    #[arg(long)]
    pub status: Option<PathBuf>,

    /// Directory receiving <identifier>.pdf files
    #[arg(long)]
    pub destination: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,
}

impl RunArgs {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut pdfharvest::config::Config) {
        if let Some(source) = &self.source {
            config.input.source = source.clone();
        }
        if let Some(status) = &self.status {
            config.input.status = status.clone();
        }
        if let Some(destination) = &self.destination {
            config.output.destination = destination.clone();
        }
        if let Some(workers) = self.workers {
            config.worker.pool_size = workers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfharvest::config::Config;

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "pdfharvest",
            "run",
            "--source",
            "in.csv",
            "--destination",
            "out",
            "-w",
            "3",
        ]);

        let Commands::Run(args) = cli.command;
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.input.source, PathBuf::from("in.csv"));
        assert_eq!(config.output.destination, PathBuf::from("out"));
        assert_eq!(config.worker.pool_size, 3);
        assert_eq!(config.input.status, Config::default().input.status);
    }

    #[test]
    fn test_workers_flag_overrides_invalid_file_value() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("pdfharvest.toml");
        std::fs::write(&config_path, "[worker]\npool_size = 0\n").unwrap();

        let cli = Cli::parse_from([
            "pdfharvest",
            "run",
            "--config",
            config_path.to_str().unwrap(),
            "--workers",
            "4",
        ]);

        let Commands::Run(args) = cli.command;
        let mut config = Config::load_layers(args.config.clone()).unwrap();
        args.apply(&mut config);

        assert_eq!(config.worker.pool_size, 4);
        assert!(config.validate().is_ok());
    }
}
