use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "icache")]
#[command(about = "Cache for AI-generated product review insights.")]
#[command(version)]
pub struct Cli {
    /// Dry run: use an empty in-memory store that is discarded on exit
    #[arg(long, global = true, long_help = "Dry run: use an empty in-memory store instead of the \
database. Nothing is read from or written to disk, so lookups always miss.")]
    pub memory: bool,

    /// Use the full-search cache TTL instead of the question TTL
    #[arg(long, global = true)]
    pub search: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Edit configuration file
    #[arg(long)]
    pub edit_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the cache key for a question
    Key(Target),

    /// Look up a cached insight (counts as a use)
    Lookup(Target),

    /// Store an insight payload
    Store {
        #[command(flatten)]
        target: Target,

        /// Prompt that produced the payload
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// JSON payload file, `-` for stdin
        #[arg(long, default_value = "-")]
        payload: PathBuf,
    },

    /// Exact match, or the most used cached insights for the product
    Similar {
        #[command(flatten)]
        target: Target,

        /// Maximum number of results (defaults to config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show status
    Status,
}

#[derive(clap::Args, Debug, Clone)]
pub struct Target {
    pub brand: String,
    pub model: String,
    /// Question text
    #[arg(num_args = 1.., required = true)]
    pub question: Vec<String>,
}

impl Target {
    pub fn question(&self) -> String {
        self.question.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_memory_flag_documented_as_dry_run() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Dry run"));
        assert!(help.contains("lookups always miss"));
    }

    #[test]
    fn test_memory_flag_is_global() {
        let cli = Cli::try_parse_from(["icache", "lookup", "Acme", "X1", "is", "it", "good", "--memory"])
            .unwrap();
        assert!(cli.memory);
        match cli.command {
            Some(Command::Lookup(target)) => assert_eq!(target.question(), "is it good"),
            _ => panic!("expected lookup"),
        }
    }
}
