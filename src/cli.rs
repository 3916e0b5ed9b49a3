use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "docent", version, about = "Ask questions about your PDF documents")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(
        long,
        global = true,
        env = "DOCENT_CONFIG",
        default_value = "config/default.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP API (default)
    Serve,
    /// Copy documents into the upload folder
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List uploaded documents
    Files,
    /// Rebuild the vector index from every uploaded document
    Index,
    /// Answer one question and exit
    Ask {
        question: String,
        /// Print the retrieved context chunks after the answer
        #[arg(long)]
        sources: bool,
    },
    /// Interactive question loop on stdin
    Chat,
    /// Delete all uploads and the index
    Reset,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["docent", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn upload_requires_files() {
        assert!(Cli::try_parse_from(["docent", "upload"]).is_err());
        let cli = Cli::try_parse_from(["docent", "upload", "a.pdf", "b.pdf"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::Upload {
                files: vec!["a.pdf".into(), "b.pdf".into()]
            }
        );
    }

    #[test]
    fn ask_with_sources_flag() {
        let cli = Cli::try_parse_from(["docent", "ask", "what?", "--sources"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::Ask {
                question: "what?".into(),
                sources: true
            }
        );
    }

    #[test]
    fn config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["docent", "files", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.command(), Command::Files);
        assert_eq!(cli.config, PathBuf::from("c.toml"));
    }
}
