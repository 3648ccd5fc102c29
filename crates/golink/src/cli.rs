use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Switch between Go SDK versions by repointing the link GOROOT names.
#[derive(Parser, Debug)]
#[command(
    name = "golink",
    version,
    about,
    long_about = "Keeps every Go SDK version side by side in the parent directory of \
                  GOROOT and switches between them by repointing a single symbolic link. \
                  Versions that are not installed yet are downloaded from go.dev.",
    after_help = "Examples:\n    \
                  golink 1.21.6           switch to go1.21.6, downloading it if needed\n    \
                  golink list             show downloadable versions\n    \
                  golink dev              fetch the latest development sources\n    \
                  golink install /usr/local/go\n\n\
                  Give the version without its \"go\" prefix (go1.12.1 -> 1.12.1)."
)]
pub struct Cli {
    /// Name of the symbolic link GOROOT points at
    #[arg(short = 'd', long = "link-name", global = true, value_name = "NAME")]
    pub link_name: Option<String>,

    /// Print progress detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List downloadable versions; installed ones are marked with `*`
    List,

    /// Install Go under PATH and point PATH/<link-name> at it
    Install {
        /// Directory that will hold the versioned installations
        path: PathBuf,

        /// Version to install; defaults to the newest stable release
        version: Option<String>,
    },

    /// Fetch the latest development sources and make them active
    #[command(alias = "development")]
    Dev,

    /// Make VERSION active, downloading it if needed
    Use {
        /// Release name without the "go" prefix, e.g. 1.21.6 or 1.22rc1
        version: String,
    },

    #[command(external_subcommand)]
    Version(Vec<String>),
}

impl Command {
    /// The version named by `golink <version>`.
    pub fn shorthand_version(args: &[String]) -> Option<&str> {
        match args {
            [version] => Some(version.as_str()),
            _ => None,
        }
    }
}
