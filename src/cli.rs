// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Defines all subcommands and global flags

use crate::model::DataType;
use crate::DEFAULT_BASE_URL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "siyuan")]
#[command(about = "Command-line client for the SiYuan local API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// API token (overrides SIYUAN_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub api_base: String,

    /// Display timeout for pushed notifications, in ms
    #[arg(long, global = true)]
    pub push_timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the remote version (default)
    Version,

    /// List all notebooks
    Notebooks,

    /// Manage a single notebook
    Notebook {
        #[command(subcommand)]
        action: NotebookCommand,
    },

    /// Create documents
    Doc {
        #[command(subcommand)]
        action: DocCommand,
    },

    /// Upload a local file into the assets directory
    Upload { file: PathBuf },

    /// Insert and inspect blocks
    Block {
        #[command(subcommand)]
        action: BlockCommand,
    },

    /// Fetch a file from the workspace and write it to stdout
    File { path: String },

    /// Push a notification
    Push {
        msg: String,

        /// Push as an error message
        #[arg(long)]
        error: bool,
    },

    /// Run a SQL query against the block database
    Sql { stmt: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NotebookCommand {
    Create { name: String },
    Open { id: String },
    Close { id: String },
    Rename { id: String, name: String },
    Remove { id: String },
    Conf { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DocCommand {
    /// Create a document from markdown
    Create {
        notebook: String,
        /// Human-readable path, e.g. /foo/bar
        path: String,
        markdown: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BlockCommand {
    /// Insert after the given block
    Insert {
        previous_id: String,
        data: String,
        #[arg(long, default_value = "markdown")]
        data_type: DataType,
    },
    /// Insert as the first child of the given block
    Prepend {
        parent_id: String,
        data: String,
        #[arg(long, default_value = "markdown")]
        data_type: DataType,
    },
    /// Insert as the last child of the given block
    Append {
        parent_id: String,
        data: String,
        #[arg(long, default_value = "markdown")]
        data_type: DataType,
    },
    /// Print a block's kramdown source
    Kramdown { id: String },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Version)
    }
}
