use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "docshelf",
    about = "Import, classify and fuzzy-search your text documents"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import text files or directories of .md/.txt files
    Import(ImportArgs),
    /// Add a single document from the command line
    Add(AddArgs),
    /// List stored documents
    List(ListArgs),
    /// Show one document
    Get(GetArgs),
    /// Change a document's title, content or category
    Update(UpdateArgs),
    /// Delete a document
    Delete {
        /// Document id (e.g. 3 or #3)
        id: String,
    },
    /// Fuzzy-search titles and contents
    Search(SearchArgs),
    /// Print matching documents as a question-answering context block
    Context(ContextArgs),
    /// Show repository statistics
    Status(StatusArgs),
    /// Manage stored search settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Import / Add --

#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Files or directories to import
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output the import report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Document body
    pub content: String,

    /// Display title
    #[arg(short, long)]
    pub title: String,

    /// Category (rules, cases, concepts); classified from content if omitted
    #[arg(short, long)]
    pub category: Option<String>,
}

// -- List / Get --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only documents in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Document id (e.g. 3 or #3)
    pub id: String,

    /// Output as JSON with metadata
    #[arg(long)]
    pub json: bool,

    /// Print only metadata
    #[arg(long, conflicts_with = "json")]
    pub meta: bool,
}

// -- Update --

#[derive(Debug, Parser)]
pub struct UpdateArgs {
    /// Document id (e.g. 3 or #3)
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Replace the content with this file's text
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// New category (rules, cases, concepts)
    #[arg(long)]
    pub category: Option<String>,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query; empty lists every document
    pub query: String,

    /// Maximum normalized distance (0 = exact, 1 = anything)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Number of results to return
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Return every match
    #[arg(long)]
    pub all: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ContextArgs {
    /// Query selecting the documents; empty selects all
    pub query: String,

    /// Maximum normalized distance (0 = exact, 1 = anything)
    #[arg(short, long)]
    pub threshold: Option<f64>,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Config --

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective settings
    Show,
    /// Persist a setting (search.threshold, search.limit)
    Set { key: String, value: String },
    /// Remove a stored setting, reverting to its default
    Clear { key: String },
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docshelf",
            &mut std::io::stdout(),
        );
    }
}
