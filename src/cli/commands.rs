use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "promptvault")]
#[command(version, about = "A personal prompt library with CSV import and export")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new vault in the current directory
    Init,

    /// Add a new prompt
    Add {
        /// Prompt title
        title: String,

        /// Prompt content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Category name (created if it does not exist)
        #[arg(long)]
        category: Option<String>,

        /// Tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,

        /// Mark as a template with {variable} placeholders
        #[arg(long)]
        template: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List prompts
    List {
        /// Only prompts in this category ("uncategorized" for none)
        #[arg(long)]
        category: Option<String>,

        /// Only prompts with this tag
        #[arg(long)]
        tag: Option<String>,

        /// Only favorites
        #[arg(long)]
        favorites: bool,

        /// Sort order: newest, oldest, az, za
        #[arg(long, default_value = "newest")]
        sort: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single prompt
    Get {
        /// Prompt ID or unique ID prefix
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a prompt's fields
    Edit {
        /// Prompt ID or unique ID prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read new content from stdin
        #[arg(long)]
        stdin: bool,

        /// Move to this category ("uncategorized" for none)
        #[arg(long)]
        category: Option<String>,

        /// Replace tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Set or clear the template flag
        #[arg(long)]
        template: Option<bool>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a prompt
    Delete {
        /// Prompt ID or unique ID prefix
        id: String,
    },

    /// Toggle a prompt's favorite flag
    Favorite {
        /// Prompt ID or unique ID prefix
        id: String,
    },

    /// Search categories, tags and prompts
    Search {
        /// Case-insensitive text to look for
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage categories
    Category(CategoryCommand),

    /// Add or remove tags on several prompts
    Tag {
        /// Prompt IDs or unique ID prefixes
        #[arg(required = true)]
        ids: Vec<String>,

        /// Tags to add
        #[arg(long = "add")]
        add: Vec<String>,

        /// Tags to remove
        #[arg(long = "remove")]
        remove: Vec<String>,
    },

    /// Move several prompts to one category
    Move {
        /// Prompt IDs or unique ID prefixes
        #[arg(required = true)]
        ids: Vec<String>,

        /// Target category ("uncategorized" for none)
        #[arg(long)]
        category: String,
    },

    /// Import prompts from a CSV file
    Import {
        /// CSV file to import
        file: PathBuf,

        /// Report what would be imported without saving
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export prompts to a CSV file
    Export {
        /// Output file or directory (defaults to a dated file in the current directory)
        #[arg(long, short = 'o', conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Write the CSV to stdout instead of a file
        #[arg(long)]
        stdout: bool,

        /// Only export these prompts (can be specified multiple times)
        #[arg(long = "id")]
        ids: Vec<String>,
    },

    /// Fill a template prompt's {variables} and print the result
    Fill {
        /// Prompt ID or unique ID prefix
        id: String,

        /// Variable value as name=value (can be specified multiple times)
        #[arg(long = "var")]
        vars: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// Create a category
    Add {
        /// Category name
        name: String,
    },

    /// Rename a category
    Rename {
        /// Current name or ID
        category: String,

        /// New name
        name: String,
    },

    /// Delete a category; its prompts become uncategorized
    Delete {
        /// Name or ID
        category: String,
    },

    /// List categories with prompt counts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
