use clap::{Parser, Subcommand};
use wisp::model::Visibility;

#[derive(Parser, Debug)]
#[command(name = "wisp", bin_name = "wisp", version)]
#[command(about = "Browse, curate and share prompts from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List prompts
    #[command(alias = "ls")]
    List {
        /// Filter key: all, all-prompts, your-prompts, favorites, saved, deleted
        #[arg(short, long)]
        filter: Option<String>,

        /// Search term; start with # to search tags only
        #[arg(short, long)]
        search: Option<String>,

        /// Only prompts carrying every given tag
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Only prompts in this collection
        #[arg(short, long)]
        collection: Option<String>,
    },

    /// Show a prompt in full
    #[command(alias = "v")]
    View { id: String },

    /// Create a prompt
    #[command(alias = "n")]
    Create {
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// public, private or unlisted
        #[arg(long, default_value = "private")]
        visibility: Visibility,
    },

    /// Change fields of a prompt you own
    #[command(alias = "e")]
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replaces all tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        visibility: Option<Visibility>,
    },

    /// Move a prompt to the deleted view
    #[command(alias = "rm")]
    Delete { id: String },

    /// Bring back a deleted prompt
    Restore { id: String },

    /// Toggle a prompt in your favorites
    #[command(alias = "fav")]
    Favorite { id: String },

    /// Toggle a prompt in your saved prompts
    Save { id: String },

    /// List known tags
    Tags,

    /// List collections
    Collections {
        /// all-collections, your-collections, shared, favorites, saved, deleted
        #[arg(short, long, default_value = "all-collections")]
        filter: String,

        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Manage a collection
    #[command(subcommand)]
    Collection(CollectionCommands),

    /// Get or set configuration
    Config {
        /// api-url, access-token, timeout or default-filter
        key: Option<String>,
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommands {
    Create {
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long, default_value = "private")]
        visibility: Visibility,
    },

    Delete {
        id: String,
    },

    /// Add a prompt to a collection
    Add {
        collection: String,
        prompt: String,
    },

    /// Remove a prompt from a collection
    Remove {
        collection: String,
        prompt: String,
    },

    /// Prompts that could still be added to a collection
    Available {
        collection: String,
    },
}
