use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "notepin")]
#[command(about = "Notes with images, map pins and gist backups")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local storage database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        title: String,
        /// Note content (read from stdin when omitted)
        content: Vec<String>,
        /// Image to attach
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Pin latitude
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Pin longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// List notes with excerpts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show note cards
    Grid,
    /// Open a note
    Show {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Open the next note (wraps around)
    Next,
    /// Open the previous note (wraps around)
    Prev,
    /// Edit an existing note (opens $EDITOR without flags)
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// Replace the image
        #[arg(long, value_name = "PATH", conflicts_with = "remove_image")]
        image: Option<PathBuf>,
        /// Drop the attached image
        #[arg(long)]
        remove_image: bool,
    },
    /// Delete a note (the current one when no ID is given)
    Delete {
        /// Note ID or unique ID prefix
        id: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove all notes
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export all notes as JSON
    Export {
        /// Output path (defaults to notes-backup-<date>.json)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Import notes from an export file
    Import {
        /// Export file to read
        path: PathBuf,
    },
    /// Map overlay
    Map {
        #[command(subcommand)]
        command: MapCommands,
    },
    /// Gist backups
    Cloud {
        #[command(subcommand)]
        command: CloudCommands,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum MapCommands {
    /// List pinned notes
    Markers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a pinned note (at the current location unless --lat/--lng)
    Add {
        /// Note title
        title: String,
        /// Note content
        content: Vec<String>,
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Set the current location
    Locate {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Show the popup of a pinned note
    Popup {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Edit a pinned note from its popup (opens $EDITOR without flags)
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// Replace the image
        #[arg(long, value_name = "PATH", conflicts_with = "remove_image")]
        image: Option<PathBuf>,
        /// Drop the attached image
        #[arg(long)]
        remove_image: bool,
    },
    /// Delete a pinned note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CloudCommands {
    /// Validate and store a gist access token
    Login {
        /// Access token (read from NOTEPIN_GIST_TOKEN or stdin when omitted)
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show backup status
    Status,
    /// Upload all notes
    Backup,
    /// Replace local notes with the backup
    Restore {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Set a value by dotted key, e.g. `features.map false`
    Set {
        key: String,
        value: String,
    },
}
