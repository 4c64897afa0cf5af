use std::path::PathBuf;

use clap::{Parser, Subcommand};

use instafeed_frontend::error::ClientError;
use instafeed_frontend::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "instafeed", about = "Terminal client for the instafeed API")]
pub struct Cli {
    /// API origin; overrides INSTAFEED_API_BASE
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Session storage file; overrides INSTAFEED_STORAGE
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the feed
    Feed,
    /// Open a route such as `/`, `/login` or `/profile/3`
    Open { path: String },
    Login { username: String, password: String },
    Register {
        /// Create the demo user instead
        #[arg(long)]
        demo: bool,
        #[arg(required_unless_present = "demo")]
        username: Option<String>,
        #[arg(required_unless_present = "demo")]
        email: Option<String>,
        #[arg(required_unless_present = "demo")]
        password: Option<String>,
    },
    Logout,
    /// Toggle the like on a post
    Like { post: u64 },
    /// Show or hide a post's comments
    Comments { post: u64 },
    /// Add a comment to a post
    Comment { post: u64, text: String },
    Profile { user: u64 },
}

impl Cli {
    pub fn config(&self) -> Result<ClientConfig, ClientError> {
        let mut config = ClientConfig::load()?;
        if let Some(api_base) = &self.api_base {
            config = config.with_api_base(api_base)?;
        }
        if let Some(storage) = &self.storage {
            config = config.with_storage_path(storage.clone());
        }
        Ok(config)
    }
}
