use clap::{Parser, Subcommand};

use crate::models::CategoryKind;

#[derive(Debug, Parser)]
#[command(name = "finsight")]
#[command(version, about = "Category bootstrap and reconciliation for the Finsight client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The requested command, `status` when none is given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show local bootstrap and sync state
    Status,

    /// Run bootstrap followed by a sync if one is due
    Start,

    /// Run one bootstrap pass
    Bootstrap,

    /// Create missing default categories
    Sync {
        /// Ignore the sync TTL
        #[arg(long)]
        force: bool,
    },

    /// List categories, falling back to the built-in catalog when offline
    List {
        /// Only categories of this kind (income or expense)
        kind: Option<CategoryKind>,
    },

    /// Clear the bootstrap flag and the last sync time
    Reset,

    /// Run the development category API
    Serve,
}
