// Vaultlink — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: init, list, get, save, delete, grant, revoke, serve.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Vaultlink — password manager core over a decentralized secret store.
#[derive(Parser, Debug)]
#[command(name = "vaultlink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize vaultlink: create (or confirm) the caller identity.
    Init,

    /// List stored records (labels and locators, never secrets).
    List {
        /// Sort records for this site first (e.g. the active tab's host).
        #[arg(long)]
        site: Option<String>,

        /// Bypass the snapshot cache and re-enumerate the store.
        #[arg(long, default_value = "false")]
        refresh: bool,
    },

    /// Look up the record for a website label.
    Get {
        /// The website label to search for (e.g. "example.com").
        label: String,

        /// Print the secret value instead of a redaction marker.
        #[arg(long, default_value = "false")]
        reveal: bool,
    },

    /// Store a new record for a website label.
    Save {
        /// The website label (e.g. "example.com").
        label: String,

        /// The secret value to store.
        /// For production use, prefer interactive entry to avoid shell history exposure.
        #[arg(long)]
        secret: String,
    },

    /// Delete a record by locator.
    Delete {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        document: String,
    },

    /// Grant another identity access to a record.
    Grant {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        document: String,

        /// Public identifier of the grantee.
        #[arg(long)]
        grantee: String,
    },

    /// Revoke a previously granted permission.
    Revoke {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        document: String,

        /// Public identifier of the grantee.
        #[arg(long)]
        grantee: String,
    },

    /// Start the gateway server on a Unix domain socket.
    Serve {
        /// Socket path. Defaults to `$XDG_RUNTIME_DIR/vaultlink/vaultlink.sock`.
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}
