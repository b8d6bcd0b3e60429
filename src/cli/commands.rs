// Vaultlink — CLI Command Handlers
//
// Each function handles one CLI subcommand. They build the record service
// from the environment configuration, the platform keyring identity and the
// HTTP store client, then drive it directly. The `serve` command hands the
// same service to the UDS gateway.

use std::sync::Arc;

use crate::cache::RecordCache;
use crate::config::Config;
use crate::error::VaultlinkError;
use crate::gateway::{default_socket_path, UdsServer};
use crate::identity::{IdentityProvider, KeyringIdentityProvider};
use crate::service::RecordService;
use crate::store::{HttpRecordStore, Locator, SecretValue};

use super::Commands;

type Service = RecordService<HttpRecordStore, KeyringIdentityProvider>;

/// Build the service from environment configuration.
fn build_service() -> Service {
    let config = Config::from_env();
    let store = HttpRecordStore::new(&config);
    let identity = KeyringIdentityProvider::new();
    RecordService::with_cache(store, identity, RecordCache::with_ttl(config.cache_ttl))
}

/// Execute the parsed CLI command.
pub async fn execute(command: Commands) -> Result<(), VaultlinkError> {
    match command {
        Commands::Init => cmd_init(),
        Commands::List { site, refresh } => cmd_list(site, refresh).await,
        Commands::Get { label, reveal } => cmd_get(label, reveal).await,
        Commands::Save { label, secret } => cmd_save(label, secret).await,
        Commands::Delete {
            collection,
            document,
        } => cmd_delete(collection, document).await,
        Commands::Grant {
            collection,
            document,
            grantee,
        } => cmd_grant(collection, document, grantee).await,
        Commands::Revoke {
            collection,
            document,
            grantee,
        } => cmd_revoke(collection, document, grantee).await,
        Commands::Serve { socket } => cmd_serve(socket).await,
    }
}

// ─── Init ────────────────────────────────────────────────────────────────────

fn cmd_init() -> Result<(), VaultlinkError> {
    let provider = KeyringIdentityProvider::new();
    let identity = provider.resolve()?;

    println!("✓ Vaultlink initialized");
    println!("  Identity: {}", identity.did());
    println!("  Key material stored in platform keyring");
    println!();
    println!("Next: store a record with `vaultlink save <label> --secret <value>`");

    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

async fn cmd_list(site: Option<String>, refresh: bool) -> Result<(), VaultlinkError> {
    let service = build_service();

    // The CLI wants "failed to fetch" distinguishable from "no records",
    // so it uses the fallible listing.
    let records = service.try_list_for_site(site.as_deref(), refresh).await?;

    if records.is_empty() {
        println!("No records stored yet.");
        println!("Add one with: vaultlink save <label> --secret <value>");
        return Ok(());
    }

    println!("Stored records ({}):\n", records.len());
    for record in &records {
        println!("  {:30} │ {}", record.label, record.locator);
    }

    Ok(())
}

// ─── Get ─────────────────────────────────────────────────────────────────────

async fn cmd_get(label: String, reveal: bool) -> Result<(), VaultlinkError> {
    let service = build_service();

    match service.get_by_label(&label).await? {
        Some(record) => {
            println!("Record details:\n");
            println!("  Label:    {}", record.label);
            println!("  Locator:  {}", record.locator);
            println!("  Owner:    {}", record.owner);
            println!("  Created:  {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            if reveal {
                println!("  Secret:   {}", record.secret().expose());
            } else {
                println!("  Secret:   [REDACTED] (pass --reveal to print)");
            }
        }
        None => {
            println!("No record found for label: {}", label);
        }
    }

    Ok(())
}

// ─── Save ────────────────────────────────────────────────────────────────────

async fn cmd_save(label: String, secret: String) -> Result<(), VaultlinkError> {
    let service = build_service();

    let locator = service.save(&label, SecretValue::new(secret)).await?;
    println!("✓ Record stored");
    println!("  Label:   {}", label);
    println!("  Locator: {}", locator);

    Ok(())
}

// ─── Delete ──────────────────────────────────────────────────────────────────

async fn cmd_delete(collection: String, document: String) -> Result<(), VaultlinkError> {
    let service = build_service();
    let locator = Locator::new(collection, document);

    service.remove(&locator).await?;
    println!("✓ Record {} deleted", locator);

    Ok(())
}

// ─── Grant / Revoke ──────────────────────────────────────────────────────────

async fn cmd_grant(
    collection: String,
    document: String,
    grantee: String,
) -> Result<(), VaultlinkError> {
    let service = build_service();
    let locator = Locator::new(collection, document);

    service.grant_access(&locator, &grantee).await?;
    println!("✓ Access on {} granted to {}", locator, grantee);

    Ok(())
}

async fn cmd_revoke(
    collection: String,
    document: String,
    grantee: String,
) -> Result<(), VaultlinkError> {
    let service = build_service();
    let locator = Locator::new(collection, document);

    service.revoke_access(&locator, &grantee).await?;
    println!("✓ Access on {} revoked from {}", locator, grantee);

    Ok(())
}

// ─── Serve ───────────────────────────────────────────────────────────────────

async fn cmd_serve(socket: Option<std::path::PathBuf>) -> Result<(), VaultlinkError> {
    let service = Arc::new(build_service());
    let socket_path = socket.unwrap_or_else(default_socket_path);

    println!("Starting vaultlink gateway at {}...", socket_path.display());

    let server = UdsServer::new(service, socket_path);
    server.run().await?;

    Ok(())
}
