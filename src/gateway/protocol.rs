// Vaultlink — Gateway Protocol Types
//
// The typed request/response contract between client surfaces (popup,
// autofill, CLI) and the record service. One logical request yields exactly
// one logical response per exchange; every failure is carried as the
// `Error` variant rather than a broken channel.

use serde::{Deserialize, Serialize};

use crate::store::Record;

/// A request from a client surface, one variant per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "action",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    /// All records for the popup, current site first.
    ListRecords {
        #[serde(default)]
        current_site: Option<String>,
        #[serde(default)]
        force_refresh: bool,
    },
    /// The secret for one site, for autofill. `null` when no record matches.
    GetPassword { website_label: String },
    /// Store a new record.
    SavePassword {
        website_label: String,
        secret_value: String,
    },
    /// Delete a record by locator.
    DeleteRecord { collection: String, document: String },
    /// Grant another identity access to a record.
    GrantAccess {
        collection: String,
        document: String,
        grantee_did: String,
    },
    /// Revoke a previously granted permission.
    RevokeAccess {
        collection: String,
        document: String,
        grantee_did: String,
    },
    /// Fresh read of one record's secret, for copy-to-clipboard.
    ReadPassword { collection: String, document: String },
}

/// A response to exactly one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Response {
    Records(Vec<RecordView>),
    Password(Option<String>),
    Saved { collection: String, document: String },
    Deleted { success: bool },
    Granted { success: bool },
    Revoked { success: bool },
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

/// Wire view of a record as the popup consumes it. The secret travels here
/// because the popup fills and copies from the listing; the channel is a
/// local, owner-only socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: String,
    pub website_label: String,
    pub secret_value: String,
    pub collection: String,
    pub document: String,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.to_string(),
            website_label: record.label.clone(),
            secret_value: record.secret().expose().to_string(),
            collection: record.locator.collection.clone(),
            document: record.locator.document.clone(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
