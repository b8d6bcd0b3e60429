// Vaultlink — Unix Domain Socket Server
//
// Listens on a Unix domain socket for typed requests from client surfaces.
// Each connection is handled in a spawned tokio task and stays open for as
// many exchanges as the client needs — the transport equivalent of the
// popup's persistent port, so slow store operations are never cut off by a
// request deadline.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

use crate::identity::IdentityProvider;
use crate::service::RecordService;
use crate::store::{Locator, RecordStore, SecretValue};

use super::protocol::{RecordView, Request, Response};
use super::GatewayError;

/// Default socket path: `$XDG_RUNTIME_DIR/vaultlink/vaultlink.sock`
/// Falls back to `/tmp/vaultlink/vaultlink.sock`.
pub fn default_socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"));
    runtime_dir.join("vaultlink").join("vaultlink.sock")
}

/// Unix Domain Socket server for vaultlink.
pub struct UdsServer<S, I> {
    service: Arc<RecordService<S, I>>,
    socket_path: PathBuf,
}

impl<S, I> UdsServer<S, I>
where
    S: RecordStore + 'static,
    I: IdentityProvider + 'static,
{
    pub fn new(service: Arc<RecordService<S, I>>, socket_path: PathBuf) -> Self {
        Self {
            service,
            socket_path,
        }
    }

    /// Start the server. Runs until the process is terminated.
    pub async fn run(&self) -> Result<(), GatewayError> {
        if let Some(parent) = self.socket_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Remove a stale socket file from a previous run
        if self.socket_path.exists() {
            tokio::fs::remove_file(&self.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!(
            socket = %self.socket_path.display(),
            "Vaultlink gateway listening"
        );

        // Restrict the socket to the owning user
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.socket_path, perms)?;
        }

        loop {
            let (stream, _addr) = listener.accept().await?;
            let service = Arc::clone(&self.service);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, service).await {
                    tracing::error!(error = %e, "Connection handler error");
                }
            });
        }
    }
}

/// Serve one client connection: newline-delimited request in, newline-
/// delimited response out, until the peer hangs up.
async fn handle_connection<S, I>(
    stream: UnixStream,
    service: Arc<RecordService<S, I>>,
) -> Result<(), GatewayError>
where
    S: RecordStore,
    I: IdentityProvider,
{
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(&service, request).await,
            Err(e) => Response::error(format!("Malformed request: {}", e)),
        };

        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Route one request to the service and normalize the outcome.
async fn dispatch<S, I>(service: &RecordService<S, I>, request: Request) -> Response
where
    S: RecordStore,
    I: IdentityProvider,
{
    match request {
        Request::ListRecords {
            current_site,
            force_refresh,
        } => {
            let records = service
                .list_for_site(current_site.as_deref(), force_refresh)
                .await;
            Response::Records(records.iter().map(RecordView::from).collect())
        }

        Request::GetPassword { website_label } => {
            match service.get_by_label(&website_label).await {
                Ok(record) => Response::Password(
                    record.map(|r| r.into_secret().expose().to_string()),
                ),
                Err(e) => Response::error(e.to_string()),
            }
        }

        Request::SavePassword {
            website_label,
            secret_value,
        } => {
            match service
                .save(&website_label, SecretValue::new(secret_value))
                .await
            {
                Ok(locator) => Response::Saved {
                    collection: locator.collection,
                    document: locator.document,
                },
                Err(e) => Response::error(e.to_string()),
            }
        }

        Request::DeleteRecord {
            collection,
            document,
        } => match service.remove(&Locator::new(collection, document)).await {
            Ok(()) => Response::Deleted { success: true },
            Err(e) => Response::error(e.to_string()),
        },

        Request::GrantAccess {
            collection,
            document,
            grantee_did,
        } => {
            match service
                .grant_access(&Locator::new(collection, document), &grantee_did)
                .await
            {
                Ok(()) => Response::Granted { success: true },
                Err(e) => Response::error(e.to_string()),
            }
        }

        Request::RevokeAccess {
            collection,
            document,
            grantee_did,
        } => {
            match service
                .revoke_access(&Locator::new(collection, document), &grantee_did)
                .await
            {
                Ok(()) => Response::Revoked { success: true },
                Err(e) => Response::error(e.to_string()),
            }
        }

        Request::ReadPassword {
            collection,
            document,
        } => match service.read_secret(&Locator::new(collection, document)).await {
            Ok(secret) => Response::Password(Some(secret.expose().to_string())),
            Err(e) => Response::error(e.to_string()),
        },
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayClient;
    use crate::identity::mock::MockIdentityProvider;
    use crate::store::mock::MemoryRecordStore;

    type TestService = RecordService<MemoryRecordStore, MockIdentityProvider>;

    fn test_service() -> Arc<TestService> {
        Arc::new(RecordService::new(
            MemoryRecordStore::new(),
            MockIdentityProvider::new(),
        ))
    }

    /// Spawn a server on a fresh socket under a temp dir and wait for it to
    /// start accepting.
    async fn spawn_server(service: Arc<TestService>) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("vaultlink.sock");

        let server = UdsServer::new(service, socket_path.clone());
        tokio::spawn(async move { server.run().await });

        while !socket_path.exists() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        (dir, socket_path)
    }

    #[tokio::test]
    async fn test_save_then_list_over_socket() {
        let (_dir, socket) = spawn_server(test_service()).await;
        let mut client = GatewayClient::connect(&socket).await.unwrap();

        let saved = client
            .exchange(&Request::SavePassword {
                website_label: "example.com".to_string(),
                secret_value: "pw-1".to_string(),
            })
            .await
            .unwrap();
        let (collection, document) = match saved {
            Response::Saved {
                collection,
                document,
            } => (collection, document),
            other => panic!("expected Saved, got {:?}", other),
        };
        assert!(!document.is_empty());

        let listed = client
            .exchange(&Request::ListRecords {
                current_site: None,
                force_refresh: false,
            })
            .await
            .unwrap();
        match listed {
            Response::Records(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].website_label, "example.com");
                assert_eq!(records[0].collection, collection);
                assert_eq!(records[0].document, document);
            }
            other => panic!("expected Records, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_over_socket() {
        let (_dir, socket) = spawn_server(test_service()).await;
        let mut client = GatewayClient::connect(&socket).await.unwrap();

        let saved = client
            .exchange(&Request::SavePassword {
                website_label: "x.com".to_string(),
                secret_value: "pw".to_string(),
            })
            .await
            .unwrap();
        let (collection, document) = match saved {
            Response::Saved {
                collection,
                document,
            } => (collection, document),
            other => panic!("expected Saved, got {:?}", other),
        };

        let deleted = client
            .exchange(&Request::DeleteRecord {
                collection,
                document,
            })
            .await
            .unwrap();
        assert!(matches!(deleted, Response::Deleted { success: true }));

        let listed = client
            .exchange(&Request::ListRecords {
                current_site: None,
                force_refresh: true,
            })
            .await
            .unwrap();
        match listed {
            Response::Records(records) => assert!(records.is_empty()),
            other => panic!("expected Records, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_password_miss_returns_null() {
        let (_dir, socket) = spawn_server(test_service()).await;
        let mut client = GatewayClient::connect(&socket).await.unwrap();

        let response = client
            .exchange(&Request::GetPassword {
                website_label: "nowhere.com".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(response, Response::Password(None)));
    }

    #[tokio::test]
    async fn test_read_password_returns_secret() {
        let service = test_service();
        let (_dir, socket) = spawn_server(Arc::clone(&service)).await;
        let mut client = GatewayClient::connect(&socket).await.unwrap();

        let locator = service
            .save("copy.com", SecretValue::new("copy-me"))
            .await
            .unwrap();

        let response = client
            .exchange(&Request::ReadPassword {
                collection: locator.collection,
                document: locator.document,
            })
            .await
            .unwrap();
        match response {
            Response::Password(Some(secret)) => assert_eq!(secret, "copy-me"),
            other => panic!("expected Password, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_grant_to_unknown_identity_surfaces_error() {
        let service = test_service();
        let (_dir, socket) = spawn_server(Arc::clone(&service)).await;
        let mut client = GatewayClient::connect(&socket).await.unwrap();

        let locator = service.save("a.com", SecretValue::new("p")).await.unwrap();

        let response = client
            .exchange(&Request::GrantAccess {
                collection: locator.collection,
                document: locator.document,
                grantee_did: "did:vault:stranger".to_string(),
            })
            .await
            .unwrap();
        match response {
            Response::Error { message } => {
                assert!(message.contains("not known to the network"))
            }
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_request_yields_error_response() {
        let (_dir, socket) = spawn_server(test_service()).await;

        let stream = UnixStream::connect(&socket).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer.write_all(b"this is not json\n").await.unwrap();
        writer.flush().await.unwrap();

        let mut line = String::new();
        BufReader::new(reader).read_line(&mut line).await.unwrap();
        let response: Response = serde_json::from_str(&line).unwrap();
        match response {
            Response::Error { message } => assert!(message.contains("Malformed request")),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disconnect_before_response_is_channel_closed() {
        // A listener that reads the request, then hangs up without answering.
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("dead.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut lines = BufReader::new(stream).lines();
            let _ = lines.next_line().await;
        });

        let mut client = GatewayClient::connect(&socket_path).await.unwrap();
        let err = client
            .exchange(&Request::ListRecords {
                current_site: None,
                force_refresh: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_connection_serves_many_exchanges() {
        let (_dir, socket) = spawn_server(test_service()).await;
        let mut client = GatewayClient::connect(&socket).await.unwrap();

        for label in ["a.com", "b.com", "c.com"] {
            let response = client
                .exchange(&Request::SavePassword {
                    website_label: label.to_string(),
                    secret_value: "pw".to_string(),
                })
                .await
                .unwrap();
            assert!(matches!(response, Response::Saved { .. }));
        }

        let listed = client
            .exchange(&Request::ListRecords {
                current_site: Some("b.com".to_string()),
                force_refresh: false,
            })
            .await
            .unwrap();
        match listed {
            Response::Records(records) => {
                let labels: Vec<_> = records.iter().map(|r| r.website_label.as_str()).collect();
                assert_eq!(labels, vec!["b.com", "a.com", "c.com"]);
            }
            other => panic!("expected Records, got {:?}", other),
        }
    }
}
