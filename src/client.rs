//! Sender role: one connection and one worker per local file

use crate::copy::{copy_chunks, CopyError};
use crate::error::{Result, TransferError};
use crate::fs_enum::{announced_name, enumerate_files};
use crate::protocol_core::announce;
use crate::workers::{TransferSummary, WorkerSet};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// File or directory to send
    pub target: PathBuf,
    /// Announce names relative to this directory instead of as given
    pub base: Option<PathBuf>,
}

pub async fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| TransferError::transport(format!("connect {}:{}", host, port), e))?;
    let _ = stream.set_nodelay(true);
    Ok(stream)
}

/// Send the configured target and wait for every file's worker to finish.
///
/// Individual failures are logged and counted in the summary; they never
/// stop the remaining files.
pub async fn send(config: &ClientConfig) -> TransferSummary {
    let mut workers = WorkerSet::new();

    let files = match enumerate_files(&config.target) {
        Ok(files) => files,
        Err(e) => {
            workers.record_failure(&format!("send {}", config.target.display()), &e);
            return workers.join_all().await;
        }
    };
    tracing::debug!("Resolved {} file(s) to send", files.len());
    dispatch(config, files, workers).await
}

/// Send an already resolved list of files, one connection and worker each.
///
/// A file that can no longer be opened fails alone; the rest still go.
pub async fn send_files(config: &ClientConfig, files: Vec<PathBuf>) -> TransferSummary {
    dispatch(config, files, WorkerSet::new()).await
}

async fn dispatch(
    config: &ClientConfig,
    files: Vec<PathBuf>,
    mut workers: WorkerSet,
) -> TransferSummary {
    for path in files {
        let name = announced_name(&path, config.base.as_deref());
        let label = format!("send {}", name);

        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) => {
                workers.record_failure(&label, &TransferError::fs(&path, e));
                continue;
            }
        };
        let stream = match connect(&config.host, config.port).await {
            Ok(s) => s,
            Err(e) => {
                workers.record_failure(&label, &e);
                continue;
            }
        };
        tracing::info!("Communicating with {}:{}", config.host, config.port);
        workers.spawn(label, send_file(stream, file, path, name));
    }

    let summary = workers.join_all().await;
    tracing::info!(
        "Sender done: {} file(s) sent, {} failed, {} bytes",
        summary.succeeded,
        summary.failed,
        summary.bytes
    );
    summary
}

/// One session: announce, wait for the ack, stream the file, close.
async fn send_file(
    mut stream: TcpStream,
    mut file: File,
    path: PathBuf,
    name: String,
) -> Result<u64> {
    announce(&mut stream, &name).await?;

    let bytes = copy_chunks(&mut file, &mut stream)
        .await
        .map_err(|e| match e {
            CopyError::Read(e) => TransferError::fs(&path, e),
            CopyError::Write(e) => {
                TransferError::io(format!("socket while sending {}", name), e)
            }
        })?;
    stream
        .shutdown()
        .await
        .map_err(|e| TransferError::io(format!("socket while closing {}", name), e))?;

    tracing::info!("Sent {} ({} bytes)", name, bytes);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_refused_is_transport_error() {
        // Grab a free port and close it again so nothing listens there
        let port = {
            let sock = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            sock.local_addr().unwrap().port()
        };
        let err = connect("127.0.0.1", port).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_send_missing_target_counts_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = ClientConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            target: temp_dir.path().join("missing.bin"),
            base: None,
        };
        let summary = send(&config).await;
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_send_without_receiver_fails_each_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
        let port = {
            let sock = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            sock.local_addr().unwrap().port()
        };
        let config = ClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            target: temp_dir.path().to_path_buf(),
            base: None,
        };
        let summary = send(&config).await;
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 0);
    }

    #[tokio::test]
    async fn test_send_files_vanished_file_never_connects() {
        let temp_dir = TempDir::new().unwrap();
        // The file is rejected before any connect, so the port is never used
        let config = ClientConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            target: temp_dir.path().to_path_buf(),
            base: None,
        };
        let summary = send_files(&config, vec![temp_dir.path().join("gone.txt")]).await;
        assert_eq!(summary, TransferSummary { succeeded: 0, failed: 1, bytes: 0 });
    }
}
