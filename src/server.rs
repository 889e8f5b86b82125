//! Receiver role: accept sessions and persist each incoming file

use crate::copy::{copy_chunks, CopyError};
use crate::error::{Result, TransferError};
use crate::protocol_core::{
    acknowledge, ensure_parent_exists, read_announcement, resolve_destination,
};
use crate::workers::{TransferSummary, WorkerSet};
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory that announced names are confined to; `None` trusts names verbatim
    pub root: Option<PathBuf>,
}

pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| TransferError::transport(format!("bind {}:{}", host, port), e))
}

/// Bind and serve until `shutdown` completes.
pub async fn serve<F>(config: &ServerConfig, shutdown: F) -> Result<TransferSummary>
where
    F: Future<Output = ()>,
{
    let listener = bind(&config.host, config.port).await?;
    serve_listener(listener, config.root.clone(), shutdown).await
}

/// Accept loop over an already bound listener.
///
/// Each session is handed to its own worker and the loop goes straight back
/// to accepting. When `shutdown` fires, or accept fails, the loop stops and
/// every dispatched worker is joined before returning.
pub async fn serve_listener<F>(
    listener: TcpListener,
    root: Option<PathBuf>,
    shutdown: F,
) -> Result<TransferSummary>
where
    F: Future<Output = ()>,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on {}", addr);
    }
    tokio::pin!(shutdown);
    let mut workers = WorkerSet::new();

    let outcome = loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, no longer accepting");
                break Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::info!("Connection from {}", peer);
                    let root = root.clone();
                    workers.spawn(format!("recv {}", peer), handle_session(stream, peer, root));
                }
                Err(e) => break Err(TransferError::transport("accept", e)),
            },
        }
        workers.reap().await;
    };

    if let Err(ref e) = outcome {
        tracing::error!("Error while processing sockets: {}", crate::workers::error_chain(e));
    }
    tracing::debug!("Exiting server loop");
    let summary = workers.join_all().await;
    tracing::info!(
        "Receiver done: {} file(s) received, {} failed, {} bytes",
        summary.succeeded,
        summary.failed,
        summary.bytes
    );
    outcome.map(|_| summary)
}

/// One session: announcement, destination setup, ack, then copy to EOF.
async fn handle_session(
    mut stream: TcpStream,
    peer: SocketAddr,
    root: Option<PathBuf>,
) -> Result<u64> {
    let name = match read_announcement(&mut stream).await {
        Ok(name) => name,
        Err(e) => {
            let _ = acknowledge(&mut stream, false).await;
            return Err(e);
        }
    };
    tracing::debug!("Client sent: {}", name);

    let (dest, mut file) = match open_destination(root.as_deref(), &name).await {
        Ok(opened) => opened,
        Err(e) => {
            let _ = acknowledge(&mut stream, false).await;
            return Err(e);
        }
    };
    acknowledge(&mut stream, true).await?;

    tracing::info!("Saving file: {}", dest.display());
    let bytes = copy_chunks(&mut stream, &mut file)
        .await
        .map_err(|e| match e {
            CopyError::Read(e) => TransferError::io(format!("socket from {}", peer), e),
            CopyError::Write(e) => TransferError::fs(&dest, e),
        })?;
    file.flush().await.map_err(|e| TransferError::fs(&dest, e))?;

    tracing::info!("Received {} ({} bytes) from {}", dest.display(), bytes, peer);
    Ok(bytes)
}

async fn open_destination(root: Option<&Path>, name: &str) -> Result<(PathBuf, File)> {
    let dest = resolve_destination(root, name)?;
    if let Some(parent) = ensure_parent_exists(&dest).await? {
        tracing::info!("Create path: {}", parent.display());
    }
    let file = File::create(&dest)
        .await
        .map_err(|e| TransferError::fs(&dest, e))?;
    Ok((dest, file))
}
