//! Chunked stream copy shared by both directions
//!
//! One fixed-size buffer, no read-ahead: memory per session stays at one chunk.

use crate::protocol::CHUNK_SIZE;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Which side of the copy failed
#[derive(Debug)]
pub enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// Move bytes from `src` to `dst` one chunk at a time until `src` reports EOF.
///
/// Returns the number of bytes copied.
pub async fn copy_chunks<R, W>(src: &mut R, dst: &mut W) -> Result<u64, CopyError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let n = src.read(&mut buf).await.map_err(CopyError::Read)?;
        if n == 0 {
            break;
        }
        dst.write_all(&buf[..n]).await.map_err(CopyError::Write)?;
        total_bytes += n as u64;
        tracing::trace!("chunk of {} bytes", n);
    }

    Ok(total_bytes)
}
