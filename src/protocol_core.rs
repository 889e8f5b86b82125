//! Session handshake and destination handling shared by both roles
//!
//! The announcement is length-prefixed (`u16` LE) so a name never depends on
//! how TCP happens to segment it.

use crate::error::{Result, TransferError};
use crate::protocol::{ACK, MAX_NAME_LEN, NAK, NAME_LEN_BYTES};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Check an announced name against the framing limits.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TransferError::protocol("empty filename"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(TransferError::protocol(format!(
            "filename too long: {} bytes (max: {})",
            name.len(),
            MAX_NAME_LEN
        )));
    }
    if name.contains('\0') {
        return Err(TransferError::protocol("filename contains NUL byte"));
    }
    Ok(())
}

/// Build the announcement frame: `name_len u16 | name bytes`
pub fn encode_announcement(name: &str) -> Result<Vec<u8>> {
    validate_name(name)?;
    let mut buf = Vec::with_capacity(NAME_LEN_BYTES + name.len());
    buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
    buf.extend_from_slice(name.as_bytes());
    Ok(buf)
}

fn eof_as_protocol(e: io::Error, what: &str) -> TransferError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        TransferError::protocol(format!("connection closed during {}", what))
    } else {
        TransferError::io(what.to_string(), e)
    }
}

/// Receiver side: read one announcement frame and decode the filename.
pub async fn read_announcement<R>(conn: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut hdr = [0u8; NAME_LEN_BYTES];
    conn.read_exact(&mut hdr)
        .await
        .map_err(|e| eof_as_protocol(e, "announcement header"))?;
    let len = u16::from_le_bytes(hdr) as usize;
    if len == 0 || len > MAX_NAME_LEN {
        return Err(TransferError::protocol(format!(
            "bad announcement length: {}",
            len
        )));
    }
    let mut name = vec![0u8; len];
    conn.read_exact(&mut name)
        .await
        .map_err(|e| eof_as_protocol(e, "announcement"))?;
    let name = String::from_utf8(name)
        .map_err(|_| TransferError::protocol("announced filename is not valid UTF-8"))?;
    validate_name(&name)?;
    Ok(name)
}

/// Receiver side: answer the announcement with ACK or NAK.
pub async fn acknowledge<W>(conn: &mut W, accepted: bool) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let token = if accepted { ACK } else { NAK };
    conn.write_all(token)
        .await
        .map_err(|e| TransferError::io("acknowledgment", e))?;
    conn.flush()
        .await
        .map_err(|e| TransferError::io("acknowledgment", e))?;
    Ok(())
}

/// Sender side: announce `name` and wait for the receiver's verdict.
pub async fn announce<S>(conn: &mut S, name: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = encode_announcement(name)?;
    conn.write_all(&frame)
        .await
        .map_err(|e| TransferError::io("announcement", e))?;
    let mut reply = [0u8; 2];
    conn.read_exact(&mut reply)
        .await
        .map_err(|e| eof_as_protocol(e, "acknowledgment"))?;
    tracing::debug!("Receiver answered: {}", String::from_utf8_lossy(&reply));
    if &reply != ACK {
        return Err(TransferError::protocol(format!(
            "receiver rejected {}",
            name
        )));
    }
    Ok(())
}

/// Map an announced name to a local path.
///
/// Without a root the name is used verbatim. With a root, the name must be
/// relative and free of `..`, and the result stays under the root.
pub fn resolve_destination(root: Option<&Path>, name: &str) -> Result<PathBuf> {
    use Component::{CurDir, Normal, ParentDir, Prefix, RootDir};

    let Some(root) = root else {
        return Ok(PathBuf::from(name));
    };

    let mut safe = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            CurDir => {}
            Normal(s) => safe.push(s),
            ParentDir | RootDir | Prefix(_) => {
                return Err(TransferError::protocol(format!(
                    "path contains disallowed component: {:?}",
                    component
                )));
            }
        }
    }
    if safe.as_os_str().is_empty() {
        return Err(TransferError::protocol(format!("no file name in {:?}", name)));
    }
    Ok(root.join(safe))
}

/// Create the parent directory chain of `path` if it has one.
pub async fn ensure_parent_exists(path: &Path) -> Result<Option<PathBuf>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TransferError::fs(parent, e))?;
            Ok(Some(parent.to_path_buf()))
        }
        _ => Ok(None),
    }
}
