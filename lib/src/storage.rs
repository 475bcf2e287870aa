//! Low-level reads and writes against controller and cache files.

use std::path::Path;
use std::time::Duration;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;

use crate::errors::*;
use crate::util::read_file;

make_log_macro!(debug, "storage");

/// Read a decimal value from the given file.
pub(crate) async fn read_value(path: impl AsRef<Path>) -> Result<u64> {
    Ok(read_file(path).await?.parse()?)
}

/// Commit `new` to the given file.
///
/// With a non-zero `delay`, the value is ramped one raw unit at a time
/// from `old` toward `new`, sleeping between steps so controllers that
/// need settling time between updates can keep up. Otherwise `new` is
/// written in one go.
pub(crate) async fn write_value(
    path: impl AsRef<Path>,
    old: u64,
    new: u64,
    delay: Duration,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    if delay.is_zero() || old == new {
        return write_step(path, new).await;
    }

    debug!("ramping {} from {old} to {new}", path.display());
    let mut val = old;
    while val != new {
        val = if new > val { val + 1 } else { val - 1 };
        write_step(path, val).await?;
        if val != new {
            sleep(delay).await;
        }
    }
    Ok(())
}

async fn write_step(path: &Path, val: u64) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;
    file.write_all(val.to_string().as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
