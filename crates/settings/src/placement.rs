//! File placement seam
//!
//! [`FilePlacement`] is the boundary to the engine's remoting layer: given a
//! workspace root, it makes a file readable at a relative destination under
//! that root, whether the workspace is on the controller or on a remote
//! agent. [`LocalPlacement`] is the same-filesystem implementation; agent
//! transports implement the trait on their channel type.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Places file content under a workspace root.
#[async_trait]
pub trait FilePlacement: Send + Sync {
    /// Make `source` (a path readable where the controller runs) available
    /// at `relative` under `root`. Returns the destination path as seen on
    /// the execution node.
    ///
    /// # Errors
    ///
    /// Any transfer failure, including an unreadable source.
    async fn place_from(&self, root: &Path, relative: &Path, source: &Path)
    -> io::Result<PathBuf>;

    /// Write `content` at `relative` under `root`. Returns the destination
    /// path as seen on the execution node.
    ///
    /// # Errors
    ///
    /// Any write failure on the destination side.
    async fn place_bytes(&self, root: &Path, relative: &Path, content: &[u8])
    -> io::Result<PathBuf>;
}

/// Placement for workspaces on the controller's own filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPlacement;

impl LocalPlacement {
    /// Create a local placement.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn prepare_dest(root: &Path, relative: &Path) -> io::Result<PathBuf> {
        let dest = root.join(relative);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(dest)
    }
}

#[async_trait]
impl FilePlacement for LocalPlacement {
    async fn place_from(
        &self,
        root: &Path,
        relative: &Path,
        source: &Path,
    ) -> io::Result<PathBuf> {
        let dest = Self::prepare_dest(root, relative).await?;
        tokio::fs::copy(source, &dest).await?;
        Ok(dest)
    }

    async fn place_bytes(
        &self,
        root: &Path,
        relative: &Path,
        content: &[u8],
    ) -> io::Result<PathBuf> {
        let dest = Self::prepare_dest(root, relative).await?;
        tokio::fs::write(&dest, content).await?;
        Ok(dest)
    }
}
