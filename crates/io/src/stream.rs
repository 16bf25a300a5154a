use crate::pcd::{read_pcd, PcdError};
use lidarguard_core::{PointCloud, PointXYZI};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("no .pcd frames found under {0}")]
    NoFrames(PathBuf),

    #[error("failed to list frame directory {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load frame {path}: {source}")]
    Load { path: PathBuf, source: PcdError },
}

/// One frame pulled off the stream.
#[derive(Debug, Clone)]
pub struct Frame {
    pub cloud: PointCloud<PointXYZI>,
    /// Position of this frame in the cyclic sequence, zero-based.
    pub index: usize,
}

/// Ordered, cyclic source of recorded frames.
///
/// Paths are enumerated once at construction and sorted ascending, so the
/// replay order is stable across runs. After the last frame the stream wraps
/// back to the first, indefinitely.
///
/// A failed load still advances the cursor, which is what lets a
/// skip-and-continue caller move past a corrupt frame file.
#[derive(Debug, Clone)]
pub struct FrameStream {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl FrameStream {
    /// Enumerate `*.pcd` files directly under `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, FrameError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| FrameError::List {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FrameError::List {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("pcd") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(FrameError::NoFrames(dir.to_path_buf()));
        }
        Ok(Self { paths, cursor: 0 })
    }

    /// Build a stream over an explicit path list, kept in the given order.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Index the next call to [`next_frame`](Self::next_frame) will yield.
    pub fn peek_index(&self) -> usize {
        self.cursor
    }

    /// Load the next frame, wrapping to index 0 after the last one.
    pub fn next_frame(&mut self) -> Result<Frame, FrameError> {
        assert!(!self.paths.is_empty(), "next_frame on an empty stream");

        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.paths.len();

        let path = &self.paths[index];
        let cloud = read_pcd(path).map_err(|source| FrameError::Load {
            path: path.clone(),
            source,
        })?;
        Ok(Frame { cloud, index })
    }
}
