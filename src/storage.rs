//! On-disk tile layout.
//!
//! Tiles are stored in a directory structure organized by world seed and zoom:
//! `{root}/{seed}/{zoom}/{tile_x}/{tile_y}.png`
//!
//! Existence of a tile file is the only cache signal. Nothing here deletes or
//! rewrites a tile once it is on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extension of every tile.
pub const TILE_EXTENSION: &str = "png";

/// Directory holding every tile row of column `tile_x`.
pub fn tile_dir(root: &Path, seed: u64, zoom: u32, tile_x: i32) -> PathBuf {
    root.join(seed.to_string())
        .join(zoom.to_string())
        .join(tile_x.to_string())
}

/// Path of tile `(tile_x, tile_y)` at `zoom` for world `seed`.
pub fn tile_path(root: &Path, seed: u64, zoom: u32, tile_x: i32, tile_y: i32) -> PathBuf {
    tile_dir(root, seed, zoom, tile_x).join(format!("{}.{}", tile_y, TILE_EXTENSION))
}

/// Create `path` and any missing parents. An existing directory is success.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Whether a tile file already exists. The contents are not checked.
pub fn tile_exists(path: &Path) -> bool {
    path.is_file()
}

/// Tile storage rooted at one output directory.
#[derive(Clone, Debug)]
pub struct TileStorage {
    root: PathBuf,
}

impl TileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output root. Failure here aborts a run.
    pub fn prepare(&self) -> io::Result<()> {
        ensure_dir(&self.root)
    }

    /// Tiles already present for one zoom level, as `(tile_x, tile_y)`.
    pub fn list_tiles(&self, seed: u64, zoom: u32) -> io::Result<Vec<(i32, i32)>> {
        let zoom_dir = self.root.join(seed.to_string()).join(zoom.to_string());
        if !zoom_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut tiles = Vec::new();
        for column in fs::read_dir(zoom_dir)? {
            let column = column?.path();
            let Some(tile_x) = parse_stem::<i32>(column.file_name()) else {
                continue;
            };
            if !column.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&column)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(TILE_EXTENSION) {
                    continue;
                }
                if let Some(tile_y) = parse_stem::<i32>(path.file_stem()) {
                    tiles.push((tile_x, tile_y));
                }
            }
        }
        tiles.sort_unstable();
        Ok(tiles)
    }
}

fn parse_stem<T: std::str::FromStr>(name: Option<&std::ffi::OsStr>) -> Option<T> {
    name.and_then(|s| s.to_str()).and_then(|s| s.parse().ok())
}
