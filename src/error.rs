//! Error types for the tile pipeline.
//!
//! Per-tile errors (`SampleError`, `RenderError`) stay inside the renderer and are
//! only logged. `PipelineError` is what reaches the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the coordinate mapper.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordError {
    #[error("tile size must be positive (got {0})")]
    ZeroTileSize(u32),
    #[error("tile size for zoom level {zoom} overflows (base unit {base_unit})")]
    TileSizeOverflow { zoom: u32, base_unit: u32 },
}

/// Errors raised by a world sampler while producing a biome grid.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("could not allocate biome grid of {width}x{height} cells")]
    Allocation { width: usize, height: usize },
    #[error("sampler used before a seed was applied")]
    NotSeeded,
    #[error("invalid sampling region: {0}")]
    InvalidRegion(String),
}

/// Errors from rasterising and writing a single tile.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not allocate {width}x{height} image buffer")]
    Allocation { width: u32, height: u32 },
    #[error("could not create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("setup failed for {path}: {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Coord(#[from] CoordError),
    #[error("could not read level table {path}: {source}")]
    LevelFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level table: {0}")]
    LevelFormat(#[from] serde_json::Error),
}
