//! Biome map tile pyramid generation
//!
//! Renders a seeded world's biomes into `{root}/{seed}/{zoom}/{x}/{y}.png` tiles
//! for a tiled-map viewer. Zoom levels render in parallel, tiles within a level
//! render centre-out, and tiles already on disk are never redone.

pub mod biomes;
pub mod config;
pub mod coords;
pub mod error;
pub mod noise_sampler;
pub mod pipeline;
pub mod progress;
pub mod raster;
pub mod render;
pub mod sampler;
pub mod scheduler;
pub mod seeds;
pub mod spiral;
pub mod storage;
pub mod tilemap;
pub mod worker;
