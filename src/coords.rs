//! Coordinate mapping between zoom levels, tile grids and world-space regions.
//!
//! Regions are measured in sample cells: a region with `scale = 4` and `sx = 64`
//! covers 256 world blocks along X.

use serde::{Deserialize, Serialize};

use crate::error::CoordError;

/// Base tile edge (in cells) at zoom level 0 under the doubling policy.
pub const DEFAULT_BASE_UNIT: u32 = 64;

/// Tile edge used by the single-tile tool when no zoom scaling is wanted.
pub const SINGLE_TILE_SIZE: u32 = 96;

/// Vertical layer sampled for every tile (output is a 2-D projection).
pub const SURFACE_LAYER_Y: i32 = 15;

/// How a zoom level maps to a tile edge length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TileSizePolicy {
    /// `base_unit << zoom`
    Doubling { base_unit: u32 },
    /// Same edge length at every zoom level
    Fixed { size: u32 },
}

impl Default for TileSizePolicy {
    fn default() -> Self {
        TileSizePolicy::Doubling {
            base_unit: DEFAULT_BASE_UNIT,
        }
    }
}

impl TileSizePolicy {
    /// Tile edge length in cells for a zoom level.
    pub fn tile_size(&self, zoom: u32) -> Result<u32, CoordError> {
        match *self {
            TileSizePolicy::Doubling { base_unit } => {
                if base_unit == 0 {
                    return Err(CoordError::ZeroTileSize(0));
                }
                base_unit
                    .checked_shl(zoom)
                    .filter(|size| size >> zoom == base_unit)
                    .ok_or(CoordError::TileSizeOverflow { zoom, base_unit })
            }
            TileSizePolicy::Fixed { size } => {
                if size == 0 {
                    Err(CoordError::ZeroTileSize(0))
                } else {
                    Ok(size)
                }
            }
        }
    }
}

/// Number of tiles needed to cover `viewport` cells without a partial-tile gap.
pub fn tile_count(viewport: u32, tile_size: u32) -> Result<u32, CoordError> {
    if tile_size == 0 {
        return Err(CoordError::ZeroTileSize(tile_size));
    }
    Ok(viewport.div_ceil(tile_size))
}

/// A square tile grid centred on the world origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportGrid {
    /// Tiles per side
    pub side: u32,
    /// Tile coordinate at grid position 0
    pub origin: i32,
}

impl ViewportGrid {
    /// Tile coordinate range covered along one axis (inclusive).
    pub fn tile_range(&self) -> (i32, i32) {
        (self.origin, self.origin + self.side as i32 - 1)
    }
}

/// Square grid covering a `width`×`height` viewport, centred so that tile 0 sits in the middle.
pub fn viewport_grid(width: u32, height: u32, tile_size: u32) -> Result<ViewportGrid, CoordError> {
    let side = tile_count(width, tile_size)?
        .max(tile_count(height, tile_size)?)
        .max(1);
    Ok(ViewportGrid {
        side,
        origin: -((side / 2) as i32),
    })
}

/// World-space rectangle sampled for one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRegion {
    /// World blocks per sample cell
    pub scale: u32,
    /// Western edge, in cells
    pub x: i64,
    /// Northern edge, in cells
    pub z: i64,
    /// Width in cells
    pub sx: u32,
    /// Depth in cells
    pub sz: u32,
    /// Vertical layer
    pub y: i32,
    /// Vertical extent (always 1)
    pub sy: u32,
}

impl TileRegion {
    /// Region for tile `(tile_x, tile_y)` with edge `tile_size` cells.
    pub fn for_tile(tile_x: i32, tile_y: i32, tile_size: u32, scale: u32) -> Self {
        Self {
            scale,
            x: tile_x as i64 * tile_size as i64,
            z: tile_y as i64 * tile_size as i64,
            sx: tile_size,
            sz: tile_size,
            y: SURFACE_LAYER_Y,
            sy: 1,
        }
    }

    /// World-block position of a cell's corner.
    pub fn cell_to_world(&self, cx: u32, cz: u32) -> (i64, i64) {
        let scale = self.scale as i64;
        ((self.x + cx as i64) * scale, (self.z + cz as i64) * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_policy_doubles_per_level() {
        let policy = TileSizePolicy::default();
        assert_eq!(policy.tile_size(0).unwrap(), 64);
        for z in 0..20 {
            let a = policy.tile_size(z).unwrap();
            let b = policy.tile_size(z + 1).unwrap();
            assert_eq!(b, 2 * a, "zoom {}", z);
        }
    }

    #[test]
    fn test_doubling_policy_rejects_overflow() {
        let policy = TileSizePolicy::Doubling { base_unit: 64 };
        assert!(matches!(
            policy.tile_size(30),
            Err(CoordError::TileSizeOverflow { zoom: 30, .. })
        ));
    }

    #[test]
    fn test_fixed_policy() {
        let policy = TileSizePolicy::Fixed {
            size: SINGLE_TILE_SIZE,
        };
        assert_eq!(policy.tile_size(0).unwrap(), 96);
        assert_eq!(policy.tile_size(7).unwrap(), 96);
        assert!(TileSizePolicy::Fixed { size: 0 }.tile_size(1).is_err());
    }

    #[test]
    fn test_tile_count_is_ceiling() {
        assert_eq!(tile_count(1920, 64).unwrap(), 30);
        assert_eq!(tile_count(1240, 64).unwrap(), 20);
        assert_eq!(tile_count(1240, 512).unwrap(), 3);
        assert_eq!(tile_count(0, 64).unwrap(), 0);
        assert!(tile_count(10, 0).is_err());
    }

    #[test]
    fn test_viewport_grid_is_centred() {
        let grid = viewport_grid(1920, 1240, 512).unwrap();
        assert_eq!(grid.side, 4);
        assert_eq!(grid.origin, -2);
        assert_eq!(grid.tile_range(), (-2, 1));
    }

    #[test]
    fn test_region_for_tile() {
        let region = TileRegion::for_tile(-2, 3, 64, 4);
        assert_eq!(region.x, -128);
        assert_eq!(region.z, 192);
        assert_eq!((region.sx, region.sz), (64, 64));
        assert_eq!(region.y, SURFACE_LAYER_Y);
        assert_eq!(region.sy, 1);
        assert_eq!(region.cell_to_world(1, 0), (-127 * 4, 192 * 4));
    }
}
