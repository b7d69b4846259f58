//! Material palette and the per-cell value type.
//!
//! The palette is a closed, ordered set. Its order is stable and is what hosts
//! use to build brush pickers, so new materials are appended, never inserted.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete material carried by every grid cell.
///
/// Discriminants double as the palette index and the FFI wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MaterialId {
    /// Nothing. Movers may enter it.
    #[default]
    Empty = 0,
    /// Liquid: falls, then spreads sideways.
    Water = 1,
    /// Powder: falls and slides diagonally, sinks through water.
    Sand = 2,
    /// Inert boundary. Never moves, never entered.
    Wall = 3,
}

/// Palette entry for UI construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialInfo {
    /// Material this entry describes
    pub id: MaterialId,
    /// Human readable name
    pub name: &'static str,
    /// Display color as normalised RGBA
    pub color: [f32; 4],
}

const PALETTE: [MaterialInfo; 4] = [
    MaterialInfo {
        id: MaterialId::Empty,
        name: "Empty",
        color: [0.0, 0.0, 0.0, 1.0],
    },
    MaterialInfo {
        id: MaterialId::Water,
        name: "Water",
        color: [103.0 / 255.0, 133.0 / 255.0, 193.0 / 255.0, 1.0],
    },
    MaterialInfo {
        id: MaterialId::Sand,
        name: "Sand",
        color: [168.0 / 255.0, 134.0 / 255.0, 42.0 / 255.0, 1.0],
    },
    MaterialInfo {
        id: MaterialId::Wall,
        name: "Wall",
        color: [148.0 / 255.0, 148.0 / 255.0, 148.0 / 255.0, 1.0],
    },
];

impl MaterialId {
    /// Number of materials in the palette
    pub const COUNT: usize = PALETTE.len();

    /// Stable, ordered palette of every material
    #[must_use]
    pub fn palette() -> &'static [MaterialInfo] {
        &PALETTE
    }

    /// Convert from u8 for FFI compatibility
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidMaterial`] for ids outside the palette, which
    /// happens when a host holds a stale enumeration.
    pub fn from_u8(value: u8) -> SimResult<Self> {
        match value {
            0 => Ok(MaterialId::Empty),
            1 => Ok(MaterialId::Water),
            2 => Ok(MaterialId::Sand),
            3 => Ok(MaterialId::Wall),
            other => Err(SimError::InvalidMaterial(other)),
        }
    }

    /// Convert to u8 for FFI compatibility
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Palette entry for this material
    #[must_use]
    pub fn info(self) -> &'static MaterialInfo {
        &PALETTE[self as usize]
    }

    /// Display name
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Display color as normalised RGBA
    pub fn color(self) -> [f32; 4] {
        self.info().color
    }

    /// Display color as RGBA8
    pub fn color_rgba8(self) -> [u8; 4] {
        let [r, g, b, a] = self.color();
        [unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), unit_to_u8(a)]
    }

    /// Display color as `#RRGGBB`, for DOM palettes
    pub fn color_hex(self) -> String {
        let [r, g, b, _] = self.color_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Material encoded as the centre of its palette bucket in [0, 1].
    ///
    /// Shader pipelines store the material in one float channel; sampling
    /// `floor(v * COUNT)` recovers the index without edge ambiguity.
    pub fn packed_index(self) -> f32 {
        (f32::from(self.as_u8()) + 0.5) / MaterialId::COUNT as f32
    }

    /// Whether cells of this material are moved by the rule engine
    #[inline]
    pub const fn is_mover(self) -> bool {
        matches!(self, MaterialId::Sand | MaterialId::Water)
    }

    /// Whether this material drifts sideways when it cannot fall
    #[inline]
    pub const fn is_liquid(self) -> bool {
        matches!(self, MaterialId::Water)
    }

    /// Single character used by the ASCII grid dump
    #[inline]
    pub const fn glyph(self) -> char {
        match self {
            MaterialId::Empty => '.',
            MaterialId::Water => '~',
            MaterialId::Sand => 's',
            MaterialId::Wall => '#',
        }
    }
}

impl TryFrom<u8> for MaterialId {
    type Error = SimError;

    fn try_from(value: u8) -> SimResult<Self> {
        MaterialId::from_u8(value)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map `[0, 1]` onto `0..=255`, clamping outside values
#[inline]
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// A single cell in the simulation grid.
///
/// Cells carry no identity; the grid position is the identity and the whole
/// value is rewritten every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Material occupying the cell
    pub material: MaterialId,
}

impl Cell {
    /// Empty cell
    pub const EMPTY: Cell = Cell::new(MaterialId::Empty);
    /// Wall cell, also what out-of-range neighbours read as
    pub const WALL: Cell = Cell::new(MaterialId::Wall);

    /// Create a cell of the given material
    #[inline]
    pub const fn new(material: MaterialId) -> Self {
        Self { material }
    }
}

impl From<MaterialId> for Cell {
    fn from(material: MaterialId) -> Self {
        Cell::new(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_conversion() {
        for info in MaterialId::palette() {
            assert_eq!(MaterialId::from_u8(info.id.as_u8()), Ok(info.id));
        }
        assert_eq!(MaterialId::from_u8(4), Err(SimError::InvalidMaterial(4)));
        assert_eq!(MaterialId::try_from(255u8), Err(SimError::InvalidMaterial(255)));
    }

    #[test]
    fn test_palette_is_ordered_by_discriminant() {
        let palette = MaterialId::palette();
        assert_eq!(palette.len(), MaterialId::COUNT);
        for (index, info) in palette.iter().enumerate() {
            assert_eq!(info.id as usize, index);
        }
        let names: Vec<_> = palette.iter().map(|m| m.name).collect();
        assert_eq!(names, ["Empty", "Water", "Sand", "Wall"]);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(MaterialId::Empty.color_hex(), "#000000");
        assert_eq!(MaterialId::Sand.color_hex(), "#A8862A");
        assert_eq!(MaterialId::Water.color_hex(), "#6785C1");
        assert_eq!(MaterialId::Wall.color_hex(), "#949494");
    }

    #[test]
    fn test_packed_index_round_trips_through_bucket() {
        for info in MaterialId::palette() {
            let packed = info.id.packed_index();
            assert!(packed > 0.0 && packed < 1.0);
            let bucket = (packed * MaterialId::COUNT as f32).floor() as u8;
            assert_eq!(bucket, info.id.as_u8());
        }
    }

    #[test]
    fn test_mover_classification() {
        assert!(MaterialId::Sand.is_mover());
        assert!(MaterialId::Water.is_mover());
        assert!(!MaterialId::Wall.is_mover());
        assert!(!MaterialId::Empty.is_mover());
        assert!(MaterialId::Water.is_liquid());
        assert!(!MaterialId::Sand.is_liquid());
    }
}
