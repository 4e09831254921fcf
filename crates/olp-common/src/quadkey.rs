//! Quad-tree tile coordinates and their HERE tile id encoding.
//!
//! The query service addresses tiles by a decimal "HERE tile" id: the Morton
//! interleave of row and column bits (row in the odd bits, column in the even
//! bits) below a single level-indicator bit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deepest level whose tile id still fits in a `u64`.
pub const MAX_LEVEL: u32 = 31;

/// A tile coordinate in the quad tree (level/row/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuadKey {
    /// Tree depth, 0 is the single root tile
    pub level: u32,
    /// Row (y)
    pub row: u32,
    /// Column (x)
    pub column: u32,
}

impl QuadKey {
    /// Create a quad key, rejecting coordinates outside the level's grid.
    pub fn new(level: u32, row: u32, column: u32) -> Result<Self, String> {
        if level > MAX_LEVEL {
            return Err(format!("level {} exceeds maximum {}", level, MAX_LEVEL));
        }
        let size = 1u64 << level;
        if u64::from(row) >= size || u64::from(column) >= size {
            return Err(format!(
                "row {} / column {} out of range for level {}",
                row, column, level
            ));
        }
        Ok(Self { level, row, column })
    }

    /// Encode as a HERE tile id.
    pub fn to_here_tile(&self) -> u64 {
        let mut morton = 0u64;
        for bit in 0..self.level {
            morton |= (u64::from(self.column >> bit) & 1) << (2 * bit);
            morton |= (u64::from(self.row >> bit) & 1) << (2 * bit + 1);
        }
        (1u64 << (2 * self.level)) | morton
    }

    /// Decode a HERE tile id.
    pub fn from_here_tile(tile: u64) -> Result<Self, String> {
        if tile == 0 {
            return Err("tile id 0 has no level indicator bit".to_string());
        }
        let highest_bit = 63 - tile.leading_zeros();
        if highest_bit % 2 != 0 {
            return Err(format!("tile id {} has a misplaced level indicator bit", tile));
        }
        let level = highest_bit / 2;

        let mut row = 0u32;
        let mut column = 0u32;
        for bit in 0..level {
            column |= (((tile >> (2 * bit)) & 1) as u32) << bit;
            row |= (((tile >> (2 * bit + 1)) & 1) as u32) << bit;
        }
        Ok(Self { level, row, column })
    }

    /// Get the parent tile (level - 1).
    pub fn parent(&self) -> Option<QuadKey> {
        if self.level == 0 {
            return None;
        }
        Some(QuadKey {
            level: self.level - 1,
            row: self.row / 2,
            column: self.column / 2,
        })
    }

    /// Get the four children tiles (level + 1).
    pub fn children(&self) -> Option<[QuadKey; 4]> {
        if self.level >= MAX_LEVEL {
            return None;
        }
        let level = self.level + 1;
        let row = self.row * 2;
        let column = self.column * 2;
        Some([
            QuadKey { level, row, column },
            QuadKey { level, row, column: column + 1 },
            QuadKey { level, row: row + 1, column },
            QuadKey {
                level,
                row: row + 1,
                column: column + 1,
            },
        ])
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_here_tile())
    }
}

impl FromStr for QuadKey {
    type Err = String;

    /// Parse a decimal HERE tile id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tile: u64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a HERE tile id", s))?;
        QuadKey::from_here_tile(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_tile() {
        let root = QuadKey::new(0, 0, 0).unwrap();
        assert_eq!(root.to_here_tile(), 1);
        assert_eq!(QuadKey::from_here_tile(1).unwrap(), root);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_level_one_tiles() {
        // Column in bit 0, row in bit 1, indicator in bit 2.
        assert_eq!(QuadKey::new(1, 0, 0).unwrap().to_here_tile(), 4);
        assert_eq!(QuadKey::new(1, 0, 1).unwrap().to_here_tile(), 5);
        assert_eq!(QuadKey::new(1, 1, 0).unwrap().to_here_tile(), 6);
        assert_eq!(QuadKey::new(1, 1, 1).unwrap().to_here_tile(), 7);
    }

    #[test]
    fn test_deep_tile_decodes_to_same_coordinates() {
        let key = QuadKey::new(14, 6_123, 8_722).unwrap();
        let tile = key.to_here_tile();
        assert_eq!(QuadKey::from_here_tile(tile).unwrap(), key);
        assert_eq!(tile.to_string().parse::<QuadKey>().unwrap(), key);
    }

    #[test]
    fn test_parent_and_children() {
        let key = QuadKey::new(3, 5, 2).unwrap();
        let children = key.children().unwrap();
        for child in children {
            assert_eq!(child.parent(), Some(key));
        }
        assert_eq!(key.parent(), Some(QuadKey::new(2, 2, 1).unwrap()));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(QuadKey::new(2, 4, 0).is_err());
        assert!(QuadKey::new(32, 0, 0).is_err());
        assert!(QuadKey::from_here_tile(0).is_err());
        // Indicator bit at an odd position.
        assert!(QuadKey::from_here_tile(2).is_err());
        assert!("abc".parse::<QuadKey>().is_err());
    }
}
