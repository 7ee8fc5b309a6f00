use std::fmt;

use crate::map::geometry::Point32;

/// Block side is 2^12 = 4096 planar meters
pub const BLOCK_SIZE_BITS: u32 = 12;

/// Folders hold 2^4 x 2^4 = 16 x 16 blocks
pub const FOLDER_SIZE_BITS: u32 = 4;

pub const BLOCK_SIZE: i32 = 1 << BLOCK_SIZE_BITS;
const BLOCK_MASK: i32 = BLOCK_SIZE - 1;
const FOLDER_MASK: i32 = (1 << FOLDER_SIZE_BITS) - 1;

/// Offset of the block containing `p`: low bits cleared, so negative
/// coordinates floor toward the south-west
#[inline(always)]
pub fn block_offset(p: Point32) -> Point32 {
    Point32::new(p.x & !BLOCK_MASK, p.y & !BLOCK_MASK)
}

/// Where a block lives in the folder tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockAddress {
    pub offset: Point32,
    pub folder_x: i32,
    pub folder_y: i32,
    /// Column within the folder, 0..16
    pub block_x: u8,
    /// Row within the folder, 0..16
    pub block_y: u8,
}

impl BlockAddress {
    /// Address of the block containing `p`
    pub fn containing(p: Point32) -> Self {
        let offset = block_offset(p);
        let shift = BLOCK_SIZE_BITS + FOLDER_SIZE_BITS;
        Self {
            offset,
            folder_x: offset.x >> shift,
            folder_y: offset.y >> shift,
            block_x: ((offset.x >> BLOCK_SIZE_BITS) & FOLDER_MASK) as u8,
            block_y: ((offset.y >> BLOCK_SIZE_BITS) & FOLDER_MASK) as u8,
        }
    }

    /// Folder name: both components signed and zero padded to four chars
    pub fn folder_name(&self) -> String {
        format!("{:+04}{:+04}", self.folder_x, self.folder_y)
    }

    /// File name inside the folder, without extension
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.block_x, self.block_y)
    }

    /// `folder/blockX_blockY`, the block identity handed to storage
    pub fn key(&self) -> String {
        format!("{}/{}", self.folder_name(), self.file_stem())
    }
}

impl fmt::Display for BlockAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_offset_alignment() {
        let samples = [
            Point32::new(0, 0),
            Point32::new(4095, 4096),
            Point32::new(-1, -4097),
            Point32::new(241_500, 5_070_123),
            Point32::new(-20_037_508, 20_037_508),
        ];
        for p in samples {
            let offset = block_offset(p);
            assert_eq!(offset.x.rem_euclid(BLOCK_SIZE), 0);
            assert_eq!(offset.y.rem_euclid(BLOCK_SIZE), 0);
            assert!(offset.x <= p.x && p.x < offset.x + BLOCK_SIZE);
            assert!(offset.y <= p.y && p.y < offset.y + BLOCK_SIZE);
            // Stable under repetition
            assert_eq!(block_offset(offset), offset);
            assert_eq!(block_offset(p), offset);
        }
    }

    #[test]
    fn test_negative_offsets_floor() {
        assert_eq!(block_offset(Point32::new(-1, -1)), Point32::new(-4096, -4096));
        assert_eq!(block_offset(Point32::new(-4096, 4095)), Point32::new(-4096, 0));
    }

    #[test]
    fn test_address_origin() {
        let addr = BlockAddress::containing(Point32::new(10, 10));
        assert_eq!(addr.folder_name(), "+000+000");
        assert_eq!(addr.key(), "+000+000/0_0");
    }

    #[test]
    fn test_address_components() {
        // Block (19, -1): folder (1, -1), position (3, 15)
        let p = Point32::new(19 * 4096 + 7, -5);
        let addr = BlockAddress::containing(p);
        assert_eq!(addr.offset, Point32::new(19 * 4096, -4096));
        assert_eq!((addr.folder_x, addr.folder_y), (1, -1));
        assert_eq!((addr.block_x, addr.block_y), (3, 15));
        assert_eq!(addr.key(), "+001-001/3_15");
    }

    #[test]
    fn test_folder_name_width() {
        // Barcelona-ish planar coordinates
        let addr = BlockAddress::containing(Point32::new(241_557, 5_071_000));
        assert_eq!(addr.folder_name(), "+003+077");
        assert_eq!(addr.file_stem(), "10_6");
    }
}
