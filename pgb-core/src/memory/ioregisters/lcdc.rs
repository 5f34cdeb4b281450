use crate::memory::address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileDataArea {
    // 0x8000-0x8FFF, tile index read as u8
    Unsigned,
    // 0x8800-0x97FF, tile index read as i8 relative to 0x9000
    Signed,
}

impl TileDataArea {
    /// Return the address of the first byte of the given tile.
    pub fn tile_address(self, tile_index: u8) -> u16 {
        match self {
            Self::Unsigned => address::TILE_DATA_UNSIGNED_BASE + 16 * u16::from(tile_index),
            Self::Signed => {
                let offset = 16 * i32::from(tile_index as i8);
                (i32::from(address::TILE_DATA_SIGNED_BASE) + offset) as u16
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSize {
    EightByEight,
    EightBySixteen,
}

impl ObjectSize {
    pub fn height(self) -> u8 {
        match self {
            Self::EightByEight => 8,
            Self::EightBySixteen => 16,
        }
    }
}

/// A read-only view around the LCDC register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcdc(pub(crate) u8);

impl Lcdc {
    pub fn display_enabled(self) -> bool {
        self.0 & 0x80 != 0
    }

    pub fn window_tile_map_address(self) -> u16 {
        if self.0 & 0x40 != 0 {
            address::TILE_MAP_1
        } else {
            address::TILE_MAP_0
        }
    }

    pub fn window_enabled(self) -> bool {
        self.0 & 0x20 != 0
    }

    pub fn tile_data_area(self) -> TileDataArea {
        if self.0 & 0x10 != 0 {
            TileDataArea::Unsigned
        } else {
            TileDataArea::Signed
        }
    }

    pub fn bg_tile_map_address(self) -> u16 {
        if self.0 & 0x08 != 0 {
            address::TILE_MAP_1
        } else {
            address::TILE_MAP_0
        }
    }

    pub fn object_size(self) -> ObjectSize {
        if self.0 & 0x04 != 0 {
            ObjectSize::EightBySixteen
        } else {
            ObjectSize::EightByEight
        }
    }

    pub fn objects_enabled(self) -> bool {
        self.0 & 0x02 != 0
    }

    pub fn bg_enabled(self) -> bool {
        self.0 & 0x01 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_addresses() {
        assert_eq!(0x8000, TileDataArea::Unsigned.tile_address(0));
        assert_eq!(0x8FF0, TileDataArea::Unsigned.tile_address(255));
        assert_eq!(0x9000, TileDataArea::Signed.tile_address(0));
        assert_eq!(0x97F0, TileDataArea::Signed.tile_address(127));
        assert_eq!(0x8800, TileDataArea::Signed.tile_address(0x80));
        assert_eq!(0x8FF0, TileDataArea::Signed.tile_address(0xFF));
    }

    #[test]
    fn control_bits() {
        let lcdc = Lcdc(0x91);
        assert!(lcdc.display_enabled());
        assert!(!lcdc.window_enabled());
        assert_eq!(TileDataArea::Unsigned, lcdc.tile_data_area());
        assert_eq!(0x9800, lcdc.bg_tile_map_address());
        assert_eq!(ObjectSize::EightByEight, lcdc.object_size());
        assert!(!lcdc.objects_enabled());
        assert!(lcdc.bg_enabled());

        let lcdc = Lcdc(0x6E);
        assert!(!lcdc.display_enabled());
        assert_eq!(0x9C00, lcdc.window_tile_map_address());
        assert!(lcdc.window_enabled());
        assert_eq!(TileDataArea::Signed, lcdc.tile_data_area());
        assert_eq!(0x9C00, lcdc.bg_tile_map_address());
        assert_eq!(ObjectSize::EightBySixteen, lcdc.object_size());
        assert!(lcdc.objects_enabled());
        assert!(!lcdc.bg_enabled());
    }
}
