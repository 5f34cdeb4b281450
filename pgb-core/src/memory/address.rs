//
// Cartridge header addresses
//

pub const ENTRY_POINT: u16 = 0x0100;
pub const TITLE_START: u16 = 0x0134;
pub const TITLE_END: u16 = 0x0143;
pub const MANUFACTURER_CODE: u16 = 0x013F;
pub const CGB_FLAG: u16 = 0x0143;
pub const NEW_LICENSEE_CODE: u16 = 0x0144;
pub const SGB_FLAG: u16 = 0x0146;
pub const CARTRIDGE_TYPE: u16 = 0x0147;
pub const ROM_SIZE: u16 = 0x0148;
pub const RAM_SIZE: u16 = 0x0149;
pub const DESTINATION_CODE: u16 = 0x014A;
pub const OLD_LICENSEE_CODE: u16 = 0x014B;
pub const MASK_ROM_VERSION: u16 = 0x014C;
pub const HEADER_CHECKSUM: u16 = 0x014D;
pub const GLOBAL_CHECKSUM: u16 = 0x014E;
pub const HEADER_END: u16 = 0x014F;

//
// Address space boundaries
//

pub const BOOT_ROM_LEN: u16 = 0x0100;

pub const ROM_START: u16 = 0x0000;
pub const ROM_END: u16 = 0x7FFF;

pub const BANKED_ROM_START: u16 = 0x4000;
pub const BANKED_ROM_END: u16 = 0x7FFF;

// Writes here select the ROM bank mapped into 0x4000-0x7FFF
pub const BANK_SELECT_START: u16 = 0x2000;
pub const BANK_SELECT_END: u16 = 0x3FFF;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;

pub const EXTERNAL_RAM_START: u16 = 0xA000;
pub const EXTERNAL_RAM_END: u16 = 0xBFFF;

pub const WORKING_RAM_START: u16 = 0xC000;
pub const WORKING_RAM_END: u16 = 0xDFFF;

pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFDFF;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;

pub const IO_REGISTERS_START: u16 = 0xFF00;
pub const IO_REGISTERS_END: u16 = 0xFF7F;

pub const HRAM_START: u16 = 0xFF80;
pub const HRAM_END: u16 = 0xFFFE;

pub const IE_REGISTER: u16 = 0xFFFF;

//
// PPU memory layout
//

pub const TILE_MAP_0: u16 = 0x9800;
pub const TILE_MAP_1: u16 = 0x9C00;

// Unsigned tile indices, 0..=255
pub const TILE_DATA_UNSIGNED_BASE: u16 = 0x8000;

// Signed tile indices, -128..=127
pub const TILE_DATA_SIGNED_BASE: u16 = 0x9000;

// Number of bytes moved by a write to the DMA register
pub const OAM_DMA_LEN: u16 = 0x9F;
