use crate::memory::address;
use serde::Serialize;
use std::fmt::Formatter;

const TITLE_LEN: usize = 16;

/// Size in bytes of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 16 * 1024;

/// The typed contents of the cartridge header at 0x0100-0x014F. Parsed once at load time and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartridgeHeader {
    pub title: String,
    pub manufacturer_code: [u8; 4],
    pub cgb_flag: u8,
    pub new_licensee_code: [u8; 2],
    pub sgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub rom_bank_count: u16,
    pub ram_size_code: u8,
    pub ram_size_bytes: u32,
    pub destination_code: u8,
    pub old_licensee_code: u8,
    pub mask_rom_version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl CartridgeHeader {
    /// Parse the header fields out of a full ROM image.
    ///
    /// # Panics
    ///
    /// Panics if `rom` is shorter than 0x150 bytes. Callers are responsible for rejecting
    /// truncated images before construction.
    pub fn parse(rom: &[u8]) -> Self {
        let byte = |address: u16| rom[usize::from(address)];

        let title_bytes =
            &rom[usize::from(address::TITLE_START)..usize::from(address::TITLE_START) + TITLE_LEN];
        let title: String = title_bytes
            .iter()
            .take_while(|&&b| b != 0x00)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| char::from(b))
            .collect();

        let mut manufacturer_code = [0; 4];
        manufacturer_code.copy_from_slice(
            &rom[usize::from(address::MANUFACTURER_CODE)..usize::from(address::MANUFACTURER_CODE) + 4],
        );

        let rom_size_code = byte(address::ROM_SIZE);
        let ram_size_code = byte(address::RAM_SIZE);

        Self {
            title: title.trim_end().into(),
            manufacturer_code,
            cgb_flag: byte(address::CGB_FLAG),
            new_licensee_code: [
                byte(address::NEW_LICENSEE_CODE),
                byte(address::NEW_LICENSEE_CODE + 1),
            ],
            sgb_flag: byte(address::SGB_FLAG),
            cartridge_type: byte(address::CARTRIDGE_TYPE),
            rom_size_code,
            rom_bank_count: rom_bank_count(rom_size_code),
            ram_size_code,
            ram_size_bytes: ram_size_bytes(ram_size_code),
            destination_code: byte(address::DESTINATION_CODE),
            old_licensee_code: byte(address::OLD_LICENSEE_CODE),
            mask_rom_version: byte(address::MASK_ROM_VERSION),
            header_checksum: byte(address::HEADER_CHECKSUM),
            global_checksum: u16::from_be_bytes([
                byte(address::GLOBAL_CHECKSUM),
                byte(address::GLOBAL_CHECKSUM + 1),
            ]),
        }
    }

    /// Recompute the header checksum the way the boot ROM does, over 0x0134-0x014C.
    pub fn computed_header_checksum(rom: &[u8]) -> u8 {
        rom[usize::from(address::TITLE_START)..usize::from(address::HEADER_CHECKSUM)]
            .iter()
            .fold(0_u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1))
    }

    pub fn header_checksum_valid(&self, rom: &[u8]) -> bool {
        Self::computed_header_checksum(rom) == self.header_checksum
    }

    /// The new licensee code as text, or None if the header uses the old code exclusively.
    pub fn new_licensee_str(&self) -> Option<&str> {
        if self.old_licensee_code != 0x33 {
            return None;
        }

        std::str::from_utf8(&self.new_licensee_code).ok()
    }
}

impl std::fmt::Display for CartridgeHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "title='{}', type={:02X}, rom_size={:02X} ({} banks), ram_size={:02X} ({} bytes), header_checksum={:02X}",
            self.title,
            self.cartridge_type,
            self.rom_size_code,
            self.rom_bank_count,
            self.ram_size_code,
            self.ram_size_bytes,
            self.header_checksum
        )
    }
}

fn rom_bank_count(rom_size_code: u8) -> u16 {
    match rom_size_code {
        0x00 => 0,
        code @ 0x01..=0x07 => 1 << (code + 1),
        0x52 => 72,
        0x53 => 80,
        0x54 => 96,
        _ => {
            log::warn!("unrecognized ROM size code {rom_size_code:02X}, assuming no banking");
            0
        }
    }
}

fn ram_size_bytes(ram_size_code: u8) -> u32 {
    match ram_size_code {
        0x00..=0x02 => 0,
        0x03 => 32 * 1024,
        0x04 => 128 * 1024,
        0x05 => 64 * 1024,
        _ => {
            log::warn!("unrecognized RAM size code {ram_size_code:02X}, assuming no save RAM");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_header(rom_size_code: u8, ram_size_code: u8) -> Vec<u8> {
        let mut rom = vec![0x00; 0x8000];
        rom[0x0134..0x0134 + 6].copy_from_slice(b"TETRIS");
        rom[usize::from(address::ROM_SIZE)] = rom_size_code;
        rom[usize::from(address::RAM_SIZE)] = ram_size_code;
        rom
    }

    #[test]
    fn rom_bank_counts() {
        assert_eq!(0, rom_bank_count(0x00));
        assert_eq!(4, rom_bank_count(0x01));
        assert_eq!(8, rom_bank_count(0x02));
        assert_eq!(256, rom_bank_count(0x07));
        assert_eq!(72, rom_bank_count(0x52));
        assert_eq!(80, rom_bank_count(0x53));
        assert_eq!(96, rom_bank_count(0x54));
        assert_eq!(0, rom_bank_count(0x08));
    }

    #[test]
    fn ram_sizes() {
        for code in 0x00..=0x02 {
            assert_eq!(0, ram_size_bytes(code));
        }
        assert_eq!(0x8000, ram_size_bytes(0x03));
        assert_eq!(0x20000, ram_size_bytes(0x04));
        assert_eq!(0x10000, ram_size_bytes(0x05));
    }

    #[test]
    fn parse_fields() {
        let mut rom = rom_with_header(0x01, 0x03);
        rom[usize::from(address::CARTRIDGE_TYPE)] = 0x01;
        rom[usize::from(address::OLD_LICENSEE_CODE)] = 0x33;
        rom[0x0144..0x0146].copy_from_slice(b"01");
        rom[usize::from(address::GLOBAL_CHECKSUM)] = 0xAB;
        rom[usize::from(address::GLOBAL_CHECKSUM) + 1] = 0xCD;

        let header = CartridgeHeader::parse(&rom);
        assert_eq!("TETRIS", header.title);
        assert_eq!(0x01, header.cartridge_type);
        assert_eq!(4, header.rom_bank_count);
        assert_eq!(0x8000, header.ram_size_bytes);
        assert_eq!(0xABCD, header.global_checksum);
        assert_eq!(Some("01"), header.new_licensee_str());
    }

    #[test]
    fn title_stops_at_nul() {
        let mut rom = rom_with_header(0x00, 0x00);
        rom[0x0134..0x0134 + 16].copy_from_slice(b"ABC\0DEFGHIJKLMNO");

        assert_eq!("ABC", CartridgeHeader::parse(&rom).title);
    }

    #[test]
    fn header_checksum() {
        let mut rom = rom_with_header(0x00, 0x00);
        let checksum = CartridgeHeader::computed_header_checksum(&rom);
        rom[usize::from(address::HEADER_CHECKSUM)] = checksum;
        assert!(CartridgeHeader::parse(&rom).header_checksum_valid(&rom));

        rom[usize::from(address::HEADER_CHECKSUM)] = checksum.wrapping_add(1);
        assert!(!CartridgeHeader::parse(&rom).header_checksum_valid(&rom));
    }
}
