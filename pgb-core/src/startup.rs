use crate::cpu::Cpu;
use crate::memory::{address, AddressSpace};
use crate::ppu::Ppu;
use crate::EmulationState;
use thiserror::Error;

/// Smallest cartridge image that contains a complete header.
pub const MIN_ROM_LEN: usize = address::HEADER_END as usize + 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    #[error("cartridge image is {len} bytes, must be at least {} bytes to hold a header", MIN_ROM_LEN)]
    RomTooShort { len: usize },
    #[error("boot image is {len} bytes, must be at least {} bytes", address::BOOT_ROM_LEN)]
    BootRomTooShort { len: usize },
}

pub(crate) fn init_emulation_state(
    rom: Vec<u8>,
    boot_rom: Option<&[u8]>,
) -> Result<EmulationState, StartupError> {
    if rom.len() < MIN_ROM_LEN {
        return Err(StartupError::RomTooShort { len: rom.len() });
    }

    if let Some(boot_rom) = boot_rom {
        if boot_rom.len() < usize::from(address::BOOT_ROM_LEN) {
            return Err(StartupError::BootRomTooShort { len: boot_rom.len() });
        }
    }

    let address_space = AddressSpace::new(rom, boot_rom);
    let cpu = Cpu::new(boot_rom.is_some());
    let ppu = Ppu::new();

    if boot_rom.is_some() {
        log::info!("boot image present, starting execution at 0x0000");
    } else {
        log::info!("no boot image, starting in post-boot state at {:04X}", address::ENTRY_POINT);
    }

    Ok(EmulationState {
        address_space,
        cpu,
        ppu,
    })
}
