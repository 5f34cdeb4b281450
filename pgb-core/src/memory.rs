pub mod address;
pub mod cartridge;
pub mod ioregisters;
mod mapper;

use crate::cpu::InterruptType;
use crate::input::{Button, JoypadState};
use crate::memory::cartridge::CartridgeHeader;
use crate::memory::ioregisters::{InterruptFlags, IoRegister, Lcdc};
use crate::memory::mapper::RomBanking;

/// The full 64KB address space: flat backing storage for everything the cartridge does not own,
/// the boot ROM overlay, the banked ROM window, and the memory-mapped side effects of the I/O
/// registers.
#[derive(Debug, Clone)]
pub struct AddressSpace {
    memory: Box<[u8; 0x10000]>,
    rom: Vec<u8>,
    header: CartridgeHeader,
    rom_banking: RomBanking,
    boot_rom: Option<Box<[u8; 0x100]>>,
    external_ram: Vec<u8>,
    joypad: JoypadState,
}

impl AddressSpace {
    /// Build the address space from a cartridge image and an optional boot image.
    ///
    /// With a boot image the overlay is active and I/O registers start zeroed; without one the
    /// I/O registers are initialized to their post-boot values.
    ///
    /// # Panics
    ///
    /// Panics if `rom` is shorter than the cartridge header or `boot_rom` is shorter than 256
    /// bytes. These are loader preconditions.
    pub fn new(rom: Vec<u8>, boot_rom: Option<&[u8]>) -> Self {
        let header = CartridgeHeader::parse(&rom);
        log::info!("loaded cartridge: {header}");
        if !header.header_checksum_valid(&rom) {
            log::warn!(
                "header checksum mismatch: expected {:02X}, computed {:02X}",
                header.header_checksum,
                CartridgeHeader::computed_header_checksum(&rom)
            );
        }

        let mut memory = Box::new([0; 0x10000]);
        let fixed_len = rom.len().min(usize::from(address::ROM_END) + 1);
        memory[..fixed_len].copy_from_slice(&rom[..fixed_len]);

        let boot_rom = boot_rom.map(|boot_rom| {
            let mut overlay = Box::new([0; 0x100]);
            overlay.copy_from_slice(&boot_rom[..usize::from(address::BOOT_ROM_LEN)]);
            overlay
        });

        if boot_rom.is_none() {
            for register in IoRegister::ALL {
                memory[usize::from(register.to_address())] = register.post_boot_value();
            }
        }

        let rom_banking = RomBanking::new(header.rom_bank_count);
        let external_ram = vec![0; header.ram_size_bytes as usize];

        Self {
            memory,
            rom,
            header,
            rom_banking,
            boot_rom,
            external_ram,
            joypad: JoypadState::new(),
        }
    }

    pub fn cartridge_header(&self) -> &CartridgeHeader {
        &self.header
    }

    /// Read the value at the given address from the perspective of the running program.
    pub fn read_address_u8(&self, address: u16) -> u8 {
        if address == IoRegister::JOYP.to_address() {
            return self.joypad.joyp_value(self.memory[usize::from(address)]);
        }

        if address == IoRegister::IF.to_address() {
            return self.memory[usize::from(address)] | 0xE0;
        }

        if let Some(boot_rom) = &self.boot_rom {
            if address < address::BOOT_ROM_LEN {
                return boot_rom[usize::from(address)];
            }
        }

        match address {
            address::BANKED_ROM_START..=address::BANKED_ROM_END if self.rom_banking.is_banked() => {
                let rom_address = self.rom_banking.map_rom_address(address);
                self.rom.get(rom_address).copied().unwrap_or(0xFF)
            }
            address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END => {
                let ram_address = usize::from(address - address::EXTERNAL_RAM_START);
                self.external_ram.get(ram_address).copied().unwrap_or(0xFF)
            }
            address::ECHO_RAM_START..=address::ECHO_RAM_END => {
                self.memory[usize::from(address - 0x2000)]
            }
            _ => self.memory[usize::from(address)],
        }
    }

    /// Read a little-endian 16-bit value starting at the given address.
    pub fn read_address_u16(&self, address: u16) -> u16 {
        let lsb = self.read_address_u8(address);
        let msb = self.read_address_u8(address.wrapping_add(1));
        u16::from_le_bytes([lsb, msb])
    }

    /// Write a value to the given address from the perspective of the running program, applying
    /// every memory-mapped side effect.
    pub fn write_address_u8(&mut self, address: u16, value: u8) {
        match address {
            address::BANK_SELECT_START..=address::BANK_SELECT_END => {
                self.rom_banking.select_bank(value);
            }
            address::ROM_START..=address::ROM_END => {
                // Cartridge ROM is read-only
            }
            address::EXTERNAL_RAM_START..=address::EXTERNAL_RAM_END => {
                let ram_address = usize::from(address - address::EXTERNAL_RAM_START);
                if let Some(byte) = self.external_ram.get_mut(ram_address) {
                    *byte = value;
                }
            }
            address::ECHO_RAM_START..=address::ECHO_RAM_END => {
                self.memory[usize::from(address - 0x2000)] = value;
            }
            address::IO_REGISTERS_START..=address::IO_REGISTERS_END => {
                self.write_io_register(address, value);
            }
            _ => {
                self.memory[usize::from(address)] = value;
            }
        }
    }

    /// Write a 16-bit value in little-endian order starting at the given address.
    pub fn write_address_u16(&mut self, address: u16, value: u16) {
        let [lsb, msb] = value.to_le_bytes();
        self.write_address_u8(address, lsb);
        self.write_address_u8(address.wrapping_add(1), msb);
    }

    fn write_io_register(&mut self, address: u16, value: u8) {
        let Some(register) = IoRegister::from_address(address) else {
            self.memory[usize::from(address)] = value;
            return;
        };

        if !register.is_cpu_writable() {
            return;
        }

        let relative_addr = usize::from(address);
        match register {
            IoRegister::JOYP => {
                // Only the selection bits are writable, button state comes from the joypad
                self.memory[relative_addr] = value & 0x30;
            }
            IoRegister::DIV => {
                // All writes to DIV reset the value to 0
                self.memory[relative_addr] = 0x00;
            }
            IoRegister::STAT => {
                // Bits 0-2 are owned by the LCD
                let existing_value = self.memory[relative_addr];
                self.memory[relative_addr] = (existing_value & 0x07) | (value & 0x78);
            }
            IoRegister::DMA => {
                self.memory[relative_addr] = value;
                self.oam_dma_transfer(value);
            }
            IoRegister::BOOT => {
                self.memory[relative_addr] = value;
                if value != 0 {
                    self.disable_boot_rom();
                }
            }
            _ => {
                self.memory[relative_addr] = value;
            }
        }
    }

    fn oam_dma_transfer(&mut self, source_high_byte: u8) {
        let source = u16::from(source_high_byte) << 8;
        log::debug!("OAM DMA transfer from {source:04X}");

        for offset in 0..address::OAM_DMA_LEN {
            let byte = self.read_address_u8(source.wrapping_add(offset));
            self.memory[usize::from(address::OAM_START + offset)] = byte;
        }
    }

    pub fn boot_rom_active(&self) -> bool {
        self.boot_rom.is_some()
    }

    /// Permanently remove the boot ROM overlay. There is no way to re-enable it.
    pub fn disable_boot_rom(&mut self) {
        if self.boot_rom.take().is_some() {
            log::info!("boot ROM overlay disabled");
        }
    }

    pub fn selected_rom_bank(&self) -> u16 {
        self.rom_banking.selected_bank()
    }

    pub fn rom_bank_count(&self) -> u16 {
        self.rom_banking.bank_count()
    }

    /// Save RAM contents, for a persistence layer to store.
    pub fn external_ram(&self) -> &[u8] {
        &self.external_ram
    }

    pub fn joypad(&self) -> &JoypadState {
        &self.joypad
    }

    /// Press a button, requesting the joypad interrupt if its half of the pad is selected.
    pub fn press_button(&mut self, button: Button) {
        let joyp_select = self.memory[usize::from(IoRegister::JOYP.to_address())];
        if self.joypad.press(button) && JoypadState::is_selected(button, joyp_select) {
            self.interrupt_flags().set(InterruptType::Joypad);
        }
    }

    pub fn release_button(&mut self, button: Button) {
        self.joypad.release(button);
    }

    /// Read the raw stored value of a hardware register, bypassing read-time side effects.
    pub fn read_register(&self, register: IoRegister) -> u8 {
        self.memory[usize::from(register.to_address())]
    }

    /// Assign a value to the LY register (current scanline), which the program cannot write to.
    pub fn privileged_set_ly(&mut self, value: u8) {
        self.memory[usize::from(IoRegister::LY.to_address())] = value;
    }

    /// Assign a value to the DIV register, which normally resets to 0 on every program write.
    pub fn privileged_set_div(&mut self, value: u8) {
        self.memory[usize::from(IoRegister::DIV.to_address())] = value;
    }

    /// Assign a value to the STAT register, including the read-only bits.
    pub fn privileged_set_stat(&mut self, value: u8) {
        self.memory[usize::from(IoRegister::STAT.to_address())] = value;
    }

    /// Assign a value to the TIMA register from the timer logic.
    pub fn privileged_set_tima(&mut self, value: u8) {
        self.memory[usize::from(IoRegister::TIMA.to_address())] = value;
    }

    pub fn get_ie_register(&self) -> u8 {
        self.memory[usize::from(address::IE_REGISTER)]
    }

    /// Obtain a read/write view around the IF register (interrupt request flags).
    pub fn interrupt_flags(&mut self) -> InterruptFlags<'_> {
        InterruptFlags(&mut self.memory[usize::from(IoRegister::IF.to_address())])
    }

    /// Obtain a read-only view around the LCDC register (LCD control).
    pub fn lcdc(&self) -> Lcdc {
        Lcdc(self.read_register(IoRegister::LCDC))
    }
}
