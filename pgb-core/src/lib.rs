mod cpu;
mod input;
pub mod memory;
pub mod ppu;
mod startup;
mod timer;

use crate::cpu::Cpu;
use crate::memory::cartridge::CartridgeHeader;
use crate::memory::AddressSpace;
use crate::ppu::{FrameBuffer, Ppu};

pub use cpu::{CpuError, CpuRegisters, Flags, InterruptType};
pub use input::{Button, JoypadState};
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
pub use startup::{StartupError, MIN_ROM_LEN};

/// Number of clock cycles in one full frame (154 scanlines of 456 cycles).
pub const CYCLES_PER_FRAME: u64 = 70_224;

/// Owns every piece of emulated hardware. The CPU and PPU both operate on the single address
/// space held here.
#[derive(Debug, Clone)]
pub struct EmulationState {
    address_space: AddressSpace,
    cpu: Cpu,
    ppu: Ppu,
}

impl EmulationState {
    /// Build the machine from a cartridge image and an optional 256-byte boot image.
    ///
    /// Without a boot image, execution starts at the cartridge entry point with registers and
    /// I/O registers in their post-boot state.
    ///
    /// # Errors
    ///
    /// Returns an error if the cartridge image is too short to contain a header, or if the boot
    /// image is shorter than 256 bytes.
    pub fn new(rom: Vec<u8>, boot_rom: Option<&[u8]>) -> Result<Self, StartupError> {
        startup::init_emulation_state(rom, boot_rom)
    }

    /// Execute one CPU step, returning the number of cycles it took.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::UnimplementedOpcode`] if execution reached an undefined opcode. The CPU
    /// does not recover from this; every later call returns the same error.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        self.cpu.step(&mut self.address_space)
    }

    /// Whether LY has reached the first V-blank line since the signal was last consumed.
    pub fn frame_ready(&self) -> bool {
        self.cpu.frame_ready()
    }

    /// Returns whether a frame was ready and clears the signal.
    pub fn take_frame_ready(&mut self) -> bool {
        self.cpu.take_frame_ready()
    }

    pub fn draw_frame(&mut self) {
        self.ppu.draw_frame(&self.address_space);
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        self.ppu.frame_buffer()
    }

    pub fn press(&mut self, button: Button) {
        self.address_space.press_button(button);
    }

    pub fn release(&mut self, button: Button) {
        self.address_space.release_button(button);
    }

    /// Set the IF bit for the given interrupt class, as hardware outside the CPU would.
    pub fn request_interrupt(&mut self, interrupt_type: InterruptType) {
        self.address_space.interrupt_flags().set(interrupt_type);
    }

    pub fn cartridge_header(&self) -> &CartridgeHeader {
        self.address_space.cartridge_header()
    }

    pub fn cpu_registers(&self) -> &CpuRegisters {
        self.cpu.registers()
    }

    pub fn address_space(&self) -> &AddressSpace {
        &self.address_space
    }

    /// Total clock cycles executed since construction.
    pub fn cycle_count(&self) -> u64 {
        self.cpu.cycle_count()
    }
}
