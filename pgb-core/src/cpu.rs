mod cycles;
pub(crate) mod instructions;
mod registers;


use crate::cpu::instructions::ParseError;
use crate::memory::address;
use crate::memory::ioregisters::IoRegister;
use crate::memory::AddressSpace;
use crate::timer::{self, TimerCounter};
use pgb_proc_macros::EnumDisplay;
use thiserror::Error;

pub use registers::{CpuRegister, CpuRegisterPair, CpuRegisters, Flags, RegisterPair};

/// Extra cycles spent pushing PC and jumping to a handler when an interrupt is serviced.
pub const ISR_CYCLES_REQUIRED: u32 = 20;

/// Cycles that pass per step while the CPU is halted.
pub const HALT_CYCLES: u32 = 4;

pub const CYCLES_PER_SCANLINE: u32 = 456;
pub const SCANLINES_PER_FRAME: u8 = 154;
pub const FIRST_VBLANK_SCANLINE: u8 = 144;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
pub enum InterruptType {
    VBlank,
    LcdStatus,
    Timer,
    Serial,
    Joypad,
}

impl InterruptType {
    /// Interrupt classes from highest to lowest priority.
    pub const PRIORITY_ORDER: [Self; 5] =
        [Self::VBlank, Self::LcdStatus, Self::Timer, Self::Serial, Self::Joypad];

    pub fn handler_address(self) -> u16 {
        match self {
            Self::VBlank => 0x0040,
            Self::LcdStatus => 0x0048,
            Self::Timer => 0x0050,
            Self::Serial => 0x0058,
            Self::Joypad => 0x0060,
        }
    }

    pub fn bit(self) -> u8 {
        match self {
            Self::VBlank => 0x01,
            Self::LcdStatus => 0x02,
            Self::Timer => 0x04,
            Self::Serial => 0x08,
            Self::Joypad => 0x10,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    #[error("unimplemented opcode {opcode:02X} at PC {pc:04X}; CPU halted with registers: {registers}")]
    UnimplementedOpcode {
        pc: u16,
        opcode: u8,
        registers: CpuRegisters,
    },
}

/// The instruction execution engine. Owns the register file and every cycle counter derived from
/// executed instructions (timer, scanline, frame-ready signal).
#[derive(Debug, Clone)]
pub struct Cpu {
    registers: CpuRegisters,
    timer_counter: TimerCounter,
    scanline_cycles: u32,
    cycle_count: u64,
    frame_ready: bool,
    fault: Option<CpuError>,
}

impl Cpu {
    /// Create a CPU that will either run a boot ROM from address 0, or start at the cartridge
    /// entry point in the post-boot register state.
    pub fn new(boot_rom_present: bool) -> Self {
        let registers = if boot_rom_present {
            CpuRegisters::new()
        } else {
            CpuRegisters::post_boot()
        };

        Self::with_registers(registers)
    }

    pub fn with_registers(registers: CpuRegisters) -> Self {
        Self {
            registers,
            timer_counter: TimerCounter::new(),
            scanline_cycles: 0,
            cycle_count: 0,
            frame_ready: false,
            fault: None,
        }
    }

    pub fn registers(&self) -> &CpuRegisters {
        &self.registers
    }

    /// Total clock cycles executed since construction.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Returns whether a frame was ready and clears the flag.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Execute one step: exit HALT or service an interrupt if one is due, then fetch, decode and
    /// execute a single instruction and advance all timing by its cycle cost. Returns the number
    /// of cycles consumed.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::UnimplementedOpcode`] when the opcode at PC is not defined. The CPU is
    /// stopped permanently after that and every later call returns the same error.
    pub fn step(&mut self, address_space: &mut AddressSpace) -> Result<u32, CpuError> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }

        if self.registers.halted {
            if pending_interrupts(address_space) == 0 {
                self.advance_timing(address_space, HALT_CYCLES);
                return Ok(HALT_CYCLES);
            }

            log::trace!("exiting HALT at PC {:04X}", self.registers.pc);
            self.registers.halted = false;
        }

        let mut cycles = 0;
        if self.interrupt_triggered(address_space) {
            self.execute_interrupt_service_routine(address_space);
            cycles += ISR_CYCLES_REQUIRED;
        }

        if address_space.boot_rom_active() && self.registers.pc >= address::BOOT_ROM_LEN {
            address_space.disable_boot_rom();
        }

        let pc = self.registers.pc;
        let opcode = address_space.read_address_u8(pc);
        let cb_opcode = address_space.read_address_u8(pc.wrapping_add(1));

        let (instruction, next_pc) = match instructions::parse_next_instruction(address_space, pc)
        {
            Ok(parsed) => parsed,
            Err(ParseError::InvalidOpcode { opcode, pc }) => {
                let err = CpuError::UnimplementedOpcode {
                    pc,
                    opcode,
                    registers: self.registers.clone(),
                };
                self.fault = Some(err.clone());
                return Err(err);
            }
        };

        log::trace!("PC={pc:04X} {instruction:?} [{}]", self.registers);

        let branch_taken = instruction.is_branch_taken(&self.registers);
        let interrupt_delay_pending = self.registers.interrupt_delay;

        self.registers.pc = next_pc;
        instruction.execute(address_space, &mut self.registers);

        // EI takes effect once the instruction after it has run
        if interrupt_delay_pending {
            self.registers.interrupt_delay = false;
        }

        cycles += cycles::instruction_cycles(opcode, cb_opcode, branch_taken);
        self.advance_timing(address_space, cycles);

        Ok(cycles)
    }

    fn interrupt_triggered(&self, address_space: &AddressSpace) -> bool {
        self.registers.ime
            && !self.registers.interrupt_delay
            && pending_interrupts(address_space) != 0
    }

    fn execute_interrupt_service_routine(&mut self, address_space: &mut AddressSpace) {
        let ie_value = address_space.get_ie_register();
        let Some(interrupt_type) =
            address_space.interrupt_flags().highest_priority_interrupt(ie_value)
        else {
            return;
        };

        log::debug!(
            "interrupt {interrupt_type} triggered, replacing previous PC of {:04X} with {:04X}",
            self.registers.pc,
            interrupt_type.handler_address()
        );

        let pc = self.registers.pc;
        instructions::push_stack(address_space, &mut self.registers, pc);
        self.registers.pc = interrupt_type.handler_address();

        address_space.interrupt_flags().clear(interrupt_type);
        self.registers.ime = false;
    }

    fn advance_timing(&mut self, address_space: &mut AddressSpace, cycles: u32) {
        self.cycle_count += u64::from(cycles);

        timer::update_timer_registers(address_space, &mut self.timer_counter, cycles);

        self.scanline_cycles += cycles;
        while self.scanline_cycles >= CYCLES_PER_SCANLINE {
            self.scanline_cycles -= CYCLES_PER_SCANLINE;
            self.advance_scanline(address_space);
        }
    }

    fn advance_scanline(&mut self, address_space: &mut AddressSpace) {
        let ly = address_space.read_register(IoRegister::LY).wrapping_add(1) % SCANLINES_PER_FRAME;
        address_space.privileged_set_ly(ly);

        let lyc = address_space.read_register(IoRegister::LYC);
        let stat = address_space.read_register(IoRegister::STAT);
        let coincidence = ly == lyc;
        address_space.privileged_set_stat((stat & !0x04) | (u8::from(coincidence) << 2));

        if coincidence && stat & 0x40 != 0 {
            address_space.interrupt_flags().set(InterruptType::LcdStatus);
        }

        if ly == FIRST_VBLANK_SCANLINE {
            self.frame_ready = true;
        }
    }
}

/// Interrupts that are both requested (IF) and enabled (IE).
fn pending_interrupts(address_space: &AddressSpace) -> u8 {
    address_space.read_register(IoRegister::IF) & address_space.get_ie_register() & 0x1F
}
