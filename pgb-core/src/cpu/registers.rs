use std::fmt::Formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuRegister {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl CpuRegister {
    /// Decode the 3-bit register field used by most opcodes. Returns None for 0b110, which
    /// encodes (HL) rather than a register.
    pub fn from_opcode_bits(bits: u8) -> Option<Self> {
        match bits & 0x07 {
            0x00 => Some(Self::B),
            0x01 => Some(Self::C),
            0x02 => Some(Self::D),
            0x03 => Some(Self::E),
            0x04 => Some(Self::H),
            0x05 => Some(Self::L),
            0x07 => Some(Self::A),
            _ => None,
        }
    }

    pub fn from_low_opcode_bits(opcode: u8) -> Option<Self> {
        Self::from_opcode_bits(opcode)
    }

    pub fn from_mid_opcode_bits(opcode: u8) -> Option<Self> {
        Self::from_opcode_bits(opcode >> 3)
    }

    pub fn to_opcode_bits(self) -> u8 {
        match self {
            Self::B => 0x00,
            Self::C => 0x01,
            Self::D => 0x02,
            Self::E => 0x03,
            Self::H => 0x04,
            Self::L => 0x05,
            Self::A => 0x07,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuRegisterPair {
    AF,
    BC,
    DE,
    HL,
    SP,
}

/// A 16-bit register that can also be addressed as two 8-bit halves. The halves are views over
/// the single stored value, so `value() == (high() << 8) | low()` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    pub fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn low(self) -> u8 {
        self.0 as u8
    }

    pub fn set_high(&mut self, value: u8) {
        self.0 = (u16::from(value) << 8) | (self.0 & 0x00FF);
    }

    pub fn set_low(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub zero: bool,
    pub subtract: bool,
    pub half_carry: bool,
    pub carry: bool,
}

impl Flags {
    /// Pack into the F register layout: Z=bit 7, N=bit 6, H=bit 5, C=bit 4, low nibble always 0.
    pub fn to_byte(self) -> u8 {
        (u8::from(self.zero) << 7)
            | (u8::from(self.subtract) << 6)
            | (u8::from(self.half_carry) << 5)
            | (u8::from(self.carry) << 4)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            zero: byte & 0x80 != 0,
            subtract: byte & 0x40 != 0,
            half_carry: byte & 0x20 != 0,
            carry: byte & 0x10 != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuRegisters {
    pub accumulator: u8,
    pub flags: Flags,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub sp: u16,
    pub pc: u16,
    pub ime: bool,
    pub interrupt_delay: bool,
    pub halted: bool,
}

impl CpuRegisters {
    /// Power-on state, used when a boot ROM will run first.
    pub fn new() -> Self {
        Self {
            accumulator: 0x00,
            flags: Flags::default(),
            bc: RegisterPair::default(),
            de: RegisterPair::default(),
            hl: RegisterPair::default(),
            sp: 0x0000,
            pc: 0x0000,
            ime: false,
            interrupt_delay: false,
            halted: false,
        }
    }

    /// State the DMG boot ROM leaves behind when it jumps to the cartridge entry point.
    pub fn post_boot() -> Self {
        Self {
            accumulator: 0x01,
            flags: Flags::from_byte(0xB0),
            bc: RegisterPair::new(0x0013),
            de: RegisterPair::new(0x00D8),
            hl: RegisterPair::new(0x014D),
            sp: 0xFFFE,
            pc: 0x0100,
            ime: false,
            interrupt_delay: false,
            halted: false,
        }
    }

    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.accumulator, self.flags.to_byte()])
    }

    pub fn bc(&self) -> u16 {
        self.bc.value()
    }

    pub fn de(&self) -> u16 {
        self.de.value()
    }

    pub fn hl(&self) -> u16 {
        self.hl.value()
    }

    pub fn set_hl(&mut self, hl: u16) {
        self.hl.set(hl);
    }

    pub fn read_register(&self, register: CpuRegister) -> u8 {
        match register {
            CpuRegister::A => self.accumulator,
            CpuRegister::B => self.bc.high(),
            CpuRegister::C => self.bc.low(),
            CpuRegister::D => self.de.high(),
            CpuRegister::E => self.de.low(),
            CpuRegister::H => self.hl.high(),
            CpuRegister::L => self.hl.low(),
        }
    }

    pub fn set_register(&mut self, register: CpuRegister, value: u8) {
        match register {
            CpuRegister::A => self.accumulator = value,
            CpuRegister::B => self.bc.set_high(value),
            CpuRegister::C => self.bc.set_low(value),
            CpuRegister::D => self.de.set_high(value),
            CpuRegister::E => self.de.set_low(value),
            CpuRegister::H => self.hl.set_high(value),
            CpuRegister::L => self.hl.set_low(value),
        }
    }

    pub fn read_register_pair(&self, register_pair: CpuRegisterPair) -> u16 {
        match register_pair {
            CpuRegisterPair::AF => self.af(),
            CpuRegisterPair::BC => self.bc(),
            CpuRegisterPair::DE => self.de(),
            CpuRegisterPair::HL => self.hl(),
            CpuRegisterPair::SP => self.sp,
        }
    }

    pub fn set_register_pair(&mut self, register_pair: CpuRegisterPair, value: u16) {
        match register_pair {
            CpuRegisterPair::AF => {
                let [a, f] = value.to_be_bytes();
                self.accumulator = a;
                self.flags = Flags::from_byte(f);
            }
            CpuRegisterPair::BC => self.bc.set(value),
            CpuRegisterPair::DE => self.de.set(value),
            CpuRegisterPair::HL => self.hl.set(value),
            CpuRegisterPair::SP => self.sp = value,
        }
    }

    pub fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.flags = Flags {
            zero: z,
            subtract: n,
            half_carry: h,
            carry: c,
        };
    }

    /// Update only the flags passed as Some, leaving the others untouched.
    pub fn set_some_flags(
        &mut self,
        z: Option<bool>,
        n: Option<bool>,
        h: Option<bool>,
        c: Option<bool>,
    ) {
        if let Some(z) = z {
            self.flags.zero = z;
        }
        if let Some(n) = n {
            self.flags.subtract = n;
        }
        if let Some(h) = h {
            self.flags.half_carry = h;
        }
        if let Some(c) = c {
            self.flags.carry = c;
        }
    }

    pub fn zero_flag(&self) -> bool {
        self.flags.zero
    }

    pub fn carry_flag(&self) -> bool {
        self.flags.carry
    }
}

impl Default for CpuRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CpuRegisters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PC={:04X} SP={:04X} A={:02X} F={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X} IME={} halted={}",
            self.pc,
            self.sp,
            self.accumulator,
            self.flags.to_byte(),
            self.bc.high(),
            self.bc.low(),
            self.de.high(),
            self.de.low(),
            self.hl.high(),
            self.hl.low(),
            u8::from(self.ime),
            self.halted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_pair_views_consistent() {
        for _ in 0..1000 {
            let high: u8 = rand::random();
            let low: u8 = rand::random();

            let mut pair = RegisterPair::default();
            pair.set_high(high);
            pair.set_low(low);
            assert_eq!(u16::from(high) * 256 + u16::from(low), pair.value());

            let value: u16 = rand::random();
            pair.set(value);
            assert_eq!((value >> 8) as u8, pair.high());
            assert_eq!(value as u8, pair.low());
        }
    }

    #[test]
    fn register_halves_write_through() {
        let mut registers = CpuRegisters::new();

        registers.set_register(CpuRegister::D, 0x12);
        registers.set_register(CpuRegister::E, 0x34);
        assert_eq!(0x1234, registers.de());

        registers.set_register_pair(CpuRegisterPair::HL, 0xABCD);
        assert_eq!(0xAB, registers.read_register(CpuRegister::H));
        assert_eq!(0xCD, registers.read_register(CpuRegister::L));

        registers.set_register(CpuRegister::B, 0xFF);
        assert_eq!(0xFF00, registers.bc());
    }

    #[test]
    fn af_masks_low_nibble() {
        let mut registers = CpuRegisters::new();

        registers.set_register_pair(CpuRegisterPair::AF, 0x12FF);
        assert_eq!(0x12F0, registers.af());
        assert!(registers.flags.zero);
        assert!(registers.flags.subtract);
        assert!(registers.flags.half_carry);
        assert!(registers.flags.carry);
    }

    #[test]
    fn set_some_flags_leaves_others() {
        let mut registers = CpuRegisters::new();
        registers.set_flags(true, false, true, false);

        registers.set_some_flags(None, Some(true), None, Some(true));
        assert_eq!(0xF0, registers.flags.to_byte());

        registers.set_some_flags(Some(false), None, Some(false), None);
        assert_eq!(0x50, registers.flags.to_byte());
    }
}
