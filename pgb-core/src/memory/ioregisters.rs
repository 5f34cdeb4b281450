mod lcdc;

use crate::cpu::InterruptType;
pub use lcdc::{Lcdc, ObjectSize, TileDataArea};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoRegister {
    JOYP,
    SB,
    SC,
    DIV,
    TIMA,
    TMA,
    TAC,
    IF,
    LCDC,
    STAT,
    SCY,
    SCX,
    LY,
    LYC,
    DMA,
    BGP,
    OBP0,
    OBP1,
    WY,
    WX,
    BOOT,
}

impl IoRegister {
    /// Return the hardware register corresponding to the given address.
    pub fn from_address(address: u16) -> Option<Self> {
        let register = match address {
            0xFF00 => Self::JOYP,
            0xFF01 => Self::SB,
            0xFF02 => Self::SC,
            0xFF04 => Self::DIV,
            0xFF05 => Self::TIMA,
            0xFF06 => Self::TMA,
            0xFF07 => Self::TAC,
            0xFF0F => Self::IF,
            0xFF40 => Self::LCDC,
            0xFF41 => Self::STAT,
            0xFF42 => Self::SCY,
            0xFF43 => Self::SCX,
            0xFF44 => Self::LY,
            0xFF45 => Self::LYC,
            0xFF46 => Self::DMA,
            0xFF47 => Self::BGP,
            0xFF48 => Self::OBP0,
            0xFF49 => Self::OBP1,
            0xFF4A => Self::WY,
            0xFF4B => Self::WX,
            0xFF50 => Self::BOOT,
            _ => return None,
        };

        Some(register)
    }

    /// Return the address for this hardware register.
    pub fn to_address(self) -> u16 {
        match self {
            Self::JOYP => 0xFF00,
            Self::SB => 0xFF01,
            Self::SC => 0xFF02,
            Self::DIV => 0xFF04,
            Self::TIMA => 0xFF05,
            Self::TMA => 0xFF06,
            Self::TAC => 0xFF07,
            Self::IF => 0xFF0F,
            Self::LCDC => 0xFF40,
            Self::STAT => 0xFF41,
            Self::SCY => 0xFF42,
            Self::SCX => 0xFF43,
            Self::LY => 0xFF44,
            Self::LYC => 0xFF45,
            Self::DMA => 0xFF46,
            Self::BGP => 0xFF47,
            Self::OBP0 => 0xFF48,
            Self::OBP1 => 0xFF49,
            Self::WY => 0xFF4A,
            Self::WX => 0xFF4B,
            Self::BOOT => 0xFF50,
        }
    }

    /// Return whether or not the running program is allowed to write to this hardware register.
    /// LY is only ever advanced by the scanline logic.
    pub fn is_cpu_writable(self) -> bool {
        !matches!(self, Self::LY)
    }

    /// Post-boot value of this register, as left behind by the DMG boot ROM.
    pub fn post_boot_value(self) -> u8 {
        match self {
            Self::JOYP => 0xCF,
            Self::SC => 0x7E,
            Self::DIV => 0xAB,
            Self::TAC => 0xF8,
            Self::IF => 0xE1,
            Self::LCDC => 0x91,
            Self::STAT => 0x85,
            Self::DMA | Self::OBP0 | Self::OBP1 => 0xFF,
            Self::BGP => 0xFC,
            Self::BOOT => 0x01,
            _ => 0x00,
        }
    }

    pub const ALL: [Self; 21] = [
        Self::JOYP,
        Self::SB,
        Self::SC,
        Self::DIV,
        Self::TIMA,
        Self::TMA,
        Self::TAC,
        Self::IF,
        Self::LCDC,
        Self::STAT,
        Self::SCY,
        Self::SCX,
        Self::LY,
        Self::LYC,
        Self::DMA,
        Self::BGP,
        Self::OBP0,
        Self::OBP1,
        Self::WY,
        Self::WX,
        Self::BOOT,
    ];
}

/// A convenience view around the IF register.
pub struct InterruptFlags<'a>(pub(crate) &'a mut u8);

impl<'a> InterruptFlags<'a> {
    /// Returns the highest priority requested + enabled interrupt, or None if no enabled interrupts
    /// have been requested.
    pub fn highest_priority_interrupt(&self, ie_value: u8) -> Option<InterruptType> {
        let masked_if = *self.0 & ie_value;
        InterruptType::PRIORITY_ORDER
            .into_iter()
            .find(|interrupt_type| masked_if & interrupt_type.bit() != 0)
    }

    pub fn get(&self, interrupt_type: InterruptType) -> bool {
        *self.0 & interrupt_type.bit() != 0
    }

    /// Sets the bit for the given interrupt type.
    pub fn set(&mut self, interrupt_type: InterruptType) {
        *self.0 |= interrupt_type.bit();
    }

    /// Clears the bit for the given interrupt type.
    pub fn clear(&mut self, interrupt_type: InterruptType) {
        *self.0 &= !interrupt_type.bit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trip() {
        for register in IoRegister::ALL {
            assert_eq!(Some(register), IoRegister::from_address(register.to_address()));
        }

        assert_eq!(None, IoRegister::from_address(0xFF03));
        assert_eq!(None, IoRegister::from_address(0xFF80));
    }

    #[test]
    fn interrupt_priority() {
        let mut if_value = 0x1F;
        let flags = InterruptFlags(&mut if_value);

        assert_eq!(Some(InterruptType::VBlank), flags.highest_priority_interrupt(0x1F));
        assert_eq!(Some(InterruptType::LcdStatus), flags.highest_priority_interrupt(0x1E));
        assert_eq!(Some(InterruptType::Timer), flags.highest_priority_interrupt(0x1C));
        assert_eq!(Some(InterruptType::Serial), flags.highest_priority_interrupt(0x18));
        assert_eq!(Some(InterruptType::Joypad), flags.highest_priority_interrupt(0x10));
        assert_eq!(None, flags.highest_priority_interrupt(0x00));
        assert_eq!(None, flags.highest_priority_interrupt(0xE0));
    }

    #[test]
    fn set_and_clear() {
        let mut if_value = 0x00;
        let mut flags = InterruptFlags(&mut if_value);

        flags.set(InterruptType::Timer);
        flags.set(InterruptType::VBlank);
        assert!(flags.get(InterruptType::Timer));
        assert!(!flags.get(InterruptType::Serial));

        flags.clear(InterruptType::VBlank);
        assert!(!flags.get(InterruptType::VBlank));
        assert_eq!(0x04, if_value);
    }
}
