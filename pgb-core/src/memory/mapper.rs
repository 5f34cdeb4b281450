use crate::memory::address;
use crate::memory::cartridge::ROM_BANK_SIZE;

/// Simple ROM banking: the image past the fixed first window is split into `bank_count` 16KB
/// banks, one of which is visible at 0x4000-0x7FFF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RomBanking {
    bank_count: u16,
    selected_bank: u16,
}

impl RomBanking {
    pub(crate) fn new(bank_count: u16) -> Self {
        log::debug!("ROM banking configured with {bank_count} banks");

        Self {
            bank_count,
            selected_bank: 0,
        }
    }

    pub(crate) fn is_banked(&self) -> bool {
        self.bank_count > 0
    }

    pub(crate) fn bank_count(&self) -> u16 {
        self.bank_count
    }

    pub(crate) fn selected_bank(&self) -> u16 {
        self.selected_bank
    }

    /// Handle a write to the bank-select window. Out-of-range bank numbers leave the current
    /// selection unchanged.
    pub(crate) fn select_bank(&mut self, value: u8) {
        let bank = u16::from(value);
        if bank >= self.bank_count {
            log::debug!(
                "ignoring bank select {bank}, cartridge only has {} banks",
                self.bank_count
            );
            return;
        }

        log::debug!("switching ROM bank from {} to {bank}", self.selected_bank);
        self.selected_bank = bank;
    }

    /// Map an address in 0x4000-0x7FFF to an offset into the full cartridge image.
    pub(crate) fn map_rom_address(&self, address: u16) -> usize {
        debug_assert!((address::BANKED_ROM_START..=address::BANKED_ROM_END).contains(&address));

        usize::from(self.selected_bank) * ROM_BANK_SIZE + usize::from(address)
    }
}
