use crate::cpu::InterruptType;
use crate::memory::ioregisters::IoRegister;
use crate::memory::AddressSpace;

const DIV_UPDATE_FREQUENCY: u32 = 256;

/// Cycle accumulators for the divider and the TAC-driven TIMA counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerCounter {
    div_cycles: u32,
    tima_cycles: u32,
}

impl TimerCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tima_update_frequency(timer_control: u8) -> u32 {
    match timer_control & 0x03 {
        0x00 => 1024,
        0x01 => 16,
        0x02 => 64,
        _ => 256,
    }
}

/// Advance DIV and TIMA by the given number of clock cycles, requesting the timer interrupt when
/// TIMA overflows.
pub fn update_timer_registers(
    address_space: &mut AddressSpace,
    counter: &mut TimerCounter,
    cycles: u32,
) {
    counter.div_cycles += cycles;
    while counter.div_cycles >= DIV_UPDATE_FREQUENCY {
        counter.div_cycles -= DIV_UPDATE_FREQUENCY;

        let old_div = address_space.read_register(IoRegister::DIV);
        address_space.privileged_set_div(old_div.wrapping_add(1));
    }

    let timer_control = address_space.read_register(IoRegister::TAC);
    if timer_control & 0x04 == 0 {
        // TIMA updates are disabled
        return;
    }

    let tima_update_frequency = tima_update_frequency(timer_control);
    counter.tima_cycles += cycles;
    while counter.tima_cycles >= tima_update_frequency {
        counter.tima_cycles -= tima_update_frequency;

        let old_tima = address_space.read_register(IoRegister::TIMA);
        match old_tima.overflowing_add(1) {
            (new_tima, false) => {
                address_space.privileged_set_tima(new_tima);
            }
            (_, true) => {
                let timer_modulo = address_space.read_register(IoRegister::TMA);
                address_space.privileged_set_tima(timer_modulo);

                log::trace!("TIMA overflowed, reloading {timer_modulo:02X} from TMA");
                address_space.interrupt_flags().set(InterruptType::Timer);
            }
        }
    }
}
