use super::{program_rom, test_cpu};

use crate::cpu::HALT_CYCLES;
use crate::memory::AddressSpace;

/// Run the program from 0x0150 for `steps` steps, returning the cycles reported by each one.
fn program_cycles(program_hex: &str, steps: usize) -> Vec<u32> {
    let mut address_space = AddressSpace::new(program_rom(program_hex), None);
    let mut cpu = test_cpu();

    while cpu.registers().pc != 0x0150 {
        cpu.step(&mut address_space).expect("entry point jump should execute");
    }

    (0..steps)
        .map(|_| cpu.step(&mut address_space).expect("program should execute"))
        .collect()
}

#[test]
fn simple_instructions() {
    // NOP; LD B, n; LD BC, nn; LD (nn), A; LD A, (nn)
    assert_eq!(vec![4, 8, 12, 16, 16], program_cycles("000612013412EA00C0FA00C0", 5));
    // LD HL, nn; LD (HL), n; INC (HL); LD B, (HL)
    assert_eq!(vec![12, 12, 12, 8], program_cycles("2100C036123446", 4));
    // PUSH BC; POP BC; LD (nn), SP; ADD SP, e; LD HL, SP+e; LD SP, HL
    assert_eq!(vec![16, 12, 20, 16, 12, 8], program_cycles("C5C10800C0E801F801F9", 6));
    // INC BC; ADD HL, BC; LDH (n), A; LDH A, (n); LD (C), A
    assert_eq!(vec![8, 8, 12, 12, 8], program_cycles("0309E080F080E2", 5));
}

#[test]
fn cb_prefixed_instructions() {
    // RLC B; SET 0, A
    assert_eq!(vec![8, 8], program_cycles("CB00CBC7", 2));
    // LD HL, nn; RLC (HL); SET 0, (HL); BIT 0, (HL)
    assert_eq!(vec![12, 16, 16, 12], program_cycles("2100C0CB06CBC6CB46", 4));
}

#[test]
fn jumps() {
    // JP nn
    assert_eq!(vec![16], program_cycles("C35301", 1));
    // LD HL, nn; JP HL
    assert_eq!(vec![12, 4], program_cycles("215401E9", 2));
    // JR e
    assert_eq!(vec![12], program_cycles("1800", 1));

    // XOR A; JP NZ (not taken); JP Z (taken)
    assert_eq!(vec![4, 12, 16], program_cycles("AFC25401CA5701", 3));
    // XOR A; JR NZ (not taken); JR Z (taken)
    assert_eq!(vec![4, 8, 12], program_cycles("AF20002800", 3));
}

#[test]
fn calls_and_returns() {
    // CALL nn
    assert_eq!(vec![24], program_cycles("CD0002", 1));
    // XOR A; CALL NZ (not taken); CALL Z (taken)
    assert_eq!(vec![4, 12, 24], program_cycles("AFC40002CC0002", 3));

    // CALL 0x0155; JR +1; RET
    assert_eq!(vec![24, 16, 12], program_cycles("CD55011801C9", 3));

    // CALL 0x0155; JR +3; XOR A; RET NZ (not taken); RET Z (taken)
    assert_eq!(vec![24, 4, 8, 20, 12], program_cycles("CD55011803AFC0C8", 5));

    // RST 0x00
    assert_eq!(vec![16], program_cycles("C7", 1));
}

#[test]
fn halted_steps() {
    // HALT with nothing enabled stays halted forever
    assert_eq!(vec![4, HALT_CYCLES, HALT_CYCLES, HALT_CYCLES], program_cycles("76", 4));
}

#[test]
fn cycle_count_accumulates() {
    let mut address_space = AddressSpace::new(program_rom("18FE"), None);
    let mut cpu = test_cpu();

    let total: u64 = (0..1000)
        .map(|_| u64::from(cpu.step(&mut address_space).expect("program should execute")))
        .sum();
    assert_eq!(total, cpu.cycle_count());
}
