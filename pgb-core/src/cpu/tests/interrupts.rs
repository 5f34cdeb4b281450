use super::program_rom;

use crate::cpu::{Cpu, CpuError, CpuRegister, CpuRegisters, InterruptType, ISR_CYCLES_REQUIRED};
use crate::memory::address;
use crate::memory::ioregisters::IoRegister;
use crate::memory::AddressSpace;

const IF_ADDRESS: u16 = 0xFF0F;

/// An address space running the given program, with IE and IF set to the given values.
fn setup(program_hex: &str, ie: u8, if_value: u8) -> AddressSpace {
    let mut address_space = AddressSpace::new(program_rom(program_hex), None);
    address_space.write_address_u8(address::IE_REGISTER, ie);
    address_space.write_address_u8(IF_ADDRESS, if_value);
    address_space
}

/// A CPU positioned at the start of the program.
fn program_cpu(ime: bool) -> Cpu {
    let mut registers = CpuRegisters::new();
    registers.pc = 0x0150;
    registers.sp = 0xFFFE;
    registers.ime = ime;
    Cpu::with_registers(registers)
}

#[test]
fn highest_priority_interrupt_is_serviced_first() {
    let mut address_space = setup("00", 0x1F, 0x14);
    let mut cpu = program_cpu(true);

    // Timer beats Joypad; the NOP at the handler also runs in this step
    let cycles = cpu.step(&mut address_space).expect("step should succeed");
    assert_eq!(ISR_CYCLES_REQUIRED + 4, cycles);
    assert_eq!(InterruptType::Timer.handler_address() + 1, cpu.registers().pc);
    assert_eq!(0x0150, address_space.read_address_u16(0xFFFC));
    assert_eq!(0xFFFC, cpu.registers().sp);
    assert!(!cpu.registers().ime);

    // Only the serviced bit is cleared
    assert_eq!(0xF0, address_space.read_address_u8(IF_ADDRESS));
}

#[test]
fn interrupt_requires_ime_and_enable() {
    // IME clear
    let mut address_space = setup("0000", 0x01, 0x01);
    let mut cpu = program_cpu(false);
    assert_eq!(4, cpu.step(&mut address_space).expect("step should succeed"));
    assert_eq!(0x0151, cpu.registers().pc);

    // Requested but not enabled
    let mut address_space = setup("0000", 0x02, 0x01);
    let mut cpu = program_cpu(true);
    assert_eq!(4, cpu.step(&mut address_space).expect("step should succeed"));
    assert_eq!(0x0151, cpu.registers().pc);
    assert_eq!(0xE1, address_space.read_address_u8(IF_ADDRESS));
}

#[test]
fn enable_interrupts_is_delayed_one_instruction() {
    // EI; NOP; NOP
    let mut address_space = setup("FB0000", 0x01, 0x01);
    let mut cpu = program_cpu(false);

    cpu.step(&mut address_space).expect("EI should execute");
    assert!(cpu.registers().ime);
    assert_eq!(0x0151, cpu.registers().pc);

    // The instruction after EI always runs before the interrupt
    cpu.step(&mut address_space).expect("NOP should execute");
    assert_eq!(0x0152, cpu.registers().pc);

    let cycles = cpu.step(&mut address_space).expect("interrupt should be serviced");
    assert_eq!(ISR_CYCLES_REQUIRED + 4, cycles);
    assert_eq!(InterruptType::VBlank.handler_address() + 1, cpu.registers().pc);
    assert_eq!(0x0152, address_space.read_address_u16(0xFFFC));
}

#[test]
fn disable_interrupts() {
    // DI; NOP
    let mut address_space = setup("F300", 0x01, 0x01);
    let mut cpu = program_cpu(false);

    cpu.step(&mut address_space).expect("DI should execute");
    cpu.step(&mut address_space).expect("NOP should execute");
    assert!(!cpu.registers().ime);
    assert_eq!(0x0152, cpu.registers().pc);
}

#[test]
fn return_from_interrupt_handler() {
    let mut rom = program_rom("0000");
    // RETI at the VBlank handler
    rom[usize::from(InterruptType::VBlank.handler_address())] = 0xD9;

    let mut address_space = AddressSpace::new(rom, None);
    address_space.write_address_u8(address::IE_REGISTER, 0x01);
    address_space.write_address_u8(IF_ADDRESS, 0x01);
    let mut cpu = program_cpu(true);

    let cycles = cpu.step(&mut address_space).expect("interrupt should be serviced");
    assert_eq!(ISR_CYCLES_REQUIRED + 16, cycles);
    assert_eq!(0x0150, cpu.registers().pc);
    assert_eq!(0xFFFE, cpu.registers().sp);
    assert!(cpu.registers().ime);

    assert_eq!(4, cpu.step(&mut address_space).expect("NOP should execute"));
    assert_eq!(0x0151, cpu.registers().pc);
}

#[test]
fn halt_exits_without_servicing_when_ime_clear() {
    // HALT; LD B, 0x01
    let mut address_space = setup("760601", 0x04, 0x00);
    let mut cpu = program_cpu(false);

    cpu.step(&mut address_space).expect("HALT should execute");
    assert!(cpu.registers().halted);

    for _ in 0..10 {
        assert_eq!(4, cpu.step(&mut address_space).expect("halted step should succeed"));
        assert!(cpu.registers().halted);
        assert_eq!(0x0151, cpu.registers().pc);
    }

    address_space.interrupt_flags().set(InterruptType::Timer);

    assert_eq!(8, cpu.step(&mut address_space).expect("LD should execute"));
    assert!(!cpu.registers().halted);
    assert_eq!(0x01, cpu.registers().read_register(CpuRegister::B));
    assert_eq!(0x0153, cpu.registers().pc);
    assert!(address_space.interrupt_flags().get(InterruptType::Timer));
}

#[test]
fn halt_exits_into_handler_when_ime_set() {
    // HALT; NOP
    let mut address_space = setup("7600", 0x10, 0x00);
    let mut cpu = program_cpu(true);

    cpu.step(&mut address_space).expect("HALT should execute");
    cpu.step(&mut address_space).expect("halted step should succeed");
    assert!(cpu.registers().halted);

    address_space.interrupt_flags().set(InterruptType::Joypad);

    cpu.step(&mut address_space).expect("interrupt should be serviced");
    assert!(!cpu.registers().halted);
    assert_eq!(InterruptType::Joypad.handler_address() + 1, cpu.registers().pc);
    assert_eq!(0x0151, address_space.read_address_u16(0xFFFC));
}

#[test]
fn unimplemented_opcode_stops_cpu() {
    // LD B, 0x01; <invalid>; LD C, 0x02
    let mut address_space = AddressSpace::new(program_rom("0601D30E02"), None);
    let mut cpu = program_cpu(false);

    cpu.step(&mut address_space).expect("LD should execute");

    let err = cpu.step(&mut address_space).expect_err("invalid opcode should fail");
    let CpuError::UnimplementedOpcode {
        pc,
        opcode,
        registers,
    } = &err;
    assert_eq!(0x0152, *pc);
    assert_eq!(0xD3, *opcode);
    assert_eq!(0x01, registers.read_register(CpuRegister::B));

    let message = err.to_string();
    assert!(message.contains("D3"), "{message}");
    assert!(message.contains("0152"), "{message}");

    // Every later step reports the same error without executing anything
    for _ in 0..5 {
        assert_eq!(Err(err.clone()), cpu.step(&mut address_space));
    }
    assert_eq!(0x0152, cpu.registers().pc);
    assert_eq!(0x00, cpu.registers().read_register(CpuRegister::C));
}

#[test]
fn lyc_coincidence_requests_lcd_status() {
    // JR -2
    let mut address_space = setup("18FE", 0x00, 0x00);
    address_space.write_address_u8(IoRegister::LYC.to_address(), 0x05);
    address_space.write_address_u8(IoRegister::STAT.to_address(), 0x40);
    let mut cpu = program_cpu(false);

    while address_space.read_register(IoRegister::LY) != 0x05 {
        assert!(!address_space.interrupt_flags().get(InterruptType::LcdStatus));
        cpu.step(&mut address_space).expect("step should succeed");
    }

    assert!(address_space.interrupt_flags().get(InterruptType::LcdStatus));
    assert_eq!(0x04, address_space.read_register(IoRegister::STAT) & 0x04);
}

#[test]
fn frame_ready_at_vblank() {
    // JR -2
    let mut address_space = setup("18FE", 0x00, 0x00);
    let mut cpu = program_cpu(false);

    assert!(!cpu.frame_ready());
    while !cpu.take_frame_ready() {
        cpu.step(&mut address_space).expect("step should succeed");
    }

    assert_eq!(144, address_space.read_register(IoRegister::LY));
    assert!(cpu.cycle_count() >= 144 * 456);
    assert!(!cpu.frame_ready());
}
