//! Unit tests for individual Z80 instructions.
//!
//! Each test runs a short program to completion with `step()` and checks
//! registers, memory and ports afterwards.

use tact_core::{Cpu, Observable, SimpleBus, Value};
use tact_z80::{CF, HF, NF, PF, SF, XF, YF, ZF, Z80};

fn setup(code: &[u8]) -> (Z80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, code);
    (Z80::new(), bus)
}

/// Step until PC reaches `end`, with a safety limit.
fn run_to(cpu: &mut Z80, bus: &mut SimpleBus, end: u16) {
    let mut count = 0;
    while cpu.pc() != end && count < 10_000 {
        cpu.step(bus);
        count += 1;
    }
    assert_eq!(cpu.pc(), end, "did not reach {end:#06X}");
}

#[test]
fn test_push_pop_bc() {
    let (mut cpu, mut bus) = setup(&[
        0x01, 0x34, 0x12, // LD BC,0x1234
        0x31, 0x00, 0x80, // LD SP,0x8000
        0xC5, //             PUSH BC
        0x01, 0x00, 0x00, // LD BC,0
        0xC1, //             POP BC
    ]);
    run_to(&mut cpu, &mut bus, 0x000B);
    assert_eq!(cpu.registers().bc(), 0x1234);
    assert_eq!(cpu.registers().sp, 0x8000);
    assert_eq!(bus.peek(0x7FFF), 0x12);
    assert_eq!(bus.peek(0x7FFE), 0x34);
}

#[test]
fn test_pair_halves_stay_consistent() {
    // LD B,0x12; LD C,0x34; LD H,B; LD L,C
    let (mut cpu, mut bus) = setup(&[0x06, 0x12, 0x0E, 0x34, 0x60, 0x69]);
    run_to(&mut cpu, &mut bus, 0x0006);
    assert_eq!(cpu.registers().bc(), 0x1234);
    assert_eq!(cpu.registers().hl(), 0x1234);
}

#[test]
fn test_exx_twice_is_identity() {
    let (mut cpu, mut bus) = setup(&[0xD9, 0xD9]);
    let mut support = cpu.test_support();
    support.set_bc(0x1111);
    support.set_de(0x2222);
    support.set_hl(0x3333);
    support.set_af(0x4444);

    cpu.step(&mut bus);
    let regs = *cpu.registers();
    assert_eq!(regs.bc_alt(), 0x1111);
    assert_eq!(regs.de_alt(), 0x2222);
    assert_eq!(regs.hl_alt(), 0x3333);
    assert_eq!(regs.bc(), 0);
    assert_eq!(regs.af(), 0x4444);

    cpu.step(&mut bus);
    let regs = *cpu.registers();
    assert_eq!(regs.bc(), 0x1111);
    assert_eq!(regs.de(), 0x2222);
    assert_eq!(regs.hl(), 0x3333);
}

#[test]
fn test_ex_af_twice_is_identity() {
    let (mut cpu, mut bus) = setup(&[0x08, 0x08]);
    cpu.test_support().set_af(0xABCD);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().af(), 0);
    assert_eq!(cpu.registers().af_alt(), 0xABCD);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().af(), 0xABCD);
}

#[test]
fn test_ex_de_hl_ignores_index_prefix() {
    let (mut cpu, mut bus) = setup(&[0xDD, 0xEB]);
    cpu.test_support().set_de(0x1111);
    cpu.test_support().set_hl(0x2222);
    cpu.test_support().set_ix(0x3333);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.registers().de(), 0x2222);
    assert_eq!(cpu.registers().hl(), 0x1111);
    assert_eq!(cpu.registers().ix, 0x3333);
}

#[test]
fn test_index_halves() {
    let (mut cpu, mut bus) = setup(&[
        0xDD, 0x26, 0x12, // LD IXH,0x12
        0xDD, 0x2E, 0x34, // LD IXL,0x34
        0xFD, 0x67, //       LD IYH,A
        0xDD, 0x7D, //       LD A,IXL
    ]);
    cpu.test_support().set_a(0x56);
    run_to(&mut cpu, &mut bus, 0x000A);
    let regs = *cpu.registers();
    assert_eq!(regs.ix, 0x1234);
    assert_eq!(regs.iy, 0x5600);
    assert_eq!(regs.a, 0x34);
    assert_eq!(regs.hl(), 0);
}

#[test]
fn test_indexed_memory_form_uses_plain_h() {
    // LD H,(IX+2); LD (IX-1),L
    let (mut cpu, mut bus) = setup(&[0xDD, 0x66, 0x02, 0xDD, 0x75, 0xFF]);
    cpu.test_support().set_ix(0x4000);
    cpu.test_support().set_hl(0x0077);
    bus.poke(0x4002, 0x99);
    run_to(&mut cpu, &mut bus, 0x0006);
    assert_eq!(cpu.registers().h, 0x99);
    assert_eq!(cpu.registers().ix, 0x4000);
    assert_eq!(bus.peek(0x3FFF), 0x77);
}

#[test]
fn test_later_index_prefix_wins() {
    // DD FD 21 nn: the FD applies.
    let (mut cpu, mut bus) = setup(&[0xDD, 0xFD, 0x21, 0x34, 0x12]);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().iy, 0x1234);
    assert_eq!(cpu.registers().ix, 0);
    assert_eq!(cpu.registers().hl(), 0);
    assert_eq!(cpu.registers().r, 3);
}

#[test]
fn test_ed_after_index_prefix_drops_index() {
    // DD ED 44 = NEG
    let (mut cpu, mut bus) = setup(&[0xDD, 0xED, 0x44]);
    cpu.test_support().set_a(0x01);
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.registers().a, 0xFF);
    assert_eq!(cpu.registers().f, SF | YF | HF | XF | NF | CF);
}

#[test]
fn test_indexed_bit_ops() {
    let (mut cpu, mut bus) = setup(&[
        0xDD, 0xCB, 0x01, 0xC0, // SET 0,(IX+1),B
        0xFD, 0xCB, 0xFF, 0x06, // RLC (IY-1)
        0xDD, 0xCB, 0x01, 0x86, // RES 0,(IX+1)
    ]);
    cpu.test_support().set_ix(0x4000);
    cpu.test_support().set_iy(0x5000);
    bus.poke(0x4001, 0x80);
    bus.poke(0x4FFF, 0x81);

    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x4001), 0x81);
    assert_eq!(cpu.registers().b, 0x81);
    // Two M1 fetches only: the final opcode byte is read as data.
    assert_eq!(cpu.registers().r, 2);

    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x4FFF), 0x03);
    assert_ne!(cpu.registers().f & CF, 0);
    assert_eq!(cpu.registers().wz, 0x4FFF);

    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x4001), 0x80);
    assert_eq!(cpu.pc(), 0x000C);
}

#[test]
fn test_alu_and_cp() {
    let (mut cpu, mut bus) = setup(&[
        0x3E, 0x7F, // LD A,0x7F
        0xC6, 0x01, // ADD A,1
        0xFE, 0x80, // CP 0x80
    ]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x80);
    assert_eq!(cpu.registers().f, SF | HF | PF);

    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x80);
    assert_eq!(cpu.registers().f, ZF | NF);
}

#[test]
fn test_daa_after_bcd_add() {
    // LD A,0x15; ADD A,0x27; DAA
    let (mut cpu, mut bus) = setup(&[0x3E, 0x15, 0xC6, 0x27, 0x27]);
    run_to(&mut cpu, &mut bus, 0x0005);
    assert_eq!(cpu.registers().a, 0x42);
    assert_eq!(cpu.registers().f & CF, 0);
}

#[test]
fn test_inc_dec_preserve_carry() {
    // SCF; INC A; DEC B
    let (mut cpu, mut bus) = setup(&[0x37, 0x3C, 0x05]);
    run_to(&mut cpu, &mut bus, 0x0003);
    assert_eq!(cpu.registers().a, 1);
    assert_eq!(cpu.registers().b, 0xFF);
    assert_ne!(cpu.registers().f & CF, 0);
}

#[test]
fn test_rotate_and_shift() {
    let (mut cpu, mut bus) = setup(&[
        0xCB, 0x30, // SLL B
        0xCB, 0x29, // SRA C
        0x07, //       RLCA
    ]);
    cpu.test_support().set_bc(0x0081);
    cpu.test_support().set_a(0x81);
    run_to(&mut cpu, &mut bus, 0x0005);
    let regs = *cpu.registers();
    assert_eq!(regs.b, 0x01);
    assert_eq!(regs.c, 0xC0);
    assert_eq!(regs.a, 0x03);
    // RLCA keeps S, Z and P/V from SRA C.
    assert_eq!(regs.f, SF | PF | CF);
}

#[test]
fn test_rld_rrd() {
    let (mut cpu, mut bus) = setup(&[0xED, 0x6F]);
    cpu.test_support().set_hl(0x4000);
    cpu.test_support().set_a(0x12);
    bus.poke(0x4000, 0x34);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x13);
    assert_eq!(bus.peek(0x4000), 0x42);
    assert_eq!(cpu.registers().wz, 0x4001);

    let (mut cpu, mut bus) = setup(&[0xED, 0x67]);
    cpu.test_support().set_hl(0x4000);
    cpu.test_support().set_a(0x12);
    bus.poke(0x4000, 0x34);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x14);
    assert_eq!(bus.peek(0x4000), 0x23);
}

#[test]
fn test_ld_a_i_reports_iff2() {
    let (mut cpu, mut bus) = setup(&[0xED, 0x57]);
    cpu.test_support().set_i(0x80);
    cpu.test_support().set_iff2(true);
    cpu.test_support().set_f(CF);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x80);
    assert_eq!(cpu.registers().f, SF | PF | CF);
}

#[test]
fn test_im_instructions() {
    let (mut cpu, mut bus) = setup(&[0xED, 0x5E, 0xED, 0x56, 0xED, 0x4E]);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().im, 2);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().im, 1);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().im, 0);
}

#[test]
fn test_in_and_out_through_c() {
    let (mut cpu, mut bus) = setup(&[
        0xED, 0x78, // IN A,(C)
        0xED, 0x71, // OUT (C),0
        0xED, 0x70, // IN (C)
    ]);
    cpu.test_support().set_bc(0x12FE);
    bus.set_port(0x12FE, 0x80);

    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x80);
    assert_eq!(cpu.registers().f, SF);
    assert_eq!(cpu.registers().wz, 0x12FF);

    cpu.step(&mut bus);
    assert_eq!(bus.port_writes(), &[(0x12FE, 0x00)]);

    bus.set_port(0x12FE, 0x00);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x80);
    assert_eq!(cpu.registers().f, ZF | PF);
}

#[test]
fn test_otir_writes_each_byte() {
    let (mut cpu, mut bus) = setup(&[0xED, 0xB3]);
    cpu.test_support().set_hl(0x4000);
    cpu.test_support().set_bc(0x02FE);
    bus.load(0x4000, &[0x11, 0x22]);

    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.step(&mut bus), 16);
    // B is decremented before it reaches the address bus.
    assert_eq!(bus.port_writes(), &[(0x01FE, 0x11), (0x00FE, 0x22)]);
    assert_eq!(cpu.registers().b, 0);
    assert_ne!(cpu.registers().f & ZF, 0);
}

#[test]
fn test_inir_reads_into_memory() {
    let (mut cpu, mut bus) = setup(&[0xED, 0xB2]);
    cpu.test_support().set_hl(0x4000);
    cpu.test_support().set_bc(0x0210);
    bus.set_port(0x0210, 0xAA);
    bus.set_port(0x0110, 0xBB);

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x4000), 0xAA);
    assert_eq!(bus.peek(0x4001), 0xBB);
    assert_eq!(cpu.registers().hl(), 0x4002);
    assert_eq!(cpu.pc(), 0x0002);
}

#[test]
fn test_lddr_copies_downwards() {
    let (mut cpu, mut bus) = setup(&[0xED, 0xB8]);
    cpu.test_support().set_hl(0x4002);
    cpu.test_support().set_de(0x5002);
    cpu.test_support().set_bc(0x0003);
    bus.load(0x4000, &[1, 2, 3]);
    run_to(&mut cpu, &mut bus, 0x0002);
    assert_eq!(bus.peek(0x5000), 1);
    assert_eq!(bus.peek(0x5001), 2);
    assert_eq!(bus.peek(0x5002), 3);
    assert_eq!(cpu.registers().hl(), 0x3FFF);
}

#[test]
fn test_adc_sbc_hl() {
    // SCF; ADC HL,DE; SBC HL,DE
    let (mut cpu, mut bus) = setup(&[0x37, 0xED, 0x5A, 0xED, 0x52]);
    cpu.test_support().set_hl(0x7FFF);
    cpu.test_support().set_de(0x0000);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().hl(), 0x8000);
    assert_eq!(cpu.registers().f, SF | HF | PF);

    cpu.step(&mut bus);
    assert_eq!(cpu.registers().hl(), 0x8000);
    assert_eq!(cpu.registers().f, SF | NF);
}

#[test]
fn test_undefined_ed_is_nop() {
    let (mut cpu, mut bus) = setup(&[0xED, 0xFF]);
    cpu.test_support().set_af(0x1234);
    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.pc(), 0x0002);
    assert_eq!(cpu.registers().af(), 0x1234);
}

#[test]
fn test_call_and_ret() {
    let (mut cpu, mut bus) = setup(&[
        0x31, 0x00, 0x80, // LD SP,0x8000
        0xCD, 0x10, 0x00, // CALL 0x0010
    ]);
    bus.load(0x0010, &[0xC9]);
    run_to(&mut cpu, &mut bus, 0x0010);
    assert_eq!(cpu.registers().sp, 0x7FFE);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0006);
    assert_eq!(cpu.registers().sp, 0x8000);
}

#[test]
fn test_observable_paths() {
    let (mut cpu, mut bus) = setup(&[0xDD]);
    cpu.test_support().set_hl(0x1234);
    cpu.test_support().set_f(ZF | CF);
    cpu.execute_cycle(&mut bus);

    assert_eq!(cpu.query("hl"), Some(Value::U16(0x1234)));
    assert_eq!(cpu.query("h"), Some(Value::U8(0x12)));
    assert_eq!(cpu.query("flags.z"), Some(Value::Bool(true)));
    assert_eq!(cpu.query("flags.s"), Some(Value::Bool(false)));
    assert_eq!(cpu.query("prefix"), Some(Value::Str("index")));
    assert_eq!(cpu.query("index"), Some(Value::Str("ix")));
    assert_eq!(cpu.query("in_progress"), Some(Value::Bool(true)));
    assert_eq!(cpu.query("tacts"), Some(Value::U64(4)));
    assert_eq!(cpu.query("bogus"), None);

    for path in cpu.query_paths() {
        assert!(cpu.query(path).is_some(), "{path} not answered");
    }
}

#[test]
fn test_pc_wraps_at_top_of_memory() {
    let mut bus = SimpleBus::new();
    bus.poke(0xFFFF, 0x00);
    let mut cpu = Z80::new();
    cpu.test_support().set_pc(0xFFFF);
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.pc(), 0x0000);

    // LD BC,0x1234 with its operand straddling the wrap
    bus.load(0xFFFE, &[0x01, 0x34, 0x12]);
    cpu.test_support().set_pc(0xFFFE);
    assert_eq!(cpu.step(&mut bus), 10);
    assert_eq!(cpu.registers().bc(), 0x1234);
    assert_eq!(cpu.pc(), 0x0001);
}

#[test]
fn test_push_wraps_below_zero() {
    let mut bus = SimpleBus::new();
    bus.load(0x1000, &[0xC5]); // PUSH BC
    let mut cpu = Z80::new();
    let mut support = cpu.test_support();
    support.set_pc(0x1000);
    support.set_sp(0x0000);
    support.set_bc(0x1234);

    assert_eq!(cpu.step(&mut bus), 11);
    assert_eq!(cpu.registers().sp, 0xFFFE);
    assert_eq!(bus.peek(0xFFFF), 0x12);
    assert_eq!(bus.peek(0xFFFE), 0x34);
}

#[test]
fn test_pop_wraps_past_top() {
    let mut bus = SimpleBus::new();
    bus.load(0x1000, &[0xC1]); // POP BC
    bus.poke(0xFFFF, 0x34);
    bus.poke(0x0000, 0x12);
    let mut cpu = Z80::new();
    let mut support = cpu.test_support();
    support.set_pc(0x1000);
    support.set_sp(0xFFFF);

    assert_eq!(cpu.step(&mut bus), 10);
    assert_eq!(cpu.registers().bc(), 0x1234);
    assert_eq!(cpu.registers().sp, 0x0001);
}

#[test]
fn test_word_store_splits_across_wrap() {
    let mut bus = SimpleBus::new();
    bus.load(0x1000, &[0x22, 0xFF, 0xFF]); // LD (0xFFFF),HL
    let mut cpu = Z80::new();
    let mut support = cpu.test_support();
    support.set_pc(0x1000);
    support.set_hl(0x1234);

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(bus.peek(0xFFFF), 0x34);
    assert_eq!(bus.peek(0x0000), 0x12);
    assert_eq!(cpu.registers().wz, 0x0000);
}
