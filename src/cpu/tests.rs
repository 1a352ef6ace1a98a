use crate::{
    bus::Bus,
    cpu::{
        cpu::CPU,
        flags::{FLAG_BREAK, FLAG_CARRY, FLAG_NEGATIVE, FLAG_UNUSED, FLAG_ZERO},
    },
};

struct TestBus {
    mem: [u8; 65536],
    nmi: bool,
    irq: bool,
    ticked: usize,
}

impl TestBus {
    fn new() -> Self {
        Self {
            mem: [0; 65536],
            nmi: false,
            irq: false,
            ticked: 0,
        }
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize] = data;
    }

    fn tick(&mut self, cycles: usize) {
        self.ticked += cycles;
    }

    fn poll_nmi(&mut self) -> bool {
        let pending = self.nmi;
        self.nmi = false;
        pending
    }

    fn poll_irq(&mut self) -> bool {
        let pending = self.irq;
        self.irq = false;
        pending
    }

    fn service_dma(&mut self) -> usize {
        0
    }
}

fn new_cpu(bus: TestBus) -> CPU<TestBus> {
    CPU::new(bus)
}

#[test]
fn reset_loads_pc_from_reset_vector() {
    let mut bus = TestBus::new();
    bus.mem[0xFFFC] = 0x34;
    bus.mem[0xFFFD] = 0x12;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    assert_eq!(cpu.pc, 0x1234);
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn lda_immediate_loads_value() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xA9; // LDA #$42
    bus.mem[0x8001] = 0x42;

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);

    cpu.reset();
    cpu.step();

    assert_eq!(cpu.a, 0x42)
}

#[test]
fn lda_sets_zero_flag() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xA9; // LDA #$00
    bus.mem[0x8001] = 0x00;

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);

    cpu.reset();
    cpu.step();
    assert!(cpu.status & FLAG_ZERO != 0)
}

#[test]
fn lda_sets_negative_flag() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xA9; // LDA #$80
    bus.mem[0x8001] = 0x80;

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);

    cpu.reset();
    cpu.step(); // LDA

    assert!(cpu.status & FLAG_NEGATIVE != 0)
}

#[test]
fn tax_transfers_a_to_x() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xA9; // LDA #$10
    bus.mem[0x8001] = 0x10;

    bus.mem[0x8002] = 0xAA; // TAX

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // LDA
    cpu.step(); // TAX

    assert_eq!(cpu.x, 0x10)
}

#[test]
fn lda_then_sta_round_trips_through_memory() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0xA9; // LDA #$33
    bus.mem[0x8001] = 0x33;

    bus.mem[0x8002] = 0x8D; // STA $0200
    bus.mem[0x8003] = 0x00;
    bus.mem[0x8004] = 0x02;

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // LDA
    cpu.step(); // STA

    assert_eq!(cpu.bus.mem[0x0200], 0x33);
}

#[test]
fn jmp_changes_program_counter() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0x4C; // JMP $9000
    bus.mem[0x8001] = 0x00;
    bus.mem[0x8002] = 0x90;

    bus.mem[0x9000] = 0xA9; // LDA #$55
    bus.mem[0x9001] = 0x55;

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // JMP
    cpu.step(); // LDA

    assert_eq!(cpu.a, 0x55);
}

#[test]
fn inx_increments_x() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0xA2; // LDX #$01
    bus.mem[0x8001] = 0x01;
    bus.mem[0x8002] = 0xE8; // INX

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // LDX
    cpu.step(); // INX

    assert_eq!(cpu.x, 0x02);
}

#[test]
fn dex_sets_zero_flag() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0xA2; // LDX #$01
    bus.mem[0x8001] = 0x01;
    bus.mem[0x8002] = 0xCA; // DEX

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // LDX
    cpu.step(); // DEX

    assert!(cpu.status & FLAG_ZERO != 0);
}

#[test]
fn bne_loops_until_zero() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0xA2; // LDX #3
    bus.mem[0x8001] = 0x03;
    bus.mem[0x8002] = 0xCA; // DEX
    bus.mem[0x8003] = 0xD0; // BNE -3
    bus.mem[0x8004] = 0xFD; // -3 offset

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    for _ in 0..6 {
        cpu.step();
    }

    assert_eq!(cpu.x, 0x00);
}

#[test]
fn branch_crossing_a_page_costs_an_extra_cycle() {
    // BNE with an offset chosen so the branch target falls on a different page. Two otherwise
    // identical loops, differing only in whether the branch crosses a page boundary.
    let mut same_page = TestBus::new();
    same_page.mem[0x8000] = 0xA2; // LDX #1
    same_page.mem[0x8001] = 0x01;
    same_page.mem[0x8002] = 0xD0; // BNE +2 -> 0x8006, same page
    same_page.mem[0x8003] = 0x02;
    same_page.mem[0xFFFC] = 0x00;
    same_page.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(same_page);
    cpu.reset();
    cpu.step(); // LDX
    let same_page_cycles = cpu.step(); // BNE taken, same page

    let mut cross_page = TestBus::new();
    cross_page.mem[0x80FC] = 0xA2; // LDX #1
    cross_page.mem[0x80FD] = 0x01;
    cross_page.mem[0x80FE] = 0xD0; // BNE -2 -> 0x80FE, crosses from page 0x81 to 0x80
    cross_page.mem[0x80FF] = 0xFE;
    cross_page.mem[0xFFFC] = 0xFC;
    cross_page.mem[0xFFFD] = 0x80;

    let mut cpu2 = new_cpu(cross_page);
    cpu2.reset();
    cpu2.step(); // LDX
    let cross_page_cycles = cpu2.step(); // BNE taken, crosses page

    assert_eq!(same_page_cycles, 3);
    assert_eq!(cross_page_cycles, 4);
}

#[test]
fn jsr_and_rts_work() {
    let mut bus = TestBus::new();

    // main program
    bus.mem[0x8000] = 0x20; // JSR $9000
    bus.mem[0x8001] = 0x00;
    bus.mem[0x8002] = 0x90;
    bus.mem[0x8003] = 0xA9; // LDA #$11
    bus.mem[0x8004] = 0x11;

    // subroutine
    bus.mem[0x9000] = 0xA9; // LDA #$22
    bus.mem[0x9001] = 0x22;
    bus.mem[0x9002] = 0x60; // RTS

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // JSR
    cpu.step(); // LDA #$22
    cpu.step(); // RTS
    cpu.step(); // LDA #$11

    assert_eq!(cpu.a, 0x11);
}

#[test]
fn pha_pla_round_trips_the_accumulator() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xA9; // LDA #$7E
    bus.mem[0x8001] = 0x7E;
    bus.mem[0x8002] = 0x48; // PHA
    bus.mem[0x8003] = 0xA9; // LDA #$00
    bus.mem[0x8004] = 0x00;
    bus.mem[0x8005] = 0x68; // PLA

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();
    let sp_before = cpu.sp;

    cpu.step(); // LDA #$7E
    cpu.step(); // PHA
    cpu.step(); // LDA #$00
    cpu.step(); // PLA

    assert_eq!(cpu.a, 0x7E);
    assert_eq!(cpu.sp, sp_before);
}

#[test]
fn php_plp_round_trips_status_with_break_and_unused_forced() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0x38; // SEC
    bus.mem[0x8001] = 0x08; // PHP
    bus.mem[0x8002] = 0x18; // CLC
    bus.mem[0x8003] = 0x28; // PLP

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    cpu.step(); // SEC
    cpu.step(); // PHP
    let pushed = cpu.bus.read(0x0100 + cpu.sp.wrapping_add(1) as u16);
    assert!(pushed & FLAG_BREAK != 0);
    assert!(pushed & FLAG_UNUSED != 0);

    cpu.step(); // CLC
    cpu.step(); // PLP

    assert!(cpu.status & FLAG_CARRY != 0);
    assert!(cpu.status & FLAG_UNUSED != 0);
}

#[test]
fn brk_jumps_to_irq_vector() {
    let mut bus = TestBus::new();

    bus.mem[0x8000] = 0x00; // BRK

    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x90;

    let mut cpu = new_cpu(bus);
    cpu.reset();
    cpu.step();

    assert_eq!(cpu.pc, 0x9000);
}

#[test]
fn pending_nmi_is_dispatched_and_then_consumed() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xEA; // NOP, never reached
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;
    bus.mem[0xFFFA] = 0x00;
    bus.mem[0xFFFB] = 0x91;

    let mut cpu = new_cpu(bus);
    cpu.reset();
    cpu.bus.nmi = true;

    cpu.step(); // dispatches the NMI instead of executing at 0x8000
    assert_eq!(cpu.pc, 0x9100);
    assert!(!cpu.bus.nmi); // edge-consumed: the line was already cleared by poll_nmi

    let pc_before = cpu.pc;
    cpu.bus.mem[0x9100] = 0xEA; // NOP
    cpu.step();
    assert_eq!(cpu.pc, pc_before.wrapping_add(1)); // no second NMI dispatch
}

#[test]
fn every_instruction_costs_at_least_two_cycles() {
    let mut bus = TestBus::new();
    bus.mem[0x8000] = 0xEA; // NOP
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = new_cpu(bus);
    cpu.reset();

    let cycles = cpu.step();
    assert!(cycles >= 2);
}
