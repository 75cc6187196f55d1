use cartdump::addr::{RomAddress, RomRange};
use cartdump::bus::{CartBus, LineBankSelector, PinMap, SingleBank, Timing};
use cartdump::dump::{BinarySink, DumpRecord, TextSink, write_records};
use cartdump::error::DumpError;
use cartdump::gpio::{GpioEvent, Level, MockGpio, PinMode, SimCartridge};

//===========================================================================//

fn open_mock(bus_base: u32) -> CartBus<MockGpio> {
    CartBus::open(
        MockGpio::new(),
        PinMap::new(bus_base),
        Timing::default(),
        Box::new(SingleBank),
    )
    .unwrap()
}

fn open_sim(rom: &[u8]) -> CartBus<SimCartridge> {
    let pins = PinMap::default();
    let cart = SimCartridge::new(rom.to_vec().into_boxed_slice(), pins);
    CartBus::open(cart, pins, Timing::default(), Box::new(LineBankSelector))
        .unwrap()
}

fn expected_word(rom: &[u8], address: u32) -> u16 {
    let index = address as usize;
    u16::from_be_bytes([rom[index % rom.len()], rom[(index + 1) % rom.len()]])
}

fn assert_idle(pins: PinMap, gpio: &MockGpio) {
    for pin in pins.bus_lines() {
        assert_eq!(gpio.mode(pin), Some(PinMode::Output));
    }
    assert_eq!(gpio.level(pins.read_strobe()), Some(Level::High));
    assert_eq!(gpio.level(pins.write_strobe()), Some(Level::High));
    assert_eq!(gpio.level(pins.latch_low()), Some(Level::Low));
    assert_eq!(gpio.level(pins.latch_high()), Some(Level::Low));
}

//===========================================================================//

#[test]
fn alternating_lines_dump_as_aaaa() {
    let mut bus = open_mock(2);
    let records: Vec<DumpRecord> = bus
        .dump(RomRange::new(0, 0x10))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 8);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.address.as_u32(), 2 * index as u32);
        assert_eq!(record.word, 0xAAAA);
    }
    assert_eq!(records[7].to_string(), "0x00000E: 0xAAAA");
    assert_idle(bus.pins(), bus.gpio());
}

#[test]
fn addresses_increase_by_one_word() {
    let mut bus = open_mock(2);
    let start = 0xFFF0;
    let addresses: Vec<u32> = bus
        .dump(RomRange::new(start, start + 0x20))
        .unwrap()
        .map(|record| record.unwrap().address.as_u32())
        .collect();
    let expected: Vec<u32> = (start..start + 0x20).step_by(2).collect();
    assert_eq!(addresses, expected);
}

#[test]
fn each_cycle_drives_both_address_halves() {
    let pins = PinMap::default();
    let mut bus = open_mock(pins.bus_base());
    let range = RomRange::new(0x123450, 0x123460);
    let count = bus.dump(range).unwrap().count();
    assert_eq!(count, 8);
    let events = bus.gpio().events().to_vec();
    // Replay the bus lines and capture their value on each latch pulse.
    let mut lines = [Level::Low; 16];
    let mut captured = Vec::new();
    for event in events {
        if let GpioEvent::Write(pin, level) = event {
            if let Some(bit) = pin.checked_sub(pins.bus_base())
                && bit < PinMap::BUS_WIDTH
            {
                lines[bit as usize] = level;
            } else if (pin == pins.latch_low() || pin == pins.latch_high())
                && level == Level::High
            {
                let width = if pin == pins.latch_low() { 16 } else { 8 };
                let value = (0..width).fold(0u32, |value, bit| {
                    value | (u32::from(lines[bit].is_high()) << bit)
                });
                captured.push(value);
            }
        }
    }
    let recomposed: Vec<u32> =
        captured.chunks(2).map(|pair| (pair[1] << 16) | pair[0]).collect();
    let expected: Vec<u32> = (0x123450..0x123460).step_by(2).collect();
    assert_eq!(recomposed, expected);
}

#[test]
fn dumping_twice_gives_the_same_image() {
    let rom: Vec<u8> = (0..0x40u8).map(|byte| byte.wrapping_mul(37)).collect();
    let mut bus = open_sim(&rom);
    let mut first = TextSink::new(Vec::new());
    let records = bus.dump(RomRange::new(0, 0x40)).unwrap();
    assert_eq!(write_records(records, &mut first).unwrap(), 0x20);
    bus.reset().unwrap();
    let mut second = TextSink::new(Vec::new());
    let records = bus.dump(RomRange::new(0, 0x40)).unwrap();
    assert_eq!(write_records(records, &mut second).unwrap(), 0x20);
    assert_eq!(first.into_inner(), second.into_inner());
}

#[test]
fn simulated_cartridge_image_matches_rom() {
    let rom: Vec<u8> = (0..0x100u32).map(|n| (n ^ 0x5a) as u8).collect();
    let mut bus = open_sim(&rom);
    let mut sink = BinarySink::new(Vec::new());
    let records = bus.dump(RomRange::new(0, 0x100)).unwrap();
    assert_eq!(write_records(records, &mut sink).unwrap(), 0x80);
    assert_eq!(sink.into_inner(), rom);
    let cart = bus.close();
    assert_eq!(cart.read_cycles(), 0x80);
    assert_eq!(cart.bus_conflicts(), 0);
}

#[test]
fn dump_crosses_bank_boundary() {
    // A ROM length that is not a power of two makes every address bit,
    // including the bank, show up in the mirrored word.
    let rom = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
    let mut bus = open_sim(&rom);
    let range = RomRange::new(0xFFFFF8, 0x1000008);
    for record in bus.dump(range).unwrap() {
        let record = record.unwrap();
        let address = record.address.as_u32();
        assert_eq!(record.word, expected_word(&rom, address), "{address:#x}");
    }
    assert_eq!(
        bus.gpio().latched_address(),
        RomAddress::try_from(0x1000006u32).unwrap()
    );
    assert_eq!(bus.selected_bank().map(|bank| bank.index()), Some(1));
    assert_eq!(bus.gpio().bus_conflicts(), 0);
}

#[test]
fn peek_reads_one_word() {
    let rom = [0xde, 0xad, 0xbe, 0xef];
    let mut bus = open_sim(&rom);
    let address = RomAddress::try_from(0x3000002u32).unwrap();
    assert_eq!(bus.read_word_at(address).unwrap(), 0xbeef);
    assert_eq!(bus.gpio().latched_address(), address);
}

#[test]
fn unaligned_peek_is_rejected() {
    let mut bus = open_sim(&[0x9d, 0x83, 0x12, 0x34]);
    let result = bus.read_word_at(RomAddress::try_from(3u32).unwrap());
    assert!(matches!(
        result,
        Err(DumpError::UnalignedAddress { address: 3 })
    ));
    assert_eq!(bus.gpio().read_cycles(), 0);
}

#[test]
fn reversed_range_touches_nothing() {
    let mut bus = open_mock(2);
    bus.gpio_mut().clear_events();
    let result = bus.dump(RomRange::new(0x1000002, 0x1000000));
    assert!(matches!(
        result.err(),
        Some(DumpError::InvalidRange { start: 0x1000002, end: 0x1000000 })
    ));
    assert!(bus.gpio().events().is_empty());
}

#[test]
fn out_of_range_dump_touches_nothing() {
    let mut bus = open_mock(2);
    bus.gpio_mut().clear_events();
    let result = bus.dump(RomRange::new(0x3FFFFF0, 0x4000010));
    assert!(matches!(
        result.err(),
        Some(DumpError::AddressOutOfRange { address: 0x4000000 })
    ));
    assert!(bus.gpio().events().is_empty());
}

#[test]
fn driver_failure_is_reported() {
    let result = CartBus::open(
        MockGpio::new().fail_initialize(),
        PinMap::default(),
        Timing::default(),
        Box::new(SingleBank),
    );
    let Err(err) = result else { panic!("open should fail") };
    assert!(matches!(err, DumpError::DriverInit(_)));
}

#[test]
fn failed_read_leaves_bus_idle() {
    let pins = PinMap::default();
    let gpio = MockGpio::new().fail_reads_from(pins.bus_line(9));
    let mut bus =
        CartBus::open(gpio, pins, Timing::default(), Box::new(SingleBank))
            .unwrap();
    let mut sink = TextSink::new(Vec::new());
    let records = bus.dump(RomRange::new(0, 0x10)).unwrap();
    let result = write_records(records, &mut sink);
    assert!(matches!(result, Err(DumpError::Io(_))));
    assert!(sink.into_inner().is_empty());
    assert_idle(pins, bus.gpio());
}

//===========================================================================//
