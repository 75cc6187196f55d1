use cartdump::addr::{RomAddress, RomRange};
use cartdump::bus::{
    BankSelector, CartBus, LineBankSelector, PinMap, SingleBank, Timing,
};
use cartdump::dump::{
    BinarySink, DumpRecord, RecordSink, TextSink, write_records,
};
use cartdump::error::DumpError;
use cartdump::gpio::{Gpio, SimCartridge};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    /// Log progress at debug level (overridden by RUST_LOG).
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dumps a range of cartridge ROM.
    Dump {
        /// The first address to dump.
        #[clap(long, default_value = "0", value_parser = parse_address)]
        start: u32,
        /// The address one past the last to dump [default: end of the
        /// start address's bank].
        #[clap(long, value_parser = parse_address, conflicts_with = "banks")]
        end: Option<u32>,
        /// Dump this many whole banks, starting from address 0.
        #[clap(long, conflicts_with = "start")]
        banks: Option<u8>,
        /// Where to write the dump, or `-` for stdout.
        #[clap(short, long, default_value = "-")]
        output: PathBuf,
        /// The output format.
        #[clap(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[clap(flatten)]
        bus: BusArgs,
    },
    /// Reads and prints the single word at an address.
    Peek {
        /// The address to read.
        #[clap(value_parser = parse_address)]
        address: u32,
        #[clap(flatten)]
        bus: BusArgs,
    },
}

#[derive(Args)]
struct BusArgs {
    /// The GPIO driver to use.
    #[clap(long, value_enum, default_value_t = Backend::Sim)]
    backend: Backend,
    /// The ROM image to serve from the simulated cartridge (required with
    /// `--backend sim`).
    #[clap(long)]
    rom: Option<PathBuf>,
    /// The GPIO number of bus line AD0.
    #[clap(long, default_value_t = PinMap::DEFAULT_BUS_BASE)]
    bus_base: u32,
    /// How banks beyond the first are selected.
    #[clap(long, value_enum, default_value_t = BankSelect::None)]
    bank_select: BankSelect,
    /// Latch pulse width, in microseconds.
    #[clap(long, default_value_t = Timing::default().latch_pulse_us)]
    latch_pulse_us: u32,
    /// Delay between asserting the read strobe and sampling, in
    /// microseconds.
    #[clap(long, default_value_t = Timing::default().read_settle_us)]
    read_settle_us: u32,
    /// Delay after configuring the pins, in microseconds.
    #[clap(long, default_value_t = Timing::default().init_settle_us)]
    init_settle_us: u32,
    /// Reset pulse width, in microseconds.
    #[clap(long, default_value_t = Timing::default().reset_pulse_us)]
    reset_pulse_us: u32,
    /// Fail if any single delay takes longer than this, in microseconds.
    #[clap(long, default_value_t = Timing::default().settle_timeout_us)]
    settle_timeout_us: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// A simulated cartridge serving a ROM image.
    Sim,
    /// Raspberry Pi GPIO.
    Rpi,
}

#[derive(Clone, Copy, ValueEnum)]
enum BankSelect {
    /// Only the first 16 MB bank is reachable.
    None,
    /// Bank index on the two lines after the reset line.
    Lines,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// One `0xAAAAAA: 0xWWWW` line per word.
    Text,
    /// Raw big-endian ROM image.
    Binary,
}

//===========================================================================//

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .init();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cartdump: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Dump { start, end, banks, output, format, bus } => {
            let range = plan_range(start, end, banks);
            range.check().map_err(DumpError::from)?;
            let mut cart = open_bus(&bus)?;
            let result = dump_to(&mut cart, range, &output, format);
            cart.close();
            let count = result?;
            info!("wrote {count} words to {}", output.display());
        }
        Command::Peek { address, bus } => {
            let address = RomAddress::try_from(address)
                .map_err(|()| DumpError::AddressOutOfRange { address })?;
            let mut cart = open_bus(&bus)?;
            let result = cart.read_word_at(address);
            cart.close();
            let word = result?;
            println!("{}", DumpRecord { address, word });
        }
    }
    Ok(())
}

fn plan_range(start: u32, end: Option<u32>, banks: Option<u8>) -> RomRange {
    match (banks, end) {
        (Some(count), _) => RomRange::for_banks(count),
        (None, Some(end)) => RomRange::new(start, end),
        (None, None) => RomRange::to_bank_end(start),
    }
}

// The output is only created once the range has been accepted by the bus.
fn dump_to(
    cart: &mut CartBus<Box<dyn Gpio>>,
    range: RomRange,
    output: &Path,
    format: Format,
) -> Result<u64, Box<dyn Error>> {
    let records = cart.dump(range)?;
    let writer: Box<dyn io::Write> = if output.as_os_str() == "-" {
        Box::new(io::stdout().lock())
    } else {
        Box::new(io::BufWriter::new(File::create(output)?))
    };
    let mut sink: Box<dyn RecordSink> = match format {
        Format::Text => Box::new(TextSink::new(writer)),
        Format::Binary => Box::new(BinarySink::new(writer)),
    };
    Ok(write_records(records, &mut *sink)?)
}

fn open_bus(args: &BusArgs) -> Result<CartBus<Box<dyn Gpio>>, Box<dyn Error>> {
    let pins = PinMap::new(args.bus_base);
    let timing = Timing {
        latch_pulse_us: args.latch_pulse_us,
        read_settle_us: args.read_settle_us,
        init_settle_us: args.init_settle_us,
        reset_pulse_us: args.reset_pulse_us,
        settle_timeout_us: args.settle_timeout_us,
    };
    let gpio: Box<dyn Gpio> = match args.backend {
        Backend::Sim => {
            let path = args
                .rom
                .as_ref()
                .ok_or("--rom is required with --backend sim")?;
            let rom = fs::read(path)?;
            if rom.is_empty() {
                return Err(format!("{} is empty", path.display()).into());
            }
            Box::new(SimCartridge::new(rom.into_boxed_slice(), pins))
        }
        Backend::Rpi => rpi_gpio()?,
    };
    let selector: Box<dyn BankSelector> = match args.bank_select {
        BankSelect::None => Box::new(SingleBank),
        BankSelect::Lines => Box::new(LineBankSelector),
    };
    Ok(CartBus::open(gpio, pins, timing, selector)?)
}

#[cfg(feature = "rpi")]
fn rpi_gpio() -> Result<Box<dyn Gpio>, Box<dyn Error>> {
    Ok(Box::new(cartdump::gpio::RpiGpio::new()))
}

#[cfg(not(feature = "rpi"))]
fn rpi_gpio() -> Result<Box<dyn Gpio>, Box<dyn Error>> {
    Err("this build has no Raspberry Pi support (enable the `rpi` feature)"
        .into())
}

fn parse_address(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or(text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse::<u32>(),
    };
    parsed.map_err(|err| format!("invalid address {text:?}: {err}"))
}

//===========================================================================//


//===========================================================================//
