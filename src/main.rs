use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use dfrobot_dc_motor::config::{DEFAULT_BOARD_ADDRESS, DEFAULT_I2C_BUS};
use dfrobot_dc_motor::messages::{BoardStatus, EncoderReading, ScanReport};
use dfrobot_dc_motor::motor::{self, BusProvider, Direction, MotorChannel, MotorController};

// Encoder sampling period while a motor runs
const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Command line tool for the DFRobot DC motor board
#[derive(Debug, Parser)]
#[command(name = "dc-motor", version)]
struct Cli {
    /// I2C bus device
    #[arg(long, default_value = DEFAULT_I2C_BUS)]
    bus: String,

    /// Board address (decimal or 0x-prefixed hex)
    #[arg(short, long, default_value_t = DEFAULT_BOARD_ADDRESS, value_parser = parse_address)]
    address: u8,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every address answering as a DC motor board
    Scan,

    /// Print the identity of the board
    Info,

    /// Run one motor for a while, printing its encoder speed
    Run {
        #[arg(long, value_parser = parse_channel)]
        channel: MotorChannel,

        #[arg(long, value_enum)]
        direction: DirectionArg,

        /// PWM duty cycle in percent (0-100)
        #[arg(long)]
        duty: f32,

        #[arg(long, default_value_t = 2)]
        seconds: u64,

        /// PWM frequency in Hz (100-12750)
        #[arg(long)]
        pwm: Option<u16>,

        /// Encoder reduction ratio (1-2000)
        #[arg(long)]
        ratio: Option<u16>,
    },

    /// Stop one channel, or both
    Stop {
        #[arg(long, value_parser = parse_channel)]
        channel: Option<MotorChannel>,
    },

    /// Change the board address (applied after a power cycle)
    SetAddress {
        #[arg(value_parser = parse_address)]
        new_address: u8,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Cw,
    Ccw,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Cw => Direction::Clockwise,
            DirectionArg::Ccw => Direction::CounterClockwise,
        }
    }
}

fn parse_channel(s: &str) -> Result<MotorChannel, String> {
    s.parse::<u8>()
        .ok()
        .and_then(MotorChannel::from_number)
        .ok_or_else(|| format!("channel must be 1 or 2, got '{}'", s))
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    // Setup logging (set RUST_LOG=debug for every register access)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_os = "linux")]
fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut provider = motor::LinuxI2cProvider::new(&cli.bus);
    execute(cli, &mut provider)
}

#[cfg(not(target_os = "linux"))]
fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    Err(format!("{}: I2C bus access requires Linux i2c-dev", cli.bus).into())
}

fn emit<T: Serialize>(json: bool, value: &T, text: String) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn execute<P: BusProvider>(cli: &Cli, provider: &mut P) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Command::Scan => {
            let addresses = motor::scan(provider);
            let text = if addresses.is_empty() {
                format!("No board found on {}", cli.bus)
            } else {
                format!("Boards on {}: {:02X?}", cli.bus, addresses)
            };
            let report = ScanReport {
                bus: cli.bus.clone(),
                addresses,
            };
            emit(cli.json, &report, text)?;
        }

        Command::Info => {
            let mut controller = MotorController::open(provider, cli.address)?;
            let status = BoardStatus::new(controller.address(), controller.identity()?);
            let text = format!(
                "Board 0x{:02X}: pid 0x{:02X}, vid 0x{:02X}",
                status.address, status.pid, status.vid
            );
            emit(cli.json, &status, text)?;
            controller.close();
        }

        Command::Run {
            channel,
            direction,
            duty,
            seconds,
            pwm,
            ratio,
        } => {
            let channel = *channel;
            let mut controller = MotorController::open(provider, cli.address)?;
            if let Some(frequency) = pwm {
                controller.set_pwm_frequency(*frequency)?;
            }
            controller.enable_encoder(channel)?;
            if let Some(ratio) = ratio {
                controller.set_reduction_ratio(channel, *ratio)?;
            }
            controller.move_motor(channel, (*direction).into(), *duty)?;

            let deadline = Instant::now() + Duration::from_secs(*seconds);
            while Instant::now() < deadline {
                thread::sleep(SAMPLE_INTERVAL);
                let reading = EncoderReading::new(channel, controller.encoder_speed(channel)?);
                let text = format!("{} duty {:.1}% encoder speed: {}", channel, duty, reading.speed);
                emit(cli.json, &reading, text)?;
            }

            controller.stop_motor(channel)?;
            controller.close();
        }

        Command::Stop { channel } => {
            let mut controller = MotorController::open(provider, cli.address)?;
            match channel {
                Some(channel) => controller.stop_motor(*channel)?,
                None => {
                    for channel in MotorChannel::ALL {
                        controller.stop_motor(channel)?;
                    }
                }
            }
            controller.close();
        }

        Command::SetAddress { new_address } => {
            let mut controller = MotorController::open(provider, cli.address)?;
            controller.set_address(*new_address)?;
            println!(
                "Address 0x{:02X} stored, power-cycle the board to apply it",
                new_address
            );
            controller.close();
        }
    }

    Ok(())
}
