// Motor demo: duty cycle sweep on both channels
//
// Scans the bus, then drives M1 clockwise and M2 counter-clockwise from 10%
// to 100% duty in 10% steps, printing both encoder speeds at each step.
//
// Usage: cargo run --example motor_demo -- [bus] [address]
// Example: cargo run --example motor_demo -- /dev/i2c-1 0x10
//
// Make sure the motors can spin freely before running this.

use std::thread::sleep;
use std::time::Duration;

use dfrobot_dc_motor::config::{DEFAULT_BOARD_ADDRESS, DEFAULT_I2C_BUS};
use dfrobot_dc_motor::motor::{Direction, MotorChannel};

const PWM_FREQUENCY: u16 = 3000;
const REDUCTION_RATIO: u16 = 49; // 1:49 gearbox
const STEP_DURATION: Duration = Duration::from_secs(2);

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use dfrobot_dc_motor::motor::{LinuxI2cProvider, MotorController, scan};

    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bus = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_I2C_BUS.to_string());
    let address = match std::env::args().nth(2) {
        Some(arg) => {
            let hex = arg.trim_start_matches("0x");
            u8::from_str_radix(hex, 16)?
        }
        None => DEFAULT_BOARD_ADDRESS,
    };

    let mut provider = LinuxI2cProvider::new(&bus);

    println!("Scanning {}...", bus);
    let boards = scan(&mut provider);
    println!("Board addresses: {:02X?}", boards);
    println!();

    println!("Opening board 0x{:02X}...", address);
    let mut board = MotorController::open(&mut provider, address)?;
    println!("✓ Connected");

    board.set_pwm_frequency(PWM_FREQUENCY)?;
    for channel in MotorChannel::ALL {
        board.enable_encoder(channel)?;
        board.set_reduction_ratio(channel, REDUCTION_RATIO)?;
    }

    for step in 1..=10 {
        let duty = step as f32 * 10.0;
        board.move_motor(MotorChannel::Channel1, Direction::Clockwise, duty)?;
        board.move_motor(MotorChannel::Channel2, Direction::CounterClockwise, duty)?;
        sleep(STEP_DURATION);

        for channel in MotorChannel::ALL {
            match board.encoder_speed(channel) {
                Ok(speed) => println!("{} duty: {:.2}, encoder speed: {}", channel, duty, speed),
                Err(e) => println!("{} duty: {:.2}, encoder speed: ERROR - {}", channel, duty, e),
            }
        }
    }

    board.stop_motor(MotorChannel::Channel1)?;
    // Closing stops M2 as well
    board.close();
    println!("✓ Done");

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!(
        "motor_demo needs Linux i2c-dev ({} at 0x{:02X})",
        DEFAULT_I2C_BUS, DEFAULT_BOARD_ADDRESS
    );
}
