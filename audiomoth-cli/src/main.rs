use anyhow::{Context, Result, bail};
use audiomoth_lib::constants::DEFAULT_POLL_INTERVAL_MS;
use audiomoth_lib::life::LifeEstimate;
use audiomoth_lib::poll::{DisplayUpdate, PollLoop};
use audiomoth_lib::profile::{HARDWARE_PROFILES, index_for_sample_rate};
use audiomoth_lib::schedule::{Schedule, TimeInterval};
use audiomoth_lib::sim::SimulatedDevice;
use audiomoth_lib::{AMError, AudioMoth, ConfigurationRequest, Transport};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Device id reported by `--simulate`
const SIMULATED_DEVICE_ID: u64 = 0x24F3_1905_5FDF_2F5B;

/// Battery code reported by `--simulate` (4.5 V)
const SIMULATED_BATTERY: u8 = 10;

#[derive(Parser, Debug)]
#[command(name = "audiomoth", version, about = "Configure and monitor an AudioMoth recorder over USB")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Talk to an in-memory simulated device instead of USB
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported sample rates and their clock settings
    Profiles {
        #[arg(long)]
        json: bool,
    },
    /// Read the device status once
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Poll the device status until interrupted
    Monitor {
        /// Delay between polls
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
        interval_ms: u64,
        #[arg(long)]
        json: bool,
    },
    /// Send a recording configuration and confirm it was applied
    Configure(ConfigureArgs),
}

#[derive(Args, Debug)]
struct ConfigureArgs {
    /// Gain level
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..=4))]
    gain: u32,

    /// Sample rate in Hz
    #[arg(long = "sample-rate", value_name = "HZ", default_value = "48000", value_parser = parse_sample_rate)]
    sample_rate_index: usize,

    /// Seconds to sleep between recordings
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(0..=65535))]
    sleep: u32,

    /// Length of each recording in seconds
    #[arg(long, default_value_t = 55, value_parser = clap::value_parser!(u32).range(1..=65535))]
    record: u32,

    /// Flash the LED while recording
    #[arg(long)]
    led: bool,

    /// Daily recording period, repeatable (at most 10)
    #[arg(long = "period", value_name = "HH:MM-HH:MM")]
    periods: Vec<TimeInterval>,

    /// Battery capacity used for the life estimate
    #[arg(long, value_name = "MAH", default_value_t = 2600.0)]
    battery_mah: f64,

    /// Build and print the packet without sending it
    #[arg(long)]
    dry_run: bool,
}

fn parse_sample_rate(value: &str) -> Result<usize, String> {
    let hz: u32 = value.parse().map_err(|_| format!("'{value}' is not a number"))?;
    index_for_sample_rate(hz).ok_or_else(|| {
        let supported: Vec<String> = HARDWARE_PROFILES.iter().map(|p| p.sample_rate_hz.to_string()).collect();
        format!("unsupported sample rate {hz}, expected one of {}", supported.join(", "))
    })
}

impl ConfigureArgs {
    fn to_request(&self) -> Result<ConfigurationRequest> {
        let mut intervals = self.periods.clone();
        intervals.sort();
        let schedule = Schedule::new(intervals);
        schedule.validate().context("invalid recording periods")?;

        Ok(ConfigurationRequest {
            time: Utc::now(),
            gain: self.gain,
            sample_rate_index: self.sample_rate_index,
            sleep_duration_s: self.sleep,
            recording_duration_s: self.record,
            led_enabled: self.led,
            schedule,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Command::Profiles { json } = cli.command {
        return print_profiles(json);
    }

    if cli.simulate {
        info!("Using simulated device");
        let sim = SimulatedDevice::new(SIMULATED_DEVICE_ID, SIMULATED_BATTERY);
        return execute(cli.command, AudioMoth::new(sim)).await;
    }

    run_usb(cli.command).await
}

#[cfg(feature = "hid")]
async fn run_usb(command: Command) -> Result<()> {
    let transport = audiomoth_lib::hid::HidTransport::new()?;
    execute(command, AudioMoth::new(transport)).await
}

#[cfg(not(feature = "hid"))]
async fn run_usb(_command: Command) -> Result<()> {
    bail!("built without USB HID support; rebuild with `--features hid` or pass --simulate")
}

async fn execute<T: Transport>(command: Command, device: AudioMoth<T>) -> Result<()> {
    match command {
        Command::Profiles { json } => print_profiles(json),
        Command::Status { json } => {
            let status = device.status().await?.ok_or(AMError::DeviceNotFound)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{status}");
            }
            Ok(())
        }
        Command::Monitor { interval_ms, json } => monitor(device, Duration::from_millis(interval_ms), json).await,
        Command::Configure(args) => configure(device, &args).await,
    }
}

fn print_profiles(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&HARDWARE_PROFILES)?);
        return Ok(());
    }
    for (index, profile) in HARDWARE_PROFILES.iter().enumerate() {
        println!("{index}: {profile}");
    }
    Ok(())
}

async fn monitor<T: Transport>(device: AudioMoth<T>, interval: Duration, json: bool) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = PollLoop::new(device).with_interval(interval).spawn(tx);

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(DisplayUpdate::Status(status)) if json => println!("{}", serde_json::to_string(&status)?),
                Some(DisplayUpdate::Status(status)) => println!("{status}"),
                Some(DisplayUpdate::Disabled) if json => println!("null"),
                Some(DisplayUpdate::Disabled) => println!("No AudioMoth connected"),
                None => break,
            },
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                info!("Interrupted");
                break;
            }
        }
    }

    handle.stop().await?;
    Ok(())
}

async fn configure<T: Transport>(device: AudioMoth<T>, args: &ConfigureArgs) -> Result<()> {
    let request = args.to_request()?;
    let packet = request.to_packet()?;
    let profile = request.profile()?;
    let estimate = LifeEstimate::for_request(&request)?;

    println!("Sample rate: {profile}");
    println!("Packet: {}", hex::encode(&packet.as_bytes()[..packet.used_len()]));
    println!("Estimate: {estimate}");
    println!(
        "Battery life: ~{:.0} days on {:.0} mAh",
        estimate.days_on_battery(args.battery_mah),
        args.battery_mah
    );

    if args.dry_run {
        return Ok(());
    }

    match device.send_packet(&packet).await {
        Ok(()) => {}
        Err(e @ AMError::ConfigurationRejected(_)) => bail!("Configuration failed. {e}"),
        Err(e) => return Err(e.into()),
    }
    println!("Configuration applied");
    Ok(())
}
