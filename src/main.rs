//! Coop door controller: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter     SystemClock   FileStateStore  LogSink   │
//! │  (Gpio+LightSensor)  (ClockPort)   (+StdinPrompt)  (Events)  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            DoorService (control logic)                 │  │
//! │  │  FSM · ScheduleWindow · ReadingWindow · Stepper        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  ShutdownSignal ◀── Ctrl-C / SIGTERM                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;

use coopdoor::adapters::hardware::HardwareAdapter;
use coopdoor::adapters::log_sink::LogEventSink;
use coopdoor::adapters::prompt::StdinPrompt;
use coopdoor::adapters::state_file::FileStateStore;
use coopdoor::adapters::time::SystemClock;
use coopdoor::app::commands::{CommandOutcome, DoorCommand};
use coopdoor::app::ports::{GpioPort, LightSensorPort, StateStorePort};
use coopdoor::app::service::DoorService;
use coopdoor::cli::{Cli, Command};
use coopdoor::config::CoopConfig;
use coopdoor::door::Action;
use coopdoor::drivers::gpio::GpioBank;
use coopdoor::error::Error;
use coopdoor::sensors::photocell::Photocell;
use coopdoor::shutdown::ShutdownSignal;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("coopdoor v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let config = cli.into_config().context("invalid configuration")?;

    // ── 2. Shutdown path ──────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.trigger()).context("installing signal handler")?;
    }

    // ── 3. Adapters ───────────────────────────────────────────
    let gpio = GpioBank::new().context("opening GPIO")?;
    let photocell = Photocell::new(&config.sensor, shutdown.clone());
    let mut hw = HardwareAdapter::new(gpio, photocell);
    let mut clock = SystemClock::new(shutdown.clone());
    let mut store = FileStateStore::new(&config.state_log, StdinPrompt::new());
    let mut sink = LogEventSink::new();

    // ── 4. Run ────────────────────────────────────────────────
    let result = run(cli.command(), &config, &mut hw, &mut clock, &mut store, &mut sink);
    hw.release_all();

    match result {
        Ok(()) | Err(Error::Interrupted) => {
            info!("coopdoor exiting");
            Ok(())
        }
        Err(e) => Err(e).context("controller stopped"),
    }
}

fn run(
    command: Command,
    config: &CoopConfig,
    hw: &mut HardwareAdapter,
    clock: &mut SystemClock,
    store: &mut FileStateStore<StdinPrompt>,
    sink: &mut LogEventSink,
) -> Result<(), Error> {
    if command == Command::Measure {
        let seconds = hw.take_reading(config.sensor.reading_samples)?;
        println!("{seconds:.6}");
        return Ok(());
    }

    let door = store.load()?;
    info!("Door is {} (since {})", door.state, door.timestamp);
    let mut service = DoorService::new(config, door);
    service.start(hw, clock, sink)?;

    match command {
        Command::Door { action } => {
            let action = Action::from(action);
            match service.handle_command(DoorCommand::Actuate(action), hw, clock, store, sink)? {
                CommandOutcome::AlreadyThere(_) => println!("Door already {}", action.past_tense()),
                CommandOutcome::Moved(_) => println!("Door {}", action.past_tense()),
            }
            Ok(())
        }
        Command::Run | Command::Measure => service.run(hw, clock, store, sink),
    }
}
