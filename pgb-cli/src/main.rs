mod config;
mod scheduler;
mod screenshot;

use crate::config::AppConfig;
use crate::scheduler::Scheduler;
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use pgb_core::EmulationState;
use std::fs;
use std::process;

#[derive(Parser)]
#[command(about = "Headless DMG emulator: runs a cartridge and saves the final frame")]
struct Cli {
    /// Cartridge image to run
    #[arg(short = 'f', long = "gb-file-path")]
    gb_file_path: String,

    /// Optional 256-byte boot image; without one, execution starts in the post-boot state
    #[arg(short = 'b', long = "boot-rom-path")]
    boot_rom_path: Option<String>,

    /// TOML config file
    #[arg(short = 'c', long = "config")]
    config_path: Option<String>,

    /// Number of frames to run
    #[arg(short = 'n', long = "frames")]
    frames: Option<u64>,

    /// Where to write the final frame as a PNG
    #[arg(short = 'o', long = "screenshot-path")]
    screenshot_path: Option<String>,

    /// Hold the hardware frame rate instead of running as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print the cartridge header as TOML and exit
    #[arg(long)]
    print_header: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(boot_rom_path) = &self.boot_rom_path {
            config.boot_rom_path = Some(boot_rom_path.clone());
        }

        if let Some(frames) = self.frames {
            config.frames = frames;
        }

        if let Some(screenshot_path) = &self.screenshot_path {
            config.screenshot_path = Some(screenshot_path.clone());
        }

        if self.realtime {
            config.realtime = true;
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    let mut config = match &args.config_path {
        Some(config_path) => AppConfig::from_toml_file(config_path)?,
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);

    let rom = fs::read(&args.gb_file_path)
        .with_context(|| format!("error reading cartridge image from '{}'", args.gb_file_path))?;
    let boot_rom = config
        .boot_rom_path
        .as_ref()
        .map(|path| {
            fs::read(path).with_context(|| format!("error reading boot image from '{path}'"))
        })
        .transpose()?;

    let mut state = EmulationState::new(rom, boot_rom.as_deref())
        .with_context(|| format!("error loading '{}'", args.gb_file_path))?;

    if args.print_header {
        let header_toml = toml::to_string_pretty(state.cartridge_header())
            .context("error serializing cartridge header into TOML")?;
        print!("{header_toml}");
        return Ok(());
    }

    let mut scheduler = Scheduler::new(config.inputs.clone(), config.realtime);
    match scheduler.run(&mut state, config.frames) {
        Ok(summary) => {
            log::info!("ran {} frames in {} cycles", summary.frames, summary.cycles);
        }
        Err(err) => {
            log::error!("emulation stopped: {err}");
            process::exit(1);
        }
    }

    if let Some(screenshot_path) = &config.screenshot_path {
        screenshot::write_png(screenshot_path, state.frame_buffer())?;
        log::info!("wrote final frame to '{screenshot_path}'");
    }

    Ok(())
}
