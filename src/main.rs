//! hyprdvd - bounce Hyprland windows like the DVD logo

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;

use hyprdvd::platform::Hyprland;
use hyprdvd::settings::parse_workspaces;
use hyprdvd::{ExitMode, Settings, daemon, screensaver};

#[derive(Parser, Debug)]
#[command(version, about = "Bounce Hyprland windows around the screen")]
struct Args {
    /// Animate every window on the visible workspaces until the pointer moves
    #[arg(short, long)]
    screensaver: bool,

    /// Window size as WIDTHxHEIGHT: ratios of the monitor (<= 1) or pixels
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    size: Option<String>,

    /// Comma-separated workspace ids for the screensaver
    #[arg(long, value_name = "1,2,3")]
    workspaces: Option<String>,

    /// What ends the screensaver
    #[arg(long, value_enum)]
    exit_on: Option<ExitMode>,

    /// Window title that opts a window in
    #[arg(long)]
    title: Option<String>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file (defaults to $XDG_CONFIG_HOME/hyprdvd/settings.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(size) = &self.size {
            settings.size = Some(size.clone());
        }
        if let Some(list) = &self.workspaces {
            settings.workspaces = parse_workspaces(list);
        }
        if let Some(mode) = self.exit_on {
            settings.exit_on = mode;
        }
        if let Some(title) = &self.title {
            settings.title = title.clone();
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref());
    args.apply(&mut settings);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)).context("installing the signal handler")?;
    }

    let wm = Hyprland::from_env().context("is Hyprland running?")?;
    if args.screensaver {
        log::info!("hyprdvd screensaver (exit on {})", settings.exit_on.as_str());
        screensaver::run(&wm, &settings, stop)?;
    } else {
        log::info!("hyprdvd daemon starting");
        daemon::run(&wm, &settings, stop)?;
    }
    Ok(())
}
