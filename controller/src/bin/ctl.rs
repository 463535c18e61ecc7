//! Command-line control for the shared camera directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use camera_dir::{ControlFlag, MediaKind};
use fakecam_controller_lib::{ControlFacade, ImportOutcome};

#[derive(Parser)]
#[command(name = "fakecam-ctl", version, about = "Control the virtual camera hook module")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the directory state as JSON
    Status,
    /// Place a .mp4 or .bmp file into its media slot
    SetMedia { path: String },
    /// Validate and import a file as the given kind
    Import {
        kind: KindArg,
        path: PathBuf,
        /// Declared mime type, checked against the kind
        #[arg(long)]
        mime: Option<String>,
    },
    /// Remove both media slots
    Clear,
    Enable,
    Disable,
    /// Set the output resolution
    Resolution {
        #[arg(allow_hyphen_values = true)]
        width: i64,
        #[arg(allow_hyphen_values = true)]
        height: i64,
    },
    /// Touch the settings file so the hook module reloads it
    Refresh,
    /// Set, clear or toggle a control flag
    Flag { flag: FlagArg, state: FlagState },
    /// Print settings.conf as JSON
    Settings,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Video,
    Image,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Video => MediaKind::Video,
            KindArg::Image => MediaKind::Image,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FlagArg {
    Disabled,
    NoToast,
    PrivateDir,
}

impl From<FlagArg> for ControlFlag {
    fn from(flag: FlagArg) -> Self {
        match flag {
            FlagArg::Disabled => ControlFlag::Disabled,
            FlagArg::NoToast => ControlFlag::NoToast,
            FlagArg::PrivateDir => ControlFlag::PrivateDir,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FlagState {
    On,
    Off,
    Toggle,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (_config, facade) = fakecam_controller_lib::init_foundation()?;

    let ok = run(&facade, cli.command)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run(facade: &ControlFacade, command: Command) -> anyhow::Result<bool> {
    let ok = match command {
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&facade.status())?);
            true
        }
        Command::SetMedia { path } => {
            let ok = facade.set_media_path(&path);
            if ok {
                println!("{}", facade.get_current_media_path());
            }
            ok
        }
        Command::Import { kind, path, mime } => {
            let outcome = facade.import_media(kind.into(), mime.as_deref(), &path);
            match &outcome {
                ImportOutcome::Placed { path, .. } => println!("{}", path.display()),
                other => eprintln!("{}", other.reason().unwrap_or_default()),
            }
            outcome.is_placed()
        }
        Command::Clear => facade.clear_media(),
        Command::Enable => facade.set_enabled(true),
        Command::Disable => facade.set_enabled(false),
        Command::Resolution { width, height } => facade.set_resolution(width, height),
        Command::Refresh => facade.refresh(),
        Command::Flag { flag, state } => {
            let flag = ControlFlag::from(flag);
            match state {
                FlagState::On => facade.set_flag(flag, true),
                FlagState::Off => facade.set_flag(flag, false),
                FlagState::Toggle => match facade.toggle_flag(flag) {
                    Some(present) => {
                        println!("{flag}: {}", if present { "on" } else { "off" });
                        true
                    }
                    None => false,
                },
            }
        }
        Command::Settings => {
            let settings: std::collections::BTreeMap<_, _> = facade.load_settings().into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&settings)?);
            true
        }
    };
    Ok(ok)
}
