pub mod process;
pub mod report;
pub mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use process::{kill_previous_servers, restart_server};
use report::{process_report_command, ReportCommand};
use settings::{process_settings_command, SettingsCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::start_daemon,
    utils::{
        dir::{resolve_application_dir, LOGS_DIR},
        logging::{enable_logging, CLI_PREFIX, TRACKER_PREFIX},
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "activity-tracker", version, long_about = None)]
#[command(about = "Tracks running applications, logs activity and reminds you to take breaks", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Track activity in the current console until Ctrl-C")]
    Serve {},
    #[command(about = "Restart tracking in the background")]
    Init {},
    #[command(about = "Stop background tracking")]
    Stop {},
    #[command(flatten)]
    Report(ReportCommand),
    #[command(about = "Show or change settings")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();
    let dir = resolve_application_dir(args.dir)?;

    let logging_level = args.log.then_some(LevelFilter::DEBUG);
    let prefix = match args.commands {
        Commands::Serve {} => TRACKER_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &dir.join(LOGS_DIR), logging_level, args.log)?;

    match args.commands {
        Commands::Serve {} => single_thread_runtime()?.block_on(start_daemon(&dir)),
        Commands::Init {} => restart_server(&dir),
        Commands::Stop {} => {
            let stopped = kill_previous_servers(&std::env::current_exe()?)?;
            println!("Stopped {stopped} tracker(s)");
            Ok(())
        }
        Commands::Report(command) => {
            single_thread_runtime()?.block_on(process_report_command(command, &dir))
        }
        Commands::Settings { command } => {
            single_thread_runtime()?.block_on(process_settings_command(command, &dir))
        }
    }
}
