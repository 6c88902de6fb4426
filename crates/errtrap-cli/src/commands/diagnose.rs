use std::time::Duration;

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use console::style;
use indicatif::ProgressBar;

use errtrap_api::LiveValidator;
use errtrap_diagnose::run_diagnosis;
use errtrap_render::render_styled;

use crate::config::{ApiArgs, ApiSettings, ConfigFile};

#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Directory to diagnose.
    #[arg(long, default_value = ".")]
    pub directory: Utf8PathBuf,

    /// Output extra diagnostics while running.
    #[arg(long)]
    pub verbose: bool,

    /// Exit with code 2 when the diagnosis produced findings.
    #[arg(long)]
    pub fail_on_findings: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub fn run(args: DiagnoseArgs, config: &ConfigFile) -> Result<i32> {
    if !args.directory.is_dir() {
        println!(
            "{} {}",
            style("Unknown directory:").red(),
            style(&args.directory).dim()
        );
        return Ok(1);
    }

    let settings = ApiSettings::resolve(config, &args.api, None);
    let validator = LiveValidator {
        base_url: settings.base_url.clone(),
        proxy_host: settings.proxy_host.clone(),
        proxy_port: settings.proxy_port,
    };

    let report = if args.format == Format::Text {
        println!("Running diagnose in {}", style(&args.directory).dim());
        let spinner = ProgressBar::new_spinner().with_message("Working...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let report = run_diagnosis(&args.directory, args.verbose, &validator, &validator);
        spinner.finish_and_clear();
        report
    } else {
        run_diagnosis(&args.directory, args.verbose, &validator, &validator)
    };

    match args.format {
        Format::Text => print!("{}", render_styled(&report)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if args.fail_on_findings && report.any_error() {
        2
    } else {
        0
    })
}
