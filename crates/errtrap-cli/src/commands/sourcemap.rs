use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Args;
use console::style;

use errtrap_api::FileUpload;

use crate::config::{ApiArgs, ApiSettings, ConfigFile};

#[derive(Args, Debug)]
pub struct SourcemapArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log which should contain the minified JavaScript and
    /// source map.
    #[arg(long)]
    pub log_id: Option<String>,

    /// An URL to the online minified JavaScript file.
    #[arg(long)]
    pub path: String,

    /// The source map file. Only files with an extension of .map and content
    /// type of application/json will be accepted.
    #[arg(long)]
    pub source_map: Utf8PathBuf,

    /// The minified JavaScript file. Only files with an extension of .js and
    /// content type of text/javascript will be accepted.
    #[arg(long)]
    pub minified_javascript: Utf8PathBuf,
}

pub fn run(args: SourcemapArgs, config: &ConfigFile) -> Result<()> {
    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;

    if args.path.trim().is_empty() {
        println!("{}", style(format!("Unknown URL: {}", args.path)).red());
        return Ok(());
    }
    if !args.source_map.is_file() {
        println!(
            "{}",
            style(format!("SourceMap file not found: {}", args.source_map)).red()
        );
        return Ok(());
    }
    if !args.minified_javascript.is_file() {
        println!(
            "{}",
            style(format!(
                "Minified JavaScript file not found: {}",
                args.minified_javascript
            ))
            .red()
        );
        return Ok(());
    }

    let source_map = FileUpload {
        file_name: base_name(&args.source_map),
        content_type: "application/json",
        bytes: std::fs::read(&args.source_map).with_context(|| format!("read {}", args.source_map))?,
    };
    let script = FileUpload {
        file_name: base_name(&args.minified_javascript),
        content_type: "text/javascript",
        bytes: std::fs::read(&args.minified_javascript)
            .with_context(|| format!("read {}", args.minified_javascript))?,
    };
    client.upload_sourcemap(log_id, &args.path, source_map, script)?;

    println!("{}", style("SourceMap successfully uploaded").green());
    Ok(())
}

fn base_name(path: &Utf8PathBuf) -> String {
    path.file_name().unwrap_or(path.as_str()).to_owned()
}
