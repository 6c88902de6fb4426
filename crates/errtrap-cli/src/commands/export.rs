use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use console::style;
use indicatif::ProgressBar;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use errtrap_api::{MessageOverview, MessageSearch};

use crate::commands::parse_point_in_time;
use crate::config::{ApiArgs, ApiSettings, ConfigFile};

const PAGE_SIZE: u32 = 100;

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log to export messages from.
    #[arg(long)]
    pub log_id: Option<String>,

    /// Start of the date range to export, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub date_from: String,

    /// End of the date range to export, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub date_to: String,

    /// Path of the file to export to. Defaults to Export-{timestamp}.{ext}
    /// in the working directory.
    #[arg(long)]
    pub filename: Option<Utf8PathBuf>,

    /// Query to filter the exported messages by.
    #[arg(long, default_value = "*")]
    pub query: String,

    /// Include headers, cookies, etc. in the output (slower to export).
    #[arg(long)]
    pub include_headers: bool,

    /// The format to export.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

pub fn run(args: ExportArgs, config: &ConfigFile) -> Result<()> {
    if args.format == ExportFormat::Csv && args.include_headers {
        println!(
            "{}",
            style("Including headers is not supported when exporting to CSV").yellow()
        );
    }

    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;
    let from = parse_point_in_time(&args.date_from)?;
    let to = parse_point_in_time(&args.date_to)?;

    let search = |page_size: u32, search_after: Option<String>| MessageSearch {
        page_size,
        query: Some(args.query.clone()),
        from: Some(from),
        to: Some(to),
        include_headers: args.include_headers,
        search_after,
        ..MessageSearch::default()
    };

    let probe = client.search_messages(log_id, &search(1, None))?;
    let total = match probe.total {
        Some(total) if total > 0 => total,
        _ => {
            println!(
                "{}",
                style("Could not find any messages for this API key and log ID combination")
                    .yellow()
            );
            return Ok(());
        }
    };

    let filename = args
        .filename
        .clone()
        .unwrap_or_else(|| default_filename(args.format));
    if filename.exists() {
        std::fs::remove_file(&filename).with_context(|| format!("remove {filename}"))?;
    }
    let file = File::create(&filename).with_context(|| format!("create {filename}"))?;
    let mut out = BufWriter::new(file);

    let progress = ProgressBar::new(total.max(0) as u64);
    if args.format == ExportFormat::Json {
        writeln!(out, "[")?;
    } else {
        writeln!(out, "{}", csv_header())?;
    }

    let mut search_after: Option<String> = None;
    let mut first = true;
    loop {
        let page = client.search_messages(log_id, &search(PAGE_SIZE, search_after.take()))?;
        if page.messages.is_empty() {
            break;
        }
        for message in &page.messages {
            match args.format {
                ExportFormat::Json => {
                    if !first {
                        writeln!(out, ",")?;
                    }
                    first = false;
                    out.write_all(serde_json::to_string_pretty(message)?.as_bytes())?;
                }
                ExportFormat::Csv => writeln!(out, "{}", csv_row(message))?,
            }
            progress.inc(1);
        }
        search_after = page.search_after;
        if search_after.is_none() {
            break;
        }
    }

    if args.format == ExportFormat::Json {
        if !first {
            writeln!(out)?;
        }
        writeln!(out, "]")?;
    }
    out.flush().context("flush export file")?;
    progress.finish_and_clear();

    println!(
        "{}{}",
        style("Done with export to ").green(),
        style(&filename).dim()
    );
    Ok(())
}

fn default_filename(format: ExportFormat) -> Utf8PathBuf {
    let stamp = OffsetDateTime::now_utc().unix_timestamp();
    Utf8PathBuf::from(format!("Export-{stamp}.{}", format.extension()))
}

const CSV_COLUMNS: &[&str] = &[
    "Id",
    "Title",
    "TitleTemplate",
    "Application",
    "Detail",
    "Hostname",
    "Source",
    "StatusCode",
    "DateTime",
    "Type",
    "User",
    "Severity",
    "Url",
    "Method",
    "Version",
];

fn csv_header() -> String {
    CSV_COLUMNS.join(",")
}

fn csv_row(message: &MessageOverview) -> String {
    let status_code = message.status_code.map(|c| c.to_string());
    let date_time = message.date_time.and_then(|t| t.format(&Rfc3339).ok());
    let fields = [
        message.id.as_deref(),
        message.title.as_deref(),
        message.title_template.as_deref(),
        message.application.as_deref(),
        message.detail.as_deref(),
        message.hostname.as_deref(),
        message.source.as_deref(),
        status_code.as_deref(),
        date_time.as_deref(),
        message.r#type.as_deref(),
        message.user.as_deref(),
        message.severity.as_deref(),
        message.url.as_deref(),
        message.method.as_deref(),
        message.version.as_deref(),
    ];
    fields
        .iter()
        .map(|field| csv_field(field.unwrap_or("")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a field containing a comma, quote or line break, doubling any
/// embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
