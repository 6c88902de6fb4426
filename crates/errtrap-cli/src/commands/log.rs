use anyhow::Result;
use clap::Args;
use console::style;
use time::OffsetDateTime;

use errtrap_api::CreateMessage;

use crate::commands::parse_point_in_time;
use crate::config::{ApiArgs, ApiSettings, ConfigFile};

const SEARCH_URL: &str = "https://app.errtrap.io/errorlog/search";

#[derive(Args, Debug)]
pub struct LogArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log to send the message to.
    #[arg(long)]
    pub log_id: Option<String>,

    /// The textual title or headline of the message to log.
    #[arg(long)]
    pub title: String,

    /// Used to identify which application logged this message.
    #[arg(long)]
    pub application: Option<String>,

    /// A longer description of the message, like a stacktrace for errors.
    #[arg(long)]
    pub detail: Option<String>,

    /// The hostname of the server logging the message.
    #[arg(long)]
    pub hostname: Option<String>,

    /// The title template of the message, for structured logging titles.
    #[arg(long)]
    pub title_template: Option<String>,

    /// The source of the code logging the message, like an assembly name.
    #[arg(long)]
    pub source: Option<String>,

    /// HTTP status code related to the message, if any.
    #[arg(long)]
    pub status_code: Option<i32>,

    /// Date and time of the message, RFC 3339 or YYYY-MM-DD. Defaults to now.
    #[arg(long)]
    pub date_time: Option<String>,

    /// The type of message, like the exception type of an error.
    #[arg(long = "type")]
    pub r#type: Option<String>,

    /// An identification of the user triggering this message.
    #[arg(long)]
    pub user: Option<String>,

    /// Severity: Verbose, Debug, Information, Warning, Error or Fatal.
    #[arg(long)]
    pub severity: Option<String>,

    /// URL of the HTTP request the message relates to, if any.
    #[arg(long)]
    pub url: Option<String>,

    /// HTTP method of the request the message relates to, if any.
    #[arg(long)]
    pub method: Option<String>,

    /// Version of the software logging the message.
    #[arg(long)]
    pub version: Option<String>,
}

pub fn run(args: LogArgs, config: &ConfigFile) -> Result<()> {
    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;

    let date_time = match args.date_time.as_deref() {
        Some(value) => parse_point_in_time(value)?,
        None => OffsetDateTime::now_utc(),
    };
    let message = CreateMessage {
        title: args.title,
        title_template: args.title_template,
        application: args.application,
        detail: args.detail,
        hostname: args.hostname,
        source: args.source,
        status_code: args.status_code,
        date_time: Some(date_time),
        r#type: args.r#type,
        user: args.user,
        severity: args.severity,
        url: args.url,
        method: args.method,
        version: args.version,
        ..CreateMessage::default()
    };

    match client.create_message(log_id, &message)? {
        Some(id) => println!(
            "{}",
            style(format!(
                "Message successfully logged to {SEARCH_URL}?logId={log_id}&hidden=true&expand=true&filters=id:%22{id}%22#searchTab"
            ))
            .green()
        ),
        None => println!("{}", style("Message not logged").red()),
    }
    Ok(())
}
