use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::Style;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use errtrap_api::{MessageOverview, MessageSearch};

use crate::config::{ApiArgs, ApiSettings, ConfigFile};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const PAGE_SIZE: u32 = 10;

#[derive(Args, Debug)]
pub struct TailArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log to tail.
    #[arg(long)]
    pub log_id: Option<String>,
}

pub fn run(args: TailArgs, config: &ConfigFile) -> Result<()> {
    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;

    let mut from = OffsetDateTime::now_utc();
    let mut previous: Vec<String> = Vec::new();
    loop {
        thread::sleep(POLL_INTERVAL);
        let now = OffsetDateTime::now_utc();
        // Windows overlap by five seconds so a message indexed late still
        // shows up; the previous ids filter the overlap out again.
        let window_start = from - POLL_INTERVAL;
        let window = |page_index: u32, page_size: u32| MessageSearch {
            page_index,
            page_size,
            query: Some("*".to_owned()),
            from: Some(window_start),
            to: Some(now),
            ..MessageSearch::default()
        };

        let probe = client.search_messages(log_id, &window(0, 0))?;
        let total = match probe.total {
            Some(total) if total > 0 => total,
            _ => {
                from = now;
                previous.clear();
                continue;
            }
        };

        let mut fresh: Vec<MessageOverview> = Vec::new();
        let mut seen = 0_i64;
        while seen < total {
            let page =
                client.search_messages(log_id, &window((seen / i64::from(PAGE_SIZE)) as u32, PAGE_SIZE))?;
            if page.messages.is_empty() {
                break;
            }
            seen += page.messages.len() as i64;
            fresh.extend(
                page.messages
                    .into_iter()
                    .filter(|m| m.id.as_ref().is_none_or(|id| !previous.contains(id))),
            );
        }

        previous.clear();
        fresh.sort_by_key(|m| m.date_time);
        for message in fresh {
            let line = format_line(&message);
            println!("{}", severity_style(message.severity.as_deref()).apply_to(line));
            if let Some(id) = message.id {
                previous.push(id);
            }
        }
        from = now;
    }
}

fn format_line(message: &MessageOverview) -> String {
    let time = message
        .date_time
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_default();
    format!(
        "{time}|{}|{}",
        message.severity.as_deref().unwrap_or(""),
        message.title.as_deref().unwrap_or("")
    )
}

fn severity_style(severity: Option<&str>) -> Style {
    match severity {
        Some("Verbose") | Some("Debug") => Style::new().dim(),
        Some("Information") => Style::new().green(),
        Some("Warning") => Style::new().yellow(),
        Some("Error") => Style::new().red(),
        Some("Fatal") => Style::new().red().bold(),
        _ => Style::new(),
    }
}
