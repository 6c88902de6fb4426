use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use console::style;
use indicatif::ProgressBar;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use errtrap_api::{Client, CreateMessage, Item};

use crate::commands::parse_point_in_time;
use crate::config::{ApiArgs, ApiSettings, ConfigFile};

const BATCH: usize = 50;

const W3C_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log to import messages to.
    #[arg(long)]
    pub log_id: Option<String>,

    /// The type of log file to import. Use 'w3c' for W3C Extended Log File
    /// Format and 'iis' for IIS Log File Format.
    #[arg(long = "type", value_enum)]
    pub r#type: LogFileType,

    /// Path of the file to import from.
    #[arg(long)]
    pub filename: Utf8PathBuf,

    /// Only import lines logged after this date, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub date_from: Option<String>,

    /// Only import lines logged before this date, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub date_to: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFileType {
    W3c,
    Iis,
}

pub fn run(args: ImportArgs, config: &ConfigFile) -> Result<()> {
    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;

    if !args.filename.is_file() {
        println!(
            "{}",
            style(format!("Input file not found: {}", args.filename)).red()
        );
        return Ok(());
    }
    let from = args.date_from.as_deref().map(parse_point_in_time).transpose()?;
    let to = args.date_to.as_deref().map(parse_point_in_time).transpose()?;

    let spinner = ProgressBar::new_spinner().with_message("Importing...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let input =
        std::fs::read_to_string(&args.filename).with_context(|| format!("read {}", args.filename))?;
    let imported = match args.r#type {
        LogFileType::W3c => import_w3c(&client, log_id, &input, from, to)?,
        LogFileType::Iis => import_iis(&client, log_id, &input, from, to)?,
    };
    spinner.finish_and_clear();

    println!("{}", style(format!("Imported {imported} messages")).green());
    Ok(())
}

fn import_w3c(
    client: &Client,
    log_id: &str,
    input: &str,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
) -> Result<usize> {
    let mut batch = Vec::new();
    let mut sent = 0;
    for record in parse_w3c(input) {
        let Some(date_time) = record.timestamp() else {
            continue;
        };
        if !within(date_time, from, to) {
            continue;
        }
        batch.push(w3c_message(&record, date_time));
        if batch.len() >= BATCH {
            sent += flush(client, log_id, &mut batch)?;
        }
    }
    sent += flush(client, log_id, &mut batch)?;
    Ok(sent)
}

fn import_iis(
    client: &Client,
    log_id: &str,
    input: &str,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
) -> Result<usize> {
    let mut batch = Vec::new();
    let mut sent = 0;
    for line in input.lines() {
        let Some(message) = iis_message(line, from, to) else {
            continue;
        };
        batch.push(message);
        if batch.len() >= BATCH {
            sent += flush(client, log_id, &mut batch)?;
        }
    }
    sent += flush(client, log_id, &mut batch)?;
    Ok(sent)
}

fn flush(client: &Client, log_id: &str, batch: &mut Vec<CreateMessage>) -> Result<usize> {
    if batch.is_empty() {
        return Ok(0);
    }
    client
        .create_messages(log_id, batch)
        .context("upload message batch")?;
    let sent = batch.len();
    batch.clear();
    Ok(sent)
}

fn within(ts: OffsetDateTime, from: Option<OffsetDateTime>, to: Option<OffsetDateTime>) -> bool {
    from.is_none_or(|from| ts > from) && to.is_none_or(|to| ts < to)
}

/// Treats empty cells and the `-` placeholder both log formats use as
/// missing.
fn cell(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        None
    } else {
        Some(value)
    }
}

/// One data line of a W3C extended log, keyed by the names from the last
/// `#Fields:` directive.
#[derive(Debug, Default)]
struct W3cRecord {
    values: BTreeMap<String, String>,
}

impl W3cRecord {
    fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str).and_then(cell)
    }

    fn timestamp(&self) -> Option<OffsetDateTime> {
        let date = self.get("date")?;
        let time = self.get("time")?;
        // Some servers log fractional seconds; the service does not need them.
        let time = time.split('.').next().unwrap_or(time);
        PrimitiveDateTime::parse(&format!("{date} {time}"), W3C_TIMESTAMP)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    }
}

fn parse_w3c(input: &str) -> Vec<W3cRecord> {
    let mut fields: Vec<String> = Vec::new();
    let mut records = Vec::new();
    for line in input.lines() {
        if let Some(rest) = line.strip_prefix("#Fields:") {
            fields = rest.split_whitespace().map(str::to_owned).collect();
        } else if line.starts_with('#') || line.trim().is_empty() {
            continue;
        } else if !fields.is_empty() {
            let values = line.split_whitespace().map(str::to_owned);
            records.push(W3cRecord {
                values: fields.iter().cloned().zip(values).collect(),
            });
        }
    }
    records
}

fn w3c_message(record: &W3cRecord, date_time: OffsetDateTime) -> CreateMessage {
    let mut message = CreateMessage {
        date_time: Some(date_time),
        ..CreateMessage::default()
    };
    let mut parts: Vec<String> = Vec::new();

    if let Some(client_ip) = record.get("c-ip") {
        message
            .server_variables
            .push(Item::new("Client-Ip", client_ip));
        parts.push(client_ip.to_owned());
    }
    if let Some(method) = record.get("cs-method") {
        message.method = Some(method.to_owned());
        parts.push(method.to_owned());
    }
    if let Some(url) = record.get("cs-uri-stem") {
        message.url = Some(url.to_owned());
        parts.push(url.to_owned());
    }
    if let Some(status) = record.get("sc-status").and_then(|s| s.parse::<i32>().ok()) {
        message.status_code = Some(status);
        parts.push(status.to_string());
    }

    message.hostname = record
        .get("s-computername")
        .or_else(|| record.get("cs-host"))
        .map(str::to_owned);
    if let Some(host) = record.get("cs-host") {
        let host = match record.get("s-port") {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        message.server_variables.push(Item::new("Host", host));
    }
    if let Some(user) = record.get("cs-username") {
        message.user = Some(user.to_owned());
    }
    if let Some(agent) = record.get("cs(User-Agent)") {
        message.server_variables.push(Item::new("User-Agent", agent));
    }
    if let Some(site) = record.get("s-sitename") {
        message.application = Some(site.to_owned());
    }
    if let Some(server_ip) = record.get("s-ip") {
        message
            .server_variables
            .push(Item::new("X-Server-Ip", server_ip));
    }
    if let Some(version) = record.get("cs-version") {
        message
            .server_variables
            .push(Item::new("HttpVersion", version));
    }
    if let Some(referer) = record.get("cs(Referer)") {
        message.server_variables.push(Item::new("Referer", referer));
    }
    if let Some(substatus) = record.get("sc-substatus") {
        message.data.push(Item::new("Substatus", substatus));
    }
    if let Some(win32) = record.get("sc-win32-status") {
        message.data.push(Item::new("Win32 Status", win32));
    }
    if let Some(bytes) = record.get("sc-bytes") {
        message.data.push(Item::new("Bytes Sent", bytes));
    }
    if let Some(bytes) = record.get("cs-bytes") {
        message.data.push(Item::new("Bytes Received", bytes));
    }
    if let Some(taken) = record.get("time-taken") {
        message.data.push(Item::new("Time Taken", taken));
    }
    if let Some(query) = record.get("cs-uri-query") {
        message.query_string = pairs(query, "&");
    }
    if let Some(cookie) = record.get("cs(Cookie)") {
        message.cookies = pairs(cookie, ";+");
    }

    message.title = title(&parts);
    message
}

/// The legacy IIS format: fifteen comma-separated columns per line, times in
/// `MM/DD/YY, HH:MM:SS` pairs.
fn iis_message(
    line: &str,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
) -> Option<CreateMessage> {
    if line.trim().is_empty() {
        return None;
    }
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    if columns.len() < 15 {
        return None;
    }
    let date_time = parse_iis_timestamp(columns[2], columns[3])?;
    if !within(date_time, from, to) {
        return None;
    }

    let mut message = CreateMessage {
        date_time: Some(date_time),
        ..CreateMessage::default()
    };
    let mut parts: Vec<String> = Vec::new();

    if let Some(client_ip) = cell(columns[0]) {
        message
            .server_variables
            .push(Item::new("Client-Ip", client_ip));
        parts.push(client_ip.to_owned());
    }
    if let Some(method) = cell(columns[12]) {
        message.method = Some(method.to_owned());
        parts.push(method.to_owned());
    }
    if let Some(url) = cell(columns[13]) {
        message.url = Some(url.to_owned());
        parts.push(url.to_owned());
    }
    if let Some(status) = cell(columns[10]).and_then(|s| s.parse::<i32>().ok()) {
        message.status_code = Some(status);
        parts.push(status.to_string());
    }
    if let Some(user) = cell(columns[1]) {
        message.user = Some(user.to_owned());
    }
    if let Some(server_name) = cell(columns[5]) {
        message.hostname = Some(server_name.to_owned());
    }
    if let Some(service) = cell(columns[4]) {
        message.application = Some(service.to_owned());
    }
    if let Some(server_ip) = cell(columns[6]) {
        message.data.push(Item::new("Server IP address", server_ip));
    }
    if let Some(taken) = cell(columns[7]) {
        message.data.push(Item::new("Time taken", taken));
    }
    if let Some(bytes) = cell(columns[8]) {
        message.data.push(Item::new("Client bytes sent", bytes));
    }
    if let Some(bytes) = cell(columns[9]) {
        message.data.push(Item::new("Server bytes sent", bytes));
    }
    if let Some(win32) = cell(columns[11]) {
        message.data.push(Item::new("Windows status code", win32));
    }
    if let Some(parameters) = cell(columns[14]) {
        message.data.push(Item::new("Parameters", parameters));
    }

    message.title = title(&parts);
    Some(message)
}

/// IIS logs write local dates with two-digit years. The century pivot puts
/// 00-49 in the 2000s.
fn parse_iis_timestamp(date: &str, time: &str) -> Option<OffsetDateTime> {
    let mut date_parts = date.split('/');
    let month: u8 = date_parts.next()?.trim().parse().ok()?;
    let day: u8 = date_parts.next()?.trim().parse().ok()?;
    let year_raw: i32 = date_parts.next()?.trim().parse().ok()?;
    if date_parts.next().is_some() {
        return None;
    }
    let year = if year_raw < 100 {
        if year_raw < 50 {
            2000 + year_raw
        } else {
            1900 + year_raw
        }
    } else {
        year_raw
    };

    let mut time_parts = time.split(':');
    let hour: u8 = time_parts.next()?.trim().parse().ok()?;
    let minute: u8 = time_parts.next()?.trim().parse().ok()?;
    let second: u8 = time_parts.next()?.trim().parse().ok()?;

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

fn pairs(raw: &str, separator: &str) -> Vec<Item> {
    raw.split(separator)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut halves = pair.split('=');
            match (halves.next(), halves.next(), halves.next()) {
                (Some(key), Some(value), None) => Some(Item::new(key, value)),
                _ => None,
            }
        })
        .collect()
}

fn title(parts: &[String]) -> String {
    let joined = parts.join(" - ");
    if joined.trim().is_empty() {
        "Imported line from log file".to_owned()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const W3C_SAMPLE: &str = "\
#Software: Microsoft Internet Information Services 10.0
#Version: 1.0
#Date: 2026-08-20 10:00:00
#Fields: date time s-sitename s-computername c-ip cs-method cs-uri-stem cs-uri-query sc-status cs(User-Agent)
2026-08-20 10:30:00 W3SVC1 WEB01 192.168.0.10 GET /orders id=7&lang=en 500 Mozilla/5.0+(Windows)
2026-08-20 10:31:00 W3SVC1 WEB01 - POST /checkout - 200 -
";

    #[test]
    fn w3c_records_follow_the_fields_directive() {
        let records = parse_w3c(W3C_SAMPLE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("cs-method"), Some("GET"));
        assert_eq!(records[0].get("sc-status"), Some("500"));
        // The dash placeholder reads as missing.
        assert_eq!(records[1].get("c-ip"), None);
        assert_eq!(
            records[0].timestamp(),
            Some(datetime!(2026-08-20 10:30:00 UTC))
        );
    }

    #[test]
    fn a_new_fields_directive_rebinds_the_columns() {
        let input = "\
#Fields: date time cs-method
2026-08-20 10:00:00 GET
#Fields: date time sc-status
2026-08-20 11:00:00 404
";
        let records = parse_w3c(input);
        assert_eq!(records[0].get("cs-method"), Some("GET"));
        assert_eq!(records[1].get("cs-method"), None);
        assert_eq!(records[1].get("sc-status"), Some("404"));
    }

    #[test]
    fn w3c_lines_map_onto_message_fields() {
        let records = parse_w3c(W3C_SAMPLE);
        let date_time = records[0].timestamp().unwrap();
        let message = w3c_message(&records[0], date_time);

        assert_eq!(message.title, "192.168.0.10 - GET - /orders - 500");
        assert_eq!(message.method.as_deref(), Some("GET"));
        assert_eq!(message.url.as_deref(), Some("/orders"));
        assert_eq!(message.status_code, Some(500));
        assert_eq!(message.hostname.as_deref(), Some("WEB01"));
        assert_eq!(message.application.as_deref(), Some("W3SVC1"));
        assert_eq!(
            message.query_string,
            vec![Item::new("id", "7"), Item::new("lang", "en")]
        );
        assert!(message
            .server_variables
            .contains(&Item::new("User-Agent", "Mozilla/5.0+(Windows)")));
    }

    #[test]
    fn w3c_title_falls_back_when_no_parts_matched() {
        let records = parse_w3c("#Fields: date time sc-bytes\n2026-08-20 10:00:00 120\n");
        let message = w3c_message(&records[0], records[0].timestamp().unwrap());
        assert_eq!(message.title, "Imported line from log file");
        assert_eq!(message.data, vec![Item::new("Bytes Sent", "120")]);
    }

    #[test]
    fn iis_lines_map_onto_message_fields() {
        let line = "192.168.114.201, -, 03/20/01, 7:55:20, W3SVC2, SALES1, 172.21.13.45, 4502, 163, 3223, 200, 0, GET, /DeptLogo.gif, -,";
        let message = iis_message(line, None, None).unwrap();

        assert_eq!(message.title, "192.168.114.201 - GET - /DeptLogo.gif - 200");
        assert_eq!(message.date_time, Some(datetime!(2001-03-20 07:55:20 UTC)));
        assert_eq!(message.user, None);
        assert_eq!(message.hostname.as_deref(), Some("SALES1"));
        assert_eq!(message.application.as_deref(), Some("W3SVC2"));
        assert_eq!(message.status_code, Some(200));
        assert!(message
            .data
            .contains(&Item::new("Server IP address", "172.21.13.45")));
        assert!(message.data.contains(&Item::new("Time taken", "4502")));
    }

    #[test]
    fn short_and_blank_iis_lines_are_skipped() {
        assert!(iis_message("", None, None).is_none());
        assert!(iis_message("only, four, columns, here", None, None).is_none());
    }

    #[test]
    fn date_bounds_are_exclusive() {
        let ts = datetime!(2026-08-20 10:00:00 UTC);
        assert!(within(ts, None, None));
        assert!(within(
            ts,
            Some(datetime!(2026-08-20 09:00:00 UTC)),
            Some(datetime!(2026-08-20 11:00:00 UTC))
        ));
        assert!(!within(ts, Some(ts), None));
        assert!(!within(ts, None, Some(ts)));
    }

    #[test]
    fn cookie_pairs_split_on_the_w3c_separator() {
        let items = pairs("session=abc;+theme=dark;+broken", ";+");
        assert_eq!(
            items,
            vec![Item::new("session", "abc"), Item::new("theme", "dark")]
        );
    }
}
