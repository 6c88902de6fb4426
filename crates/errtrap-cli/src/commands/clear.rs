use anyhow::Result;
use clap::Args;
use console::style;

use errtrap_api::Search;

use crate::commands::parse_point_in_time;
use crate::config::{ApiArgs, ApiSettings, ConfigFile};

#[derive(Args, Debug)]
pub struct ClearArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log to clear messages from.
    #[arg(long)]
    pub log_id: Option<String>,

    /// Clear messages matching this query (use * for all messages).
    #[arg(long)]
    pub query: String,

    /// Optional date and time to clear messages from, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub from: Option<String>,

    /// Optional date and time to clear messages to, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub to: Option<String>,
}

pub fn run(args: ClearArgs, config: &ConfigFile) -> Result<()> {
    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;

    let search = Search {
        query: Some(args.query.clone()),
        from: args.from.as_deref().map(parse_point_in_time).transpose()?,
        to: args.to.as_deref().map(parse_point_in_time).transpose()?,
    };
    client.delete_messages(log_id, &search)?;

    println!("{}", style("Successfully cleared messages").green());
    Ok(())
}
