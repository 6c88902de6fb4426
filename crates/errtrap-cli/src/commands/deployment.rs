use anyhow::Result;
use clap::Args;
use console::style;

use errtrap_api::CreateDeployment;

use crate::commands::parse_point_in_time;
use crate::config::{ApiArgs, ApiSettings, ConfigFile};

#[derive(Args, Debug)]
pub struct DeploymentArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The version number of this deployment.
    #[arg(long = "version")]
    pub release_version: String,

    /// When was this deployment created in UTC, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    pub created: Option<String>,

    /// Description of this deployment.
    #[arg(long)]
    pub description: Option<String>,

    /// The name of the person responsible for creating this deployment.
    #[arg(long)]
    pub user_name: Option<String>,

    /// The email of the person responsible for creating this deployment.
    #[arg(long)]
    pub user_email: Option<String>,

    /// The ID of a log if this deployment is specific to a single log.
    #[arg(long)]
    pub log_id: Option<String>,
}

pub fn run(args: DeploymentArgs, config: &ConfigFile) -> Result<()> {
    // A deployment without a log ID spans the whole organization. The
    // configured log ID is not used as a fallback here.
    let settings = ApiSettings::resolve(config, &args.api, None);
    let client = settings.client()?;

    let deployment = CreateDeployment {
        version: args.release_version.clone(),
        created: args.created.as_deref().map(parse_point_in_time).transpose()?,
        description: blank_to_none(args.description),
        user_name: blank_to_none(args.user_name),
        user_email: blank_to_none(args.user_email),
        log_id: args.log_id,
    };
    client.create_deployment(&deployment)?;

    println!("{}", style("Deployment successfully created").green());
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
