use anyhow::Result;
use clap::Args;
use indicatif::ProgressBar;
use rand::Rng;
use time::{Duration, OffsetDateTime};

use errtrap_api::{CreateMessage, Item};

use crate::config::{ApiArgs, ApiSettings, ConfigFile};

const NUMBER_OF_MESSAGES: u64 = 50;

const DEMO_STACK_TRACE: &str = r"Errtrap.TestException: This is a test exception that can be safely ignored.
   at Microsoft.AspNetCore.Mvc.Infrastructure.ResourceInvoker.Rethrow(ResourceExecutedContextSealed context)
   at Microsoft.AspNetCore.Mvc.Infrastructure.ResourceInvoker.Next(State& next, Scope& scope, Object& state, Boolean& isCompleted)
   at Microsoft.AspNetCore.Mvc.Infrastructure.ResourceInvoker.InvokeFilterPipelineAsync()
   at Microsoft.AspNetCore.Mvc.Infrastructure.ResourceInvoker.<InvokeAsync>g__Logged|17_1(ResourceInvoker invoker)
   at Microsoft.AspNetCore.Routing.EndpointMiddleware.<Invoke>g__AwaitRequestTask|6_0(Endpoint endpoint, Task requestTask, ILogger logger)
   at Errtrap.Startup.<>c.<<Configure>b__9_1>d.MoveNext() in c:\errtrap\src\Errtrap\Startup.cs:line 364";

#[derive(Args, Debug)]
pub struct DataloaderArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// The ID of the log to load messages into.
    #[arg(long)]
    pub log_id: Option<String>,
}

pub fn run(args: DataloaderArgs, config: &ConfigFile) -> Result<()> {
    let settings = ApiSettings::resolve(config, &args.api, args.log_id.as_deref());
    let client = settings.client()?;
    let log_id = settings.require_log_id()?;

    let mut rng = rand::rng();
    let yesterday = OffsetDateTime::now_utc() - Duration::days(1);

    let progress = ProgressBar::new(NUMBER_OF_MESSAGES).with_message("Loading log messages");
    for _ in 0..NUMBER_OF_MESSAGES {
        // One roll per message keeps the fields consistent with each other:
        // a 500 comes with an Error severity and an exception title.
        let roll: f64 = rng.random();
        let minutes = rng.random_range(0..1440);
        let message = sample_message(log_id, roll, yesterday + Duration::minutes(minutes));
        client.create_message(log_id, &message)?;
        progress.inc(1);
    }
    progress.finish();
    Ok(())
}

fn sample_message(log_id: &str, roll: f64, date_time: OffsetDateTime) -> CreateMessage {
    let mut server_variables = vec![
        Item::new("REMOTE_ADDR", "1.1.1.1"),
        Item::new("CERT_KEYSIZE", "256"),
        Item::new("CONTENT_LENGTH", "0"),
        Item::new("QUERY_STRING", format!("logid={log_id}")),
    ];
    if let Some(method) = method(roll) {
        server_variables.push(Item::new("REQUEST_METHOD", method));
    }
    server_variables.push(Item::new(
        "HTTP_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.75 Safari/537.36",
    ));
    server_variables.push(Item::new("HTTP_CF_IPCOUNTRY", "AU"));

    CreateMessage {
        title: title(roll).to_owned(),
        date_time: Some(date_time),
        detail: Some(DEMO_STACK_TRACE.to_owned()),
        hostname: Some("Web01".to_owned()),
        source: Some("errtrap".to_owned()),
        status_code: status_code(roll),
        r#type: type_name(roll).map(str::to_owned),
        user: user(roll).map(str::to_owned),
        severity: Some(severity(roll).to_owned()),
        url: url(roll).map(str::to_owned),
        method: method(roll).map(str::to_owned),
        version: Some("1.1.0".to_owned()),
        application: Some("Dataloader".to_owned()),
        cookies: vec![
            Item::new("ASP.NET_SessionId", "lm5lbj35ehweehwha2ggsehh"),
            Item::new("_ga", "GA1.3.1580453215.1783132008"),
        ],
        form: vec![
            Item::new("Username", "Joshua"),
            Item::new("Password", "********"),
        ],
        query_string: vec![Item::new("logid", log_id)],
        server_variables,
        ..CreateMessage::default()
    }
}

fn method(roll: f64) -> Option<&'static str> {
    if roll > 0.5 {
        Some("POST")
    } else if roll > 0.2 {
        Some("GET")
    } else {
        None
    }
}

fn url(roll: f64) -> Option<&'static str> {
    if roll > 0.5 {
        Some("/api/process")
    } else if roll > 0.2 {
        Some("/api/test")
    } else {
        None
    }
}

fn type_name(roll: f64) -> Option<&'static str> {
    if roll > 0.5 {
        Some("System.NullReferenceException")
    } else if roll > 0.2 {
        Some("System.Net.HttpException")
    } else {
        None
    }
}

fn title(roll: f64) -> &'static str {
    if roll > 0.5 {
        "Object reference not set to an instance of an object."
    } else if roll > 0.2 {
        "The controller for path '/api/test' was not found or does not implement IController."
    } else {
        "Processing request"
    }
}

fn status_code(roll: f64) -> Option<i32> {
    if roll > 0.5 {
        Some(500)
    } else if roll > 0.2 {
        Some(404)
    } else {
        None
    }
}

fn severity(roll: f64) -> &'static str {
    if roll > 0.5 {
        "Error"
    } else if roll > 0.2 {
        "Warning"
    } else {
        "Information"
    }
}

fn user(roll: f64) -> Option<&'static str> {
    if roll > 0.7 {
        Some("ops@errtrap.io")
    } else if roll > 0.4 {
        Some("info@errtrap.io")
    } else {
        None
    }
}
