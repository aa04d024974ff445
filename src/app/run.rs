use crate::cli::app_config::Cli;
use crate::http::Agent;
use crate::response::res::TimedResponse;
use crate::timing::Timings;
use bytes::Bytes;
use clap::Parser;
use hyper::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use hyper::{HeaderMap, Request};
use std::io::Write;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

pub async fn main_with_error() -> Result<(), anyhow::Error> {
    let cli: Cli = Cli::parse();
    init_logging(cli.verbosity)?;

    run(cli).await
}

fn init_logging(verbosity: u8) -> Result<(), anyhow::Error> {
    let log_level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy()
        .add_directive("hyper=off".parse()?)
        .add_directive("rustls=warn".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .with_max_level(log_level)
        .with_env_filter(filter)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}

/// Sends the request `cli.repeat` times over one agent, printing the body
/// and the timing breakdown of each. Stops at the first failure, after
/// printing what was recorded for it.
pub async fn run(cli: Cli) -> Result<(), anyhow::Error> {
    let mut agent = Agent::new(&cli.agent_config())?;
    let repeat = cli.repeat.max(1);

    for i in 0..repeat {
        if repeat > 1 {
            info!("* Request {}/{}", i + 1, repeat);
        }
        let request = build_request(&cli)?;
        let timed = TimedResponse::send(&mut agent, request).await;

        if let Ok(response) = &timed.result {
            if !cli.silent {
                print_body(response.body())?;
            }
        }
        print_timings(&timed.timings, cli.json)?;
        timed.result?;
    }
    Ok(())
}

fn build_request(cli: &Cli) -> Result<Request<Bytes>, anyhow::Error> {
    let mut method = String::from("GET");
    let mut header_map = HeaderMap::new();

    if cli.body_option.is_some() {
        method = String::from("POST");
        header_map.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
    }
    if let Some(method_userdefined) = cli.method_option.as_ref() {
        method = method_userdefined.clone();
    }

    header_map.insert(ACCEPT, HeaderValue::from_static("*/*"));
    let user_agent = cli
        .user_agent_option
        .as_deref()
        .unwrap_or(concat!("rtimer/", env!("CARGO_PKG_VERSION")));
    header_map.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

    for x in &cli.headers {
        let split: Vec<&str> = x.splitn(2, ':').collect();
        if split.len() == 2 {
            header_map.insert(
                HeaderName::from_str(split[0].trim())?,
                HeaderValue::from_str(split[1].trim_start())?,
            );
        } else {
            return Err(anyhow!("header error: '{}'", x));
        }
    }

    let body = cli
        .body_option
        .as_ref()
        .map_or_else(Bytes::new, |body| Bytes::from(body.clone()));
    let mut request = Request::builder()
        .method(method.as_str())
        .uri(cli.url.as_str())
        .body(body)?;
    request.headers_mut().extend(header_map);
    Ok(request)
}

fn print_body(body: &Bytes) -> Result<(), anyhow::Error> {
    match std::str::from_utf8(body) {
        Ok(text) => print!("{text}"),
        Err(_) => {
            error!("[rtimer: warning] response body is not valid UTF-8 and was not printed.");
            error!("[rtimer: warning] use `-s` to skip the body.");
        }
    }
    std::io::stdout().flush()?;
    Ok(())
}

fn print_timings(timings: &Timings, json: bool) -> Result<(), anyhow::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(timings)?);
    } else {
        println!("{}", timings);
    }
    Ok(())
}
