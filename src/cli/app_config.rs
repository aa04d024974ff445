use crate::http::AgentConfig;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Time every phase of an HTTP request", long_about)]
pub struct Cli {
    /// The request url,like http://www.google.com
    pub url: String,
    ///  Specify request method to use
    #[arg(short = 'X', long = "request", value_name = "method")]
    pub method_option: Option<String>,
    /// HTTP POST data.
    #[arg(short = 'd', long = "data", value_name = "data")]
    pub body_option: Option<String>,
    /// The http headers.
    #[arg(short = 'H', long = "header", value_name = "name: value")]
    pub headers: Vec<String>,
    ///  Send User-Agent <name> to server
    #[arg(short = 'A', long = "user-agent", value_name = "name")]
    pub user_agent_option: Option<String>,
    /// PEM bundle to verify the server against, instead of the built-in roots.
    #[arg(short = 'c', long = "cacert", value_name = "file")]
    pub certificate_path_option: Option<PathBuf>,
    /// Allow insecure server connections
    #[arg(short = 'k', long = "insecure")]
    pub skip_certificate_validate: bool,
    /// Send the request this many times over the same connection.
    #[arg(short = 'n', long = "repeat", value_name = "count", default_value_t = 1)]
    pub repeat: u32,
    /// Give up on a request after this many seconds.
    #[arg(long = "timeout", value_name = "seconds", default_value_t = 30)]
    pub timeout_secs: u64,
    /// Print the timings as JSON.
    #[arg(long = "json")]
    pub json: bool,
    /// Do not print the response body.
    #[arg(short = 's', long = "silent")]
    pub silent: bool,
    ///  Make the operation more talkative
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            skip_certificate_validate: self.skip_certificate_validate,
            certificate_path: self.certificate_path_option.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rtimer", "http://example.com"]).unwrap();
        assert_eq!(cli.url, "http://example.com");
        assert_eq!(cli.repeat, 1);
        assert_eq!(cli.verbosity, 0);
        assert!(!cli.json);

        let config = cli.agent_config();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.skip_certificate_validate);
        assert!(config.certificate_path.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "rtimer",
            "-X",
            "PUT",
            "-H",
            "a: b",
            "-H",
            "c: d",
            "-k",
            "-vv",
            "-n",
            "3",
            "--timeout",
            "5",
            "--json",
            "https://example.com",
        ])
        .unwrap();
        assert_eq!(cli.method_option.as_deref(), Some("PUT"));
        assert_eq!(cli.headers, vec!["a: b", "c: d"]);
        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.repeat, 3);
        assert!(cli.json);

        let config = cli.agent_config();
        assert!(config.skip_certificate_validate);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["rtimer"]).is_err());
    }
}
