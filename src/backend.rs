//! Native operator binary: static hosting for the built site plus one-shot
//! data commands that run the remote client against the live API.

use std::path::{Path, PathBuf};

use axum::Router;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::{parse_non_empty_string, RuntimeConfig};
use crate::github::GithubApi;
use crate::logging::Logger;
use crate::repositories::RemoteDataClient;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_REPOSITORY_LIMIT: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "portfolio-site", version, about = "Hosts the portfolio and inspects its GitHub data")]
struct Cli {
    /// GitHub account to query; overrides PORTFOLIO_GITHUB_USER.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the built site, answering unknown paths with index.html.
    Serve {
        /// Defaults to PORT, then 8080.
        #[arg(long)]
        port: Option<u16>,
        /// Defaults to PORTFOLIO_DIST_DIR, then ./dist.
        #[arg(long)]
        dist_dir: Option<PathBuf>,
    },
    /// Print the repository summary, falling back to sample data on failure.
    Summary,
    /// Print the top six repositories by featured score.
    Featured,
    /// Print owned repositories, most starred first.
    Repositories {
        #[arg(long, default_value_t = DEFAULT_REPOSITORY_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct ServeSettings {
    port: u16,
    dist_dir: PathBuf,
}

impl ServeSettings {
    fn resolve(port: Option<u16>, dist_dir: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = port
            .or_else(|| lookup("PORT").and_then(|value| value.trim().parse::<u16>().ok()))
            .unwrap_or(DEFAULT_PORT);
        let dist_dir = dist_dir
            .or_else(|| parse_non_empty_string(lookup("PORTFOLIO_DIST_DIR")).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));

        Self { port, dist_dir }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = RuntimeConfig::from_env();
    if let Some(user) = parse_non_empty_string(cli.user) {
        config.github_user = user;
    }
    let logger = config.logger();

    match cli.command {
        Command::Serve { port, dist_dir } => {
            let settings = ServeSettings::resolve(port, dist_dir, |key| std::env::var(key).ok());
            serve(settings, logger).await
        }
        Command::Summary => {
            let client = RemoteDataClient::new(GithubApi::new(&config)?, logger);
            print_json(&client.fetch_summary().await)
        }
        Command::Featured => {
            let client = RemoteDataClient::new(GithubApi::new(&config)?, logger);
            print_json(&client.fetch_featured_items().await?)
        }
        Command::Repositories { limit } => {
            let client = RemoteDataClient::new(GithubApi::new(&config)?, logger);
            print_json(&client.fetch_repositories(limit).await?)
        }
    }
}

fn site_router(dist_dir: &Path) -> Router {
    let static_service = ServeDir::new(dist_dir).not_found_service(ServeFile::new(dist_dir.join("index.html")));
    Router::new().fallback_service(static_service)
}

async fn serve(settings: ServeSettings, logger: Logger) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    logger.info(
        "serve_listening",
        serde_json::json!({
            "url": format!("http://127.0.0.1:{}", settings.port),
            "dist_dir": settings.dist_dir.display().to_string(),
        }),
    );

    axum::serve(listener, site_router(&settings.dist_dir)).await?;
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn serve_defaults_to_port_8080_and_dist() {
        let settings = ServeSettings::resolve(None, None, lookup_from(&[]));

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn serve_reads_environment_and_ignores_bad_ports() {
        let settings = ServeSettings::resolve(
            None,
            None,
            lookup_from(&[("PORT", "9090"), ("PORTFOLIO_DIST_DIR", "site/out")]),
        );
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.dist_dir, PathBuf::from("site/out"));

        let settings = ServeSettings::resolve(None, None, lookup_from(&[("PORT", "99999"), ("PORTFOLIO_DIST_DIR", "  ")]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn flags_take_precedence_over_environment() {
        let settings = ServeSettings::resolve(
            Some(3000),
            Some(PathBuf::from("public")),
            lookup_from(&[("PORT", "9090"), ("PORTFOLIO_DIST_DIR", "site/out")]),
        );

        assert_eq!(
            settings,
            ServeSettings {
                port: 3000,
                dist_dir: PathBuf::from("public"),
            }
        );
    }

    #[test]
    fn cli_parses_subcommands_and_global_user() {
        let cli = Cli::try_parse_from(["portfolio-site", "repositories", "--limit", "25", "--user", "octocat"])
            .expect("valid arguments");

        assert_eq!(cli.user.as_deref(), Some("octocat"));
        assert!(matches!(cli.command, Command::Repositories { limit: 25 }));

        let cli = Cli::try_parse_from(["portfolio-site", "serve", "--port", "4000"]).expect("valid arguments");
        assert!(matches!(cli.command, Command::Serve { port: Some(4000), dist_dir: None }));
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["portfolio-site"]).is_err());
        assert!(Cli::try_parse_from(["portfolio-site", "serve", "--port", "not-a-port"]).is_err());
    }

    #[tokio::test]
    async fn unknown_paths_fall_back_to_index() {
        let dist_dir = std::env::temp_dir().join(format!("portfolio-site-dist-{}", std::process::id()));
        fs::create_dir_all(&dist_dir).expect("create dist dir");
        fs::write(dist_dir.join("index.html"), "<div id=\"app\"></div>").expect("write index");
        fs::write(dist_dir.join("app.js"), "console.log('app');").expect("write script");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let address = listener.local_addr().expect("local address");
        let router = site_router(&dist_dir);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let client = reqwest::Client::new();
        let script = client
            .get(format!("http://{address}/app.js"))
            .send()
            .await
            .expect("script request")
            .text()
            .await
            .expect("script body");
        let deep_link = client
            .get(format!("http://{address}/projects/deep-link"))
            .send()
            .await
            .expect("deep link request")
            .text()
            .await
            .expect("deep link body");

        assert_eq!(script, "console.log('app');");
        assert_eq!(deep_link, "<div id=\"app\"></div>");

        let _ = fs::remove_dir_all(&dist_dir);
    }
}
