use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chart_client::HttpDataService;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod commands;
mod config;
mod console;
mod page;

use commands::{parse_command, PageCommand};
use config::load_settings;
use console::{ConsoleAlerts, LogChartBackend, LogSpinner};
use page::{Collaborators, Page, PageData};

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = "dashboard.toml")]
    config: PathBuf,
    /// Page payload: `{"columns": [...], "rows": [...], "chart": {...}}`.
    #[arg(long)]
    data: PathBuf,
    /// Command script; reads stdin when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }

    let raw = tokio::fs::read_to_string(&args.data)
        .await
        .with_context(|| format!("failed to read page data '{}'", args.data.display()))?;
    let data = PageData::from_json(&raw)?;

    let collaborators = Collaborators {
        source: Arc::new(HttpDataService::new(&settings.server_url)?),
        backend: Arc::new(LogChartBackend),
        alerts: Arc::new(ConsoleAlerts),
        spinner: Arc::new(LogSpinner),
    };
    let page = Page::compose(&settings, data, collaborators).await?;
    info!(server_url = %settings.server_url, "dashboard ready");

    match args.script {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open script '{}'", path.display()))?;
            run_script(&page, BufReader::new(file)).await?;
        }
        None => run_script(&page, BufReader::new(tokio::io::stdin())).await?,
    }
    page.wait_idle(settings.ready_timeout()).await;
    Ok(())
}

async fn run_script<R>(page: &Page, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                warn!(%line, error = %err, "skipping invalid command");
                eprintln!("error: {err}");
                continue;
            }
        };
        if command == PageCommand::Quit {
            break;
        }
        match page.execute(command).await {
            Ok(output) if output.is_empty() => {}
            Ok(output) => println!("{output}"),
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}
