use anyhow::{Context, Result};
use std::path::Path;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use edge_report::config::Config;
use edge_report::{analyze, FileKind};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let Some(file) = args.iter().find(|a| !a.starts_with("--")) else {
        eprintln!("usage: edge-report <export.csv|export.xlsx> [--json]");
        std::process::exit(2);
    };
    let path = Path::new(file);

    let kind = match FileKind::from_path(path) {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let report = match analyze(&bytes, kind, &cfg.thresholds).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}: {}", path.display(), e);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }

    Ok(())
}
