//! Command-line client for the Packtrack record collection.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use packtrack_core::models::{NewPackage, PackageRecord, Status};
use packtrack_core::reconciler::{Notice, NoticeKind};
use packtrack_core::remote::HttpRemoteStore;
use packtrack_core::view::{self, StatusFilter};
use packtrack_core::{export, Config, LocalCache, ReconcilerSession, RemoteStore, TenantId};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "packtrack", about = "Parcel and inventory tracker", version)]
struct Cli {
    /// Remote collection URL (can also be set via PACKTRACK_REMOTE_URL)
    #[arg(short = 'u', long, env = "PACKTRACK_REMOTE_URL")]
    remote: Option<String>,

    /// Work against local state only; skip all remote calls
    #[arg(long, global = true)]
    offline: bool,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Record a new package
    Add {
        /// Human label for the parcel or goods
        item_name: String,
        #[arg(short, long)]
        tracking: Option<String>,
        #[arg(short, long)]
        recipient: Option<String>,
        #[arg(short, long)]
        sender: Option<String>,
        /// Cost per unit
        #[arg(short, long)]
        price: Option<f64>,
        #[arg(short, long)]
        quantity: Option<u32>,
    },
    /// List records, pending first
    List {
        /// Case-insensitive search term
        query: Option<String>,
        /// Restrict to one status: pending, shipped, or received
        #[arg(short = 'S', long)]
        status: Option<String>,
    },
    /// Flip a record between pending and received
    Toggle {
        id: String,
    },
    /// Mark a record shipped
    Ship {
        id: String,
    },
    /// Mark a record received
    Receive {
        id: String,
    },
    /// Delete a record
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Show aggregate statistics
    Stats,
    /// Price history for a named product
    History {
        name: String,
    },
    /// Export all records as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-fetch the remote list
    Refresh,
}

/// Parse the `--status` filter value.
fn parse_status_filter(value: Option<&str>) -> Result<StatusFilter, String> {
    let Some(value) = value else {
        return Ok(StatusFilter::All);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "all" => Ok(StatusFilter::All),
        "pending" | "ordered" => Ok(StatusFilter::Only(Status::Pending)),
        "shipped" => Ok(StatusFilter::Only(Status::Shipped)),
        "received" => Ok(StatusFilter::Only(Status::Received)),
        other => Err(format!(
            "unknown status '{}' (expected pending, shipped, or received)",
            other
        )),
    }
}

fn format_record_line(record: &PackageRecord) -> String {
    let mut line = format!(
        "{:<20} {:<9} {}",
        record.id, record.status, record.item_name
    );
    if let Some(tracking) = record.tracking_number.as_deref() {
        line.push_str(&format!("  [{}]", tracking));
    }
    match (record.recipient.as_deref(), record.sender.as_deref()) {
        (Some(recipient), Some(sender)) => {
            line.push_str(&format!("  {} <- {}", recipient, sender));
        }
        (Some(recipient), None) => line.push_str(&format!("  for {}", recipient)),
        (None, Some(sender)) => line.push_str(&format!("  from {}", sender)),
        (None, None) => {}
    }
    line
}

fn render_list(records: &[&PackageRecord], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(records)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(records
        .iter()
        .map(|record| format_record_line(record))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_stats(stats: &view::Stats, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(&serde_json::json!({
            "pending": stats.pending_count,
            "received": stats.received_count,
            "totalValue": stats.total_value,
        }))
        .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(format!(
        "pending: {}\nreceived: {}\ntotal value: {:.2}",
        stats.pending_count, stats.received_count, stats.total_value
    ))
}

fn format_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Info => notice.message.clone(),
        NoticeKind::Error => format!("warning: {}", notice.message),
    }
}

async fn run_command(command: Commands, session: &ReconcilerSession, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Completions { .. } | Commands::Refresh => {
            // Completions are handled before session setup; refresh already
            // ran as part of it.
        }
        Commands::Add {
            item_name,
            tracking,
            recipient,
            sender,
            price,
            quantity,
        } => {
            let record = session
                .add(NewPackage {
                    item_name,
                    tracking_number: tracking,
                    recipient,
                    sender,
                    cost_price: price,
                    quantity,
                })
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("Added: {} ({})", record.item_name, record.id);
            }
        }
        Commands::List { query, status } => {
            let filter = parse_status_filter(status.as_deref()).map_err(anyhow::Error::msg)?;
            let records = session.packages().await;
            let selected = view::filter(&records, query.as_deref().unwrap_or(""), filter);
            let output = render_list(&selected, json).map_err(anyhow::Error::msg)?;
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Commands::Toggle { id } => {
            let status = session
                .toggle_status(&id)
                .await
                .with_context(|| format!("toggle '{}'", id))?;
            println!("{} is now {}", id, status);
        }
        Commands::Ship { id } => {
            session
                .set_status(&id, Status::Shipped)
                .await
                .with_context(|| format!("ship '{}'", id))?;
            println!("{} is now shipped", id);
        }
        Commands::Receive { id } => {
            session
                .set_status(&id, Status::Received)
                .await
                .with_context(|| format!("receive '{}'", id))?;
            println!("{} is now received", id);
        }
        Commands::Delete { id, yes } => {
            if !yes {
                println!("Re-run with --yes to delete {}", id);
                return Ok(());
            }
            session
                .delete(&id)
                .await
                .with_context(|| format!("delete '{}'", id))?;
        }
        Commands::Stats => {
            let records = session.packages().await;
            let stats = view::stats(&records);
            let output = render_stats(&stats, json).map_err(anyhow::Error::msg)?;
            println!("{}", output);
        }
        Commands::History { name } => {
            let records = session.packages().await;
            let product = session.product_by_name(&name).await.unwrap_or_else(|| {
                // No price memory yet; match by name only.
                packtrack_core::models::Product {
                    id: String::new(),
                    name: name.clone(),
                    last_price: 0.0,
                    total_quantity: 0,
                }
            });
            let history = view::price_history(&records, &product);
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No recorded prices for '{}'", name);
            } else {
                for (at, price) in history {
                    println!("{}  {:.2}", at.format("%Y-%m-%d"), price);
                }
            }
        }
        Commands::Export { output } => {
            let records = session.packages().await;
            let csv = export::to_csv(&records);
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("Exported {} records to {}", records.len(), path.display());
                }
                None => {
                    print!("{}", csv);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::from_env();
    if let Some(remote) = cli.remote.clone() {
        config.remote_url = remote;
    }
    if cli.offline {
        config.offline = true;
    }

    let tenant = TenantId::get_or_create(&config.tenant_id_path());
    let cache = LocalCache::open(&config.cache_path()).context("open local cache")?;
    let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(
        &config.remote_url,
        Duration::from_secs(config.timeout_secs),
    )?);
    let session = ReconcilerSession::open(tenant, remote, cache, config.offline);
    tracing::debug!(tenant = %session.tenant(), offline = config.offline, "session ready");

    if !config.offline {
        session.refresh().await;
    }

    run_command(cli.command, &session, cli.json).await?;

    for notice in session.take_notices().await {
        eprintln!("{}", format_notice(&notice));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use packtrack_core::models::NewPackage;

    fn record(id: &str, item_name: &str) -> PackageRecord {
        NewPackage {
            item_name: item_name.to_string(),
            ..NewPackage::default()
        }
        .into_local_record(id.to_string(), Utc::now())
    }

    #[test]
    fn cli_parses_add_with_options() {
        let cli = Cli::try_parse_from([
            "packtrack", "add", "Socks", "--tracking", "SF123", "--price", "9.5",
        ])
        .expect("cli should parse add");
        match cli.command {
            Commands::Add {
                item_name,
                tracking,
                price,
                ..
            } => {
                assert_eq!(item_name, "Socks");
                assert_eq!(tracking.as_deref(), Some("SF123"));
                assert_eq!(price, Some(9.5));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn cli_parses_list_with_status_filter() {
        let cli = Cli::try_parse_from(["packtrack", "list", "socks", "--status", "pending"])
            .expect("cli should parse list");
        match cli.command {
            Commands::List { query, status } => {
                assert_eq!(query.as_deref(), Some("socks"));
                assert_eq!(status.as_deref(), Some("pending"));
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn parse_status_filter_matrix() {
        assert_eq!(parse_status_filter(None), Ok(StatusFilter::All));
        assert_eq!(parse_status_filter(Some("all")), Ok(StatusFilter::All));
        assert_eq!(
            parse_status_filter(Some("Pending")),
            Ok(StatusFilter::Only(Status::Pending))
        );
        assert_eq!(
            parse_status_filter(Some("ordered")),
            Ok(StatusFilter::Only(Status::Pending))
        );
        assert_eq!(
            parse_status_filter(Some("received")),
            Ok(StatusFilter::Only(Status::Received))
        );
        assert!(parse_status_filter(Some("lost")).is_err());
    }

    #[test]
    fn format_record_line_includes_optional_fields() {
        let mut full = record("R1", "Socks");
        full.tracking_number = Some("SF123".to_string());
        full.recipient = Some("Mia".to_string());
        full.sender = Some("Shop".to_string());
        let line = format_record_line(&full);
        assert!(line.contains("R1"));
        assert!(line.contains("pending"));
        assert!(line.contains("[SF123]"));
        assert!(line.contains("Mia <- Shop"));

        let bare = record("R2", "Lamp");
        let line = format_record_line(&bare);
        assert!(!line.contains("[alt]"));
        assert!(!line.contains("for "));
    }

    #[test]
    fn render_list_json_preserves_payload_shape() {
        let records = vec![record("R1", "Socks")];
        let refs: Vec<&PackageRecord> = records.iter().collect();
        let rendered = render_list(&refs, true).expect("json output should render");
        let parsed: serde_json::Value =
            serde_json::from_str(&rendered).expect("rendered list should be valid json");
        assert_eq!(parsed[0]["id"], "R1");
        assert_eq!(parsed[0]["item_name"], "Socks");
    }

    #[test]
    fn render_stats_plain_and_json() {
        let stats = view::Stats {
            pending_count: 2,
            received_count: 1,
            total_value: 32.5,
        };
        let plain = render_stats(&stats, false).expect("plain output");
        assert!(plain.contains("pending: 2"));
        assert!(plain.contains("total value: 32.50"));

        let rendered = render_stats(&stats, true).expect("json output");
        let parsed: serde_json::Value =
            serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(parsed["totalValue"], 32.5);
    }

    #[test]
    fn format_notice_prefixes_errors() {
        let info = Notice {
            kind: NoticeKind::Info,
            message: "Added \"Socks\"".to_string(),
        };
        let error = Notice {
            kind: NoticeKind::Error,
            message: "Status update failed".to_string(),
        };
        assert_eq!(format_notice(&info), "Added \"Socks\"");
        assert_eq!(format_notice(&error), "warning: Status update failed");
    }
}
