use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use train_tracker::{Snapshot, Tracker, TrackerConfig, Train};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = TrackerConfig::from_env().context("Invalid configuration")?;

    tracing::info!("Real-Time Train Tracker");
    tracing::info!(url = %config.feed.url, "Feed");

    let tracker = Tracker::new(&config).context("Failed to create feed client")?;
    let poller = tracker.spawn_periodic();

    // Print a summary every time a cycle commits.
    let mut updates = tracker.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            print_summary(&snapshot);
        }
    });

    println!("Enter a train number to search, empty line or /refresh to refresh,");
    println!("/json to dump the snapshot, /quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "/quit" => break,
            "" | "/refresh" => {
                tracker.refresh_now().await;
            }
            "/json" => {
                let json = serde_json::to_string_pretty(&*tracker.get_snapshot())
                    .context("Failed to serialize snapshot")?;
                println!("{json}");
            }
            query => print_trains(query, &tracker.search(query)),
        }
    }

    poller.abort();
    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    println!(
        "\n📊 Last update: {}  {} trains ({} moving)",
        snapshot.label,
        snapshot.len(),
        snapshot.moving_count()
    );
    if snapshot.is_empty() {
        println!("⚠️  No trains found");
    }
}

fn print_trains(query: &str, trains: &[Train]) {
    if trains.is_empty() {
        println!("No trains match {query:?}");
        return;
    }
    println!("─────────────────────────────────────────────────");
    for train in trains {
        println!("{train}");
    }
    println!("{} match(es) for {query:?}", trains.len());
}
