use std::time::Duration;

use anyhow::{Context, Result};
use prost::Message;
use train_tracker::config::{DEFAULT_CLIENT_HEADER_VALUE, DEFAULT_FEED_URL, DEFAULT_USER_AGENT};
use train_tracker::gtfs_realtime::FeedMessage;
use train_tracker::normalize::normalize;

/// Header sets tried in order until the endpoint returns a decodable feed.
fn header_sets() -> Vec<Vec<(&'static str, &'static str)>> {
    let accept = ("Accept", "application/x-protobuf");
    let agent = ("User-Agent", DEFAULT_USER_AGENT);
    let client = ("Digitraffic-User", DEFAULT_CLIENT_HEADER_VALUE);
    vec![
        vec![accept],
        vec![accept, agent],
        vec![accept, agent, client],
        vec![accept, agent, client, ("Cache-Control", "no-cache")],
    ]
}

async fn try_headers(
    http: &reqwest::Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<FeedMessage> {
    let mut request = http.get(url).timeout(Duration::from_secs(15));
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request.send().await.context("Request failed")?;
    println!("Status code: {}", response.status());
    println!(
        "Content type: {:?}",
        response.headers().get(reqwest::header::CONTENT_TYPE)
    );
    if !response.status().is_success() {
        anyhow::bail!("API returned error status: {}", response.status());
    }

    let bytes = response.bytes().await.context("Failed to read response body")?;
    println!("Content length: {} bytes", bytes.len());

    FeedMessage::decode(&bytes[..]).context("Failed to parse response as protobuf")
}

#[tokio::main]
async fn main() -> Result<()> {
    let url = std::env::var("TRAIN_TRACKER_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
    let http = reqwest::Client::new();

    println!("Fetching from: {}", url);

    let mut feed = None;
    for (i, headers) in header_sets().iter().enumerate() {
        println!("\n=== Test {} ===", i + 1);
        println!("Headers: {:?}", headers);
        match try_headers(&http, &url, headers).await {
            Ok(decoded) => {
                println!("SUCCESS! Parsed {} entities", decoded.entity.len());
                feed = Some(decoded);
                break;
            }
            Err(e) => println!("{:#}", e),
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    let Some(feed) = feed else {
        anyhow::bail!("All header configurations failed");
    };

    let feed_time = feed
        .header
        .timestamp
        .and_then(|t| i64::try_from(t).ok())
        .and_then(|t| chrono::DateTime::<chrono::Utc>::from_timestamp(t, 0));
    println!(
        "\nGTFS-RT {} feed, created {}",
        feed.header.gtfs_realtime_version,
        feed_time.map_or_else(|| "N/A".to_string(), |t| t.to_rfc3339())
    );

    let mut dropped = Vec::new();
    let mut without_vehicle = 0usize;
    let mut trains = Vec::new();
    for entity in &feed.entity {
        match &entity.vehicle {
            None => without_vehicle += 1,
            Some(raw) => match normalize(raw) {
                Some(train) => trains.push(train),
                None => dropped.push(entity.id.as_str()),
            },
        }
    }

    println!(
        "{} entities: {} trains, {} without position, {} without vehicle data",
        feed.entity.len(),
        trains.len(),
        dropped.len(),
        without_vehicle
    );
    if !dropped.is_empty() {
        println!("Dropped (no usable position): {}", dropped.join(", "));
    }

    println!("\n{:<10} {:>10} {:>10} {:>9}  {:<20} {:<8} TRIP", "TRAIN", "LAT", "LON", "KM/H", "REPORTED", "ROUTE");
    for train in &trains {
        println!(
            "{:<10} {:>10.4} {:>10.4} {:>9}  {:<20} {:<8} {}",
            train.id,
            train.latitude,
            train.longitude,
            train.speed_kmh.map_or_else(|| "N/A".to_string(), |s| format!("{s:.1}")),
            train
                .timestamp
                .map_or_else(|| "N/A".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            train.route_id.as_deref().unwrap_or("-"),
            train.trip_id.as_deref().unwrap_or("-"),
        );
    }

    let moving = trains.iter().filter(|t| t.is_moving()).count();
    println!("\n{} moving, {} stopped or unknown speed", moving, trains.len() - moving);

    Ok(())
}
