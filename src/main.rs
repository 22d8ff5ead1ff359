//! WiFi Guardian - Main Entry Point
//!
//! Console monitor: samples the selected interfaces on a fixed interval,
//! keeps the bounded history and logs anomaly verdicts. A report is
//! exported on Ctrl+C.

mod api;
mod logic;
pub mod constants;

use std::time::Duration;
use tokio::time::MissedTickBehavior;

use api::commands;
use constants::{APP_NAME, APP_VERSION};
use logic::config::MonitorConfig;
use logic::session::MonitorSession;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = MonitorConfig::from_env();
    log::info!(
        "Tick every {}s, history cap {}, geolocation {}",
        config.tick_interval_secs,
        config.history_cap,
        if config.geo_enabled { "on" } else { "off" }
    );

    let mut session = MonitorSession::from_config(&config);

    if !config.interfaces.is_empty() {
        if let Err(e) = commands::select_interfaces(&mut session, config.interfaces.clone()) {
            log::warn!("Ignoring GUARDIAN_INTERFACES: {}", e);
        }
    }

    for option in commands::list_interfaces(&mut session) {
        log::info!(
            "  {} {}{}",
            if option.selected { "*" } else { " " },
            option.name,
            if option.wireless { " (wireless)" } else { "" }
        );
    }

    if session.interfaces().is_empty() {
        log::warn!("No network interfaces selected, monitor will idle");
    }

    // Guard against a zero interval from the environment
    let period = config.tick_interval().max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // The session moves into the blocking pool and back, so ticks never overlap
                let joined = tokio::task::spawn_blocking(move || {
                    let report = session.tick();
                    let anomalies = commands::get_anomalies(&session);
                    (session, report, anomalies)
                })
                .await;

                let (returned, report, anomalies) = match joined {
                    Ok(parts) => parts,
                    Err(e) => {
                        log::error!("Tick task failed: {}", e);
                        return;
                    }
                };
                session = returned;

                if !report.skipped.is_empty() {
                    log::warn!("No stats for {:?} this tick", report.skipped);
                }

                match anomalies.summary {
                    Some(summary) => log::info!(
                        "Tick {}: +{} records (history {}), {} anomalous / {} normal, {} recent",
                        report.tick,
                        report.records_appended,
                        report.history_len,
                        summary.anomalous,
                        summary.normal,
                        anomalies.recent.len()
                    ),
                    None => log::info!(
                        "Tick {}: +{} records (history {}), collecting data...",
                        report.tick,
                        report.records_appended,
                        report.history_len
                    ),
                }

                if let Some(latest) = anomalies.recent.last() {
                    log::debug!(
                        "Latest anomaly: {} {} sent={} recv={} [{}]",
                        latest.timestamp,
                        latest.interface,
                        latest.bytes_sent,
                        latest.bytes_recv,
                        latest.location
                    );
                }
            }
            _ = &mut shutdown => {
                log::info!("Shutdown requested");
                break;
            }
        }
    }

    let status = commands::get_monitor_status(&session);
    log::info!(
        "Session ended after {} ticks with {} records",
        status.tick_count,
        status.history_len
    );

    let stats = commands::get_statistics(&session);
    log::info!(
        "Delta sent: mean={:.1} max={} | Delta recv: mean={:.1} max={}",
        stats.stats.delta_bytes_sent.mean,
        stats.stats.delta_bytes_sent.max,
        stats.stats.delta_bytes_recv.mean,
        stats.stats.delta_bytes_recv.max
    );
    for row in commands::get_recent_history(&session, 5) {
        log::debug!("{} {} sent={} recv={} {}", row.timestamp, row.interface, row.bytes_sent, row.bytes_recv, row.protocol);
    }

    match commands::export_report(&session, &config.export_dir) {
        Ok(path) => log::info!("Report saved to {}", path),
        Err(e) => log::error!("Failed to export report: {}", e),
    }

    let history_path = config.export_dir.join("history.jsonl");
    match commands::export_history_jsonl(&session, &history_path) {
        Ok(count) => log::info!("Wrote {} history records to {}", count, history_path.display()),
        Err(e) => log::error!("Failed to export history: {}", e),
    }
}
