//! PRSDN dashboard daemon
//!
//! Connects the stores to the backend, loads every collection, follows the
//! change feed and keeps the active attendance token fresh until Ctrl-C.

use std::collections::HashMap;
use anyhow::Context;
use tracing::{info, warn, error};

use prsdn_dashboard::{
    config::Settings,
    database::{create_pool, run_migrations, ChangeFeed, DatabaseService},
    i18n::I18n,
    services::{Dashboard, DashboardSummary},
    state::SessionCache,
    utils::{helpers::{format_rupiah, now_millis}, logging},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("loading configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", prsdn_dashboard::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await.context("connecting to database")?;
    if settings.database.run_migrations {
        run_migrations(&pool).await?;
    }
    let db = DatabaseService::new(pool.clone());

    // The session cache is optional; without it sessions last for the process only
    let cache = match SessionCache::new(settings.session.clone()).await {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "Session cache unavailable, continuing without it");
            None
        }
    };

    info!("Loading translations...");
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;
    let stats = i18n.get_stats();
    for language in &stats.languages {
        info!(language = %language.code, keys = language.key_count, "Translation catalogue ready");
    }
    let lang = i18n.resolve_language(std::env::var("LANG").ok().as_deref());

    let dashboard = Dashboard::new(db, cache, &settings);
    if let Some(session) = dashboard.auth.init_session().await {
        info!(username = %session.username, role = ?session.role, "Session restored");
    }
    if let Err(e) = dashboard.load_all().await {
        error!(severity = %e.severity(), recoverable = e.is_recoverable(), error = %e, "Failed to load dashboard data");
        return Err(e).context("loading dashboard data");
    }

    let health = dashboard.health_check().await;
    for issue in health.get_issues() {
        warn!("{}", issue);
    }

    log_summary(&i18n, &lang, &dashboard.summary().await);

    if settings.realtime.enabled {
        let mut reloads = dashboard.reloads();
        let reporter = dashboard.clone();
        tokio::spawn(async move {
            loop {
                match reloads.recv().await {
                    Ok(_) => log_summary(&i18n, &lang, &reporter.summary().await),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Summary reporter fell behind");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let feed = ChangeFeed::new(pool, settings.realtime.channel.clone());
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            if let Err(e) = dashboard.follow_changes(feed).await {
                error!(error = %e, "Change feed stopped");
            }
        });
    }

    if settings.attendance.rotate_active_token {
        let attendance = dashboard.attendance.clone();
        let period = settings.attendance.rotation_period();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match attendance.rotate_if_expiring(now_millis()).await {
                    Ok(Some(issued)) => info!(expires_at = issued.expires_at, "Attendance token rotated"),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Attendance token rotation failed"),
                }
            }
        });
    }

    info!("PRSDN dashboard is ready!");
    tokio::signal::ctrl_c().await?;

    dashboard.auth.logout().await;
    info!("PRSDN dashboard has been shut down.");
    Ok(())
}

fn log_summary(i18n: &I18n, lang: &str, summary: &DashboardSummary) {
    let params = |pairs: &[(&str, String)]| -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    };

    info!("{}", i18n.tp("summary.members", lang, summary.total_members as i64, None));
    info!("{}", i18n.tp("applications.pending", lang, summary.pending_applications as i64, None));
    info!("{}", i18n.t("summary.balance", lang, Some(&params(&[("amount", format_rupiah(summary.balance))]))));
    info!(
        "{}",
        i18n.t(
            "summary.kas_month",
            lang,
            Some(&params(&[
                ("month", summary.month.to_string()),
                ("paid", summary.kas.paid_count.to_string()),
                ("unpaid", summary.kas.unpaid_count.to_string()),
                ("amount", format_rupiah(summary.kas.total_collected)),
            ])),
        )
    );
    match &summary.active_event {
        Some(title) => info!("{}", i18n.t("summary.active_event", lang, Some(&params(&[("title", title.clone())])))),
        None => info!("{}", i18n.t("summary.no_active_event", lang, None)),
    }
    info!("{}", i18n.tp("summary.active_polls", lang, summary.active_polls as i64, None));
}
