use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_gauge, register_gauge_vec, Counter, CounterVec, Gauge, GaugeVec};
use sqlx::PgPool;
use tracing::warn;

use crate::models::week::{service_date, WeekKey};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref ORDERS_SUBMITTED_COUNTER: Counter = register_counter!(
        "api_orders_submitted_total",
        "Accepted lunch order submissions"
    ).unwrap();

    pub static ref REDEMPTIONS_COUNTER: CounterVec = register_counter_vec!(
        "api_redemptions_total",
        "Kiosk scans by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref MENUS_PUBLISHED_COUNTER: Counter = register_counter!(
        "api_menus_published_total",
        "Weekly menus published"
    ).unwrap();

    // ── Business metrics ────────────────────────────────────────────────────
    pub static ref USERS_GAUGE: GaugeVec = register_gauge_vec!(
        "kantin_users_total",
        "Active users by role",
        &["role"]
    ).unwrap();

    pub static ref OPEN_CYCLE_ORDERS_GAUGE: Gauge = register_gauge!(
        "kantin_open_cycle_orders_total",
        "Orders placed for the week currently being ordered"
    ).unwrap();
}

/// Spawn the background metrics collector (refreshes every 5 minutes).
pub fn start(pool: PgPool, utc_offset_minutes: i32) {
    tokio::spawn(async move {
        // Initial collection on startup
        if let Err(e) = collect(&pool, utc_offset_minutes).await {
            warn!("Metrics: initial collection failed: {}", e);
        }
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            if let Err(e) = collect(&pool, utc_offset_minutes).await {
                warn!("Metrics: collection failed: {}", e);
            }
        }
    });
}

async fn collect(pool: &PgPool, utc_offset_minutes: i32) -> anyhow::Result<()> {
    let user_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT role, COUNT(*)::BIGINT FROM users WHERE is_active = TRUE GROUP BY role",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();

    for (role, count) in user_counts {
        USERS_GAUGE.with_label_values(&[&role]).set(count as f64);
    }

    let cycle = WeekKey::next(service_date(Utc::now(), utc_offset_minutes));
    let orders: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM orders WHERE week = $1 AND year = $2")
            .bind(cycle.week as i32)
            .bind(cycle.year)
            .fetch_one(pool)
            .await
            .unwrap_or(0);
    OPEN_CYCLE_ORDERS_GAUGE.set(orders as f64);

    Ok(())
}
