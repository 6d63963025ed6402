//! Demo data seed script
//!
//! Seeds a development database with realistic data:
//! - 1 admin, 1 kitchen account, 8 students with NFC tokens
//! - Menus for the current and the next ISO week (next week's window open)
//! - Orders for next week for most students
//!
//! Usage:
//!   DATABASE_URL=... ./seed-demo
//!
//! Environment variables:
//!   DATABASE_URL        — PostgreSQL connection string (required)
//!   UTC_OFFSET_MINUTES  — service-local offset (default: 60)
//!
//! The script truncates users/menus/orders first; never point it at a
//! production database.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::env;
use uuid::Uuid;

use kantin_api::db;
use kantin_api::models::menu::{DaySlot, MenuOption};
use kantin_api::models::order::{Selection, NO_LUNCH};
use kantin_api::models::week::{service_date, WeekKey};
use kantin_api::services::menu::MenuService;
use kantin_api::services::order::OrderService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let utc_offset_minutes: i32 = env::var("UTC_OFFSET_MINUTES")
        .unwrap_or_else(|_| "60".into())
        .parse()?;

    println!("=== Seed demo data ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    db::run_migrations(&pool).await?;

    println!("Cleaning existing data...");
    sqlx::raw_sql("TRUNCATE orders, menus, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await?;

    println!("Creating users...");
    let admin_id = insert_user(&pool, "igazgato@kantin.test", "Júlia", "Kovács", "admin", None).await?;
    insert_user(&pool, "konyha@kantin.test", "Ferenc", "Nagy", "kitchen", None).await?;

    let students = [
        ("anna.kiss@kantin.test", "Anna", "Kiss"),
        ("bence.toth@kantin.test", "Bence", "Tóth"),
        ("csilla.horvath@kantin.test", "Csilla", "Horváth"),
        ("daniel.szabo@kantin.test", "Dániel", "Szabó"),
        ("eszter.varga@kantin.test", "Eszter", "Varga"),
        ("gergo.molnar@kantin.test", "Gergő", "Molnár"),
        ("hanna.farkas@kantin.test", "Hanna", "Farkas"),
        ("istvan.balogh@kantin.test", "István", "Balogh"),
    ];
    let mut student_ids = Vec::new();
    for (i, (email, first, last)) in students.iter().enumerate() {
        let token = format!("DEMO-{:04}", i + 1);
        let id = insert_user(&pool, email, first, last, "student", Some(&token)).await?;
        student_ids.push(id);
    }

    println!("Publishing menus...");
    let today = service_date(Utc::now(), utc_offset_minutes);
    let this_week = WeekKey::of(today);
    let next_week = WeekKey::next(today);

    MenuService::create(&pool, this_week, demo_slots(), admin_id).await?;
    // This week's window is already closed — serving is in progress.
    MenuService::set_open(&pool, this_week, false).await?;
    MenuService::create(&pool, next_week, demo_slots(), admin_id).await?;

    println!("Placing orders for week {next_week}...");
    let patterns: [[&str; 5]; 4] = [
        ["a-menu", "a-menu", NO_LUNCH, "b-menu", "a-menu"],
        ["b-menu", "b-menu", "b-menu", NO_LUNCH, NO_LUNCH],
        ["a-menu", NO_LUNCH, "a-menu", "a-menu", "b-menu"],
        [NO_LUNCH, "a-menu", "b-menu", "b-menu", "a-menu"],
    ];
    let mut orders = 0usize;
    for (i, student_id) in student_ids.iter().enumerate() {
        // Two students stay undecided
        if i >= 6 {
            continue;
        }
        let selections = patterns[i % patterns.len()]
            .iter()
            .map(|s| Selection::from(Some(s.to_string())))
            .collect();
        OrderService::submit(&pool, *student_id, next_week, selections).await?;
        orders += 1;
    }

    println!("Done: 10 users, 2 menus ({this_week}, {next_week}), {orders} orders");
    Ok(())
}

async fn insert_user(
    pool: &sqlx::PgPool,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
    nfc_token: Option<&str>,
) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO users (email, first_name, last_name, role, nfc_token)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .bind(nfc_token)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

fn demo_slots() -> Vec<DaySlot> {
    let days: [&[(&str, &str)]; 5] = [
        &[("a-menu", "Csirkepaprikás galuskával"), ("b-menu", "Rakott káposzta")],
        &[("a-menu", "Gulyásleves"), ("b-menu", "Zöldborsófőzelék fasírttal")],
        &[("a-menu", "Rántott sajt rizzsel"), ("b-menu", "Lencsefőzelék")],
        &[("a-menu", "Paprikás krumpli"), ("b-menu", "Grillezett csirkemell")],
        &[("a-menu", "Halrudak burgonyapürével"), ("b-menu", "Túrós csusza")],
    ];
    days.iter()
        .map(|opts| {
            DaySlot(
                opts.iter()
                    .map(|(id, label)| MenuOption {
                        id: id.to_string(),
                        label: label.to_string(),
                    })
                    .collect(),
            )
        })
        .collect()
}
