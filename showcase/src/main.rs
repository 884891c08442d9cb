//! Widget store showcase.
//!
//! Drives the cart, dashboard, feed and form stores against live HTTP
//! endpoints and prints the store metrics at the end.
//!
//! Configuration comes from `SHOWCASE_*` environment variables; see
//! [`config::ShowcaseConfig`].

mod config;
mod http;

use anyhow::Context;
use cart_store::{CartStore, Product, ProductCatalog};
use config::ShowcaseConfig;
use dashboard_poller::{DashboardPoller, PollerConfig};
use feed_paginator::{FeedConfig, FeedPaginator};
use form_validator::{Field, FormValidator, ValidatorConfig};
use http::HttpFetch;
use reactive_stores_core::environment::SystemClock;
use reactive_stores_core::fetch::Fetch;
use reactive_stores_runtime::metrics::MetricsExporter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShowcaseConfig::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "showcase=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(config = %serde_json::to_string(&config)?, "Configuration loaded");

    let mut exporter = MetricsExporter::new();
    exporter.install()?;

    let fetch: Arc<dyn Fetch> = Arc::new(HttpFetch::new(Duration::from_secs(10))?);

    cart_demo(&config, Arc::clone(&fetch)).await?;
    dashboard_demo(&config, Arc::clone(&fetch)).await?;
    feed_demo(&config, Arc::clone(&fetch)).await?;
    form_demo(&config).await?;

    if let Some(text) = exporter.render() {
        println!("{text}");
    }
    Ok(())
}

async fn cart_demo(config: &ShowcaseConfig, fetch: Arc<dyn Fetch>) -> anyhow::Result<()> {
    let cart = CartStore::new();
    let keyboard = Product::new(1, "Keyboard", 49.99);
    let mouse = Product::new(2, "Mouse", 19.5);

    cart.add_to_cart(keyboard.clone()).await?;
    cart.add_to_cart(mouse.clone()).await?;
    cart.increase(keyboard.id).await?;
    cart.decrease(mouse.id).await?;

    info!(
        items = cart.total_items().get(),
        total = cart.total_price().get(),
        "Cart updated"
    );

    if let Some(url) = &config.products_url {
        let catalog = ProductCatalog::new(url.clone(), fetch);
        match catalog.search("phone").await {
            Ok(products) => info!(matches = products.len(), "Catalog searched"),
            Err(error) => warn!(%error, "Catalog search failed"),
        }
    }

    cart.dispose();
    Ok(())
}

async fn dashboard_demo(config: &ShowcaseConfig, fetch: Arc<dyn Fetch>) -> anyhow::Result<()> {
    let poller_config = PollerConfig::new(config.users_url.clone())
        .with_interval(Duration::from_millis(config.poll_interval_ms));
    let dashboard = DashboardPoller::new(poller_config, fetch, Arc::new(SystemClock));

    let mut stats = dashboard.stats();
    match tokio::time::timeout(Duration::from_secs(30), stats.changed()).await {
        Ok(Some(Some(latest))) => info!(
            total_users = latest.total_users,
            active_users = latest.active_users,
            today_revenue = latest.today_revenue,
            "Dashboard stats received"
        ),
        Ok(_) => warn!(error = ?dashboard.current_state().error, "Dashboard produced no stats"),
        Err(_) => warn!("Timed out waiting for dashboard stats"),
    }

    dashboard.pause().await?;
    dashboard.refresh().await?;
    info!(paused = dashboard.is_paused().get(), "Dashboard paused, manual refresh issued");

    drop(stats);
    info!(subscribers = dashboard.subscriber_count(), "Dashboard unobserved");
    dashboard.dispose();
    Ok(())
}

async fn feed_demo(config: &ShowcaseConfig, fetch: Arc<dyn Fetch>) -> anyhow::Result<()> {
    let feed_config = FeedConfig::new(config.posts_url.clone()).with_page_size(config.page_size);
    let feed = FeedPaginator::new(feed_config, fetch);

    for _ in 0..2 {
        let mut page = feed.load_more().await?;
        // Dropped: the page above is still loading
        feed.load_more().await?;
        page.wait().await;
    }

    let state = feed.current_state();
    info!(
        posts = state.posts.len(),
        page = state.current_page,
        has_more = state.has_more,
        error = ?state.error,
        "Feed loaded"
    );

    feed.dispose();
    Ok(())
}

async fn form_demo(config: &ShowcaseConfig) -> anyhow::Result<()> {
    let validator_config = ValidatorConfig::new().with_min_password_length(config.min_password_length);
    let window = validator_config.debounce;
    let form = FormValidator::start(validator_config).await?;

    form.set_email("ada@example").await?;
    form.set_password("abc").await?;
    form.set_confirm_password("abd").await?;
    for field in Field::ALL {
        form.blur(field).await?;
    }
    tokio::time::sleep(window * 2).await;

    for error in form.validation_errors().get() {
        info!(field = %error.field, message = ?error.message, "Field validated");
    }

    let outcome = form.submit().await?;
    info!(accepted = outcome.is_accepted(), "Form submitted");

    form.set_password("correct horse").await?;
    form.set_confirm_password("correct horse").await?;
    let outcome = form.submit().await?;
    info!(accepted = outcome.is_accepted(), valid = ?form.is_form_valid().get(), "Form resubmitted");

    form.dispose();
    Ok(())
}
