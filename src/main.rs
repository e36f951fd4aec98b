mod config;
mod utils;
mod modules;

use std::process::ExitCode;
use std::sync::Arc;
use anyhow::Context;
use chrono::Utc;
use dotenvy::dotenv;
use tokio::time::sleep;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

use crate::config::{CrierProfile, Credentials, ScheduleMode};
use crate::utils::http_client::HttpClientFactory;
use crate::utils::schedule::{next_daily_run, until_next_run};
use crate::modules::perception::RssHeadlineSource;
use crate::modules::brain::ChatTransformer;
use crate::modules::action::BlueskyPublisher;
use crate::modules::thread::{ThreadBuilder, ThreadSettings};

/// One run; `true` when the whole thread went out.
async fn run_once(crier: &ThreadBuilder) -> bool {
    info!("==================== 📯 CRIER RUN ====================");
    match crier.run().await {
        Ok(summary) => {
            if let Some(root) = summary.tidings.first() {
                info!("📜 Thread root: {}", root.uri);
            }
            true
        }
        Err(e) => {
            error!("🔥 Run aborted: {:#}", anyhow::Error::from(e));
            false
        }
    }
}

async fn start() -> anyhow::Result<ExitCode> {
    let profile = CrierProfile::load().context("Failed to load crier config")?;
    info!("📋 Feed: {} | Intro: {:?} | Schedule: {:?}", profile.feed.url, profile.intro.mode, profile.schedule.mode);

    // 1. 基础设施初始化
    let std_client = HttpClientFactory::create()?;
    let llm_client = HttpClientFactory::create_llm()?;

    // 2. 模块初始化
    let source = Arc::new(RssHeadlineSource::new(std_client.clone()));
    let transformer = Arc::new(ChatTransformer::new(llm_client, &profile.llm));
    let publisher = Arc::new(BlueskyPublisher::new(std_client, profile.bluesky.service.clone()));

    let crier = ThreadBuilder::new(
        source,
        transformer,
        publisher,
        ThreadSettings::from_profile(&profile),
        Credentials::from_env(),
    );

    match profile.schedule.mode {
        ScheduleMode::Once => {
            let ok = run_once(&crier).await;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        ScheduleMode::Daily => {
            let at = profile.daily_trigger()?;
            loop {
                let now = Utc::now();
                let wait = until_next_run(now, at);
                info!("💤 Next run at {} (in {}s)", next_daily_run(now, at).format("%Y-%m-%d %H:%M UTC"), wait.as_secs());
                sleep(wait).await;
                run_once(&crier).await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Starting Town Crier v{}...", env!("CARGO_PKG_VERSION"));

    match start().await {
        Ok(code) => code,
        Err(e) => {
            error!("CRITICAL: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
