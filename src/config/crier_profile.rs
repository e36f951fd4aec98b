use serde::Deserialize;
use config::{Config, Environment, File};
use anyhow::{Result, Context};
use chrono::NaiveTime;
use std::env;
use std::fmt;

pub const DEFAULT_PERSONA_PROMPT: &str = "You are a medieval town crier. You will take the text provided by the input and rewrite it. \
Your response will be a max of 280 characters. Ignore the news source citation on the input. \
No need to provide an introduction or opening like 'Hear ye!' or 'Hark', you can jump right into the news.";

pub const DEFAULT_INTRO_PROMPT: &str = "You are a medieval crier. Speak mainly modernly with some old english prose. \
Respond no longer than 280 characters.";

pub const DEFAULT_GREETING: &str = "Hear ye, hear ye! The crier hath the morning's tidings. Gather 'round and read on.";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShortFeedPolicy {
    /// Feed shorter than `headline_count`: post no headlines at all.
    Discard,
    /// Feed shorter than `headline_count`: post whatever is there.
    Keep,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntroMode {
    /// Fixed greeting, no model call.
    Static,
    /// Model-written teaser over every headline.
    Teaser,
    /// The first headline, rewritten, anchors the thread.
    FirstHeadline,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    Once,
    Daily,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub headline_count: usize,
    pub short_feed: ShortFeedPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub persona_prompt: String,
    pub intro_prompt: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlueskyConfig {
    pub service: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntroConfig {
    pub mode: IntroMode,
    pub greeting: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    /// UTC, `HH:MM`.
    pub daily_at: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrierProfile {
    pub feed: FeedConfig,
    pub llm: LlmConfig,
    pub bluesky: BlueskyConfig,
    pub intro: IntroConfig,
    pub schedule: ScheduleConfig,
}

impl CrierProfile {
    /// 读取 crier_config.{toml,yaml,json} (可选) + CRIER__* 环境变量覆盖
    pub fn load() -> Result<Self> {
        Self::load_from("crier_config")
    }

    pub fn load_from(name: &str) -> Result<Self> {
        let settings = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("CRIER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let profile: CrierProfile = settings.try_deserialize()?;
        profile.validate()?;
        Ok(profile)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(builder
            .set_default("feed.url", "https://news.google.com/rss")?
            .set_default("feed.headline_count", 3)?
            .set_default("feed.short_feed", "discard")?
            .set_default("llm.base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4o")?
            .set_default("llm.persona_prompt", DEFAULT_PERSONA_PROMPT)?
            .set_default("llm.intro_prompt", DEFAULT_INTRO_PROMPT)?
            .set_default("bluesky.service", "https://bsky.social")?
            .set_default("intro.mode", "teaser")?
            .set_default("intro.greeting", DEFAULT_GREETING)?
            .set_default("schedule.mode", "once")?
            .set_default("schedule.daily_at", "12:30")?)
    }

    fn validate(&self) -> Result<()> {
        if self.feed.headline_count == 0 {
            anyhow::bail!("feed.headline_count must be at least 1");
        }
        self.daily_trigger()?;
        Ok(())
    }

    pub fn daily_trigger(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.schedule.daily_at.trim(), "%H:%M")
            .with_context(|| format!("schedule.daily_at '{}' is not HH:MM", self.schedule.daily_at))
    }
}

/// Bluesky 登录凭据，只从环境变量读取
#[derive(Clone, Default)]
pub struct Credentials {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            identifier: env::var("BLUESKY_USERNAME").ok(),
            password: env::var("BLUESKY_PASSWORD").ok(),
        }
    }

    #[allow(dead_code)]
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            password: Some(password.into()),
        }
    }

    /// Both halves present and non-blank.
    pub fn pair(&self) -> Option<(&str, &str)> {
        let id = self.identifier.as_deref().filter(|s| !s.trim().is_empty())?;
        let pw = self.password.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((id, pw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_settings_file() {
        let profile = CrierProfile::load_from("does_not_exist_crier_config").unwrap();
        assert_eq!(profile.feed.url, "https://news.google.com/rss");
        assert_eq!(profile.feed.headline_count, 3);
        assert_eq!(profile.feed.short_feed, ShortFeedPolicy::Discard);
        assert_eq!(profile.intro.mode, IntroMode::Teaser);
        assert_eq!(profile.schedule.mode, ScheduleMode::Once);
        assert_eq!(profile.llm.model, "gpt-4o");
        assert_eq!(profile.daily_trigger().unwrap(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
    }

    #[test]
    fn blank_credentials_are_missing() {
        assert!(Credentials::default().pair().is_none());
        assert!(Credentials::new("crier.bsky.social", "   ").pair().is_none());
        assert!(Credentials::new("", "hunter2").pair().is_none());
        assert_eq!(
            Credentials::new("crier.bsky.social", "hunter2").pair(),
            Some(("crier.bsky.social", "hunter2"))
        );
    }

    #[test]
    fn debug_output_hides_the_password() {
        let rendered = format!("{:?}", Credentials::new("crier.bsky.social", "hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("crier.bsky.social"));
    }
}
