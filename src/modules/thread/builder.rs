use std::sync::Arc;
use anyhow::anyhow;
use tracing::{info, warn, error};

use crate::config::{CrierProfile, Credentials, IntroMode, ShortFeedPolicy};
use crate::modules::action::{PostRef, PostRequest, Publisher, ReplyLink, Session};
use crate::modules::brain::TextTransformer;
use crate::modules::perception::{Headline, HeadlineSource};

use super::context::{AuthState, RunContext, Tiding};
use super::error::RunError;

pub const MAX_POST_CHARS: usize = 280;

/// The knobs a run reads from the profile.
#[derive(Debug, Clone)]
pub struct ThreadSettings {
    pub feed_url: String,
    pub headline_count: usize,
    pub short_feed: ShortFeedPolicy,
    pub intro_mode: IntroMode,
    pub greeting: String,
    pub intro_prompt: String,
}

impl ThreadSettings {
    pub fn from_profile(profile: &CrierProfile) -> Self {
        Self {
            feed_url: profile.feed.url.clone(),
            headline_count: profile.feed.headline_count,
            short_feed: profile.feed.short_feed,
            intro_mode: profile.intro.mode,
            greeting: profile.intro.greeting.clone(),
            intro_prompt: profile.llm.intro_prompt.clone(),
        }
    }
}

/// What a finished run hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Root first, then replies in headline order.
    pub tidings: Vec<Tiding>,
    pub considered: usize,
    pub skipped: usize,
}

pub struct ThreadBuilder {
    source: Arc<dyn HeadlineSource>,
    transformer: Arc<dyn TextTransformer>,
    publisher: Arc<dyn Publisher>,
    settings: ThreadSettings,
    credentials: Credentials,
}

impl ThreadBuilder {
    pub fn new(
        source: Arc<dyn HeadlineSource>,
        transformer: Arc<dyn TextTransformer>,
        publisher: Arc<dyn Publisher>,
        settings: ThreadSettings,
        credentials: Credentials,
    ) -> Self {
        Self { source, transformer, publisher, settings, credentials }
    }

    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let mut ctx = RunContext::new();
        self.run_in(&mut ctx).await
    }

    /// Same as [`run`](Self::run) against a caller-owned context, which is
    /// always reset before returning.
    pub async fn run_in(&self, ctx: &mut RunContext) -> Result<RunSummary, RunError> {
        let outcome = self.drive(ctx).await;
        ctx.reset();
        outcome
    }

    async fn drive(&self, ctx: &mut RunContext) -> Result<RunSummary, RunError> {
        if self.credentials.pair().is_none() {
            return Err(RunError::missing_credentials());
        }

        ctx.headlines = self.gather_headlines().await;
        for (i, h) in ctx.headlines.iter().enumerate() {
            info!("📰 [{}] {} ({})", i + 1, h.title, h.link);
        }

        // 1. 开场白 (根帖)
        let (intro, consumed) = self.compose_intro(&ctx.headlines).await?;
        let root = self.post(ctx, PostRequest::Root { text: intro }, "intro").await?;

        // 2. 逐条回复，parent = 上一条成功发布的帖子
        let replies: Vec<Headline> = ctx.headlines.iter().skip(consumed).cloned().collect();
        let mut skipped = 0;

        for (i, headline) in replies.iter().enumerate() {
            let text = match self.rewrite(&headline.title, None).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("⚠️ Skipping headline '{}': {:#}", headline.title, e);
                    skipped += 1;
                    continue;
                }
            };

            let parent = ctx.tidings.last().map(Tiding::post_ref).unwrap_or_else(|| root.clone());
            let request = PostRequest::Reply {
                text,
                link: ReplyLink { root: root.clone(), parent },
            };
            self.post(ctx, request, &format!("reply #{}", i + 1)).await?;
        }

        let summary = RunSummary {
            tidings: std::mem::take(&mut ctx.tidings),
            considered: ctx.headlines.len(),
            skipped,
        };
        info!(
            "✅ Thread done: {} post(s), {} headline(s) considered, {} skipped",
            summary.tidings.len(), summary.considered, summary.skipped
        );
        Ok(summary)
    }

    async fn gather_headlines(&self) -> Vec<Headline> {
        let wanted = self.settings.headline_count;
        match self.source.fetch(&self.settings.feed_url, wanted).await {
            Ok(mut headlines) => {
                headlines.truncate(wanted);
                if headlines.len() < wanted {
                    warn!("⚠️ Not enough items in the RSS feed ({} of {})", headlines.len(), wanted);
                    if self.settings.short_feed == ShortFeedPolicy::Discard {
                        headlines.clear();
                    }
                }
                headlines
            }
            Err(e) => {
                error!("❌ Error fetching headlines: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Root text plus how many headlines it used up.
    async fn compose_intro(&self, headlines: &[Headline]) -> Result<(String, usize), RunError> {
        let intro_failed = |source| RunError::Transform { stage: "intro", source };

        match self.settings.intro_mode {
            IntroMode::Static => Ok((clamp_post_text(&self.settings.greeting), 0)),
            IntroMode::Teaser => {
                let prompt = teaser_prompt(headlines);
                let text = self.rewrite(&prompt, Some(self.settings.intro_prompt.as_str())).await
                    .map_err(intro_failed)?;
                Ok((text, 0))
            }
            IntroMode::FirstHeadline => {
                let first = headlines.first()
                    .ok_or_else(|| intro_failed(anyhow!("no headline to open the thread with")))?;
                let text = self.rewrite(&first.title, None).await.map_err(intro_failed)?;
                Ok((text, 1))
            }
        }
    }

    async fn rewrite(&self, text: &str, style: Option<&str>) -> anyhow::Result<String> {
        let rewritten = self.transformer.transform(text, style).await?;
        if rewritten.trim().is_empty() {
            return Err(anyhow!("rewrite came back empty"));
        }
        Ok(clamp_post_text(&rewritten))
    }

    async fn post(&self, ctx: &mut RunContext, request: PostRequest, step: &str) -> Result<PostRef, RunError> {
        let session = self.ensure_session(ctx).await?;
        let post = self.publisher.publish(&session, &request).await
            .map_err(|source| RunError::Publish { step: step.to_string(), source })?;

        info!("📜 Posted {}: {} ({})", step, post.uri, post.cid);
        ctx.tidings.push(Tiding::new(request.text(), post.clone()));
        Ok(post)
    }

    /// LoggedOut → LoggedIn on first use within a run.
    async fn ensure_session(&self, ctx: &mut RunContext) -> Result<Session, RunError> {
        if let Some(session) = ctx.session() {
            return Ok(session.clone());
        }

        let (identifier, password) = self.credentials.pair().ok_or_else(RunError::missing_credentials)?;
        match self.publisher.authenticate(identifier, password).await {
            Ok(session) => {
                ctx.auth = AuthState::LoggedIn(session.clone());
                Ok(session)
            }
            Err(e) => {
                ctx.auth = AuthState::LoggedOut;
                Err(RunError::Auth(e))
            }
        }
    }
}

fn teaser_prompt(headlines: &[Headline]) -> String {
    let mut lines = String::new();
    for headline in headlines {
        if headline.is_valid() {
            lines.push_str(&headline.to_teaser_line());
        } else {
            warn!("⚠️ Skipping invalid headline in teaser: {:?}", headline);
        }
    }
    format!(
        "Provide a light teaser of the news you will be announcing based on these headlines: \n{} Don't give the story away.",
        lines
    )
}

/// Cut to at most [`MAX_POST_CHARS`] characters, ending in an ellipsis when cut.
pub fn clamp_post_text(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_POST_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_POST_CHARS - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}
