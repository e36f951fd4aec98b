use crate::modules::action::{PostRef, Session};
use crate::modules::perception::Headline;

/// 已成功发布的一条帖子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tiding {
    pub text: String,
    pub uri: String,
    pub cid: String,
}

impl Tiding {
    pub fn new(text: impl Into<String>, post: PostRef) -> Self {
        Self { text: text.into(), uri: post.uri, cid: post.cid }
    }

    pub fn post_ref(&self) -> PostRef {
        PostRef::new(self.uri.clone(), self.cid.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

/// Everything one run owns. Built fresh per run and emptied when it ends.
#[derive(Debug, Default)]
pub struct RunContext {
    pub(crate) headlines: Vec<Headline>,
    pub(crate) tidings: Vec<Tiding>,
    pub(crate) auth: AuthState,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn headlines(&self) -> &[Headline] {
        &self.headlines
    }

    #[allow(dead_code)]
    pub fn tidings(&self) -> &[Tiding] {
        &self.tidings
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.auth, AuthState::LoggedIn(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.auth {
            AuthState::LoggedIn(session) => Some(session),
            AuthState::LoggedOut => None,
        }
    }

    pub fn reset(&mut self) {
        self.headlines.clear();
        self.tidings.clear();
        self.auth = AuthState::LoggedOut;
    }
}
