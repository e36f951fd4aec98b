use thiserror::Error;

/// Why a run stopped early. Per-headline rewrite failures are skipped, not reported here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("could not write the {stage}")]
    Transform {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Bluesky login failed")]
    Auth(#[source] anyhow::Error),

    #[error("publishing the {step} failed")]
    Publish {
        step: String,
        #[source]
        source: anyhow::Error,
    },
}

impl RunError {
    pub fn missing_credentials() -> Self {
        RunError::Configuration("Missing Bluesky credentials (BLUESKY_USERNAME / BLUESKY_PASSWORD)".to_string())
    }
}
