use reqwest::Client;
use anyhow::{Result, anyhow, Context};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::env;

use crate::config::crier_profile::LlmConfig;

use tracing::{info, warn};

/// Rewrites a piece of text in the crier's voice.
#[async_trait]
pub trait TextTransformer: Send + Sync {
    /// `style` replaces the persona prompt for this call when given.
    async fn transform(&self, text: &str, style: Option<&str>) -> Result<String>;
}

/// OpenAI 兼容的 chat/completions 客户端
pub struct ChatTransformer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    persona_prompt: String,
}

impl ChatTransformer {
    pub fn new(client: Client, llm: &LlmConfig) -> Self {
        Self {
            client,
            api_key: env::var("OPENAI_KEY").unwrap_or_default(),
            base_url: llm.base_url.clone(),
            model: llm.model.clone(),
            persona_prompt: llm.persona_prompt.clone(),
        }
    }

    async fn call_llm(&self, sys_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": sys_prompt},
                {"role": "user", "content": user_prompt}
            ],
        });

        let resp = self.client.post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{} network error", self.model))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            warn!("⚠️ {} API Error ({}): {}", self.model, status, err);
            return Err(anyhow!("{} API returned {}", self.model, status));
        }

        let json_res: Value = resp.json().await
            .with_context(|| format!("{} returned a non-JSON body", self.model))?;

        extract_content(&json_res)
            .ok_or_else(|| anyhow!("{} response had no message content", self.model))
    }
}

#[async_trait]
impl TextTransformer for ChatTransformer {
    async fn transform(&self, text: &str, style: Option<&str>) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(anyhow!("OpenAI API Key missing. Check .env (OPENAI_KEY)"));
        }

        let system_prompt = style.unwrap_or(&self.persona_prompt);
        info!("🧠 [{}] Rewriting: {}", self.model, text.lines().next().unwrap_or_default());

        let raw = self.call_llm(system_prompt, text).await?;
        let cleaned = clean_reasoning_content(&raw).trim().to_string();
        if cleaned.is_empty() {
            return Err(anyhow!("{} returned an empty rewrite", self.model));
        }
        Ok(cleaned)
    }
}

fn extract_content(json_res: &Value) -> Option<String> {
    json_res["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}

/// 去掉推理模型输出的 <think>...</think> 段落
fn clean_reasoning_content(raw: &str) -> String {
    let mut clean = raw.to_string();
    if let Some(start) = clean.find("<think>") {
        if let Some(end) = clean.find("</think>") {
            if end > start {
                let mut before = clean[..start].to_string();
                let after = clean[end + "</think>".len()..].to_string();
                before.push_str(&after);
                clean = before;
            }
        }
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config() -> LlmConfig {
        LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            model: "gpt-4o".to_string(),
            persona_prompt: "persona".to_string(),
            intro_prompt: "intro".to_string(),
        }
    }

    #[test]
    fn strips_think_block() {
        let raw = "<think>the user wants a crier</think>Storms lash the coast, good folk!";
        assert_eq!(clean_reasoning_content(raw), "Storms lash the coast, good folk!");
    }

    #[test]
    fn leaves_plain_output_alone() {
        assert_eq!(clean_reasoning_content("Markets rally!"), "Markets rally!");
        assert_eq!(clean_reasoning_content("</think> odd <think>"), "</think> odd <think>");
    }

    #[test]
    fn pulls_first_choice_content() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hark, the markets rise!"}}]
        });
        assert_eq!(extract_content(&body).as_deref(), Some("Hark, the markets rise!"));
        assert_eq!(extract_content(&json!({"choices": []})), None);
    }

    #[tokio::test]
    async fn missing_key_fails_the_transform_without_a_request() {
        let transformer = ChatTransformer {
            client: Client::new(),
            api_key: String::new(),
            base_url: llm_config().base_url,
            model: llm_config().model,
            persona_prompt: llm_config().persona_prompt,
        };
        let err = transformer.transform("Storm hits coast", None).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_KEY"));
    }
}
