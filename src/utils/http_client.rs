use reqwest::Client;
use std::time::Duration;
use anyhow::Result;
use tracing::info;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// 通用 HTTP Client: RSS 与 Bluesky XRPC
    pub fn create() -> Result<Client> {
        let builder = Client::builder()
            .user_agent(concat!("town_crier/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(30)));

        info!("🌐 [Http Client] Ready");

        let client = builder.build()?;
        Ok(client)
    }

    /// 模型调用用的长超时 Client
    pub fn create_llm() -> Result<Client> {
        let builder = Client::builder()
            .user_agent(concat!("town_crier/", env!("CARGO_PKG_VERSION")))
            // 推理模型可能很慢
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .http1_only();

        let client = builder.build()?;
        Ok(client)
    }
}
