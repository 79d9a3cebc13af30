use reqwest::{Method, StatusCode};
use snafu::prelude::*;

use super::error::variant::*;
use super::types::*;
use super::Result;

/// Default HTTP API root
pub static BASE_URL: &str = "https://discord.com/api/v9";

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Discord HTTP API Client
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// create a new api client, no auth is needed for the endpoints it calls
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .deflate(true)
            .user_agent(APP_USER_AGENT)
            .build()
            .context(ClientCreateFailed)?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// send requests to another API root, without trailing slash
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<R, P>(&self, path: &P) -> Result<R>
    where
        P: AsRef<str> + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path.as_ref());

        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|_| RequestFailed {
                method: Method::GET,
                url: &url,
            })?;

        ensure!(
            resp.status() == StatusCode::OK,
            HTTPStatusNotOK {
                method: Method::GET,
                url: &url,
                status_code: resp.status()
            }
        );

        let body = resp.bytes().await.with_context(|_| RequestFailed {
            method: Method::GET,
            url: &url,
        })?;

        serde_json::from_slice(&body).with_context(|_| ParseBodyFailed { body })
    }

    /// Call /gateway, get gateway url
    pub async fn gateway_url(&self) -> Result<String> {
        let data: GatewayIndexData = self.get("/gateway").await?;
        Ok(data.url)
    }
}

#[cfg(test)]
mod test {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;
    use crate::api::Error;

    /// Answer the first request with `status` and `body`, return the API root
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = vec![0; 4096];
            let _ = stream.read(&mut request).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_gateway_url() {
        let base = serve_once("200 OK", r#"{"url": "wss://gateway.discord.gg"}"#).await;
        let client = Client::new().unwrap().with_base_url(base);

        assert_eq!(client.gateway_url().await.unwrap(), "wss://gateway.discord.gg");
    }

    #[tokio::test]
    async fn test_gateway_url_bad_status() {
        let base = serve_once("502 Bad Gateway", "{}").await;
        let client = Client::new().unwrap().with_base_url(base);

        assert!(matches!(
            client.gateway_url().await,
            Err(Error::HTTPStatusNotOK { status_code, .. }) if status_code == StatusCode::BAD_GATEWAY
        ));
    }

    #[tokio::test]
    async fn test_gateway_url_bad_body() {
        let base = serve_once("200 OK", r#"{"gateway": 1}"#).await;
        let client = Client::new().unwrap().with_base_url(base);

        assert!(matches!(
            client.gateway_url().await,
            Err(Error::ParseBodyFailed { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "needs network access"]
    async fn test_live_gateway_url() {
        let url = Client::new().unwrap().gateway_url().await.unwrap();
        assert!(url.starts_with("wss://"));
    }
}
