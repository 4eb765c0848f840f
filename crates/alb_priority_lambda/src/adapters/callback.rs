use reqwest::header::CONTENT_LENGTH;

/// Status and body returned by the callback endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReply {
    pub status_code: u16,
    pub body: String,
}

pub trait CallbackTransport {
    fn put_response(&self, url: &str, body: &[u8]) -> Result<CallbackReply, String>;
}

/// PUTs response documents over HTTP(S) with `reqwest`.
///
/// Must be called from a multi-threaded Tokio runtime.
pub struct HttpCallbackTransport {
    http_client: reqwest::Client,
}

impl HttpCallbackTransport {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl CallbackTransport for HttpCallbackTransport {
    fn put_response(&self, url: &str, body: &[u8]) -> Result<CallbackReply, String> {
        let client = self.http_client.clone();
        let target_url = url.to_string();
        let request_body = body.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(async move { put_callback(&client, target_url, request_body).await })
        })
    }
}

/// The URL is pre-signed; no extra authentication is attached.
async fn put_callback(
    client: &reqwest::Client,
    url: String,
    body: Vec<u8>,
) -> Result<CallbackReply, String> {
    let response = client
        .put(url)
        .header(CONTENT_LENGTH, body.len())
        .body(body)
        .send()
        .await
        .map_err(|error| format!("failed to send callback: {error}"))?;
    let status_code = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Ok(CallbackReply { status_code, body })
}
