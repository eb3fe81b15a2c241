use gloo::net::http::Request;
use todo_core::{FetchError, HttpClient};

/// Browser `fetch` through gloo-net.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowserHttp;

impl HttpClient for BrowserHttp {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(FetchError::Status {
                status: response.status(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
