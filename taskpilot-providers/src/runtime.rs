use crate::request::{Body, HttpRequest};
use anyhow::{Context, anyhow};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use taskpilot_core::config::HttpTimeouts;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    // Kept as text so a failed status can still show the server's message.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

pub fn build_client(timeouts: &HttpTimeouts) -> anyhow::Result<reqwest::Client> {
    // Without an explicit timeout a stalled endpoint would leave the caller waiting forever.
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect())
        .timeout(timeouts.request())
        .build()
        .context("build http client")
}

pub async fn execute(client: &reqwest::Client, req: &HttpRequest) -> anyhow::Result<HttpResponse> {
    let mut headers = HeaderMap::new();
    for (k, v) in &req.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name: {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    let builder = match req.method.as_str() {
        "GET" => client.get(&req.url),
        "POST" => client.post(&req.url),
        other => return Err(anyhow!("unsupported method: {other}")),
    }
    .headers(headers);

    let builder = match &req.body {
        Body::Empty => builder,
        Body::Json(s) => builder.body(s.clone()),
    };

    log::debug!("sending {req:?}");

    let resp = builder.send().await.context("http request failed")?;
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .context("failed reading response body")?;

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_status_and_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("x-test", "1"))
            .and(body_string("{\"a\":1}"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"msg\":\"bad key\"}"))
            .mount(&server)
            .await;

        let client = build_client(&HttpTimeouts::default()).unwrap();
        let req = HttpRequest::post_json(format!("{}/echo", server.uri()), "{\"a\":1}".into())
            .with_header("x-test", "1");

        let resp = execute(&client, &req).await.unwrap();
        assert_eq!(resp.status, 401);
        assert!(!resp.is_success());
        assert_eq!(resp.body, "{\"msg\":\"bad key\"}");
    }

    #[tokio::test]
    async fn rejects_unknown_method() {
        let client = build_client(&HttpTimeouts::default()).unwrap();
        let req = HttpRequest {
            method: "PATCH".into(),
            url: "http://127.0.0.1:9".into(),
            headers: vec![],
            body: Body::Empty,
        };
        assert!(execute(&client, &req).await.is_err());
    }
}
