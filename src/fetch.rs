use crate::config::{FETCH_TIMEOUT, USER_AGENT};
use crate::error::Result;
use crate::traits::StatusSink;
use crate::types::Endpoint;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// 构建用于数据请求的 HTTP Client
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?;
    Ok(client)
}

/// 按列表顺序逐个尝试候选端点, 返回第一个可解码的成功响应
///
/// 严格串行, 不并发: 前一个候选彻底失败后才请求下一个。
/// 状态码非 2xx、网络错误、响应体解码失败都视为该候选失败。
/// 全部失败时通过 sink 上报资源名, 返回 None。
pub async fn fetch_first<T>(
    client: &Client,
    endpoints: &[Endpoint],
    label: &str,
    sink: &dyn StatusSink,
) -> Option<T>
where
    T: DeserializeOwned,
{
    for endpoint in endpoints {
        let request = client
            .get(&endpoint.url)
            .header("Accept", "application/vnd.github+json")
            .send();

        match request.await {
            Ok(resp) if resp.status().is_success() => {
                let body = match resp.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        eprintln!(
                            "Request to {} ({}) died mid-read: {}",
                            endpoint.url,
                            endpoint.via_label(),
                            err
                        );
                        continue;
                    }
                };

                match serde_json::from_str::<T>(&body) {
                    Ok(value) => return Some(value),
                    Err(err) => {
                        // 200 但解码不出来的源同样跳过, 常见于镜像回了人机校验页
                        eprintln!(
                            "Bad payload from {} ({}): {}",
                            endpoint.url,
                            endpoint.via_label(),
                            err
                        );
                    }
                }
            }
            Ok(resp) => {
                eprintln!(
                    "Request to {} ({}) failed with status {}",
                    endpoint.url,
                    endpoint.via_label(),
                    resp.status()
                );
            }
            Err(err) => {
                eprintln!("Request to {} ({}) failed: {}", endpoint.url, endpoint.via_label(), err);
            }
        }
    }

    sink.update(&format!("Failed to load {}", label));
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Via;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Deserialize)]
    struct Payload {
        value: u32,
    }

    struct RecordingSink(Mutex<Vec<String>>);

    impl StatusSink for RecordingSink {
        fn update(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    async fn spawn_responder(status: u16, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    /// 被连接过就点亮 flag, 用来证明后续候选根本没被碰
    async fn spawn_canary(flag: Arc<AtomicBool>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if listener.accept().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });
        format!("http://{}", addr)
    }

    async fn dead_address() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn endpoints_of(urls: &[String]) -> Vec<Endpoint> {
        urls.iter()
            .map(|u| Endpoint::new(u, Via::Mirror(u.clone())))
            .collect()
    }

    #[tokio::test]
    async fn first_decodable_success_wins_and_stops_the_walk() {
        let bad_status = spawn_responder(500, "{}").await;
        let refused = dead_address().await;
        let good = spawn_responder(200, r#"{"value":7}"#).await;
        let touched = Arc::new(AtomicBool::new(false));
        let canary = spawn_canary(touched.clone()).await;

        let endpoints = endpoints_of(&[bad_status, refused, good, canary]);
        let client = http_client().unwrap();
        let sink = RecordingSink(Mutex::new(Vec::new()));

        let payload: Option<Payload> =
            fetch_first(&client, &endpoints, "release data", &sink).await;

        assert_eq!(payload.unwrap().value, 7);
        assert!(!touched.load(Ordering::SeqCst));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn undecodable_success_falls_through_to_next_candidate() {
        let garbage = spawn_responder(200, "<html>rate limited</html>").await;
        let good = spawn_responder(200, r#"{"value":3}"#).await;

        let endpoints = endpoints_of(&[garbage, good]);
        let client = http_client().unwrap();
        let sink = RecordingSink(Mutex::new(Vec::new()));

        let payload: Option<Payload> =
            fetch_first(&client, &endpoints, "release data", &sink).await;

        assert_eq!(payload.unwrap().value, 3);
    }

    #[tokio::test]
    async fn exhaustion_notifies_sink_and_yields_none() {
        let bad_status = spawn_responder(502, "{}").await;
        let refused = dead_address().await;

        let endpoints = endpoints_of(&[bad_status, refused]);
        let client = http_client().unwrap();
        let sink = RecordingSink(Mutex::new(Vec::new()));

        let payload: Option<Payload> =
            fetch_first(&client, &endpoints, "repository info", &sink).await;

        assert!(payload.is_none());
        let messages = sink.0.lock().unwrap();
        assert_eq!(messages.as_slice(), ["Failed to load repository info"]);
    }
}
