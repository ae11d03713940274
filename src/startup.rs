use crate::config::Config;
use crate::endpoints;
use crate::race;
use crate::resolve;
use crate::traits::StatusSink;
use crate::types::{ProbeResult, Routing, Via};

/// 启动期路由决策
///
/// 先探测区域渠道, 可达就直接定稿, 不再竞速;
/// 不可达时才对规范源和全部镜像做一轮延迟竞速, 记下胜出镜像。
pub async fn resolve_routing(cfg: &Config, sink: &dyn StatusSink) -> Routing {
    sink.update("Checking regional channel...");
    if resolve::probe_regional_channel(cfg).await {
        return Routing {
            regional_available: true,
            fastest_mirror: None,
        };
    }

    sink.update("Racing mirrors...");
    let results = race::probe_all(endpoints::probe_candidates(cfg)).await;
    let fastest_mirror = race::select_fastest(&results).and_then(mirror_base_of);

    Routing {
        regional_available: false,
        fastest_mirror,
    }
}

/// 规范源胜出等价于不走镜像, 只有镜像胜出才记根地址
fn mirror_base_of(result: &ProbeResult) -> Option<String> {
    match &result.endpoint.via {
        Via::Mirror(base) => Some(base.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NullSink;
    use crate::types::Endpoint;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn canonical_winner_means_no_mirror() {
        let canonical = ProbeResult {
            endpoint: Endpoint::new("https://api.example/x", Via::Canonical),
            latency_ms: 12,
        };
        let mirror = ProbeResult {
            endpoint: Endpoint::new(
                "https://m.example/https://api.example/x",
                Via::Mirror("https://m.example".to_string()),
            ),
            latency_ms: 30,
        };

        assert!(mirror_base_of(&canonical).is_none());
        assert_eq!(mirror_base_of(&mirror).as_deref(), Some("https://m.example"));
    }

    async fn spawn_responder() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });
        format!("http://{}", addr)
    }

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

    #[tokio::test]
    async fn reachable_regional_channel_skips_the_race() {
        let raced = Arc::new(AtomicBool::new(false));
        let canary = spawn_canary(raced.clone()).await;

        let mut cfg = Config::builtin();
        cfg.regional.base = spawn_responder().await;
        cfg.regional.official_path = "/d/official".to_string();
        cfg.regional.probe_file = "probe.txt".to_string();
        // 竞速候选全指向哨兵, 被碰到就说明竞速没被跳过
        cfg.api_base = format!("{}/", canary);
        cfg.mirrors.clear();

        let routing = resolve_routing(&cfg, &NullSink).await;

        assert!(routing.regional_available);
        assert!(routing.fastest_mirror.is_none());
        assert!(!raced.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unreachable_regional_channel_races_and_keeps_the_winning_mirror() {
        let live_mirror = spawn_responder().await;

        let mut cfg = Config::builtin();
        cfg.regional.base = dead_address().await;
        cfg.regional.official_path = "/d/official".to_string();
        cfg.regional.probe_file = "probe.txt".to_string();
        // 规范源拒绝连接, 唯一镜像在线
        cfg.api_base = format!("{}/", dead_address().await);
        cfg.mirrors = vec![live_mirror.clone()];

        let routing = resolve_routing(&cfg, &NullSink).await;

        assert!(!routing.regional_available);
        assert_eq!(routing.fastest_mirror.as_deref(), Some(live_mirror.as_str()));
    }
}
