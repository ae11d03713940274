use crate::config::PROBE_TIMEOUT;
use crate::types::{Endpoint, ProbeResult};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::time::Instant;

/// 并发竞速所有候选端点的延迟
///
/// 逻辑:
/// 1. 构建带有超时设置的 HTTP Client
/// 2. 为每个候选生成一个异步任务 (Task)
/// 3. 并行等待所有任务完成 (join_all)
/// 4. 按延迟从小到大排序结果
pub async fn probe_all(candidates: Vec<Endpoint>) -> Vec<ProbeResult> {
    // 构建 Client, 强制设置超时
    let client = Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .unwrap_or_default();

    let pb = ProgressBar::new(candidates.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap()
            .progress_chars("|| "),
    );
    pb.set_message("Racing...");

    // 映射 Endpoint -> Future
    let tasks = candidates.into_iter().map(|endpoint| {
        let client = client.clone();
        let pb = pb.clone();
        async move {
            let res = probe_one(&client, endpoint).await;
            pb.inc(1);
            res
        }
    });

    // 并发执行所有 Future

    let mut results = futures::future::join_all(tasks).await;

    pb.finish_with_message("Race completed.");

    // 稳定排序: 延迟低的在前, 失败的(MAX)在后, 同延迟保持候选顺序

    results.sort_by_key(|r| r.latency_ms);

    results
}

/// 在结果集中选出赢家
///
/// 严格小于扫描: 并列延迟时先出现的候选获胜; 全部超时(MAX)视为无赢家。
pub fn select_fastest(results: &[ProbeResult]) -> Option<&ProbeResult> {
    let mut best: Option<&ProbeResult> = None;
    for result in results {
        if result.latency_ms == u64::MAX {
            continue;
        }
        match best {
            Some(b) if b.latency_ms <= result.latency_ms => {}
            _ => best = Some(result),
        }
    }
    best
}

/// 单个端点测速逻辑
async fn probe_one(client: &Client, endpoint: Endpoint) -> ProbeResult {
    let start = Instant::now();

    // 使用 HEAD 请求而不是 GET，只获取元数据，速度更快且省流量

    let request = client.head(&endpoint.url).send();

    let latency_ms = match request.await {
        Ok(_resp) => {
            // 任何 HTTP 响应都算可达: 镜像代理转发出 404/403 也说明代理本身在线

            start.elapsed().as_millis() as u64
        }

        Err(_) => {
            // 连接超时、DNS 解析失败等

            u64::MAX
        }
    };

    ProbeResult {
        endpoint,
        latency_ms,
    }
}
