use crate::config::Config;
use crate::types::{Endpoint, Routing, Via};

/// 为一个 API 路径构造有序候选列表
///
/// 顺序固定: 最快镜像(若已测出) -> 规范源 -> 配置中的全部镜像。
/// 按完整 URL 精确去重, 保留首次出现的位置。
pub fn build_api_urls(cfg: &Config, routing: &Routing, path: &str) -> Vec<Endpoint> {
    let mut urls = Vec::new();

    if let Some(fastest) = &routing.fastest_mirror {
        push_unique(
            &mut urls,
            Endpoint::new(format!("{}/{}{}", fastest, cfg.api_base, path), Via::Fastest),
        );
    }
    push_unique(
        &mut urls,
        Endpoint::new(format!("{}{}", cfg.api_base, path), Via::Canonical),
    );
    for mirror in &cfg.mirrors {
        push_unique(
            &mut urls,
            Endpoint::new(
                format!("{}/{}{}", mirror, cfg.api_base, path),
                Via::Mirror(mirror.clone()),
            ),
        );
    }

    urls
}

/// 竞速用候选: 规范源在前, 镜像按配置顺序随后
///
/// 探测路径统一取主仓库的 releases/latest, 与实际请求同构。
pub fn probe_candidates(cfg: &Config) -> Vec<Endpoint> {
    let path = format!("{}/releases/latest", cfg.official_repo);
    let mut out = vec![Endpoint::new(
        format!("{}{}", cfg.api_base, path),
        Via::Canonical,
    )];
    for mirror in &cfg.mirrors {
        out.push(Endpoint::new(
            format!("{}/{}{}", mirror, cfg.api_base, path),
            Via::Mirror(mirror.clone()),
        ));
    }
    out
}

fn push_unique(urls: &mut Vec<Endpoint>, candidate: Endpoint) {
    if !urls.iter().any(|e| e.url == candidate.url) {
        urls.push(candidate);
    }
}
