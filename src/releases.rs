use crate::config::Config;
use crate::endpoints;
use crate::fetch;
use crate::traits::StatusSink;
use crate::types::{ClassifiedRelease, Release, Routing};
use regex::Regex;
use reqwest::Client;
use std::collections::HashSet;

// 从这个版本起 prerelease 字段才开始如实维护
const PRERELEASE_FLAG_SINCE: (u32, u32, u32) = (1, 7, 18);

/// 判定一条发布是否属于测试轨道
///
/// 新版本 (>= 1.7.18) 直接信 prerelease 字段;
/// 更早的版本该字段不可靠, 回退看它来自主仓库还是测试仓库。
pub fn classify(release: &Release, from_beta_repo: bool) -> bool {
    match version_triple(&release.tag_name) {
        Some(v) if v >= PRERELEASE_FLAG_SINCE => release.prerelease,
        _ => from_beta_repo,
    }
}

/// 从 tag 中提取前三段版本号; 解析不出来交回调用方按仓库来源判定
fn version_triple(tag: &str) -> Option<(u32, u32, u32)> {
    let re = Regex::new(r"(\d+)\.(\d+)\.(\d+)").ok()?;
    let caps = re.captures(tag)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps.get(3)?.as_str().parse().ok()?;
    Some((major, minor, patch))
}

/// 把两个仓库的发布合并成一条时间线
///
/// 逻辑:
/// 1. 各自按来源定轨道
/// 2. 主仓库在前拼接, 按 tag 去重 (先见者保留)
/// 3. 按发布时间从新到旧排序
/// 4. 不展示测试版时滤掉 beta 轨道
pub fn merge_timelines(
    official: Vec<Release>,
    beta: Vec<Release>,
    show_beta: bool,
) -> Vec<ClassifiedRelease> {
    let mut seen = HashSet::new();
    let mut merged: Vec<ClassifiedRelease> = official
        .into_iter()
        .map(|r| {
            let beta = classify(&r, false);
            ClassifiedRelease { release: r, beta }
        })
        .chain(beta.into_iter().map(|r| {
            let beta = classify(&r, true);
            ClassifiedRelease { release: r, beta }
        }))
        .filter(|c| seen.insert(c.release.tag_name.clone()))
        .collect();

    merged.sort_by(|a, b| b.release.published_at.cmp(&a.release.published_at));

    if !show_beta {
        merged.retain(|c| !c.beta);
    }

    merged
}

/// 从资产下载 URL 提取四段显示版本号, 取不到就回退 tag
///
/// 资产文件名形如 InkCanvasForClass.CE.1.7.19.533.zip, 比 tag 多一段构建号。
pub fn display_version(url: &str, tag: &str) -> String {
    Regex::new(r"(\d+(?:\.\d+){3})\.(?:zip|exe)$")
        .ok()
        .and_then(|re| {
            re.captures(url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_else(|| tag.to_string())
}

/// 拉取并合并完整发布时间线
///
/// 主仓库永远拉取; 测试仓库只在需要展示时才拉取。
pub async fn fetch_timeline(
    client: &Client,
    cfg: &Config,
    routing: &Routing,
    include_beta: bool,
    sink: &dyn StatusSink,
) -> Vec<ClassifiedRelease> {
    let official_urls =
        endpoints::build_api_urls(cfg, routing, &format!("{}/releases", cfg.official_repo));
    let official: Vec<Release> = fetch::fetch_first(client, &official_urls, "release data", sink)
        .await
        .unwrap_or_default();

    let beta = if include_beta {
        let beta_urls =
            endpoints::build_api_urls(cfg, routing, &format!("{}/releases", cfg.beta_repo));
        fetch::fetch_first(client, &beta_urls, "beta release data", sink)
            .await
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    merge_timelines(official, beta, include_beta)
}
