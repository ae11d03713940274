use crate::config::{Config, PROBE_TIMEOUT};
use crate::traits::FileCheck;
use crate::types::{Routing, Track};
use async_trait::async_trait;
use reqwest::redirect;
use reqwest::Client;

/// 资产发行形态, 由下载 URL 的扩展名判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// .exe 安装包
    Installer,
    /// .zip 便携包
    Archive,
    /// 其余文件原样放行
    Other,
}

impl AssetKind {
    pub fn of(url: &str) -> Self {
        if url.ends_with(".exe") {
            AssetKind::Installer
        } else if url.ends_with(".zip") {
            AssetKind::Archive
        } else {
            AssetKind::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Installer => "installer",
            AssetKind::Archive => "portable archive",
            AssetKind::Other => "other",
        }
    }
}

/// 乐观渲染下载地址, 不做任何网络请求
///
/// 安装包走最快镜像代理; 便携包在区域渠道可用时改走区域渠道;
/// 其余文件一律原样返回。
pub fn render_url(cfg: &Config, routing: &Routing, url: &str, track: Track) -> String {
    match AssetKind::of(url) {
        AssetKind::Installer => mirror_proxied(routing, url),
        AssetKind::Archive if routing.regional_available => {
            regional_url(cfg, track, file_name(url))
        }
        AssetKind::Archive => mirror_proxied(routing, url),
        AssetKind::Other => url.to_string(),
    }
}

/// 下载前的最终定址, 含点击时刻的存在性复查
///
/// 区域渠道的同步有延迟, 渲染时在而点击时可能还没同步到;
/// 复查失败就退回镜像代理的原始地址。
pub async fn download_url(
    cfg: &Config,
    routing: &Routing,
    check: &dyn FileCheck,
    url: &str,
    track: Track,
) -> String {
    if AssetKind::of(url) == AssetKind::Archive && routing.regional_available {
        let candidate = regional_url(cfg, track, file_name(url));
        if check.exists(&candidate).await {
            return candidate;
        }
        return mirror_proxied(routing, url);
    }
    render_url(cfg, routing, url, track)
}

/// 探测区域渠道是否可达
///
/// 对渠道内一个已知小文件做 HEAD, 4xx/5xx 与网络错误都算不可用。
pub async fn probe_regional_channel(cfg: &Config) -> bool {
    let client = Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .unwrap_or_default();

    let url = format!(
        "{}{}/{}",
        cfg.regional.base, cfg.regional.official_path, cfg.regional.probe_file
    );

    match client.head(&url).send().await {
        Ok(resp) => resp.status().as_u16() < 400,
        Err(_) => false,
    }
}

fn mirror_proxied(routing: &Routing, url: &str) -> String {
    match &routing.fastest_mirror {
        Some(mirror) => format!("{}/{}", mirror, url),
        None => url.to_string(),
    }
}

fn regional_url(cfg: &Config, track: Track, file: &str) -> String {
    format!("{}{}/{}", cfg.regional.base, cfg.channel_path(track), file)
}

fn file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// 基于 HEAD 请求的存在性检查
pub struct HttpFileCheck {
    client: Client,
}

impl HttpFileCheck {
    pub fn new() -> Self {
        // 不跟随重定向: 302 本身就是判定信号
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl FileCheck for HttpFileCheck {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                // 该存储对存在的文件会回 302 跳转或 403 拒绝直链, 都按"在"处理。
                // 观察出来的约定, 上游没有任何承诺, 真拿权限问题当存在也认了。
                status.is_success() || matches!(status.as_u16(), 302 | 403)
            }
            Err(_) => false,
        }
    }
}
