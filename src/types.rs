use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 候选端点及其来历
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub via: Via,
}

/// 端点来历: 已发现的最快镜像 / 规范源 / 配置的镜像
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Via {
    Fastest,
    Canonical,
    Mirror(String), // 携带镜像根地址
}

impl Endpoint {
    pub fn new(url: impl Into<String>, via: Via) -> Self {
        Self {
            url: url.into(),
            via,
        }
    }

    pub fn via_label(&self) -> &'static str {
        match self.via {
            Via::Fastest => "fastest",
            Via::Canonical => "direct",
            Via::Mirror(_) => "mirror",
        }
    }
}

/// 测速结果
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub latency_ms: u64, // 延迟 (毫秒), 超时或传输失败设为 u64::MAX
}

/// 启动期解析出的路由结果; 会话内写一次, 其后只读
#[derive(Debug, Clone)]
pub struct Routing {
    pub regional_available: bool,
    /// 竞速胜出镜像的根地址; 未竞速或全部超时则为 None
    pub fastest_mirror: Option<String>,
}

impl Routing {
    /// 无镜像无区域渠道的保守路由, 等价于一切直连规范源
    #[cfg(test)]
    pub fn direct() -> Self {
        Self {
            regional_available: false,
            fastest_mirror: None,
        }
    }
}

/// 发布轨道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Official,
    Beta,
}

impl Track {
    pub fn label(&self) -> &'static str {
        match self {
            Track::Official => "official",
            Track::Beta => "beta",
        }
    }
}

/// GitHub release 原始记录
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// 发布附件
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub browser_download_url: String,
    pub size: u64,
}

/// 分类后的发布记录; beta 是派生标记, 不是上游字段
#[derive(Debug, Clone)]
pub struct ClassifiedRelease {
    pub release: Release,
    pub beta: bool,
}

impl ClassifiedRelease {
    pub fn track(&self) -> Track {
        if self.beta {
            Track::Beta
        } else {
            Track::Official
        }
    }

    /// 显示名, 缺失时退回 tag
    pub fn display_name(&self) -> &str {
        self.release
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.release.tag_name)
    }
}

/// 仓库统计信息
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub subscribers_count: u64,
}
