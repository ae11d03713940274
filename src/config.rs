use crate::error::Result;
use crate::types::Track;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

// Include the TOML file at compile time
const DEFAULT_CONFIG: &str = include_str!("../assets/ghrelay.toml");

/// 单个探测请求的超时 (竞速与存在性检查共用)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// 完整元数据请求的超时
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_AGENT: &str = concat!("ghrelay/", env!("CARGO_PKG_VERSION"));

/// 端点与镜像配置
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// 规范 API 地址, 以 / 结尾 (如 "https://api.github.com/repos/")
    pub api_base: String,
    /// 正式版仓库 (owner/repo)
    pub official_repo: String,
    /// 测试版仓库 (owner/repo)
    pub beta_repo: String,
    /// 镜像代理地址, 不带末尾 /, 按优先级排列
    pub mirrors: Vec<String>,
    pub regional: RegionalChannel,
}

/// 区域分发渠道 (低延迟文件直链站点)
#[derive(Debug, Clone, Deserialize)]
pub struct RegionalChannel {
    /// 站点根地址, 不带末尾 /
    pub base: String,
    /// 正式版目录, 以 / 开头
    pub official_path: String,
    /// 测试版目录, 以 / 开头
    pub beta_path: String,
    /// 可用性探测用的文件名
    pub probe_file: String,
}

impl Config {
    /// Load the endpoint configuration.
    /// Strategy:
    /// 1. Use the user override (~/.config/ghrelay/ghrelay.toml) when it exists;
    ///    an unreadable or unparsable override is an error, not a silent fallback.
    /// 2. Otherwise fall back to the built-in assets/ghrelay.toml.
    pub fn load() -> Result<Config> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ghrelay") {
            let config_path = proj_dirs.config_dir().join("ghrelay.toml");
            if config_path.exists() {
                println!("Loaded endpoint config from: {:?}", config_path);
                return Self::read_file(&config_path);
            }
        }

        Ok(Self::builtin())
    }

    fn read_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// 内置默认配置
    pub fn builtin() -> Config {
        toml::from_str(DEFAULT_CONFIG)
            .expect("Failed to parse assets/ghrelay.toml. This is a compile-time error.")
    }

    /// 指定轨道在区域渠道上的目录
    pub fn channel_path(&self, track: Track) -> &str {
        match track {
            Track::Official => &self.regional.official_path,
            Track::Beta => &self.regional.beta_path,
        }
    }
}
