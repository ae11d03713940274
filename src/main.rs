mod config;
mod endpoints;
mod error;
mod fetch;
mod race;
mod releases;
mod resolve;
mod startup;
mod traits;
mod types;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use config::Config;
use traits::StatusSink;
use types::{RepoInfo, Via};

#[derive(Parser)]
#[command(name = "ghrelay")]
#[command(about = "Mirror-raced release fetcher for InkCanvasForClass", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the regional channel, then race the API endpoints (e.g., ghrelay probe)
    Probe {
        /// Race the mirrors even when the regional channel is available
        #[arg(long, short)]
        all: bool,
    },
    /// Show repository stats (stars, forks, watchers)
    Repo,
    /// List the merged release timeline (e.g., ghrelay releases --beta)
    Releases {
        /// Include beta-track releases
        #[arg(long, short)]
        beta: bool,

        /// Maximum number of entries to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Resolve download URLs for a release (e.g., ghrelay resolve 1.7.19)
    Resolve {
        /// Release tag. If omitted, uses the newest release.
        tag: Option<String>,

        /// Only resolve assets whose file name contains this text
        #[arg(long, short)]
        asset: Option<String>,

        /// Search the beta track too
        #[arg(long, short)]
        beta: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load()?;

    match cli.command {
        Commands::Probe { all } => handle_probe(&cfg, all).await?,
        Commands::Repo => handle_repo(&cfg).await?,
        Commands::Releases { beta, limit } => handle_releases(&cfg, beta, limit).await?,
        Commands::Resolve { tag, asset, beta } => handle_resolve(&cfg, tag, asset, beta).await?,
    }

    Ok(())
}

/// 状态汇报直接落到标准输出
struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn update(&self, text: &str) {
        println!("{}", text);
    }
}

// --- Handlers ---

async fn handle_probe(cfg: &Config, all: bool) -> Result<()> {
    println!("Checking regional channel...");
    let regional = resolve::probe_regional_channel(cfg).await;
    println!(
        "Regional channel: {}",
        if regional { "available" } else { "unavailable" }
    );

    // 启动逻辑同款: 区域渠道在线就不竞速, --all 强制跑一轮看看
    if regional && !all {
        println!("Mirror race skipped. Run with --all to race anyway.");
        return Ok(());
    }

    let results = race::probe_all(endpoints::probe_candidates(cfg)).await;

    println!(); // Newline after progress bar
    println!(); // Additional newline for visual separation

    println!("{:<4} {:<10} {:<8} URL", "RANK", "LATENCY", "VIA");
    println!("{}", "-".repeat(60));

    for (i, res) in results.iter().enumerate() {
        let latency_str = if res.latency_ms == u64::MAX {
            "Timeout".to_string()
        } else {
            format!("{}ms", res.latency_ms)
        };

        println!(
            "{:<4} {:<10} {:<8} {}",
            i + 1,
            latency_str,
            res.endpoint.via_label(),
            res.endpoint.url
        );
    }

    // Recommendation
    if let Some(best) = race::select_fastest(&results) {
        println!("{}", "-".repeat(60));
        match &best.endpoint.via {
            Via::Mirror(base) => println!(
                "Recommendation: '{}' is the fastest ({}ms).",
                base, best.latency_ms
            ),
            _ => println!(
                "Recommendation: the canonical API is the fastest ({}ms), no mirror needed.",
                best.latency_ms
            ),
        }
    }

    Ok(())
}

async fn handle_repo(cfg: &Config) -> Result<()> {
    let sink = ConsoleSink;
    let routing = startup::resolve_routing(cfg, &sink).await;
    let client = fetch::http_client()?;

    let urls = endpoints::build_api_urls(cfg, &routing, &cfg.official_repo);
    let info: RepoInfo = match fetch::fetch_first(&client, &urls, "repository info", &sink).await {
        Some(info) => info,
        None => bail!("All endpoints failed. Please check your network connection."),
    };

    println!("{}", "-".repeat(40));
    println!("Repository: {}", cfg.official_repo);
    println!("{}", "-".repeat(40));
    println!("{:<10} {}", "Stars", info.stargazers_count);
    println!("{:<10} {}", "Forks", info.forks_count);
    println!("{:<10} {}", "Watchers", info.subscribers_count);
    println!("{}", "-".repeat(40));

    Ok(())
}

async fn handle_releases(cfg: &Config, beta: bool, limit: usize) -> Result<()> {
    let sink = ConsoleSink;
    let routing = startup::resolve_routing(cfg, &sink).await;
    let client = fetch::http_client()?;

    let timeline = releases::fetch_timeline(&client, cfg, &routing, beta, &sink).await;
    if timeline.is_empty() {
        bail!("No releases available. Please check your network connection.");
    }

    println!();
    println!(
        "{:<14} {:<10} {:<12} {:<7} NAME",
        "TAG", "TRACK", "PUBLISHED", "ASSETS"
    );
    println!("{}", "-".repeat(70));

    for item in timeline.iter().take(limit) {
        println!(
            "{:<14} {:<10} {:<12} {:<7} {}",
            item.release.tag_name,
            item.track().label(),
            item.release.published_at.format("%Y-%m-%d"),
            item.release.assets.len(),
            item.display_name(),
        );
    }
    println!("{}", "-".repeat(70));

    if timeline.len() > limit {
        println!(
            "... and {} more. Raise --limit to see them.",
            timeline.len() - limit
        );
    }

    Ok(())
}

async fn handle_resolve(
    cfg: &Config,
    tag: Option<String>,
    asset_filter: Option<String>,
    beta: bool,
) -> Result<()> {
    let sink = ConsoleSink;
    let routing = startup::resolve_routing(cfg, &sink).await;
    let client = fetch::http_client()?;

    let timeline = releases::fetch_timeline(&client, cfg, &routing, beta, &sink).await;

    let target = match &tag {
        Some(t) => timeline.iter().find(|c| c.release.tag_name == *t),
        None => timeline.first(),
    };
    let target = match target {
        Some(t) => t,
        None => match tag {
            Some(t) => bail!(
                "Release '{}' not found. Try --beta, or 'releases' to see the timeline.",
                t
            ),
            None => bail!("No releases available. Please check your network connection."),
        },
    };
    let track = target.track();

    println!();
    println!("Release: {} ({})", target.display_name(), track.label());
    println!("Link:    {}", target.release.html_url);

    // 取更新说明的第一行当摘要, 全文留给发布页
    let notes = target
        .release
        .body
        .as_deref()
        .and_then(|b| b.lines().find(|l| !l.trim().is_empty()));
    if let Some(line) = notes {
        let mut summary: String = line.trim().chars().take(60).collect();
        if line.trim().chars().count() > 60 {
            summary.push_str("...");
        }
        println!("Notes:   {}", summary);
    }
    println!("{}", "-".repeat(70));

    let check = resolve::HttpFileCheck::new();
    let mut shown = 0;

    for asset in &target.release.assets {
        let file = asset
            .browser_download_url
            .rsplit('/')
            .next()
            .unwrap_or_default();
        if let Some(ref filter) = asset_filter {
            if !file.contains(filter.as_str()) {
                continue;
            }
        }

        let kind = resolve::AssetKind::of(&asset.browser_download_url);
        // 定稿地址在点击时刻重查, 渲染期的判断可能已经过期
        let url = resolve::download_url(cfg, &routing, &check, &asset.browser_download_url, track)
            .await;
        let version =
            releases::display_version(&asset.browser_download_url, &target.release.tag_name);

        println!("File:    {}", file);
        println!("Kind:    {}", kind.label());
        println!("Version: {}", version);
        println!("Size:    {:.2} MB", asset.size as f64 / 1024.0 / 1024.0);
        println!("URL:     {}", url);
        println!("{}", "-".repeat(70));
        shown += 1;
    }

    if shown == 0 {
        match asset_filter {
            Some(f) => bail!("No asset matching '{}' in this release.", f),
            None => bail!("This release has no assets."),
        }
    }

    Ok(())
}
