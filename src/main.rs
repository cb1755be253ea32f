//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、日志初始化，并以命令行方式驱动识别与封面下载。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use jinjiang::core::model::Identifiers;
use jinjiang::interfaces::Fetcher;
use jinjiang::sites::jinjiang::PROVIDER_ID;
use jinjiang::utils::image_extension;
use jinjiang::{
    AppConfig, HttpFetcher, LookupQuery, MetadataSource, SourceEvent, SourceRegistry,
    create_result_channel,
};

/// 命令行界面脚手架 (CLI Scaffolding)
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 元数据源标识符
    #[arg(short, long, default_value = PROVIDER_ID, global = true)]
    source: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct LookupArgs {
    /// 书籍 id (novelid)
    #[arg(short, long)]
    id: Option<String>,
    /// 书名
    #[arg(short, long)]
    title: Option<String>,
    /// 作者，可重复
    #[arg(short, long)]
    author: Vec<String>,
    /// 单次请求超时 (秒)，缺省取配置
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// 识别书籍元数据，每条结果输出一行 JSON
    Identify {
        #[command(flatten)]
        lookup: LookupArgs,
    },
    /// 下载封面到指定目录
    Cover {
        #[command(flatten)]
        lookup: LookupArgs,
        /// 输出目录
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// 只需要最佳封面
        #[arg(long)]
        best: bool,
    },
}

impl LookupArgs {
    fn into_query(self, config: &AppConfig) -> LookupQuery {
        let mut identifiers = Identifiers::new();
        if let Some(id) = self.id {
            identifiers.insert(PROVIDER_ID.to_string(), id);
        }
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.network.timeout());

        LookupQuery::builder()
            .maybe_title(self.title)
            .authors(self.author)
            .identifiers(identifiers)
            .timeout(timeout)
            .build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 遥测层初始化 (Telemetry Layer Initialization)
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true)
        .init();

    let config = AppConfig::load()?;
    let cli = Cli::parse();

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.network)?);
    let registry = SourceRegistry::new();
    let Some(source) = registry.create(&cli.source, &config, fetcher) else {
        tracing::error!("Unknown source identifier: {} (available: {:?})", cli.source, registry.list());
        return Ok(());
    };

    // 信号处理 (Signal Handling)
    let abort = CancellationToken::new();
    let abort_clone = abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort_clone.cancel();
        }
    });

    let (results, receiver) = create_result_channel();

    match cli.command {
        Commands::Identify { lookup } => {
            let query = lookup.into_query(&config);
            let count = source.identify(&query, &results, &abort).await;
            drop(results);

            for record in receiver.drain_metadata() {
                println!("{}", serde_json::to_string(&record)?);
            }
            tracing::info!("{} record(s) from {}", count, source.info().name);
        }
        Commands::Cover {
            lookup,
            output,
            best,
        } => {
            let query = lookup.into_query(&config);
            let count = source.download_cover(&query, best, &results, &abort).await;
            drop(results);

            tokio::fs::create_dir_all(&output).await?;
            let mut n = 0;
            while let Some(event) = receiver.recv_async().await {
                if let SourceEvent::Cover { source, data } = event {
                    n += 1;
                    let path = output.join(format!("cover_{}.{}", n, image_extension(&data)));
                    tokio::fs::write(&path, &data).await?;
                    tracing::info!("saved cover from {} to {}", source, path.display());
                }
            }
            tracing::info!("{} cover(s) downloaded", count);
        }
    }

    Ok(())
}
