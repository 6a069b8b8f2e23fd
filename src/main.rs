// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # ElServe 静态文件服务器
//!
//! 程序入口：解析命令行、加载配置与 MIME 表、初始化日志，
//! 然后在 tokio 多线程运行时上启动监听循环，直到收到 SIGINT。

use std::{path::Path, process::ExitCode, sync::Arc};

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::runtime::Builder;

use elserve::{
    server, util::format_size, Args, Config, MimeTable, PageCache, Responder,
};

const LOG_CONFIG_FILE: &str = "config/log4rs.yaml";

fn main() -> ExitCode {
    let args = Args::parse();

    // 1. 初始化日志系统：优先使用 YAML 配置，缺失时退回到控制台输出
    init_logging(Path::new(LOG_CONFIG_FILE));

    // 2. 载入配置，命令行参数覆盖配置文件
    let config = Config::load(&args);
    info!("配置文件已载入");
    info!("site root: {}", config.site_root().display());
    info!("error site root: {}", config.error_site_root().display());

    // 3. MIME 表在启动时构建一次，之后只读
    let mime = match MimeTable::from_json(config.mime_types()) {
        Ok(table) => table,
        Err(e) => {
            warn!("{}，使用内置MIME类型表", e);
            MimeTable::builtin()
        }
    };

    // 4. 按配置的工作线程数构建运行时
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("无法创建tokio运行时：{}", e);
            return ExitCode::FAILURE;
        }
    };

    let capacity = config.cache_capacity();
    if capacity == 0 {
        info!("缓存已禁用");
    } else {
        info!("缓存容量：{}", format_size(capacity));
    }
    let cache = Arc::new(PageCache::from_capacity(capacity));
    let config = Arc::new(config);
    let responder = Arc::new(Responder::new(Arc::clone(&config), cache, Arc::new(mime)));

    let code = runtime.block_on(async move {
        let listener = match server::bind(config.host(), config.port()).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        info!("Server Started...");
        info!("Listening on http://{}:{}", config.host(), config.port());
        info!("Press Ctrl+C to exit.");

        tokio::select! {
            _ = server::serve(listener, responder) => {}
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    error!("无法监听SIGINT：{}", e);
                    return ExitCode::FAILURE;
                }
                println!("\nStopping Server.....");
                info!("收到SIGINT，服务器退出");
            }
        }
        ExitCode::SUCCESS
    });

    // 正在处理的连接不会被等待
    runtime.shutdown_background();
    code
}

fn init_logging(path: &Path) {
    let err = match log4rs::init_file(path, Default::default()) {
        Ok(()) => return,
        Err(e) => e,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config {
        Ok(config) => {
            if log4rs::init_config(config).is_ok() {
                warn!("无法从{}初始化日志：{}，使用控制台输出", path.display(), err);
            }
        }
        Err(e) => eprintln!("无法初始化日志系统：{}", e),
    }
}
