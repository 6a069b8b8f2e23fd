use clap::Parser;
use log::{error, info, warn};
use serde_derive::Deserialize;
use serde_derive::Serialize;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "config/development.toml";

/// 命令行参数，优先级高于配置文件
#[derive(Debug, Clone, Parser)]
#[command(name = "elserve")]
#[command(about = "Run a local HTTP Web Server.\n\nNOTE: Use only for educational purpose. DO NOT USE IN PRODUCTION")]
#[command(version)]
pub struct Args {
    /// Address the server listens on (default: "0.0.0.0", respond to all clients)
    #[arg(long)]
    pub host: Option<String>,

    /// Port the server listens on (default: 8080)
    #[arg(long)]
    pub port: Option<u16>,

    /// Disable LRU caching of files (equivalent to --cache 0)
    #[arg(long = "no-cache", conflicts_with = "cache")]
    pub no_cache: bool,

    /// Max size in bytes of the LRU cache (default: 1048576)
    #[arg(long, value_name = "BYTES")]
    pub cache: Option<usize>,

    /// Path of the TOML configuration file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    host: String,
    port: u16,
    site_root: PathBuf,
    error_site_root: PathBuf,
    default_page: String,
    cache_capacity: usize,
    mime_types: PathBuf,
    worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            site_root: PathBuf::from("sites"),
            error_site_root: PathBuf::from("err_site"),
            default_page: "index.html".to_string(),
            cache_capacity: 1_048_576,
            mime_types: PathBuf::from("mimetypes.json"),
            worker_threads: num_cpus::get(),
        }
    }

    /// 从 TOML 文件读取配置。文件缺失或格式错误时记录日志并使用默认配置。
    pub fn from_toml(filename: &Path) -> Self {
        let text = match fs::read_to_string(filename) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("配置文件{}不存在，使用默认配置", filename.display());
                return Config::new();
            }
            Err(e) => {
                error!("无法读取配置文件{}：{}，使用默认配置", filename.display(), e);
                return Config::new();
            }
        };

        let mut raw_config = match toml::from_str::<Config>(&text) {
            Ok(c) => c,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象：{}，使用默认配置", e);
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        raw_config
    }

    /// 读取 `args.config` 指定的文件，再用命令行参数覆盖
    pub fn load(args: &Args) -> Self {
        let mut config = Config::from_toml(&args.config);
        config.apply_args(args);
        config
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if args.no_cache {
            info!("已通过--no-cache禁用缓存");
            self.cache_capacity = 0;
        } else if let Some(capacity) = args.cache {
            self.cache_capacity = capacity;
        }
    }

    pub fn with_roots(mut self, site_root: &Path, error_site_root: &Path) -> Self {
        self.site_root = site_root.to_path_buf();
        self.error_site_root = error_site_root.to_path_buf();
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_address(mut self, host: &str, port: u16) -> Self {
        self.host = host.to_string();
        self.port = port;
        self
    }
}

impl Config {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    pub fn error_site_root(&self) -> &Path {
        &self.error_site_root
    }

    pub fn default_page(&self) -> &str {
        &self.default_page
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    pub fn mime_types(&self) -> &Path {
        &self.mime_types
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }
}
