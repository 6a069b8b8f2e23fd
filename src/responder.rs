//! # 响应生成
//!
//! 将解析后的请求映射为状态码、响应体和响应头。所有失败路径都降级为错误页面，
//! `respond` 本身不会失败。
//!
//! 路径解析规则：
//! 1. 去掉查询字符串和片段。
//! 2. `/` 映射到默认页面，否则去掉开头的 `/`。
//! 3. 没有扩展名的名称追加 `.html`。

use std::{collections::HashMap, path::Path, sync::Arc};

use bytes::Bytes;
use log::{debug, warn};

use crate::{
    cache::PageCache, config::Config, exception::ReadError, mime::MimeTable,
    response::Response, util::fallback_page,
};

const HTML_MIME: &str = "text/html";

pub struct Responder {
    config: Arc<Config>,
    cache: Arc<PageCache>,
    mime: Arc<MimeTable>,
}

impl Responder {
    pub fn new(config: Arc<Config>, cache: Arc<PageCache>, mime: Arc<MimeTable>) -> Self {
        Self {
            config,
            cache,
            mime,
        }
    }

    pub fn respond(
        &self,
        target: &str,
        method: &str,
        headers: &HashMap<String, String>,
        id: u128,
    ) -> Response {
        let resolved = resolve_target(target, self.config.default_page());
        debug!(
            "[ID{}]目标{}解析为{}，Host: {}",
            id,
            target,
            resolved,
            headers.get("Host").map(String::as_str).unwrap_or("-")
        );
        let content_type = self.mime.lookup(&resolved);

        if method != "GET" {
            warn!("[ID{}]不支持的HTTP请求方法：{}，返回405", id, method);
            return Response::new(405, content_type, self.error_page(405, id));
        }

        match self.cache.get(self.config.site_root(), &resolved) {
            Ok(body) => Response::new(200, content_type, body),
            Err(ReadError::NotFound) => {
                warn!("[ID{}]请求的路径：{} 不存在，返回404", id, resolved);
                Response::new(404, content_type, self.error_page(404, id))
            }
        }
    }

    /// 请求无法解析时使用的响应
    pub fn bad_request(&self, id: u128) -> Response {
        Response::new(400, HTML_MIME, self.error_page(400, id))
    }

    // 从错误站点目录读取 `<code>.html`，缺失时使用内置页面
    fn error_page(&self, code: u16, id: u128) -> Bytes {
        let name = format!("{}.html", code);
        match self.cache.get(self.config.error_site_root(), &name) {
            Ok(body) => body,
            Err(e) => {
                warn!("[ID{}]错误页面{}不可用（{}），使用内置页面", id, name, e);
                fallback_page(code)
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// 将请求目标解析为站点根目录下的相对路径
pub fn resolve_target(target: &str, default_page: &str) -> String {
    let path = match target.find(|c: char| c == '?' || c == '#') {
        Some(end) => &target[..end],
        None => target,
    };

    let mut name = if path == "/" {
        default_page.to_string()
    } else {
        path.strip_prefix('/').unwrap_or(path).to_string()
    };

    if Path::new(&name).extension().is_none() {
        name.push_str(".html");
    }
    name
}
