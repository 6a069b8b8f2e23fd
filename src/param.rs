// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `elserve` 使用的常量和静态表，包括：
//! - 服务器标识、读缓冲区大小等固定参数。
//! - 用到的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 内置的 MIME 类型表，在外部 `mimetypes.json` 无法加载时使用。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "ElServePie/0.1";

/// 每个连接只读取一次，单次读取的最大字节数
pub const BUF_SIZE: usize = 1024;

/// 请求报文使用的换行符
pub const CRLF: &str = "\r\n";

/// 响应报文使用的换行符。
///
/// 与 HTTP 标准要求的 CRLF 不同，这里沿用了既有客户端依赖的裸 LF。
pub const LF: &str = "\n";

/// 请求行解析失败时，响应使用的协议版本
pub const FALLBACK_VERSION: &str = "HTTP/1.1";

/// 无法识别扩展名时使用的 Content-Type
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// 监听队列长度
pub const BACKLOG: u32 = 16;

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(500, "Internal Server Error");
        map
    };
}

lazy_static! {
    /// 文件后缀名到 MIME 类型的内置映射表。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("aac", "audio/aac");
        map.insert("avif", "image/avif");
        map.insert("bin", "application/octet-stream");
        map.insert("bmp", "image/bmp");
        map.insert("css", "text/css");
        map.insert("csv", "text/csv");
        map.insert("gif", "image/gif");
        map.insert("gz", "application/gzip");
        map.insert("htm", "text/html");
        map.insert("html", "text/html");
        map.insert("ico", "image/vnd.microsoft.icon");
        map.insert("jpeg", "image/jpeg");
        map.insert("jpg", "image/jpeg");
        map.insert("js", "text/javascript");
        map.insert("json", "application/json");
        map.insert("mjs", "text/javascript");
        map.insert("mp3", "audio/mpeg");
        map.insert("mp4", "video/mp4");
        map.insert("otf", "font/otf");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("tar", "application/x-tar");
        map.insert("ttf", "font/ttf");
        map.insert("txt", "text/plain");
        map.insert("wasm", "application/wasm");
        map.insert("webm", "video/webm");
        map.insert("webp", "image/webp");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("xhtml", "application/xhtml+xml");
        map.insert("xml", "application/xml");
        map.insert("zip", "application/zip");
        map
    };
}
