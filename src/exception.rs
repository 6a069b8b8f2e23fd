// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在请求处理生命周期以及启动阶段可能出现的错误。
//!
//! - [`ParseError`]：请求报文无法解析。会被转换为 `400 Bad Request`，不会终止工作任务。
//! - [`ReadError`]：页面无法从磁盘读取。会被转换为 `404 Not Found`。
//! - [`ServerError`]：仅在启动阶段出现（解析地址、绑定、监听、加载 MIME 表），属于致命错误。

use std::{fmt, io, net::SocketAddr};

/// 请求报文解析失败的原因。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 请求字节流不是合法的 UTF-8 文本。
    NotUtf8,
    /// 请求行无法切分为恰好三个非空的部分（方法、目标、版本）。
    MalformedRequestLine,
    /// 某个请求头不符合 `Name: Value` 的形式。
    MalformedHeader,
}

/// 页面读取失败。
///
/// 文件不存在、权限不足、目标是目录等情况一律归为 `NotFound`。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadError {
    NotFound,
}

/// 启动阶段的致命错误。
#[derive(Debug)]
pub enum ServerError {
    /// `host:port` 无法解析为任何套接字地址。
    Resolve(String, io::Error),
    /// 套接字创建或绑定失败。
    Bind(SocketAddr, io::Error),
    /// 套接字进入监听状态失败。
    Listen(SocketAddr, io::Error),
    /// MIME 类型表无法加载。
    MimeTable(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            ParseError::MalformedRequestLine => write!(f, "Malformed request line"),
            ParseError::MalformedHeader => write!(f, "Malformed request header"),
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::NotFound => write!(f, "File not found (404)"),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Resolve(addr, e) => write!(f, "Couldn't resolve {}: {}", addr, e),
            ServerError::Bind(addr, e) => write!(f, "Couldn't bind {}: {}", addr, e),
            ServerError::Listen(addr, e) => write!(f, "Couldn't listen on {}: {}", addr, e),
            ServerError::MimeTable(reason) => write!(f, "Couldn't load mime table: {}", reason),
        }
    }
}

impl std::error::Error for ParseError {}

impl std::error::Error for ReadError {}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Resolve(_, e) | ServerError::Bind(_, e) | ServerError::Listen(_, e) => {
                Some(e)
            }
            ServerError::MimeTable(_) => None,
        }
    }
}
