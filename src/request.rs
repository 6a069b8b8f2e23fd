// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将一次读取得到的原始字节解析为 `Request` 结构体：
//! 1. 请求行（Request-Line）的解析（方法、目标、版本）。
//! 2. 请求头（Headers）的解析，直到第一个空行为止。
//!
//! 不支持跨多次读取的请求，也不处理请求体。目标中的 URL 编码不会被解码，
//! 协议版本只检查是否存在。

use std::{collections::HashMap, fmt};

use lazy_static::lazy_static;
use log::error;
use regex::Regex;

use crate::{exception::ParseError, param::CRLF};

lazy_static! {
    /// `Name: Value` 形式的请求头，名称中不允许出现空白和冒号
    static ref HEADER_LINE: Regex = Regex::new(r"^([^\s:]+):(.*)$").unwrap();
}

/// 解析完成的请求，构造后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP 请求方法，保持收到时的大小写
    method: String,
    /// 请求目标（可能包含查询字符串）
    target: String,
    /// HTTP 协议版本字符串
    version: String,
    /// 请求头，名称保持收到时的大小写，重复的名称以最后一次为准
    headers: HashMap<String, String>,
}

impl Request {
    /// 从一次读取的原始字节构建 `Request`。
    ///
    /// # 参数
    /// * `buffer` - 从 Socket 读取的原始数据（已截断为实际读取的长度）。
    /// * `id` - 连接 ID，用于日志追踪。
    ///
    /// # 错误处理
    /// 任何格式问题都返回 [`ParseError`]，不会 panic。
    pub fn parse(buffer: &[u8], id: u128) -> Result<Self, ParseError> {
        let text = match std::str::from_utf8(buffer) {
            Ok(t) => t,
            Err(_) => {
                error!("[ID{}]无法将HTTP请求解码为UTF-8", id);
                return Err(ParseError::NotUtf8);
            }
        };

        // 首尾的空白（包括客户端多发的换行）不属于请求
        let mut lines = text.trim().split(CRLF);

        // 请求行必须恰好是三个非空部分，例如 "GET /index.html HTTP/1.1"，
        // 每个部分都不能含有空白或控制字符，否则会被原样写回状态行
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split(' ').collect();
        if parts.len() != 3 || parts.iter().any(|p| !is_token(p)) {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(ParseError::MalformedRequestLine);
        }

        let mut headers = HashMap::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            let captures = match HEADER_LINE.captures(line) {
                Some(c) => c,
                None => {
                    error!("[ID{}]HTTP请求头格式不正确：{}", id, line);
                    return Err(ParseError::MalformedHeader);
                }
            };
            headers.insert(captures[1].to_string(), captures[2].trim().to_string());
        }

        Ok(Self {
            method: parts[0].to_string(),
            target: parts[1].to_string(),
            version: parts[2].to_string(),
            headers,
        })
    }
}

fn is_token(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c.is_control())
}

impl Request {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// 获取完整的请求目标（含查询参数）
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 获取去掉查询字符串和片段后的路径
    pub fn path(&self) -> &str {
        match self.target.find(|c: char| c == '?' || c == '#') {
            Some(end) => &self.target[..end],
            None => &self.target,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.method, self.target, self.version)
    }
}
