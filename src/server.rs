// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 监听循环与连接处理
//!
//! 每个接受的连接由一个独立的 tokio 任务处理，接受循环从不等待任务完成。
//! 没有连接数上限、超时或取消机制：卡住的客户端会一直占用它的任务直到进程退出。
//! 缓存是唯一共享的可变状态。

use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{lookup_host, TcpListener, TcpSocket},
};

use crate::{
    exception::ServerError,
    param::{BACKLOG, BUF_SIZE},
    request::Request,
    responder::Responder,
};

// 解析失败时，日志中最多保留的原始请求字符数
const RAW_SUMMARY_LEN: usize = 80;

// accept 失败（例如文件描述符耗尽）后的等待时间，避免空转刷屏
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// 解析地址并创建监听套接字，绑定前设置 `SO_REUSEADDR`。
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    let display = format!("{}:{}", host, port);
    let addr = match lookup_host((host, port)).await {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => {
                return Err(ServerError::Resolve(
                    display,
                    std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no address"),
                ))
            }
        },
        Err(e) => return Err(ServerError::Resolve(display, e)),
    };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|e| ServerError::Bind(addr, e))?;
    socket
        .set_reuseaddr(true)
        .map_err(|e| ServerError::Bind(addr, e))?;
    socket.bind(addr).map_err(|e| ServerError::Bind(addr, e))?;
    let listener = socket
        .listen(BACKLOG)
        .map_err(|e| ServerError::Listen(addr, e))?;
    info!("已在{}上监听Socket连接", addr);
    Ok(listener)
}

/// 主事件循环：接受连接并为每个连接派生一个任务。只会因进程退出而结束。
pub async fn serve(listener: TcpListener, responder: Arc<Responder>) {
    let mut id: u128 = 0;
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("接受TCP连接时遇到错误：{}，{}ms后重试", e, ACCEPT_BACKOFF.as_millis());
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        debug!("[ID{}]新的连接：{}", id, peer);

        let responder = Arc::clone(&responder);
        tokio::spawn(async move {
            handle_connection(stream, peer, id, &responder).await;
        });
        id += 1;
    }
}

/// # 连接处理器
///
/// 读取一次、解析、生成响应、一次性写回、关闭连接，最后输出一行访问日志。
/// 连接在函数返回时被关闭，无论走的是哪条路径。
pub async fn handle_connection<S>(mut stream: S, peer: SocketAddr, id: u128, responder: &Responder)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; BUF_SIZE];
    let n = match stream.read(&mut buffer).await {
        Ok(0) => {
            debug!("[ID{}]客户端未发送数据即关闭连接", id);
            return;
        }
        Ok(n) => n,
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误：{}", id, e);
            return;
        }
    };
    let raw = &buffer[..n];
    debug!("[ID{}]HTTP请求接收完毕，{} bytes", id, n);

    let (response, summary) = match Request::parse(raw, id) {
        Ok(request) => {
            let mut response =
                responder.respond(request.target(), request.method(), request.headers(), id);
            response.set_version(request.version());
            (response, request.to_string())
        }
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败：{}，返回400", id, e);
            (responder.bad_request(id), raw_summary(raw))
        }
    };

    let bytes = response.as_bytes();
    debug!("[ID{}]发送全量响应，长度：{}", id, bytes.len());
    match stream.write_all(&bytes).await {
        Ok(()) => {
            let _ = stream.flush().await;
            let _ = stream.shutdown().await;
        }
        Err(e) => error!("[ID{}]发送响应失败：{}", id, e),
    }

    info!(
        target: "access",
        "{}",
        access_line(&Local::now(), &peer, &summary, &response.status_line())
    );
}

/// 访问日志：`[时间] (地址) (方法 目标 版本)... 状态`
pub fn access_line(time: &DateTime<Local>, peer: &SocketAddr, request: &str, status: &str) -> String {
    format!(
        "[{}] ({}) {}... {}",
        time.format("%m/%d/%Y, %H:%M:%S"),
        peer,
        request,
        status
    )
}

// 无法解析的请求只记录第一行的前若干字符
fn raw_summary(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let first_line: String = text
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(RAW_SUMMARY_LEN)
        .collect();
    format!("{:?}", first_line)
}
