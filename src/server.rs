// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接循环
//!
//! 监听器上只有一个 accept 循环，每个连接交给独立的 tokio 任务处理：
//! 读取一个请求，交给路由分发，写回一个响应，然后关闭连接。不支持 keep-alive。
//!
//! 单个连接中的任何错误都只影响该连接，不会传播到 accept 循环或其他连接。

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpListener,
};

use crate::{exception::Exception, request::Request, response::Response, router::Router};

const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;

pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    max_request_size: usize,
}

impl Server {
    /// 绑定监听地址，例如 `0.0.0.0:4221`；端口为 0 时由系统分配。
    pub async fn bind(address: &str, router: Arc<Router>) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        info!("服务端已在{}上监听Socket连接", listener.local_addr()?);
        Ok(Self {
            listener,
            router,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        })
    }

    pub fn with_max_request_size(mut self, max_request_size: usize) -> Self {
        self.max_request_size = max_request_size;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 一直运行，直到进程退出
    pub async fn serve(self) {
        self.serve_until(std::future::pending::<()>()).await
    }

    /// 运行 accept 循环，直到 `shutdown` 完成。
    ///
    /// 停机只是停止接受新连接，已经开始处理的连接会在各自的任务中继续完成。
    pub async fn serve_until<F>(self, shutdown: F)
    where
        F: Future,
    {
        tokio::pin!(shutdown);
        let mut id: u128 = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("主循环接收到停机指令，正在退出...");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (mut stream, addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("接受TCP连接时遇到错误：{}", e);
                            continue;
                        }
                    };
                    debug!("[ID{}]TCP连接已建立：{}", id, addr);

                    let router = Arc::clone(&self.router);
                    let max_request_size = self.max_request_size;
                    tokio::spawn(async move {
                        handle_connection(&mut stream, id, &router, max_request_size).await;
                    });
                    id += 1;
                }
            }
        }
    }
}

/// 处理单个连接：读取、分发、写回、关闭。
pub async fn handle_connection<S>(stream: &mut S, id: u128, router: &Router, max_request_size: usize)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start_time = Instant::now();

    let response = match Request::read_from(stream, id, max_request_size).await {
        Ok(request) => {
            debug!("[ID{}]成功解析HTTP请求", id);
            let response = router.dispatch(&request);
            info!(
                "[ID{}] {}, {}, {}, {}, {}, {}",
                id,
                request.version(),
                request.path(),
                request.method(),
                response.status_code(),
                response.information(),
                request.user_agent(),
            );
            response
        }
        Err(Exception::ConnectionClosed) => {
            debug!("[ID{}]客户端未发送任何数据即关闭连接", id);
            return;
        }
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败：{}，返回{}", id, e, e.status_code());
            Response::from_status_code(e.status_code())
        }
    };

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    let bytes = response.as_bytes();
    if let Err(e) = stream.write_all(&bytes).await {
        error!("[ID{}]发送响应失败：{}", id, e);
        return;
    }
    if let Err(e) = stream.flush().await {
        error!("[ID{}]刷新TCPStream失败：{}", id, e);
        return;
    }
    if let Err(e) = stream.shutdown().await {
        debug!("[ID{}]关闭写端失败：{}", id, e);
    }
}
