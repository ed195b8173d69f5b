// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块负责将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、查询串、版本）。
//! 2. 标头（Headers）的多值解析。
//! 3. 按 `Content-Length` 读取正文的增量读取器。
//! 4. 内容协商（Content Negotiation）相关的编码解析。

use std::collections::HashMap;

use bytes::Bytes;
use log::{debug, error};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    exception::Exception,
    header::{self, HeaderMap},
    param::*,
};

/// 每次从套接字读取的块大小
const READ_CHUNK: usize = 1024;

/// 表示一个完整的 HTTP 请求。
///
/// `params` 只会在路由匹配成功后由路由器填充，此后请求不再被修改。
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP 请求方法
    method: HttpRequestMethod,
    /// 请求路径，总是以 `/` 开头，不含查询串
    path: String,
    /// `?` 之后的原始查询串
    query: Option<String>,
    /// 协议版本，例如 `HTTP/1.1`
    version: String,
    headers: HeaderMap,
    body: Bytes,
    /// 路由参数名 -> 捕获到的路径段
    params: HashMap<String, String>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 解析请求行：按单个空格拆分，必须恰好三段。
    /// 2. 解析标头块：空行或不含 `": "` 的行表示标头结束。
    /// 3. 截取正文：存在 `Content-Length` 时严格按长度截取，否则取剩余字节并去掉末尾的 NUL 填充和首尾空白。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 连接序号，用于在多线程环境下追踪日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let (line_end, head_start) = match header::find(buffer, CRLF.as_bytes()) {
            Some(end) => (end, end + CRLF.len()),
            None => (buffer.len(), buffer.len()),
        };

        // 1. 请求行 (e.g., "GET /index.html HTTP/1.1")
        let request_line = match std::str::from_utf8(&buffer[..line_end]) {
            Ok(line) => line,
            Err(_) => {
                error!("[ID{}]请求行不是合法的UTF-8", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };
        let parts: Vec<&str> = request_line.split(' ').collect();
        if parts.len() != 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(Exception::MalformedRequest);
        }

        let method = HttpRequestMethod::from_token(parts[0]);
        if method == HttpRequestMethod::Unknown {
            debug!("[ID{}]无法识别的HTTP请求方法：{}", id, parts[0]);
        }

        let target = parts[1];
        if !target.starts_with('/') {
            error!("[ID{}]请求路径必须以/开头：{}", id, target);
            return Err(Exception::MalformedRequest);
        }
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (target.to_string(), None),
        };

        let version = parts[2];
        if !version.starts_with("HTTP/") {
            error!("[ID{}]HTTP协议版本格式不正确：{}", id, version);
            return Err(Exception::MalformedRequest);
        }

        // 2. 标头
        let (headers, consumed) = header::parse_block(&buffer[head_start..])?;
        let rest = &buffer[head_start + consumed..];

        // 3. 正文
        let body = match headers.first("Content-Length") {
            Some(value) => {
                let length = parse_content_length(value).ok_or_else(|| {
                    error!("[ID{}]非法的Content-Length：{}", id, value);
                    Exception::MalformedRequest
                })?;
                if rest.len() < length {
                    error!(
                        "[ID{}]正文不完整：声明{}字节，实际收到{}字节",
                        id,
                        length,
                        rest.len()
                    );
                    return Err(Exception::IncompleteBody);
                }
                Bytes::copy_from_slice(&rest[..length])
            }
            None => Bytes::copy_from_slice(trim_body(rest)),
        };

        Ok(Self {
            method,
            path,
            query,
            version: version.to_string(),
            headers,
            body,
            params: HashMap::new(),
        })
    }

    /// 从异步流中读取一个完整的请求并解析。
    ///
    /// 先读到标头结束（`\r\n\r\n`），再继续读到 `Content-Length` 声明的正文长度或连接关闭。
    /// 累计字节数超过 `max_size` 时返回 [`Exception::RequestTooLarge`]。
    pub async fn read_from<R>(reader: &mut R, id: u128, max_size: usize) -> Result<Self, Exception>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = Vec::with_capacity(READ_CHUNK);
        let mut chunk = vec![0u8; READ_CHUNK];
        let mut expected: Option<usize> = None;

        loop {
            match expected {
                Some(total) if buffer.len() >= total => break,
                Some(_) => {}
                None => {
                    if let Some(end) = header::find(&buffer, HEAD_TERMINATOR) {
                        let head_len = end + HEAD_TERMINATOR.len();
                        let declared = declared_length(&buffer[..head_len]);
                        let total = match head_len.checked_add(declared) {
                            Some(total) if total <= max_size => total,
                            _ => {
                                error!(
                                    "[ID{}]请求声明的正文长度{}超过上限{}",
                                    id, declared, max_size
                                );
                                return Err(Exception::RequestTooLarge);
                            }
                        };
                        expected = Some(total);
                        continue;
                    }
                }
            }

            let n = match reader.read(&mut chunk).await {
                Ok(n) => n,
                Err(e) => {
                    error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                    return Err(Exception::ConnectionClosed);
                }
            };
            if n == 0 {
                if buffer.is_empty() {
                    return Err(Exception::ConnectionClosed);
                }
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            if buffer.len() > max_size {
                error!("[ID{}]请求大小超过上限{}", id, max_size);
                return Err(Exception::RequestTooLarge);
            }
        }

        debug!("[ID{}]HTTP请求接收完毕，共{}字节", id, buffer.len());
        Self::try_from(&buffer, id)
    }

    /// 返回绑定了路由参数的新请求。
    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

/// 标头块中声明的正文长度；缺失或非法时按 0 处理，交给 `try_from` 报告错误。
fn declared_length(head: &[u8]) -> usize {
    let start = match header::find(head, CRLF.as_bytes()) {
        Some(end) => end + CRLF.len(),
        None => return 0,
    };
    match header::parse_block(&head[start..]) {
        Ok((headers, _)) => headers
            .first("Content-Length")
            .and_then(parse_content_length)
            .unwrap_or(0),
        Err(_) => 0,
    }
}

fn parse_content_length(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

/// 去掉末尾的 NUL 填充以及首尾的空白字符
fn trim_body(bytes: &[u8]) -> &[u8] {
    let is_padding = |b: &u8| *b == 0 || b.is_ascii_whitespace();
    let end = bytes.iter().rposition(|b| !is_padding(b)).map_or(0, |i| i + 1);
    let start = bytes[..end]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(end);
    &bytes[start..end]
}

fn encoding_token(value: &str) -> &str {
    value.split(';').next().unwrap_or("").trim()
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// 获取路由参数
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// 多值标头访问器。
    ///
    /// `Accept-Encoding` 的值列表中任意位置出现 `gzip` 时直接返回 `"gzip"`，
    /// 其余情况返回第一个值。
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("Accept-Encoding")
            && self
                .headers
                .all(name)
                .iter()
                .any(|v| encoding_token(v).eq_ignore_ascii_case("gzip"))
        {
            return Some("gzip");
        }
        self.headers.first(name)
    }

    /// 获取用户代理字符串，与请求中的原始值逐字节一致。
    pub fn user_agent(&self) -> String {
        self.headers.raw("User-Agent").unwrap_or_default()
    }

    /// 获取客户端支持的压缩算法列表（按出现顺序）
    pub fn accept_encoding(&self) -> Vec<HttpEncoding> {
        self.headers
            .all("Accept-Encoding")
            .iter()
            .filter_map(|v| HttpEncoding::from_token(encoding_token(v)))
            .collect()
    }
}
