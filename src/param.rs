// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `miniserver` 遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 常见的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - HTTP 方法与内容编码的强类型枚举。

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// 服务器名称标识，仅用于日志
pub const SERVER_NAME: &str = "miniserver";

/// 响应状态行中使用的协议版本
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 标头名与值之间的分隔符
pub const HEADER_SEPARATOR: &str = ": ";

/// 请求头部与正文之间的分隔符
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        // 1xx
        map.insert(100, "Continue");
        map.insert(101, "Switching Protocols");

        // 2xx
        map.insert(200, "OK");
        map.insert(201, "Created");
        map.insert(202, "Accepted");
        map.insert(204, "No Content");

        // 3xx
        map.insert(301, "Moved Permanently");
        map.insert(302, "Found");
        map.insert(304, "Not Modified");
        map.insert(307, "Temporary Redirect");
        map.insert(308, "Permanent Redirect");

        // 4xx
        map.insert(400, "Bad Request");
        map.insert(401, "Unauthorized");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(408, "Request Timeout");
        map.insert(409, "Conflict");
        map.insert(411, "Length Required");
        map.insert(413, "Content Too Large");
        map.insert(414, "URI Too Long");
        map.insert(415, "Unsupported Media Type");

        // 5xx
        map.insert(500, "Internal Server Error");
        map.insert(501, "Not Implemented");
        map.insert(503, "Service Unavailable");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

/// 取状态码对应的原因短语，未登记的状态码返回 `"Unknown"`。
pub fn reason_phrase(code: u16) -> &'static str {
    STATUS_CODES.get(&code).copied().unwrap_or("Unknown")
}

/// 标准 HTTP 请求方法
///
/// 请求行中出现的其他方法会被解析为 `Unknown`，路由器永远不会为它找到匹配的路由。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpRequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Unknown,
}

impl HttpRequestMethod {
    /// 按大小写敏感的方式把请求行中的方法名映射为枚举
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => HttpRequestMethod::Get,
            "POST" => HttpRequestMethod::Post,
            "PUT" => HttpRequestMethod::Put,
            "DELETE" => HttpRequestMethod::Delete,
            _ => HttpRequestMethod::Unknown,
        }
    }
}

/// 支持识别的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpEncoding {
    /// GNU zip 压缩
    Gzip,
    /// zlib 压缩
    Deflate,
    /// Brotli 压缩
    Br,
}

impl HttpEncoding {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "gzip" => Some(HttpEncoding::Gzip),
            "deflate" => Some(HttpEncoding::Deflate),
            "br" => Some(HttpEncoding::Br),
            _ => None,
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Post => write!(f, "POST"),
            HttpRequestMethod::Put => write!(f, "PUT"),
            HttpRequestMethod::Delete => write!(f, "DELETE"),
            HttpRequestMethod::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// 将枚举格式化为 `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
            HttpEncoding::Br => write!(f, "br"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_case_sensitive() {
        assert_eq!(HttpRequestMethod::from_token("GET"), HttpRequestMethod::Get);
        assert_eq!(HttpRequestMethod::from_token("DELETE"), HttpRequestMethod::Delete);
        assert_eq!(HttpRequestMethod::from_token("get"), HttpRequestMethod::Unknown);
        assert_eq!(HttpRequestMethod::from_token("PATCH"), HttpRequestMethod::Unknown);
    }

    #[test]
    fn test_method_display() {
        for m in ["GET", "POST", "PUT", "DELETE"] {
            assert_eq!(HttpRequestMethod::from_token(m).to_string(), m);
        }
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(201), "Created");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(999), "Unknown");
    }

    #[test]
    fn test_encoding_tokens() {
        assert_eq!(HttpEncoding::from_token("GZIP"), Some(HttpEncoding::Gzip));
        assert_eq!(HttpEncoding::from_token("br"), Some(HttpEncoding::Br));
        assert_eq!(HttpEncoding::from_token("identity"), None);
        assert_eq!(HttpEncoding::Deflate.to_string(), "deflate");
    }
}
