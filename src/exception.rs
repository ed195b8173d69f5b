// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在请求处理生命周期中可能出现的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了协议解析错误、路由声明错误以及字节存储（文件系统）错误。
//! - **语义映射**：请求级别的变体都能通过 [`Exception::status_code`] 转化为对应的 HTTP 状态码。
//! - **用户友好**：通过实现 `std::fmt::Display`，错误信息可以被直接写入日志。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 请求头部（请求行 + 标头）无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行或标头格式不正确，例如请求行少于三段、路径不以 `/` 开头。
    MalformedRequest,
    /// 连接关闭时实际收到的正文字节数少于 `Content-Length` 声明的长度。
    IncompleteBody,
    /// 请求总大小超过了配置的上限。
    RequestTooLarge,
    /// 客户端在发送任何字节之前就关闭了连接。
    ConnectionClosed,
    /// 路由模板非法。这是启动阶段的配置错误，而不是运行时错误。
    InvalidRoutePattern,
    /// 字节存储中不存在请求的键。对应 `404 Not Found`。
    FileNotFound,
    /// 存储键非法或包含越权尝试（如 `..`）。对应 `400 Bad Request`。
    InvalidPath,
    /// 字节存储读写时发生了 I/O 错误。对应 `500 Internal Server Error`。
    StoreIoFailure,
}

use Exception::*;

impl Exception {
    /// 该异常在 HTTP 层面对应的状态码。
    pub fn status_code(&self) -> u16 {
        match self {
            RequestIsNotUtf8 | MalformedRequest | IncompleteBody | InvalidPath => 400,
            RequestTooLarge => 413,
            FileNotFound => 404,
            ConnectionClosed | InvalidRoutePattern | StoreIoFailure => 500,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request head can't be parsed in UTF-8"),
            MalformedRequest => write!(f, "Malformed request (400)"),
            IncompleteBody => write!(f, "Body is shorter than Content-Length (400)"),
            RequestTooLarge => write!(f, "Request is too large (413)"),
            ConnectionClosed => write!(f, "Connection closed before any byte was received"),
            InvalidRoutePattern => write!(f, "Invalid route pattern"),
            FileNotFound => write!(f, "File not found (404)"),
            InvalidPath => write!(f, "Invalid path (400)"),
            StoreIoFailure => write!(f, "Byte-store I/O failure (500)"),
        }
    }
}

impl std::error::Error for Exception {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_map_to_400() {
        for e in [RequestIsNotUtf8, MalformedRequest, IncompleteBody, InvalidPath] {
            assert_eq!(e.status_code(), 400, "{}", e);
        }
    }

    #[test]
    fn test_store_errors_are_distinguished() {
        assert_eq!(FileNotFound.status_code(), 404);
        assert_eq!(StoreIoFailure.status_code(), 500);
        assert_eq!(RequestTooLarge.status_code(), 413);
    }

    #[test]
    fn test_display() {
        assert_eq!(FileNotFound.to_string(), "File not found (404)");
        assert!(MalformedRequest.to_string().contains("400"));
    }
}
