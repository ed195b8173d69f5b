// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应模块
//!
//! `Response` 由处理函数或默认错误路径构建，写回连接后即被丢弃。
//!
//! 序列化格式严格为：
//!
//! ```text
//! HTTP/1.1 <code> <text>\r\n
//! <name>: <first-value>\r\n   (每个标头一行)
//! \r\n
//! <body>
//! ```
//!
//! 序列化器不会自动计算 `Content-Length`，需要处理函数根据正文的字节长度自行设置，
//! [`Response::set_body`] 会顺带完成这一步。

use bytes::Bytes;

use crate::{
    exception::Exception,
    header::{self, HeaderMap},
    param::*,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status_code: u16,
    information: String,
    headers: HeaderMap,
    content: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// `200 OK`，没有标头也没有正文。路由器把它作为模板交给处理函数。
    pub fn new() -> Self {
        Self {
            status_code: 200,
            information: reason_phrase(200).to_string(),
            headers: HeaderMap::new(),
            content: Bytes::new(),
        }
    }

    /// 只有状态行的响应
    pub fn from_status_code(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response
    }

    pub fn response_400() -> Self {
        Self::from_status_code(400)
    }

    pub fn response_404() -> Self {
        Self::from_status_code(404)
    }

    pub fn response_500() -> Self {
        Self::from_status_code(500)
    }

    /// `text/plain` 正文，带 `Content-Length`
    pub fn text(body: impl Into<Bytes>) -> Self {
        let mut response = Self::new();
        response
            .set_header("Content-Type", "text/plain")
            .set_body(body);
        response
    }

    /// 设置状态码，原因短语取自状态码表
    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = reason_phrase(code).to_string();
        self
    }

    /// 设置状态码与自定义的原因短语
    pub fn set_status(&mut self, code: u16, information: &str) -> &mut Self {
        self.status_code = code;
        self.information = information.to_string();
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// 追加一个值。注意序列化时只输出第一个值。
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    /// 设置正文，并按字节长度设置 `Content-Length`
    pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.content = body.into();
        let length = self.content.len();
        self.headers.insert("Content-Length", length.to_string());
        self
    }

    /// 只设置正文，不触碰任何标头
    pub fn set_raw_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.content = body.into();
        self
    }

    /// 序列化为线上字节
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "{} {} {}{}",
            HTTP_VERSION, self.status_code, self.information, CRLF
        );
        for (name, values) in self.headers.iter() {
            if let Some(first) = values.first() {
                head.push_str(name);
                head.push_str(HEADER_SEPARATOR);
                head.push_str(first);
                head.push_str(CRLF);
            }
        }
        head.push_str(CRLF);

        [head.as_bytes(), self.content.as_ref()].concat()
    }

    /// 把序列化后的响应重新解析回来。
    ///
    /// 标头块的解析规则与请求相同；存在 `Content-Length` 时按长度截取正文，否则剩余字节全部视为正文。
    pub fn parse(buffer: &[u8]) -> Result<Self, Exception> {
        let (line_end, head_start) = match header::find(buffer, CRLF.as_bytes()) {
            Some(end) => (end, end + CRLF.len()),
            None => (buffer.len(), buffer.len()),
        };
        let status_line = match std::str::from_utf8(&buffer[..line_end]) {
            Ok(line) => line,
            Err(_) => return Err(Exception::RequestIsNotUtf8),
        };

        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/") {
            return Err(Exception::MalformedRequest);
        }
        let status_code = match parts.next().map(str::parse::<u16>) {
            Some(Ok(code)) => code,
            _ => return Err(Exception::MalformedRequest),
        };
        let information = parts.next().unwrap_or("").to_string();

        let (headers, consumed) = header::parse_block(&buffer[head_start..])?;
        let rest = &buffer[head_start + consumed..];
        let content = match headers.first("Content-Length") {
            Some(value) => {
                let length = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Exception::MalformedRequest)?;
                if rest.len() < length {
                    return Err(Exception::IncompleteBody);
                }
                Bytes::copy_from_slice(&rest[..length])
            }
            None => Bytes::copy_from_slice(rest),
        };

        Ok(Self {
            status_code,
            information,
            headers,
            content,
        })
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_new() {
        let response = Response::new();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.information(), "OK");
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_as_bytes_without_headers() {
        let response = Response::response_404();
        assert_eq!(response.as_bytes(), b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec());
    }

    #[test]
    fn test_as_bytes_exact_layout() {
        let mut response = Response::new();
        response.set_header("Content-Type", "text/plain").set_raw_body("abc");

        assert_eq!(
            response.as_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nabc".to_vec()
        );
    }

    /// 序列化器不会自动补上 Content-Length
    #[test]
    fn test_content_length_is_not_automatic() {
        let mut response = Response::new();
        response.set_raw_body("hello");
        let text = String::from_utf8(response.as_bytes()).unwrap();
        assert!(!text.contains("Content-Length"));
    }

    /// Content-Length 按字节计算，而不是按字符
    #[test]
    fn test_set_body_counts_bytes() {
        let mut response = Response::new();
        response.set_body("你好");
        assert_eq!(response.headers().first("Content-Length"), Some("6"));
    }

    #[test]
    fn test_only_first_header_value_is_serialized() {
        let mut response = Response::new();
        response
            .append_header("Vary", "Accept-Encoding")
            .append_header("Vary", "User-Agent");

        let text = String::from_utf8(response.as_bytes()).unwrap();
        assert!(text.contains("Vary: Accept-Encoding\r\n"));
        assert!(!text.contains("User-Agent"));
        assert_eq!(response.headers().all("vary").len(), 2);
    }

    #[test]
    fn test_text_helper() {
        let response = Response::text("hello");
        let text = String::from_utf8(response.as_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_status_code_various() {
        for (code, expected_info) in [
            (200, "OK"),
            (201, "Created"),
            (400, "Bad Request"),
            (404, "Not Found"),
            (413, "Content Too Large"),
            (500, "Internal Server Error"),
        ] {
            let response = Response::from_status_code(code);
            assert_eq!(response.status_code(), code);
            assert_eq!(response.information(), expected_info);
        }
    }

    #[test]
    fn test_custom_status_text() {
        let mut response = Response::new();
        response.set_status(404, "File Cannot Be Written");
        assert!(response
            .as_bytes()
            .starts_with(b"HTTP/1.1 404 File Cannot Be Written\r\n"));
    }

    #[test]
    fn test_round_trip() {
        let mut response = Response::new();
        response
            .set_code(201)
            .set_header("Content-Type", "application/octet-stream")
            .set_header("X-Trace", "abc")
            .set_body(&b"\x00binary\xffbody"[..]);

        let parsed = Response::parse(&response.as_bytes()).unwrap();
        assert_eq!(parsed.status_code(), 201);
        assert_eq!(parsed.information(), "Created");
        assert_eq!(parsed.body(), response.body());
        assert_eq!(parsed.headers().first("x-trace"), Some("abc"));
    }

    #[test]
    fn test_round_trip_status_text_with_spaces() {
        let response = Response::from_status_code(505);
        let parsed = Response::parse(&response.as_bytes()).unwrap();
        assert_eq!(parsed.information(), "HTTP Version Not Supported");
        assert!(parsed.body().is_empty());
    }

    #[test]
    fn test_round_trip_without_content_length() {
        let mut response = Response::new();
        response.set_raw_body("tail");
        let parsed = Response::parse(&response.as_bytes()).unwrap();
        assert_eq!(parsed.body().as_ref(), b"tail");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Response::parse(b"").is_err());
        assert!(Response::parse(b"HTTP/1.1 abc OK\r\n\r\n").is_err());
        assert!(Response::parse(b"FTP 200 OK\r\n\r\n").is_err());
    }
}
