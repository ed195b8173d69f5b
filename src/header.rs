// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 标头模块
//!
//! 请求与响应共用的标头多值表，以及标头块的解析函数。
//!
//! 标头名的查找不区分大小写，但会保留首次插入时的写法用于输出；
//! 同一个标头的多个值按出现顺序保存，`first` 与 `all` 两个访问器分别对应
//! “只取第一个值”与“取全部值”两种语义。

use crate::{exception::Exception, param::*};

/// 不区分大小写的 HTTP 标头多值表，按插入顺序保存。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    /// 按逗号拆分后的值
    values: Vec<String>,
    /// 每一行标头未经拆分的原始值（去掉首尾空白）
    raw: Vec<String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// 设置标头，替换掉已有的全部值。
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let entry = Entry {
            name: name.to_string(),
            values: vec![value.clone()],
            raw: vec![value],
        };
        match self.position(name) {
            Some(i) => {
                self.entries[i].values = entry.values;
                self.entries[i].raw = entry.raw;
            }
            None => self.entries.push(entry),
        }
    }

    /// 在已有值之后追加一个值。
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.push_line(name, value.clone(), vec![value]);
    }

    /// 追加一组值，原始值记为它们用 `", "` 拼接的结果。
    pub fn extend(&mut self, name: &str, values: Vec<String>) {
        let raw = values.join(", ");
        self.push_line(name, raw, values);
    }

    /// 追加一行标头：原始值与拆分后的值同时保存。重复出现的标头行就是通过它合并的。
    fn push_line(&mut self, name: &str, raw: String, values: Vec<String>) {
        match self.position(name) {
            Some(i) => {
                self.entries[i].values.extend(values);
                self.entries[i].raw.push(raw);
            }
            None => self.entries.push(Entry {
                name: name.to_string(),
                values,
                raw: vec![raw],
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let i = self.position(name)?;
        Some(self.entries.remove(i).values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// 第一个值。序列化时只会输出这个值。
    pub fn first(&self, name: &str) -> Option<&str> {
        self.all(name).first().map(String::as_str)
    }

    /// 全部值，不存在时返回空切片。
    pub fn all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].values,
            None => &[],
        }
    }

    /// 未经逗号拆分的原始值（例如 User-Agent）。同名标头出现多行时按行用 `", "` 拼接。
    pub fn raw(&self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries[i].raw.join(", "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 解析一行标头。
///
/// 在第一个 `": "` 处拆分出标头名与值，值再按逗号拆分为去除首尾空白的子值。
/// 没有分隔符（或标头名为空）时返回 `None`，调用方据此判断标头块已经结束。
pub fn parse_line(line: &str) -> Option<(&str, Vec<String>)> {
    let (name, value) = line.split_once(HEADER_SEPARATOR)?;
    if name.is_empty() {
        return None;
    }
    let mut values: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        values.push(String::new());
    }
    Some((name, values))
}

/// 解析起始行之后的标头块。
///
/// 遇到空行，或遇到一行不含 `": "` 的内容时结束；后一种情况下正文从这一行开始。
/// 返回解析出的标头与标头块所占的字节数（即正文在 `bytes` 中的起始位置）。
pub fn parse_block(bytes: &[u8]) -> Result<(HeaderMap, usize), Exception> {
    let mut headers = HeaderMap::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &bytes[pos..];
        let (line_bytes, advance) = match find(rest, CRLF.as_bytes()) {
            Some(end) => (&rest[..end], end + CRLF.len()),
            None => (rest, rest.len()),
        };

        if line_bytes.is_empty() {
            return Ok((headers, pos + advance));
        }

        let line = match std::str::from_utf8(line_bytes) {
            Ok(l) => l,
            Err(_) => return Err(Exception::RequestIsNotUtf8),
        };
        match parse_line(line) {
            Some((name, values)) => {
                let raw = line
                    .split_once(HEADER_SEPARATOR)
                    .map_or("", |(_, value)| value.trim());
                headers.push_line(name, raw.to_string(), values);
            }
            None => return Ok((headers, pos)),
        }
        pos += advance;
    }

    Ok((headers, pos))
}

/// 在 `haystack` 中查找 `needle` 第一次出现的位置。
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
