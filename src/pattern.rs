// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由模板编译模块
//!
//! 把 `/files/:id` 这样的路由声明编译成锚定的正则表达式，并记录参数名。
//!
//! ## 语法
//! - 普通字符（包括 `/`）按字面匹配。
//! - `:name` 匹配单个路径段（一个或多个非 `/` 字符），参数名按从左到右的顺序记录。
//! - `*` 匹配任意字符（包括 `/`），不产生捕获。

use std::cmp::Reverse;
use std::collections::HashMap;

use log::error;
use regex::Regex;

use crate::exception::Exception;

/// 单个路径段的捕获组
const SEGMENT_CAPTURE: &str = "([^/]+)";
/// 通配符，不捕获
const WILDCARD: &str = ".*";

/// 编译后的路由模板
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    param_names: Vec<String>,
    /// 模板中字面字符的数量，越多越具体
    literal_len: usize,
    wildcards: usize,
}

impl PathPattern {
    pub fn compile(template: &str) -> Result<Self, Exception> {
        if !template.starts_with('/') {
            error!("路由模板必须以/开头：{}", template);
            return Err(Exception::InvalidRoutePattern);
        }

        let mut expr = String::from("^");
        let mut literal = String::new();
        let mut literal_len = 0;
        let mut wildcards = 0;
        let mut param_names: Vec<String> = Vec::new();

        let mut flush = |literal: &mut String, expr: &mut String| {
            literal_len += literal.chars().count();
            expr.push_str(&regex::escape(literal));
            literal.clear();
        };

        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ':' => {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            name.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if name.is_empty() {
                        error!("路由模板{}中存在没有名字的参数", template);
                        return Err(Exception::InvalidRoutePattern);
                    }
                    if param_names.contains(&name) {
                        error!("路由模板{}中的参数名{}重复", template, name);
                        return Err(Exception::InvalidRoutePattern);
                    }
                    flush(&mut literal, &mut expr);
                    expr.push_str(SEGMENT_CAPTURE);
                    param_names.push(name);
                }
                '*' => {
                    flush(&mut literal, &mut expr);
                    expr.push_str(WILDCARD);
                    wildcards += 1;
                }
                _ => literal.push(c),
            }
        }
        flush(&mut literal, &mut expr);
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| {
            error!("路由模板{}无法编译为正则表达式：{}", template, e);
            Exception::InvalidRoutePattern
        })?;

        // 捕获组数量必须与参数名一一对应
        if regex.captures_len() - 1 != param_names.len() {
            error!("路由模板{}的捕获组数量与参数名数量不一致", template);
            return Err(Exception::InvalidRoutePattern);
        }

        Ok(Self {
            source: template.to_string(),
            regex,
            param_names,
            literal_len,
            wildcards,
        })
    }

    /// 声明时的原始模板字符串
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// 模板中没有参数也没有通配符，可以直接按字符串精确匹配
    pub fn is_literal(&self) -> bool {
        self.param_names.is_empty() && self.wildcards == 0
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// 匹配成功时按位置把捕获到的路径段绑定到参数名上
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.param_names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }

    /// 排序键：字面字符越多越靠前，其次通配符越少越靠前。
    pub fn specificity(&self) -> (Reverse<usize>, usize) {
        (Reverse(self.literal_len), self.wildcards)
    }
}
