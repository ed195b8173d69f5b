// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由模块
//!
//! 路由表在启动时一次性构建，之后以 `Arc<Router>` 的形式在所有连接任务间只读共享，不需要加锁。
//!
//! ## 分发规则
//! 1. 先按 `(方法, 路径)` 在字面路由表中精确查找，因此字面路由总是优先于同样能匹配的参数路由。
//! 2. 否则按具体程度从高到低扫描该方法的模板路由（字面字符多者优先，其次通配符少者优先，最后按注册顺序）。
//! 3. 都不匹配时返回没有正文的 `404 Not Found`。

use std::collections::HashMap;

use log::debug;

use crate::{
    param::HttpRequestMethod, pattern::PathPattern, request::Request, response::Response,
};

/// 处理函数：接收只读的请求和一个 `200 OK` 响应模板，返回最终的响应。
pub type Handler = Box<dyn Fn(&Request, Response) -> Response + Send + Sync>;

struct Route {
    method: HttpRequestMethod,
    pattern: PathPattern,
    handler: Handler,
}

#[derive(Default)]
pub struct Router {
    /// 方法 -> 原始模板字符串 -> 字面路由
    exact: HashMap<HttpRequestMethod, HashMap<String, Route>>,
    /// 含参数或通配符的路由，按具体程度排序
    patterns: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一条路由。
    ///
    /// 模板非法、方法未知或重复注册都属于启动阶段的配置错误，会直接 panic。
    pub fn register<F>(&mut self, method: HttpRequestMethod, template: &str, handler: F)
    where
        F: Fn(&Request, Response) -> Response + Send + Sync + 'static,
    {
        if method == HttpRequestMethod::Unknown {
            panic!("无法为未知的HTTP方法注册路由：{}", template);
        }
        let pattern = PathPattern::compile(template)
            .unwrap_or_else(|e| panic!("非法的路由模板`{}`：{}", template, e));
        if self.contains(method, template) {
            panic!("重复注册的路由：{} {}", method, template);
        }

        let route = Route {
            method,
            pattern,
            handler: Box::new(handler),
        };
        debug!("注册路由：{} {}", method, template);

        if route.pattern.is_literal() {
            self.exact
                .entry(method)
                .or_default()
                .insert(template.to_string(), route);
        } else {
            // 插在第一个比它更不具体的路由之前，具体程度相同的按注册顺序排列
            let specificity = route.pattern.specificity();
            let index = self
                .patterns
                .iter()
                .position(|r| r.pattern.specificity() > specificity)
                .unwrap_or(self.patterns.len());
            self.patterns.insert(index, route);
        }
    }

    /// 注册一条路由并返回 `self`，便于链式调用。
    pub fn route<F>(mut self, method: HttpRequestMethod, template: &str, handler: F) -> Self
    where
        F: Fn(&Request, Response) -> Response + Send + Sync + 'static,
    {
        self.register(method, template, handler);
        self
    }

    fn contains(&self, method: HttpRequestMethod, template: &str) -> bool {
        let literal = self
            .exact
            .get(&method)
            .is_some_and(|table| table.contains_key(template));
        literal
            || self
                .patterns
                .iter()
                .any(|r| r.method == method && r.pattern.as_str() == template)
    }

    /// 已注册的路由数量
    pub fn len(&self) -> usize {
        self.exact.values().map(HashMap::len).sum::<usize>() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 把请求分发给匹配的处理函数。
    ///
    /// 永远不会失败：找不到路由本身就是一种正常结果，表现为 404 响应。
    pub fn dispatch(&self, request: &Request) -> Response {
        let method = request.method();
        let path = request.path();

        if let Some(route) = self.exact.get(&method).and_then(|table| table.get(path)) {
            debug!("精确匹配路由：{} {}", method, route.pattern.as_str());
            return (route.handler)(request, Response::new());
        }

        for route in self.patterns.iter().filter(|r| r.method == method) {
            if let Some(params) = route.pattern.captures(path) {
                debug!("模板匹配路由：{} {} <- {}", method, route.pattern.as_str(), path);
                let bound = request.clone().with_params(params);
                return (route.handler)(&bound, Response::new());
            }
        }

        debug!("没有匹配的路由：{} {}", method, path);
        Response::response_404()
    }
}
