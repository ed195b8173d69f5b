// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 默认路由
//!
//! | 方法 | 路径 | 行为 |
//! |---|---|---|
//! | GET | `/` | 200，空正文 |
//! | GET | `/echo/:suffix` | 200，正文为 suffix；客户端接受 gzip 时压缩正文 |
//! | GET | `/user-agent` | 200，正文为 User-Agent |
//! | GET | `/files/:id` | 200 返回文件内容，不存在时 404 |
//! | POST | `/files/:name` | 把请求正文写入存储，成功时 201 |

use std::sync::Arc;

use log::{error, warn};

use crate::{
    param::HttpRequestMethod::{Get, Post},
    request::Request,
    response::Response,
    router::Router,
    store::ByteStore,
    util::gzip,
};

/// 构建默认路由表
pub fn default_router(store: Arc<dyn ByteStore>) -> Router {
    let read_store = Arc::clone(&store);
    let write_store = store;

    Router::new()
        .route(Get, "/", index)
        .route(Get, "/echo/:suffix", echo)
        .route(Get, "/user-agent", user_agent)
        .route(Get, "/files/:id", move |req: &Request, res: Response| {
            read_file(read_store.as_ref(), req, res)
        })
        .route(Post, "/files/:name", move |req: &Request, res: Response| {
            write_file(write_store.as_ref(), req, res)
        })
}

pub fn index(_request: &Request, response: Response) -> Response {
    response
}

pub fn echo(request: &Request, mut response: Response) -> Response {
    let suffix = request.param("suffix").unwrap_or_default();
    response.set_header("Content-Type", "text/plain");

    if request.header("Accept-Encoding") == Some("gzip") {
        match gzip(suffix.as_bytes()) {
            Ok(compressed) => {
                response
                    .set_header("Content-Encoding", "gzip")
                    .set_body(compressed);
                return response;
            }
            Err(e) => error!("gzip压缩失败：{}，返回未压缩内容", e),
        }
    }

    response.set_body(suffix.to_string());
    response
}

pub fn user_agent(request: &Request, mut response: Response) -> Response {
    response
        .set_header("Content-Type", "text/plain")
        .set_body(request.user_agent());
    response
}

pub fn read_file(store: &dyn ByteStore, request: &Request, mut response: Response) -> Response {
    let key = request.param("id").unwrap_or_default();
    match store.read(key) {
        Ok(bytes) => {
            response
                .set_header("Content-Type", "application/octet-stream")
                .set_body(bytes);
            response
        }
        Err(e) => {
            warn!("读取{}失败：{}", key, e);
            Response::from_status_code(e.status_code())
        }
    }
}

pub fn write_file(store: &dyn ByteStore, request: &Request, _response: Response) -> Response {
    let key = request.param("name").unwrap_or_default();
    match store.write(key, request.body()) {
        Ok(()) => Response::from_status_code(201),
        Err(e) => {
            warn!("写入{}失败：{}", key, e);
            Response::from_status_code(e.status_code())
        }
    }
}
