// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # miniserver
//!
//! 启动流程：初始化日志，载入配置，按配置构建 tokio 运行时，
//! 组装字节存储与默认路由表，然后运行 accept 循环直到收到 Ctrl-C。

use std::sync::Arc;

use clap::Parser;
use log::{error, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use tokio::runtime::Builder;

use miniserver::{default_router, param::SERVER_NAME, Cli, Config, FileStore, Server};

fn init_logger() {
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        // 配置文件缺失或无效时退回到控制台输出
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(
                "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
            )))
            .build();
        let fallback = log4rs::Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info));
        match fallback {
            Ok(config) => {
                if let Err(e) = log4rs::init_config(config) {
                    eprintln!("无法初始化日志系统：{}", e);
                }
            }
            Err(e) => eprintln!("无法构建默认日志配置：{}", e),
        }
        error!("无法载入config/log4rs.yaml：{}，使用控制台日志", e);
    }
}

fn main() {
    init_logger();

    let cli = Cli::parse();
    info!("{} 正在启动", SERVER_NAME);
    let config = Config::load(&cli);
    info!("配置文件已载入：{}", cli.config);
    info!("文件目录：{:?}", config.directory());

    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建tokio运行时：{}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(FileStore::new(config.directory(), config.cache_size()));
    let router = Arc::new(default_router(store));
    info!("已注册{}条路由", router.len());

    runtime.block_on(async {
        let address = config.address();
        let server = match Server::bind(&address, router).await {
            Ok(server) => server.with_max_request_size(config.max_request_size()),
            Err(e) => {
                error!("无法绑定地址：{}，错误：{}", address, e);
                std::process::exit(1);
            }
        };

        server
            .serve_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("无法监听停机信号：{}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;
    });

    info!("{} 已关闭", SERVER_NAME);
}
