// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 配置
//!
//! 配置先从 TOML 文件（默认 `config/development.toml`）读取，再由命令行参数覆盖。
//! 文件中缺省的字段使用默认值；文件不存在或无法解析时整体使用默认配置，服务器照常启动。
//!
//! ```bash
//! ./miniserver --directory /tmp/files --port 4221
//! ```

use std::fs;
use std::io;

use clap::Parser;
use log::{error, info, warn};
use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/development.toml";

/// 命令行参数
#[derive(Debug, Clone, Parser)]
#[command(name = "miniserver")]
#[command(about = "基于路由表的小型 HTTP/1.1 服务器")]
#[command(version)]
pub struct Cli {
    /// `/files/*` 路由读写文件的目录
    #[arg(long, env = "MINISERVER_DIRECTORY")]
    pub directory: Option<String>,

    /// TOML 配置文件路径
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, env = "MINISERVER_CONFIG")]
    pub config: String,

    /// 监听地址
    #[arg(long, env = "MINISERVER_HOST")]
    pub host: Option<String>,

    /// 监听端口
    #[arg(short, long, env = "MINISERVER_PORT")]
    pub port: Option<u16>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    host: String,
    port: u16,
    directory: String,
    worker_threads: usize,
    cache_size: usize,
    max_request_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4221,
            directory: String::new(),
            worker_threads: 0,
            cache_size: 5,
            max_request_size: 1024 * 1024, // 1MB
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取配置文件，再用命令行参数覆盖
    pub fn load(cli: &Cli) -> Self {
        Self::from_toml(&cli.config).apply_cli(cli)
    }

    pub fn from_toml(filename: &str) -> Self {
        let text = match fs::read_to_string(filename) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("找不到配置文件{}，使用默认配置", filename);
                return Self::new().normalize();
            }
            Err(e) => {
                error!("读取配置文件{}失败：{}，使用默认配置", filename, e);
                return Self::new().normalize();
            }
        };
        Self::parse(&text)
    }

    /// 解析 TOML 文本，失败时使用默认配置
    pub fn parse(text: &str) -> Self {
        let raw_config = match toml::from_str::<Config>(text) {
            Ok(config) => config,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象：{}，使用默认配置", e);
                Self::new()
            }
        };
        raw_config.normalize()
    }

    fn normalize(mut self) -> Self {
        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }
        if self.cache_size == 0 {
            warn!("cache_size被设置为0，但目前尚不支持禁用缓存，因此该值将被改为5。");
            self.cache_size = 5;
        }
        if self.max_request_size == 0 {
            warn!("max_request_size不能为0，使用默认值");
            self.max_request_size = Self::default().max_request_size;
        }
        self
    }

    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(directory) = &cli.directory {
            info!("命令行指定文件目录：{}", directory);
            self.directory = directory.clone();
        }
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        self
    }
}

impl Config {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.address(), "0.0.0.0:4221");
        assert_eq!(config.directory(), "");
        assert_eq!(config.cache_size(), 5);
        assert_eq!(config.max_request_size(), 1048576);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("port = 8080\ndirectory = \"/tmp/files\"\n");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.directory(), "/tmp/files");
        assert_eq!(config.host(), "0.0.0.0");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let config = Config::parse("port = \"not a number\"");
        assert_eq!(config.port(), 4221);
    }

    #[test]
    fn test_zero_values_are_normalized() {
        let config = Config::parse("worker_threads = 0\ncache_size = 0\nmax_request_size = 0\n");
        assert_eq!(config.worker_threads(), num_cpus::get());
        assert_eq!(config.cache_size(), 5);
        assert_eq!(config.max_request_size(), 1048576);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Config::from_toml(path.to_str().unwrap());
        assert_eq!(config.port(), 4221);
        assert!(config.worker_threads() > 0);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "host = \"127.0.0.1\"\nworker_threads = 2\ncache_size = 16").unwrap();

        let config = Config::from_toml(file.path().to_str().unwrap());
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.worker_threads(), 2);
        assert_eq!(config.cache_size(), 16);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli::parse_from([
            "miniserver",
            "--directory",
            "/tmp/",
            "--port",
            "9000",
        ]);
        let config = Config::parse("port = 8080\nhost = \"127.0.0.1\"").apply_cli(&cli);
        assert_eq!(config.directory(), "/tmp/");
        assert_eq!(config.port(), 9000);
        // 没有在命令行给出的字段保持文件中的值
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["miniserver"]);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert!(cli.directory.is_none());
    }
}
