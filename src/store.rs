// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 字节存储模块
//!
//! `/files/*` 路由背后的键值存储。`FileStore` 把键映射为基础目录下的同名文件。
//!
//! 键直接来自路由参数，因此在拼接路径之前会先校验：空键、`.`、`..`，
//! 以及包含 `/`、`\`、NUL 的键一律以 [`Exception::InvalidPath`] 拒绝，防止目录遍历。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use log::{debug, error, warn};

use crate::{cache::FileCache, exception::Exception};

/// 外部字节存储
#[cfg_attr(test, mockall::automock)]
pub trait ByteStore: Send + Sync {
    /// 读取键对应的全部字节；键不存在时返回 [`Exception::FileNotFound`]。
    fn read(&self, key: &str) -> Result<Bytes, Exception>;

    /// 写入（创建或覆盖）键对应的字节。
    fn write(&self, key: &str, content: &[u8]) -> Result<(), Exception>;
}

/// 以文件系统目录为后端的字节存储，读操作带有 LRU 缓存。
pub struct FileStore {
    root: PathBuf,
    cache: Mutex<FileCache>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, cache_size: usize) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(FileCache::from_capacity(cache_size)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, Exception> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn lock_cache(&self) -> MutexGuard<'_, FileCache> {
        match self.cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("缓存锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.lock_cache().len()
    }
}

/// 校验存储键，拒绝任何可能逃出基础目录的写法
pub fn validate_key(key: &str) -> Result<(), Exception> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\', '\0']) {
        warn!("拒绝非法的存储键：{:?}", key);
        return Err(Exception::InvalidPath);
    }
    Ok(())
}

fn read_error(key: &str, e: &io::Error) -> Exception {
    match e.kind() {
        io::ErrorKind::NotFound => Exception::FileNotFound,
        _ => {
            error!("读取{}时遇到I/O错误：{}", key, e);
            Exception::StoreIoFailure
        }
    }
}

impl ByteStore for FileStore {
    fn read(&self, key: &str) -> Result<Bytes, Exception> {
        let path = self.resolve(key)?;
        // 查询修改时间、读取文件、写入缓存都在同一把锁内完成，
        // 并发的 write 只能在这之前或之后使缓存失效，旧内容不会被重新放回缓存
        let mut cache = self.lock_cache();

        let metadata = fs::metadata(&path).map_err(|e| read_error(key, &e))?;
        if !metadata.is_file() {
            debug!("{}不是普通文件", path.display());
            return Err(Exception::FileNotFound);
        }

        let modified = metadata.modified().ok();
        if let Some(time) = modified {
            if let Some(bytes) = cache.find(key, time) {
                debug!("缓存命中：{}，{} bytes", key, bytes.len());
                return Ok(bytes);
            }
        }

        debug!("读取文件：{}", path.display());
        let bytes = Bytes::from(fs::read(&path).map_err(|e| read_error(key, &e))?);
        if let Some(time) = modified {
            cache.push(key, bytes.clone(), time);
        }
        Ok(bytes)
    }

    fn write(&self, key: &str, content: &[u8]) -> Result<(), Exception> {
        let path = self.resolve(key)?;
        let mut cache = self.lock_cache();
        let result = fs::write(&path, content);
        // 写入失败时文件内容可能已经部分改变，同样使缓存失效
        cache.invalidate(key);
        if let Err(e) = result {
            error!("写入{}时遇到I/O错误：{}", path.display(), e);
            return Err(Exception::StoreIoFailure);
        }
        debug!("已写入{}，{} bytes", path.display(), content.len());
        Ok(())
    }
}
