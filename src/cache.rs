// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 字节存储的 LRU 读缓存。条目以修改时间校验，文件被改动后旧条目自动失效。

use std::num::NonZeroUsize;
use std::time::SystemTime;

use bytes::Bytes;
use lru::LruCache;

struct CacheEntry {
    content: Bytes,
    modified_time: SystemTime,
}

pub struct FileCache {
    cache: LruCache<String, CacheEntry>,
}

impl FileCache {
    // 根据容量构造
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = match NonZeroUsize::new(capacity) {
            Some(c) => c,
            None => panic!("调用from_capacity时指定的大小是0。如果需要自动设置大小，请在调用处进行处理，而不是传入0"),
        };
        Self {
            cache: LruCache::new(capacity),
        }
    }

    pub fn push(&mut self, key: &str, content: Bytes, modified_time: SystemTime) {
        self.cache.put(
            key.to_string(),
            CacheEntry {
                content,
                modified_time,
            },
        );
    }

    // 只返回修改时间一致的条目
    pub fn find(&mut self, key: &str, current_modified_time: SystemTime) -> Option<Bytes> {
        match self.cache.get(key) {
            Some(entry) if entry.modified_time == current_modified_time => {
                Some(entry.content.clone())
            }
            _ => None,
        }
    }

    pub fn invalidate(&mut self, key: &str) {
        self.cache.pop(key);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
