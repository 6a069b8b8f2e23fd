use std::{
    fs, io,
    path::{Component, Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use bytes::Bytes;
use log::{debug, warn};
use lru::LruCache;

use crate::exception::ReadError;

/// 页面内容的来源。正式运行时是磁盘，测试时可以替换为计数的替身。
#[cfg_attr(test, mockall::automock)]
pub trait PageSource: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Bytes>;
}

/// 直接读取文件系统
pub struct DiskSource;

impl PageSource for DiskSource {
    fn read(&self, path: &Path) -> io::Result<Bytes> {
        fs::read(path).map(Bytes::from)
    }
}

// (站点根目录, 相对路径)
type CacheKey = (PathBuf, PathBuf);

struct CacheState {
    entries: LruCache<CacheKey, Bytes>,
    used: usize,
}

/// 按字节数限制容量的 LRU 页面缓存。
///
/// 锁只保护缓存簿记（查找、插入、淘汰），磁盘读取在锁外进行。
/// 两个任务同时未命中同一个键时都会读盘，这是允许的。
pub struct PageCache {
    capacity: usize,
    state: Mutex<CacheState>,
    source: Box<dyn PageSource>,
}

impl PageCache {
    // 根据容量构造，容量为0表示禁用缓存
    pub fn from_capacity(capacity: usize) -> Self {
        Self::with_source(capacity, Box::new(DiskSource))
    }

    pub fn with_source(capacity: usize, source: Box<dyn PageSource>) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                used: 0,
            }),
            source,
        }
    }

    /// 读取 `root/relative`，优先使用缓存。
    ///
    /// 读取失败不会被缓存。包含 `..` 或绝对路径成分的相对路径直接视为不存在。
    pub fn get(&self, root: &Path, relative: &str) -> Result<Bytes, ReadError> {
        let relative = Path::new(relative);
        if !is_confined(relative) {
            warn!("拒绝越出站点根目录的路径：{}", relative.display());
            return Err(ReadError::NotFound);
        }
        let key = (root.to_path_buf(), relative.to_path_buf());

        if self.capacity > 0 {
            let hit = self.lock().entries.get(&key).cloned();
            if let Some(bytes) = hit {
                debug!("缓存命中：{}", key.1.display());
                return Ok(bytes);
            }
        }

        let full_path = root.join(relative);
        let bytes = match self.source.read(&full_path) {
            Ok(b) => b,
            Err(e) => {
                debug!("无法读取{}：{}", full_path.display(), e);
                return Err(ReadError::NotFound);
            }
        };
        self.store(key, bytes.clone());
        Ok(bytes)
    }

    // 放入，必要时按LRU顺序淘汰整条记录
    fn store(&self, key: CacheKey, bytes: Bytes) {
        let size = bytes.len();
        if self.capacity == 0 {
            return;
        }
        if size > self.capacity {
            debug!(
                "文件过大({} bytes)，超过缓存容量({} bytes)，跳过缓存",
                size, self.capacity
            );
            return;
        }

        let mut state = self.lock();
        if let Some(old) = state.entries.pop(&key) {
            state.used -= old.len();
        }
        while state.used + size > self.capacity {
            match state.entries.pop_lru() {
                Some(((root, path), evicted)) => {
                    state.used -= evicted.len();
                    debug!("淘汰缓存：{}", root.join(path).display());
                }
                None => break,
            }
        }
        state.used += size;
        state.entries.put(key, bytes);
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("缓存锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }
}

impl PageCache {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前缓存占用的总字节数
    pub fn used(&self) -> usize {
        self.lock().used
    }

    /// 查询而不改变LRU顺序
    pub fn contains(&self, root: &Path, relative: &str) -> bool {
        let key = (root.to_path_buf(), PathBuf::from(relative));
        self.lock().entries.peek(&key).is_some()
    }
}

fn is_confined(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn source_returning(content: &'static [u8], times: usize) -> Box<MockPageSource> {
        let mut source = MockPageSource::new();
        source
            .expect_read()
            .times(times)
            .returning(move |_| Ok(Bytes::from_static(content)));
        Box::new(source)
    }

    #[test]
    fn test_cache_creation() {
        let cache = PageCache::from_capacity(10);
        assert_eq!(cache.capacity(), 10);
        assert!(cache.is_empty());
        assert_eq!(cache.used(), 0);
    }

    #[test]
    fn test_repeated_get_reads_disk_once() {
        let cache = PageCache::with_source(100, source_returning(b"hello", 1));
        let root = Path::new("sites");

        let first = cache.get(root, "index.html").unwrap();
        let second = cache.get(root, "index.html").unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used(), 5);
    }

    #[test]
    fn test_zero_capacity_always_reads_disk() {
        let cache = PageCache::with_source(0, source_returning(b"hello", 3));
        let root = Path::new("sites");

        for _ in 0..3 {
            assert_eq!(cache.get(root, "index.html").unwrap(), Bytes::from("hello"));
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_includes_root() {
        let cache = PageCache::with_source(100, source_returning(b"page", 2));

        cache.get(Path::new("sites"), "404.html").unwrap();
        cache.get(Path::new("err_site"), "404.html").unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(Path::new("err_site"), "404.html"));
    }

    #[test]
    fn test_lru_eviction_by_bytes() {
        // 容量10字节，每个文件6字节，只能容纳一个
        let cache = PageCache::with_source(10, source_returning(b"123456", 3));
        let root = Path::new("sites");

        cache.get(root, "a.html").unwrap();
        cache.get(root, "b.html").unwrap();
        assert!(!cache.contains(root, "a.html"));
        assert!(cache.contains(root, "b.html"));

        cache.get(root, "b.html").unwrap();
        cache.get(root, "a.html").unwrap();
        assert_eq!(cache.used(), 6);
    }

    #[test]
    fn test_least_recently_used_goes_first() {
        let cache = PageCache::with_source(12, source_returning(b"1234", 4));
        let root = Path::new("sites");

        cache.get(root, "a.html").unwrap();
        cache.get(root, "b.html").unwrap();
        cache.get(root, "c.html").unwrap();
        // 访问a，使b成为最久未使用
        cache.get(root, "a.html").unwrap();
        cache.get(root, "d.html").unwrap();

        assert!(cache.contains(root, "a.html"));
        assert!(!cache.contains(root, "b.html"));
        assert!(cache.contains(root, "c.html"));
        assert!(cache.contains(root, "d.html"));
        assert_eq!(cache.used(), 12);
    }

    #[test]
    fn test_oversized_entry_is_not_cached() {
        let cache = PageCache::with_source(4, source_returning(b"too large", 2));
        let root = Path::new("sites");

        cache.get(root, "big.html").unwrap();
        cache.get(root, "big.html").unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_failure_is_not_cached() {
        let mut source = MockPageSource::new();
        source
            .expect_read()
            .times(2)
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound)));
        let cache = PageCache::with_source(100, Box::new(source));

        for _ in 0..2 {
            assert_eq!(
                cache.get(Path::new("sites"), "missing.html"),
                Err(ReadError::NotFound)
            );
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_parent_dir_is_refused() {
        let mut source = MockPageSource::new();
        source.expect_read().never();
        let cache = PageCache::with_source(100, Box::new(source));

        assert_eq!(
            cache.get(Path::new("sites"), "../secret.txt"),
            Err(ReadError::NotFound)
        );
        assert_eq!(
            cache.get(Path::new("sites"), "/etc/passwd"),
            Err(ReadError::NotFound)
        );
    }

    #[test]
    fn test_disk_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();
        let cache = PageCache::from_capacity(1024);

        let body = cache.get(dir.path(), "index.html").unwrap();
        assert_eq!(&body[..], b"<h1>hi</h1>");
        assert_eq!(cache.get(dir.path(), "nope.html"), Err(ReadError::NotFound));
        // 目录本身不能作为页面
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(cache.get(dir.path(), "sub"), Err(ReadError::NotFound));
    }

    #[test]
    fn test_concurrent_gets_respect_capacity() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            fs::write(dir.path().join(format!("{}.html", i)), vec![b'x'; 100]).unwrap();
        }
        let cache = Arc::new(PageCache::from_capacity(350));
        let root = dir.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                let root = root.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let name = format!("{}.html", (i + t) % 8);
                        assert_eq!(cache.get(&root, &name).unwrap().len(), 100);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.used() <= 350);
        assert_eq!(cache.used(), cache.len() * 100);
    }
}
