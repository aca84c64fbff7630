//! Kernel column cache
//!
//! The SMO solver needs whole kernel columns `K(·, i)` each time it updates
//! the gradient, so columns are the unit of caching. Columns are kept in an
//! LRU cache whose capacity is derived from a byte budget.

use crate::kernel::Kernel;
use lru::LruCache;
use ndarray::ArrayView2;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// LRU cache of kernel matrix columns for one training problem
pub struct KernelCache {
    columns: LruCache<usize, Rc<[f64]>>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a cache holding at most `capacity` columns
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            columns: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache for columns of length `column_len` within `memory_bytes`.
    ///
    /// At least two columns are always kept, since every solver step uses a pair.
    pub fn with_memory_limit(memory_bytes: usize, column_len: usize) -> Self {
        let column_bytes = column_len.max(1) * std::mem::size_of::<f64>();
        Self::new((memory_bytes / column_bytes).max(2))
    }

    /// Get column `i` of the kernel matrix over the rows of `x`, computing it on a miss
    pub fn column<K: Kernel>(&mut self, kernel: &K, x: ArrayView2<f64>, i: usize) -> Rc<[f64]> {
        if let Some(column) = self.columns.get(&i) {
            self.hits += 1;
            return Rc::clone(column);
        }

        self.misses += 1;
        let row_i = x.row(i);
        let column: Rc<[f64]> = x
            .rows()
            .into_iter()
            .map(|row| kernel.compute(row_i, row))
            .collect();
        self.columns.put(i, Rc::clone(&column));
        column
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.columns.cap().get(),
            size: self.columns.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;
    use ndarray::array;

    #[test]
    fn test_column_values() {
        let x = array![[1.0, 0.0], [0.0, 2.0], [1.0, 1.0]];
        let mut cache = KernelCache::new(3);

        let column = cache.column(&LinearKernel, x.view(), 2);
        assert_eq!(&*column, &[1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_hits_and_misses() {
        let x = array![[1.0], [2.0]];
        let mut cache = KernelCache::new(2);

        cache.column(&LinearKernel, x.view(), 0);
        cache.column(&LinearKernel, x.view(), 0);
        cache.column(&LinearKernel, x.view(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.size, 2);
        assert!((cache.hit_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_lru_eviction() {
        let x = array![[1.0], [2.0], [3.0]];
        let mut cache = KernelCache::new(2);

        cache.column(&LinearKernel, x.view(), 0);
        cache.column(&LinearKernel, x.view(), 1);
        cache.column(&LinearKernel, x.view(), 2); // evicts column 0

        cache.column(&LinearKernel, x.view(), 0);
        assert_eq!(cache.stats().misses, 4);
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_memory_limit_keeps_a_pair() {
        let cache = KernelCache::with_memory_limit(0, 1000);
        assert_eq!(cache.stats().capacity, 2);

        let cache = KernelCache::with_memory_limit(8 * 1000 * 10, 1000);
        assert_eq!(cache.stats().capacity, 10);
    }

    #[test]
    fn test_hit_rate_empty() {
        let cache = KernelCache::new(4);
        assert_eq!(cache.hit_rate(), 0.0);
    }
}
