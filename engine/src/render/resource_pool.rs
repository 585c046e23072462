//! Resource Pools
//!
//! Size-keyed reuse of GPU objects across renders:
//! - [`ResourcePool`] hands out exclusive leases, returned on drop (input textures)
//! - [`TargetCache`] keeps one shared object per size (output targets)
//! - [`BindingCache`] memoizes objects derived from a key (bind groups)
//!
//! All three are generic so they can be exercised without a device.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Deref;
use std::rc::Rc;

/// Width/height key shared by the pools.
pub type SizeKey = (u32, u32);

type FreeList<T> = Rc<RefCell<Vec<T>>>;

/// Free lists of same-sized objects.
pub struct ResourcePool<T> {
    free: HashMap<SizeKey, FreeList<T>>,
    allocations: usize,
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourcePool<T> {
    pub fn new() -> Self {
        Self {
            free: HashMap::new(),
            allocations: 0,
        }
    }

    /// Take a free object of `size`, or build one with `create`.
    ///
    /// The object goes back to the free list of its size when the lease drops.
    pub fn acquire_with(&mut self, size: SizeKey, create: impl FnOnce(SizeKey) -> T) -> Lease<T> {
        let list = Rc::clone(self.free.entry(size).or_default());
        let reused = list.borrow_mut().pop();
        let item = match reused {
            Some(item) => item,
            None => {
                self.allocations += 1;
                create(size)
            }
        };
        Lease {
            item: Some(item),
            home: list,
        }
    }

    /// Objects created by this pool so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Objects currently sitting in free lists.
    pub fn idle(&self) -> usize {
        self.free.values().map(|list| list.borrow().len()).sum()
    }

    /// Drop all idle objects. Leases still outstanding are dropped on release.
    pub fn clear(&mut self) {
        for list in self.free.values() {
            list.borrow_mut().clear();
        }
        self.free.clear();
    }
}

/// Exclusive use of a pooled object until dropped.
pub struct Lease<T> {
    item: Option<T>,
    home: FreeList<T>,
}

impl<T> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // `item` is only taken in drop
        match &self.item {
            Some(item) => item,
            None => unreachable!("lease accessed after release"),
        }
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.home.borrow_mut().push(item);
        }
    }
}

/// One shared object per size, created on first request and kept for the
/// lifetime of the cache.
pub struct TargetCache<T> {
    targets: HashMap<SizeKey, Rc<T>>,
    creations: usize,
}

impl<T> Default for TargetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TargetCache<T> {
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
            creations: 0,
        }
    }

    pub fn get_or_create(&mut self, size: SizeKey, create: impl FnOnce(SizeKey) -> T) -> Rc<T> {
        let creations = &mut self.creations;
        let target = self.targets.entry(size).or_insert_with(|| {
            *creations += 1;
            Rc::new(create(size))
        });
        Rc::clone(target)
    }

    pub fn creations(&self) -> usize {
        self.creations
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

/// Objects built once per key and reused.
pub struct BindingCache<K, B> {
    entries: HashMap<K, Rc<B>>,
    builds: usize,
    hits: usize,
}

impl<K: Eq + Hash, B> Default for BindingCache<K, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, B> BindingCache<K, B> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            builds: 0,
            hits: 0,
        }
    }

    pub fn get_or_build(&mut self, key: K, build: impl FnOnce() -> B) -> Rc<B> {
        if let Some(existing) = self.entries.get(&key) {
            self.hits += 1;
            return Rc::clone(existing);
        }
        self.builds += 1;
        let built = Rc::new(build());
        self.entries.insert(key, Rc::clone(&built));
        built
    }

    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // ResourcePool
    // ============================================================================

    #[test]
    fn test_pool_reuses_released_object() {
        let mut pool = ResourcePool::new();
        let mut next_id = 0;
        let mut make = |_size: SizeKey| {
            next_id += 1;
            next_id
        };

        let first = *pool.acquire_with((16, 16), &mut make);
        let second = *pool.acquire_with((16, 16), &mut make);

        assert_eq!(first, 1);
        assert_eq!(second, 1, "released object should be handed out again");
        assert_eq!(pool.allocations(), 1);
    }

    #[test]
    fn test_pool_outstanding_leases_are_distinct() {
        let mut pool = ResourcePool::new();
        let mut next_id = 0;
        let mut make = |_size: SizeKey| {
            next_id += 1;
            next_id
        };

        let a = pool.acquire_with((16, 16), &mut make);
        let b = pool.acquire_with((16, 16), &mut make);
        assert_ne!(*a, *b);
        assert_eq!(pool.allocations(), 2);
        assert_eq!(pool.idle(), 0);

        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_pool_keys_by_size() {
        let mut pool = ResourcePool::new();
        let small = pool.acquire_with((16, 16), |(w, h)| w * h);
        let large = pool.acquire_with((32, 32), |(w, h)| w * h);
        assert_eq!(*small, 256);
        assert_eq!(*large, 1024);
        drop(small);

        // A free 16x16 object must not satisfy a 32x32 request
        let other = pool.acquire_with((32, 32), |(w, h)| w * h + 1);
        assert_eq!(*other, 1025);
        assert_eq!(pool.allocations(), 3);
    }

    #[test]
    fn test_pool_clear_drops_idle() {
        let mut pool = ResourcePool::new();
        drop(pool.acquire_with((4, 4), |_| 0u8));
        assert_eq!(pool.idle(), 1);
        pool.clear();
        assert_eq!(pool.idle(), 0);
    }

    // ============================================================================
    // TargetCache
    // ============================================================================

    #[test]
    fn test_target_cache_creates_once_per_size() {
        let mut cache = TargetCache::new();
        let a = cache.get_or_create((256, 256), |(w, _)| w);
        let b = cache.get_or_create((256, 256), |_| 0);
        let c = cache.get_or_create((64, 64), |(w, _)| w);

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(*c, 64);
        assert_eq!(cache.creations(), 2);
        assert_eq!(cache.len(), 2);
    }

    // ============================================================================
    // BindingCache
    // ============================================================================

    #[test]
    fn test_binding_cache_builds_once_per_key() {
        let mut cache = BindingCache::new();
        let first = cache.get_or_build(7u64, || "group-7".to_string());
        let again = cache.get_or_build(7u64, || unreachable!());
        let other = cache.get_or_build(8u64, || "group-8".to_string());

        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(other.as_str(), "group-8");
        assert_eq!(cache.builds(), 2);
        assert_eq!(cache.hits(), 1);
    }
}
