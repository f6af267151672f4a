//! # Ferrite Core Verification Tests
//!
//! End-to-end checks of the public API:
//!
//! 1. **Containers**: ring buffer eviction, hash map against `std` as a model
//! 2. **Linear Allocator**: bounds, alignment and reset under random load
//! 3. **Object Pool**: reuse, growth and cross-thread hand-off
//! 4. **Intrusive Pointer**: exactly-once destruction across threads
//!
//! Run with: cargo test --test core_verification -- --nocapture

#![allow(missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ferrite_core::memory::align::is_aligned;
use ferrite_core::{
    AlignedMemory, Allocation, Allocator, CircularBuffer, CoreError, FerriteConfig, IntrusivePtr,
    LinearAllocator, ObjectPool, Queue, RefCounted, RefCounter, SimpleHashMap, Stack, StaticArray,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 0x5EED_F00D;

// ============================================================================
// CONTAINERS
// ============================================================================

#[test]
fn verify_ring_buffer_evicts_oldest() {
    let mut ring = CircularBuffer::new(3).expect("capacity is non-zero");
    for item in ["a", "b", "c", "d"] {
        ring.push(item);
    }

    assert!(ring.is_full());
    assert_eq!(ring.front(), Ok(&"b"));
    assert_eq!(ring.back(), Ok(&"d"));
    assert_eq!(ring.iter().copied().collect::<Vec<_>>(), ["b", "c", "d"]);
}

#[test]
fn verify_ring_buffer_matches_bounded_deque() {
    const CAPACITY: usize = 7;
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut ring = CircularBuffer::new(CAPACITY).expect("capacity is non-zero");
    let mut model: VecDeque<u32> = VecDeque::with_capacity(CAPACITY);

    for step in 0..10_000u32 {
        if rng.gen_bool(0.6) {
            ring.push(step);
            if model.len() == CAPACITY {
                model.pop_front();
            }
            model.push_back(step);
        } else {
            assert_eq!(ring.pop(), model.pop_front());
        }

        assert_eq!(ring.len(), model.len());
        assert!(ring.len() <= ring.capacity());
        assert_eq!(ring.front().ok(), model.front());
        assert_eq!(ring.back().ok(), model.back());
    }

    assert!(ring.iter().eq(model.iter()));
}

#[test]
fn verify_zero_capacity_rejected() {
    assert!(matches!(
        CircularBuffer::<u8>::new(0),
        Err(CoreError::ZeroCapacity { .. })
    ));
    assert!(LinearAllocator::new(0).is_err());
    assert!(ObjectPool::<u8>::new(0).is_err());
}

#[test]
fn verify_hash_map_matches_std() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut map: SimpleHashMap<u16, u32> = SimpleHashMap::with_capacity(4);
    let mut model: HashMap<u16, u32> = HashMap::new();

    for step in 0..20_000u32 {
        // Small key space so erases and re-inserts hit tombstones often.
        let key = rng.gen_range(0..512u16);
        match rng.gen_range(0..3) {
            0 | 1 => assert_eq!(map.insert(key, step), model.insert(key, step)),
            _ => assert_eq!(map.erase(&key), model.remove(&key).is_some()),
        }

        assert_eq!(map.len(), model.len());
        assert!(map.load_factor() <= 0.75 + f64::EPSILON);
    }

    for key in 0..512u16 {
        assert_eq!(map.find(&key), model.get(&key));
        assert_eq!(map.contains(&key), model.contains_key(&key));
    }

    let mut pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let mut expected: Vec<_> = model.into_iter().collect();
    pairs.sort_unstable();
    expected.sort_unstable();
    assert_eq!(pairs, expected);
}

#[test]
fn verify_hash_map_growth_keeps_entries() {
    let mut map = SimpleHashMap::with_capacity(2);
    for i in 0..1_000u32 {
        map.insert(format!("key-{i}"), i);
    }

    assert_eq!(map.len(), 1_000);
    assert!(map.capacity() >= 1_000);
    for i in 0..1_000u32 {
        assert_eq!(map.find(format!("key-{i}").as_str()), Some(&i));
    }
}

#[test]
fn verify_hash_map_counter_entry() {
    let mut counts: SimpleHashMap<&str, usize> = SimpleHashMap::new();
    for word in "the cat saw the other cat near the door".split(' ') {
        *counts.get_or_insert_default(word) += 1;
    }

    assert_eq!(counts.find("the"), Some(&3));
    assert_eq!(counts.find("cat"), Some(&2));
    assert_eq!(counts.find("dog"), None);
}

#[test]
fn verify_stack_and_queue_orders() {
    let mut stack = Stack::new();
    let mut queue = Queue::new();
    for i in 1..=3 {
        stack.push(i);
        queue.push(i);
    }

    assert_eq!(stack.top(), Ok(&3));
    assert_eq!(queue.front(), Ok(&1));
    assert_eq!(queue.back(), Ok(&3));

    let popped: Vec<_> = std::iter::from_fn(|| stack.pop()).collect();
    let dequeued: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
    assert_eq!(popped, [3, 2, 1]);
    assert_eq!(dequeued, [1, 2, 3]);

    assert!(matches!(stack.top(), Err(CoreError::EmptyContainer(_))));
    assert!(matches!(queue.front(), Err(CoreError::EmptyContainer(_))));
}

#[test]
fn verify_static_array_checked_access() {
    let mut axes: StaticArray<f64, 3> =
        StaticArray::try_from_iter([1.0, 2.0]).expect("two of three slots");
    axes[2] = 4.0;

    assert_eq!(axes.iter().sum::<f64>(), 7.0);
    assert_eq!(axes.at(2), Ok(&4.0));
    assert!(matches!(
        axes.at(3),
        Err(CoreError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(matches!(
        StaticArray::<u8, 1>::try_from_iter([1, 2]),
        Err(CoreError::TooManyElements { capacity: 1 })
    ));
}

// ============================================================================
// LINEAR ALLOCATOR
// ============================================================================

/// Carves `sizes` out of any allocator, stopping at the first refusal.
fn carve(allocator: &mut impl Allocator, sizes: &[usize], alignment: usize) -> Vec<Allocation> {
    sizes
        .iter()
        .map_while(|&size| allocator.allocate(size, alignment))
        .collect()
}

#[test]
fn verify_linear_allocator_bounds() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut arena = LinearAllocator::new(4096).expect("size is non-zero");

    for _round in 0..8 {
        let mut granted = Vec::new();
        loop {
            let size = rng.gen_range(1..=96);
            let alignment = 1usize << rng.gen_range(0..7u32);
            let before = arena.used();

            let Some(allocation) = arena.allocate(size, alignment) else {
                // A refusal leaves the offset untouched.
                assert_eq!(arena.used(), before);
                break;
            };

            assert!(arena.used() <= arena.capacity());
            let bytes = arena.bytes(&allocation).expect("handle is live");
            assert_eq!(bytes.len(), size);
            assert!(is_aligned(bytes.as_ptr() as usize, alignment));
            granted.push(allocation);
        }

        // Granted ranges never overlap.
        granted.sort_by_key(Allocation::offset);
        for pair in granted.windows(2) {
            assert!(pair[0].offset() + pair[0].size() <= pair[1].offset());
        }

        let total: usize = granted.iter().map(Allocation::size).sum();
        assert_eq!(arena.allocated_bytes(), total);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert!(granted.iter().all(|a| arena.bytes(a).is_none()));
    }
}

#[test]
fn verify_linear_allocator_typed_views() {
    let mut backing = [0u8; 256];
    let mut arena = LinearAllocator::new_in(&mut backing).expect("buffer is non-empty");
    assert!(!arena.owns_memory());

    let floats = arena.alloc_slice::<f32>(8).expect("fits");
    let values = arena.slice_mut::<f32>(&floats).expect("aligned for f32");
    for (i, value) in values.iter_mut().enumerate() {
        *value = i as f32 * 0.5;
    }
    assert_eq!(arena.slice_mut::<f32>(&floats).expect("still live")[3], 1.5);

    // Non power-of-two alignment is refused rather than rounded.
    assert!(arena.allocate(4, 3).is_none());
}

#[test]
fn verify_linear_allocator_over_aligned_block() {
    let mut block: AlignedMemory<64> = AlignedMemory::new(1_024).expect("size is non-zero");
    let mut arena = LinearAllocator::new_in(&mut block).expect("block is non-empty");

    let granted = carve(&mut arena, &[100, 1, 64, 500, 400], 64);
    // Offsets 0, 128, 192 and 256; the 400-byte request would end past 1024.
    assert_eq!(granted.len(), 4);
    assert!(granted.iter().all(|a| a.offset() % 64 == 0));
    assert_eq!(arena.allocated_bytes(), 100 + 1 + 64 + 500);

    for allocation in granted {
        arena.deallocate(allocation);
    }
    assert_eq!(arena.used(), 756);

    Allocator::reset(&mut arena);
    assert_eq!(carve(&mut arena, &[1_024], 64).len(), 1);
}

// ============================================================================
// OBJECT POOL
// ============================================================================

#[test]
fn verify_pool_random_acquire_release() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let pool: ObjectPool<[u64; 4]> = ObjectPool::new(16).expect("chunk size is non-zero");
    let mut live = Vec::new();

    for step in 0..5_000u64 {
        if live.is_empty() || rng.gen_bool(0.55) {
            live.push((step, pool.acquire([step; 4])));
        } else {
            let index = rng.gen_range(0..live.len());
            let (stamp, ptr) = live.swap_remove(index);
            assert_eq!(*ptr, [stamp; 4]);
            pool.release(ptr);
        }

        assert_eq!(pool.used_blocks(), live.len());
        assert_eq!(pool.used_blocks() + pool.free_blocks(), pool.total_blocks());
        assert_eq!(pool.total_blocks(), pool.chunk_count() * 16);
    }

    for (_, ptr) in live.drain(..) {
        pool.release(ptr);
    }
    assert_eq!(pool.used_blocks(), 0);
}

#[test]
fn verify_pool_hands_objects_across_threads() {
    let pool: ObjectPool<Vec<u32>> = ObjectPool::new(8).expect("chunk size is non-zero");
    let (tx, rx) = crossbeam_channel::bounded(32);

    std::thread::scope(|scope| {
        let producer_pool = &pool;
        scope.spawn(move || {
            for i in 0..1_000u32 {
                tx.send(producer_pool.acquire(vec![i; 3]))
                    .expect("receiver alive");
            }
        });

        let consumer_pool = &pool;
        scope.spawn(move || {
            let mut received = 0u32;
            while let Ok(ptr) = rx.recv() {
                assert_eq!(ptr.len(), 3);
                assert_eq!(ptr[0], received);
                consumer_pool.release(ptr);
                received += 1;
            }
            assert_eq!(received, 1_000);
        });
    });

    assert_eq!(pool.used_blocks(), 0);
    assert!(pool.total_blocks() >= 8);
}

#[test]
fn verify_pooled_object_returns_on_drop() {
    let pool: ObjectPool<String> = ObjectPool::default();
    {
        let mut greeting = pool.acquire_pooled(String::from("hello"));
        greeting.push_str(", world");
        assert_eq!(greeting.as_str(), "hello, world");
        assert_eq!(pool.used_blocks(), 1);
    }
    assert_eq!(pool.used_blocks(), 0);
}

// ============================================================================
// INTRUSIVE POINTER
// ============================================================================

struct Resource {
    refs: RefCounter,
    destroyed: Arc<AtomicUsize>,
}

// SAFETY: `refs` is a field of `Resource`.
#[allow(unsafe_code)]
unsafe impl RefCounted for Resource {
    fn ref_counter(&self) -> &RefCounter {
        &self.refs
    }
}

impl Drop for Resource {
    fn drop(&mut self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

fn resource(destroyed: &Arc<AtomicUsize>) -> IntrusivePtr<Resource> {
    IntrusivePtr::new(Resource {
        refs: RefCounter::new(),
        destroyed: Arc::clone(destroyed),
    })
}

#[test]
fn verify_intrusive_counts_stay_with_their_object() {
    let first_destroyed = Arc::new(AtomicUsize::new(0));
    let second_destroyed = Arc::new(AtomicUsize::new(0));

    let first = resource(&first_destroyed);
    let second = resource(&second_destroyed);
    let first_clone = first.clone();

    drop(second);
    drop(first);
    assert_eq!(second_destroyed.load(Ordering::SeqCst), 1);
    assert_eq!(first_destroyed.load(Ordering::SeqCst), 0);
    assert_eq!(first_clone.use_count(), 1);

    drop(first_clone);
    assert_eq!(first_destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn verify_intrusive_pointer_shared_across_threads() {
    let destroyed = Arc::new(AtomicUsize::new(0));
    let root = resource(&destroyed);
    let (tx, rx) = crossbeam_channel::unbounded();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let tx = tx.clone();
            let local = root.clone();
            scope.spawn(move || {
                for _ in 0..250 {
                    tx.send(local.clone()).expect("receiver alive");
                }
            });
        }
    });
    drop(tx);

    assert_eq!(root.use_count(), 1 + 1_000);
    let collected: Vec<_> = rx.iter().collect();
    assert_eq!(collected.len(), 1_000);
    drop(collected);

    assert_eq!(root.use_count(), 1);
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    drop(root);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn verify_construction_from_config() {
    let config = FerriteConfig::from_toml_str(
        r"
        [hash_map]
        initial_capacity = 8

        [pool]
        blocks_per_chunk = 4

        [arena]
        size_bytes = 128
        default_alignment = 16
        ",
    )
    .expect("valid config");

    let map: SimpleHashMap<u32, u32> = SimpleHashMap::from_config(&config.hash_map);
    assert_eq!(map.capacity(), 8);

    let pool: ObjectPool<u64> = ObjectPool::from_config(&config.pool).expect("valid pool");
    assert_eq!(pool.total_blocks(), 4);

    let mut arena = LinearAllocator::from_config(&config.arena).expect("valid arena");
    assert_eq!(arena.capacity(), 128);
    let block = arena.allocate_default(3).expect("fits");
    let address = arena.bytes(&block).expect("live").as_ptr() as usize;
    assert!(is_aligned(address, 16));
}
