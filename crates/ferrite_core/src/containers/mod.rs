//! # Containers
//!
//! Specialised containers with explicit failure signalling.
//!
//! | Container        | Capacity       | Empty access            |
//! |------------------|----------------|-------------------------|
//! | `CircularBuffer` | fixed, evicts  | `None` / `EmptyContainer` |
//! | `SimpleHashMap`  | doubles at 75% | `None` / `false`        |
//! | `Stack`          | growable       | `None` / `EmptyContainer` |
//! | `Queue`          | growable       | `None` / `EmptyContainer` |
//! | `StaticArray`    | exactly `N`    | `IndexOutOfRange`       |
//!
//! None of these are thread-safe.

mod circular_buffer;
mod hash_map;
mod queue;
mod stack;
mod static_array;

pub use circular_buffer::CircularBuffer;
pub use hash_map::SimpleHashMap;
pub use queue::Queue;
pub use stack::Stack;
pub use static_array::StaticArray;
