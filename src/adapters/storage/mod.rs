//! Storage Adapters
//!
//! Implementations of the ThreadRepository port.
//!
//! ## Available Adapters
//!
//! - **InMemoryThreadRepository** - Stores thread records in memory (testing/development)

mod in_memory_thread_repository;

pub use in_memory_thread_repository::InMemoryThreadRepository;
