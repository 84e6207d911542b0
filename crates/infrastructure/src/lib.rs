//! Infrastructure adapters for application ports.
//!
//! Everything here is process-local: the site keeps its security state in
//! memory and loses it on restart, by design.

#![forbid(unsafe_code)]

mod in_memory_attack_log;
mod in_memory_block_list;
mod in_memory_csrf_token_repository;
mod in_memory_rate_limit_repository;

pub use in_memory_attack_log::InMemoryAttackLog;
pub use in_memory_block_list::InMemoryBlockList;
pub use in_memory_csrf_token_repository::InMemoryCsrfTokenRepository;
pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
