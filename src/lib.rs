//! kinto-core - JSON object storage with a pluggable backend contract
//!
//! - `query`: filter, sort and paginate in-memory object sets
//! - `storage`: the backend contract, the memory backend, id generators,
//!   timestamps and tombstones
//! - `cache`: TTL key/value cache
//! - `observability`: structured logs and counters

pub mod cache;
pub mod observability;
pub mod query;
pub mod storage;
