pub mod redis;
pub mod snapshots;

pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use snapshots::{RedisSnapshotStore, SnapshotStore};
