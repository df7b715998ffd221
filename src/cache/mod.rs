use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

/// Thin JSON-over-Redis cache used by the read-heavy catalog endpoints
/// (courses, blog posts, teacher directory).
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with a TTL.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut self.connection.clone())
            .await
    }

    /// Delete all keys matching a pattern (cache invalidation on mutation).
    pub async fn delete_pattern(&self, pattern: &str) -> redis::RedisResult<()> {
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut self.connection.clone())
            .await?;

        if !keys.is_empty() {
            let _: () = redis::cmd("DEL")
                .arg(&keys)
                .query_async(&mut self.connection.clone())
                .await?;
        }

        Ok(())
    }
}

/// Cache key generators.
pub mod keys {
    /// Published course catalog, keyed by the filter combination.
    pub fn course_list(language: Option<&str>, level: Option<&str>) -> String {
        format!(
            "courses:list:{}:{}",
            language.unwrap_or("*"),
            level.unwrap_or("*")
        )
    }

    pub fn course(slug: &str) -> String {
        format!("courses:slug:{slug}")
    }

    /// Published blog listing, keyed by category filter.
    pub fn post_list(category: Option<&str>) -> String {
        format!("posts:list:{}", category.unwrap_or("*"))
    }

    pub fn post(slug: &str) -> String {
        format!("posts:slug:{slug}")
    }

    pub fn teacher_directory() -> String {
        "teachers:directory".to_string()
    }
}

/// Per-resource TTLs, overridable from the environment. Built once at
/// startup and shared through app data.
pub struct CacheConfig {
    pub course_ttl: Duration,
    pub post_ttl: Duration,
    pub teacher_ttl: Duration,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            course_ttl: parse_duration_secs("CACHE_TTL_COURSES", 300),
            post_ttl: parse_duration_secs("CACHE_TTL_POSTS", 300),
            teacher_ttl: parse_duration_secs("CACHE_TTL_TEACHERS", 600),
        }
    }
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

/// Wrapper type for Actix-web app data.
pub type CacheData = Arc<RedisCache>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ttl_env_var_falls_back_to_default() {
        let ttl = parse_duration_secs("CACHE_TTL_UNSET_FOR_TEST", 42);
        assert_eq!(ttl, Duration::from_secs(42));
    }

    #[test]
    fn unparsable_ttl_env_var_falls_back_to_default() {
        unsafe { std::env::set_var("CACHE_TTL_GARBAGE_FOR_TEST", "soon") };
        let ttl = parse_duration_secs("CACHE_TTL_GARBAGE_FOR_TEST", 7);
        assert_eq!(ttl, Duration::from_secs(7));
    }
}
