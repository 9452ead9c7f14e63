//! Parse cache for expression text that is built repeatedly

use crate::error::Result;
use crate::expression::parser::{self, ParseOptions, ParsedExpression};
use ahash::AHashMap;
use log::{debug, trace};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

type CacheKey = (ParseOptions, String);

/// Maximum number of cached expressions; the cache is emptied when full
pub const EXPRESSION_CACHE_CAPACITY: usize = 2048;

/// Global parse cache with fast hashing (ahash)
static EXPRESSION_CACHE: Lazy<RwLock<AHashMap<CacheKey, Arc<ParsedExpression>>>> =
    Lazy::new(|| RwLock::new(AHashMap::with_capacity(256)));

/// Get or parse expression text, sharing the parsed structure between callers.
/// Failures are not cached.
#[inline]
pub fn get_or_parse(text: &str, options: ParseOptions) -> Result<Arc<ParsedExpression>> {
    let key = (options, text.to_string());

    // Fast path: check read lock first
    {
        let cache = EXPRESSION_CACHE.read();
        if let Some(parsed) = cache.get(&key) {
            trace!("expression cache hit for {:?}", text);
            return Ok(Arc::clone(parsed));
        }
    }

    // Slow path: parse and cache
    trace!("expression cache miss for {:?}", text);
    let parsed = Arc::new(parser::parse(text, options)?);

    {
        let mut cache = EXPRESSION_CACHE.write();
        if cache.len() >= EXPRESSION_CACHE_CAPACITY && !cache.contains_key(&key) {
            debug!("expression cache full ({} entries), clearing", cache.len());
            cache.clear();
        }
        cache.entry(key).or_insert_with(|| Arc::clone(&parsed));
    }

    Ok(parsed)
}

/// Clear the expression cache
pub fn clear_cache() {
    EXPRESSION_CACHE.write().clear();
}

/// Number of cached expressions
pub fn cache_size() -> usize {
    EXPRESSION_CACHE.read().len()
}
