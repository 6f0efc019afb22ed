use blake3::Hasher;

/// Lowercases and trims a query so equivalent lookups share one cache entry.
#[inline]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Computes the 32-byte cache key for `(category, normalize(query))`.
///
/// The `|` separator keeps `("ab", "c")` and `("a", "bc")` apart.
#[inline]
pub fn hash_cache_key(category: &str, query: &str) -> [u8; 32] {
    let normalized = normalize_query(query);
    let mut hasher = Hasher::new();
    hasher.update(category.as_bytes());
    hasher.update(b"|");
    hasher.update(normalized.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Hex form of [`hash_cache_key`], used as the on-disk file stem.
#[inline]
pub fn cache_key_hex(category: &str, query: &str) -> String {
    blake3::Hash::from(hash_cache_key(category, query))
        .to_hex()
        .to_string()
}

/// Short fingerprint of free text, suitable for embedding in cache queries.
///
/// Document text can be many kilobytes; the cache query keeps only this digest.
#[inline]
pub fn text_fingerprint(text: &str) -> String {
    let hash = blake3::hash(normalize_query(text).as_bytes());
    hash.to_hex().as_str()[..16].to_string()
}
