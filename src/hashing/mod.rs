use blake3::Hasher;

/// Collapses every run of whitespace to a single space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used to fold document content into RNG seeds. Not suitable as a cache key;
/// use [`fingerprint`] for that.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Hash of the whitespace-normalized text, for seeding.
#[inline]
pub fn hash_text(text: &str) -> u64 {
    hash_to_u64(normalize_whitespace(text).as_bytes())
}

/// Content fingerprint used as the prediction cache key.
///
/// Covers `version_salt | model_id | top_k | seed | normalized(text)` with the
/// full 256-bit BLAKE3 digest, hex encoded. The `|` separators keep adjacent
/// fields from bleeding into one another.
pub fn fingerprint(
    version_salt: &str,
    model_id: &str,
    text: &str,
    top_k: usize,
    seed: Option<u64>,
) -> String {
    let seed_repr = seed.map_or_else(|| "none".to_string(), |s| s.to_string());

    let mut hasher = Hasher::new();
    hasher.update(version_salt.as_bytes());
    hasher.update(b"|");
    hasher.update(model_id.as_bytes());
    hasher.update(b"|");
    hasher.update(top_k.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(seed_repr.as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_whitespace(text).as_bytes());
    hasher.finalize().to_hex().to_string()
}
