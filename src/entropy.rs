//! Entropy arithmetic shared by the password and passphrase generators.

/// `count × log2(pool)`: the entropy of `count` independent uniform draws
/// from a pool of `pool` equally likely symbols. An empty pool has none.
pub fn bits(count: usize, pool: usize) -> f64 {
    if pool == 0 {
        return 0.0;
    }

    count as f64 * (pool as f64).log2()
}
