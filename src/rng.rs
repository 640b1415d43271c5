use crate::error::{GenerationError, Result};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

const BUFFER_LEN: usize = 512;

/// ChaCha20 keystream keyed from the operating system CSPRNG.
///
/// One instance is created per generation call and dropped with it, so no
/// random state is shared between callers. Integer draws use unbiased
/// rejection sampling over the keystream.
pub struct SecureRng {
    cipher: ChaCha20,
    buffer: Zeroizing<Vec<u8>>,
    pos: usize,
}

impl SecureRng {
    pub fn from_os() -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng
            .try_fill_bytes(&mut seed[..])
            .map_err(|e| GenerationError::RandomSource(e.to_string()))?;

        Ok(Self::from_seed(&seed))
    }

    /// Fixed-key keystream. Only meant for reproducible tests.
    pub(crate) fn from_seed(key: &[u8; 32]) -> Self {
        let mut cipher = ChaCha20::new(key.into(), &[0u8; 12].into());
        let mut buffer = Zeroizing::new(vec![0u8; BUFFER_LEN]);
        cipher.apply_keystream(&mut buffer);

        Self {
            cipher,
            buffer,
            pos: 0,
        }
    }

    fn refill(&mut self) {
        self.buffer.fill(0);
        self.cipher.apply_keystream(&mut self.buffer);
        self.pos = 0;
    }

    fn next_u64(&mut self) -> u64 {
        if self.pos + 8 > self.buffer.len() {
            self.refill();
        }

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buffer[self.pos..self.pos + 8]);
        self.pos += 8;

        u64::from_le_bytes(bytes)
    }

    /// Uniform index in `0..bound`. A `bound` of 0 or 1 yields 0.
    pub fn below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }

        let bound = bound as u64;
        // 2^64 mod bound; draws under it would bias the low residues.
        let rejection_threshold = bound.wrapping_neg() % bound;

        loop {
            let random_u64 = self.next_u64();
            if random_u64 >= rejection_threshold {
                return (random_u64 % bound) as usize;
            }
        }
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }

        let index = self.below(items.len());
        items.get(index)
    }

    /// Fisher–Yates.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
