use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

// Provably fair stream:
// HMAC-SHA256(server_seed, "client_seed:nonce") -> 32 bytes, extended by
// hashing the previous block -> u32 words, big endian.

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

#[derive(Debug, Clone)]
pub struct ProvablyFairRng {
    server_seed: String, // secret until revealed
    client_seed: String,
    nonce: u64,
    block: [u8; 32],
    cursor: usize,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        let server_seed = server_seed.into();
        let client_seed = client_seed.into();
        let block = hmac_block(&server_seed, &client_seed, nonce);
        Self {
            server_seed,
            client_seed,
            nonce,
            block,
            cursor: 0,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    /// Commitment published before play.
    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    /// First HMAC block for the current nonce.
    pub fn hmac_bytes(&self) -> [u8; 32] {
        hmac_block(&self.server_seed, &self.client_seed, self.nonce)
    }

    fn next_word(&mut self) -> u32 {
        if self.cursor + 4 > self.block.len() {
            self.block = Sha256::digest(self.block).into();
            self.cursor = 0;
        }
        let chunk = &self.block[self.cursor..self.cursor + 4];
        self.cursor += 4;
        u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
    }
}

fn hmac_block(server_seed: &str, client_seed: &str, nonce: u64) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(server_seed.as_bytes()).expect("HMAC key");
    mac.update(format!("{client_seed}:{nonce}").as_bytes());
    mac.finalize().into_bytes().into()
}

impl RngCore for ProvablyFairRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_word()) << 32) | u64::from(self.next_word())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_word().to_be_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_determinism() {
        let mut rng1 = ProvablyFairRng::new("server", "client", 1);
        let mut rng2 = ProvablyFairRng::new("server", "client", 1);
        assert_eq!(rng1.server_seed_hash_hex(), rng2.server_seed_hash_hex());
        assert_eq!(rng1.hmac_bytes(), rng2.hmac_bytes());
        let a: Vec<u32> = (0..20).map(|_| rng1.gen_range(0..112)).collect();
        let b: Vec<u32> = (0..20).map(|_| rng2.gen_range(0..112)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn nonce_changes_stream() {
        let a = ProvablyFairRng::new("server", "client", 1);
        let b = ProvablyFairRng::new("server", "client", 2);
        assert_ne!(a.hmac_bytes(), b.hmac_bytes());
    }

    #[test]
    fn stream_extends_past_first_block() {
        let mut rng = ProvablyFairRng::new("server", "client", 3);
        let first = rng.hmac_bytes();
        let words: Vec<u32> = (0..8).map(|_| rng.next_u32()).collect();
        assert_eq!(words[0], u32::from_be_bytes([first[0], first[1], first[2], first[3]]));
        let next = rng.next_u32();
        let extended: [u8; 32] = Sha256::digest(first).into();
        assert_eq!(next, u32::from_be_bytes([extended[0], extended[1], extended[2], extended[3]]));
    }

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(
            derive_hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
