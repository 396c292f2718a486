use rand::RngCore;

const REFRESH_TOKEN_BYTES: usize = 32;

/// 256 random bits, hex-encoded.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
