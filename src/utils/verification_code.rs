use rand::Rng;

pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Generate a zero-padded six digit code, e.g. `004217`.
pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}
