/// Strip everything but ASCII digits, so `138-0000 0000` and `13800000000` match.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// An 11-digit mainland-China mobile number: `1` followed by ten digits.
///
/// Expects an already normalized number.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 11 && phone.starts_with('1') && phone.chars().all(|c| c.is_ascii_digit())
}
