pub mod phone;
pub mod slug;
pub mod verification_code;

pub use phone::{is_valid_phone, normalize_phone};
pub use slug::slugify;
pub use verification_code::generate_verification_code;
