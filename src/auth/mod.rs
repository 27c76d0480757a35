pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{AdminUser, AuthUser, CurrentUser};
pub use session::AuthSession;
