pub mod game;
pub mod phone_verification;
pub mod play_history;
pub mod rating;
pub mod user;
