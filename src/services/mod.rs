pub mod game_service;
pub mod play_service;
pub mod rating_service;
pub mod user_service;
pub mod verification_service;

pub use game_service::{GameService, NewGame, RankedGame, RatingSummary};
pub use play_service::{PlayEntry, PlayService};
pub use rating_service::RatingService;
pub use user_service::{Registration, UserService};
pub use verification_service::VerificationService;
