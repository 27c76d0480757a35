pub mod game;
pub mod page;
pub mod user;

pub use game::{
    DeveloperView, GameDetailView, GameFormValues, GameResponse, GameView, HistoryView, IndexView,
    PlayView, RateForm, RouteInfo,
};
pub use page::Page;
pub use user::{
    LoginForm, LoginView, RegisterFormValues, RegisterView, SendCodeRequest, SendCodeResponse,
    UserResponse,
};
