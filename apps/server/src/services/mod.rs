pub mod auth_token;
pub mod book;
pub mod grouping;
pub mod news;
pub mod publication;
pub mod users;
pub mod validation;

pub use auth_token::AuthTokenService;
pub use book::BookService;
pub use grouping::GroupingError;
pub use news::NewsService;
pub use publication::PublicationService;
pub use users::UsersService;
