pub mod auth_token;
pub mod book;
pub mod news;
pub mod publication;
pub mod user;

pub use auth_token::{AuthToken, CreateAuthToken, IssuedToken, TokenSummary};
pub use book::{Book, CreateBook, UpdateBook};
pub use news::{
    CreateNews, Membership, MessageResponse, News, NewsAdminRow, NewsWithRelated, SetNewsGroup,
    UpdateNews,
};
pub use publication::{CreatePublication, Publication, UpdatePublication};
pub use user::{hash_password, CreateUserRequest, LoginRequest, User, UserResponse};
