mod cookie;
mod user_storage;


pub use cookie::{RequestCookies, ResponseCookies};
pub use user_storage::JwtUserStorage;
