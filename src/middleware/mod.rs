pub mod account;
pub mod auth;
pub mod response;

pub use account::{CurrentAdmin, CurrentUser};
pub use auth::AuthClaims;
pub use response::{ApiResponse, ApiResult};
