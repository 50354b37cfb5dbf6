//! Data Transfer Objects for REST request/response serialization.

pub mod account_dto;
pub mod common_dto;
pub mod movie_dto;
pub mod session_dto;

pub use account_dto::*;
pub use common_dto::*;
pub use movie_dto::*;
pub use session_dto::*;
