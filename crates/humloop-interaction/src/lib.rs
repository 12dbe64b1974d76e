//! Transport layer: HTTP clients for the REST backend and the generation
//! service.

pub mod accounts_api;
pub mod gateway;
pub mod generation_api;
mod listing;
pub mod posts_api;
pub mod profile_api;

pub use accounts_api::{AccountsApi, LoginTokens};
pub use gateway::{ApiRequest, HttpGateway, MultipartField, RequestBody};
pub use generation_api::GenerationApi;
pub use posts_api::{LikeStatus, PostsApi};
pub use profile_api::ProfileApi;
