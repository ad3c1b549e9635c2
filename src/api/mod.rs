pub mod error;
pub mod routes;
pub mod users;

pub use error::{json_body, ApiError, ApiResponse, ApiResult, Meta, Status};
pub use routes::{cors_layer, create_router};
