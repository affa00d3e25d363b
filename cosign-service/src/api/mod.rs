mod error;
mod handlers;
mod middleware;
mod router;
mod state;

pub use error::ApiError;
pub use middleware::auth::authorize_request;
pub use router::{build_router, run_http_server};
pub use state::ApiState;
