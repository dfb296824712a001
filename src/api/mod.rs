// API module entry
// Route table for the /api/* surface

mod analyze;
mod files;
mod generate;
pub mod request;
pub mod response;
mod system;
pub mod types;
mod upload;

use hyper::Method;

use crate::config::AppState;
use crate::error::ApiError;

pub use request::ApiRequest;
pub use response::Reply;

/// Dispatch a collected request to its handler.
///
/// Paths match exactly; a known path with the wrong method is treated as an
/// unknown route. Ping answers any method.
pub async fn dispatch(req: &ApiRequest, state: &AppState) -> Result<Reply, ApiError> {
    match (&req.method, req.path.as_str()) {
        // Liveness
        (_, "/api/ping") => system::ping(),
        // Bucket files
        (&Method::GET, "/api/list") => files::list(req, state.store()).await,
        (&Method::GET, "/api/read") => files::read(req, state.store()).await,
        (&Method::POST, "/api/write") => files::write(req, state.store()).await,
        (&Method::POST, "/api/apply-diff") => files::apply_diff(req, state.store()).await,
        // Tools
        (&Method::POST, "/api/generate-html") => generate::generate_html(req),
        (&Method::POST, "/api/analyze-cors") => analyze::analyze_cors(req, state.fetcher()).await,
        (&Method::POST, "/api/upload") => upload::upload(req, state.store()).await,
        (&Method::POST, "/api/deploy") => system::deploy(),
        // Unknown route
        _ => Err(ApiError::RouteNotFound),
    }
}
