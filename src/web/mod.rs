//! HTTP surface: routers, request context, DTOs and error mapping.

mod context;
pub use context::{AuthenticatedUser, RequestContext, UserRole};

mod error;
pub use error::{ClientFacing, ErrorResponse, WebError, WebResult};

mod state;
pub use state::AppState;

pub mod doc;
pub mod dto;
pub mod middlewares;
pub mod routes;
