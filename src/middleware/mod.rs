//! Request-processing stages wrapped around the router.
//!
//! The chain is fixed, outermost first: [`Recovery`], [`RequestLogger`],
//! [`Cors`]. See [`crate::server::build_app`].

pub mod cors;
pub mod logging;
pub mod recovery;

pub use cors::Cors;
pub use logging::RequestLogger;
pub use recovery::{install_panic_hook, Recovery};

use actix_web::dev::ServiceRequest;

pub(crate) fn remote_addr(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
