use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::{ready, Ready};
use std::panic::{self, AssertUnwindSafe};

use actix_web::body::MessageBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::{Error, HttpResponse};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::json;
use tracing::instrument::WithSubscriber;
use tracing::{error, Dispatch};

use super::remote_addr;

struct PanicSite {
    location: String,
    backtrace: String,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

/// Records where each panic happened so [`Recovery`] can log the panic-site
/// backtrace. The previously installed hook still runs afterwards.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let backtrace = Backtrace::force_capture().to_string();
        LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(PanicSite { location, backtrace }));
        previous(info);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Outermost stage: scopes the request to the logging dispatch and turns a
/// panic anywhere below into a 500 JSON response.
#[derive(Clone)]
pub struct Recovery {
    dispatch: Dispatch,
}

impl Recovery {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Recovery
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RecoveryMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RecoveryMiddleware {
            service,
            dispatch: self.dispatch.clone(),
        }))
    }
}

pub struct RecoveryMiddleware<S> {
    service: S,
    dispatch: Dispatch,
}

struct RequestSummary {
    method: String,
    path: String,
    remote_addr: String,
}

impl RequestSummary {
    /// The request itself is gone by the time a panic surfaces, so the 500 is
    /// handed back as an error and rendered by the server.
    fn recover(self, payload: Box<dyn Any + Send>) -> Error {
        let site = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let (location, backtrace) = site
            .map(|s| (s.location, s.backtrace))
            .unwrap_or_else(|| ("unknown".to_string(), Backtrace::force_capture().to_string()));

        error!(
            method = %self.method,
            path = %self.path,
            remote_addr = %self.remote_addr,
            panic = %panic_message(payload.as_ref()),
            location = %location,
            stack = %backtrace,
            "Panic recovered"
        );

        let response = HttpResponse::InternalServerError()
            .json(json!({ "error": "Internal server error" }));
        InternalError::from_response("panic", response).into()
    }
}

impl<S, B> Service<ServiceRequest> for RecoveryMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let summary = RequestSummary {
            method: req.method().to_string(),
            path: req.path().to_string(),
            remote_addr: remote_addr(&req),
        };

        let called = tracing::dispatcher::with_default(&self.dispatch, || {
            panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req)))
        });

        let dispatch = self.dispatch.clone();
        Box::pin(
            async move {
                let fut = match called {
                    Ok(fut) => fut,
                    Err(payload) => return Err(summary.recover(payload)),
                };
                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(summary.recover(payload)),
                }
            }
            .with_subscriber(dispatch),
        )
    }
}
