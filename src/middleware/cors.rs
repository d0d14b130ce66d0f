use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::http::Method;
use actix_web::{Error, HttpResponse};
use futures::future::LocalBoxFuture;
use tracing::{debug, warn};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Accept, Content-Type, Content-Length, Accept-Encoding, Authorization";

/// CORS headers with a credentialed origin allow-list, plus the fixed
/// security headers. `OPTIONS` requests are answered here with a bare 200.
#[derive(Clone, Debug, Default)]
pub struct Cors {
    allowed_origins: Arc<Vec<String>>,
}

impl Cors {
    pub fn new<I, O>(allowed_origins: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: AsRef<str>,
    {
        let allowed_origins = allowed_origins
            .into_iter()
            .map(|origin| origin.as_ref().trim().to_string())
            .collect();
        Self {
            allowed_origins: Arc::new(allowed_origins),
        }
    }

    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        !origin.is_empty() && self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

fn apply_headers(headers: &mut HeaderMap, allowed_origin: Option<&HeaderValue>) {
    if let Some(origin) = allowed_origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    let fixed: [(HeaderName, &'static str); 5] = [
        (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_XSS_PROTECTION, "1; mode=block"),
    ];
    for (name, value) in fixed {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CorsMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            cors: self.clone(),
        }))
    }
}

pub struct CorsMiddleware<S> {
    service: S,
    cors: Cors,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = req.headers().get(header::ORIGIN).cloned();
        let origin_str = origin
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let allowed = if self.cors.is_allowed_origin(origin_str) {
            debug!(origin = %origin_str, method = %req.method(), path = %req.path(), "CORS: Allowed origin");
            origin.clone()
        } else {
            if origin.is_some() {
                warn!(origin = %origin_str, method = %req.method(), path = %req.path(), "CORS: Rejected origin");
            }
            None
        };

        if req.method() == Method::OPTIONS {
            let mut response = HttpResponse::Ok().finish();
            apply_headers(response.headers_mut(), allowed.as_ref());
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            apply_headers(res.headers_mut(), allowed.as_ref());
            Ok(res.map_into_left_body())
        })
    }
}
