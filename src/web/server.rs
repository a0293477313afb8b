//! `may_minihttp` adapter for [`Clinic`].

use super::request::{Method, Params, WebRequest};
use super::response::WebResponse;
use super::router::{error_response, Clinic};
use crate::error::ClinicError;
use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer, HttpService, Request, Response};
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Request body size accepted from a form post.
const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Clone)]
pub struct ClinicService {
    clinic: Arc<Clinic>,
}

impl ClinicService {
    pub fn new(clinic: Clinic) -> Self {
        Self {
            clinic: Arc::new(clinic),
        }
    }
}

fn header_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| String::from_utf8_lossy(h.value).into_owned())
}

/// Read a form body, replacing invalid UTF-8 like the form decoder does.
///
/// Bodies longer than [`MAX_BODY_BYTES`] are refused rather than cut short.
fn read_form_body(body: impl Read) -> Result<String, ClinicError> {
    let mut bytes = Vec::new();
    body.take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| ClinicError::BadRequest(format!("unreadable request body: {e}")))?;
    if bytes.len() as u64 > MAX_BODY_BYTES {
        return Err(ClinicError::BadRequest(format!(
            "request body exceeds {MAX_BODY_BYTES} bytes"
        )));
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Copy what the router needs out of the borrowed request.
///
/// `HEAD` is answered like `GET`; the caller drops the body.
fn to_web_request(req: Request) -> Result<WebRequest, ClinicError> {
    let method = match req.method() {
        "HEAD" => Method::Get,
        other => Method::parse(other),
    };
    let target = req.path().to_string();
    let accept = header_value(&req, "Accept");

    let body = if method == Method::Post {
        read_form_body(req.body())?
    } else {
        String::new()
    };

    let mut web = WebRequest::new(method, &target).with_form(Params::parse(&body));
    if let Some(accept) = accept {
        web = web.with_accept(accept);
    }
    Ok(web)
}

/// A `HEAD` reply carries the headers of the `GET` reply and no body.
fn without_body(mut response: WebResponse) -> WebResponse {
    response.body.clear();
    response
}

fn write_response(response: WebResponse, rsp: &mut Response) {
    rsp.status_code(usize::from(response.status), response.reason());
    rsp.header(response.content_type.header());
    rsp.body_vec(response.body.into_bytes());
}

impl HttpService for ClinicService {
    fn call(&mut self, req: Request, rsp: &mut Response) -> io::Result<()> {
        let started = Instant::now();
        let head = req.method() == "HEAD";
        let path = req.path().to_string();
        let route = Clinic::route_label(&path);

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::http_request_span(req.method(), &path).entered();

        let response = match to_web_request(req) {
            Ok(request) => self.clinic.handle(request),
            Err(err) => error_response(&err),
        };
        log::debug!("{route} -> {} in {:?}", response.status, started.elapsed());

        #[cfg(feature = "metrics")]
        METRICS.record_request(route, response.status, started.elapsed());

        let response = if head { without_body(response) } else { response };
        write_response(response, rsp);
        Ok(())
    }
}

/// Start serving on `addr`; the returned handle finishes when the server
/// stops.
pub fn serve(clinic: Clinic, addr: &str) -> io::Result<JoinHandle<()>> {
    let handle = HttpServer(ClinicService::new(clinic)).start(addr)?;
    log::info!("petclinic listening on http://{addr}");
    Ok(handle)
}
