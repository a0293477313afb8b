//! Welcome page, the deliberate crash and the metrics endpoint.

use super::response::{ContentType, Reply, WebResponse};
use super::views;
use crate::error::ClinicError;

pub const CRASH_MESSAGE: &str =
    "Expected: controller used to showcase what happens when an exception is thrown";

pub fn welcome() -> Reply {
    WebResponse::html(views::welcome()).into()
}

/// Always fails; shows how errors are rendered.
pub fn crash() -> Result<Reply, ClinicError> {
    Err(ClinicError::Crash(CRASH_MESSAGE.to_string()))
}

#[cfg(feature = "metrics")]
pub fn metrics() -> Result<Reply, ClinicError> {
    let body = crate::metrics::render().map_err(ClinicError::Internal)?;
    Ok(WebResponse::with_status(200, ContentType::Metrics, body).into())
}

#[cfg(not(feature = "metrics"))]
pub fn metrics() -> Result<Reply, ClinicError> {
    Ok(WebResponse::with_status(
        404,
        ContentType::Html,
        views::error_page(404, "metrics are not enabled"),
    )
    .into())
}
