//! Transport-independent HTTP response and handler outcomes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Json,
    Xml,
    /// Prometheus text exposition format
    Metrics,
}

impl ContentType {
    pub fn header(self) -> &'static str {
        match self {
            ContentType::Html => "Content-Type: text/html; charset=utf-8",
            ContentType::Json => "Content-Type: application/json",
            ContentType::Xml => "Content-Type: application/xml; charset=utf-8",
            ContentType::Metrics => "Content-Type: text/plain; version=0.0.4; charset=utf-8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResponse {
    pub status: u16,
    pub content_type: ContentType,
    pub body: String,
}

impl WebResponse {
    pub fn html(body: String) -> Self {
        Self::with_status(200, ContentType::Html, body)
    }

    pub fn json(body: String) -> Self {
        Self::with_status(200, ContentType::Json, body)
    }

    pub fn xml(body: String) -> Self {
        Self::with_status(200, ContentType::Xml, body)
    }

    pub fn with_status(status: u16, content_type: ContentType, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    /// Reason phrase for the status line.
    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

/// One-shot message shown on the page rendered after a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Message(String),
    Error(String),
}

/// What a handler wants sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Page(WebResponse),
    /// Follow up with a GET of `to`, carrying `flash` along.
    Redirect { to: String, flash: Option<Flash> },
}

impl Reply {
    pub fn redirect(to: impl Into<String>) -> Self {
        Reply::Redirect {
            to: to.into(),
            flash: None,
        }
    }

    pub fn redirect_with_message(to: impl Into<String>, message: &str) -> Self {
        Reply::Redirect {
            to: to.into(),
            flash: Some(Flash::Message(message.to_string())),
        }
    }
}

impl From<WebResponse> for Reply {
    fn from(response: WebResponse) -> Self {
        Reply::Page(response)
    }
}
