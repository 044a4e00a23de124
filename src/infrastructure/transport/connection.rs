use anyhow::Result;

pub const SESSION_ID_HEADER: &str = "X-Session-Id";
pub const CSRF_TOKEN_HEADER: &str = "X-CSRF-Token";

/// Base URL plus one HTTP client. Clones share the client, and with it the
/// cookie jar holding the server's `session_id` cookie.
#[derive(Clone, Debug)]
pub struct Connection {
    url: String,
    client: reqwest::Client,
}

impl Connection {
    pub fn new(url: &str) -> Result<Connection> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        return Ok(Connection {
            url: url.trim_end_matches('/').to_string(),
            client,
        });
    }

    pub fn url(&self) -> &str {
        return &self.url;
    }

    pub fn client(&self) -> &reqwest::Client {
        return &self.client;
    }

    pub fn endpoint(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.url);
    }
}
