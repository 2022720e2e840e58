use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Error, Result};

/// Direct byte download, outside the browser session.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        proxy: Option<&str>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs);
        if let Some(proxy) = proxy {
            let proxy_url = if proxy.contains("://") {
                proxy.to_string()
            } else {
                format!("http://{proxy}")
            };
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_strict_certs_and_bare_proxy() {
        let fetcher = HttpFetcher::new("tjnj-test", Some("127.0.0.1:3128"), Duration::from_secs(5), false);
        assert!(fetcher.is_ok());
    }

    #[test]
    fn bad_proxy_is_rejected() {
        let fetcher = HttpFetcher::new("tjnj-test", Some("http://[::1"), Duration::from_secs(5), true);
        assert!(fetcher.is_err());
    }
}
