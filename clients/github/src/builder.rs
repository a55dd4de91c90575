use crate::GithubClient;
use anyhow::Context;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use streak::api::Result;
use url::Url;

pub const GITHUB_URL: &str = "https://api.github.com";

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    github_url: String,
    headers: HeaderMap,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("gh-streak"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        Self {
            client_builder: ClientBuilder::default(),
            github_url: GITHUB_URL.to_string(),
            headers,
        }
    }
}

impl GithubClientBuilder {
    pub fn try_with_token(self, token: secrecy::SecretString) -> Result<GithubClientBuilder> {
        let mut builder = self.try_with_header(header::AUTHORIZATION, format!("Bearer {}", token.expose_secret()))?;
        if let Some(authorization) = builder.headers.get_mut(header::AUTHORIZATION) {
            authorization.set_sensitive(true);
        }
        Ok(builder)
    }

    pub fn try_with_github_url<STR: AsRef<str>>(mut self, url: STR) -> Result<GithubClientBuilder> {
        let url = url.as_ref();
        Url::parse(url).with_context(|| format!("Invalid API URL {}", url))?;
        self.github_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    fn try_with_header(mut self, key: HeaderName, val: impl AsRef<str>) -> anyhow::Result<GithubClientBuilder> {
        let val = HeaderValue::from_str(val.as_ref())?;
        self.headers.insert(key, val);
        Ok(self)
    }

    pub fn build(self) -> Result<GithubClient> {
        let client = self.client_builder.default_headers(self.headers).build()?;
        Ok(GithubClient {
            client,
            github_url: self.github_url,
        })
    }
}

#[test]
fn invalid_url_test() {
    let builder = GithubClientBuilder::default().try_with_github_url("not a url");
    assert!(builder.is_err());
}

#[test]
fn trailing_slash_test() -> anyhow::Result<()> {
    let client = GithubClientBuilder::default()
        .try_with_github_url("https://github.example.com/api/v3/")?
        .build()?;
    assert_eq!(client.github_url, "https://github.example.com/api/v3");
    Ok(())
}

#[test]
fn invalid_token_test() {
    let builder = GithubClientBuilder::default().try_with_token(secrecy::SecretString::new("bad\ntoken".to_string()));
    assert!(builder.is_err());
}
