use crate::{Engagement, HubConfig, Reaction, Reply, SocialError, SocialGraph, SocialResult};
use backoff::future::retry;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

/// Client for a hub's paginated HTTP API.
pub struct HubClient {
    http: reqwest::Client,
    config: HubConfig,
}

impl HubClient {
    pub fn new(config: HubConfig) -> SocialResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SocialError::Http(e.to_string()))?;
        // joins below are relative to the base path
        let mut config = config;
        if !config.base_url.path().ends_with('/') {
            let path = format!("{}/", config.base_url.path());
            config.base_url.set_path(&path);
        }
        Ok(Self { http, config })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> SocialResult<T> {
        let url = self
            .config
            .base_url
            .join(path)
            .map_err(|e| SocialError::UnsupportedQuery(e.to_string()))?;
        retry(self.config.retry_backoff.clone(), || async {
            self.fetch(url.clone(), query).await.map_err(|e| {
                if e.is_transient() {
                    backoff::Error::Transient {
                        err: e,
                        retry_after: None,
                    }
                } else {
                    backoff::Error::Permanent(e)
                }
            })
        })
        .await
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> SocialResult<T> {
        trace!(%url, "sending hub request");
        let mut request = self.http.get(url).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| SocialError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SocialError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| SocialError::Payload(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SocialGraph for HubClient {
    async fn reactions(
        &self,
        cast_hash: &str,
        kind: Engagement,
        limit: usize,
    ) -> SocialResult<Vec<Reaction>> {
        if kind == Engagement::Reply {
            return Err(SocialError::UnsupportedQuery(
                "replies are enumerated via `replies`, not `reactions`".to_string(),
            ));
        }

        let mut out = Vec::new();
        let mut cursor: Option<String> = None;
        while out.len() < limit {
            let page_limit = self.config.page_size.min(limit - out.len());
            let mut query = vec![
                ("target", cast_hash.to_string()),
                ("kind", kind.as_str().to_string()),
                ("limit", page_limit.to_string()),
            ];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let page: ReactionsPage = self.get_json("v1/cast-reactions", &query).await?;
            let fetched = page.reactions.len();
            out.extend(page.reactions.into_iter().map(|r| Reaction { fid: r.fid }));
            match page.next_cursor {
                Some(next) if !next.is_empty() && fetched > 0 => cursor = Some(next),
                _ => break,
            }
        }
        out.truncate(limit);
        debug!(cast = cast_hash, kind = %kind, count = out.len(), "enumerated reactions");
        Ok(out)
    }

    async fn replies(&self, cast_hash: &str, depth: u8, limit: usize) -> SocialResult<Vec<Reply>> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;
        while out.len() < limit {
            let page_limit = self.config.page_size.min(limit - out.len());
            let mut query = vec![
                ("target", cast_hash.to_string()),
                ("depth", depth.to_string()),
                ("limit", page_limit.to_string()),
            ];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let page: RepliesPage = self.get_json("v1/cast-replies", &query).await?;
            let fetched = page.replies.len();
            out.extend(page.replies.into_iter().map(|r| Reply {
                author_fid: r.author_fid,
                text: r.text,
            }));
            match page.next_cursor {
                Some(next) if !next.is_empty() && fetched > 0 => cursor = Some(next),
                _ => break,
            }
        }
        out.truncate(limit);
        debug!(cast = cast_hash, depth, count = out.len(), "enumerated replies");
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ReactionsPage {
    reactions: Vec<ReactionBody>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReactionBody {
    fid: u64,
}

#[derive(Debug, Deserialize)]
struct RepliesPage {
    replies: Vec<ReplyBody>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
    author_fid: u64,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reactions_page_parses() {
        let page: ReactionsPage = serde_json::from_str(
            r#"{"reactions":[{"fid":101},{"fid":205}],"next_cursor":"eyJwYWdlIjoyfQ"}"#,
        )
        .expect("page should parse");

        assert_eq!(page.reactions.len(), 2);
        assert_eq!(page.reactions[1].fid, 205);
        assert_eq!(page.next_cursor.as_deref(), Some("eyJwYWdlIjoyfQ"));
    }

    #[test]
    fn replies_page_tolerates_missing_fields() {
        let page: RepliesPage =
            serde_json::from_str(r#"{"replies":[{"author_fid":7}]}"#).expect("page should parse");

        assert_eq!(page.replies[0].author_fid, 7);
        assert!(page.replies[0].text.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
