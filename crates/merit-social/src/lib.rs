/*!
# Merit Social Graph

Read access to the social graph engagement campaigns verify against: who
liked, recast, or replied to a given cast. [`SocialGraph`] is the seam the
verifier consumes; [`HubClient`] implements it against a hub's paginated
HTTP API. Enumeration is bounded and cursor-driven, so a viral cast cannot
pin a verification loop.

Fids are the graph's account identifiers. A claimant proves engagement by
their fid appearing in the relevant enumeration; there is nothing to
submit and nothing to forge short of compromising the graph itself.
*/

mod config;
mod error;
mod hub;
mod types;

pub use config::HubConfig;
pub use error::{SocialError, SocialResult};
pub use hub::HubClient;
pub use types::{Engagement, ParseEngagementError, Reaction, Reply};

/// Read-side view of the social graph.
#[async_trait::async_trait]
pub trait SocialGraph: Send + Sync {
    /// Enumerate reactions of `kind` on `cast_hash`, up to `limit` entries.
    /// `kind` must be [`Engagement::Like`] or [`Engagement::Recast`].
    async fn reactions(
        &self,
        cast_hash: &str,
        kind: Engagement,
        limit: usize,
    ) -> SocialResult<Vec<Reaction>>;

    /// Enumerate replies under `cast_hash`, descending `depth` levels into
    /// the thread (1 = direct replies only), up to `limit` entries.
    async fn replies(&self, cast_hash: &str, depth: u8, limit: usize) -> SocialResult<Vec<Reply>>;
}
