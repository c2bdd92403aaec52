//! Query/aggregation core of a small social-feed application: monotonic id
//! allocation, the social graph, the content store with its hashtag mention
//! index, the reverse-chronological feed composer, and the two search
//! algorithms. Front-ends (terminal menus, web handlers) are external
//! callers and pass the acting user's id to every operation explicitly.

pub mod accounts;
pub mod content;
pub mod db;
pub mod error;
pub mod feed;
pub mod graph;
pub mod ids;
pub mod models;
pub mod schema;
pub mod search;
pub mod session;
pub mod settings;

use tracing::info;

pub use accounts::Accounts;
pub use content::{ContentStore, TweetStatistics};
pub use error::{Error, Result};
pub use feed::{FeedComposer, FeedItem, FeedItemKind};
pub use graph::{FollowOutcome, SocialGraph};
pub use models::{Tweet, UserProfile};
pub use search::{SearchEngine, TweetQuery, TweetSearchHit};
pub use session::{MenuCommand, ScreenOutcome, TweetAction, TweetScreen, TweetView};

use db::DbPool;

/// All five stores over one connection pool. Front-ends hold a single
/// `Tweeter` and call through it.
pub struct Tweeter {
    pub accounts: Accounts,
    pub graph: SocialGraph,
    pub content: ContentStore,
    pub feed: FeedComposer,
    pub search: SearchEngine,
}

impl Tweeter {
    /// Opens (creating if needed) the database at `database_url` and applies
    /// pending migrations.
    pub fn open(database_url: &str) -> Result<Self> {
        let pool = db::establish_pool(database_url, settings::settings().database.pool_size)?;
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
        drop(conn);
        info!(database_url, "store ready");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            accounts: Accounts::new(pool.clone()),
            graph: SocialGraph::new(pool.clone()),
            content: ContentStore::new(pool.clone()),
            feed: FeedComposer::new(pool.clone()),
            search: SearchEngine::new(pool),
        }
    }
}
