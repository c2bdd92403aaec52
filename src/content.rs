use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::Utc;
use diesel::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::ids::{allocate_next, IdSpace};
use crate::models::{NewHashtag, NewMention, NewRetweet, NewTweet, Tweet};
use crate::schema::{hashtags, mentions, retweets, tweets, users};

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Every `#`-prefixed token in `text`, first spelling kept, deduplicated
/// case-insensitively.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for cap in HASHTAG.captures_iter(text) {
        let term = cap[1].to_string();
        if seen.insert(term.to_lowercase()) {
            terms.push(term);
        }
    }
    terms
}

/// Retweet and reply tallies for one tweet, always recomputed from the
/// store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweetStatistics {
    pub retweet_count: i64,
    pub reply_count: i64,
}

pub struct ContentStore {
    pool: DbPool,
}

impl ContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Posts a tweet. The tweet row, any new hashtag rows, and one mention
    /// edge per distinct hashtag commit as a single transaction; no partial
    /// write is ever observable.
    pub fn insert_tweet(&self, writer: i64, text: &str, reply_to: Option<i64>) -> Result<i64> {
        if text.trim().is_empty() {
            return Err(Error::Validation("tweet text must not be empty".into()));
        }

        let mut conn = self.pool.get()?;
        let tweet_id = conn.immediate_transaction(|conn| {
            let known: i64 = users::table
                .filter(users::id.eq(writer))
                .count()
                .get_result(conn)?;
            if known == 0 {
                return Err(Error::NotFound);
            }
            if let Some(parent) = reply_to {
                let parent_known: i64 = tweets::table
                    .filter(tweets::id.eq(parent))
                    .count()
                    .get_result(conn)?;
                if parent_known == 0 {
                    return Err(Error::NotFound);
                }
            }

            let id = allocate_next(conn, IdSpace::Tweets)?;
            diesel::insert_into(tweets::table)
                .values(&NewTweet {
                    id,
                    writer,
                    date: Utc::now().timestamp(),
                    text: text.to_string(),
                    reply_to,
                })
                .execute(conn)?;

            for term in extract_hashtags(text) {
                // NOCASE keys make both of these no-ops when the term is
                // already known under any capitalization.
                diesel::insert_or_ignore_into(hashtags::table)
                    .values(&NewHashtag { term: term.clone() })
                    .execute(conn)?;
                diesel::insert_or_ignore_into(mentions::table)
                    .values(&NewMention { tweet: id, term })
                    .execute(conn)?;
            }

            Ok::<_, Error>(id)
        })?;

        debug!(tweet = tweet_id, writer, reply = ?reply_to, "tweet inserted");
        Ok(tweet_id)
    }

    /// Appends a retweet event. Duplicate retweets of the same tweet by the
    /// same user are allowed on purpose.
    pub fn insert_retweet(&self, user: i64, tweet_id: i64) -> Result<()> {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| {
            let known_user: i64 = users::table
                .filter(users::id.eq(user))
                .count()
                .get_result(conn)?;
            if known_user == 0 {
                return Err(Error::NotFound);
            }
            let known: i64 = tweets::table
                .filter(tweets::id.eq(tweet_id))
                .count()
                .get_result(conn)?;
            if known == 0 {
                return Err(Error::NotFound);
            }

            diesel::insert_into(retweets::table)
                .values(&NewRetweet {
                    user,
                    tweet: tweet_id,
                    date: Utc::now().timestamp(),
                })
                .execute(conn)?;
            Ok(())
        })?;

        debug!(tweet = tweet_id, user, "retweet inserted");
        Ok(())
    }

    pub fn tweet(&self, tweet_id: i64) -> Result<Tweet> {
        let mut conn = self.pool.get()?;
        let tweet = tweets::table
            .filter(tweets::id.eq(tweet_id))
            .select(Tweet::as_select())
            .first(&mut conn)?;
        Ok(tweet)
    }

    pub fn tweet_statistics(&self, tweet_id: i64) -> Result<TweetStatistics> {
        let mut conn = self.pool.get()?;
        let retweet_count = retweets::table
            .filter(retweets::tweet.eq(tweet_id))
            .count()
            .get_result(&mut conn)?;
        let reply_count = tweets::table
            .filter(tweets::reply_to.eq(tweet_id))
            .count()
            .get_result(&mut conn)?;
        Ok(TweetStatistics {
            retweet_count,
            reply_count,
        })
    }

    /// A user's own tweets, newest first. `limit` trims the listing (the
    /// profile view shows the three most recent).
    pub fn tweets_by(&self, user: i64, limit: Option<i64>) -> Result<Vec<Tweet>> {
        let mut conn = self.pool.get()?;
        let mut query = tweets::table
            .filter(tweets::writer.eq(user))
            .order((tweets::date.desc(), tweets::id.desc()))
            .select(Tweet::as_select())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let rows = query.load(&mut conn)?;
        Ok(rows)
    }
}
