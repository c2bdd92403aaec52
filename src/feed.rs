use diesel::prelude::*;
use strum::Display;
use tracing::debug;

use crate::db::DbPool;
use crate::error::Result;
use crate::models::Tweet;
use crate::schema::{follows, retweets, tweets};
use crate::settings::page_window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FeedItemKind {
    #[strum(serialize = "original")]
    Original,
    #[strum(serialize = "retweet")]
    Retweet,
}

/// One entry of the follow feed. For retweets `author` is the retweeter,
/// `date` is the retweet date, and the text is projected from the target
/// tweet; `reply_to` is only carried for originals.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub tweet_id: i64,
    pub reply_to: Option<i64>,
    pub text: String,
    pub date: i64,
    pub kind: FeedItemKind,
    pub author: i64,
}

pub struct FeedComposer {
    pool: DbPool,
}

impl FeedComposer {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Merges followees' tweets and retweets into one date-descending page.
    ///
    /// Both streams are fetched newest-first and capped at
    /// `offset + page_size` rows: the first `offset + page_size` items of the
    /// merged bag union can only come from the top `offset + page_size` of
    /// either side, so the page stays exact without materializing full
    /// tables. A page past the end is an empty vec; callers treat an empty
    /// page with `page > 0` as "go back one page".
    pub fn produce_feed(&self, user: i64, page: i64, page_size: i64) -> Result<Vec<FeedItem>> {
        let (offset, page_size) = page_window(page, page_size)?;
        let bound = offset + page_size;
        let mut conn = self.pool.get()?;

        let followees = || {
            follows::table
                .filter(follows::follower.eq(user))
                .select(follows::followee)
        };

        let originals: Vec<Tweet> = tweets::table
            .filter(tweets::writer.eq_any(followees()))
            .order((tweets::date.desc(), tweets::id.desc()))
            .limit(bound)
            .select(Tweet::as_select())
            .load(&mut conn)?;

        let reposted: Vec<(i64, i64, Tweet)> = retweets::table
            .inner_join(tweets::table)
            .filter(retweets::user.eq_any(followees()))
            // The retweeter breaks (date, tweet) ties here as well, so the
            // row kept by the cap is the row the merged order wants.
            .order((retweets::date.desc(), tweets::id.desc(), retweets::user.asc()))
            .limit(bound)
            .select((retweets::user, retweets::date, Tweet::as_select()))
            .load(&mut conn)?;

        let mut items: Vec<FeedItem> = Vec::with_capacity(originals.len() + reposted.len());
        for tweet in originals {
            items.push(FeedItem {
                tweet_id: tweet.id,
                reply_to: tweet.reply_to,
                text: tweet.text,
                date: tweet.date,
                kind: FeedItemKind::Original,
                author: tweet.writer,
            });
        }
        for (retweeter, date, tweet) in reposted {
            items.push(FeedItem {
                tweet_id: tweet.id,
                reply_to: None,
                text: tweet.text,
                date,
                kind: FeedItemKind::Retweet,
                author: retweeter,
            });
        }

        // Date descending, ties by tweet id descending, originals ahead of
        // retweets, then author ascending (two followees can retweet the
        // same tweet at the same date) so paging is fully deterministic.
        items.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.tweet_id.cmp(&a.tweet_id))
                .then(kind_rank(a.kind).cmp(&kind_rank(b.kind)))
                .then(a.author.cmp(&b.author))
        });

        let items: Vec<FeedItem> = items
            .into_iter()
            .skip(offset as usize)
            .take(page_size as usize)
            .collect();
        debug!(user, page, count = items.len(), "feed page produced");
        Ok(items)
    }
}

fn kind_rank(kind: FeedItemKind) -> u8 {
    match kind {
        FeedItemKind::Original => 0,
        FeedItemKind::Retweet => 1,
    }
}
