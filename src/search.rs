use diesel::define_sql_function;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::models::{Tweet, UserProfile};
use crate::schema::{mentions, tweets, users};
use crate::settings::page_window;

define_sql_function! { fn length(t: diesel::sql_types::Text) -> diesel::sql_types::Integer }
define_sql_function! { fn lower(t: diesel::sql_types::Text) -> diesel::sql_types::Text }
// Substring containment without LIKE, so `%` and `_` in a keyword stay
// literal characters instead of wildcards.
define_sql_function! { fn instr(haystack: diesel::sql_types::Text, needle: diesel::sql_types::Text) -> diesel::sql_types::Integer }

/// Parsed tweet-search input: `#`-prefixed terms hit the mention index,
/// everything else is a substring match against tweet text. Matching is a
/// logical OR across all terms; broad recall is the point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweetQuery {
    pub text_terms: Vec<String>,
    pub hashtag_terms: Vec<String>,
}

impl TweetQuery {
    pub fn parse(input: &str) -> Self {
        let mut query = TweetQuery::default();
        for word in input.split_whitespace() {
            match word.strip_prefix('#') {
                Some(term) if !term.is_empty() => query.hashtag_terms.push(term.to_string()),
                Some(_) => {}
                None => query.text_terms.push(word.to_string()),
            }
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.text_terms.is_empty() && self.hashtag_terms.is_empty()
    }
}

/// A tweet-search match joined to its writer's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct TweetSearchHit {
    pub tweet_id: i64,
    pub reply_to: Option<i64>,
    pub text: String,
    pub date: i64,
    pub writer: i64,
    pub writer_name: String,
}

pub struct SearchEngine {
    pool: DbPool,
}

impl SearchEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Two-tier user search: name matches (shortest name first) strictly
    /// ahead of city-only matches (shortest city first), then one contiguous
    /// slice of the concatenation. The tiers are a ranking policy, not a
    /// relevance score; they must not be flattened.
    ///
    /// Each tier query is bounded to `offset + page_size` rows, which is all
    /// a slice ending at `offset + page_size` can consume from either tier.
    pub fn search_users(&self, keyword: &str, page: i64, page_size: i64) -> Result<Vec<UserProfile>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::Validation("search keyword must not be empty".into()));
        }
        let (offset, page_size) = page_window(page, page_size)?;
        let bound = offset + page_size;
        let needle = keyword.to_lowercase();
        let mut conn = self.pool.get()?;

        let name_matches: Vec<UserProfile> = users::table
            .filter(instr(lower(users::name), needle.clone()).gt(0))
            .order((length(users::name).asc(), users::id.asc()))
            .limit(bound)
            .select(UserProfile::as_select())
            .load(&mut conn)?;

        let city_matches: Vec<UserProfile> = users::table
            .filter(instr(lower(users::city), needle.clone()).gt(0))
            .filter(instr(lower(users::name), needle).eq(0))
            .order((length(users::city).asc(), users::id.asc()))
            .limit(bound)
            .select(UserProfile::as_select())
            .load(&mut conn)?;

        let hits: Vec<UserProfile> = name_matches
            .into_iter()
            .chain(city_matches)
            .skip(offset as usize)
            .take(page_size as usize)
            .collect();
        debug!(keyword, page, count = hits.len(), "user search page");
        Ok(hits)
    }

    /// Tweet search over text substrings and the mention index, OR across
    /// every supplied term, newest first. Pagination happens in the storage
    /// engine (LIMIT/OFFSET), not in application memory.
    pub fn search_tweets(
        &self,
        query: &TweetQuery,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<TweetSearchHit>> {
        if query.is_empty() {
            return Err(Error::Validation(
                "at least one keyword or hashtag is required".into(),
            ));
        }
        let (offset, page_size) = page_window(page, page_size)?;
        let mut conn = self.pool.get()?;

        type TweetsWithWriter = diesel::dsl::InnerJoinQuerySource<tweets::table, users::table>;
        let mut predicate: Box<dyn BoxableExpression<TweetsWithWriter, Sqlite, SqlType = Bool>> =
            Box::new(false.into_sql::<Bool>());
        for term in &query.text_terms {
            let needle = term.to_lowercase();
            predicate = Box::new(predicate.or(instr(lower(tweets::text), needle).gt(0)));
        }
        if !query.hashtag_terms.is_empty() {
            // Term equality is case-insensitive at the storage layer
            // (NOCASE collation on mentions.term).
            let tagged = mentions::table
                .filter(mentions::term.eq_any(query.hashtag_terms.clone()))
                .select(mentions::tweet);
            predicate = Box::new(predicate.or(tweets::id.eq_any(tagged)));
        }

        let rows: Vec<(Tweet, String)> = tweets::table
            .inner_join(users::table)
            .filter(predicate)
            .order((tweets::date.desc(), tweets::id.desc()))
            .limit(page_size)
            .offset(offset)
            .select((Tweet::as_select(), users::name))
            .load(&mut conn)?;

        let hits: Vec<TweetSearchHit> = rows
            .into_iter()
            .map(|(tweet, writer_name)| TweetSearchHit {
                tweet_id: tweet.id,
                reply_to: tweet.reply_to,
                text: tweet.text,
                date: tweet.date,
                writer: tweet.writer,
                writer_name,
            })
            .collect();
        debug!(page, count = hits.len(), "tweet search page");
        Ok(hits)
    }
}
