use chrono::Utc;
use diesel::prelude::*;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::models::{NewFollow, UserProfile};
use crate::schema::{follows, tweets, users};

/// What `follow` did. Already-following is a non-error outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
}

pub struct SocialGraph {
    pool: DbPool,
}

impl SocialGraph {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the follow edge if absent. Both endpoints must exist.
    /// Idempotent: the pair primary key plus `INSERT OR IGNORE` make a
    /// racing double-follow land as `AlreadyFollowing` rather than a
    /// duplicate edge.
    pub fn follow(&self, follower: i64, followee: i64) -> Result<FollowOutcome> {
        if follower == followee {
            return Err(Error::Validation("cannot follow yourself".into()));
        }

        let mut conn = self.pool.get()?;
        let outcome = conn.immediate_transaction(|conn| {
            let known: i64 = users::table
                .filter(users::id.eq_any(vec![follower, followee]))
                .count()
                .get_result(conn)?;
            if known != 2 {
                return Err(Error::NotFound);
            }

            let inserted = diesel::insert_or_ignore_into(follows::table)
                .values(&NewFollow {
                    follower,
                    followee,
                    start_date: Utc::now().timestamp(),
                })
                .execute(conn)?;
            Ok(if inserted == 0 {
                FollowOutcome::AlreadyFollowing
            } else {
                FollowOutcome::Created
            })
        })?;

        debug!(follower, followee, ?outcome, "follow");
        Ok(outcome)
    }

    /// Profiles of everyone following `user`, with the follow start date,
    /// ordered by start date then follower id for a deterministic listing.
    pub fn followers_of(&self, user: i64) -> Result<Vec<(UserProfile, i64)>> {
        let mut conn = self.pool.get()?;
        let rows = follows::table
            .inner_join(users::table.on(users::id.eq(follows::follower)))
            .filter(follows::followee.eq(user))
            .order((follows::start_date.asc(), follows::follower.asc()))
            .select((UserProfile::as_select(), follows::start_date))
            .load::<(UserProfile, i64)>(&mut conn)?;
        Ok(rows)
    }

    pub fn tweet_count(&self, user: i64) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let count = tweets::table
            .filter(tweets::writer.eq(user))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    pub fn following_count(&self, user: i64) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let count = follows::table
            .filter(follows::follower.eq(user))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    pub fn follower_count(&self, user: i64) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let count = follows::table
            .filter(follows::followee.eq(user))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }
}
