use crate::schema::{follows, hashtags, mentions, retweets, tweets, users};
use diesel::prelude::*;

/// A user row without its credential column. The secret never leaves the
/// accounts module.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub city: String,
    pub timezone: f32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: i64,
    pub credential: String,
    pub name: String,
    pub email: String,
    pub city: String,
    pub timezone: f32,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = tweets)]
pub struct Tweet {
    pub id: i64,
    pub writer: i64,
    pub date: i64,
    pub text: String,
    pub reply_to: Option<i64>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tweets)]
pub struct NewTweet {
    pub id: i64,
    pub writer: i64,
    pub date: i64,
    pub text: String,
    pub reply_to: Option<i64>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower: i64,
    pub followee: i64,
    pub start_date: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = retweets)]
pub struct NewRetweet {
    pub user: i64,
    pub tweet: i64,
    pub date: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = hashtags)]
pub struct NewHashtag {
    pub term: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = mentions)]
pub struct NewMention {
    pub tweet: i64,
    pub term: String,
}
