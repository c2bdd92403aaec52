use strum::{Display, EnumString};

use crate::content::{ContentStore, TweetStatistics};
use crate::error::Result;
use crate::models::Tweet;

/// The function-menu commands a front-end can dispatch on. A closed
/// enumeration instead of raw string comparison; `EnumString` gives the
/// parsing table for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum MenuCommand {
    FollowFeed,
    SearchTweets,
    SearchUsers,
    ComposeTweet,
    ListFollowers,
    Logout,
}

/// Actions available while viewing one tweet.
#[derive(Debug, Clone, PartialEq)]
pub enum TweetAction {
    Reply(String),
    Retweet,
    Return,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TweetView {
    pub tweet: Tweet,
    pub statistics: TweetStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    /// The id of the posted reply.
    Replied(i64),
    Retweeted,
    Closed,
}

/// The viewing state for one selected tweet. Holds no cached data:
/// `view` recomputes statistics from the store every time, so a reply or
/// retweet applied through this screen shows up on the next redisplay.
pub struct TweetScreen<'a> {
    content: &'a ContentStore,
    acting_user: i64,
    tweet_id: i64,
}

impl<'a> TweetScreen<'a> {
    /// Fails with `NotFound` when the tweet does not exist.
    pub fn open(content: &'a ContentStore, acting_user: i64, tweet_id: i64) -> Result<Self> {
        content.tweet(tweet_id)?;
        Ok(Self {
            content,
            acting_user,
            tweet_id,
        })
    }

    pub fn view(&self) -> Result<TweetView> {
        Ok(TweetView {
            tweet: self.content.tweet(self.tweet_id)?,
            statistics: self.content.tweet_statistics(self.tweet_id)?,
        })
    }

    pub fn apply(&self, action: TweetAction) -> Result<ScreenOutcome> {
        match action {
            TweetAction::Reply(text) => self
                .content
                .insert_tweet(self.acting_user, &text, Some(self.tweet_id))
                .map(ScreenOutcome::Replied),
            TweetAction::Retweet => self
                .content
                .insert_retweet(self.acting_user, self.tweet_id)
                .map(|_| ScreenOutcome::Retweeted),
            TweetAction::Return => Ok(ScreenOutcome::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Accounts;
    use crate::db::test_pool;
    use crate::error::Error;
    use std::str::FromStr;

    #[test]
    fn test_menu_commands_round_trip_through_strings() {
        for command in [
            MenuCommand::FollowFeed,
            MenuCommand::SearchTweets,
            MenuCommand::SearchUsers,
            MenuCommand::ComposeTweet,
            MenuCommand::ListFollowers,
            MenuCommand::Logout,
        ] {
            let parsed = MenuCommand::from_str(&command.to_string()).unwrap();
            assert_eq!(parsed, command);
        }
        assert_eq!(
            MenuCommand::from_str("follow-feed").unwrap(),
            MenuCommand::FollowFeed
        );
        assert!(MenuCommand::from_str("format-disk").is_err());
    }

    #[test]
    fn test_screen_requires_existing_tweet() {
        let pool = test_pool();
        let content = ContentStore::new(pool);
        assert!(matches!(
            TweetScreen::open(&content, 1, 42),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_mutations_visible_on_next_view() {
        let pool = test_pool();
        let accounts = Accounts::new(pool.clone());
        let author = accounts.signup("pw", "Ada", "", "", 0.0).unwrap().id;
        let reader = accounts.signup("pw", "Brin", "", "", 0.0).unwrap().id;
        let content = ContentStore::new(pool);
        let root = content.insert_tweet(author, "hello", None).unwrap();

        let screen = TweetScreen::open(&content, reader, root).unwrap();
        let before = screen.view().unwrap();
        assert_eq!(before.statistics.retweet_count, 0);
        assert_eq!(before.statistics.reply_count, 0);

        assert_eq!(
            screen.apply(TweetAction::Retweet).unwrap(),
            ScreenOutcome::Retweeted
        );
        let reply = match screen.apply(TweetAction::Reply("hi back".into())).unwrap() {
            ScreenOutcome::Replied(id) => id,
            other => panic!("unexpected outcome: {other:?}"),
        };

        let after = screen.view().unwrap();
        assert_eq!(after.statistics.retweet_count, 1);
        assert_eq!(after.statistics.reply_count, 1);
        assert_eq!(content.tweet(reply).unwrap().reply_to, Some(root));

        assert_eq!(
            screen.apply(TweetAction::Return).unwrap(),
            ScreenOutcome::Closed
        );
    }
}
