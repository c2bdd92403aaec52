diesel::table! {
    users (id) {
        id -> BigInt,
        credential -> Text,
        name -> Text,
        email -> Text,
        city -> Text,
        timezone -> Float,
    }
}

diesel::table! {
    follows (follower, followee) {
        follower -> BigInt,
        followee -> BigInt,
        start_date -> BigInt,
    }
}

diesel::table! {
    tweets (id) {
        id -> BigInt,
        writer -> BigInt,
        date -> BigInt,
        text -> Text,
        reply_to -> Nullable<BigInt>,
    }
}

diesel::table! {
    // The SQL table carries no primary key on purpose (duplicate retweets
    // are allowed); the key here is diesel bookkeeping only.
    retweets (user, tweet, date) {
        user -> BigInt,
        tweet -> BigInt,
        date -> BigInt,
    }
}

diesel::table! {
    hashtags (term) {
        term -> Text,
    }
}

diesel::table! {
    mentions (tweet, term) {
        tweet -> BigInt,
        term -> Text,
    }
}

diesel::joinable!(tweets -> users (writer));
diesel::joinable!(retweets -> tweets (tweet));
diesel::joinable!(mentions -> tweets (tweet));

diesel::allow_tables_to_appear_in_same_query!(users, follows, tweets, retweets, hashtags, mentions,);
