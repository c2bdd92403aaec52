use diesel::prelude::*;
use tracing::debug;

use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::ids::{allocate_next, IdSpace};
use crate::models::{NewUser, UserProfile};
use crate::schema::users;

/// Westernmost and easternmost legal UTC offsets, in hours.
const TIMEZONE_RANGE: std::ops::RangeInclusive<f32> = -12.0..=14.0;

pub struct Accounts {
    pool: DbPool,
}

impl Accounts {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Registers a new user and returns the profile carrying the allocated
    /// id. The id read and the insert commit as one transaction.
    pub fn signup(
        &self,
        credential: &str,
        name: &str,
        email: &str,
        city: &str,
        timezone: f32,
    ) -> Result<UserProfile> {
        if name.trim().is_empty() {
            return Err(Error::Validation("name must not be empty".into()));
        }
        if !timezone.is_finite() || !TIMEZONE_RANGE.contains(&timezone) {
            return Err(Error::Validation(
                "timezone must be an hour offset between -12.0 and 14.0".into(),
            ));
        }

        let mut conn = self.pool.get()?;
        let profile = conn.immediate_transaction(|conn| {
            let id = allocate_next(conn, IdSpace::Users)?;
            diesel::insert_into(users::table)
                .values(&NewUser {
                    id,
                    credential: credential.to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    city: city.to_string(),
                    timezone,
                })
                .execute(conn)?;
            Ok::<_, Error>(UserProfile {
                id,
                name: name.to_string(),
                email: email.to_string(),
                city: city.to_string(),
                timezone,
            })
        })?;

        debug!(user = profile.id, "user signed up");
        Ok(profile)
    }

    /// Checks the id/credential pair. Unknown id and wrong credential are
    /// indistinguishable in the returned error.
    pub fn login(&self, user_id: i64, credential: &str) -> Result<UserProfile> {
        let mut conn = self.pool.get()?;
        let profile = users::table
            .filter(users::id.eq(user_id))
            .filter(users::credential.eq(credential))
            .select(UserProfile::as_select())
            .first(&mut conn)?;
        Ok(profile)
    }

    pub fn profile(&self, user_id: i64) -> Result<UserProfile> {
        let mut conn = self.pool.get()?;
        let profile = users::table
            .filter(users::id.eq(user_id))
            .select(UserProfile::as_select())
            .first(&mut conn)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_signup_allocates_sequential_ids() {
        let accounts = Accounts::new(test_pool());
        let a = accounts.signup("pw-a", "Ada", "ada@example.com", "London", 0.0).unwrap();
        let b = accounts.signup("pw-b", "Brin", "brin@example.com", "Perth", 8.0).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_login_checks_both_id_and_credential() {
        let accounts = Accounts::new(test_pool());
        let ada = accounts.signup("secret", "Ada", "", "", 0.0).unwrap();

        let ok = accounts.login(ada.id, "secret").unwrap();
        assert_eq!(ok, ada);

        let wrong_secret = accounts.login(ada.id, "nope").unwrap_err();
        let unknown_id = accounts.login(99, "secret").unwrap_err();
        assert!(matches!(wrong_secret, Error::NotFound));
        assert!(matches!(unknown_id, Error::NotFound));
    }

    #[test]
    fn test_signup_rejects_bad_timezone() {
        let accounts = Accounts::new(test_pool());
        assert!(matches!(
            accounts.signup("pw", "Ada", "", "", 15.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            accounts.signup("pw", "Ada", "", "", f32::NAN),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_signup_rejects_blank_name() {
        let accounts = Accounts::new(test_pool());
        assert!(matches!(
            accounts.signup("pw", "   ", "", "", 0.0),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_profile_hides_nothing_but_credential() {
        let accounts = Accounts::new(test_pool());
        let ada = accounts
            .signup("pw", "Ada", "ada@example.com", "London", -3.5)
            .unwrap();
        let fetched = accounts.profile(ada.id).unwrap();
        assert_eq!(fetched.email, "ada@example.com");
        assert_eq!(fetched.city, "London");
        assert_eq!(fetched.timezone, -3.5);
    }
}
