use diesel::dsl::max;
use diesel::prelude::*;

use crate::schema::{tweets, users};

/// The entity spaces with allocator-managed ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpace {
    Users,
    Tweets,
}

/// Returns the next id for the given space: 1 when the space is empty,
/// otherwise current max + 1.
///
/// Must run inside the same immediate (write-locking) transaction as the
/// insert that consumes the id. Reading the max and inserting on two
/// uncoordinated connections can hand the same id to concurrent callers.
pub fn allocate_next(conn: &mut SqliteConnection, space: IdSpace) -> QueryResult<i64> {
    let current = match space {
        IdSpace::Users => users::table.select(max(users::id)).first::<Option<i64>>(conn)?,
        IdSpace::Tweets => tweets::table
            .select(max(tweets::id))
            .first::<Option<i64>>(conn)?,
    };
    Ok(current.unwrap_or(0) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::NewUser;

    fn insert_user(conn: &mut SqliteConnection, id: i64) {
        diesel::insert_into(users::table)
            .values(&NewUser {
                id,
                credential: "pw".into(),
                name: format!("user{id}"),
                email: String::new(),
                city: String::new(),
                timezone: 0.0,
            })
            .execute(conn)
            .unwrap();
    }

    #[test]
    fn test_empty_space_starts_at_one() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        assert_eq!(allocate_next(&mut conn, IdSpace::Users).unwrap(), 1);
        assert_eq!(allocate_next(&mut conn, IdSpace::Tweets).unwrap(), 1);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();

        for expected in 1..=3 {
            let id = conn
                .immediate_transaction(|conn| {
                    let id = allocate_next(conn, IdSpace::Users)?;
                    insert_user(conn, id);
                    Ok::<_, diesel::result::Error>(id)
                })
                .unwrap();
            assert_eq!(id, expected);
        }
    }

    #[test]
    fn test_spaces_are_independent() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        insert_user(&mut conn, 7);
        assert_eq!(allocate_next(&mut conn, IdSpace::Users).unwrap(), 8);
        assert_eq!(allocate_next(&mut conn, IdSpace::Tweets).unwrap(), 1);
    }
}
