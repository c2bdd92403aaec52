use std::collections::BTreeSet;
use std::path::PathBuf;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tweeter::{db, Accounts};

// In-memory databases are per-connection, so racing writers need a real
// file behind a multi-connection pool.
fn scratch_db_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tweeter-race-{}-{nanos}.db", std::process::id()))
}

fn remove_scratch_db(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

#[test]
fn concurrent_signups_allocate_unique_sequential_ids() -> Result<()> {
    let path = scratch_db_path();
    let url = path.to_string_lossy().to_string();
    let pool = db::establish_pool(&url, 4)?;
    {
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            thread::spawn(move || {
                Accounts::new(pool)
                    .signup("pw", &format!("user{i}"), "", "", 0.0)
                    .map(|profile| profile.id)
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        let id = handle.join().expect("signup thread panicked")?;
        assert!(ids.insert(id), "id {id} allocated twice");
    }

    // Unique and gap-free: exactly 1..=8.
    assert_eq!(ids, (1..=8).collect::<BTreeSet<i64>>());

    drop(pool);
    remove_scratch_db(&path);
    Ok(())
}
