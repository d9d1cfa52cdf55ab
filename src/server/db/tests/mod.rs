
use anyhow::{bail, Result};

use super::types::UserRecord;
use super::Database;

pub fn run_all_tests(db: &Database) {
    user::run_user_tests(db);
    entity::run_entity_tests(db);

    test_rollback(db);
}

fn test_rollback(db: &Database) {
    let result: Result<()> = db.with_transaction(|tx| {
        tx.create_user(&UserRecord {
            id: String::from("rollback-user"),
            username: String::from("none"),
            display_name: String::from("None"),
            password: String::from("test123"),
            salt: String::from("test_salt"),
            roles: vec![String::from("user")],
            create_time: 50,
        })
        .unwrap();

        bail!("rollback");
    });
    assert!(result.is_err());

    db.with_transaction(|tx| {
        assert!(!tx.has_username("none")?);
        assert!(tx.get_user("rollback-user")?.is_none());
        Ok(())
    })
    .unwrap();
}
