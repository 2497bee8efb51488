use std::sync::Arc;

use async_trait::async_trait;
use dbhelper::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use dbhelper::error::DbHelperError;
use dbhelper::traits::DatabaseDriver;
use dbhelper::types::{ExecOutcome, RawQueryResult, SqlValue, Values};
use dbhelper::{Database, Dialect, Result, SelectQuery};

fn database(in_memory_test_driver: &Arc<InMemoryTestDriver>) -> Database {
    dbhelper::logging::init_logger(true);
    let driver: Arc<dyn DatabaseDriver> =
        Arc::clone(in_memory_test_driver) as Arc<dyn DatabaseDriver>;
    Database::new(driver)
}

#[tokio::test]
async fn test_insert_renders_escaped_literals() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_exec_outcome(ExecOutcome::new(1, Some(5))),
    );
    let mut db = database(&in_memory_test_driver);

    let id = db.insert("t", &Values::new().set("a", 1)).await.unwrap();

    assert_eq!(id, 5);
    assert_eq!(db.last_sql(), Some("INSERT INTO t (`a`) VALUES ('1')"));
    // The driver receives the parameterized form.
    in_memory_test_driver.assert_last_query("INSERT INTO t (`a`) VALUES (?)", &[SqlValue::Int32(1)]);
    in_memory_test_driver.assert_query_count(1);
}

#[tokio::test]
async fn test_insert_without_insert_id_returns_zero() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_exec_outcome(ExecOutcome::new(1, None)),
    );
    let mut db = database(&in_memory_test_driver);

    let id = db
        .insert("users", &Values::new().set("name", "O'Brien"))
        .await
        .unwrap();

    assert_eq!(id, 0);
    assert_eq!(
        db.last_sql(),
        Some("INSERT INTO users (`name`) VALUES ('O\\'Brien')")
    );
    in_memory_test_driver.assert_last_query(
        "INSERT INTO users (`name`) VALUES (?)",
        &[SqlValue::Text("O'Brien".to_string())],
    );
}

#[tokio::test]
async fn test_update_with_where_args() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_exec_outcome(ExecOutcome::new(2, None)),
    );
    let mut db = database(&in_memory_test_driver);

    let affected = db
        .update(
            "users",
            &Values::new().set("name", "Bob").set("age", 40),
            Some("team = ?"),
            &["red".into()],
        )
        .await
        .unwrap();

    assert_eq!(affected, 2);
    assert_eq!(
        db.last_sql(),
        Some("UPDATE users SET `name`='Bob',`age`='40' WHERE team = 'red'")
    );
    in_memory_test_driver.assert_last_query(
        "UPDATE users SET `name`=?,`age`=? WHERE team = ?",
        &[
            SqlValue::Text("Bob".to_string()),
            SqlValue::Int32(40),
            SqlValue::Text("red".to_string()),
        ],
    );
}

#[tokio::test]
async fn test_delete_without_where_affects_all_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_exec_outcome(ExecOutcome::new(7, None)),
    );
    let mut db = database(&in_memory_test_driver);

    let affected = db.delete("sessions", None, &[]).await.unwrap();

    assert_eq!(affected, 7);
    in_memory_test_driver.assert_last_query("DELETE FROM sessions", &[]);
}

#[tokio::test]
async fn test_select_simple() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "name"])
                .row(&["42", "Bob"])
                .build(),
        ),
    );
    let mut db = database(&in_memory_test_driver);

    let result = db
        .select_simple("users", &["id", "name"], Some("name = ?"), &["Bob".into()], Some("id"))
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "SELECT id,name FROM users WHERE name = ? ORDER BY id",
        &[SqlValue::Text("Bob".to_string())],
    );

    let row = result.single_row().unwrap();
    assert_eq!(row.get("id").unwrap(), Some("42"));
    assert_eq!(row.get("name").unwrap(), Some("Bob"));
}

#[tokio::test]
async fn test_select_full() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["team", "n"])
                .row(&["red", "3"])
                .nullable_row(&[None, Some("2")])
                .build(),
        ),
    );
    let mut db = database(&in_memory_test_driver);

    let result = db
        .select_full(
            "users",
            &["team", "COUNT(*) AS n"],
            Some("age >= ?"),
            &[18.into()],
            Some("team"),
            Some("COUNT(*) > 1"),
            Some("n DESC"),
            Some("10"),
            true,
        )
        .await
        .unwrap();

    assert_eq!(
        db.last_sql(),
        Some(
            "SELECT DISTINCT team,COUNT(*) AS n FROM users WHERE age >= '18' \
             GROUP BY team HAVING COUNT(*) > 1 ORDER BY n DESC LIMIT 10"
        )
    );

    let rows = result.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("team").unwrap(), Some("red"));
    assert_eq!(rows[1].get("team").unwrap(), None);
    assert_eq!(rows[1].get("n").unwrap(), Some("2"));
}

#[tokio::test]
async fn test_select_query_uses_driver_dialect() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_dialect(Dialect::postgres()));
    let mut db = database(&in_memory_test_driver);

    let result = db
        .select(SelectQuery::new("users", ["id"]).where_("a = ? AND b = ?", [1, 2]))
        .await
        .unwrap();

    assert!(result.is_empty());
    in_memory_test_driver.assert_last_query(
        "SELECT id FROM users WHERE a = $1 AND b = $2",
        &[SqlValue::Int32(1), SqlValue::Int32(2)],
    );
}

#[tokio::test]
async fn test_driver_error_is_recorded() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_error("Table 'app.missing' doesn't exist")
            .with_exec_outcome(ExecOutcome::new(1, Some(1))),
    );
    let mut db = database(&in_memory_test_driver);

    let err = db
        .insert("missing", &Values::new().set("a", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, DbHelperError::QueryFailed(_)));
    assert_eq!(db.last_error(), Some("Table 'app.missing' doesn't exist"));
    // The statement text is still available for inspection.
    assert_eq!(db.last_sql(), Some("INSERT INTO missing (`a`) VALUES ('1')"));

    // A later success leaves the previous error in place until cleared.
    db.insert("t", &Values::new().set("a", 1)).await.unwrap();
    assert_eq!(db.last_error(), Some("Table 'app.missing' doesn't exist"));
    db.clear_error();
    assert_eq!(db.last_error(), None);
}

#[tokio::test]
async fn test_placeholder_mismatch_never_reaches_driver() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = database(&in_memory_test_driver);

    let err = db
        .delete("users", Some("id = ? AND name = ?"), &[1.into()])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbHelperError::PlaceholderMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert!(db.last_error().is_some());
    in_memory_test_driver.assert_query_count(0);
}

#[tokio::test]
async fn test_empty_values_are_rejected() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = database(&in_memory_test_driver);

    let err = db.update("users", &Values::new(), None, &[]).await.unwrap_err();

    assert!(matches!(err, DbHelperError::EmptyValues(ref t) if t == "users"));
    in_memory_test_driver.assert_query_count(0);
}

#[tokio::test]
async fn test_exec_sql_and_stat() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_status("Uptime: 42")
            .with_error("syntax error"),
    );
    let mut db = database(&in_memory_test_driver);

    assert!(db.exec_sql("DROP TABLE").await.is_err());
    assert_eq!(db.last_sql(), Some("DROP TABLE"));
    assert_eq!(db.last_error(), Some("syntax error"));

    db.exec_sql("TRUNCATE logs").await.unwrap();
    in_memory_test_driver.assert_last_query("TRUNCATE logs", &[]);
    in_memory_test_driver.assert_query_count(2);

    assert_eq!(db.stat().await.unwrap(), "Uptime: 42");
    assert_eq!(db.escape("it's"), "it\\'s");
}

/// Delegates to the in-memory driver but brings its own string escaping.
struct BracketEscapingDriver(Arc<InMemoryTestDriver>);

#[async_trait]
impl DatabaseDriver for BracketEscapingDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        self.0.execute(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.0.query(sql, params).await
    }

    async fn stat(&self) -> Result<String> {
        self.0.stat().await
    }

    fn escape(&self, value: &str) -> String {
        format!("ESC[{}]", value)
    }
}

#[tokio::test]
async fn test_rendering_uses_driver_escape() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = Database::new(Arc::new(BracketEscapingDriver(Arc::clone(
        &in_memory_test_driver,
    ))));

    assert_eq!(db.escape("x"), "ESC[x]");

    db.insert("t", &Values::new().set("a", "x")).await.unwrap();
    assert_eq!(db.last_sql(), Some("INSERT INTO t (`a`) VALUES ('ESC[x]')"));
    // Bound parameters are left untouched.
    in_memory_test_driver.assert_last_query(
        "INSERT INTO t (`a`) VALUES (?)",
        &[SqlValue::Text("x".to_string())],
    );

    db.update("t", &Values::new().set("a", 1), Some("b = ?"), &["y".into()])
        .await
        .unwrap();
    assert_eq!(
        db.last_sql(),
        Some("UPDATE t SET `a`='ESC[1]' WHERE b = 'ESC[y]'")
    );

    db.delete("t", Some("b = ?"), &[SqlValue::Null]).await.unwrap();
    assert_eq!(db.last_sql(), Some("DELETE FROM t WHERE b = NULL"));

    db.select(SelectQuery::new("t", ["a"]).where_("b = ?", ["z"]))
        .await
        .unwrap();
    assert_eq!(db.last_sql(), Some("SELECT a FROM t WHERE b = 'ESC[z]'"));
}
