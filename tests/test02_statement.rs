use std::io::Cursor;
use std::sync::{Arc, Mutex};

use rds_data_middleware::prelude::*;
use rds_data_middleware::test_utils::MockTransport;

fn connect(transport: &Arc<MockTransport>) -> RdsDataConnection {
    RdsDataConnection::new(transport.clone(), RdsDataConfig::new("resource", "secret", "db"))
        .unwrap()
}

fn foo_bar() -> ExecuteStatementResponse {
    ExecuteStatementResponse {
        column_metadata: vec![ColumnMetadata::labeled("col1"), ColumnMetadata::labeled("col2")],
        records: vec![vec![Field::String("foo".into()), Field::String("bar".into())]],
        ..ExecuteStatementResponse::default()
    }
}

#[tokio::test]
async fn insert_records_generated_id() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport.on_execute(Ok(ExecuteStatementResponse {
        number_of_records_updated: Some(1),
        generated_fields: vec![Field::Long(5)],
        ..ExecuteStatementResponse::default()
    }));
    let mut conn = connect(&transport);
    assert_eq!(conn.last_insert_id(), None);

    let mut stmt = conn.prepare("INSERT INTO foo (bar) VALUES (?)");
    stmt.bind_value(0, 5_i64, ParameterType::Integer);
    stmt.execute().await?;
    assert_eq!(stmt.row_count(), 1);
    drop(stmt);

    let sent = &transport.executed_statements()[0];
    assert_eq!(sent.sql, "INSERT INTO foo (bar) VALUES (:0)");
    assert_eq!(
        sent.parameters,
        vec![SqlParameter {
            name: "0".into(),
            value: Field::Long(5),
        }]
    );
    assert_eq!(conn.last_insert_id(), Some(&Value::Int(5)));
    Ok(())
}

#[tokio::test]
async fn one_based_and_named_parameters() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport
        .on_execute(Ok(ExecuteStatementResponse::default()))
        .on_execute(Ok(ExecuteStatementResponse::default()));
    let mut conn = connect(&transport);

    let mut stmt = conn.prepare("SELECT * FROM t WHERE a = ? AND b = '?' AND c = ?");
    stmt.bind_value(1, "x", ParameterType::String)
        .bind_value(2, true, ParameterType::Boolean);
    stmt.execute().await?;
    drop(stmt);

    let mut stmt = conn.prepare("SELECT * FROM t WHERE a = :name");
    stmt.bind_value("name", Value::Null, ParameterType::String);
    stmt.execute().await?;
    drop(stmt);

    let sent = transport.executed_statements();
    assert_eq!(sent[0].sql, "SELECT * FROM t WHERE a = :1 AND b = '?' AND c = :2");
    assert_eq!(sent[0].parameters[1].name, "2");
    assert_eq!(sent[0].parameters[1].value, Field::Boolean(true));
    assert_eq!(sent[1].sql, "SELECT * FROM t WHERE a = :name");
    assert_eq!(sent[1].parameters[0].value, Field::Null);
    Ok(())
}

#[tokio::test]
async fn usage_errors_never_reach_the_transport() {
    let transport = Arc::new(MockTransport::new());
    let mut conn = connect(&transport);

    let mut stmt = conn.prepare("SELECT ?");
    stmt.bind_value(2, 1_i64, ParameterType::Integer);
    assert!(matches!(
        stmt.execute().await,
        Err(RdsDataError::AmbiguousParameterNumbering(_))
    ));
    drop(stmt);

    let mut stmt = conn.prepare("SELECT ?");
    stmt.bind_value(0, 1_i64, ParameterType::Integer)
        .bind_value(1, 2_i64, ParameterType::Integer);
    assert!(matches!(
        stmt.execute().await,
        Err(RdsDataError::AmbiguousParameterNumbering(_))
    ));
    drop(stmt);

    let mut stmt = conn.prepare("SELECT 'open, ?");
    stmt.bind_value(0, 1_i64, ParameterType::Integer);
    assert!(matches!(stmt.execute().await, Err(RdsDataError::MalformedSql(_))));
    drop(stmt);

    let mut stmt = conn.prepare("SELECT ?");
    stmt.bind_value(0, "a", ParameterType::Ascii);
    assert!(matches!(stmt.execute().await, Err(RdsDataError::UnsupportedType(_))));
    drop(stmt);

    let mut stmt = conn.prepare("SELECT ?");
    let bound = stmt.bind_param(0, || Value::Null, ParameterType::String, Some(4));
    assert!(matches!(bound, Err(RdsDataError::Unimplemented(_))));
    drop(stmt);

    assert!(transport.received().is_empty());
}

#[tokio::test]
async fn late_bound_values_follow_the_variable() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport
        .on_execute(Ok(ExecuteStatementResponse::default()))
        .on_execute(Ok(ExecuteStatementResponse::default()));
    let mut conn = connect(&transport);

    let variable = Arc::new(Mutex::new(Value::Int(1)));
    let reader = Arc::clone(&variable);
    let mut stmt = conn.prepare("SELECT * FROM t WHERE id = ?");
    stmt.bind_param(
        0,
        move || reader.lock().map(|v| v.clone()).unwrap_or(Value::Null),
        ParameterType::Integer,
        None,
    )?;

    stmt.execute().await?;
    *variable.lock().unwrap() = Value::Int(2);
    stmt.execute().await?;
    drop(stmt);

    let sent = transport.executed_statements();
    assert_eq!(sent[0].parameters[0].value, Field::Long(1));
    assert_eq!(sent[1].parameters[0].value, Field::Long(2));
    Ok(())
}

#[tokio::test]
async fn streams_are_sent_as_blobs() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport.on_execute(Ok(ExecuteStatementResponse::default()));
    let mut conn = connect(&transport);

    let mut stmt = conn.prepare("INSERT INTO files (data) VALUES (?)");
    stmt.bind_stream(0, Cursor::new(vec![0_u8, 1, 2]), ParameterType::LargeObject);
    stmt.execute().await?;
    drop(stmt);

    let sent = &transport.executed_statements()[0];
    assert_eq!(sent.parameters[0].value, Field::Blob(vec![0, 1, 2]));
    assert_eq!(
        serde_json::to_value(&sent.parameters[0]).unwrap(),
        serde_json::json!({"name": "0", "value": {"blobValue": "AAEC"}})
    );
    Ok(())
}

#[tokio::test]
async fn execute_with_infers_types() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport.on_execute(Ok(ExecuteStatementResponse::default()));
    let mut conn = connect(&transport);

    let mut stmt = conn.prepare("INSERT INTO t VALUES (?, ?, ?, ?)");
    stmt.execute_with(&[
        Value::Int(7),
        Value::from("seven"),
        Value::Bool(false),
        Value::Null,
    ])
    .await?;
    drop(stmt);

    let sent = &transport.executed_statements()[0];
    assert_eq!(sent.sql, "INSERT INTO t VALUES (:0, :1, :2, :3)");
    let values: Vec<_> = sent.parameters.iter().map(|p| p.value.clone()).collect();
    assert_eq!(
        values,
        vec![
            Field::Long(7),
            Field::String("seven".into()),
            Field::Boolean(false),
            Field::Null,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn fetch_mode_is_kept_across_executions() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport.on_execute(Ok(foo_bar())).on_execute(Ok(foo_bar()));
    let mut conn = connect(&transport);

    let mut stmt = conn.prepare("SELECT col1, col2 FROM foo");
    assert_eq!(stmt.fetch_mode(), FetchMode::Mixed);
    stmt.set_fetch_mode(FetchMode::Numeric);

    for _ in 0..2 {
        stmt.execute().await?;
        let row = stmt.fetch()?.and_then(FetchedRow::into_numeric);
        assert_eq!(row, Some(vec![Value::from("foo"), Value::from("bar")]));
        assert!(stmt.fetch()?.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn close_cursor_releases_rows() -> Result<(), RdsDataError> {
    let transport = Arc::new(MockTransport::new());
    transport.on_execute(Ok(foo_bar()));
    let mut conn = connect(&transport);

    let mut stmt = conn.query("SELECT col1, col2 FROM foo").await?;
    assert_eq!(stmt.column_count(), 2);
    stmt.close_cursor();
    stmt.close_cursor();
    assert!(stmt.fetch()?.is_none());
    Ok(())
}
