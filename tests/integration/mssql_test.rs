use std::cell::{Cell, RefCell};
use std::io;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use dataeng_utils::config::BatchWriterConfig;
use dataeng_utils::mssql::{BatchConnection, Connector};
use dataeng_utils::{
    BatchWriter, ColumnData, Error, SqlValue, TableName, insert_statement, update_statement,
};

/// Records every connection, executed batch and commit
#[derive(Default)]
struct RecordingConnector {
    connects: Cell<usize>,
    commits: Cell<usize>,
    batches: RefCell<Vec<(String, Vec<Vec<SqlValue>>)>>,
    fail_on_batch: Option<usize>,
}

impl RecordingConnector {
    fn failing_on(batch: usize) -> Self {
        Self {
            fail_on_batch: Some(batch),
            ..Self::default()
        }
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.borrow().iter().map(|(_, rows)| rows.len()).collect()
    }
}

struct RecordingConnection<'a> {
    connector: &'a RecordingConnector,
}

impl Connector for RecordingConnector {
    type Error = io::Error;
    type Connection<'a> = RecordingConnection<'a>;

    fn connect(&self) -> Result<RecordingConnection<'_>, io::Error> {
        self.connects.set(self.connects.get() + 1);
        Ok(RecordingConnection { connector: self })
    }
}

impl BatchConnection for RecordingConnection<'_> {
    type Error = io::Error;

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<(), io::Error> {
        let mut batches = self.connector.batches.borrow_mut();
        if self.connector.fail_on_batch == Some(batches.len()) {
            return Err(io::Error::other("Violation of PRIMARY KEY constraint"));
        }
        batches.push((sql.to_string(), rows.to_vec()));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), io::Error> {
        self.connector.commits.set(self.connector.commits.get() + 1);
        Ok(())
    }
}

fn mssql_data() -> ColumnData {
    ColumnData::new()
        .with_column("num_col", [1, 2])
        .with_column("str_col", ["a", "b"])
        .with_column("bool_col", [true, false])
        .with_column("dt_col", ["2024-01-01", "2024-01-02"])
}

fn numbered_data(rows: i64) -> ColumnData {
    ColumnData::new()
        .with_column("id", 0..rows)
        .with_column("value", (0..rows).map(|i| format!("v{i}")))
}

fn writer(connector: RecordingConnector, batch_size: usize) -> BatchWriter<RecordingConnector> {
    BatchWriter::with_config(connector, BatchWriterConfig::new(batch_size).unwrap())
}

#[test]
fn test_insert_statement() {
    let statement = insert_statement(&mssql_data(), &TableName::new("mssql"));
    assert_eq!(
        statement.sql(),
        "INSERT INTO [dbo].[mssql] \n([num_col], [str_col], [bool_col], [dt_col]) \nVALUES (?, ?, ?, ?)"
    );
}

#[test]
fn test_insert_statement_with_schema() {
    let statement = insert_statement(&mssql_data(), &TableName::with_schema("sch", "mssql"));
    assert_eq!(
        statement.sql(),
        "INSERT INTO [sch].[mssql] \n([num_col], [str_col], [bool_col], [dt_col]) \nVALUES (?, ?, ?, ?)"
    );
}

#[test]
fn test_update_statement() {
    let statement =
        update_statement(&mssql_data(), &TableName::new("mssql"), &["num_col", "str_col"]).unwrap();
    assert_eq!(
        statement.sql(),
        "UPDATE [dbo].[mssql] \nSET [bool_col] = ?, [dt_col] = ? \nWHERE [num_col] = ? AND [str_col] = ?;"
    );
    assert_eq!(
        statement.parameters(),
        ["bool_col", "dt_col", "num_col", "str_col"].map(String::from)
    );
}

#[test]
fn test_update_statement_single_id() {
    let data = ColumnData::new()
        .with_column("a", [1])
        .with_column("b", [2])
        .with_column("c", [3]);
    let statement = update_statement(&data, &"t".into(), &["a"]).unwrap();
    assert_eq!(statement.sql(), "UPDATE [dbo].[t] \nSET [b] = ?, [c] = ? \nWHERE [a] = ?;");
}

#[test]
fn test_update_statement_requires_id_columns() {
    let result = update_statement::<&str>(&mssql_data(), &TableName::new("mssql"), &[]);
    assert!(matches!(result, Err(Error::EmptyIdColumns)));

    let result = update_statement(&mssql_data(), &TableName::new("mssql"), &["missing"]);
    assert!(matches!(result, Err(Error::UnknownColumn(name)) if name == "missing"));
}

#[test]
fn test_batches_cover_all_rows() {
    let data = numbered_data(2500);
    let writer = writer(RecordingConnector::default(), 1000);

    let summary = writer.write(&data, &insert_statement(&data, &"t".into())).unwrap();
    assert_eq!(summary.rows, 2500);
    assert_eq!(summary.batches, 3);

    let connector = writer.connector();
    assert_eq!(connector.connects.get(), 3);
    assert_eq!(connector.commits.get(), 3);
    assert_eq!(connector.batch_sizes(), vec![1000, 1000, 500]);
}

#[test]
fn test_exact_multiple_of_batch_size() {
    let data = numbered_data(20);
    let writer = writer(RecordingConnector::default(), 10);

    let summary = writer.write(&data, &insert_statement(&data, &"t".into())).unwrap();
    assert_eq!(summary.batches, 2);
    assert_eq!(writer.connector().batch_sizes(), vec![10, 10]);
}

#[test]
fn test_rows_follow_column_order() {
    let data = numbered_data(3);
    let writer = writer(RecordingConnector::default(), 1000);
    writer.write(&data, &insert_statement(&data, &"t".into())).unwrap();

    let batches = writer.connector().batches.borrow();
    let (sql, rows) = &batches[0];
    assert_eq!(sql, "INSERT INTO [dbo].[t] \n([id], [value]) \nVALUES (?, ?)");
    assert_eq!(rows[2], vec![SqlValue::Int(2), SqlValue::Text("v2".to_string())]);
}

#[test]
fn test_update_binds_set_columns_before_ids() {
    let data = ColumnData::new()
        .with_column("id", [7])
        .with_column("name", ["seven"])
        .with_column("active", [true]);
    let statement = update_statement(&data, &"t".into(), &["id"]).unwrap();

    let writer = writer(RecordingConnector::default(), 1000);
    writer.write(&data, &statement).unwrap();

    let batches = writer.connector().batches.borrow();
    assert_eq!(
        batches[0].1[0],
        vec![SqlValue::Text("seven".to_string()), SqlValue::Bool(true), SqlValue::Int(7)]
    );
}

#[test]
fn test_length_mismatch_opens_no_connection() {
    let data = ColumnData::new()
        .with_column("a", [1, 2, 3])
        .with_column("b", [1, 2]);
    let writer = writer(RecordingConnector::default(), 1000);

    let err = writer.write(&data, &insert_statement(&data, &"t".into())).unwrap_err();
    assert!(matches!(
        err,
        Error::LengthMismatch { ref column, expected: 3, actual: 2 } if column == "b"
    ));
    assert_eq!(writer.connector().connects.get(), 0);
}

#[test]
fn test_empty_data_is_rejected() {
    let data = ColumnData::new();
    let writer = writer(RecordingConnector::default(), 1000);

    let err = writer.write(&data, &insert_statement(&data, &"t".into())).unwrap_err();
    assert!(matches!(err, Error::EmptyData));
    assert_eq!(writer.connector().connects.get(), 0);
}

#[test]
fn test_zero_batch_size_opens_no_connection() {
    let data = numbered_data(5);
    let writer = BatchWriter::with_config(
        RecordingConnector::default(),
        BatchWriterConfig { batch_size: 0 },
    );

    let err = writer.write(&data, &insert_statement(&data, &"t".into())).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(writer.connector().connects.get(), 0);
}

#[test]
fn test_driver_error_is_wrapped_and_stops_writing() {
    let data = numbered_data(25);
    let writer = writer(RecordingConnector::failing_on(1), 10);

    let err = writer.write(&data, &insert_statement(&data, &"t".into())).unwrap_err();
    match &err {
        Error::Execution(message) => {
            assert_eq!(message, "Violation of PRIMARY KEY constraint");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("Error processing data: "));

    // The first batch stays committed; the third is never attempted
    let connector = writer.connector();
    assert_eq!(connector.commits.get(), 1);
    assert_eq!(connector.connects.get(), 2);
    assert_eq!(connector.batch_sizes(), vec![10]);
}

#[test]
fn test_record_batch_rows_are_written() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("active", DataType::Boolean, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![1, 2])),
        Arc::new(StringArray::from(vec![Some("one"), None])),
        Arc::new(BooleanArray::from(vec![Some(true), None])),
    ];
    let batch = RecordBatch::try_new(schema, columns).unwrap();

    let data = ColumnData::from_record_batch(&batch).unwrap();
    let writer = writer(RecordingConnector::default(), 1000);
    writer.write(&data, &insert_statement(&data, &"t".into())).unwrap();

    let batches = writer.connector().batches.borrow();
    assert_eq!(batches[0].1[1], vec![SqlValue::Int(2), SqlValue::Null, SqlValue::Null]);
}
