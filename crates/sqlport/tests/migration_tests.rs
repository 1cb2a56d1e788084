//! End-to-end migration runs against in-memory source and destination
//! drivers registered through the catalog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use sqlport::ddl::sqlite::SqliteDdlBuilder;
use sqlport::{
    BulkSession, Column, DataReader, DataWriter, DriverCatalog, Engine, ForeignKey,
    MigrateError, MigrationRequest, Orchestrator, ProgressSink, Result, Row, SchemaReader,
    SchemaWriter, SourceConnector, SourceHandle, TableSchema, TargetConnector, TargetHandle,
    TransferConfig, TypeService, Value, ViewSchema,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Log(String),
    Warn(String),
    Progress(String, u64),
    Success(String),
    Failure(String),
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| matches(e)).count()
    }
}

impl ProgressSink for RecordingSink {
    fn log(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Log(message.to_string()));
    }
    fn warn(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Warn(message.to_string()));
    }
    fn progress(&self, table: &str, rows: u64) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Progress(table.to_string(), rows));
    }
    fn success(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Success(message.to_string()));
    }
    fn failure(&self, message: &str, _detail: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Failure(message.to_string()));
    }
}

struct MockSchemaReader {
    tables: Vec<TableSchema>,
    views: Vec<ViewSchema>,
}

#[async_trait]
impl SchemaReader for MockSchemaReader {
    async fn get_tables(&self) -> Result<Vec<TableSchema>> {
        Ok(self.tables.clone())
    }

    async fn get_views(&self) -> Result<Vec<ViewSchema>> {
        Ok(self.views.clone())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MockDataReader {
    rows: HashMap<String, Vec<Row>>,
}

#[async_trait]
impl DataReader for MockDataReader {
    async fn read_table(&self, table: &TableSchema) -> Result<mpsc::Receiver<Result<Row>>> {
        let (tx, rx) = mpsc::channel(8);
        let rows = self.rows.get(&table.name).cloned().unwrap_or_default();
        tokio::spawn(async move {
            for row in rows {
                if tx.send(Ok(row)).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MockSourceConnector {
    tables: Vec<TableSchema>,
    views: Vec<ViewSchema>,
    rows: HashMap<String, Vec<Row>>,
    connects: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceConnector for MockSourceConnector {
    async fn connect(&self, _descriptor: &str) -> Result<SourceHandle> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(SourceHandle {
            schema: Arc::new(MockSchemaReader {
                tables: self.tables.clone(),
                views: self.views.clone(),
            }),
            data: Arc::new(MockDataReader {
                rows: self.rows.clone(),
            }),
        })
    }
}

#[derive(Default)]
struct TargetState {
    ddl: Vec<String>,
    rows: HashMap<String, Vec<Row>>,
    pre_calls: usize,
    post_calls: usize,
}

#[derive(Clone)]
struct MemoryTarget {
    state: Arc<Mutex<TargetState>>,
    fail_table: Option<String>,
    bulk: bool,
}

#[async_trait]
impl SchemaWriter for MemoryTarget {
    async fn write_schema(
        &self,
        tables: &[TableSchema],
        types: &TypeService,
        source: Engine,
    ) -> Result<()> {
        let builder = SqliteDdlBuilder::new();
        for table in tables {
            let sql = builder.create_table(table, types, source)?;
            self.state.lock().unwrap().ddl.push(sql);
        }
        Ok(())
    }

    async fn write_views(&self, views: &[ViewSchema]) -> Result<()> {
        let builder = SqliteDdlBuilder::new();
        for view in views {
            let sql = builder.create_view_placeholder(view);
            self.state.lock().unwrap().ddl.push(sql);
        }
        Ok(())
    }

    async fn write_constraints_and_indexes(
        &self,
        tables: &[TableSchema],
        _sink: &dyn ProgressSink,
    ) -> Result<()> {
        let builder = SqliteDdlBuilder::new();
        for table in tables {
            for index in &table.indexes {
                let sql = builder.create_index(table, index);
                self.state.lock().unwrap().ddl.push(sql);
            }
        }
        Ok(())
    }

    async fn pre_migration(&self) -> Result<()> {
        self.state.lock().unwrap().pre_calls += 1;
        Ok(())
    }

    async fn post_migration(&self) -> Result<()> {
        self.state.lock().unwrap().post_calls += 1;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MemoryBulkSession {
    table: String,
    rows: Vec<Row>,
    state: Arc<Mutex<TargetState>>,
}

#[async_trait]
impl BulkSession for MemoryBulkSession {
    async fn write_row(&mut self, row: &Row) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    async fn finish(self: Box<Self>) -> Result<u64> {
        let count = self.rows.len() as u64;
        self.state
            .lock()
            .unwrap()
            .rows
            .entry(self.table)
            .or_default()
            .extend(self.rows);
        Ok(count)
    }
}

#[async_trait]
impl DataWriter for MemoryTarget {
    fn supports_bulk(&self) -> bool {
        self.bulk
    }

    async fn begin_bulk(&self, table: &TableSchema) -> Result<Box<dyn BulkSession>> {
        if self.fail_table.as_deref() == Some(table.name.as_str()) {
            return Err(MigrateError::transfer(&table.name, "simulated bulk failure"));
        }
        Ok(Box::new(MemoryBulkSession {
            table: table.name.clone(),
            rows: Vec::new(),
            state: self.state.clone(),
        }))
    }

    async fn write_batch(&self, table: &TableSchema, rows: &[Row]) -> Result<u64> {
        if self.fail_table.as_deref() == Some(table.name.as_str()) {
            return Err(MigrateError::transfer(&table.name, "simulated write failure"));
        }
        self.state
            .lock()
            .unwrap()
            .rows
            .entry(table.name.clone())
            .or_default()
            .extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MockTargetConnector {
    state: Arc<Mutex<TargetState>>,
    fail_table: Option<String>,
    bulk: bool,
    connects: Arc<AtomicUsize>,
}

#[async_trait]
impl TargetConnector for MockTargetConnector {
    async fn connect(&self, _descriptor: &str) -> Result<TargetHandle> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let target = MemoryTarget {
            state: self.state.clone(),
            fail_table: self.fail_table.clone(),
            bulk: self.bulk,
        };
        Ok(TargetHandle {
            schema: Arc::new(target.clone()),
            data: Arc::new(target),
        })
    }
}

fn int_column(name: &str) -> Column {
    Column {
        name: name.to_string(),
        data_type: "int".to_string(),
        is_nullable: true,
        ..Default::default()
    }
}

fn table(name: &str, parents: &[&str]) -> TableSchema {
    TableSchema {
        name: name.to_string(),
        columns: vec![int_column("Id"), int_column("ParentId")],
        foreign_keys: parents
            .iter()
            .map(|p| ForeignKey {
                name: format!("FK_{}_{}", name, p),
                columns: vec!["ParentId".to_string()],
                ref_table: p.to_string(),
                ref_columns: vec!["Id".to_string()],
                on_delete: None,
                on_update: None,
            })
            .collect(),
        ..Default::default()
    }
}

fn rows(n: i32) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new(vec![Value::I32(i), Value::Null]))
        .collect()
}

struct Fixture {
    catalog: Arc<DriverCatalog>,
    sink: Arc<RecordingSink>,
    state: Arc<Mutex<TargetState>>,
    source_connects: Arc<AtomicUsize>,
    target_connects: Arc<AtomicUsize>,
}

fn fixture(
    tables: Vec<TableSchema>,
    row_map: HashMap<String, Vec<Row>>,
    fail_table: Option<&str>,
    bulk: bool,
) -> Fixture {
    let state = Arc::new(Mutex::new(TargetState::default()));
    let source_connects = Arc::new(AtomicUsize::new(0));
    let target_connects = Arc::new(AtomicUsize::new(0));

    let mut catalog = DriverCatalog::with_builtins();
    catalog.register_source_connector(
        Engine::SqlServer,
        Arc::new(MockSourceConnector {
            tables,
            views: vec![ViewSchema {
                name: "Recent".to_string(),
                definition: "SELECT TOP 10 * FROM A".to_string(),
            }],
            rows: row_map,
            connects: source_connects.clone(),
        }),
    );
    catalog.register_target_connector(
        Engine::Sqlite,
        Arc::new(MockTargetConnector {
            state: state.clone(),
            fail_table: fail_table.map(String::from),
            bulk,
            connects: target_connects.clone(),
        }),
    );

    Fixture {
        catalog: Arc::new(catalog),
        sink: Arc::new(RecordingSink::default()),
        state,
        source_connects,
        target_connects,
    }
}

fn request() -> MigrationRequest {
    MigrationRequest {
        source_dialect: Engine::SqlServer,
        destination_dialect: Engine::Sqlite,
        source_connection: "Server=src".to_string(),
        destination_connection: "/tmp/sqlport-it/out.db".to_string(),
    }
}

fn chain_fixture(fail_table: Option<&str>, bulk: bool) -> Fixture {
    // Supplied child-first to force the sorter to reorder.
    let tables = vec![table("C", &["B"]), table("B", &["A"]), table("A", &[])];
    let mut row_map = HashMap::new();
    row_map.insert("A".to_string(), rows(4));
    row_map.insert("B".to_string(), rows(2));
    row_map.insert("C".to_string(), rows(1));
    fixture(tables, row_map, fail_table, bulk)
}

#[tokio::test]
async fn migrates_schema_and_data_in_dependency_order() {
    let f = chain_fixture(None, false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    let report = orchestrator.run(&request()).await.unwrap();

    assert_eq!(report.tables_migrated, 3);
    assert_eq!(report.views_migrated, 1);
    assert_eq!(report.rows_transferred, 7);

    let state = f.state.lock().unwrap();
    let table_pos = |name: &str| {
        state
            .ddl
            .iter()
            .position(|sql| sql.starts_with(&format!("CREATE TABLE [{}]", name)))
            .unwrap_or_else(|| panic!("no CREATE TABLE for {}", name))
    };
    assert!(table_pos("A") < table_pos("B"));
    assert!(table_pos("B") < table_pos("C"));
    assert!(state.ddl.iter().any(|sql| sql.contains("CREATE VIEW [Recent]")));
    assert_eq!(state.rows["A"].len(), 4);
    assert_eq!(state.rows["C"].len(), 1);
    assert_eq!(state.pre_calls, 1);
    assert_eq!(state.post_calls, 1);

    assert_eq!(f.sink.count(|e| matches!(e, Event::Success(_))), 1);
    assert_eq!(f.sink.count(|e| matches!(e, Event::Failure(_))), 0);
    assert_eq!(f.source_connects.load(Ordering::SeqCst), 1);
    assert_eq!(f.target_connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn validation_failure_has_no_side_effects() {
    let f = chain_fixture(None, false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    let mut req = request();
    req.destination_connection = String::new();
    let err = orchestrator.run(&req).await.unwrap_err();

    assert!(matches!(err, MigrateError::Validation(_)));
    assert_eq!(f.source_connects.load(Ordering::SeqCst), 0);
    assert_eq!(f.target_connects.load(Ordering::SeqCst), 0);
    assert!(f.state.lock().unwrap().ddl.is_empty());
    assert_eq!(f.sink.count(|e| matches!(e, Event::Failure(_))), 1);
    assert_eq!(f.sink.count(|e| matches!(e, Event::Success(_))), 0);
}

#[tokio::test]
async fn unwritable_destination_is_rejected_up_front() {
    let f = chain_fixture(None, false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    let mut req = request();
    req.destination_dialect = Engine::SqlServer;
    let err = orchestrator.run(&req).await.unwrap_err();

    assert!(matches!(err, MigrateError::Validation(_)));
    assert!(err.to_string().contains("sqlserver"));
    assert_eq!(f.source_connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cyclic_foreign_keys_fail_before_any_ddl() {
    let tables = vec![table("A", &["B"]), table("B", &["A"])];
    let f = fixture(tables, HashMap::new(), None, false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(matches!(err, MigrateError::CyclicDependency { .. }));
    assert!(f.state.lock().unwrap().ddl.is_empty());
    assert_eq!(f.sink.count(|e| matches!(e, Event::Failure(_))), 1);
}

#[tokio::test]
async fn failed_table_aborts_but_keeps_prior_tables() {
    let f = chain_fixture(Some("B"), false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(matches!(err, MigrateError::Transfer { ref table, .. } if table == "B"));
    let state = f.state.lock().unwrap();
    // A transferred before B failed; C was never attempted.
    assert_eq!(state.rows.get("A").map(Vec::len), Some(4));
    assert!(state.rows.get("C").is_none());
    // FK re-enable hook still ran.
    assert_eq!(state.post_calls, 1);
    drop(state);
    assert_eq!(f.sink.count(|e| matches!(e, Event::Failure(_))), 1);
    assert_eq!(f.sink.count(|e| matches!(e, Event::Success(_))), 0);
}

#[tokio::test]
async fn skip_table_mode_finishes_with_success() {
    let f = chain_fixture(Some("B"), false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone())
        .with_transfer_config(TransferConfig {
            failure_mode: sqlport::FailureMode::SkipTable,
            ..Default::default()
        });

    let report = orchestrator.run(&request()).await.unwrap();

    assert_eq!(report.rows_transferred, 5);
    // The skipped table does not count as migrated.
    assert_eq!(report.tables_migrated, 2);
    let state = f.state.lock().unwrap();
    assert_eq!(state.rows.get("A").map(Vec::len), Some(4));
    assert!(state.rows.get("B").is_none());
    assert_eq!(state.rows.get("C").map(Vec::len), Some(1));
    drop(state);
    assert_eq!(f.sink.count(|e| matches!(e, Event::Success(_))), 1);
    assert!(f
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, Event::Warn(w) if w.contains("B"))));
}

#[tokio::test]
async fn bulk_writers_get_one_session_per_table() {
    let f = chain_fixture(None, true);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    let report = orchestrator.run(&request()).await.unwrap();

    assert_eq!(report.rows_transferred, 7);
    let state = f.state.lock().unwrap();
    assert_eq!(state.rows["A"].len(), 4);
    assert_eq!(state.rows["B"].len(), 2);
    assert_eq!(state.rows["C"].len(), 1);
}

#[tokio::test]
async fn progress_is_reported_at_the_configured_cadence() {
    let f = chain_fixture(None, false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone())
        .with_transfer_config(TransferConfig {
            batch_size: 2,
            progress_interval: 2,
            ..Default::default()
        });

    orchestrator.run(&request()).await.unwrap();

    let for_a: Vec<u64> = f
        .sink
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Progress(t, n) if t == "A" => Some(*n),
            _ => None,
        })
        .collect();
    // Intermediate reports plus the final cumulative count.
    assert!(for_a.len() >= 2);
    assert_eq!(*for_a.last().unwrap(), 4);
}

#[tokio::test]
async fn dirty_strings_are_normalized_through_the_pipeline() {
    let tables = vec![TableSchema {
        name: "People".to_string(),
        columns: vec![Column {
            name: "Name".to_string(),
            data_type: "nvarchar".to_string(),
            length: Some(50),
            is_nullable: false,
            ..Default::default()
        }],
        ..Default::default()
    }];
    let mut row_map = HashMap::new();
    row_map.insert(
        "People".to_string(),
        vec![
            Row::new(vec![Value::Text("  Ada  ".to_string())]),
            Row::new(vec![Value::Text("   ".to_string())]),
        ],
    );
    let f = fixture(tables, row_map, None, false);
    let orchestrator = Orchestrator::new(f.catalog.clone(), f.sink.clone());

    orchestrator.run(&request()).await.unwrap();

    let state = f.state.lock().unwrap();
    let people = &state.rows["People"];
    assert_eq!(people[0].values[0], Value::Text("Ada".to_string()));
    // Whitespace-only in a NOT NULL string column repairs to empty.
    assert_eq!(people[1].values[0], Value::Text(String::new()));
}
