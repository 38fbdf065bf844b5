//! The query client.
//!
//! # Architecture
//!
//! ```text
//!   query(sql)                       query_async(sql)
//!       │                                  │
//!       │ caller thread                    │ mpsc (FIFO)
//!       │                                  ▼
//!       │                        ┌──────────────────┐
//!       │                        │  worker thread   │──► QueryHandle
//!       │                        └────────┬─────────┘
//!       ▼                                 ▼
//!   ┌──────────────────────────────────────────────┐
//!   │          Arc<Mutex<Engine>>  (one batch)     │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! Every batch holds the engine lock from its first statement to its last,
//! so batches never interleave.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::Mutex;
use sqlbridge_sql::{split_statements, Engine, Storage, StorageConfig};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::convert::to_query_result;
use crate::error::{ClientError, ClientResult};
use crate::handle::{self, BatchOutcome, Completer, QueryHandle};
use crate::result::QueryResult;

/// Statistics about client usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Batches executed, sync and async.
    pub batches: u64,
    /// Statements that completed successfully.
    pub statements: u64,
    /// Batches that ended with an error.
    pub failures: u64,
    /// Total time spent executing batches, in microseconds.
    pub busy_us: u64,
}

#[derive(Debug, Default)]
struct Counters {
    batches: AtomicU64,
    statements: AtomicU64,
    failures: AtomicU64,
    busy_us: AtomicU64,
}

struct Job {
    sql: String,
    completer: Completer,
}

/// Query client over one storage backend.
///
/// `Glue` is `Send + Sync`; share it behind an `Arc` to query from several
/// threads or tasks.
///
/// Dropping it closes the job queue; the worker runs what is already queued
/// and then exits. Outside an async runtime the drop waits for that. Inside
/// a tokio runtime the worker is detached instead, so dropping never blocks
/// a runtime thread; handles for queued batches still resolve.
pub struct Glue {
    engine: Arc<Mutex<Engine>>,
    counters: Arc<Counters>,
    jobs: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
    config: ClientConfig,
}

impl Glue {
    /// Creates a client over an already opened storage backend.
    pub fn new(storage: Box<dyn Storage>) -> ClientResult<Self> {
        Self::build(storage, ClientConfig::default())
    }

    /// Opens the configured storage and creates a client over it.
    pub fn open(storage: &StorageConfig) -> ClientResult<Self> {
        Self::with_config(ClientConfig::new().storage(storage.clone()))
    }

    /// Creates a client from a full configuration.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let storage = config.storage.open()?;
        Self::build(storage, config)
    }

    /// Creates a client over an already opened storage backend with the
    /// given settings. `config.storage` is ignored.
    pub fn with_storage(storage: Box<dyn Storage>, config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Self::build(storage, config)
    }

    fn build(storage: Box<dyn Storage>, config: ClientConfig) -> ClientResult<Self> {
        let engine = Arc::new(Mutex::new(Engine::new(storage)));
        let counters = Arc::new(Counters::default());
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let worker = {
            let engine = engine.clone();
            let counters = counters.clone();
            std::thread::Builder::new()
                .name(config.worker_name.clone())
                .spawn(move || {
                    debug!("query worker started");
                    while let Some(job) = rx.blocking_recv() {
                        let outcome =
                            panic::catch_unwind(AssertUnwindSafe(|| {
                                run_batch(&engine, &counters, &job.sql)
                            }))
                            .unwrap_or_else(|payload| {
                                let message = panic_message(payload.as_ref());
                                warn!(%message, "batch panicked");
                                counters.batches.fetch_add(1, Ordering::Relaxed);
                                counters.failures.fetch_add(1, Ordering::Relaxed);
                                Err(ClientError::BatchPanicked(message))
                            });
                        job.completer.complete(outcome);
                    }
                    debug!("query worker stopped");
                })
                .map_err(ClientError::WorkerSpawn)?
        };

        info!(
            storage = engine.lock().storage_name(),
            worker = %config.worker_name,
            "query client ready"
        );

        Ok(Self {
            engine,
            counters,
            jobs: Some(tx),
            worker: Some(worker),
            config,
        })
    }

    /// Executes every statement in `sql` on the calling thread and returns
    /// one result per statement, in order.
    ///
    /// Stops at the first failing statement with
    /// [`ClientError::Execution`], which carries the results of the
    /// statements before it.
    pub fn query(&self, sql: &str) -> ClientResult<Vec<QueryResult>> {
        run_batch(&self.engine, &self.counters, sql)
    }

    /// Queues `sql` on the worker thread and returns immediately.
    ///
    /// Batches queued on one client run in the order they were queued.
    pub fn query_async(&self, sql: impl Into<String>) -> QueryHandle {
        let (handle, completer) = handle::channel();
        let job = Job {
            sql: sql.into(),
            completer,
        };
        match &self.jobs {
            // A failed send drops the job, and with it the completer, which
            // resolves the handle to `WorkerStopped`.
            Some(jobs) => {
                if jobs.send(job).is_err() {
                    warn!("query worker is gone");
                }
            }
            None => drop(job),
        }
        handle
    }

    /// Queues `sql` and awaits it, bounded by the configured query timeout.
    pub async fn execute(&self, sql: impl Into<String>) -> BatchOutcome {
        let mut handle = self.query_async(sql);
        match self.config.timeout() {
            Some(timeout) => handle.timeout(timeout).await,
            None => handle.await,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the storage backend name.
    pub fn storage_name(&self) -> String {
        self.engine.lock().storage_name().to_string()
    }

    /// Returns true while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.engine.lock().in_transaction()
    }

    /// Returns a snapshot of usage statistics.
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            batches: self.counters.batches.load(Ordering::Relaxed),
            statements: self.counters.statements.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            busy_us: self.counters.busy_us.load(Ordering::Relaxed),
        }
    }
}

impl Drop for Glue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.jobs.take();
        let Some(worker) = self.worker.take() else {
            return;
        };
        if tokio::runtime::Handle::try_current().is_ok() {
            debug!("detaching query worker");
            return;
        }
        if worker.join().is_err() {
            warn!("query worker panicked");
        }
    }
}

impl std::fmt::Debug for Glue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glue")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

fn run_batch(engine: &Mutex<Engine>, counters: &Counters, sql: &str) -> BatchOutcome {
    let start = Instant::now();
    let outcome = {
        let mut engine = engine.lock();
        let mut completed = Vec::new();
        let mut failure = None;
        for (index, statement) in split_statements(sql).into_iter().enumerate() {
            match engine.execute_one(statement) {
                Ok(payload) => match to_query_result(payload) {
                    Ok(result) => completed.push(result),
                    Err(source) => {
                        debug!(index, error = %source, "result conversion failed");
                        failure = Some(ClientError::Conversion {
                            index,
                            source,
                            completed: std::mem::take(&mut completed),
                        });
                        break;
                    }
                },
                Err(source) => {
                    debug!(index, error = %source, "statement failed");
                    failure = Some(ClientError::Execution {
                        index,
                        source,
                        completed: std::mem::take(&mut completed),
                    });
                    break;
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(completed),
        }
    };

    let elapsed = start.elapsed();
    counters.batches.fetch_add(1, Ordering::Relaxed);
    counters
        .busy_us
        .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    match &outcome {
        Ok(results) => {
            counters
                .statements
                .fetch_add(results.len() as u64, Ordering::Relaxed);
            debug!(statements = results.len(), elapsed_us = elapsed.as_micros() as u64, "batch done");
        }
        Err(err) => {
            counters
                .statements
                .fetch_add(err.completed().len() as u64, Ordering::Relaxed);
            counters.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlbridge_sql::{storage, Row, Schema, SqlError, StorageResult};
    use sqlbridge_value::SqlValue;

    use super::*;

    #[test]
    fn test_query_returns_results_in_order() {
        let glue = Glue::new(storage::memory()).unwrap();
        let results = glue
            .query("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1);")
            .unwrap();
        assert_eq!(
            results,
            vec![QueryResult::Create, QueryResult::Insert { rows: 1 }]
        );
    }

    #[test]
    fn test_failure_keeps_prefix() {
        let glue = Glue::new(storage::memory()).unwrap();
        let err = glue
            .query("CREATE TABLE t (id INTEGER); INSERT INTO nope VALUES (1); INSERT INTO t VALUES (2)")
            .unwrap_err();
        match err {
            ClientError::Execution {
                index,
                source,
                completed,
            } => {
                assert_eq!(index, 1);
                assert!(matches!(source, SqlError::TableNotFound(_)));
                assert_eq!(completed, vec![QueryResult::Create]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let rows = glue.query("SELECT COUNT(*) FROM t").unwrap();
        assert_eq!(
            rows[0].as_select().unwrap().1,
            &[vec![SqlValue::I64(0)]][..]
        );
        assert_eq!(glue.stats().failures, 1);
    }

    #[test]
    fn test_syntax_error_reports_its_statement() {
        let glue = Glue::new(storage::memory()).unwrap();
        let err = glue.query("SELECT 1; SELEC 2; SELECT 3").unwrap_err();
        assert_eq!(err.statement_index(), Some(1));
        assert_eq!(err.completed().len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let glue = Glue::new(storage::memory()).unwrap();
        assert!(glue.query("  ;; -- nothing\n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_async_matches_query() {
        let glue = Glue::new(storage::memory()).unwrap();
        let sql = "CREATE TABLE t (n INTEGER); INSERT INTO t VALUES (1), (2); SELECT n FROM t ORDER BY n";
        let async_results = glue.query_async(sql).await.unwrap();

        let other = Glue::new(storage::memory()).unwrap();
        assert_eq!(async_results, other.query(sql).unwrap());
    }

    #[test]
    fn test_async_batches_run_in_submission_order() {
        let glue = Glue::new(storage::memory()).unwrap();
        let first = glue.query_async("CREATE TABLE t (n INTEGER)");
        let handles: Vec<_> = (0..10)
            .map(|i| glue.query_async(format!("INSERT INTO t VALUES ({i})")))
            .collect();
        assert_eq!(first.wait().unwrap(), vec![QueryResult::Create]);
        for handle in handles {
            handle.wait().unwrap();
        }

        let results = glue.query("SELECT n FROM t").unwrap();
        let (_, rows) = results[0].as_select().unwrap();
        let values: Vec<_> = rows.iter().map(|r| r[0].as_i64().unwrap()).collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_execute_uses_configured_timeout() {
        let glue = Glue::with_config(
            ClientConfig::new().query_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(glue.execute("SELECT 1").await.unwrap().len(), 1);
        assert_eq!(glue.storage_name(), "memory");
        assert!(!glue.in_transaction());
    }

    /// Memory storage whose scans of table `boom` panic.
    struct PanicOnScan(Box<dyn Storage>);

    impl Storage for PanicOnScan {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn fetch_schema(&self, table: &str) -> StorageResult<Option<Schema>> {
            self.0.fetch_schema(table)
        }
        fn fetch_schemas(&self) -> StorageResult<Vec<Schema>> {
            self.0.fetch_schemas()
        }
        fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
            if table == "boom" {
                panic!("scan of {table} failed");
            }
            self.0.scan_rows(table)
        }
        fn insert_schema(&mut self, schema: &Schema) -> StorageResult<()> {
            self.0.insert_schema(schema)
        }
        fn delete_schema(&mut self, table: &str) -> StorageResult<()> {
            self.0.delete_schema(table)
        }
        fn append_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
            self.0.append_rows(table, rows)
        }
        fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> StorageResult<()> {
            self.0.replace_rows(table, rows)
        }
        fn begin(&mut self) -> StorageResult<()> {
            self.0.begin()
        }
        fn commit(&mut self) -> StorageResult<()> {
            self.0.commit()
        }
        fn rollback(&mut self) -> StorageResult<()> {
            self.0.rollback()
        }
    }

    #[tokio::test]
    async fn test_panicking_batch_leaves_worker_running() {
        let glue = Glue::new(Box::new(PanicOnScan(storage::memory()))).unwrap();
        glue.query("CREATE TABLE boom (n INTEGER); CREATE TABLE ok (n INTEGER)")
            .unwrap();

        let err = glue.query_async("SELECT * FROM boom").await.unwrap_err();
        match err {
            ClientError::BatchPanicked(message) => assert_eq!(message, "scan of boom failed"),
            other => panic!("unexpected error: {other}"),
        }

        let results = glue
            .query_async("INSERT INTO ok VALUES (7); SELECT n FROM ok")
            .await
            .unwrap();
        assert_eq!(results[1].as_select().unwrap().1, &[vec![SqlValue::I64(7)]][..]);
        assert_eq!(glue.stats().failures, 1);
    }

    #[test]
    fn test_panic_message_from_payload() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }

    #[test]
    fn test_glue_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Glue>();
        assert_send_sync::<QueryHandle>();
    }
}
