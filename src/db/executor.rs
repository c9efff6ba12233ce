//! Query executor
//!
//! Every call opens its own connection, prepares one statement, binds the
//! parameter mapping by placeholder name, runs it, normalizes whatever it
//! returns and closes everything again. No state survives between calls
//! except the connector settings and the metrics counters.
//!
//! Driver failures never escape as driver errors. They are logged here with
//! their detail and handed to the caller as a `QueryError` that carries only
//! a code.

use std::sync::Arc;

use rusqlite::{Connection, Rows, Statement};

use super::connector::Connector;
use super::descriptor::RowDescriptor;
use super::errors::{classify, QueryError, QueryErrorCode, QueryResult};
use super::normalize::{normalize_row, NormalizeError};
use super::value::{strip_sigil, Params, PlainRow};
use crate::observability::{Logger, MetricsRegistry, Severity, Timer};

/// How a statement's results are consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First row, or an explicit "no row"
    FetchOne,
    /// Every row, possibly none
    FetchAll,
    /// Write-only; committed as its own transaction
    NoResult,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::FetchOne => "fetch_one",
            FetchMode::FetchAll => "fetch_all",
            FetchMode::NoResult => "no_result",
        }
    }
}

/// What a successful execution produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Row(Option<PlainRow>),
    Rows(Vec<PlainRow>),
    /// Number of rows changed by a committed write
    Written(usize),
}

/// Failure detail that stays inside the executor
struct Failure {
    code: QueryErrorCode,
    stage: &'static str,
    detail: String,
}

impl Failure {
    fn driver(stage: &'static str, err: rusqlite::Error) -> Self {
        Self {
            code: classify(&err),
            stage,
            detail: err.to_string(),
        }
    }

    fn connect(err: rusqlite::Error) -> Self {
        Self {
            code: QueryErrorCode::Unavailable,
            stage: "connect",
            detail: err.to_string(),
        }
    }

    fn binding(detail: String) -> Self {
        Self {
            code: QueryErrorCode::BindingInvalid,
            stage: "bind",
            detail,
        }
    }

    fn normalize(err: NormalizeError) -> Self {
        let code = if err.is_large_object() {
            QueryErrorCode::LobReadFailed
        } else {
            QueryErrorCode::StatementFailed
        };
        Self {
            code,
            stage: "normalize",
            detail: err.to_string(),
        }
    }
}

/// Stateless statement executor
#[derive(Clone)]
pub struct QueryExecutor {
    connector: Arc<dyn Connector>,
    metrics: Arc<MetricsRegistry>,
}

impl QueryExecutor {
    /// Create an executor with its own metrics registry
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self::with_metrics(Arc::new(connector), Arc::new(MetricsRegistry::new()))
    }

    /// Create an executor sharing an existing metrics registry
    pub fn with_metrics(connector: Arc<dyn Connector>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { connector, metrics }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Execute `sql` with `params` in the given mode
    pub fn execute(&self, sql: &str, params: &Params, mode: FetchMode) -> QueryResult<QueryOutcome> {
        match mode {
            FetchMode::FetchOne => self.fetch_one(sql, params).map(QueryOutcome::Row),
            FetchMode::FetchAll => self.fetch_all(sql, params).map(QueryOutcome::Rows),
            FetchMode::NoResult => self.execute_write(sql, params).map(QueryOutcome::Written),
        }
    }

    /// Fetch the first row, `None` when the statement matched nothing
    pub fn fetch_one(&self, sql: &str, params: &Params) -> QueryResult<Option<PlainRow>> {
        let timer = Timer::new();
        let result = self.read(sql, params, |rows, descriptor| {
            match rows.next().map_err(|e| Failure::driver("fetch", e))? {
                Some(row) => normalize_row(row, descriptor)
                    .map(Some)
                    .map_err(Failure::normalize),
                None => Ok(None),
            }
        });
        self.finish(sql, FetchMode::FetchOne, &timer, result, |row| {
            row.as_ref().map_or(0, |_| 1)
        })
    }

    /// Fetch every row in driver order, empty when nothing matched
    pub fn fetch_all(&self, sql: &str, params: &Params) -> QueryResult<Vec<PlainRow>> {
        let timer = Timer::new();
        let result = self.read(sql, params, |rows, descriptor| {
            let mut out = Vec::new();
            while let Some(row) = rows.next().map_err(|e| Failure::driver("fetch", e))? {
                out.push(normalize_row(row, descriptor).map_err(Failure::normalize)?);
            }
            Ok(out)
        });
        self.finish(sql, FetchMode::FetchAll, &timer, result, |rows| rows.len())
    }

    /// Run a write statement in its own transaction and commit it
    pub fn execute_write(&self, sql: &str, params: &Params) -> QueryResult<usize> {
        let timer = Timer::new();
        let result = self.write(sql, params);
        self.finish(sql, FetchMode::NoResult, &timer, result, |affected| *affected)
    }

    /// Run a blocking job against this executor off the async runtime
    pub async fn run<T, F>(&self, job: F) -> QueryResult<T>
    where
        F: FnOnce(&QueryExecutor) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let executor = self.clone();
        match tokio::task::spawn_blocking(move || job(&executor)).await {
            Ok(result) => result,
            Err(err) => {
                let detail = err.to_string();
                Logger::error(
                    "QUERY_FAILED",
                    &[
                        ("code", QueryErrorCode::StatementFailed.code()),
                        ("detail", &detail),
                        ("stage", "join"),
                    ],
                );
                self.metrics.record_failure();
                Err(QueryError::statement_failed())
            }
        }
    }

    // ==================
    // Internals
    // ==================

    fn open(&self) -> Result<Connection, Failure> {
        self.connector.connect().map_err(Failure::connect)
    }

    fn read<T, F>(&self, sql: &str, params: &Params, collect: F) -> Result<T, Failure>
    where
        F: FnOnce(&mut Rows<'_>, &RowDescriptor) -> Result<T, Failure>,
    {
        check_single_statement(sql)?;
        check_duplicates(params)?;
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql).map_err(|e| Failure::driver("prepare", e))?;
        bind_params(&mut stmt, params)?;
        let descriptor = RowDescriptor::from_statement(&stmt);
        let mut rows = stmt.raw_query();
        collect(&mut rows, &descriptor)
    }

    fn write(&self, sql: &str, params: &Params) -> Result<usize, Failure> {
        check_single_statement(sql)?;
        check_duplicates(params)?;
        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(|e| Failure::driver("begin", e))?;
        let affected = {
            let mut stmt = tx.prepare(sql).map_err(|e| Failure::driver("prepare", e))?;
            bind_params(&mut stmt, params)?;
            stmt.raw_execute().map_err(|e| Failure::driver("execute", e))?
        };
        // Dropping an uncommitted transaction rolls it back
        tx.commit().map_err(|e| Failure::driver("commit", e))?;
        Ok(affected)
    }

    fn finish<T>(
        &self,
        sql: &str,
        mode: FetchMode,
        timer: &Timer,
        result: Result<T, Failure>,
        count: impl FnOnce(&T) -> usize,
    ) -> QueryResult<T> {
        let label = statement_label(sql);
        match result {
            Ok(value) => {
                let rows = count(&value);
                match mode {
                    FetchMode::NoResult => self.metrics.record_write(),
                    _ => self.metrics.record_read(rows as u64),
                }
                if Logger::enabled(Severity::Trace) {
                    let rows = rows.to_string();
                    let elapsed = timer.elapsed_ms();
                    Logger::trace(
                        "QUERY_COMPLETE",
                        &[
                            ("duration_ms", &elapsed),
                            ("mode", mode.as_str()),
                            ("rows", &rows),
                            ("statement", &label),
                        ],
                    );
                }
                Ok(value)
            }
            Err(failure) => {
                self.metrics.record_failure();
                let target = self.connector.target();
                Logger::log(
                    failure.code.severity(),
                    "QUERY_FAILED",
                    &[
                        ("code", failure.code.code()),
                        ("detail", &failure.detail),
                        ("mode", mode.as_str()),
                        ("stage", failure.stage),
                        ("statement", &label),
                        ("target", &target),
                    ],
                );
                Err(QueryError::new(failure.code))
            }
        }
    }
}

/// Refuse SQL text holding more than one statement
///
/// The driver prepares the first statement and drops the rest without notice.
fn check_single_statement(sql: &str) -> Result<(), Failure> {
    match statement_tail(sql) {
        Some(tail) => Err(Failure {
            code: QueryErrorCode::StatementFailed,
            stage: "prepare",
            detail: format!("extra statement after ';': {}", statement_label(tail)),
        }),
        None => Ok(()),
    }
}

/// Text after the first top-level `;`, unless it is only comments and whitespace
fn statement_tail(sql: &str) -> Option<&str> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
            }
            b'[' => {
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b';' => {
                let rest = &sql[i + 1..];
                return if only_trivia(rest) { None } else { Some(rest.trim()) };
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn only_trivia(mut rest: &str) -> bool {
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if rest.is_empty() {
            return true;
        }
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.find('\n').map_or("", |n| &after[n..]);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |n| &after[n + 2..]);
        } else {
            return false;
        }
    }
}

fn check_duplicates(params: &Params) -> Result<(), Failure> {
    match params.duplicate() {
        Some(name) => Err(Failure::binding(format!("placeholder {} bound twice", name))),
        None => Ok(()),
    }
}

/// Bind every placeholder of `stmt` by name
///
/// Each named placeholder must have a binding, each binding must name a
/// placeholder, and anonymous `?` placeholders are refused.
fn bind_params(stmt: &mut Statement<'_>, params: &Params) -> Result<(), Failure> {
    let count = stmt.parameter_count();
    let mut placeholders = Vec::with_capacity(count);

    for index in 1..=count {
        let name = match stmt.parameter_name(index) {
            Some(name) => name.to_string(),
            None => {
                return Err(Failure::binding(format!(
                    "anonymous placeholder at position {}",
                    index
                )))
            }
        };
        let value = params
            .get(&name)
            .ok_or_else(|| Failure::binding(format!("placeholder {} is not bound", name)))?;
        stmt.raw_bind_parameter(index, value)
            .map_err(|e| Failure::driver("bind", e))?;
        placeholders.push(name);
    }

    let unused = params.iter().find(|(name, _)| {
        !placeholders
            .iter()
            .any(|p| strip_sigil(p).eq_ignore_ascii_case(name))
    });
    if let Some((name, _)) = unused {
        return Err(Failure::binding(format!("binding {} has no placeholder", name)));
    }

    Ok(())
}

/// Compact single-line form of a statement for logs
fn statement_label(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > 96 {
        let mut short: String = collapsed.chars().take(96).collect();
        short.push_str("...");
        short
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connector::{DatabaseConfig, SqliteConnector};
    use crate::db::value::ColumnValue;
    use tempfile::TempDir;

    fn setup() -> (TempDir, QueryExecutor) {
        let tmp = TempDir::new().unwrap();
        let connector = SqliteConnector::new(&DatabaseConfig::new(tmp.path().join("exec.db")));
        let conn = connector.create().unwrap();
        conn.execute_batch(
            "CREATE TABLE ALUMNO (ID_ALUMNO INTEGER PRIMARY KEY, USUARIO TEXT NOT NULL UNIQUE, FOTO_ALUMNO BLOB);
             INSERT INTO ALUMNO (ID_ALUMNO, USUARIO) VALUES (1, 'ana'), (2, 'luis');",
        )
        .unwrap();
        (tmp, QueryExecutor::new(connector))
    }

    #[test]
    fn test_fetch_one_found() {
        let (_tmp, exec) = setup();
        let row = exec
            .fetch_one(
                "SELECT ID_ALUMNO, USUARIO FROM ALUMNO WHERE USUARIO = :USUARIO",
                &Params::new().bind("USUARIO", "ana"),
            )
            .unwrap()
            .unwrap();
        assert_eq!(row.values(), &[ColumnValue::Integer(1), ColumnValue::Text("ana".into())]);
    }

    #[test]
    fn test_fetch_one_no_row_is_not_an_error() {
        let (_tmp, exec) = setup();
        let row = exec
            .fetch_one(
                "SELECT * FROM ALUMNO WHERE USUARIO = :USUARIO",
                &Params::new().bind("USUARIO", "nadie"),
            )
            .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn test_fetch_all_empty() {
        let (_tmp, exec) = setup();
        let rows = exec
            .fetch_all("SELECT * FROM ALUMNO WHERE ID_ALUMNO > :ID", &Params::new().bind("ID", 100i64))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_execute_dispatches_on_mode() {
        let (_tmp, exec) = setup();
        let outcome = exec
            .execute(
                "UPDATE ALUMNO SET USUARIO = :U WHERE ID_ALUMNO = :ID",
                &Params::new().bind("U", "ana2").bind("ID", 1i64),
                FetchMode::NoResult,
            )
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Written(1));

        let outcome = exec
            .execute("SELECT USUARIO FROM ALUMNO ORDER BY ID_ALUMNO", &Params::new(), FetchMode::FetchAll)
            .unwrap();
        match outcome {
            QueryOutcome::Rows(rows) => assert_eq!(rows[0].get(0).unwrap().as_text(), Some("ana2")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_placeholder_names_are_case_insensitive() {
        let (_tmp, exec) = setup();
        let row = exec
            .fetch_one(
                "SELECT USUARIO FROM ALUMNO WHERE ID_ALUMNO = :id_alumno",
                &Params::new().bind("ID_ALUMNO", 2i64),
            )
            .unwrap();
        assert!(row.is_some());
    }

    #[test]
    fn test_unbound_placeholder_rejected() {
        let (_tmp, exec) = setup();
        let err = exec
            .fetch_one("SELECT * FROM ALUMNO WHERE ID_ALUMNO = :ID", &Params::new())
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BindingInvalid);
    }

    #[test]
    fn test_extra_binding_rejected() {
        let (_tmp, exec) = setup();
        let err = exec
            .fetch_all("SELECT * FROM ALUMNO", &Params::new().bind("ID", 1i64))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BindingInvalid);
    }

    #[test]
    fn test_anonymous_placeholder_rejected() {
        let (_tmp, exec) = setup();
        let err = exec
            .fetch_all("SELECT * FROM ALUMNO WHERE ID_ALUMNO = ?", &Params::new())
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BindingInvalid);
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let (_tmp, exec) = setup();
        let params = Params::new().bind("ID", 1i64).bind("ID", 2i64);
        let err = exec
            .fetch_one("SELECT * FROM ALUMNO WHERE ID_ALUMNO = :ID", &params)
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BindingInvalid);
    }

    #[test]
    fn test_malformed_sql_is_statement_failure() {
        let (_tmp, exec) = setup();
        let err = exec.fetch_all("SELEC * FROM ALUMNO", &Params::new()).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::StatementFailed);
        assert!(!err.to_string().contains("syntax"));
    }

    #[test]
    fn test_constraint_violation_rolls_back() {
        let (_tmp, exec) = setup();
        let err = exec
            .execute_write(
                "INSERT INTO ALUMNO (ID_ALUMNO, USUARIO) VALUES (:ID, :U)",
                &Params::new().bind("ID", 3i64).bind("U", "ana"),
            )
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::StatementFailed);

        let rows = exec.fetch_all("SELECT * FROM ALUMNO", &Params::new()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_metrics_recorded() {
        let (_tmp, exec) = setup();
        exec.fetch_all("SELECT * FROM ALUMNO", &Params::new()).unwrap();
        let _ = exec.fetch_all("SELEC", &Params::new());

        let snap = exec.metrics().snapshot();
        assert_eq!(snap.queries_executed, 1);
        assert_eq!(snap.rows_returned, 2);
        assert_eq!(snap.queries_failed, 1);
    }

    #[test]
    fn test_statement_tail() {
        assert_eq!(statement_tail("SELECT 1"), None);
        assert_eq!(statement_tail("SELECT 1;"), None);
        assert_eq!(statement_tail("SELECT 1;  -- done\n ; /* end */"), None);
        assert_eq!(statement_tail("SELECT ';' AS SEP FROM ALUMNO"), None);
        assert_eq!(statement_tail("SELECT 1 -- ; DROP TABLE ALUMNO\n"), None);
        assert_eq!(statement_tail("SELECT 1; DROP TABLE ALUMNO"), Some("DROP TABLE ALUMNO"));
        assert_eq!(statement_tail("SELECT \"a;b\" FROM T; DELETE FROM T"), Some("DELETE FROM T"));
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let (_tmp, exec) = setup();
        let err = exec
            .fetch_all("SELECT 1; DROP TABLE ALUMNO", &Params::new())
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::StatementFailed);

        let err = exec
            .execute_write(
                "UPDATE ALUMNO SET USUARIO = :U WHERE ID_ALUMNO = 1; DELETE FROM ALUMNO",
                &Params::new().bind("U", "ana2"),
            )
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::StatementFailed);

        let rows = exec
            .fetch_all("SELECT USUARIO FROM ALUMNO ORDER BY ID_ALUMNO;", &Params::new())
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0).unwrap().as_text(), Some("ana"));
    }

    #[test]
    fn test_statement_label_collapses_whitespace() {
        assert_eq!(
            statement_label("SELECT *\n    FROM ALUMNO\n   WHERE X = :X"),
            "SELECT * FROM ALUMNO WHERE X = :X"
        );
        assert!(statement_label(&"x ".repeat(200)).ends_with("..."));
    }

    #[tokio::test]
    async fn test_run_off_runtime() {
        let (_tmp, exec) = setup();
        let rows = exec
            .run(|e| e.fetch_all("SELECT * FROM ALUMNO", &Params::new()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
