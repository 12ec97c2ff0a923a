//! An embedded wide-column store.
//!
//! Tables are maps of partitions, each partition a map of rows sorted by
//! clustering key. Selects walk partitions in key order and rows in
//! clustering order, so paging states only need to remember the primary key
//! of the last row handed out.
//!
//! The query rules follow the usual wide-column contract: a partition key is
//! restricted by equality on every column or not at all, clustering columns
//! can be restricted when every earlier clustering column is pinned by
//! equality, and anything else needs `ALLOW FILTERING`.

use super::error::{StoreError, StoreResult};
use super::schema::{ClusteringOrder, KeyspaceSchema, TableSchema};
use super::session::{PagingState, ResultPage, Session};
use super::statement::{ConditionalUpdate, Insert, Relation, Select};
use super::value::{Row, Value};
use crate::config::{StoreConfig, SUPPORTED_PROTOCOL_VERSIONS};
use crate::fs::{load_snapshot, save_snapshot};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Clustering key of a row; compares column by column in each column's
/// declared direction.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClusteringKey(Vec<(Value, ClusteringOrder)>);

impl Ord for ClusteringKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for ((a, order), (b, _)) in self.0.iter().zip(other.0.iter()) {
            let ord = match order {
                ClusteringOrder::Asc => a.cmp(b),
                ClusteringOrder::Desc => b.cmp(a),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for ClusteringKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ClusteringKey {
    fn values(&self) -> Vec<Value> {
        self.0.iter().map(|(v, _)| v.clone()).collect()
    }
}

type Partition = BTreeMap<ClusteringKey, Row>;

#[derive(Debug)]
struct TableData {
    schema: TableSchema,
    partitions: BTreeMap<Vec<Value>, Partition>,
}

impl TableData {
    fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            partitions: BTreeMap::new(),
        }
    }

    fn row_count(&self) -> u64 {
        self.partitions.values().map(|p| p.len() as u64).sum()
    }

    fn partition_key(&self, row: &Row) -> StoreResult<Vec<Value>> {
        self.schema
            .partition_key_columns()
            .iter()
            .map(|c| self.key_cell(row, c))
            .collect()
    }

    fn clustering_key(&self, row: &Row) -> StoreResult<ClusteringKey> {
        self.schema
            .clustering_columns()
            .iter()
            .map(|(c, order)| Ok((self.key_cell(row, c)?, *order)))
            .collect::<StoreResult<Vec<_>>>()
            .map(ClusteringKey)
    }

    fn clustering_from_values(&self, values: Vec<Value>) -> StoreResult<ClusteringKey> {
        let orders = self.schema.clustering_columns();
        if values.len() != orders.len() {
            return Err(StoreError::InvalidPagingState(
                "clustering key does not match table".to_string(),
            ));
        }
        Ok(ClusteringKey(
            values
                .into_iter()
                .zip(orders.iter().map(|(_, o)| *o))
                .collect(),
        ))
    }

    fn key_cell(&self, row: &Row, column: &str) -> StoreResult<Value> {
        match row.get(column) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Err(StoreError::InvalidQuery(format!(
                "Missing mandatory PRIMARY KEY part {} for table {}",
                column,
                self.schema.name()
            ))),
        }
    }

    /// Checks every cell names a column of the table and fits its type.
    fn check_cells(&self, row: &Row) -> StoreResult<()> {
        for (column, value) in row.iter() {
            match self.schema.column_type(column) {
                None => {
                    return Err(StoreError::InvalidQuery(format!(
                        "Undefined column name {} in table {}",
                        column,
                        self.schema.name()
                    )))
                }
                Some(ty) if !value.fits(ty) => {
                    return Err(StoreError::InvalidQuery(format!(
                        "Invalid value for column {} of type {}",
                        column, ty
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Lays the row out in schema column order.
    fn normalize(&self, row: &Row) -> Row {
        let mut out = Row::new();
        for column in self.schema.columns() {
            if let Some(value) = row.get(&column.name) {
                out.set(column.name.clone(), value.clone());
            }
        }
        out
    }

    fn project(&self, row: &Row, columns: Option<&[String]>) -> Row {
        let mut out = Row::new();
        match columns {
            Some(columns) => {
                for column in columns {
                    out.set(column.clone(), row.get(column).cloned().unwrap_or(Value::Null));
                }
            }
            None => {
                for column in self.schema.columns() {
                    out.set(
                        column.name.clone(),
                        row.get(&column.name).cloned().unwrap_or(Value::Null),
                    );
                }
            }
        }
        out
    }

    /// Validates a select and returns the partition it is pinned to, if any.
    fn plan(&self, select: &Select) -> StoreResult<Option<Vec<Value>>> {
        let schema = &self.schema;

        if let Some(columns) = select.projection() {
            for column in columns {
                if schema.column_type(column).is_none() {
                    return Err(StoreError::InvalidQuery(format!(
                        "Undefined column name {}",
                        column
                    )));
                }
            }
        }

        for r in select.restrictions() {
            match schema.column_type(&r.column) {
                None => {
                    return Err(StoreError::InvalidQuery(format!(
                        "Undefined column name {}",
                        r.column
                    )))
                }
                Some(ty) if r.value.is_null() || !r.value.fits(ty) => {
                    return Err(StoreError::InvalidQuery(format!(
                        "Invalid value bound to {} of type {}",
                        r.column, ty
                    )))
                }
                Some(_) => {}
            }
        }

        let mut needs_filtering = false;

        let mut partition = Vec::new();
        for column in schema.partition_key_columns() {
            let mut restrictions = select
                .restrictions()
                .iter()
                .filter(|r| r.column == *column);
            match restrictions.next() {
                Some(r) if r.relation == Relation::Eq => partition.push(r.value.clone()),
                Some(_) => {
                    return Err(StoreError::InvalidQuery(format!(
                        "Only EQ relations are supported on the partition key (column {})",
                        column
                    )))
                }
                None => {}
            }
        }
        let pinned = match partition.len() {
            0 => None,
            n if n == schema.partition_key_columns().len() => Some(partition),
            _ => {
                needs_filtering = true;
                None
            }
        };

        for r in select.restrictions() {
            if schema.is_partition_key(&r.column) {
                continue;
            }
            match schema.clustering_index(&r.column) {
                Some(index) => {
                    let prefix_pinned = schema.clustering_columns()[..index].iter().all(|(c, _)| {
                        select
                            .restrictions()
                            .iter()
                            .any(|other| other.column == *c && other.relation == Relation::Eq)
                    });
                    if pinned.is_none() || !prefix_pinned {
                        needs_filtering = true;
                    }
                }
                None => needs_filtering = true,
            }
        }

        if needs_filtering && !select.is_filtering_allowed() {
            return Err(StoreError::InvalidQuery(
                "Cannot execute this query as it might involve data filtering and thus may have \
                 unpredictable performance. If you want to execute this query despite the \
                 performance unpredictability, use ALLOW FILTERING"
                    .to_string(),
            ));
        }
        Ok(pinned)
    }
}

#[derive(Debug)]
struct KeyspaceData {
    schema: KeyspaceSchema,
    tables: BTreeMap<String, TableData>,
}

#[derive(Debug, Default)]
struct Cluster {
    keyspaces: BTreeMap<String, KeyspaceData>,
}

impl Cluster {
    fn keyspace(&self, name: &str) -> StoreResult<&KeyspaceData> {
        self.keyspaces
            .get(name)
            .ok_or_else(|| StoreError::KeyspaceNotFound(name.to_string()))
    }

    fn keyspace_mut(&mut self, name: &str) -> StoreResult<&mut KeyspaceData> {
        self.keyspaces
            .get_mut(name)
            .ok_or_else(|| StoreError::KeyspaceNotFound(name.to_string()))
    }

    fn table(&self, keyspace: &str, table: &str) -> StoreResult<&TableData> {
        self.keyspace(keyspace)?
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn table_mut(&mut self, keyspace: &str, table: &str) -> StoreResult<&mut TableData> {
        self.keyspace_mut(keyspace)?
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            keyspaces: self
                .keyspaces
                .values()
                .map(|ks| KeyspaceSnapshot {
                    schema: ks.schema.clone(),
                    tables: ks
                        .tables
                        .values()
                        .map(|t| TableSnapshot {
                            schema: t.schema.clone(),
                            rows: t
                                .partitions
                                .values()
                                .flat_map(|p| p.values().cloned())
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let mut cluster = Cluster::default();
        for ks in snapshot.keyspaces {
            let mut tables = BTreeMap::new();
            for t in ks.tables {
                t.schema.validate()?;
                let mut table = TableData::new(t.schema);
                for row in t.rows {
                    let pk = table.partition_key(&row)?;
                    let ck = table.clustering_key(&row)?;
                    table.partitions.entry(pk).or_default().insert(ck, row);
                }
                tables.insert(table.schema.name().to_string(), table);
            }
            cluster.keyspaces.insert(
                ks.schema.name().to_string(),
                KeyspaceData {
                    schema: ks.schema,
                    tables,
                },
            );
        }
        Ok(cluster)
    }
}

/// On-disk form of the store contents.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    keyspaces: Vec<KeyspaceSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyspaceSnapshot {
    schema: KeyspaceSchema,
    tables: Vec<TableSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableSnapshot {
    schema: TableSchema,
    rows: Vec<Row>,
}

/// Where a page stopped: the statement it belongs to and the primary key of
/// its last row.
#[derive(Debug, Serialize, Deserialize)]
struct PagePosition {
    statement: String,
    partition: Vec<Value>,
    clustering: Vec<Value>,
}

fn fingerprint(select: &Select) -> String {
    format!("{}|{:?}", select, select.bound_values())
}

fn encode_paging_state(position: &PagePosition) -> StoreResult<PagingState> {
    let bytes = bincode::serialize(position)
        .map_err(|e| StoreError::InvalidPagingState(e.to_string()))?;
    Ok(PagingState::new(hex::encode(bytes)))
}

fn decode_paging_state(state: &PagingState) -> StoreResult<PagePosition> {
    let bytes = hex::decode(state.as_str())
        .map_err(|e| StoreError::InvalidPagingState(format!("malformed token: {}", e)))?;
    bincode::deserialize(&bytes).map_err(|e| StoreError::InvalidPagingState(e.to_string()))
}

/// In-process `Session` over an embedded wide-column store.
#[derive(Debug)]
pub struct MemorySession {
    hosts: Vec<String>,
    keyspace: String,
    snapshot_path: Option<PathBuf>,
    cluster: Mutex<Cluster>,
}

impl MemorySession {
    /// Creates an empty store bound to `keyspace`, with no snapshot file.
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            hosts: vec!["127.0.0.1".to_string()],
            keyspace: keyspace.into(),
            snapshot_path: None,
            cluster: Mutex::new(Cluster::default()),
        }
    }

    /// Opens a session from the store configuration.
    ///
    /// Contact points must be well-formed `host[:port]` entries and the
    /// protocol version supported. When a snapshot path is configured and the
    /// file exists, its contents are loaded.
    ///
    /// # Returns
    ///
    /// * `Ok(MemorySession)` ready for use.
    /// * `Err(StoreError::Unavailable)` if no usable contact point is given.
    /// * `Err(StoreError::UnsupportedProtocol)` for an unknown protocol version.
    /// * `Err(StoreError::Snapshot)` if the snapshot cannot be read.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let usable = config
            .hosts
            .iter()
            .filter(|h| is_contact_point(h))
            .cloned()
            .collect::<Vec<_>>();
        if usable.is_empty() {
            return Err(StoreError::Unavailable {
                hosts: config.hosts.join(", "),
            });
        }
        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&config.protocol_version) {
            return Err(StoreError::UnsupportedProtocol(config.protocol_version));
        }

        let cluster = match &config.snapshot_path {
            Some(path) => match load_snapshot::<Snapshot>(path)
                .map_err(|e| StoreError::Snapshot(format!("{:#}", e)))?
            {
                Some(snapshot) => {
                    info!("Loaded store snapshot from {}", path.display());
                    Cluster::from_snapshot(snapshot)?
                }
                None => Cluster::default(),
            },
            None => Cluster::default(),
        };

        info!(
            "Connected to {} (keyspace {}, protocol v{})",
            usable.join(", "),
            config.keyspace,
            config.protocol_version
        );

        Ok(Self {
            hosts: usable,
            keyspace: config.keyspace.clone(),
            snapshot_path: config.snapshot_path.clone(),
            cluster: Mutex::new(cluster),
        })
    }

    /// Writes the store contents to the configured snapshot file.
    /// Does nothing when no snapshot path is configured.
    pub fn flush(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let snapshot = self.lock()?.to_snapshot();
        save_snapshot(path, &snapshot).map_err(|e| StoreError::Snapshot(format!("{:#}", e)))?;
        debug!("Saved store snapshot to {}", path.display());
        Ok(())
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Cluster>> {
        self.cluster.lock().map_err(|_| StoreError::Unavailable {
            hosts: self.hosts.join(", "),
        })
    }
}

fn is_contact_point(host: &str) -> bool {
    let host = host.trim();
    if host.is_empty() {
        return false;
    }
    match host.rsplit_once(':') {
        Some((name, port)) => !name.is_empty() && port.parse::<u16>().is_ok(),
        None => true,
    }
}

impl Session for MemorySession {
    fn keyspace(&self) -> &str {
        &self.keyspace
    }

    fn create_keyspace(&self, keyspace: &KeyspaceSchema) -> StoreResult<()> {
        debug!("{}", keyspace);
        let mut cluster = self.lock()?;
        cluster
            .keyspaces
            .entry(keyspace.name().to_string())
            .or_insert_with(|| KeyspaceData {
                schema: keyspace.clone(),
                tables: BTreeMap::new(),
            });
        Ok(())
    }

    fn create_table(&self, table: &TableSchema) -> StoreResult<()> {
        debug!("{}", table);
        table.validate()?;
        let mut cluster = self.lock()?;
        let keyspace = cluster.keyspace_mut(&self.keyspace)?;
        keyspace
            .tables
            .entry(table.name().to_string())
            .or_insert_with(|| TableData::new(table.clone()));
        Ok(())
    }

    fn insert(&self, insert: &Insert) -> StoreResult<bool> {
        debug!("{}", insert);
        let mut cluster = self.lock()?;
        let table = cluster.table_mut(&self.keyspace, insert.table())?;
        let row = insert.row();
        table.check_cells(row)?;
        let pk = table.partition_key(row)?;
        let ck = table.clustering_key(row)?;
        let normalized = table.normalize(row);

        let partition = table.partitions.entry(pk).or_default();
        match partition.get_mut(&ck) {
            Some(_) if insert.is_conditional() => Ok(false),
            Some(existing) => {
                for (column, value) in normalized.iter() {
                    existing.set(column.clone(), value.clone());
                }
                Ok(true)
            }
            None => {
                partition.insert(ck, normalized);
                Ok(true)
            }
        }
    }

    fn update_if(&self, update: &ConditionalUpdate) -> StoreResult<bool> {
        debug!("{}", update);
        let mut cluster = self.lock()?;
        let table = cluster.table_mut(&self.keyspace, update.table())?;
        table.check_cells(update.key())?;
        if table.schema.is_primary_key(update.column()) {
            return Err(StoreError::InvalidQuery(format!(
                "PRIMARY KEY part {} found in SET part",
                update.column()
            )));
        }
        let candidate = Row::new().with(update.column(), update.new_value().clone());
        table.check_cells(&candidate)?;

        let pk = table.partition_key(update.key())?;
        let ck = table.clustering_key(update.key())?;
        let Some(row) = table.partitions.get_mut(&pk).and_then(|p| p.get_mut(&ck)) else {
            return Ok(false);
        };
        let current = row.get(update.column()).cloned().unwrap_or(Value::Null);
        if current != *update.expected() {
            return Ok(false);
        }
        row.set(update.column(), update.new_value().clone());
        Ok(true)
    }

    fn select_page(
        &self,
        select: &Select,
        page_size: usize,
        paging_state: Option<&PagingState>,
    ) -> StoreResult<ResultPage> {
        if page_size == 0 {
            return Err(StoreError::InvalidQuery("page size must be positive".to_string()));
        }
        debug!("{} [page_size={}]", select, page_size);

        let cluster = self.lock()?;
        let table = cluster.table(&self.keyspace, select.table())?;
        let pinned = table.plan(select)?;
        let statement = fingerprint(select);

        let resume = match paging_state {
            Some(state) => {
                let position = decode_paging_state(state)?;
                if position.statement != statement {
                    return Err(StoreError::InvalidPagingState(
                        "paging state was issued for a different statement".to_string(),
                    ));
                }
                let clustering = table.clustering_from_values(position.clustering)?;
                Some((position.partition, clustering))
            }
            None => None,
        };

        let partitions: Box<dyn Iterator<Item = (&Vec<Value>, &Partition)> + '_> = match (&pinned, &resume) {
            (Some(pk), _) => Box::new(table.partitions.get_key_value(pk).into_iter()),
            (None, Some((pk, _))) => Box::new(
                table
                    .partitions
                    .range::<Vec<Value>, _>((Bound::Included(pk), Bound::Unbounded)),
            ),
            (None, None) => Box::new(table.partitions.iter()),
        };

        let mut rows = Vec::with_capacity(page_size);
        let mut last: Option<(Vec<Value>, ClusteringKey)> = None;

        'scan: for (pk, partition) in partitions {
            let candidates: Box<dyn Iterator<Item = (&ClusteringKey, &Row)> + '_> = match &resume {
                Some((resume_pk, resume_ck)) if resume_pk == pk => Box::new(
                    partition.range::<ClusteringKey, _>((
                        Bound::Excluded(resume_ck),
                        Bound::Unbounded,
                    )),
                ),
                Some((resume_pk, _)) if pk < resume_pk => continue,
                _ => Box::new(partition.iter()),
            };
            for (ck, row) in candidates {
                if !select.restrictions().iter().all(|r| r.matches(row)) {
                    continue;
                }
                rows.push(table.project(row, select.projection()));
                last = Some((pk.clone(), ck.clone()));
                if rows.len() == page_size {
                    break 'scan;
                }
            }
        }

        let paging_state = match last {
            Some((partition, clustering)) if rows.len() == page_size => {
                Some(encode_paging_state(&PagePosition {
                    statement,
                    partition,
                    clustering: clustering.values(),
                })?)
            }
            _ => None,
        };

        Ok(ResultPage { rows, paging_state })
    }

    fn count(&self, table: &str) -> StoreResult<u64> {
        let cluster = self.lock()?;
        Ok(cluster.table(&self.keyspace, table)?.row_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::value::ColumnType;

    fn trades_schema() -> TableSchema {
        TableSchema::new("trades")
            .partition_key("account", ColumnType::Text)
            .clustering("symbol", ColumnType::Text, ClusteringOrder::Asc)
            .clustering("trade_id", ColumnType::Timestamp, ClusteringOrder::Desc)
            .column("shares", ColumnType::BigInt)
    }

    fn session() -> MemorySession {
        let session = MemorySession::new("ks");
        session.create_keyspace(&KeyspaceSchema::new("ks", 1)).unwrap();
        session.create_table(&trades_schema()).unwrap();
        session
    }

    fn trade_row(account: &str, symbol: &str, trade_id: i64, shares: i64) -> Row {
        Row::new()
            .with("account", Value::text(account))
            .with("symbol", Value::text(symbol))
            .with("trade_id", Value::Timestamp(trade_id))
            .with("shares", Value::BigInt(shares))
    }

    fn insert(session: &MemorySession, row: Row) {
        assert!(session.insert(&Insert::new("trades", row)).unwrap());
    }

    fn ids(page: &ResultPage) -> Vec<i64> {
        page.rows
            .iter()
            .map(|r| r.timestamp("trade_id").unwrap())
            .collect()
    }

    #[test]
    fn test_rows_follow_clustering_order() {
        let s = session();
        insert(&s, trade_row("a", "MSFT", 1, 1));
        insert(&s, trade_row("a", "AAPL", 1, 1));
        insert(&s, trade_row("a", "AAPL", 3, 1));
        insert(&s, trade_row("a", "AAPL", 2, 1));

        let page = s
            .select_page(&Select::new("trades").where_eq("account", Value::text("a")), 10, None)
            .unwrap();
        let keys: Vec<(String, i64)> = page
            .rows
            .iter()
            .map(|r| {
                (
                    r.text("symbol").unwrap().to_string(),
                    r.timestamp("trade_id").unwrap(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AAPL".to_string(), 3),
                ("AAPL".to_string(), 2),
                ("AAPL".to_string(), 1),
                ("MSFT".to_string(), 1),
            ]
        );
        assert!(page.paging_state.is_none());
    }

    #[test]
    fn test_insert_is_an_upsert() {
        let s = session();
        insert(&s, trade_row("a", "AAPL", 1, 10));
        insert(&s, trade_row("a", "AAPL", 1, 20));
        assert_eq!(s.count("trades").unwrap(), 1);

        let applied = s
            .insert(&Insert::new("trades", trade_row("a", "AAPL", 1, 30)).if_not_exists())
            .unwrap();
        assert!(!applied);

        let page = s.select_page(&Select::new("trades"), 10, None).unwrap();
        assert_eq!(page.rows[0].big_int("shares").unwrap(), 20);
    }

    #[test]
    fn test_paging_across_partitions() {
        let s = session();
        for i in 0..7 {
            insert(&s, trade_row("a", "AAPL", i, 1));
            insert(&s, trade_row("b", "AAPL", i, 1));
        }
        let select = Select::new("trades");

        let mut seen = 0;
        let mut state = None;
        let mut pages = 0;
        loop {
            let page = s.select_page(&select, 5, state.as_ref()).unwrap();
            seen += page.rows.len();
            pages += 1;
            match page.paging_state {
                Some(next) => state = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, 14);
        assert_eq!(pages, 3);
    }

    #[test]
    fn test_full_last_page_still_returns_paging_state() {
        let s = session();
        for i in 0..4 {
            insert(&s, trade_row("a", "AAPL", i, 1));
        }
        let select = Select::new("trades").where_eq("account", Value::text("a"));
        let first = s.select_page(&select, 4, None).unwrap();
        assert_eq!(ids(&first), vec![3, 2, 1, 0]);
        assert!(first.paging_state.is_some());

        let second = s
            .select_page(&select, 4, first.paging_state.as_ref())
            .unwrap();
        assert!(second.rows.is_empty());
        assert!(second.paging_state.is_none());
    }

    #[test]
    fn test_clustering_range_within_partition() {
        let s = session();
        for i in 0..10 {
            insert(&s, trade_row("a", "AAPL", i, 1));
        }
        let select = Select::new("trades")
            .where_eq("account", Value::text("a"))
            .where_eq("symbol", Value::text("AAPL"))
            .restrict("trade_id", Relation::Ge, Value::Timestamp(3))
            .restrict("trade_id", Relation::Lt, Value::Timestamp(6));
        let page = s.select_page(&select, 10, None).unwrap();
        assert_eq!(ids(&page), vec![5, 4, 3]);
    }

    #[test]
    fn test_filtering_rules() {
        let s = session();
        insert(&s, trade_row("a", "AAPL", 1, 5));

        // Skips the `symbol` clustering column.
        let skip = Select::new("trades")
            .where_eq("account", Value::text("a"))
            .restrict("trade_id", Relation::Gt, Value::Timestamp(0));
        assert!(matches!(
            s.select_page(&skip, 10, None),
            Err(StoreError::InvalidQuery(_))
        ));
        assert_eq!(s.select_page(&skip.allow_filtering(), 10, None).unwrap().rows.len(), 1);

        let regular = Select::new("trades").where_eq("shares", Value::BigInt(5));
        assert!(s.select_page(&regular, 10, None).is_err());
        assert_eq!(
            s.select_page(&regular.allow_filtering(), 10, None)
                .unwrap()
                .rows
                .len(),
            1
        );

        let range_on_partition =
            Select::new("trades").restrict("account", Relation::Gt, Value::text("a"));
        assert!(s
            .select_page(&range_on_partition.allow_filtering(), 10, None)
            .is_err());
    }

    #[test]
    fn test_projection_and_unknown_columns() {
        let s = session();
        insert(&s, trade_row("a", "AAPL", 1, 5));

        let page = s
            .select_page(&Select::new("trades").columns(&["symbol"]), 10, None)
            .unwrap();
        assert_eq!(page.rows[0].columns().collect::<Vec<_>>(), vec!["symbol"]);

        assert!(s
            .select_page(&Select::new("trades").columns(&["nope"]), 10, None)
            .is_err());
        assert!(s
            .insert(&Insert::new(
                "trades",
                trade_row("a", "AAPL", 2, 1).with("nope", Value::BigInt(1))
            ))
            .is_err());
        assert!(s
            .insert(&Insert::new(
                "trades",
                Row::new().with("account", Value::text("a"))
            ))
            .is_err());
    }

    #[test]
    fn test_paging_state_is_bound_to_statement() {
        let s = session();
        for i in 0..4 {
            insert(&s, trade_row("a", "AAPL", i, 1));
        }
        let a = Select::new("trades").where_eq("account", Value::text("a"));
        let b = Select::new("trades").where_eq("account", Value::text("b"));
        let page = s.select_page(&a, 2, None).unwrap();
        let state = page.paging_state.unwrap();

        assert!(matches!(
            s.select_page(&b, 2, Some(&state)),
            Err(StoreError::InvalidPagingState(_))
        ));
        assert!(matches!(
            s.select_page(&a, 2, Some(&PagingState::new("zz"))),
            Err(StoreError::InvalidPagingState(_))
        ));
        assert!(matches!(
            s.select_page(&a, 2, Some(&PagingState::new("abc"))),
            Err(StoreError::InvalidPagingState(_))
        ));
    }

    #[test]
    fn test_conditional_update() {
        let s = session();
        insert(&s, trade_row("a", "AAPL", 1, 5));
        let key = Row::new()
            .with("account", Value::text("a"))
            .with("symbol", Value::text("AAPL"))
            .with("trade_id", Value::Timestamp(1));

        let stale = ConditionalUpdate::new("trades", key.clone(), "shares", Value::BigInt(9), Value::BigInt(4));
        assert!(!s.update_if(&stale).unwrap());

        let fresh = ConditionalUpdate::new("trades", key.clone(), "shares", Value::BigInt(6), Value::BigInt(5));
        assert!(s.update_if(&fresh).unwrap());

        let on_key = ConditionalUpdate::new("trades", key, "symbol", Value::text("X"), Value::text("AAPL"));
        assert!(s.update_if(&on_key).is_err());
    }

    #[test]
    fn test_missing_keyspace_and_table() {
        let s = MemorySession::new("ks");
        assert!(matches!(
            s.create_table(&trades_schema()),
            Err(StoreError::KeyspaceNotFound(_))
        ));
        s.create_keyspace(&KeyspaceSchema::new("ks", 1)).unwrap();
        assert!(matches!(s.count("trades"), Err(StoreError::TableNotFound(_))));
    }

    #[test]
    fn test_connect_validates_contact_points() {
        let mut config = StoreConfig {
            snapshot_path: None,
            ..StoreConfig::default()
        };
        config.hosts = vec!["".to_string(), "db:notaport".to_string()];
        assert!(matches!(
            MemorySession::connect(&config),
            Err(StoreError::Unavailable { .. })
        ));

        config.hosts = vec!["db:9042".to_string()];
        config.protocol_version = 9;
        assert!(matches!(
            MemorySession::connect(&config),
            Err(StoreError::UnsupportedProtocol(9))
        ));

        config.protocol_version = 4;
        assert_eq!(MemorySession::connect(&config).unwrap().hosts(), ["db:9042"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            keyspace: "ks".to_string(),
            snapshot_path: Some(dir.path().join("store.json")),
            ..StoreConfig::default()
        };

        let s = MemorySession::connect(&config).unwrap();
        s.create_keyspace(&KeyspaceSchema::new("ks", 1)).unwrap();
        s.create_table(&trades_schema()).unwrap();
        insert(&s, trade_row("a", "AAPL", 1, 5));
        insert(&s, trade_row("a", "AAPL", 2, 6));
        s.flush().unwrap();

        let reopened = MemorySession::connect(&config).unwrap();
        assert_eq!(reopened.count("trades").unwrap(), 2);
        let page = reopened
            .select_page(&Select::new("trades").where_eq("account", Value::text("a")), 10, None)
            .unwrap();
        assert_eq!(ids(&page), vec![2, 1]);
    }
}
