//! Integration tests for the bulk loader
//!
//! These tests run real loads over temp directories: flat files on one side,
//! a LocalTableStore on the other, in both execution modes.

#[cfg(test)]
mod tests {
    use crate::{
        error::LoadError,
        loader::{BulkLoader, LoadMode, LoadResult, LoadStatus},
        runner::{self, LoadArgs},
        schema::{ColumnType, SchemaRegistry, TableSchema},
        store::{LocalTableStore, TableStore},
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::fs;

    // ============ Test Helpers ============

    /// Generate a synthetic field value matching a column type
    fn field_for(column_type: ColumnType, row: usize) -> String {
        match column_type {
            ColumnType::Integer => row.to_string(),
            ColumnType::Float => format!("{}.25", row),
            ColumnType::String => format!("val_{}", row),
            ColumnType::Date => "1996-01-02".to_string(),
        }
    }

    /// Write a dbgen-style source file for a schema: pipe-delimited, no
    /// header, trailing separator on every row
    async fn write_source_file(dir: &TempDir, schema: &TableSchema, num_rows: usize) {
        let mut contents = String::new();
        for row in 0..num_rows {
            for col in &schema.columns {
                contents.push_str(&field_for(col.column_type, row));
                contents.push('|');
            }
            contents.push('\n');
        }
        let path = dir.path().join(format!("{}.tbl", schema.table_name));
        fs::write(&path, contents).await.unwrap();
    }

    /// Write source files for every table in a registry
    async fn write_all_sources(dir: &TempDir, registry: &SchemaRegistry, num_rows: usize) {
        for schema in registry.all() {
            write_source_file(dir, schema, num_rows).await;
        }
    }

    fn setup() -> (TempDir, TempDir, Arc<LocalTableStore>, BulkLoader) {
        let source_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let store = Arc::new(LocalTableStore::new(store_dir.path().to_path_buf()));
        let loader = BulkLoader::new(Arc::clone(&store) as Arc<dyn TableStore>);
        (source_dir, store_dir, store, loader)
    }

    /// Collapse results into name -> (success, row_count), order-independent
    fn by_name(results: &[LoadResult]) -> BTreeMap<String, (bool, Option<u64>)> {
        results
            .iter()
            .map(|r| (r.table_name.clone(), (r.is_success(), r.row_count)))
            .collect()
    }

    // ============ load_one ============

    #[tokio::test]
    async fn test_load_one_region() {
        let (source_dir, _store_dir, store, loader) = setup();
        let registry = SchemaRegistry::tpch();
        let region = registry.get("region").unwrap();
        write_source_file(&source_dir, region, 5).await;

        let result = loader
            .load_one(source_dir.path(), "region", region)
            .await;

        assert!(result.is_success());
        assert_eq!(result.row_count, Some(5));
        assert_eq!(store.count_rows("region").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_load_one_missing_source() {
        let (source_dir, _store_dir, store, loader) = setup();
        let registry = SchemaRegistry::tpch();
        let region = registry.get("region").unwrap();

        let result = loader
            .load_one(source_dir.path(), "region", region)
            .await;

        assert!(matches!(
            result.status,
            LoadStatus::Failed(LoadError::SourceNotFound { .. })
        ));
        assert_eq!(result.row_count, None);
        assert_eq!(store.count_rows("region").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_one_schema_mismatch() {
        let (source_dir, _store_dir, _store, loader) = setup();
        let registry = SchemaRegistry::tpch();
        let region = registry.get("region").unwrap();

        // Four fields against region's three columns
        let path = source_dir.path().join("region.tbl");
        fs::write(&path, "0|AFRICA|comment|extra\n").await.unwrap();

        let result = loader
            .load_one(source_dir.path(), "region", region)
            .await;

        assert!(matches!(
            result.status,
            LoadStatus::Failed(LoadError::SchemaMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_one_is_idempotent() {
        let (source_dir, _store_dir, store, loader) = setup();
        let registry = SchemaRegistry::tpch();
        let nation = registry.get("nation").unwrap();
        write_source_file(&source_dir, nation, 25).await;

        let first = loader.load_one(source_dir.path(), "nation", nation).await;
        assert!(first.is_success());
        let rows_after_first = store.read_rows("nation").await.unwrap();

        // Unchanged source data: overwrite, not append
        let second = loader.load_one(source_dir.path(), "nation", nation).await;
        assert!(second.is_success());
        let rows_after_second = store.read_rows("nation").await.unwrap();

        assert_eq!(rows_after_first, rows_after_second);
        assert_eq!(store.count_rows("nation").await.unwrap(), Some(25));
    }

    // ============ load_all ============

    #[tokio::test]
    async fn test_load_all_sequential_full_registry() {
        let (source_dir, _store_dir, store, loader) = setup();
        let registry = SchemaRegistry::tpch();
        write_all_sources(&source_dir, &registry, 10).await;

        let results = loader
            .load_all(source_dir.path(), &registry, LoadMode::Sequential)
            .await
            .unwrap();

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.is_success()));

        // Sequential results come back in registry order
        let names: Vec<&str> = results.iter().map(|r| r.table_name.as_str()).collect();
        let expected: Vec<&str> = registry.all().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, expected);

        for schema in registry.all() {
            assert_eq!(
                store.count_rows(&schema.table_name).await.unwrap(),
                Some(10)
            );
        }
    }

    #[tokio::test]
    async fn test_load_all_bounded_full_registry() {
        let (source_dir, _store_dir, store, loader) = setup();
        let registry = SchemaRegistry::tpch();
        write_all_sources(&source_dir, &registry, 10).await;

        let results = loader
            .load_all(source_dir.path(), &registry, LoadMode::Bounded(4))
            .await
            .unwrap();

        // One result per registry entry regardless of completion order
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.is_success()));

        for schema in registry.all() {
            assert_eq!(
                store.count_rows(&schema.table_name).await.unwrap(),
                Some(10)
            );
        }
    }

    #[tokio::test]
    async fn test_bounded_one_matches_sequential() {
        let source_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::tpch();
        write_all_sources(&source_dir, &registry, 7).await;
        // orders is absent so both runs see a mixed outcome
        fs::remove_file(source_dir.path().join("orders.tbl"))
            .await
            .unwrap();

        let seq_store_dir = TempDir::new().unwrap();
        let seq_loader = BulkLoader::new(Arc::new(LocalTableStore::new(
            seq_store_dir.path().to_path_buf(),
        )));
        let sequential = seq_loader
            .load_all(source_dir.path(), &registry, LoadMode::Sequential)
            .await
            .unwrap();

        let bounded_store_dir = TempDir::new().unwrap();
        let bounded_loader = BulkLoader::new(Arc::new(LocalTableStore::new(
            bounded_store_dir.path().to_path_buf(),
        )));
        let bounded = bounded_loader
            .load_all(source_dir.path(), &registry, LoadMode::Bounded(1))
            .await
            .unwrap();

        assert_eq!(by_name(&sequential), by_name(&bounded));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_table() {
        let (source_dir, _store_dir, store, loader) = setup();
        let nation = SchemaRegistry::tpch().get("nation").unwrap().clone();
        let orders = SchemaRegistry::tpch().get("orders").unwrap().clone();
        let registry = SchemaRegistry::from_tables(vec![nation.clone(), orders]);

        // nation.tbl present, orders.tbl missing
        write_source_file(&source_dir, &nation, 25).await;

        let results = loader
            .load_all(source_dir.path(), &registry, LoadMode::Sequential)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert_eq!(results[0].table_name, "nation");
        assert!(matches!(
            results[1].status,
            LoadStatus::Failed(LoadError::SourceNotFound { .. })
        ));
        assert_eq!(results[1].table_name, "orders");

        // The sibling's destination table is unaffected
        assert_eq!(store.count_rows("nation").await.unwrap(), Some(25));
    }

    #[tokio::test]
    async fn test_bounded_zero_rejected() {
        let (source_dir, _store_dir, _store, loader) = setup();
        let registry = SchemaRegistry::tpch();

        let err = loader
            .load_all(source_dir.path(), &registry, LoadMode::Bounded(0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    // ============ runner ============

    #[tokio::test]
    async fn test_run_load_and_verify() {
        let source_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::tpch();
        write_all_sources(&source_dir, &registry, 5).await;

        let summary = runner::run_load(LoadArgs {
            base_path: source_dir.path().to_path_buf(),
            destination: store_dir.path().to_path_buf(),
            mode: LoadMode::Bounded(2),
            quiet: true,
        })
        .await
        .unwrap();

        assert_eq!(summary.tables_loaded, 8);
        assert_eq!(summary.tables_failed, 0);
        assert_eq!(summary.rows_loaded, 40);

        let store = LocalTableStore::new(store_dir.path().to_path_buf());
        let counts = runner::verify_counts(&store, &registry).await.unwrap();
        assert_eq!(counts.len(), 8);
        assert!(counts.iter().all(|(_, count)| *count == Some(5)));
    }

    #[tokio::test]
    async fn test_run_load_reports_partial_failure() {
        let source_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::tpch();
        write_all_sources(&source_dir, &registry, 5).await;
        fs::remove_file(source_dir.path().join("lineitem.tbl"))
            .await
            .unwrap();

        let summary = runner::run_load(LoadArgs {
            base_path: source_dir.path().to_path_buf(),
            destination: store_dir.path().to_path_buf(),
            mode: LoadMode::Sequential,
            quiet: true,
        })
        .await
        .unwrap();

        assert_eq!(summary.results.len(), 8);
        assert_eq!(summary.tables_loaded, 7);
        assert_eq!(summary.tables_failed, 1);

        let failed: Vec<&str> = summary
            .results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.table_name.as_str())
            .collect();
        assert_eq!(failed, vec!["lineitem"]);
    }
}
