use crate::error::LoadError;

use super::types::{ColumnDefinition, ColumnType, TableSchema};

use ColumnType::{Date, Float, Integer, String as Text};

/// Fixed mapping from table name to schema.
///
/// Built once at process start from the static TPC-H configuration and
/// shared read-only across all workers. Iteration order is the definition
/// order, which drives `load_all` and the verification pass.
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
}

impl SchemaRegistry {
    /// Build a registry from explicit schemas.
    ///
    /// Panics on a duplicate table name; registries are static configuration.
    pub fn from_tables(tables: Vec<TableSchema>) -> Self {
        for (i, table) in tables.iter().enumerate() {
            assert!(
                !tables[..i].iter().any(|t| t.table_name == table.table_name),
                "duplicate table '{}' in registry",
                table.table_name
            );
        }
        Self { tables }
    }

    /// The eight TPC-H table schemas.
    ///
    /// Types and nullability are taken from the source configuration as
    /// given, including its oddities (`orders.clearkdate` is declared as a
    /// string despite holding dates, and `region.regionkey` as a string
    /// despite holding integers). Load-time conformance validates values
    /// against these declarations rather than correcting them.
    pub fn tpch() -> Self {
        let col = ColumnDefinition::new;
        let tables = vec![
            TableSchema::new(
                "customer",
                vec![
                    col("custkey", Integer, false),
                    col("name", Text, false),
                    col("address", Text, false),
                    col("nationkey", Integer, true),
                    col("phone", Text, true),
                    col("acctbal", Float, true),
                    col("mktsegment", Text, true),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "lineitem",
                vec![
                    col("orderkey", Integer, false),
                    col("partkey", Integer, false),
                    col("suppkey", Integer, false),
                    col("linenumber", Integer, false),
                    col("quantity", Float, true),
                    col("extendedprice", Float, true),
                    col("discount", Float, true),
                    col("tax", Float, true),
                    col("returnflag", Text, false),
                    col("linestatus", Text, false),
                    col("shipdate", Date, false),
                    col("commitdate", Date, false),
                    col("receiptdate", Date, false),
                    col("shipinstruct", Text, false),
                    col("shipmode", Text, false),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "nation",
                vec![
                    col("nationkey", Integer, false),
                    col("name", Text, false),
                    col("regionkey", Integer, false),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "orders",
                vec![
                    col("orderkey", Integer, false),
                    col("custkey", Integer, false),
                    col("orderstatus", Text, false),
                    col("totalprice", Float, true),
                    col("orderdate", Date, false),
                    col("orderpriority", Text, false),
                    col("clearkdate", Text, false),
                    col("shippriority", Integer, false),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "part",
                vec![
                    col("partkey", Integer, false),
                    col("name", Text, true),
                    col("mfgr", Text, true),
                    col("brand", Text, true),
                    col("type", Text, true),
                    col("size", Integer, true),
                    col("container", Text, true),
                    col("retailprice", Float, true),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "partsupp",
                vec![
                    col("partkey", Integer, false),
                    col("suppkey", Integer, false),
                    col("availqty", Integer, false),
                    col("supplycost", Float, true),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "region",
                vec![
                    col("regionkey", Text, false),
                    col("name", Text, false),
                    col("comment", Text, true),
                ],
            ),
            TableSchema::new(
                "supplier",
                vec![
                    col("suppkey", Integer, false),
                    col("name", Text, false),
                    col("address", Text, false),
                    col("nationkey", Integer, true),
                    col("phone", Text, true),
                    col("acctbal", Float, true),
                    col("comment", Text, true),
                ],
            ),
        ];
        Self::from_tables(tables)
    }

    /// Look up the schema for a table name.
    pub fn get(&self, table_name: &str) -> Result<&TableSchema, LoadError> {
        self.tables
            .iter()
            .find(|t| t.table_name == table_name)
            .ok_or_else(|| LoadError::UnknownTable(table_name.to_string()))
    }

    /// Iterate all entries in a stable, deterministic order.
    pub fn all(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_eight_tables() {
        let registry = SchemaRegistry::tpch();
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_iteration_order_is_stable() {
        let registry = SchemaRegistry::tpch();
        let names: Vec<&str> = registry.all().map(|t| t.table_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "customer", "lineitem", "nation", "orders", "part", "partsupp", "region",
                "supplier"
            ]
        );
    }

    #[test]
    fn test_get_known_table() {
        let registry = SchemaRegistry::tpch();
        let lineitem = registry.get("lineitem").unwrap();
        assert_eq!(lineitem.column_count(), 16);
        assert_eq!(lineitem.columns[10].name, "shipdate");
        assert_eq!(lineitem.columns[10].column_type, ColumnType::Date);
    }

    #[test]
    fn test_get_unknown_table() {
        let registry = SchemaRegistry::tpch();
        let err = registry.get("invoices").unwrap_err();
        assert!(matches!(err, LoadError::UnknownTable(name) if name == "invoices"));
    }

    #[test]
    fn test_source_schema_quirks_preserved() {
        // The source configuration declares these types inconsistently;
        // the registry carries them as given.
        let registry = SchemaRegistry::tpch();
        let orders = registry.get("orders").unwrap();
        let clearkdate = orders.columns.iter().find(|c| c.name == "clearkdate").unwrap();
        assert_eq!(clearkdate.column_type, ColumnType::String);

        let region = registry.get("region").unwrap();
        assert_eq!(region.columns[0].column_type, ColumnType::String);
    }
}
