use crate::{
    compiler::{self, CompiledStatement, DialectContext, error::CompileError},
    filter::{
        encoder::SqlFilterEncoder,
        splitter::{CapabilitiesSplitter, FilterCapabilities},
    },
    plan::JoinPlan,
    query::dialect::DialectKind,
    schema::StaticSchema,
};
use serde::{Deserialize, Serialize};

/// How `limit`/`offset` are applied to a joining query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Plain `LIMIT`/`OFFSET` over the joined rows.
    #[default]
    Rows,
    /// Page over distinct groups of the last step's sort keys, so a group is
    /// never cut in half.
    Groups,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub paging: PagingMode,
    pub capabilities: FilterCapabilities,
}

/// Everything needed to compile (and optionally run) one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    #[serde(default)]
    pub dialect: DialectKind,
    pub schema: StaticSchema,
    pub plan: JoinPlan,
    #[serde(default)]
    pub settings: CompilerSettings,
}

impl QueryDocument {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.with_context(|ctx| compiler::compile(&self.plan, ctx))
    }

    pub fn compile_count(&self) -> Result<CompiledStatement, CompileError> {
        self.with_context(|ctx| compiler::compile_count(&self.plan, ctx))
    }

    fn with_context<T>(&self, f: impl FnOnce(&DialectContext) -> T) -> T {
        let dialect = self.dialect.dialect();
        let splitter = CapabilitiesSplitter::new(self.settings.capabilities.clone());
        let ctx = DialectContext {
            dialect: dialect.as_ref(),
            schema: &self.schema,
            encoder: &SqlFilterEncoder,
            splitter: &splitter,
            paging: self.settings.paging,
        };
        f(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaProvider;

    #[test]
    fn parses_minimal_document() {
        let doc = QueryDocument::from_json(
            r#"{
                "schema": [{"name": "station", "columns": [{"name": "id", "data_type": "Int"}]}],
                "plan": {"table": "station"}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.dialect, DialectKind::Postgres);
        assert_eq!(doc.settings.paging, PagingMode::Rows);
        assert!(doc.settings.capabilities.like);
        assert!(doc.schema.table("station").is_ok());
    }

    #[test]
    fn parses_settings() {
        let doc = QueryDocument::from_json(
            r#"{
                "dialect": "sqlite",
                "schema": [],
                "plan": {"table": "station"},
                "settings": {"paging": "groups", "capabilities": {"like": false}}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.dialect, DialectKind::Sqlite);
        assert_eq!(doc.settings.paging, PagingMode::Groups);
        assert!(!doc.settings.capabilities.like);
        assert!(doc.settings.capabilities.comparisons);
    }

    #[test]
    fn compiles_with_document_settings() {
        let doc = QueryDocument::from_json(
            r#"{
                "schema": [
                    {"name": "station", "columns": [{"name": "id", "data_type": "Int"}], "primary_keys": ["id"]}
                ],
                "plan": {"table": "station", "sort_by": ["natural"], "limit": 3}
            }"#,
        )
        .unwrap()
        .with_dialect(DialectKind::Sqlite);

        let stmt = doc.compile().unwrap();
        assert_eq!(
            stmt.sql,
            r#"SELECT "station"."id" FROM "station" ORDER BY "station"."id" ASC LIMIT ?"#
        );
        assert_eq!(doc.compile_count().unwrap().shape.column_names(), vec!["count"]);
    }
}
