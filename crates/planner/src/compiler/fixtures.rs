use crate::{
    compiler::DialectContext,
    config::PagingMode,
    filter::{
        encoder::SqlFilterEncoder,
        splitter::{CapabilitiesSplitter, FilterCapabilities},
    },
    query::dialect::{Dialect, DialectKind},
    schema::{StaticSchema, TableSchema},
};
use model::core::data_type::DataType;

/// station 1-n measurement 1-n reading, plus a key-less `tag` table.
pub(crate) fn schema() -> StaticSchema {
    StaticSchema::new()
        .with_table(
            TableSchema::new("station")
                .column("id", DataType::LongLong)
                .column("name", DataType::String)
                .column("code", DataType::String)
                .column("parent_id", DataType::LongLong)
                .column("location", DataType::Geometry)
                .primary_key(&["id"]),
        )
        .with_table(
            TableSchema::new("measurement")
                .column("id", DataType::LongLong)
                .column("station_id", DataType::LongLong)
                .column("kind", DataType::String)
                .column("taken_at", DataType::Timestamp)
                .primary_key(&["id"]),
        )
        .with_table(
            TableSchema::new("reading")
                .column("id", DataType::LongLong)
                .column("measurement_id", DataType::LongLong)
                .column("seq", DataType::Int)
                .column("value", DataType::Double)
                .primary_key(&["id"]),
        )
        .with_table(
            TableSchema::new("tag")
                .column("station_id", DataType::LongLong)
                .column("label", DataType::String),
        )
}

pub(crate) struct Fixture {
    pub schema: StaticSchema,
    pub splitter: CapabilitiesSplitter,
    pub paging: PagingMode,
    dialect: Box<dyn Dialect>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            schema: schema(),
            splitter: CapabilitiesSplitter::default(),
            paging: PagingMode::Rows,
            dialect: DialectKind::Postgres.dialect(),
        }
    }

    pub fn dialect(mut self, kind: DialectKind) -> Self {
        self.dialect = kind.dialect();
        self
    }

    pub fn capabilities(mut self, capabilities: FilterCapabilities) -> Self {
        self.splitter = CapabilitiesSplitter::new(capabilities);
        self
    }

    pub fn groups(mut self) -> Self {
        self.paging = PagingMode::Groups;
        self
    }

    pub fn ctx(&self) -> DialectContext<'_> {
        DialectContext {
            dialect: self.dialect.as_ref(),
            schema: &self.schema,
            encoder: &SqlFilterEncoder,
            splitter: &self.splitter,
            paging: self.paging,
        }
    }
}
