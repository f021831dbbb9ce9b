#![allow(dead_code)]

use connectors::sql::executor::SqlxExecutor;
use planner::{
    config::{CompilerSettings, PagingMode, QueryDocument},
    plan::JoinPlan,
    query::dialect::DialectKind,
    schema::StaticSchema,
};

pub mod utils;

const TEST_SQLITE_URL: &str = "sqlite::memory:";

/// station 1-n measurement 1-n reading, plus `tag`: one denormalized row per
/// label of a station, with no key of its own.
const SCHEMA_JSON: &str = r#"[
    {
        "name": "station",
        "columns": [
            {"name": "id", "data_type": "LongLong"},
            {"name": "name", "data_type": "String"},
            {"name": "code", "data_type": "String"}
        ],
        "primary_keys": ["id"]
    },
    {
        "name": "measurement",
        "columns": [
            {"name": "id", "data_type": "LongLong"},
            {"name": "station_id", "data_type": "LongLong"},
            {"name": "kind", "data_type": "String"}
        ],
        "primary_keys": ["id"]
    },
    {
        "name": "reading",
        "columns": [
            {"name": "id", "data_type": "LongLong"},
            {"name": "measurement_id", "data_type": "LongLong"},
            {"name": "seq", "data_type": "Int"},
            {"name": "value", "data_type": "Double"}
        ],
        "primary_keys": ["id"]
    },
    {
        "name": "tag",
        "columns": [
            {"name": "station_id", "data_type": "LongLong"},
            {"name": "label", "data_type": "String"}
        ]
    }
]"#;

const SEED_SQL: &[&str] = &[
    "CREATE TABLE station (id INTEGER PRIMARY KEY, name TEXT NOT NULL, code TEXT NOT NULL)",
    "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station_id INTEGER NOT NULL, kind TEXT NOT NULL)",
    "CREATE TABLE reading (id INTEGER PRIMARY KEY, measurement_id INTEGER NOT NULL, seq INTEGER NOT NULL, value REAL NOT NULL)",
    "CREATE TABLE tag (station_id INTEGER NOT NULL, label TEXT NOT NULL)",
    "INSERT INTO station (id, name, code) VALUES (1, 'north', 'N'), (2, 'south', 'S'), (3, 'east', 'E')",
    "INSERT INTO measurement (id, station_id, kind) VALUES \
        (10, 1, 'rain'), (11, 1, 'wind'), (12, 1, 'temp'), \
        (20, 2, 'wind'), (21, 2, 'temp'), \
        (30, 3, 'rain')",
    "INSERT INTO reading (id, measurement_id, seq, value) VALUES \
        (100, 10, 1, 0.5), (101, 10, 2, 2.0), \
        (200, 20, 1, 1.0), \
        (300, 30, 1, 3.0)",
    "INSERT INTO tag (station_id, label) VALUES \
        (1, 'coastal'), (1, 'windy'), (2, 'urban'), (3, 'coastal'), (3, 'high')",
];

/// Fresh in-memory database holding the seeded station data.
async fn sqlite() -> SqlxExecutor {
    let executor = SqlxExecutor::connect(TEST_SQLITE_URL)
        .await
        .expect("connect sqlite");
    for sql in SEED_SQL {
        executor.execute(sql).await.expect("seed sqlite");
    }
    executor
}

fn document(plan: JoinPlan, paging: PagingMode) -> QueryDocument {
    let schema: StaticSchema = serde_json::from_str(SCHEMA_JSON).expect("parse schema");
    QueryDocument {
        dialect: DialectKind::Sqlite,
        schema,
        plan,
        settings: CompilerSettings {
            paging,
            ..Default::default()
        },
    }
}
