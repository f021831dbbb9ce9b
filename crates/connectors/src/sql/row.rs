use crate::error::DbError;
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use sqlx::{Column, Row, TypeInfo, ValueRef, any::AnyRow};

/// Decodes one column by the runtime type of the value it holds.
fn decode_column(row: &AnyRow, index: usize, name: &str) -> Result<FieldValue, DbError> {
    let raw = row.try_get_raw(index)?;
    let type_name = raw.type_info().name().to_string();
    let data_type = DataType::from_type_name(&type_name);

    if raw.is_null() {
        return Ok(FieldValue {
            name: name.to_string(),
            value: None,
            data_type,
        });
    }

    let value = match type_name.as_str() {
        "BOOLEAN" => Value::Boolean(row.try_get::<bool, _>(index)?),
        "SMALLINT" => Value::Int(i64::from(row.try_get::<i16, _>(index)?)),
        "INTEGER" => Value::Int(i64::from(row.try_get::<i32, _>(index)?)),
        "BIGINT" => Value::Int(row.try_get::<i64, _>(index)?),
        "REAL" => Value::Float(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => Value::Float(row.try_get::<f64, _>(index)?),
        "TEXT" => Value::String(row.try_get::<String, _>(index)?),
        "BLOB" => Value::Bytes(row.try_get::<Vec<u8>, _>(index)?),
        _ => {
            return Err(DbError::UnsupportedType {
                column: name.to_string(),
                type_name,
            });
        }
    };

    Ok(FieldValue {
        name: name.to_string(),
        value: Some(value),
        data_type,
    })
}

/// Converts a driver row into a record, keeping projection order.
pub fn to_row_data(row: &AnyRow, entity: &str) -> Result<RowData, DbError> {
    let field_values = row
        .columns()
        .iter()
        .map(|column| decode_column(row, column.ordinal(), column.name()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RowData::new(entity, field_values))
}
