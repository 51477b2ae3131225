//! Column schemas written as JSON.
//!
//! A JSON schema is an array. `false` and `null` entries are omitted; objects become
//! [`ObjectColumn`]s whose `slots` values must be slot *names* (render functions cannot be
//! expressed in JSON) and whose `children` is a nested schema array.

use serde_json::Value;

use super::ColumnSchema;
use super::ObjectColumn;
use super::SlotRef;
use crate::error::Error;
use crate::error::Result;

pub fn columns_from_json_str<R>(input: &str) -> Result<Vec<ColumnSchema<R>>> {
    let value: Value = serde_json::from_str(input)?;
    columns_from_json(&value)
}

pub fn columns_from_json<R>(value: &Value) -> Result<Vec<ColumnSchema<R>>> {
    parse_list(value, "$")
}

fn parse_list<R>(value: &Value, path: &str) -> Result<Vec<ColumnSchema<R>>> {
    let Value::Array(items) = value else {
        return Err(Error::schema(path, "expected an array of columns"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_entry(item, &format!("{path}[{i}]")))
        .collect()
}

fn parse_entry<R>(value: &Value, path: &str) -> Result<ColumnSchema<R>> {
    let map = match value {
        Value::Null | Value::Bool(false) => return Ok(ColumnSchema::Omitted),
        Value::Object(map) => map,
        _ => {
            return Err(Error::schema(
                path,
                "expected a column object, `false` or `null`",
            ));
        }
    };

    let mut column = ObjectColumn::new();
    column.props = map.clone();

    match column.props.remove("slots") {
        None | Some(Value::Null) => {}
        Some(Value::Object(slots)) => {
            for (kind, slot) in slots {
                match slot {
                    Value::String(name) => {
                        column.slots.insert(kind, SlotRef::Named(name));
                    }
                    Value::Null | Value::Bool(false) => {}
                    _ => {
                        return Err(Error::schema(
                            format!("{path}.slots.{kind}"),
                            "slot must be the name of a registered slot",
                        ));
                    }
                }
            }
        }
        Some(_) => return Err(Error::schema(path, "`slots` must be an object")),
    }

    column.children = match column.props.remove("children") {
        None => None,
        // A present-but-null `children` still marks the column as a group.
        Some(Value::Null) => Some(Vec::new()),
        Some(children) => Some(parse_list(&children, &format!("{path}.children"))?),
    };

    Ok(ColumnSchema::Object(column))
}
