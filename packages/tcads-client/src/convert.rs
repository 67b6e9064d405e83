use chrono::{DateTime, TimeZone, Utc};
use tcads_core::ads::{ArrayInfo, DataType};
use thiserror::Error;

/// A decoded PLC value, shaped by the [`DataType`] it was read against.
///
/// Scalars map to the closest-fitting Rust numeric type; `STRING`/`WSTRING`
/// decode through the same CP1252/UTF-16LE codecs as
/// [`AdsString`](tcads_core::ads::AdsString)/[`AdsWString`](tcads_core::ads::AdsWString).
/// Structs preserve member order as declared in the data type's `subItems`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    /// `DATE`/`DT`: seconds-since-Unix-epoch, UTC.
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Enum { name: String, value: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown field: {name}")]
    UnknownField { name: String },

    #[error("wrong buffer size: expected {expected} bytes, got {got}")]
    WrongBufferSize { expected: usize, got: usize },

    #[error("unknown enum variant: {name}")]
    UnknownEnumVariant { name: String },

    #[error("unknown data type: {name}")]
    UnknownDataType { name: String },
}

/// Strips a trailing `(n)` length suffix (as in `STRING(80)`) from a type name.
fn base_type_name(type_name: &str) -> &str {
    type_name.split('(').next().unwrap_or(type_name).trim()
}

/// Decodes `bytes` into a [`Value`] according to `data_type`.
///
/// `data_type` must already be alias-resolved to a concrete scalar, struct,
/// array, or enum shape — alias chains are followed by the data type cache
/// before this is called, not here.
pub fn from_raw(bytes: &[u8], data_type: &DataType) -> Result<Value, TypeError> {
    if bytes.len() < data_type.size as usize {
        return Err(TypeError::WrongBufferSize {
            expected: data_type.size as usize,
            got: bytes.len(),
        });
    }
    let bytes = &bytes[..data_type.size as usize];

    if data_type.is_array() {
        return decode_array(bytes, data_type);
    }
    if data_type.is_struct() {
        return decode_struct(bytes, data_type);
    }
    if data_type.is_enum() {
        return decode_enum(bytes, data_type);
    }
    decode_scalar(bytes, data_type)
}

/// Encodes `value` back to its wire representation according to `data_type`.
pub fn to_raw(value: &Value, data_type: &DataType) -> Result<Vec<u8>, TypeError> {
    if data_type.is_array() {
        return encode_array(value, data_type);
    }
    if data_type.is_struct() {
        return encode_struct(value, data_type);
    }
    if data_type.is_enum() {
        return encode_enum(value, data_type);
    }
    encode_scalar(value, data_type)
}

fn element_count(data_type: &DataType) -> usize {
    data_type
        .array_info
        .iter()
        .map(|dim| dim.length as usize)
        .product::<usize>()
        .max(1)
}

/// A synthetic `DataType` for one element of an array, used to recurse
/// `from_raw`/`to_raw` without re-deriving the element's own subItems.
fn element_data_type(data_type: &DataType) -> DataType {
    let count = element_count(data_type);
    let mut elem = data_type.clone();
    elem.array_info.clear();
    elem.size = data_type.size / count.max(1) as u32;
    elem
}

/// Decodes a (possibly multi-dimensional) array into nested [`Value::Array`]s,
/// one level of nesting per `array_info` entry, outermost dimension first —
/// `ARRAY[1..3, 1..2] OF INT` decodes to three 2-element arrays, not one flat
/// run of six.
fn decode_array(bytes: &[u8], data_type: &DataType) -> Result<Value, TypeError> {
    let leaf_type = element_data_type(data_type);
    decode_dims(bytes, &data_type.array_info, &leaf_type)
}

fn decode_dims(bytes: &[u8], dims: &[ArrayInfo], leaf_type: &DataType) -> Result<Value, TypeError> {
    let Some((dim, rest)) = dims.split_first() else {
        return from_raw(bytes, leaf_type);
    };
    let count = dim.length as usize;
    let chunk_len = bytes.len() / count.max(1);
    let items = bytes
        .chunks(chunk_len.max(1))
        .take(count)
        .map(|chunk| decode_dims(chunk, rest, leaf_type))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(items))
}

fn encode_array(value: &Value, data_type: &DataType) -> Result<Vec<u8>, TypeError> {
    let leaf_type = element_data_type(data_type);
    encode_dims(value, &data_type.array_info, &leaf_type, data_type)
}

fn encode_dims(
    value: &Value,
    dims: &[ArrayInfo],
    leaf_type: &DataType,
    data_type: &DataType,
) -> Result<Vec<u8>, TypeError> {
    let Some((_dim, rest)) = dims.split_first() else {
        return to_raw(value, leaf_type);
    };
    let Value::Array(items) = value else {
        return Err(TypeError::WrongBufferSize {
            expected: data_type.size as usize,
            got: 0,
        });
    };
    let mut out = Vec::new();
    for item in items {
        out.extend(encode_dims(item, rest, leaf_type, data_type)?);
    }
    Ok(out)
}

fn decode_struct(bytes: &[u8], data_type: &DataType) -> Result<Value, TypeError> {
    let mut fields = Vec::with_capacity(data_type.sub_items.len());
    for member in &data_type.sub_items {
        let start = member.offset as usize;
        let end = start + member.size as usize;
        if end > bytes.len() {
            return Err(TypeError::WrongBufferSize {
                expected: end,
                got: bytes.len(),
            });
        }
        fields.push((member.name.clone(), from_raw(&bytes[start..end], member)?));
    }
    Ok(Value::Struct(fields))
}

fn encode_struct(value: &Value, data_type: &DataType) -> Result<Vec<u8>, TypeError> {
    let Value::Struct(fields) = value else {
        return Err(TypeError::WrongBufferSize {
            expected: data_type.size as usize,
            got: 0,
        });
    };
    let mut out = vec![0u8; data_type.size as usize];
    for (name, field_value) in fields {
        let member = data_type
            .sub_items
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| TypeError::UnknownField { name: name.clone() })?;
        let start = member.offset as usize;
        let end = start + member.size as usize;
        let encoded = to_raw(field_value, member)?;
        out[start..end].copy_from_slice(&encoded[..member.size as usize]);
    }
    Ok(out)
}

fn underlying_int(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len().min(8)].copy_from_slice(&bytes[..bytes.len().min(8)]);
    i64::from_le_bytes(buf)
}

fn decode_enum(bytes: &[u8], data_type: &DataType) -> Result<Value, TypeError> {
    let raw = underlying_int(bytes);
    let name = data_type
        .enum_info
        .iter()
        .find(|e| e.value == raw)
        .map(|e| e.name.clone())
        .unwrap_or_default();
    Ok(Value::Enum { name, value: raw })
}

fn encode_enum(value: &Value, data_type: &DataType) -> Result<Vec<u8>, TypeError> {
    let raw = match value {
        Value::Enum { name, value } if !name.is_empty() => data_type
            .enum_info
            .iter()
            .find(|e| &e.name == name)
            .map(|e| e.value)
            .ok_or_else(|| TypeError::UnknownEnumVariant { name: name.clone() })?,
        Value::Enum { value, .. } => *value,
        other => return encode_scalar(other, data_type).map_err(|_| TypeError::UnknownEnumVariant {
            name: format!("{other:?}"),
        }),
    };
    let size = data_type.size as usize;
    Ok(raw.to_le_bytes()[..size.min(8)].to_vec())
}

fn decode_scalar(bytes: &[u8], data_type: &DataType) -> Result<Value, TypeError> {
    match base_type_name(&data_type.type_name).to_uppercase().as_str() {
        "BOOL" => Ok(Value::Bool(bytes[0] != 0)),
        "BYTE" | "USINT" => Ok(Value::U8(bytes[0])),
        "SINT" => Ok(Value::I8(bytes[0] as i8)),
        "WORD" | "UINT" => Ok(Value::U16(u16::from_le_bytes(bytes[..2].try_into().unwrap()))),
        "INT" => Ok(Value::I16(i16::from_le_bytes(bytes[..2].try_into().unwrap()))),
        "DWORD" | "UDINT" | "TIME" | "TOD" => {
            Ok(Value::U32(u32::from_le_bytes(bytes[..4].try_into().unwrap())))
        }
        "DATE" | "DT" => {
            let secs = u32::from_le_bytes(bytes[..4].try_into().unwrap());
            Ok(Value::Timestamp(
                Utc.timestamp_opt(secs as i64, 0).single().unwrap_or_else(|| {
                    Utc.timestamp_opt(0, 0).single().expect("epoch is valid")
                }),
            ))
        }
        "DINT" => Ok(Value::I32(i32::from_le_bytes(bytes[..4].try_into().unwrap()))),
        "REAL" => Ok(Value::F32(f32::from_le_bytes(bytes[..4].try_into().unwrap()))),
        "LREAL" => Ok(Value::F64(f64::from_le_bytes(bytes[..8].try_into().unwrap()))),
        "LWORD" | "ULINT" | "LTIME" => {
            Ok(Value::U64(u64::from_le_bytes(bytes[..8].try_into().unwrap())))
        }
        "LINT" => Ok(Value::I64(i64::from_le_bytes(bytes[..8].try_into().unwrap()))),
        "STRING" => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(
                &bytes[..bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())],
            );
            Ok(Value::String(decoded.into_owned()))
        }
        "WSTRING" => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .take_while(|&unit| unit != 0)
                .collect();
            let decoded = char::decode_utf16(units)
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            Ok(Value::String(decoded))
        }
        other => Err(TypeError::UnknownDataType {
            name: other.to_string(),
        }),
    }
}

fn encode_scalar(value: &Value, data_type: &DataType) -> Result<Vec<u8>, TypeError> {
    let bytes = match value {
        Value::Bool(b) => vec![*b as u8],
        Value::I8(v) => vec![*v as u8],
        Value::U8(v) => vec![*v],
        Value::I16(v) => v.to_le_bytes().to_vec(),
        Value::U16(v) => v.to_le_bytes().to_vec(),
        Value::I32(v) => v.to_le_bytes().to_vec(),
        Value::U32(v) => v.to_le_bytes().to_vec(),
        Value::I64(v) => v.to_le_bytes().to_vec(),
        Value::U64(v) => v.to_le_bytes().to_vec(),
        Value::F32(v) => v.to_le_bytes().to_vec(),
        Value::F64(v) => v.to_le_bytes().to_vec(),
        Value::Timestamp(ts) => (ts.timestamp().max(0) as u32).to_le_bytes().to_vec(),
        Value::String(s) => {
            let size = data_type.size as usize;
            match base_type_name(&data_type.type_name).to_uppercase().as_str() {
                "WSTRING" => {
                    let mut out = vec![0u8; size];
                    for (i, unit) in s.encode_utf16().take(size / 2 - 1).enumerate() {
                        out[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
                    }
                    out
                }
                _ => {
                    let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(s);
                    let mut out = vec![0u8; size];
                    let n = encoded.len().min(size.saturating_sub(1));
                    out[..n].copy_from_slice(&encoded[..n]);
                    out
                }
            }
        }
        other => {
            return Err(TypeError::UnknownDataType {
                name: format!("{other:?}"),
            });
        }
    };

    let size = data_type.size as usize;
    if bytes.len() >= size {
        Ok(bytes[..size].to_vec())
    } else {
        let mut padded = bytes;
        padded.resize(size, 0);
        Ok(padded)
    }
}
