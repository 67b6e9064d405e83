use super::error::DataTypeError;
use super::symbol_info::{ArrayInfo, Attribute, SYMBOL_FLAG_EXTENDED_INFO};

/// A single named constant inside an enum data type.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: String,
    pub value: i64,
}

/// Metadata for one named type in the PLC's data type table: a struct,
/// enum, alias, array, or scalar.
///
/// Decoded from the same family of record layout as
/// [`SymbolInfo`](super::symbol_info::SymbolInfo), prefixed with a
/// version/hash header and followed by, for structured types, recursive
/// `subItems` entries describing each member.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    pub version: u32,
    pub hash_value: u32,
    pub type_hash_value: u32,
    pub offset: u32,
    pub size: u32,
    pub ads_data_type: u32,
    pub flags: u32,
    pub name: String,
    pub type_name: String,
    pub comment: String,
    pub array_info: Vec<ArrayInfo>,
    pub enum_info: Vec<EnumInfo>,
    pub sub_items: Vec<DataType>,
    pub attributes: Vec<Attribute>,
    pub type_guid: Option<[u8; 16]>,
}

impl DataType {
    /// The identity key used by the data type cache: the type's own name, lowercased.
    pub fn cache_key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn is_struct(&self) -> bool {
        !self.sub_items.is_empty()
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_info.is_empty()
    }

    pub fn is_array(&self) -> bool {
        !self.array_info.is_empty()
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

fn read_text(bytes: &[u8], at: usize, len: usize) -> String {
    String::from_utf8_lossy(&bytes[at..at + len]).into_owned()
}

/// version(4) + hashValue(4) + typeHashValue(4) + offset(4) + size(4)
/// + adsDataType(4) + flags(4) + arrayDim(2) + nameLength(2) + typeLength(2)
/// + commentLength(2) + arrayInfoCount(2) + subItemCount(2)
const HEADER_LEN: usize = 44;

impl TryFrom<&[u8]> for DataType {
    type Error = DataTypeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::parse(bytes).map(|(dt, _)| dt)
    }
}

impl DataType {
    /// Parses one `DataType` record from the front of `bytes`, returning the
    /// record and the number of bytes consumed. Recurses into `subItems`
    /// using this same entry point since they share the record layout.
    fn parse(bytes: &[u8]) -> Result<(Self, usize), DataTypeError> {
        if bytes.len() < HEADER_LEN {
            return Err(DataTypeError::UnexpectedLength {
                expected: HEADER_LEN,
                got: bytes.len(),
            });
        }

        let version = read_u32(bytes, 0);
        let hash_value = read_u32(bytes, 4);
        let type_hash_value = read_u32(bytes, 8);
        let offset = read_u32(bytes, 12);
        let size = read_u32(bytes, 16);
        let ads_data_type = read_u32(bytes, 20);
        let flags = read_u32(bytes, 24);
        let array_dim = read_u16(bytes, 28) as usize;
        let name_len = read_u16(bytes, 30) as usize;
        let type_len = read_u16(bytes, 32) as usize;
        let comment_len = read_u16(bytes, 34) as usize;
        let array_info_count = read_u16(bytes, 36) as usize;
        let sub_item_count = read_u16(bytes, 38) as usize;
        let enum_info_count = read_u16(bytes, 40) as usize;
        // bytes 42..44 reserved for alignment.

        let mut cursor = HEADER_LEN;
        let name = read_text(bytes, cursor, name_len);
        cursor += name_len + 1;
        let type_name = read_text(bytes, cursor, type_len);
        cursor += type_len + 1;
        let comment = read_text(bytes, cursor, comment_len);
        cursor += comment_len + 1;

        let mut array_info = Vec::with_capacity(array_info_count.max(array_dim));
        for _ in 0..array_info_count.max(array_dim) {
            if cursor + 8 > bytes.len() {
                return Err(DataTypeError::Truncated);
            }
            array_info.push(ArrayInfo {
                lower_bound: read_i32(bytes, cursor),
                length: read_u32(bytes, cursor + 4),
            });
            cursor += 8;
        }

        let mut enum_info = Vec::with_capacity(enum_info_count);
        for _ in 0..enum_info_count {
            if cursor + 2 > bytes.len() {
                return Err(DataTypeError::Truncated);
            }
            let name_len = read_u16(bytes, cursor) as usize;
            cursor += 2;
            if cursor + name_len + 8 > bytes.len() {
                return Err(DataTypeError::Truncated);
            }
            let name = read_text(bytes, cursor, name_len);
            cursor += name_len;
            let value = read_i64(bytes, cursor);
            cursor += 8;
            enum_info.push(EnumInfo { name, value });
        }

        let mut sub_items = Vec::with_capacity(sub_item_count);
        for _ in 0..sub_item_count {
            let (sub_item, consumed) = Self::parse(&bytes[cursor..])?;
            sub_items.push(sub_item);
            cursor += consumed;
        }

        let mut attributes = Vec::new();
        let mut type_guid = None;

        if flags & SYMBOL_FLAG_EXTENDED_INFO != 0 && cursor + 16 <= bytes.len() {
            let mut guid = [0u8; 16];
            guid.copy_from_slice(&bytes[cursor..cursor + 16]);
            type_guid = Some(guid);
            cursor += 16;

            if cursor + 2 <= bytes.len() {
                let attr_count = read_u16(bytes, cursor) as usize;
                cursor += 2;
                for _ in 0..attr_count {
                    if cursor + 2 > bytes.len() {
                        break;
                    }
                    let name_len = bytes[cursor] as usize;
                    let value_len = bytes[cursor + 1] as usize;
                    cursor += 2;
                    if cursor + name_len + value_len > bytes.len() {
                        break;
                    }
                    let name = read_text(bytes, cursor, name_len);
                    cursor += name_len;
                    let value = read_text(bytes, cursor, value_len);
                    cursor += value_len;
                    attributes.push(Attribute { name, value });
                }
            }
        }

        Ok((
            Self {
                version,
                hash_value,
                type_hash_value,
                offset,
                size,
                ads_data_type,
                flags,
                name,
                type_name,
                comment,
                array_info,
                enum_info,
                sub_items,
                attributes,
                type_guid,
            },
            cursor,
        ))
    }
}

impl DataType {
    /// Parses zero or more top-level `DataType` records packed back-to-back,
    /// as returned by a `DataTypeUpload` read.
    pub fn parse_all(mut bytes: &[u8]) -> Result<Vec<Self>, DataTypeError> {
        let mut items = Vec::new();
        while !bytes.is_empty() {
            let (item, consumed) = Self::parse(bytes)?;
            items.push(item);
            bytes = &bytes[consumed..];
        }
        Ok(items)
    }
}
