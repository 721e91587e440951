use crate::error::{MapError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// 每个数据层索引条目的字节数
pub const LAYER_ENTRY_SIZE: usize = 1 + 8 + 4 + 4 + 4 + 4;

/// 数据层类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LayerType {
    Blocks = 0,
    BlockUndo = 1,
    Entities = 2,
    PlayerIds = 3,
}

impl LayerType {
    pub fn from_u8(value: u8) -> Option<LayerType> {
        match value {
            0 => Some(LayerType::Blocks),
            1 => Some(LayerType::BlockUndo),
            2 => Some(LayerType::Entities),
            3 => Some(LayerType::PlayerIds),
            _ => None,
        }
    }
}

/// 数据层索引条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerIndexEntry {
    pub layer_type: u8,
    /// 数据层在解压后数据区中的起始位置
    pub offset: i64,
    /// 0 表示未知（所有数据层共享一个压缩流）
    pub compressed_length: i32,
    pub general_purpose: i32,
    pub element_size: i32,
    pub element_count: i32,
}

impl LayerIndexEntry {
    /// 数据层的字节长度
    pub fn byte_len(&self) -> Result<usize> {
        if self.element_size < 0 || self.element_count < 0 {
            return Err(MapError::Format(format!(
                "数据层尺寸无效: 元素大小 {}，元素数量 {}",
                self.element_size, self.element_count
            )));
        }
        (self.element_size as usize)
            .checked_mul(self.element_count as usize)
            .ok_or_else(|| MapError::Format("数据层长度溢出".to_string()))
    }
}

/// 写入数据层索引表（数量 + 条目）
pub fn write_layer_index<W: Write>(writer: &mut W, entries: &[LayerIndexEntry]) -> Result<()> {
    if entries.len() > u8::MAX as usize {
        return Err(MapError::Format("数据层数量超过上限".to_string()));
    }
    writer.write_u8(entries.len() as u8)?;

    for entry in entries {
        writer.write_u8(entry.layer_type)?;
        writer.write_i64::<LittleEndian>(entry.offset)?;
        writer.write_i32::<LittleEndian>(entry.compressed_length)?;
        writer.write_i32::<LittleEndian>(entry.general_purpose)?;
        writer.write_i32::<LittleEndian>(entry.element_size)?;
        writer.write_i32::<LittleEndian>(entry.element_count)?;
    }

    Ok(())
}

/// 读取数据层索引表
pub fn read_layer_index<R: Read>(reader: &mut R) -> Result<Vec<LayerIndexEntry>> {
    let layer_count = reader.read_u8()?;

    let mut entries = Vec::with_capacity(layer_count as usize);
    for _ in 0..layer_count {
        entries.push(LayerIndexEntry {
            layer_type: reader.read_u8()?,
            offset: reader.read_i64::<LittleEndian>()?,
            compressed_length: reader.read_i32::<LittleEndian>()?,
            general_purpose: reader.read_i32::<LittleEndian>()?,
            element_size: reader.read_i32::<LittleEndian>()?,
            element_count: reader.read_i32::<LittleEndian>()?,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn index_entries_are_25_bytes() {
        let entry = LayerIndexEntry {
            layer_type: LayerType::Blocks as u8,
            offset: 42,
            compressed_length: 0,
            general_purpose: 0,
            element_size: 1,
            element_count: 4096,
        };
        let mut buffer = Vec::new();
        write_layer_index(&mut buffer, &[entry, entry]).unwrap();
        assert_eq!(buffer.len(), 1 + 2 * LAYER_ENTRY_SIZE);
        assert_eq!(LAYER_ENTRY_SIZE, 25);

        let back = read_layer_index(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(back, vec![entry, entry]);
        assert_eq!(back[0].byte_len().unwrap(), 4096);
    }

    #[test]
    fn negative_sizes_are_rejected() {
        let entry = LayerIndexEntry {
            layer_type: 0,
            offset: 0,
            compressed_length: 0,
            general_purpose: 0,
            element_size: -1,
            element_count: 10,
        };
        assert!(entry.byte_len().unwrap_err().is_format_error());
    }
}
