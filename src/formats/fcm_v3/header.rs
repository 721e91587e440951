use crate::{
    error::{MapError, Result},
    types::{Guid, Position},
    FCM_V3_MAGIC, FCM_V3_REVISION,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// 固定长度头部的字节数（魔数到GUID为止）
pub const HEADER_SIZE: usize = 4 + 1 + 2 * 3 + 4 * 3 + 2 + 4 * 2 + 16;

/// FCMv3文件头部
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcmHeader {
    pub width_x: i16,
    pub height: i16,
    pub width_y: i16,
    pub spawn: Position,
    /// 自纪元以来的秒数
    pub date_modified: u32,
    pub date_created: u32,
    pub guid: Guid,
}

/// 写入FCMv3文件头部
pub fn write_header<W: Write>(writer: &mut W, header: &FcmHeader) -> Result<()> {
    writer.write_u32::<LittleEndian>(FCM_V3_MAGIC)?;
    writer.write_u8(FCM_V3_REVISION)?;

    writer.write_i16::<LittleEndian>(header.width_x)?;
    writer.write_i16::<LittleEndian>(header.height)?;
    writer.write_i16::<LittleEndian>(header.width_y)?;

    writer.write_i32::<LittleEndian>(header.spawn.x)?;
    writer.write_i32::<LittleEndian>(header.spawn.h)?;
    writer.write_i32::<LittleEndian>(header.spawn.y)?;
    writer.write_u8(header.spawn.r)?;
    writer.write_u8(header.spawn.l)?;

    writer.write_u32::<LittleEndian>(header.date_modified)?;
    writer.write_u32::<LittleEndian>(header.date_created)?;

    writer.write_all(header.guid.as_bytes())?;

    Ok(())
}

/// 读取FCMv3文件头部
pub fn read_header<R: Read>(reader: &mut R) -> Result<FcmHeader> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != FCM_V3_MAGIC {
        return Err(MapError::Format(format!("无效的FCMv3魔数: {:#010x}", magic)));
    }

    let revision = reader.read_u8()?;
    if revision != FCM_V3_REVISION {
        return Err(MapError::Format(format!("不支持的FCMv3版本: {}", revision)));
    }

    let width_x = reader.read_i16::<LittleEndian>()?;
    let height = reader.read_i16::<LittleEndian>()?;
    let width_y = reader.read_i16::<LittleEndian>()?;

    let x = reader.read_i32::<LittleEndian>()?;
    let h = reader.read_i32::<LittleEndian>()?;
    let y = reader.read_i32::<LittleEndian>()?;
    let r = reader.read_u8()?;
    let l = reader.read_u8()?;

    let date_modified = reader.read_u32::<LittleEndian>()?;
    let date_created = reader.read_u32::<LittleEndian>()?;

    let mut guid = [0u8; 16];
    reader.read_exact(&mut guid)?;

    Ok(FcmHeader {
        width_x,
        height,
        width_y,
        spawn: Position::new(x, y, h, r, l),
        date_modified,
        date_created,
        guid: Guid(guid),
    })
}
