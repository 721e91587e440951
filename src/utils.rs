use crate::error::{MapError, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// 单个字符串允许的最大长度，防止损坏的长度字段导致巨量分配
const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// 不区分大小写地比较文件扩展名
pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(extension))
}

/// 读取普通文件的前 `len` 个字节
pub fn read_file_prefix<P: AsRef<Path>>(path: P, len: usize) -> Result<Vec<u8>> {
    let mut prefix = vec![0u8; len];
    File::open(path)?.read_exact(&mut prefix)?;
    Ok(prefix)
}

/// 精确读取 `len` 个字节；先按实际到达的数据增长缓冲区，再检查长度
pub fn read_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.take(len as u64).read_to_end(&mut buffer)?;
    if buffer.len() != len {
        return Err(MapError::Format(format!(
            "数据不完整: 需要 {} 字节，实际只有 {} 字节",
            len,
            buffer.len()
        )));
    }
    Ok(buffer)
}

fn checked_string_len(len: i64) -> Result<usize> {
    if len < 0 || len as usize > MAX_STRING_LEN {
        return Err(MapError::Format(format!("字符串长度无效: {}", len)));
    }
    Ok(len as usize)
}

fn decode_utf8(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).map_err(|_| MapError::Format("非UTF-8编码的字符串".to_string()))
}

/// 读取带长度前缀（有符号32位，字节序由 `B` 决定）的UTF-8字符串
pub fn read_string_i32<B: ByteOrder, R: Read>(reader: &mut R) -> Result<String> {
    let len = checked_string_len(reader.read_i32::<B>()? as i64)?;
    decode_utf8(read_vec(reader, len)?)
}

/// 写入带长度前缀（有符号32位）的UTF-8字符串
pub fn write_string_i32<B: ByteOrder, W: Write>(writer: &mut W, value: &str) -> Result<()> {
    if value.len() > MAX_STRING_LEN {
        return Err(MapError::Format("字符串过长".to_string()));
    }
    writer.write_i32::<B>(value.len() as i32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// 读取带无符号32位小端长度前缀的字符串
pub fn read_string_u32le<R: Read>(reader: &mut R) -> Result<String> {
    let len = checked_string_len(reader.read_u32::<LittleEndian>()? as i64)?;
    decode_utf8(read_vec(reader, len)?)
}
