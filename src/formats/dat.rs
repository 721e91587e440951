//! 官方Classic/Creative客户端的 `.dat` 存档
//!
//! 文件内容是gzip压缩的Java对象序列化流。这里不解析对象图，而是顺序扫描字节：
//! 找到已知字段名后紧跟的大端i32，直到遇到 `byte[]` 数组的类描述符为止，
//! 描述符之后是数组长度和方块数据。命中位置不做额外验证。

use crate::{
    block::{BlockMapping, ALPHA_MAPPING},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{fixed_point, header_map},
    map::Map,
    types::{MapFormat, MapFormatType, Position},
    utils::has_extension,
};
use byteorder::{BigEndian, ByteOrder};
use std::io::Read;
use std::path::Path;

/// 文件头魔数（大端）
pub const DAT_MAGIC: u32 = 0x271B_B788;

/// 序列化的 `byte[]` 类描述符：类名 `[B`、serialVersionUID、标志位、0个字段、结束标记
pub const ARRAY_MARKER: [u8; 15] = [
    0x5B, 0x42, 0xAC, 0xF3, 0x17, 0xF8, 0x06, 0x08, 0x54, 0xE0, 0x02, 0x00, 0x00, 0x78, 0x70,
];

const HEADER_LEN: usize = 5;

/// 扫描得到的原始字段值
#[derive(Debug, Default)]
struct DatFields {
    width: Option<i32>,
    height: Option<i32>,
    depth: Option<i32>,
    x_spawn: Option<i32>,
    y_spawn: Option<i32>,
    z_spawn: Option<i32>,
    /// 数组长度字段之后第一个方块的偏移
    blocks_start: usize,
    blocks_len: i32,
}

impl DatFields {
    fn slot(&mut self, name: &[u8]) -> Option<&mut Option<i32>> {
        match name {
            b"width" => Some(&mut self.width),
            b"height" => Some(&mut self.height),
            b"depth" => Some(&mut self.depth),
            b"xSpawn" => Some(&mut self.x_spawn),
            b"ySpawn" => Some(&mut self.y_spawn),
            b"zSpawn" => Some(&mut self.z_spawn),
            _ => None,
        }
    }
}

const FIELD_NAMES: [&[u8]; 6] = [b"width", b"height", b"depth", b"xSpawn", b"ySpawn", b"zSpawn"];

fn check_header(data: &[u8]) -> Result<()> {
    if data.len() < HEADER_LEN {
        return Err(MapError::Format("文件过短".to_string()));
    }
    let magic = BigEndian::read_u32(&data[..4]);
    if magic != DAT_MAGIC {
        return Err(MapError::Format(format!("无效的.dat魔数: {:#010x}", magic)));
    }
    match data[4] {
        1 | 2 => Ok(()),
        version => Err(MapError::Format(format!("不支持的.dat版本: {}", version))),
    }
}

/// 顺序扫描字段名，遇到数组标记即停止
fn scan(data: &[u8]) -> Result<DatFields> {
    check_header(data)?;

    let mut fields = DatFields::default();
    let mut i = HEADER_LEN;
    while i < data.len() {
        let rest = &data[i..];
        if rest.starts_with(&ARRAY_MARKER) {
            let len_at = i + ARRAY_MARKER.len();
            let len_bytes = data
                .get(len_at..len_at + 4)
                .ok_or_else(|| MapError::Format("数组标记之后缺少长度".to_string()))?;
            fields.blocks_len = BigEndian::read_i32(len_bytes);
            fields.blocks_start = len_at + 4;
            return Ok(fields);
        }

        let hit = FIELD_NAMES
            .iter()
            .find(|name| rest.len() >= name.len() + 4 && rest.starts_with(name));
        match hit {
            Some(name) => {
                let value = BigEndian::read_i32(&rest[name.len()..name.len() + 4]);
                if let Some(slot) = fields.slot(name) {
                    *slot = Some(value);
                }
                i += name.len() + 4;
            }
            None => i += 1,
        }
    }

    Err(MapError::Format("找不到方块数组的起始标记".to_string()))
}

fn build_header(fields: &DatFields) -> Result<Map> {
    let (Some(width), Some(height), Some(depth)) = (fields.width, fields.height, fields.depth) else {
        return Err(MapError::Format("缺少地图尺寸字段".to_string()));
    };

    // 文件里的y是竖直方向，z是水平方向；坐标取方块中心
    let spawn = match (fields.x_spawn, fields.y_spawn, fields.z_spawn) {
        (Some(x), Some(y), Some(z)) => Some(Position::new(
            fixed_point(x, 16)?,
            fixed_point(z, 16)?,
            fixed_point(y, 16)?,
            0,
            0,
        )),
        _ => None,
    };

    header_map(width, height, depth, spawn)
}

pub struct DatConverter;

impl DatConverter {
    fn read_all(path: &Path) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        open_gzip(path)?.read_to_end(&mut data)?;
        Ok(data)
    }

    fn read_map(data: &[u8]) -> Result<Map> {
        let fields = scan(data)?;
        let mut map = build_header(&fields)?;

        if fields.blocks_len < 0 || fields.blocks_len as usize != map.volume() {
            return Err(MapError::Format(format!(
                "方块数组长度 {} 与地图体积 {} 不符",
                fields.blocks_len,
                map.volume()
            )));
        }
        let blocks = data
            .get(fields.blocks_start..fields.blocks_start + map.volume())
            .ok_or_else(|| MapError::Format("方块数据不完整".to_string()))?;
        map.set_blocks(blocks.to_vec())?;
        map.convert_block_types(&ALPHA_MAPPING);
        Ok(map)
    }
}

impl MapConverter for DatConverter {
    fn server_name(&self) -> &'static str {
        "Vanilla"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::Creative
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&ALPHA_MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "dat")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_gzip_prefix(path, HEADER_LEN).map(|prefix| check_header(&prefix).is_ok());
        probe_result(self.format(), path, result)
    }

    fn load_header(&self, path: &Path) -> Result<Map> {
        decoded(Self::read_all(path).and_then(|data| build_header(&scan(&data)?)))
    }

    fn load(&self, path: &Path) -> Result<Map> {
        decoded(Self::read_all(path).and_then(|data| Self::read_map(&data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::gzip;
    use byteorder::WriteBytesExt;
    use tempfile::TempDir;

    fn field(raw: &mut Vec<u8>, name: &str, value: i32) {
        raw.extend_from_slice(name.as_bytes());
        raw.write_i32::<BigEndian>(value).unwrap();
    }

    const FIELDS: [(&str, i32); 6] = [
        ("width", 16),
        ("height", 32),
        ("depth", 8),
        ("xSpawn", 3),
        ("ySpawn", 5),
        ("zSpawn", 7),
    ];

    fn sample(version: u8, blocks: &[u8]) -> Vec<u8> {
        sample_with(version, &FIELDS, blocks)
    }

    fn sample_with(version: u8, fields: &[(&str, i32)], blocks: &[u8]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.write_u32::<BigEndian>(DAT_MAGIC).unwrap();
        raw.push(version);
        // 对象流头部和类描述符中的无关字节
        raw.extend_from_slice(&[0xAC, 0xED, 0x00, 0x05, 0x73, 0x72]);
        raw.extend_from_slice(b"com.mojang.minecraft.level.Level");
        for (name, value) in fields {
            field(&mut raw, name, *value);
            raw.extend_from_slice(&[0x00, 0x01]);
        }
        raw.extend_from_slice(&[0x75, 0x72, 0x00, 0x02]);
        raw.extend_from_slice(&ARRAY_MARKER);
        raw.write_i32::<BigEndian>(blocks.len() as i32).unwrap();
        raw.extend_from_slice(blocks);
        gzip(&raw).unwrap()
    }

    #[test]
    fn scans_fields_and_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.dat");
        let mut blocks = vec![1u8; 16 * 32 * 8];
        blocks[7] = 79; // 冰
        std::fs::write(&path, sample(2, &blocks)).unwrap();

        assert!(DatConverter.claims(&path));
        let map = DatConverter.load(&path).unwrap();
        assert_eq!((map.width_x(), map.width_y(), map.height()), (16, 32, 8));
        assert_eq!(map.spawn, Position::new(3 * 32 + 16, 7 * 32 + 16, 5 * 32 + 16, 0, 0));
        assert_eq!(map.blocks().unwrap()[7], crate::block::Block::Glass.id());
    }

    #[test]
    fn header_load_does_not_need_full_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.dat");
        std::fs::write(&path, sample(1, &[1, 2, 3])).unwrap();

        let header = DatConverter.load_header(&path).unwrap();
        assert_eq!(header.volume(), 16 * 32 * 8);
        assert!(DatConverter.load(&path).unwrap_err().is_format_error());
    }

    #[test]
    fn overflowing_fields_are_format_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.dat");

        let mut huge_width = FIELDS;
        huge_width[0].1 = i32::MAX;
        std::fs::write(&path, sample_with(2, &huge_width, &[])).unwrap();
        assert!(DatConverter.load_header(&path).unwrap_err().is_format_error());
        assert!(DatConverter.load(&path).unwrap_err().is_format_error());

        let mut huge_spawn = FIELDS;
        huge_spawn[3].1 = i32::MAX;
        std::fs::write(&path, sample_with(2, &huge_spawn, &[0u8; 16 * 32 * 8])).unwrap();
        assert!(DatConverter.load_header(&path).unwrap_err().is_format_error());
        assert!(DatConverter.load(&path).unwrap_err().is_format_error());
    }

    #[test]
    fn missing_marker_is_a_format_error() {
        let mut raw = Vec::new();
        raw.write_u32::<BigEndian>(DAT_MAGIC).unwrap();
        raw.push(1);
        field(&mut raw, "width", 16);
        assert!(scan(&raw).unwrap_err().is_format_error());
    }

    #[test]
    fn wrong_version_is_not_claimed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.dat");
        std::fs::write(&path, sample(3, &[])).unwrap();
        assert!(!DatConverter.claims(&path));
    }
}
