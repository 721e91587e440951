//! FCMv2：上一代原生格式，只读
//!
//! 头部和元数据不压缩（小端），之后直到文件结尾是gzip压缩的方块数组。

use crate::{
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{header_map, read_blocks},
    map::Map,
    types::{MapFormat, MapFormatType, Position},
    utils::{has_extension, read_file_prefix, read_string_u32le},
    zone::Zone,
    FCM_V2_MAGIC,
};
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// 未分组元数据在规范地图中所属的组
pub const META_GROUP: &str = "FCMv2";

/// 该键的值是一条序列化的区域定义
const ZONE_KEY: &str = "@zone";

pub struct FcmV2Converter;

impl FcmV2Converter {
    fn read_map_header<R: Read>(reader: &mut R) -> Result<Map> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != FCM_V2_MAGIC {
            return Err(MapError::Format(format!(
                "无效的FCMv2魔数: {:#010x}",
                magic
            )));
        }

        let width_x = reader.read_i16::<LittleEndian>()? as i32;
        let width_y = reader.read_i16::<LittleEndian>()? as i32;
        let height = reader.read_i16::<LittleEndian>()? as i32;

        let x = reader.read_i16::<LittleEndian>()? as i32;
        let y = reader.read_i16::<LittleEndian>()? as i32;
        let h = reader.read_i16::<LittleEndian>()? as i32;
        let r = reader.read_u8()?;
        let l = reader.read_u8()?;

        header_map(width_x, width_y, height, Some(Position::new(x, y, h, r, l)))
    }

    fn read_map<R: Read>(reader: &mut R) -> Result<Map> {
        let mut map = Self::read_map_header(reader)?;

        let meta_count = reader.read_u16::<LittleEndian>()?;
        for _ in 0..meta_count {
            let key = read_string_u32le(reader)?;
            let value = read_string_u32le(reader)?;
            if key == ZONE_KEY {
                map.add_zone(Zone::parse(&value)?)?;
            } else {
                map.set_meta(META_GROUP, key, value);
            }
        }

        read_blocks(&mut GzDecoder::new(reader), &mut map)?;
        map.remove_unknown_blocktypes();
        Ok(map)
    }
}

impl MapConverter for FcmV2Converter {
    fn server_name(&self) -> &'static str {
        "fCraft"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::FCMv2
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "fcm")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_file_prefix(path, 4).map(|prefix| prefix[..] == FCM_V2_MAGIC.to_le_bytes());
        probe_result(self.format(), path, result)
    }

    fn load_header(&self, path: &Path) -> Result<Map> {
        let mut reader = BufReader::new(File::open(path)?);
        decoded(Self::read_map_header(&mut reader))
    }

    fn load(&self, path: &Path) -> Result<Map> {
        let mut reader = BufReader::new(File::open(path)?);
        decoded(Self::read_map(&mut reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::gzip;
    use byteorder::WriteBytesExt;
    use tempfile::TempDir;

    fn push_string(buffer: &mut Vec<u8>, value: &str) {
        buffer.write_u32::<LittleEndian>(value.len() as u32).unwrap();
        buffer.extend_from_slice(value.as_bytes());
    }

    fn sample(blocks: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.write_u32::<LittleEndian>(FCM_V2_MAGIC).unwrap();
        for value in [16i16, 16, 8, 100, 200, 64] {
            buffer.write_i16::<LittleEndian>(value).unwrap();
        }
        buffer.extend_from_slice(&[10, 20]);
        buffer.write_u16::<LittleEndian>(2).unwrap();
        push_string(&mut buffer, "motd");
        push_string(&mut buffer, "hello");
        push_string(&mut buffer, ZONE_KEY);
        push_string(&mut buffer, "spleef 0 0 0 3 3 3 guest,,");
        buffer.extend_from_slice(&gzip(blocks).unwrap());
        buffer
    }

    #[test]
    fn loads_metadata_zones_and_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.fcm");
        let mut blocks = vec![1u8; 16 * 16 * 8];
        blocks[5] = 200;
        std::fs::write(&path, sample(&blocks)).unwrap();

        assert!(FcmV2Converter.claims(&path));
        let map = FcmV2Converter.load(&path).unwrap();
        assert_eq!((map.width_x(), map.width_y(), map.height()), (16, 16, 8));
        assert_eq!(map.spawn, Position::new(100, 200, 64, 10, 20));
        assert_eq!(map.get_meta(META_GROUP, "motd"), Some("hello"));
        assert_eq!(map.find_zone("spleef").unwrap().rank, "guest");
        // 未知ID被清零
        assert_eq!(map.blocks().unwrap()[5], 0);
        assert_eq!(map.blocks().unwrap()[6], 1);
    }

    #[test]
    fn header_load_ignores_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.fcm");
        std::fs::write(&path, sample(&[0u8; 10])).unwrap();

        let map = FcmV2Converter.load_header(&path).unwrap();
        assert_eq!(map.volume(), 16 * 16 * 8);
        assert!(!map.has_blocks());
        // 方块数量不对，完整加载必须失败
        assert!(FcmV2Converter.load(&path).unwrap_err().is_format_error());
    }

    #[test]
    fn save_is_not_supported() {
        let dir = TempDir::new().unwrap();
        let map = Map::new_blank(16, 16, 16).unwrap();
        let err = FcmV2Converter.save(&map, &dir.path().join("x.fcm")).unwrap_err();
        assert!(err.is_not_implemented());
    }
}
