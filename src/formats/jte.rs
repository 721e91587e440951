//! JTE服务端的 `.gz` 格式（整体gzip，大端）
//!
//! 签名只有一个版本字节，注册表里排在其他gzip格式之后。

use crate::{
    block::{BlockMapping, ALPHA_MAPPING},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{header_map, read_blocks},
    map::Map,
    types::{MapFormat, MapFormatType, Position},
    utils::has_extension,
};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;
use std::path::Path;

pub struct JteConverter;

fn is_known_version(version: u8) -> bool {
    matches!(version, 1 | 2)
}

impl JteConverter {
    fn read_map_header<R: Read>(reader: &mut R) -> Result<Map> {
        let version = reader.read_u8()?;
        if !is_known_version(version) {
            return Err(MapError::Format(format!("不支持的JTE版本: {}", version)));
        }

        // 出生点在尺寸之前，且按 X, H, Y 顺序
        let x = reader.read_i16::<BigEndian>()? as i32;
        let h = reader.read_i16::<BigEndian>()? as i32;
        let y = reader.read_i16::<BigEndian>()? as i32;
        let mut spawn = Position::from_blocks(x, y, h);
        spawn.r = reader.read_u8()?;
        spawn.l = reader.read_u8()?;

        let width_x = reader.read_i16::<BigEndian>()? as i32;
        let width_y = reader.read_i16::<BigEndian>()? as i32;
        let height = reader.read_i16::<BigEndian>()? as i32;

        header_map(width_x, width_y, height, Some(spawn))
    }
}

impl MapConverter for JteConverter {
    fn server_name(&self) -> &'static str {
        "JTE"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::Jte
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&ALPHA_MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "gz")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_gzip_prefix(path, 1).map(|prefix| is_known_version(prefix[0]));
        probe_result(self.format(), path, result)
    }

    fn load_header(&self, path: &Path) -> Result<Map> {
        let mut reader = open_gzip(path)?;
        decoded(Self::read_map_header(&mut reader))
    }

    fn load(&self, path: &Path) -> Result<Map> {
        let mut reader = open_gzip(path)?;
        decoded(Self::read_map_header(&mut reader).and_then(|mut map| {
            read_blocks(&mut reader, &mut map)?;
            map.convert_block_types(&ALPHA_MAPPING);
            Ok(map)
        }))
    }
}
