//! FCMv3：本项目的原生格式，也是唯一必须支持写出的格式
//!
//! 头部、出生点和数据层索引不压缩；元数据和所有数据层放在同一个deflate流中。

pub mod header;
pub mod layer;

use self::header::{read_header, write_header, FcmHeader};
use self::layer::{read_layer_index, write_layer_index, LayerIndexEntry, LayerType};
use crate::{
    compression::{deflate, inflate},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{blocks_for_save, header_map, write_atomically},
    map::Map,
    types::{MapFormat, MapFormatType},
    utils::{has_extension, read_file_prefix, read_string_i32, read_vec, write_string_i32},
    zone::Zone,
    FCM_V3_MAGIC, FCM_V3_REVISION, ZONE_META_GROUP,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, TimeZone, Utc};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;

pub struct FcmV3Converter;

fn to_timestamp(date: DateTime<Utc>) -> u32 {
    date.timestamp().clamp(0, u32::MAX as i64) as u32
}

fn from_timestamp(seconds: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds as i64, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

impl FcmV3Converter {
    fn read_map_header<R: Read>(reader: &mut R) -> Result<Map> {
        let header = read_header(reader)?;
        let mut map = header_map(
            header.width_x as i32,
            header.width_y as i32,
            header.height as i32,
            Some(header.spawn),
        )?;
        map.guid = header.guid;
        map.date_modified = from_timestamp(header.date_modified);
        map.date_created = from_timestamp(header.date_created);
        Ok(map)
    }

    fn read_map<R: Read>(reader: &mut R) -> Result<Map> {
        let mut map = Self::read_map_header(reader)?;

        let layers = read_layer_index(reader)?;
        let meta_count = reader.read_i32::<LittleEndian>()?;
        if meta_count < 0 {
            return Err(MapError::Format(format!("元数据条目数无效: {}", meta_count)));
        }

        let mut compressed = Vec::new();
        reader.read_to_end(&mut compressed)?;
        let data = inflate(&compressed)?;
        let mut cursor = Cursor::new(data.as_slice());

        for _ in 0..meta_count {
            let group = read_string_i32::<LittleEndian, _>(&mut cursor)?;
            let key = read_string_i32::<LittleEndian, _>(&mut cursor)?;
            let value = read_string_i32::<LittleEndian, _>(&mut cursor)?;
            if group == ZONE_META_GROUP {
                map.add_zone(Zone::parse(&value)?)?;
            } else {
                map.set_meta(group, key, value);
            }
        }

        for entry in &layers {
            Self::read_layer(&mut cursor, entry, &mut map)?;
        }

        if !map.has_blocks() {
            return Err(MapError::Format("缺少方块数据层".to_string()));
        }
        Ok(map)
    }

    fn read_layer(cursor: &mut Cursor<&[u8]>, entry: &LayerIndexEntry, map: &mut Map) -> Result<()> {
        let position = cursor.position() as i64;
        if entry.offset < position || entry.offset as u64 > cursor.get_ref().len() as u64 {
            return Err(MapError::Format(format!(
                "数据层偏移 {} 无效（当前位置 {}）",
                entry.offset, position
            )));
        }
        cursor.set_position(entry.offset as u64);
        let payload = read_vec(cursor, entry.byte_len()?)?;

        match LayerType::from_u8(entry.layer_type) {
            Some(LayerType::Blocks) => {
                if entry.element_size != 1 {
                    return Err(MapError::Format(format!(
                        "方块数据层的元素大小应为1，实际为 {}",
                        entry.element_size
                    )));
                }
                map.set_blocks(payload)
            }
            other => {
                log::debug!("跳过FCMv3数据层 {:?}（类型 {}）", other, entry.layer_type);
                Ok(())
            }
        }
    }

    fn write_map<W: Write>(writer: &mut W, map: &Map) -> Result<()> {
        let blocks = blocks_for_save(map)?;

        // 元数据与方块数据先在内存中拼成一个区域，再整体压缩
        let mut region = Vec::new();
        let mut meta_count = 0i32;
        for (group, key, value) in map.meta_entries() {
            if group == ZONE_META_GROUP {
                continue;
            }
            write_string_i32::<LittleEndian, _>(&mut region, group)?;
            write_string_i32::<LittleEndian, _>(&mut region, key)?;
            write_string_i32::<LittleEndian, _>(&mut region, value)?;
            meta_count += 1;
        }
        for zone in map.zones() {
            write_string_i32::<LittleEndian, _>(&mut region, ZONE_META_GROUP)?;
            write_string_i32::<LittleEndian, _>(&mut region, &zone.name)?;
            write_string_i32::<LittleEndian, _>(&mut region, &zone.serialize())?;
            meta_count += 1;
        }

        let blocks_entry = LayerIndexEntry {
            layer_type: LayerType::Blocks as u8,
            offset: region.len() as i64,
            compressed_length: 0,
            general_purpose: 0,
            element_size: 1,
            element_count: blocks.len() as i32,
        };
        region.extend_from_slice(blocks);

        let header = FcmHeader {
            width_x: map.width_x() as i16,
            height: map.height() as i16,
            width_y: map.width_y() as i16,
            spawn: map.spawn,
            date_modified: to_timestamp(map.date_modified),
            date_created: to_timestamp(map.date_created),
            guid: map.guid,
        };
        write_header(writer, &header)?;
        write_layer_index(writer, &[blocks_entry])?;
        writer.write_i32::<LittleEndian>(meta_count)?;
        writer.write_all(&deflate(&region)?)?;

        Ok(())
    }
}

impl MapConverter for FcmV3Converter {
    fn server_name(&self) -> &'static str {
        "fCraft"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::FCMv3
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "fcm")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_file_prefix(path, 5).map(|prefix| {
            prefix[..4] == FCM_V3_MAGIC.to_le_bytes() && prefix[4] == FCM_V3_REVISION
        });
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

    fn save(&self, map: &Map, path: &Path) -> Result<()> {
        write_atomically(path, |writer| Self::write_map(writer, map))
    }
}
