//! MinerCPP的 `.dat` 格式（整体gzip，大端），支持读写
//!
//! 与官方 `.dat` 同扩展名，靠三字节签名区分。

use crate::{
    block::{BlockMapping, ALPHA_MAPPING},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{blocks_for_save, header_map, read_blocks, short_field, write_gzip_atomically},
    map::Map,
    types::{MapFormat, MapFormatType, Position},
    utils::has_extension,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use std::path::Path;

pub const MINER_CPP_SIGNATURE: [u8; 3] = [0xBE, 0xEE, 0xEF];

pub struct MinerCppConverter;

impl MinerCppConverter {
    fn read_map_header<R: Read>(reader: &mut R) -> Result<Map> {
        let mut signature = [0u8; 3];
        reader.read_exact(&mut signature)?;
        if signature != MINER_CPP_SIGNATURE {
            return Err(MapError::Format(format!("无效的MinerCPP签名: {:02x?}", signature)));
        }

        let width_x = reader.read_i16::<BigEndian>()? as i32;
        let height = reader.read_i16::<BigEndian>()? as i32;
        let width_y = reader.read_i16::<BigEndian>()? as i32;

        // 出生点已经是定点单位
        let x = reader.read_i16::<BigEndian>()? as i32;
        let h = reader.read_i16::<BigEndian>()? as i32;
        let y = reader.read_i16::<BigEndian>()? as i32;
        let r = reader.read_u8()?;
        let l = reader.read_u8()?;

        header_map(width_x, width_y, height, Some(Position::new(x, y, h, r, l)))
    }

    fn read_map<R: Read>(reader: &mut R) -> Result<Map> {
        let mut map = Self::read_map_header(reader)?;
        // 方块数量字段已无意义，只为对齐读取
        reader.read_i32::<BigEndian>()?;
        read_blocks(reader, &mut map)?;
        map.convert_block_types(&ALPHA_MAPPING);
        Ok(map)
    }

    fn write_map<W: Write>(writer: &mut W, map: &Map) -> Result<()> {
        let blocks = blocks_for_save(map)?;
        let spawn = [
            short_field("出生点X", map.spawn.x)?,
            short_field("出生点H", map.spawn.h)?,
            short_field("出生点Y", map.spawn.y)?,
        ];

        writer.write_all(&MINER_CPP_SIGNATURE)?;
        writer.write_i16::<BigEndian>(map.width_x() as i16)?;
        writer.write_i16::<BigEndian>(map.height() as i16)?;
        writer.write_i16::<BigEndian>(map.width_y() as i16)?;
        for value in spawn {
            writer.write_i16::<BigEndian>(value)?;
        }
        writer.write_u8(map.spawn.r)?;
        writer.write_u8(map.spawn.l)?;
        writer.write_i32::<BigEndian>(blocks.len() as i32)?;
        writer.write_all(blocks)?;
        Ok(())
    }
}

impl MapConverter for MinerCppConverter {
    fn server_name(&self) -> &'static str {
        "MinerCPP"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::MinerCPP
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&ALPHA_MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "dat")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_gzip_prefix(path, 3).map(|prefix| prefix[..] == MINER_CPP_SIGNATURE);
        probe_result(self.format(), path, result)
    }

    fn load_header(&self, path: &Path) -> Result<Map> {
        let mut reader = open_gzip(path)?;
        decoded(Self::read_map_header(&mut reader))
    }

    fn load(&self, path: &Path) -> Result<Map> {
        let mut reader = open_gzip(path)?;
        decoded(Self::read_map(&mut reader))
    }

    fn save(&self, map: &Map, path: &Path) -> Result<()> {
        write_gzip_atomically(path, |writer| Self::write_map(writer, map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::compression::gunzip;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_keeps_raw_spawn() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server_level.dat");

        let mut map = Map::new_blank(32, 16, 64).unwrap();
        map.set_block(31, 15, 63, Block::Sponge.id());
        map.set_spawn(Position::new(33, 65, 97, 1, 2));
        MinerCppConverter.save(&map, &path).unwrap();

        assert!(MinerCppConverter.claims(&path));
        let back = MinerCppConverter.load(&path).unwrap();
        assert_eq!((back.width_x(), back.width_y(), back.height()), (32, 16, 64));
        assert_eq!(back.spawn, map.spawn);
        assert_eq!(back.blocks(), map.blocks());
    }

    #[test]
    fn widest_map_spawn_survives_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server_level.dat");

        let map = Map::new_blank(2048, 16, 16).unwrap();
        MinerCppConverter.save(&map, &path).unwrap();
        let back = MinerCppConverter.load(&path).unwrap();
        assert_eq!(back.spawn.x, i16::MAX as i32);
        assert_eq!(back.spawn, map.spawn);
    }

    #[test]
    fn spawn_beyond_16_bits_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server_level.dat");

        let mut map = Map::new_blank(16, 16, 16).unwrap();
        map.set_spawn(Position::new(32768, 0, 0, 0, 0));
        assert!(MinerCppConverter.save(&map, &path).unwrap_err().is_format_error());
        assert!(!path.exists());
    }

    #[test]
    fn dimensions_are_written_x_h_y() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server_level.dat");
        let map = Map::new_blank(16, 48, 32).unwrap();
        MinerCppConverter.save(&map, &path).unwrap();

        let raw = gunzip(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(&raw[..3], &MINER_CPP_SIGNATURE);
        assert_eq!(&raw[3..9], &[0, 16, 0, 32, 0, 48]);
        assert_eq!(raw.len(), 3 + 6 + 6 + 2 + 4 + 16 * 48 * 32);
    }
}
