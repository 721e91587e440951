//! D3服务端的 `.map` 格式（整体gzip，大端）

use crate::{
    block::{build_mapping_with, Block, BlockMapping, ALPHA_BLOCKS},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{header_map, read_blocks},
    map::Map,
    types::{MapFormat, MapFormatType, Position},
    utils::has_extension,
};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::Read;
use std::path::Path;

/// 已知的文件版本号
const VERSIONS: [i32; 6] = [1000, 1010, 1020, 1030, 1040, 1050];

/// 从这个版本开始记录出生点
const SPAWN_VERSION: i32 = 1020;
/// 从这个版本开始记录朝向
const ORIENTATION_VERSION: i32 = 1030;

/// D3的自定义方块
const D3_EXTRA: [(u8, Block); 10] = [
    (92, Block::Red),          // 蛋糕
    (100, Block::Glass),       // 管理员玻璃
    (101, Block::Obsidian),    // 管理员黑曜石
    (102, Block::Brick),       // 管理员砖块
    (103, Block::Stone),       // 管理员石头
    (104, Block::Water),       // 活动水
    (105, Block::Lava),        // 活动岩浆
    (110, Block::Log),         // 门
    (111, Block::Air),         // 打开的门
    (112, Block::TNT),         // 爆炸物
];

static MAPPING: BlockMapping = build_mapping_with(&ALPHA_BLOCKS, &D3_EXTRA);

pub struct D3Converter;

impl D3Converter {
    fn read_map_header<R: Read>(reader: &mut R) -> Result<Map> {
        let version = reader.read_i32::<BigEndian>()?;
        if !VERSIONS.contains(&version) {
            return Err(MapError::Format(format!("不支持的D3版本: {}", version)));
        }

        let width_x = reader.read_i16::<BigEndian>()? as i32;
        let width_y = reader.read_i16::<BigEndian>()? as i32;
        let height = reader.read_i16::<BigEndian>()? as i32;

        let spawn = if version >= SPAWN_VERSION {
            let x = reader.read_i16::<BigEndian>()? as i32;
            let y = reader.read_i16::<BigEndian>()? as i32;
            let h = reader.read_i16::<BigEndian>()? as i32;
            let mut spawn = Position::from_blocks(x, y, h);
            if version >= ORIENTATION_VERSION {
                spawn.r = reader.read_u8()?;
                spawn.l = reader.read_u8()?;
            }
            Some(spawn)
        } else {
            None
        };

        header_map(width_x, width_y, height, spawn)
    }
}

impl MapConverter for D3Converter {
    fn server_name(&self) -> &'static str {
        "D3"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::D3
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "map")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_gzip_prefix(path, 4).map(|prefix| VERSIONS.contains(&BigEndian::read_i32(&prefix)));
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
            map.convert_block_types(&MAPPING);
            Ok(map)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::gzip;
    use byteorder::WriteBytesExt;
    use tempfile::TempDir;

    fn sample(version: i32, blocks: &[u8]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.write_i32::<BigEndian>(version).unwrap();
        for value in [16i16, 32, 8] {
            raw.write_i16::<BigEndian>(value).unwrap();
        }
        if version >= SPAWN_VERSION {
            for value in [2i16, 3, 4] {
                raw.write_i16::<BigEndian>(value).unwrap();
            }
        }
        if version >= ORIENTATION_VERSION {
            raw.extend_from_slice(&[64, 128]);
        }
        raw.extend_from_slice(blocks);
        gzip(&raw).unwrap()
    }

    #[test]
    fn newest_version_carries_spawn_and_orientation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.map");
        let mut blocks = vec![3u8; 16 * 32 * 8];
        blocks[0] = 101;
        blocks[1] = 255;
        std::fs::write(&path, sample(1050, &blocks)).unwrap();

        assert!(D3Converter.claims(&path));
        let map = D3Converter.load(&path).unwrap();
        assert_eq!((map.width_x(), map.width_y(), map.height()), (16, 32, 8));
        assert_eq!(map.spawn, Position::new(64, 96, 128, 64, 128));
        assert_eq!(map.blocks().unwrap()[0], Block::Obsidian.id());
        assert_eq!(map.blocks().unwrap()[1], Block::Air.id());
        assert_eq!(map.blocks().unwrap()[2], Block::Dirt.id());
    }

    #[test]
    fn old_versions_fall_back_to_center_spawn() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.map");
        std::fs::write(&path, sample(1000, &vec![0u8; 16 * 32 * 8])).unwrap();

        let map = D3Converter.load_header(&path).unwrap();
        assert_eq!(map.spawn, Position::new(16 * 16, 32 * 16, 8 * 32, 0, 0));

        let map = D3Converter.load(&path).unwrap();
        assert_eq!(map.blocks().unwrap().len(), 16 * 32 * 8);
    }

    #[test]
    fn unknown_version_is_not_claimed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.map");
        std::fs::write(&path, sample(999, &[])).unwrap();

        assert!(!D3Converter.claims(&path));
        assert!(D3Converter.load(&path).unwrap_err().is_format_error());
    }
}
