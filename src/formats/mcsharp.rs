//! MCSharp的 `.lvl` 格式（整体gzip，小端），支持读写

use crate::{
    block::{build_mapping_with, Block, BlockMapping, ALPHA_BLOCKS},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{blocks_for_save, header_map, read_blocks, short_field, write_gzip_atomically},
    map::Map,
    types::{MapFormat, MapFormatType, Position},
    utils::has_extension,
};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use std::path::Path;

/// 文件头魔数（小端u16）
pub const LVL_MAGIC: u16 = 0x0752;

/// MCSharp的物理/特殊方块，全部退化为外观最接近的普通方块
const MCSHARP_EXTRA: [(u8, Block); 48] = [
    (100, Block::Glass),          // op_glass
    (101, Block::Obsidian),       // opsidian
    (102, Block::Brick),          // op_brick
    (103, Block::Stone),          // op_stone
    (104, Block::Cobblestone),    // op_cobblestone
    (105, Block::Air),            // op_air
    (106, Block::Water),          // op_water
    (110, Block::Wood),           // wood_float
    (111, Block::Log),            // door
    (112, Block::Lava),           // lava_fast
    (113, Block::Obsidian),       // door2
    (114, Block::Glass),          // door3
    (115, Block::Stone),          // door4
    (116, Block::Leaves),         // door5
    (117, Block::Sand),           // door6
    (118, Block::Wood),           // door7
    (119, Block::Green),          // door8
    (120, Block::TNT),            // door9
    (121, Block::Stair),          // door10
    (122, Block::Log),            // tdoor
    (123, Block::Obsidian),       // tdoor2
    (124, Block::Glass),          // tdoor3
    (125, Block::Stone),          // tdoor4
    (126, Block::Leaves),         // tdoor5
    (127, Block::Sand),           // tdoor6
    (128, Block::Wood),           // tdoor7
    (129, Block::Green),          // tdoor8
    (130, Block::White),          // MsgWhite
    (131, Block::Black),          // MsgBlack
    (132, Block::Air),            // MsgAir
    (133, Block::Water),          // MsgWater
    (134, Block::Lava),           // MsgLava
    (135, Block::TNT),            // tdoor9
    (136, Block::Stair),          // tdoor10
    (140, Block::Water),          // WaterDown
    (141, Block::Lava),           // LavaDown
    (143, Block::Water),          // WaterFaucet
    (144, Block::Lava),           // LavaFaucet
    (145, Block::Water),          // finiteWater
    (146, Block::Lava),           // finiteLava
    (147, Block::Cyan),           // finiteFaucet
    (160, Block::Air),            // air_portal
    (161, Block::Water),          // water_portal
    (162, Block::Lava),           // lava_portal
    (175, Block::Blue),           // blue_portal
    (176, Block::Orange),         // orange_portal
    (182, Block::TNT),            // smalltnt
    (185, Block::Lava),           // fire
];

static MAPPING: BlockMapping = build_mapping_with(&ALPHA_BLOCKS, &MCSHARP_EXTRA);

pub struct MCSharpConverter;

impl MCSharpConverter {
    fn read_map_header<R: Read>(reader: &mut R) -> Result<Map> {
        let magic = reader.read_u16::<LittleEndian>()?;
        if magic != LVL_MAGIC {
            return Err(MapError::Format(format!("无效的.lvl魔数: {:#06x}", magic)));
        }

        let width_x = reader.read_i16::<LittleEndian>()? as i32;
        let width_y = reader.read_i16::<LittleEndian>()? as i32;
        let height = reader.read_i16::<LittleEndian>()? as i32;

        let x = reader.read_i16::<LittleEndian>()? as i32;
        let y = reader.read_i16::<LittleEndian>()? as i32;
        let h = reader.read_i16::<LittleEndian>()? as i32;
        let mut spawn = Position::from_blocks(x, y, h);
        spawn.r = reader.read_u8()?;
        spawn.l = reader.read_u8()?;

        // 访问权限和建造权限，不转换
        reader.read_u8()?;
        reader.read_u8()?;

        header_map(width_x, width_y, height, Some(spawn))
    }

    fn write_map<W: Write>(writer: &mut W, map: &Map) -> Result<()> {
        let blocks = blocks_for_save(map)?;
        let (x, y, h) = map.spawn.to_blocks();

        writer.write_u16::<LittleEndian>(LVL_MAGIC)?;
        writer.write_i16::<LittleEndian>(map.width_x() as i16)?;
        writer.write_i16::<LittleEndian>(map.width_y() as i16)?;
        writer.write_i16::<LittleEndian>(map.height() as i16)?;
        writer.write_i16::<LittleEndian>(short_field("出生点X", x)?)?;
        writer.write_i16::<LittleEndian>(short_field("出生点Y", y)?)?;
        writer.write_i16::<LittleEndian>(short_field("出生点H", h)?)?;
        writer.write_u8(map.spawn.r)?;
        writer.write_u8(map.spawn.l)?;
        writer.write_u8(0)?;
        writer.write_u8(0)?;
        writer.write_all(blocks)?;
        Ok(())
    }
}

impl MapConverter for MCSharpConverter {
    fn server_name(&self) -> &'static str {
        "MCSharp"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::MCSharp
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "lvl")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_gzip_prefix(path, 2).map(|prefix| LittleEndian::read_u16(&prefix) == LVL_MAGIC);
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

    fn save(&self, map: &Map, path: &Path) -> Result<()> {
        write_gzip_atomically(path, |writer| Self::write_map(writer, map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_keeps_blocks_and_spawn() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.lvl");

        let mut map = Map::new_blank(16, 32, 16).unwrap();
        map.set_block(3, 4, 5, Block::Gold.id());
        map.set_spawn(Position::new(5 * 32, 6 * 32, 7 * 32, 12, 34));
        MCSharpConverter.save(&map, &path).unwrap();

        assert!(MCSharpConverter.claims(&path));
        let back = MCSharpConverter.load(&path).unwrap();
        assert_eq!((back.width_x(), back.width_y(), back.height()), (16, 32, 16));
        assert_eq!(back.spawn, map.spawn);
        assert_eq!(back.blocks(), map.blocks());
    }

    #[test]
    fn spawn_beyond_16_bits_fails_to_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.lvl");

        let mut map = Map::new_blank(16, 16, 16).unwrap();
        map.set_spawn(Position::new(0, 40_000 * 32, 0, 0, 0));
        assert!(MCSharpConverter.save(&map, &path).unwrap_err().is_format_error());
        assert!(!path.exists());
    }

    #[test]
    fn physics_blocks_are_remapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.lvl");

        let mut map = Map::new_blank(16, 16, 16).unwrap();
        map.blocks_mut().unwrap()[0] = 101;
        map.blocks_mut().unwrap()[1] = 250;
        MCSharpConverter.save(&map, &path).unwrap();

        let back = MCSharpConverter.load(&path).unwrap();
        assert_eq!(back.blocks().unwrap()[0], Block::Obsidian.id());
        assert_eq!(back.blocks().unwrap()[1], Block::Air.id());
    }
}
