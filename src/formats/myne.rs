//! Myne的目录格式：`world.meta`（INI文本）+ `blocks.gz`

use crate::{
    block::{BlockMapping, ALPHA_MAPPING},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::{fixed_point, header_map, read_blocks},
    map::{Map, Metadata},
    types::{MapFormat, MapFormatType, Position},
};
use byteorder::{BigEndian, ReadBytesExt};
use std::fs;
use std::path::Path;

pub const META_FILE_NAME: &str = "world.meta";
pub const BLOCKS_FILE_NAME: &str = "blocks.gz";

/// 解析INI文本：`[节]` 开始新节，`键=值` 归入当前节，`;` 和 `#` 开头的行是注释
fn parse_ini(text: &str) -> Metadata {
    let mut sections = Metadata::new();
    let mut current = String::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = name.trim().to_ascii_lowercase();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    sections
}

fn ini_int(sections: &Metadata, section: &str, key: &str) -> Result<Option<i32>> {
    match sections.get(section).and_then(|s| s.get(key)) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| MapError::Format(format!("world.meta中 [{}] {} 的值无效: {:?}", section, key, raw))),
        None => Ok(None),
    }
}

fn required_int(sections: &Metadata, section: &str, key: &str) -> Result<i32> {
    ini_int(sections, section, key)?
        .ok_or_else(|| MapError::Format(format!("world.meta缺少 [{}] {}", section, key)))
}

pub struct MyneConverter;

impl MyneConverter {
    fn read_map_header(dir: &Path) -> Result<Map> {
        let text = fs::read_to_string(dir.join(META_FILE_NAME))?;
        let sections = parse_ini(&text);

        // Myne的y是竖直方向
        let width_x = required_int(&sections, "size", "x")?;
        let height = required_int(&sections, "size", "y")?;
        let width_y = required_int(&sections, "size", "z")?;

        let spawn = match (
            ini_int(&sections, "spawn", "x")?,
            ini_int(&sections, "spawn", "y")?,
            ini_int(&sections, "spawn", "z")?,
        ) {
            (Some(x), Some(y), Some(z)) => {
                let mut spawn = Position::new(
                    fixed_point(x, 0)?,
                    fixed_point(z, 0)?,
                    fixed_point(y, 0)?,
                    0,
                    0,
                );
                spawn.r = ini_int(&sections, "spawn", "h")?.unwrap_or(0) as u8;
                Some(spawn)
            }
            _ => None,
        };

        let mut map = header_map(width_x, width_y, height, spawn)?;
        for (section, entries) in sections.iter().filter(|(s, _)| !matches!(s.as_str(), "size" | "spawn")) {
            for (key, value) in entries {
                map.set_meta(format!("Myne.{}", section), key.clone(), value.clone());
            }
        }
        Ok(map)
    }

    fn read_map(dir: &Path) -> Result<Map> {
        let mut map = Self::read_map_header(dir)?;

        let mut reader = open_gzip(dir.join(BLOCKS_FILE_NAME))?;
        let count = reader.read_i32::<BigEndian>()?;
        if count < 0 || count as usize != map.volume() {
            return Err(MapError::Format(format!(
                "blocks.gz中的方块数 {} 与地图体积 {} 不符",
                count,
                map.volume()
            )));
        }
        read_blocks(&mut reader, &mut map)?;
        map.convert_block_types(&ALPHA_MAPPING);
        Ok(map)
    }
}

impl MapConverter for MyneConverter {
    fn server_name(&self) -> &'static str {
        "Myne/MyneCraft/HyveBuild/iCraft"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::Directory
    }

    fn format(&self) -> MapFormat {
        MapFormat::Myne
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&ALPHA_MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        path.join(META_FILE_NAME).is_file()
    }

    fn claims(&self, path: &Path) -> bool {
        if !path.is_dir() || !path.join(META_FILE_NAME).is_file() {
            return false;
        }
        let result = read_gzip_prefix(path.join(BLOCKS_FILE_NAME), 4).map(|_| true);
        probe_result(self.format(), path, result)
    }

    fn load_header(&self, path: &Path) -> Result<Map> {
        decoded(Self::read_map_header(path))
    }

    fn load(&self, path: &Path) -> Result<Map> {
        decoded(Self::read_map(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::gzip;
    use byteorder::WriteBytesExt;
    use tempfile::TempDir;

    const META: &str = "\
; Myne world
[size]
x=16
y=32
z=64

[spawn]
x=2
y=3
z=4
h=128

[Owner]
name=someone
";

    fn write_world(dir: &Path, meta: &str, blocks: &[u8]) {
        fs::write(dir.join(META_FILE_NAME), meta).unwrap();
        let mut raw = Vec::new();
        raw.write_i32::<BigEndian>(blocks.len() as i32).unwrap();
        raw.extend_from_slice(blocks);
        fs::write(dir.join(BLOCKS_FILE_NAME), gzip(&raw).unwrap()).unwrap();
    }

    #[test]
    fn loads_directory_world() {
        let dir = TempDir::new().unwrap();
        write_world(dir.path(), META, &vec![2u8; 16 * 32 * 64]);

        assert!(MyneConverter.claims_name(dir.path()));
        assert!(MyneConverter.claims(dir.path()));
        let map = MyneConverter.load(dir.path()).unwrap();
        assert_eq!((map.width_x(), map.width_y(), map.height()), (16, 64, 32));
        assert_eq!(map.spawn, Position::new(64, 128, 96, 128, 0));
        assert_eq!(map.get_meta("Myne.owner", "name"), Some("someone"));
        assert_eq!(map.blocks().unwrap().len(), 16 * 32 * 64);
    }

    #[test]
    fn missing_size_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        write_world(dir.path(), "[size]\nx=16\n", &[]);
        assert!(MyneConverter.load_header(dir.path()).unwrap_err().is_format_error());
    }

    #[test]
    fn spawn_out_of_range_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let meta = META.replace("x=2", "x=2147483647");
        write_world(dir.path(), &meta, &vec![0u8; 16 * 32 * 64]);
        assert!(MyneConverter.load_header(dir.path()).unwrap_err().is_format_error());
    }

    #[test]
    fn block_count_must_match_volume() {
        let dir = TempDir::new().unwrap();
        write_world(dir.path(), META, &[1, 2, 3]);
        assert!(MyneConverter.load_header(dir.path()).is_ok());
        assert!(MyneConverter.load(dir.path()).unwrap_err().is_format_error());
    }

    #[test]
    fn plain_files_are_not_claimed() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("world.meta");
        fs::write(&file, META).unwrap();
        assert!(!MyneConverter.claims(&file));
    }
}
