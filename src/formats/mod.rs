//! 各种地图格式的编解码器

pub mod d3;
pub mod dat;
pub mod fcm_v2;
pub mod fcm_v3;
pub mod indev;
pub mod jte;
pub mod mcsharp;
pub mod miner_cpp;
pub mod myne;

pub use d3::D3Converter;
pub use dat::DatConverter;
pub use fcm_v2::FcmV2Converter;
pub use fcm_v3::FcmV3Converter;
pub use indev::IndevConverter;
pub use jte::JteConverter;
pub use mcsharp::MCSharpConverter;
pub use miner_cpp::MinerCppConverter;
pub use myne::MyneConverter;

use crate::{
    compression::{create_gzip, finish_gzip},
    converter::MapConverter,
    error::{MapError, Result},
    map::Map,
    types::Position,
    utils::read_vec,
};
use flate2::write::GzEncoder;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// 按探测优先级排列的全部内置转换器
///
/// 探测较弱的格式（JTE只有一个版本字节）排在靠后的位置。
pub fn all_converters() -> Vec<Box<dyn MapConverter>> {
    vec![
        Box::new(FcmV3Converter),
        Box::new(FcmV2Converter),
        Box::new(MCSharpConverter),
        Box::new(D3Converter),
        Box::new(DatConverter),
        Box::new(MinerCppConverter),
        Box::new(JteConverter),
        Box::new(MyneConverter),
        Box::new(IndevConverter),
    ]
}

/// 由头部字段构造地图并做尺寸检查，检查通过前不读取任何方块数据
pub(crate) fn header_map(width_x: i32, width_y: i32, height: i32, spawn: Option<Position>) -> Result<Map> {
    let mut map = Map::new(width_x, width_y, height);
    map.validate_header()?;
    if let Some(spawn) = spawn {
        map.set_spawn(spawn);
    }
    Ok(map)
}

/// 方块坐标换算为定点单位（每格32），溢出时报格式错误
pub(crate) fn fixed_point(block: i32, offset: i32) -> Result<i32> {
    block
        .checked_mul(32)
        .and_then(|value| value.checked_add(offset))
        .ok_or_else(|| MapError::Format(format!("出生点坐标超出范围: {}", block)))
}

/// 写入16位字段前的范围检查
pub(crate) fn short_field(label: &str, value: i32) -> Result<i16> {
    i16::try_from(value).map_err(|_| MapError::Format(format!("{} {} 超出16位范围", label, value)))
}

/// 读取与地图体积等长的扁平方块数组
pub(crate) fn read_blocks<R: Read>(reader: &mut R, map: &mut Map) -> Result<()> {
    let blocks = read_vec(reader, map.volume())?;
    map.set_blocks(blocks)
}

/// 保存时要求地图带有完整的方块数组
pub(crate) fn blocks_for_save(map: &Map) -> Result<&[u8]> {
    map.validate_header()?;
    map.blocks()
        .ok_or_else(|| MapError::Format("地图只有头部，没有方块数据可保存".to_string()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp: OsString = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

/// 先写入临时文件，成功后再替换目标文件，失败时目标文件保持原样
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    let result: Result<()> = File::create(&temp).map_err(MapError::from).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        Ok(())
    });

    finish_atomic(&temp, path, result)
}

/// 同 `write_atomically`，但整个文件是gzip流
pub(crate) fn write_gzip_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut GzEncoder<BufWriter<File>>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    let result = create_gzip(&temp).and_then(|mut encoder| {
        write(&mut encoder)?;
        finish_gzip(encoder)
    });

    finish_atomic(&temp, path, result)
}

fn finish_atomic(temp: &Path, path: &Path, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => {
            fs::rename(temp, path)?;
            Ok(())
        }
        Err(err) => {
            let _ = fs::remove_file(temp);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MapFormat;
    use std::collections::HashSet;

    #[test]
    fn every_format_has_exactly_one_converter() {
        let formats: HashSet<MapFormat> = all_converters().iter().map(|c| c.format()).collect();
        assert_eq!(formats.len(), MapFormat::ALL.len());
        for format in MapFormat::ALL {
            assert!(formats.contains(&format));
        }
    }

    #[test]
    fn remap_tables_are_identity_below_boundary_and_idempotent() {
        for converter in all_converters() {
            let Some(mapping) = converter.block_mapping() else {
                continue;
            };
            for id in 0..crate::VANILLA_ID_BOUNDARY {
                assert_eq!(mapping[id as usize], id, "{} 映射了通用ID {}", converter.format(), id);
            }
            for id in 0..=255u8 {
                let once = mapping[id as usize];
                let twice = mapping[once as usize];
                assert_eq!(once, twice, "{} 对ID {} 不是幂等的", converter.format(), id);
                assert!(crate::block::Block::is_known(once));
            }
        }
    }

    #[test]
    fn oversized_values_are_format_errors() {
        assert_eq!(fixed_point(3, 16).unwrap(), 112);
        assert!(fixed_point(i32::MAX, 16).unwrap_err().is_format_error());
        assert!(fixed_point(i32::MIN / 16, 0).unwrap_err().is_format_error());
        assert_eq!(short_field("x", -32768).unwrap(), i16::MIN);
        assert!(short_field("x", 32768).unwrap_err().is_format_error());
    }

    #[test]
    fn header_map_rejects_huge_dimensions_without_overflow() {
        let err = header_map(i32::MAX, 16, 16, None).unwrap_err();
        assert!(err.is_format_error());
        assert!(header_map(16, i32::MIN, 16, None).is_err());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file_behind() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        write_atomically(&path, |w| {
            w.write_all(b"abc")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        assert!(!temp_path(&path).exists());

        let failed = write_atomically(&path, |_| Err(MapError::Format("x".into())));
        assert!(failed.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        assert!(!temp_path(&path).exists());
    }
}
