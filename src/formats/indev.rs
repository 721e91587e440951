//! Indev的 `.mclevel` 存档：gzip压缩的NBT标签树，只读
//!
//! 尺寸位于整棵标签树内部，不提供只读头部的加载。

use crate::{
    block::{BlockMapping, ALPHA_MAPPING},
    compression::{open_gzip, read_gzip_prefix},
    converter::{decoded, probe_result, MapConverter},
    error::{MapError, Result},
    formats::header_map,
    map::Map,
    nbt::{NamedTag, NodeRef, TagType},
    types::{MapFormat, MapFormatType, Position},
    utils::has_extension,
};
use chrono::{TimeZone, Utc};
use std::path::Path;

pub const ROOT_NAME: &str = "MinecraftLevel";

/// 存放 `About` 中作者信息的元数据组
pub const META_GROUP: &str = "Indev";

fn child<'a>(node: &'a NodeRef<'a>, name: &str) -> Result<NodeRef<'a>> {
    node.child(name)
        .ok_or_else(|| MapError::Format(format!("缺少 {}.{}", node.full_name(), name)))
}

fn short_field(node: &NodeRef, name: &str) -> Result<i16> {
    let field = child(node, name)?;
    field
        .tag()
        .as_short()
        .ok_or_else(|| MapError::Format(format!("{} 应为 {}", field.full_name(), TagType::Short)))
}

fn read_spawn(map_node: &NodeRef) -> Result<Option<Position>> {
    let Some(spawn) = map_node.child("Spawn") else {
        return Ok(None);
    };
    let coords = spawn
        .tag()
        .as_list()
        .filter(|items| items.len() == 3)
        .and_then(|items| {
            let values: Option<Vec<i16>> = items.iter().map(|item| item.as_short()).collect();
            values
        })
        .ok_or_else(|| MapError::Format(format!("{} 应为3个 {}", spawn.full_name(), TagType::Short)))?;

    // Indev的y是竖直方向
    let (x, h, y) = (coords[0] as i32, coords[1] as i32, coords[2] as i32);
    Ok(Some(Position::from_blocks(x, y, h)))
}

fn read_about(about: &NodeRef, map: &mut Map) {
    for key in ["Name", "Author"] {
        if let Some(value) = about.child(key).and_then(|node| node.tag().as_str().map(str::to_string)) {
            map.set_meta(META_GROUP, key, value);
        }
    }
    let created = about
        .child("CreatedOn")
        .and_then(|node| node.tag().as_long())
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
    if let Some(created) = created {
        map.date_created = created;
    }
}

fn read_map(root: &NamedTag) -> Result<Map> {
    if root.name != ROOT_NAME {
        return Err(MapError::Format(format!("根标签名称应为 {}，实际为 {}", ROOT_NAME, root.name)));
    }
    let root = NodeRef::root(root);
    let map_node = child(&root, "Map")?;

    let width_x = short_field(&map_node, "Width")? as i32;
    let width_y = short_field(&map_node, "Length")? as i32;
    let height = short_field(&map_node, "Height")? as i32;
    let spawn = read_spawn(&map_node)?;
    let mut map = header_map(width_x, width_y, height, spawn)?;

    let blocks_node = child(&map_node, "Blocks")?;
    let blocks = blocks_node
        .tag()
        .as_bytes()
        .ok_or_else(|| MapError::Format(format!("{} 应为 {}", blocks_node.full_name(), TagType::Bytes)))?;
    map.set_blocks(blocks.to_vec())?;
    map.convert_block_types(&ALPHA_MAPPING);

    if let Some(about) = root.child("About") {
        read_about(&about, &mut map);
    }
    Ok(map)
}

pub struct IndevConverter;

impl MapConverter for IndevConverter {
    fn server_name(&self) -> &'static str {
        "Indev"
    }

    fn format_type(&self) -> MapFormatType {
        MapFormatType::SingleFile
    }

    fn format(&self) -> MapFormat {
        MapFormat::Nbt
    }

    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        Some(&ALPHA_MAPPING)
    }

    fn claims_name(&self, path: &Path) -> bool {
        has_extension(path, "mclevel")
    }

    fn claims(&self, path: &Path) -> bool {
        let result = read_gzip_prefix(path, 3 + ROOT_NAME.len()).map(|prefix| {
            prefix[0] == TagType::Compound as u8
                && prefix[1..3] == (ROOT_NAME.len() as u16).to_be_bytes()
                && &prefix[3..] == ROOT_NAME.as_bytes()
        });
        probe_result(self.format(), path, result)
    }

    fn load(&self, path: &Path) -> Result<Map> {
        let mut reader = open_gzip(path)?;
        decoded(NamedTag::read_from(&mut reader).and_then(|root| read_map(&root)))
    }
}
