use crate::{
    block::{Block, BlockMapping},
    error::{MapError, Result},
    types::{Guid, Position},
    zone::Zone,
    MAX_MAP_DIMENSION, VANILLA_ID_BOUNDARY,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// 分组元数据：组名 -> 键 -> 值，保持插入顺序
pub type Metadata = IndexMap<String, IndexMap<String, String>>;

/// 规范的内存地图表示，所有格式的编解码器都读写这一结构
#[derive(Debug, Clone)]
pub struct Map {
    width_x: i32,
    width_y: i32,
    height: i32,
    pub spawn: Position,
    /// `None` 表示只加载了头部
    blocks: Option<Vec<u8>>,
    metadata: Metadata,
    zones: Vec<Zone>,
    pub guid: Guid,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub changed_since_save: bool,
}

impl Map {
    /// 创建只有头部的地图（无方块数组），出生点默认为地图中心
    pub fn new(width_x: i32, width_y: i32, height: i32) -> Self {
        let now = Utc::now();
        let mut map = Self {
            width_x,
            width_y,
            height,
            spawn: Position::default(),
            blocks: None,
            metadata: Metadata::new(),
            zones: Vec::new(),
            guid: Guid::random(),
            date_created: now,
            date_modified: now,
            changed_since_save: true,
        };
        map.reset_spawn();
        map
    }

    /// 创建方块全为空气的完整地图
    pub fn new_blank(width_x: i32, width_y: i32, height: i32) -> Result<Self> {
        let mut map = Self::new(width_x, width_y, height);
        map.validate_header()?;
        map.blocks = Some(vec![Block::Air.id(); map.volume()]);
        Ok(map)
    }

    pub fn width_x(&self) -> i32 {
        self.width_x
    }

    pub fn width_y(&self) -> i32 {
        self.width_y
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn volume(&self) -> usize {
        self.width_x.max(0) as usize * self.width_y.max(0) as usize * self.height.max(0) as usize
    }

    pub fn is_valid_dimension(dimension: i32) -> bool {
        dimension > 0 && dimension <= MAX_MAP_DIMENSION
    }

    /// 检查尺寸是否合法；若已有方块数组，还要求其长度等于体积
    pub fn validate_header(&self) -> Result<()> {
        for (label, dimension) in [
            ("X宽度", self.width_x),
            ("Y宽度", self.width_y),
            ("高度", self.height),
        ] {
            if !Map::is_valid_dimension(dimension) {
                return Err(MapError::Format(format!(
                    "地图{}无效: {} (应在 1..={} 之间)",
                    label, dimension, MAX_MAP_DIMENSION
                )));
            }
            if dimension % 16 != 0 {
                log::warn!("地图{} {} 不是16的倍数，部分客户端可能无法正常显示", label, dimension);
            }
        }

        if let Some(blocks) = &self.blocks {
            if blocks.len() != self.volume() {
                return Err(MapError::Format(format!(
                    "方块数组长度 {} 与地图体积 {} 不符",
                    blocks.len(),
                    self.volume()
                )));
            }
        }

        Ok(())
    }

    // ---- 方块 ----

    pub fn has_blocks(&self) -> bool {
        self.blocks.is_some()
    }

    pub fn blocks(&self) -> Option<&[u8]> {
        self.blocks.as_deref()
    }

    pub fn blocks_mut(&mut self) -> Option<&mut [u8]> {
        self.blocks.as_deref_mut()
    }

    /// 设置完整方块数组，长度必须等于体积
    pub fn set_blocks(&mut self, blocks: Vec<u8>) -> Result<()> {
        if blocks.len() != self.volume() {
            return Err(MapError::Format(format!(
                "方块数组长度 {} 与地图体积 {} 不符",
                blocks.len(),
                self.volume()
            )));
        }
        self.blocks = Some(blocks);
        self.changed_since_save = true;
        Ok(())
    }

    pub fn take_blocks(&mut self) -> Option<Vec<u8>> {
        self.blocks.take()
    }

    pub fn in_bounds(&self, x: i32, y: i32, h: i32) -> bool {
        (0..self.width_x).contains(&x) && (0..self.width_y).contains(&y) && (0..self.height).contains(&h)
    }

    /// 坐标到扁平数组下标：`(h * width_y + y) * width_x + x`
    pub fn index(&self, x: i32, y: i32, h: i32) -> usize {
        (h as usize * self.width_y as usize + y as usize) * self.width_x as usize + x as usize
    }

    pub fn get_block(&self, x: i32, y: i32, h: i32) -> Option<u8> {
        if !self.in_bounds(x, y, h) {
            return None;
        }
        self.blocks.as_ref().map(|blocks| blocks[self.index(x, y, h)])
    }

    /// 越界或没有方块数组时返回 `false`
    pub fn set_block(&mut self, x: i32, y: i32, h: i32, block: u8) -> bool {
        if !self.in_bounds(x, y, h) {
            return false;
        }
        let index = self.index(x, y, h);
        match self.blocks.as_mut() {
            Some(blocks) => {
                blocks[index] = block;
                self.changed_since_save = true;
                true
            }
            None => false,
        }
    }

    /// 按映射表就地转换方块ID，仅改写高于通用边界的ID
    pub fn convert_block_types(&mut self, mapping: &BlockMapping) {
        if let Some(blocks) = self.blocks.as_mut() {
            for block in blocks.iter_mut() {
                if *block >= VANILLA_ID_BOUNDARY {
                    *block = mapping[*block as usize];
                }
            }
        }
    }

    /// 把规范集合之外的方块ID清零，返回被清除的数量
    pub fn remove_unknown_blocktypes(&mut self) -> usize {
        let mut removed = 0;
        if let Some(blocks) = self.blocks.as_mut() {
            for block in blocks.iter_mut().filter(|b| !Block::is_known(**b)) {
                *block = Block::Air.id();
                removed += 1;
            }
        }
        if removed > 0 {
            log::warn!("地图中有 {} 个未知方块被替换为空气", removed);
        }
        removed
    }

    // ---- 出生点 ----

    pub fn set_spawn(&mut self, spawn: Position) {
        self.spawn = spawn;
        self.changed_since_save = true;
    }

    /// 出生点重置到地图中心顶部，各坐标不超过16位上限
    pub fn reset_spawn(&mut self) {
        let scaled = |dimension: i32, scale: i64| (dimension.max(0) as i64 * scale).min(i16::MAX as i64) as i32;
        self.spawn = Position::new(
            scaled(self.width_x, 16),
            scaled(self.width_y, 16),
            scaled(self.height, 32),
            0,
            0,
        );
    }

    // ---- 元数据 ----

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_meta(&mut self, group: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        self.metadata
            .entry(group.into())
            .or_default()
            .insert(key.into(), value.into());
        self.changed_since_save = true;
    }

    pub fn get_meta(&self, group: &str, key: &str) -> Option<&str> {
        self.metadata
            .get(group)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    pub fn remove_meta(&mut self, group: &str, key: &str) -> Option<String> {
        let entries = self.metadata.get_mut(group)?;
        let removed = entries.shift_remove(key);
        if entries.is_empty() {
            self.metadata.shift_remove(group);
        }
        removed
    }

    /// 按插入顺序遍历 (组, 键, 值)
    pub fn meta_entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.metadata.iter().flat_map(|(group, entries)| {
            entries
                .iter()
                .map(move |(key, value)| (group.as_str(), key.as_str(), value.as_str()))
        })
    }

    pub fn meta_count(&self) -> usize {
        self.metadata.values().map(IndexMap::len).sum()
    }

    // ---- 区域 ----

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn find_zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.name.eq_ignore_ascii_case(name))
    }

    /// 区域名称（不区分大小写）不得重复，名称和玩家列表须能原样序列化
    pub fn add_zone(&mut self, zone: Zone) -> Result<()> {
        zone.validate()?;
        if self.find_zone(&zone.name).is_some() {
            return Err(MapError::Format(format!("区域名称重复: {}", zone.name)));
        }
        self.zones.push(zone);
        self.changed_since_save = true;
        Ok(())
    }

    pub fn remove_zone(&mut self, name: &str) -> Option<Zone> {
        let index = self
            .zones
            .iter()
            .position(|zone| zone.name.eq_ignore_ascii_case(name))?;
        self.changed_since_save = true;
        Some(self.zones.remove(index))
    }
}
