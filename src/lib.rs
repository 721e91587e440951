pub mod block;
pub mod compression;
pub mod converter;
pub mod error;
pub mod formats;
pub mod map;
pub mod nbt;
pub mod registry;
pub mod types;
pub mod utils;
pub mod zone;

pub use crate::block::{Block, BlockMapping};
pub use crate::converter::MapConverter;
pub use crate::error::{MapError, Result};
pub use crate::map::Map;
pub use crate::registry::MapRegistry;
pub use crate::types::{BoundingBox, Guid, MapFormat, MapFormatType, Position};
pub use crate::zone::Zone;

/// FCMv3魔数常量（小端存储）
pub const FCM_V3_MAGIC: u32 = 0x0FC2_AF40;

/// FCMv3格式修订号
pub const FCM_V3_REVISION: u8 = 13;

/// FCMv2魔数常量（小端存储）
pub const FCM_V2_MAGIC: u32 = 0xFC00_0002;

/// 单个维度允许的最大尺寸
pub const MAX_MAP_DIMENSION: i32 = 2048;

/// 低于此值的方块ID在所有已知格式中含义相同，不做转换
pub const VANILLA_ID_BOUNDARY: u8 = 50;

/// FCMv3元数据中保存区域定义的保留组名
pub const ZONE_META_GROUP: &str = "zones";
