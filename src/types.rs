use crate::error::MapError;
use std::fmt;
use std::str::FromStr;

/// 出生点位置（定点坐标，每个方块32单位）
///
/// `x`/`y` 为水平坐标，`h` 为竖直高度；`r` 为水平朝向，`l` 为俯仰角。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub h: i32,
    pub r: u8,
    pub l: u8,
}

impl Position {
    pub fn new(x: i32, y: i32, h: i32, r: u8, l: u8) -> Self {
        Self { x, y, h, r, l }
    }

    /// 由方块坐标构造（乘以32）
    pub fn from_blocks(x: i32, y: i32, h: i32) -> Self {
        Self::new(x * 32, y * 32, h * 32, 0, 0)
    }

    /// 换算回方块坐标
    pub fn to_blocks(&self) -> (i32, i32, i32) {
        (self.x / 32, self.y / 32, self.h / 32)
    }
}

/// 轴对齐的包围盒（方块坐标，含边界）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub h_min: i32,
    pub x_max: i32,
    pub y_max: i32,
    pub h_max: i32,
}

impl BoundingBox {
    /// 两个角点可以任意顺序给出
    pub fn new(x1: i32, y1: i32, h1: i32, x2: i32, y2: i32, h2: i32) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            h_min: h1.min(h2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
            h_max: h1.max(h2),
        }
    }

    pub fn contains(&self, x: i32, y: i32, h: i32) -> bool {
        (self.x_min..=self.x_max).contains(&x)
            && (self.y_min..=self.y_max).contains(&y)
            && (self.h_min..=self.h_max).contains(&h)
    }
}

/// 地图格式的存储形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFormatType {
    SingleFile,
    Directory,
}

/// 已知的地图格式，同时作为注册表的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFormat {
    /// 官方Classic/Creative客户端的Java序列化存档
    Creative,
    Jte,
    MCSharp,
    D3,
    FCMv2,
    FCMv3,
    MinerCPP,
    Myne,
    /// Indev的NBT存档
    Nbt,
}

impl MapFormat {
    pub const ALL: [MapFormat; 9] = [
        MapFormat::FCMv3,
        MapFormat::FCMv2,
        MapFormat::MCSharp,
        MapFormat::D3,
        MapFormat::Creative,
        MapFormat::MinerCPP,
        MapFormat::Jte,
        MapFormat::Myne,
        MapFormat::Nbt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MapFormat::Creative => "creative",
            MapFormat::Jte => "jte",
            MapFormat::MCSharp => "mcsharp",
            MapFormat::D3 => "d3",
            MapFormat::FCMv2 => "fcmv2",
            MapFormat::FCMv3 => "fcmv3",
            MapFormat::MinerCPP => "minercpp",
            MapFormat::Myne => "myne",
            MapFormat::Nbt => "nbt",
        }
    }
}

impl fmt::Display for MapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for MapFormat {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        MapFormat::ALL
            .iter()
            .copied()
            .find(|format| format.name() == lower)
            .ok_or_else(|| MapError::Format(format!("未知的格式名称: {}", s)))
    }
}

/// 地图的稳定标识（16字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    pub fn random() -> Self {
        Guid(rand::random())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
