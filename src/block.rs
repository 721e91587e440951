use crate::VANILLA_ID_BOUNDARY;

/// 规范方块集合（Classic的50种方块）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Block {
    Air = 0,
    Stone = 1,
    Grass = 2,
    Dirt = 3,
    Cobblestone = 4,
    Wood = 5,
    Plant = 6,
    Admincrete = 7,
    Water = 8,
    StillWater = 9,
    Lava = 10,
    StillLava = 11,
    Sand = 12,
    Gravel = 13,
    GoldOre = 14,
    IronOre = 15,
    Coal = 16,
    Log = 17,
    Leaves = 18,
    Sponge = 19,
    Glass = 20,
    Red = 21,
    Orange = 22,
    Yellow = 23,
    Lime = 24,
    Green = 25,
    Teal = 26,
    Aqua = 27,
    Cyan = 28,
    Blue = 29,
    Indigo = 30,
    Violet = 31,
    Magenta = 32,
    Pink = 33,
    Black = 34,
    Gray = 35,
    White = 36,
    YellowFlower = 37,
    RedFlower = 38,
    BrownMushroom = 39,
    RedMushroom = 40,
    Gold = 41,
    Iron = 42,
    DoubleStair = 43,
    Stair = 44,
    Brick = 45,
    TNT = 46,
    Books = 47,
    MossyRocks = 48,
    Obsidian = 49,
}

impl Block {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn is_known(id: u8) -> bool {
        id < VANILLA_ID_BOUNDARY
    }

    pub fn from_id(id: u8) -> Option<Block> {
        Block::ALL.get(id as usize).copied()
    }

    /// 按ID顺序排列，下标即方块ID
    pub const ALL: [Block; 50] = [
        Block::Air, Block::Stone, Block::Grass, Block::Dirt, Block::Cobblestone,
        Block::Wood, Block::Plant, Block::Admincrete, Block::Water, Block::StillWater,
        Block::Lava, Block::StillLava, Block::Sand, Block::Gravel, Block::GoldOre,
        Block::IronOre, Block::Coal, Block::Log, Block::Leaves, Block::Sponge,
        Block::Glass, Block::Red, Block::Orange, Block::Yellow, Block::Lime,
        Block::Green, Block::Teal, Block::Aqua, Block::Cyan, Block::Blue,
        Block::Indigo, Block::Violet, Block::Magenta, Block::Pink, Block::Black,
        Block::Gray, Block::White, Block::YellowFlower, Block::RedFlower, Block::BrownMushroom,
        Block::RedMushroom, Block::Gold, Block::Iron, Block::DoubleStair, Block::Stair,
        Block::Brick, Block::TNT, Block::Books, Block::MossyRocks, Block::Obsidian,
    ];
}

/// 旧版方块ID到规范ID的256项映射表
pub type BlockMapping = [u8; 256];

/// 由稀疏的 (旧ID, 规范ID) 列表在编译期生成映射表
///
/// 0..=49 恒等映射，未列出的高位ID映射为空气。
pub const fn build_mapping(pairs: &[(u8, Block)]) -> BlockMapping {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < VANILLA_ID_BOUNDARY as usize {
        table[i] = i as u8;
        i += 1;
    }
    let mut p = 0;
    while p < pairs.len() {
        let (legacy, block) = pairs[p];
        if legacy >= VANILLA_ID_BOUNDARY {
            table[legacy as usize] = block as u8;
        }
        p += 1;
    }
    table
}

/// Alpha时代（Indev/Infdev/早期Survival）引入的50号以后方块的近似替代
///
/// 多个第三方服务端沿用了这一段编号，各格式的表在此基础上追加自己的条目。
pub const ALPHA_BLOCKS: [(u8, Block); 42] = [
    (50, Block::Air),          // 火把
    (51, Block::Lava),         // 火
    (52, Block::Blue),         // 刷怪笼
    (53, Block::Stair),        // 木楼梯
    (54, Block::Wood),         // 箱子
    (55, Block::Air),          // 红石线
    (56, Block::Gray),         // 钻石矿
    (57, Block::Aqua),         // 钻石块
    (58, Block::Log),          // 工作台
    (59, Block::Leaves),       // 作物
    (60, Block::Dirt),         // 耕地
    (61, Block::Cobblestone),  // 熔炉
    (62, Block::Cobblestone),  // 燃烧的熔炉
    (63, Block::Air),          // 告示牌
    (64, Block::Air),          // 木门
    (65, Block::Air),          // 梯子
    (66, Block::Air),          // 铁轨
    (67, Block::Stair),        // 石楼梯
    (68, Block::Air),          // 墙上的告示牌
    (69, Block::Air),          // 拉杆
    (70, Block::Air),          // 石压力板
    (71, Block::Air),          // 铁门
    (72, Block::Air),          // 木压力板
    (73, Block::IronOre),      // 红石矿
    (74, Block::IronOre),      // 发光的红石矿
    (75, Block::Air),          // 红石火把（灭）
    (76, Block::Air),          // 红石火把
    (77, Block::Air),          // 按钮
    (78, Block::Air),          // 雪层
    (79, Block::Glass),        // 冰
    (80, Block::White),        // 雪块
    (81, Block::Leaves),       // 仙人掌
    (82, Block::Gray),         // 黏土
    (83, Block::Leaves),       // 甘蔗
    (84, Block::Log),          // 唱片机
    (85, Block::Wood),         // 栅栏
    (86, Block::Orange),       // 南瓜
    (87, Block::Red),          // 地狱岩
    (88, Block::Gravel),       // 灵魂沙
    (89, Block::Yellow),       // 萤石
    (90, Block::Violet),       // 传送门
    (91, Block::Orange),       // 南瓜灯
];

/// 只包含Alpha段编号的映射表，没有自定义方块的格式直接使用
pub static ALPHA_MAPPING: BlockMapping = build_mapping(&ALPHA_BLOCKS);

/// 把 `extra` 叠加到 `base` 之后生成映射表，后出现的条目覆盖先前的
pub const fn build_mapping_with(base: &[(u8, Block)], extra: &[(u8, Block)]) -> BlockMapping {
    let mut table = build_mapping(base);
    let mut p = 0;
    while p < extra.len() {
        let (legacy, block) = extra[p];
        if legacy >= VANILLA_ID_BOUNDARY {
            table[legacy as usize] = block as u8;
        }
        p += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_ordered_by_id() {
        for (i, block) in Block::ALL.iter().enumerate() {
            assert_eq!(block.id() as usize, i);
        }
    }

    #[test]
    fn from_id_covers_the_canonical_range() {
        assert_eq!(Block::from_id(0), Some(Block::Air));
        assert_eq!(Block::from_id(20), Some(Block::Glass));
        assert_eq!(Block::from_id(49), Some(Block::Obsidian));
        assert_eq!(Block::from_id(50), None);
        assert_eq!(Block::from_id(255), None);
    }

    #[test]
    fn mapping_is_identity_below_boundary_and_air_by_default() {
        let table = build_mapping(&[(100, Block::Glass), (10, Block::Stone)]);
        for id in 0..VANILLA_ID_BOUNDARY {
            assert_eq!(table[id as usize], id);
        }
        assert_eq!(table[100], Block::Glass.id());
        assert_eq!(table[101], Block::Air.id());
    }

    #[test]
    fn extra_entries_override_base() {
        let table = build_mapping_with(&ALPHA_BLOCKS, &[(54, Block::TNT)]);
        assert_eq!(table[54], Block::TNT.id());
        assert_eq!(table[89], Block::Yellow.id());
    }
}
