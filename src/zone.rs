use crate::error::{MapError, Result};
use crate::types::BoundingBox;
use std::fmt;
use std::str::FromStr;

/// 带权限等级的命名区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    pub bounds: BoundingBox,
    /// 允许在区域内建造的最低等级
    pub rank: String,
    pub builders: Vec<String>,
    pub excluded: Vec<String>,
}

impl Zone {
    pub fn new(name: impl Into<String>, bounds: BoundingBox, rank: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds,
            rank: rank.into(),
            builders: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// 序列化为 `名称 xmin ymin hmin xmax ymax hmax 等级,建造者...,排除者...`
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    pub fn parse(raw: &str) -> Result<Zone> {
        raw.parse()
    }

    /// 序列化以空白和逗号分隔字段，名称、等级和玩家名里都不能出现它们
    pub fn validate(&self) -> Result<()> {
        let fields = [("区域名称", &self.name), ("等级", &self.rank)];
        for (label, value) in fields {
            if value.is_empty() {
                return Err(MapError::Format(format!("{}不能为空", label)));
            }
        }
        let players = self.builders.iter().chain(&self.excluded).map(|p| ("玩家名", p));
        for (label, value) in fields.into_iter().chain(players) {
            if value.chars().any(|c| c.is_whitespace() || c == ',') {
                return Err(MapError::Format(format!(
                    "{}中不能含有空白或逗号: {:?}",
                    label, value
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bounds;
        write!(
            f,
            "{} {} {} {} {} {} {} {},{},{}",
            self.name,
            b.x_min,
            b.y_min,
            b.h_min,
            b.x_max,
            b.y_max,
            b.h_max,
            self.rank,
            self.builders.join(" "),
            self.excluded.join(" ")
        )
    }
}

impl FromStr for Zone {
    type Err = MapError;

    fn from_str(raw: &str) -> Result<Zone> {
        let mut parts = raw.split(',');
        let header: Vec<&str> = parts
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .collect();

        if header.len() != 8 {
            return Err(MapError::Format(format!("区域定义头部字段数错误: {:?}", raw)));
        }

        let mut coords = [0i32; 6];
        for (slot, field) in coords.iter_mut().zip(&header[1..7]) {
            *slot = field
                .parse()
                .map_err(|_| MapError::Format(format!("区域坐标无效: {:?}", field)))?;
        }

        let names = |field: Option<&str>| -> Vec<String> {
            field
                .map(|list| list.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default()
        };

        Ok(Zone {
            name: header[0].to_string(),
            bounds: BoundingBox::new(
                coords[0], coords[1], coords[2], coords[3], coords[4], coords[5],
            ),
            rank: header[7].to_string(),
            builders: names(parts.next()),
            excluded: names(parts.next()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_zone_parses_back() {
        let mut zone = Zone::new("spawn", BoundingBox::new(10, 0, 5, 0, 20, 40), "builder");
        zone.builders = vec!["alice".into(), "bob".into()];
        zone.excluded = vec!["mallory".into()];

        let raw = zone.serialize();
        assert_eq!(raw, "spawn 0 0 5 10 20 40 builder,alice bob,mallory");
        assert_eq!(Zone::parse(&raw).unwrap(), zone);
    }

    #[test]
    fn empty_player_lists_survive() {
        let zone = Zone::new("z", BoundingBox::new(0, 0, 0, 1, 1, 1), "guest");
        let parsed: Zone = zone.serialize().parse().unwrap();
        assert!(parsed.builders.is_empty());
        assert!(parsed.excluded.is_empty());
    }

    #[test]
    fn names_with_separators_do_not_validate() {
        let bounds = BoundingBox::new(0, 0, 0, 2, 2, 2);
        assert!(Zone::new("gate", bounds, "guest").validate().is_ok());
        assert!(Zone::new("north gate", bounds, "guest").validate().is_err());
        assert!(Zone::new("gate", bounds, "").validate().is_err());

        let mut zone = Zone::new("gate", bounds, "guest");
        zone.excluded = vec!["a,b".into()];
        assert!(zone.validate().unwrap_err().is_format_error());
    }

    #[test]
    fn malformed_header_is_a_format_error() {
        assert!(Zone::parse("spawn 1 2 3").unwrap_err().is_format_error());
        assert!(Zone::parse("spawn a 2 3 4 5 6 guest").unwrap_err().is_format_error());
    }
}
