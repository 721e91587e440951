use crate::{
    converter::MapConverter,
    error::{MapError, Result},
    formats,
    map::Map,
    types::{MapFormat, MapFormatType},
};
use chrono::Utc;
use std::path::Path;

/// 有序的转换器列表及分派逻辑
///
/// 列表在构造时确定，之后不可修改；探测严格按注册顺序进行。
pub struct MapRegistry {
    converters: Vec<Box<dyn MapConverter>>,
}

impl Default for MapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MapRegistry {
    /// 注册全部内置格式
    pub fn new() -> Self {
        Self::with_converters(formats::all_converters())
    }

    pub fn with_converters(converters: Vec<Box<dyn MapConverter>>) -> Self {
        Self { converters }
    }

    pub fn converters(&self) -> impl Iterator<Item = &dyn MapConverter> {
        self.converters.iter().map(|c| c.as_ref())
    }

    pub fn converter(&self, format: MapFormat) -> Option<&dyn MapConverter> {
        self.converters()
            .find(|converter| converter.format() == format)
    }

    /// 识别路径对应的地图格式
    pub fn identify<P: AsRef<Path>>(&self, path: P) -> Result<MapFormat> {
        self.dispatch(path.as_ref(), "识别", |converter, _| Ok(converter.format()))
    }

    pub fn load_header<P: AsRef<Path>>(&self, path: P) -> Result<Map> {
        let mut map = self.dispatch(path.as_ref(), "读取头部", |converter, path| {
            converter.load_header(path)
        })?;
        map.changed_since_save = false;
        Ok(map)
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Map> {
        let mut map = self.dispatch(path.as_ref(), "加载", |converter, path| converter.load(path))?;
        map.changed_since_save = false;
        Ok(map)
    }

    /// 不抛错的加载，失败时记录错误日志并返回 `None`
    pub fn try_load<P: AsRef<Path>>(&self, path: P) -> Option<Map> {
        let path = path.as_ref();
        match self.load(path) {
            Ok(map) => Some(map),
            Err(err) => {
                log::error!("无法加载地图 {}: {}", path.display(), err);
                None
            }
        }
    }

    pub fn try_load_header<P: AsRef<Path>>(&self, path: P) -> Option<Map> {
        let path = path.as_ref();
        match self.load_header(path) {
            Ok(map) => Some(map),
            Err(err) => {
                log::error!("无法读取地图头部 {}: {}", path.display(), err);
                None
            }
        }
    }

    /// 以指定格式保存；成功后刷新修改时间并清除脏标记
    pub fn save<P: AsRef<Path>>(&self, map: &mut Map, path: P, format: MapFormat) -> Result<()> {
        let path = path.as_ref();
        let converter = self.converter(format).ok_or(MapError::NoConverter(format))?;

        let previous = map.date_modified;
        map.date_modified = Utc::now();
        match converter.save(map, path) {
            Ok(()) => {
                map.changed_since_save = false;
                log::info!("地图已保存为 {} 格式: {}", format, path.display());
                Ok(())
            }
            Err(err) => {
                map.date_modified = previous;
                Err(err)
            }
        }
    }

    pub fn try_save<P: AsRef<Path>>(&self, map: &mut Map, path: P, format: MapFormat) -> bool {
        let path = path.as_ref();
        match self.save(map, path, format) {
            Ok(()) => true,
            Err(err) => {
                log::error!("无法保存地图 {}: {}", path.display(), err);
                false
            }
        }
    }

    /// 两轮分派：先试扩展名匹配且存储形态一致的转换器，再按注册顺序探测其余所有转换器
    ///
    /// 声明了文件但对该操作返回"不支持"的转换器视为不匹配，继续尝试下一个。
    fn dispatch<T, F>(&self, path: &Path, operation: &str, op: F) -> Result<T>
    where
        F: Fn(&dyn MapConverter, &Path) -> Result<T>,
    {
        let target_type = if path.is_file() {
            MapFormatType::SingleFile
        } else if path.is_dir() {
            MapFormatType::Directory
        } else {
            return Err(MapError::NotFound(path.to_path_buf()));
        };

        let count = self.converters.len();
        let mut tried = vec![false; count];
        let mut unsupported = None;

        let preferred = (0..count).filter(|&i| {
            let converter = &self.converters[i];
            converter.format_type() == target_type && converter.claims_name(path)
        });
        let order: Vec<usize> = preferred.chain(0..count).collect();

        for index in order {
            if tried[index] {
                continue;
            }
            tried[index] = true;

            let converter = self.converters[index].as_ref();
            if !converter.claims(path) {
                continue;
            }

            log::debug!("{} 由 {} 转换器处理（{}）", path.display(), converter.format(), operation);
            match op(converter, path) {
                Err(err) if err.is_not_implemented() => {
                    log::debug!("{}，继续尝试其他转换器", err);
                    unsupported = Some(err);
                }
                result => return result,
            }
        }

        Err(unsupported.unwrap_or_else(|| MapError::UnknownFormat(path.to_path_buf())))
    }
}
