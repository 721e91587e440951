use crate::{
    block::BlockMapping,
    error::{MapError, Result},
    map::Map,
    types::{MapFormat, MapFormatType},
};
use std::path::Path;

/// 单一地图格式的转换器
///
/// 实现者不保存跨调用的状态，同一实例可以被多个线程同时用于不同的文件。
pub trait MapConverter: Send + Sync {
    /// 产生这种存档的服务端名称
    fn server_name(&self) -> &'static str;

    fn format_type(&self) -> MapFormatType;

    fn format(&self) -> MapFormat;

    /// 旧版方块ID映射表；原生格式没有
    fn block_mapping(&self) -> Option<&'static BlockMapping> {
        None
    }

    /// 只看扩展名/文件名的快速判断
    fn claims_name(&self, path: &Path) -> bool;

    /// 读取文件头验证签名。任何错误都视为"不是这种格式"，不会向外传播。
    fn claims(&self, path: &Path) -> bool;

    /// 只读取尺寸和出生点
    fn load_header(&self, _path: &Path) -> Result<Map> {
        Err(self.not_implemented("只读取头部"))
    }

    fn load(&self, path: &Path) -> Result<Map>;

    fn save(&self, _map: &Map, _path: &Path) -> Result<()> {
        Err(self.not_implemented("保存"))
    }

    fn not_implemented(&self, operation: &'static str) -> MapError {
        MapError::NotImplemented {
            format: self.format(),
            operation,
        }
    }
}

/// 把签名探测的结果压成布尔值，吞掉的错误只记 trace 日志
///
/// 真正的IO故障在这里同样表现为"格式不符"。
pub(crate) fn probe_result(format: MapFormat, path: &Path, result: Result<bool>) -> bool {
    match result {
        Ok(claimed) => claimed,
        Err(err) => {
            log::trace!("{} 探测 {} 失败: {}", format, path.display(), err);
            false
        }
    }
}

/// 收尾解码结果：EOF/压缩错误统一报为格式错误，刚读出的地图视为未修改
pub(crate) fn decoded(result: Result<Map>) -> Result<Map> {
    let mut map = result.map_err(MapError::eof_as_format)?;
    map.changed_since_save = false;
    Ok(map)
}
