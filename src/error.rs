use crate::types::MapFormat;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("地图格式错误: {0}")]
    Format(String),

    #[error("未知的地图格式: {}", .0.display())]
    UnknownFormat(PathBuf),

    #[error("找不到文件或目录: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{format} 格式不支持{operation}")]
    NotImplemented {
        format: MapFormat,
        operation: &'static str,
    },

    #[error("NBT解析错误: {0}")]
    Nbt(String),

    #[error("没有注册 {0} 格式的转换器")]
    NoConverter(MapFormat),
}

impl MapError {
    /// 是否属于"文件内容不符合格式"一类的错误（区别于IO错误）
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            MapError::Format(_) | MapError::UnknownFormat(_) | MapError::Nbt(_)
        )
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, MapError::NotImplemented { .. })
    }

    /// 把解码途中的意外EOF和损坏的压缩流改报为格式错误，其余IO错误原样保留
    pub(crate) fn eof_as_format(self) -> Self {
        match self {
            MapError::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                MapError::Format("数据流意外结束".to_string())
            }
            MapError::Io(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput
                ) =>
            {
                MapError::Format(format!("压缩数据损坏: {}", err))
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
