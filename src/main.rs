use clap::{Parser, Subcommand};
use mapconv::{map::Metadata, Map, MapError, MapFormat, MapRegistry, Position};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 地图格式转换命令行工具 - 识别、查看并转换各类服务端地图存档
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 识别地图文件（或目录）的格式
    Identify {
        /// 地图文件或目录路径
        path: PathBuf,
    },

    /// 查看地图信息
    Info {
        /// 地图文件或目录路径
        path: PathBuf,

        /// 只读取头部（尺寸和出生点）
        #[arg(long)]
        header_only: bool,

        /// 以JSON格式输出
        #[arg(long)]
        json: bool,
    },

    /// 转换地图格式
    Convert {
        /// 输入地图路径
        input: PathBuf,

        /// 输出文件路径
        output: PathBuf,

        /// 目标格式
        #[arg(short, long, default_value = "fcmv3")]
        format: MapFormat,
    },

    /// 列出所有已注册的格式
    Formats,
}

/// `info --json` 的输出结构
#[derive(Serialize)]
struct MapSummary<'a> {
    path: String,
    format: &'static str,
    width_x: i32,
    width_y: i32,
    height: i32,
    spawn: SpawnSummary,
    guid: String,
    date_created: String,
    date_modified: String,
    has_blocks: bool,
    metadata: &'a Metadata,
    zones: Vec<String>,
}

#[derive(Serialize)]
struct SpawnSummary {
    x: i32,
    y: i32,
    h: i32,
    r: u8,
    l: u8,
}

impl From<Position> for SpawnSummary {
    fn from(spawn: Position) -> Self {
        Self {
            x: spawn.x,
            y: spawn.y,
            h: spawn.h,
            r: spawn.r,
            l: spawn.l,
        }
    }
}

impl<'a> MapSummary<'a> {
    fn new(path: &Path, format: MapFormat, map: &'a Map) -> Self {
        Self {
            path: path.display().to_string(),
            format: format.name(),
            width_x: map.width_x(),
            width_y: map.width_y(),
            height: map.height(),
            spawn: map.spawn.into(),
            guid: map.guid.to_string(),
            date_created: map.date_created.to_rfc3339(),
            date_modified: map.date_modified.to_rfc3339(),
            has_blocks: map.has_blocks(),
            metadata: map.metadata(),
            zones: map.zones().iter().map(|zone| zone.serialize()).collect(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let registry = MapRegistry::new();

    let result = match &cli.command {
        Commands::Identify { path } => identify(&registry, path),
        Commands::Info { path, header_only, json } => print_info(&registry, path, *header_only, *json),
        Commands::Convert { input, output, format } => convert(&registry, input, output, *format),
        Commands::Formats => {
            print_formats(&registry);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("操作失败: {}", e);
        std::process::exit(1);
    }
}

fn identify(registry: &MapRegistry, path: &Path) -> Result<(), MapError> {
    let format = registry.identify(path)?;
    println!("{}: {}", path.display(), format);
    Ok(())
}

/// 打印地图信息
fn print_info(registry: &MapRegistry, path: &Path, header_only: bool, json: bool) -> Result<(), MapError> {
    let format = registry.identify(path)?;
    let map = if header_only {
        registry.load_header(path)?
    } else {
        registry.load(path)?
    };

    if json {
        let summary = MapSummary::new(path, format, &map);
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| MapError::Format(format!("JSON序列化错误: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("=== 地图信息 ===");
    println!("文件: {}", path.display());
    println!("格式: {}", format);
    println!("尺寸: {} x {} x {}（X x Y x 高）", map.width_x(), map.width_y(), map.height());
    let spawn = map.spawn;
    println!("出生点: ({}, {}, {}) 朝向 {} 俯仰 {}", spawn.x, spawn.y, spawn.h, spawn.r, spawn.l);
    println!("GUID: {}", map.guid);
    println!("创建时间: {}", map.date_created);
    println!("修改时间: {}", map.date_modified);

    if let Some(blocks) = map.blocks() {
        let solid = blocks.iter().filter(|&&b| b != 0).count();
        println!("方块总数: {}（非空气 {}）", blocks.len(), solid);
    }

    if map.meta_count() > 0 {
        println!("\n=== 元数据 ===");
        for (group, key, value) in map.meta_entries() {
            println!("  [{}] {} = {}", group, key, value);
        }
    }

    if !map.zones().is_empty() {
        println!("\n=== 区域 ===");
        for zone in map.zones() {
            println!("  {}", zone);
        }
    }

    Ok(())
}

fn convert(registry: &MapRegistry, input: &Path, output: &Path, format: MapFormat) -> Result<(), MapError> {
    println!("输入: {}", input.display());
    let mut map = registry.load(input)?;
    println!("转换中...");
    registry.save(&mut map, output, format)?;
    println!("已保存为 {} 格式: {}", format, output.display());
    Ok(())
}

fn print_formats(registry: &MapRegistry) {
    println!("{:<10} {:<12} {}", "格式", "存储形态", "来源");
    for converter in registry.converters() {
        let kind = match converter.format_type() {
            mapconv::MapFormatType::SingleFile => "单文件",
            mapconv::MapFormatType::Directory => "目录",
        };
        println!("{:<10} {:<12} {}", converter.format(), kind, converter.server_name());
    }
}
