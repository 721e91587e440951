// 通用的带类型标签树（NBT）编解码
// 名称和字符串使用2字节大端长度前缀，整数使用网络字节序，浮点数使用主机字节序

use crate::error::{MapError, Result};
use byteorder::{BigEndian, NativeEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;
use std::fmt::{self, Write as _};
use std::io::{Read, Write};

/// 读取时允许的最大嵌套深度
const MAX_DEPTH: usize = 512;

/// NBT标签类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    Bytes = 7,
    String = 8,
    List = 9,
    Compound = 10,
}

impl TryFrom<u8> for TagType {
    type Error = MapError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TagType::End),
            1 => Ok(TagType::Byte),
            2 => Ok(TagType::Short),
            3 => Ok(TagType::Int),
            4 => Ok(TagType::Long),
            5 => Ok(TagType::Float),
            6 => Ok(TagType::Double),
            7 => Ok(TagType::Bytes),
            8 => Ok(TagType::String),
            9 => Ok(TagType::List),
            10 => Ok(TagType::Compound),
            _ => Err(MapError::Nbt(format!("无效的NBT标签类型: {}", value))),
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagType::End => "TAG_End",
            TagType::Byte => "TAG_Byte",
            TagType::Short => "TAG_Short",
            TagType::Int => "TAG_Int",
            TagType::Long => "TAG_Long",
            TagType::Float => "TAG_Float",
            TagType::Double => "TAG_Double",
            TagType::Bytes => "TAG_Byte_Array",
            TagType::String => "TAG_String",
            TagType::List => "TAG_List",
            TagType::Compound => "TAG_Compound",
        };
        f.write_str(name)
    }
}

/// 标签节点。复合标签的子节点名称即其键，列表元素没有名称。
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    /// 元素类型 + 同类型元素
    List(TagType, Vec<Tag>),
    Compound(IndexMap<String, Tag>),
}

/// 带名称的根标签
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
    pub name: String,
    pub tag: Tag,
}

impl Tag {
    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::Bytes(_) => TagType::Bytes,
            Tag::String(_) => TagType::String,
            Tag::List(..) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
        }
    }

    pub fn empty_compound() -> Tag {
        Tag::Compound(IndexMap::new())
    }

    /// 由 (名称, 子节点) 构造复合标签，名称重复时报错
    pub fn compound<I, S>(children: I) -> Result<Tag>
    where
        I: IntoIterator<Item = (S, Tag)>,
        S: Into<String>,
    {
        let mut compound = Tag::empty_compound();
        for (name, child) in children {
            compound.insert(name, child)?;
        }
        Ok(compound)
    }

    /// 构造列表标签，所有元素必须是 `child_type` 类型
    pub fn list(child_type: TagType, items: Vec<Tag>) -> Result<Tag> {
        if let Some(bad) = items.iter().find(|item| item.tag_type() != child_type) {
            return Err(MapError::Nbt(format!(
                "列表元素类型应为 {}，实际为 {}",
                child_type,
                bad.tag_type()
            )));
        }
        if child_type == TagType::End && !items.is_empty() {
            return Err(MapError::Nbt("TAG_End 不能作为列表元素".to_string()));
        }
        Ok(Tag::List(child_type, items))
    }

    // ---- 取值 ----

    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Tag::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            Tag::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Tag::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Tag::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Tag::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Tag::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(_, items) => Some(items),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&IndexMap<String, Tag>> {
        match self {
            Tag::Compound(children) => Some(children),
            _ => None,
        }
    }

    // ---- 导航与修改 ----

    /// 按名称取复合标签的子节点
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.as_compound()?.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        match self {
            Tag::Compound(children) => children.get_mut(name),
            _ => None,
        }
    }

    /// 按下标取列表元素
    pub fn get_index(&self, index: usize) -> Option<&Tag> {
        self.as_list()?.get(index)
    }

    /// 添加新的子节点，名称已存在时报错
    pub fn insert(&mut self, name: impl Into<String>, child: Tag) -> Result<()> {
        let name = name.into();
        match self {
            Tag::Compound(children) => {
                if children.contains_key(&name) {
                    return Err(MapError::Nbt(format!("复合标签中名称重复: {:?}", name)));
                }
                children.insert(name, child);
                Ok(())
            }
            other => Err(MapError::Nbt(format!(
                "只能向 TAG_Compound 添加命名子节点，当前为 {}",
                other.tag_type()
            ))),
        }
    }

    /// 显式设置子节点，已存在时替换并返回旧值
    pub fn set(&mut self, name: impl Into<String>, child: Tag) -> Result<Option<Tag>> {
        match self {
            Tag::Compound(children) => Ok(children.insert(name.into(), child)),
            other => Err(MapError::Nbt(format!(
                "只能设置 TAG_Compound 的子节点，当前为 {}",
                other.tag_type()
            ))),
        }
    }

    /// 向列表追加元素；空的 `TAG_End` 列表会采用第一个元素的类型
    pub fn append(&mut self, item: Tag) -> Result<()> {
        match self {
            Tag::List(child_type, items) => {
                if items.is_empty() && *child_type == TagType::End {
                    *child_type = item.tag_type();
                }
                if item.tag_type() != *child_type {
                    return Err(MapError::Nbt(format!(
                        "列表元素类型应为 {}，实际为 {}",
                        child_type,
                        item.tag_type()
                    )));
                }
                items.push(item);
                Ok(())
            }
            other => Err(MapError::Nbt(format!(
                "只能向 TAG_List 追加元素，当前为 {}",
                other.tag_type()
            ))),
        }
    }

    /// 按名称移除复合标签的子节点，保持其余子节点的顺序
    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        match self {
            Tag::Compound(children) => children.shift_remove(name),
            _ => None,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Tag> {
        match self {
            Tag::List(_, items) if index < items.len() => Some(items.remove(index)),
            _ => None,
        }
    }

    /// 子节点数量；标量标签为0
    pub fn len(&self) -> usize {
        match self {
            Tag::List(_, items) => items.len(),
            Tag::Compound(children) => children.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 只遍历直接子节点，不递归；列表元素的名称为 `None`
    pub fn children(&self) -> Box<dyn Iterator<Item = (Option<&str>, &Tag)> + '_> {
        match self {
            Tag::List(_, items) => Box::new(items.iter().map(|item| (None, item))),
            Tag::Compound(children) => {
                Box::new(children.iter().map(|(name, child)| (Some(name.as_str()), child)))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    /// 递归渲染为缩进文本，用于诊断输出
    pub fn render(&self, name: Option<&str>) -> String {
        let mut out = String::new();
        self.render_into(&mut out, name, 0);
        out
    }

    fn render_into(&self, out: &mut String, name: Option<&str>, indent: usize) {
        let pad = "  ".repeat(indent);
        let label = match name {
            Some(name) => format!("{}{}({:?})", pad, self.tag_type(), name),
            None => format!("{}{}", pad, self.tag_type()),
        };

        let _ = match self {
            Tag::Byte(v) => writeln!(out, "{}: {}", label, v),
            Tag::Short(v) => writeln!(out, "{}: {}", label, v),
            Tag::Int(v) => writeln!(out, "{}: {}", label, v),
            Tag::Long(v) => writeln!(out, "{}: {}", label, v),
            Tag::Float(v) => writeln!(out, "{}: {}", label, v),
            Tag::Double(v) => writeln!(out, "{}: {}", label, v),
            Tag::Bytes(v) => writeln!(out, "{}: [{} bytes]", label, v.len()),
            Tag::String(v) => writeln!(out, "{}: {:?}", label, v),
            Tag::List(child_type, _) => {
                let _ = writeln!(out, "{}: {} entries of {}", label, self.len(), child_type);
                self.render_children(out, &pad, indent)
            }
            Tag::Compound(_) => {
                let _ = writeln!(out, "{}: {} entries", label, self.len());
                self.render_children(out, &pad, indent)
            }
        };
    }

    fn render_children(&self, out: &mut String, pad: &str, indent: usize) -> fmt::Result {
        writeln!(out, "{}{{", pad)?;
        for (child_name, child) in self.children() {
            child.render_into(out, child_name, indent + 1);
        }
        writeln!(out, "{}}}", pad)
    }
}

/// 节点游标：借用的父链接用于重建从根到节点的路径
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tag: &'a Tag,
    key: NodeKey<'a>,
    parent: Option<&'a NodeRef<'a>>,
}

#[derive(Debug, Clone, Copy)]
enum NodeKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> NodeRef<'a> {
    pub fn root(root: &'a NamedTag) -> Self {
        Self {
            tag: &root.tag,
            key: NodeKey::Name(root.name.as_str()),
            parent: None,
        }
    }

    pub fn tag(&self) -> &'a Tag {
        self.tag
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// 节点自身的名称；列表元素没有名称
    pub fn name(&self) -> Option<&'a str> {
        match self.key {
            NodeKey::Name(name) => Some(name),
            NodeKey::Index(_) => None,
        }
    }

    pub fn child<'b>(&'b self, name: &str) -> Option<NodeRef<'b>> {
        let (key, tag) = self.tag.as_compound()?.get_key_value(name)?;
        Some(NodeRef {
            tag,
            key: NodeKey::Name(key.as_str()),
            parent: Some(self),
        })
    }

    pub fn item<'b>(&'b self, index: usize) -> Option<NodeRef<'b>> {
        let tag = self.tag.get_index(index)?;
        Some(NodeRef {
            tag,
            key: NodeKey::Index(index),
            parent: Some(self),
        })
    }

    /// 从根到本节点的路径，如 `MinecraftLevel.Map.Spawn[1]`
    pub fn full_name(&self) -> String {
        let mut path = match self.parent {
            Some(parent) => parent.full_name(),
            None => String::new(),
        };
        match self.key {
            NodeKey::Name(name) => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(name);
            }
            NodeKey::Index(index) => {
                let _ = write!(path, "[{}]", index);
            }
        }
        path
    }
}

// ---- 读取 ----

fn read_name<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    String::from_utf8(buffer).map_err(|_| MapError::Nbt("非UTF-8编码的字符串".to_string()))
}

fn read_length<R: Read>(reader: &mut R) -> Result<usize> {
    let len = reader.read_i32::<BigEndian>()?;
    if len < 0 {
        return Err(MapError::Nbt(format!("长度为负数: {}", len)));
    }
    Ok(len as usize)
}

/// 读取一个带名称的根标签
pub fn read_named<R: Read>(reader: &mut R) -> Result<NamedTag> {
    let tag_type = TagType::try_from(reader.read_u8()?)?;
    if tag_type == TagType::End {
        return Err(MapError::Nbt("根标签不能是 TAG_End".to_string()));
    }
    let name = read_name(reader)?;
    let tag = read_payload(reader, tag_type, 0)?;
    Ok(NamedTag { name, tag })
}

/// 按给定类型读取不带类型和名称头的负载
pub fn read_payload<R: Read>(reader: &mut R, tag_type: TagType, depth: usize) -> Result<Tag> {
    if depth > MAX_DEPTH {
        return Err(MapError::Nbt("标签嵌套过深".to_string()));
    }

    let tag = match tag_type {
        TagType::End => return Err(MapError::Nbt("意外的 TAG_End".to_string())),
        TagType::Byte => Tag::Byte(reader.read_u8()?),
        TagType::Short => Tag::Short(reader.read_i16::<BigEndian>()?),
        TagType::Int => Tag::Int(reader.read_i32::<BigEndian>()?),
        TagType::Long => Tag::Long(reader.read_i64::<BigEndian>()?),
        TagType::Float => Tag::Float(reader.read_f32::<NativeEndian>()?),
        TagType::Double => Tag::Double(reader.read_f64::<NativeEndian>()?),
        TagType::Bytes => {
            let len = read_length(reader)?;
            Tag::Bytes(crate::utils::read_vec(reader, len)?)
        }
        TagType::String => Tag::String(read_name(reader)?),
        TagType::List => {
            let child_type = TagType::try_from(reader.read_u8()?)?;
            let count = read_length(reader)?;
            if child_type == TagType::End && count > 0 {
                return Err(MapError::Nbt("TAG_End 不能作为列表元素".to_string()));
            }
            let mut items = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                items.push(read_payload(reader, child_type, depth + 1)?);
            }
            Tag::List(child_type, items)
        }
        TagType::Compound => {
            let mut compound = Tag::empty_compound();
            loop {
                let child_type = TagType::try_from(reader.read_u8()?)?;
                if child_type == TagType::End {
                    break;
                }
                let name = read_name(reader)?;
                let child = read_payload(reader, child_type, depth + 1)?;
                compound.insert(name, child)?;
            }
            compound
        }
    };
    Ok(tag)
}

// ---- 写入 ----

fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    if name.len() > u16::MAX as usize {
        return Err(MapError::Nbt("字符串长度超过上限".to_string()));
    }
    writer.write_u16::<BigEndian>(name.len() as u16)?;
    writer.write_all(name.as_bytes())?;
    Ok(())
}

fn write_length<W: Write>(writer: &mut W, len: usize) -> Result<()> {
    if len > i32::MAX as usize {
        return Err(MapError::Nbt("长度超过上限".to_string()));
    }
    writer.write_i32::<BigEndian>(len as i32)?;
    Ok(())
}

/// 写入带类型和名称头的标签
pub fn write_named<W: Write>(writer: &mut W, name: &str, tag: &Tag) -> Result<()> {
    writer.write_u8(tag.tag_type() as u8)?;
    write_name(writer, name)?;
    write_payload(writer, tag)
}

/// 只写入负载，用于列表元素
pub fn write_payload<W: Write>(writer: &mut W, tag: &Tag) -> Result<()> {
    match tag {
        Tag::Byte(v) => writer.write_u8(*v)?,
        Tag::Short(v) => writer.write_i16::<BigEndian>(*v)?,
        Tag::Int(v) => writer.write_i32::<BigEndian>(*v)?,
        Tag::Long(v) => writer.write_i64::<BigEndian>(*v)?,
        Tag::Float(v) => writer.write_f32::<NativeEndian>(*v)?,
        Tag::Double(v) => writer.write_f64::<NativeEndian>(*v)?,
        Tag::Bytes(v) => {
            write_length(writer, v.len())?;
            writer.write_all(v)?;
        }
        Tag::String(v) => write_name(writer, v)?,
        Tag::List(child_type, items) => {
            if let Some(bad) = items.iter().find(|item| item.tag_type() != *child_type) {
                return Err(MapError::Nbt(format!(
                    "列表元素类型应为 {}，实际为 {}",
                    child_type,
                    bad.tag_type()
                )));
            }
            writer.write_u8(*child_type as u8)?;
            write_length(writer, items.len())?;
            for item in items {
                write_payload(writer, item)?;
            }
        }
        Tag::Compound(children) => {
            for (name, child) in children {
                write_named(writer, name, child)?;
            }
            writer.write_u8(TagType::End as u8)?;
        }
    }
    Ok(())
}

impl NamedTag {
    pub fn new(name: impl Into<String>, tag: Tag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        read_named(reader)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_named(writer, &self.name, &self.tag)
    }

    pub fn render(&self) -> String {
        self.tag.render(Some(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_tree() -> NamedTag {
        let spawn = Tag::list(
            TagType::Short,
            vec![Tag::Short(8), Tag::Short(-3), Tag::Short(128)],
        )
        .unwrap();
        let map = Tag::compound([
            ("Width", Tag::Short(16)),
            ("Spawn", spawn),
            ("Blocks", Tag::Bytes(vec![1, 2, 3, 4])),
        ])
        .unwrap();
        let entities = Tag::list(
            TagType::Compound,
            vec![
                Tag::compound([("id", Tag::String("Pig".into())), ("hp", Tag::Int(10))]).unwrap(),
                Tag::compound([("id", Tag::String("Cow".into()))]).unwrap(),
            ],
        )
        .unwrap();
        let root = Tag::compound([
            ("Map", map),
            ("Entities", entities),
            ("Seed", Tag::Long(-1234567890123)),
            ("Gravity", Tag::Float(9.81)),
            ("Scale", Tag::Double(0.5)),
            ("Flag", Tag::Byte(1)),
            ("Empty", Tag::List(TagType::End, Vec::new())),
        ])
        .unwrap();
        NamedTag::new("MinecraftLevel", root)
    }

    #[test]
    fn nested_tree_survives_write_and_read() {
        let tree = sample_tree();
        let mut buffer = Vec::new();
        tree.write_to(&mut buffer).unwrap();
        let back = NamedTag::read_from(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(back, tree);

        let keys: Vec<_> = back.tag.as_compound().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["Map", "Entities", "Seed", "Gravity", "Scale", "Flag", "Empty"]);
    }

    #[test]
    fn header_layout_is_type_then_big_endian_name() {
        let mut buffer = Vec::new();
        write_named(&mut buffer, "ab", &Tag::Int(0x01020304)).unwrap();
        assert_eq!(buffer, vec![3, 0, 2, b'a', b'b', 1, 2, 3, 4]);
    }

    #[test]
    fn list_payload_has_no_per_item_headers() {
        let list = Tag::list(TagType::Short, vec![Tag::Short(1), Tag::Short(2)]).unwrap();
        let mut buffer = Vec::new();
        write_payload(&mut buffer, &list).unwrap();
        assert_eq!(buffer, vec![2, 0, 0, 0, 2, 0, 1, 0, 2]);
    }

    #[test]
    fn duplicate_names_are_rejected_on_construction() {
        let err = Tag::compound([("a", Tag::Byte(1)), ("a", Tag::Byte(2))]).unwrap_err();
        assert!(matches!(err, MapError::Nbt(_)));

        let mut compound = Tag::compound([("a", Tag::Byte(1))]).unwrap();
        assert!(compound.insert("a", Tag::Byte(2)).is_err());
        assert_eq!(compound.get("a"), Some(&Tag::Byte(1)));
    }

    #[test]
    fn duplicate_names_are_rejected_on_read() {
        // TAG_Compound "" { TAG_Byte "x": 1, TAG_Byte "x": 2 }
        let raw = vec![10, 0, 0, 1, 0, 1, b'x', 1, 1, 0, 1, b'x', 2, 0];
        let err = read_named(&mut Cursor::new(&raw)).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn heterogeneous_lists_are_rejected() {
        assert!(Tag::list(TagType::Byte, vec![Tag::Byte(1), Tag::Short(2)]).is_err());

        let mut list = Tag::List(TagType::End, Vec::new());
        list.append(Tag::Int(1)).unwrap();
        assert!(list.append(Tag::Byte(1)).is_err());
        assert_eq!(list.len(), 1);

        let broken = Tag::List(TagType::Byte, vec![Tag::Int(5)]);
        assert!(write_payload(&mut Vec::new(), &broken).is_err());
    }

    #[test]
    fn set_and_remove_edit_in_place() {
        let mut compound = Tag::compound([("a", Tag::Byte(1)), ("b", Tag::Byte(2))]).unwrap();
        assert_eq!(compound.set("a", Tag::Byte(9)).unwrap(), Some(Tag::Byte(1)));
        assert_eq!(compound.remove("a"), Some(Tag::Byte(9)));
        assert_eq!(compound.remove("a"), None);
        assert!(Tag::Int(1).set("a", Tag::Byte(0)).is_err());

        let mut list = Tag::list(TagType::Byte, vec![Tag::Byte(1), Tag::Byte(2)]).unwrap();
        assert_eq!(list.remove_at(0), Some(Tag::Byte(1)));
        assert_eq!(list.get_index(0), Some(&Tag::Byte(2)));
    }

    #[test]
    fn children_yields_only_direct_descendants() {
        let tree = sample_tree();
        let names: Vec<_> = tree.tag.children().map(|(name, _)| name).collect();
        assert_eq!(names.len(), 7);
        assert!(names.iter().all(Option::is_some));

        let spawn = tree.tag.get("Map").and_then(|m| m.get("Spawn")).unwrap();
        assert!(spawn.children().all(|(name, _)| name.is_none()));
        assert_eq!(Tag::Int(3).children().count(), 0);
    }

    #[test]
    fn node_refs_reconstruct_paths() {
        let tree = sample_tree();
        let root = NodeRef::root(&tree);
        let map = root.child("Map").unwrap();
        let spawn = map.child("Spawn").unwrap();
        let y = spawn.item(1).unwrap();

        assert_eq!(y.tag(), &Tag::Short(-3));
        assert_eq!(y.full_name(), "MinecraftLevel.Map.Spawn[1]");
        assert_eq!(y.parent().and_then(|p| p.name()), Some("Spawn"));
        assert!(root.child("Missing").is_none());
        assert!(spawn.item(3).is_none());
    }

    #[test]
    fn render_lists_every_level() {
        let text = sample_tree().render();
        assert!(text.starts_with("TAG_Compound(\"MinecraftLevel\"): 7 entries"));
        assert!(text.contains("TAG_Short(\"Width\"): 16"));
        assert!(text.contains("TAG_List(\"Spawn\"): 3 entries of TAG_Short"));
        assert!(text.contains("TAG_String(\"id\"): \"Cow\""));
    }

    #[test]
    fn truncated_and_invalid_streams_fail() {
        let tree = sample_tree();
        let mut buffer = Vec::new();
        tree.write_to(&mut buffer).unwrap();
        assert!(read_named(&mut Cursor::new(&buffer[..buffer.len() - 3])).is_err());
        assert!(read_named(&mut Cursor::new(&[0u8])).is_err());
        assert!(read_named(&mut Cursor::new(&[42u8, 0, 0])).is_err());
    }
}
