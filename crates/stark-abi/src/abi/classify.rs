//! Type classifier and declaration registry

use std::collections::HashMap;

use super::types::{AddressKind, Category, IntegerKind};
use crate::contract::{short_name, Abi};
use crate::AbiError;

const FELT_TYPES: &[&str] = &["core::felt252", "felt252", "felt"];

const BOOL_TYPES: &[&str] = &["core::bool", "bool"];

const U256_TYPES: &[&str] = &["core::integer::u256", "u256"];

const U512_TYPES: &[&str] = &["core::integer::u512", "u512"];

const BYTES31_TYPES: &[&str] = &["core::bytes_31::bytes31", "bytes31"];

const BYTE_ARRAY_TYPES: &[&str] = &["core::byte_array::ByteArray", "ByteArray"];

const INTEGER_TYPES: &[(&str, IntegerKind)] = &[
    ("u8", IntegerKind::unsigned(8)),
    ("u16", IntegerKind::unsigned(16)),
    ("u32", IntegerKind::unsigned(32)),
    ("u64", IntegerKind::unsigned(64)),
    ("u128", IntegerKind::unsigned(128)),
    ("usize", IntegerKind::unsigned(64)),
    ("i8", IntegerKind::signed(8)),
    ("i16", IntegerKind::signed(16)),
    ("i32", IntegerKind::signed(32)),
    ("i64", IntegerKind::signed(64)),
    ("i128", IntegerKind::signed(128)),
];

const ADDRESS_TYPES: &[(&str, AddressKind)] = &[
    (
        "core::starknet::contract_address::ContractAddress",
        AddressKind::Contract,
    ),
    ("core::starknet::eth_address::EthAddress", AddressKind::Eth),
    ("core::starknet::class_hash::ClassHash", AddressKind::ClassHash),
    (
        "core::starknet::storage_access::StorageAddress",
        AddressKind::Storage,
    ),
];

/// Declared type kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// Struct declaration
    Struct,
    /// Enum declaration
    Enum,
}

/// A struct member or enum variant with its classified type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member or variant name
    pub name: String,
    /// Type name as declared
    pub ty: String,
    /// Classified type
    pub category: Category,
}

/// Classified struct declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Qualified name
    pub name: String,
    /// Members in wire order
    pub members: Vec<Member>,
}

/// Classified enum declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Qualified name
    pub name: String,
    /// Variants in discriminant order
    pub variants: Vec<Member>,
}

/// Struct and enum declarations of one ABI, classified once
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    structs: HashMap<String, StructDef>,
    enums: HashMap<String, EnumDef>,
    max_depth: usize,
}

impl TypeRegistry {
    /// Build from an ABI document.
    ///
    /// Declaration names are collected first so members may reference
    /// declarations that appear later. Member types that resolve nowhere are
    /// kept as [`Category::Unresolved`].
    pub fn from_abi(abi: &Abi, max_depth: usize) -> Result<Self, AbiError> {
        let mut kinds = HashMap::new();
        for s in abi.structs() {
            kinds.insert(s.name.clone(), DeclKind::Struct);
        }
        for e in abi.enums() {
            kinds.insert(e.name.clone(), DeclKind::Enum);
        }
        let lookup = |name: &str| kinds.get(name).copied();

        let classify_member = |name: &str, ty: &str| -> Result<Member, AbiError> {
            let category = match classify_with(ty, &lookup, 0, max_depth) {
                Ok(category) => category,
                Err(AbiError::UnknownType(_)) => {
                    tracing::debug!(member = name, ty, "unresolved member type");
                    Category::Unresolved(ty.to_string())
                }
                Err(e) => return Err(e),
            };
            Ok(Member {
                name: name.to_string(),
                ty: ty.to_string(),
                category,
            })
        };

        let mut structs = HashMap::new();
        for s in abi.structs() {
            let members = s
                .members
                .iter()
                .map(|m| classify_member(&m.name, &m.ty))
                .collect::<Result<Vec<_>, _>>()?;
            structs.insert(
                s.name.clone(),
                StructDef {
                    name: s.name.clone(),
                    members,
                },
            );
        }

        let mut enums = HashMap::new();
        for e in abi.enums() {
            let variants = e
                .variants
                .iter()
                .map(|v| classify_member(&v.name, &v.ty))
                .collect::<Result<Vec<_>, _>>()?;
            enums.insert(
                e.name.clone(),
                EnumDef {
                    name: e.name.clone(),
                    variants,
                },
            );
        }

        tracing::trace!(
            structs = structs.len(),
            enums = enums.len(),
            "type registry built"
        );

        Ok(Self {
            structs,
            enums,
            max_depth,
        })
    }

    /// Recursion ceiling used for classification
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Classify a type reference
    pub fn classify(&self, ty: &str) -> Result<Category, AbiError> {
        classify_with(ty, &|name| self.decl_kind(name), 0, self.max_depth)
    }

    /// Kind of a declared name
    pub fn decl_kind(&self, name: &str) -> Option<DeclKind> {
        if self.structs.contains_key(name) {
            Some(DeclKind::Struct)
        } else if self.enums.contains_key(name) {
            Some(DeclKind::Enum)
        } else {
            None
        }
    }

    /// Struct declaration by qualified name
    pub fn struct_def(&self, name: &str) -> Result<&StructDef, AbiError> {
        self.structs
            .get(name)
            .ok_or_else(|| AbiError::UnknownType(name.to_string()))
    }

    /// Enum declaration by qualified name
    pub fn enum_def(&self, name: &str) -> Result<&EnumDef, AbiError> {
        self.enums
            .get(name)
            .ok_or_else(|| AbiError::UnknownType(name.to_string()))
    }

    /// Wire width of a category when it does not depend on the value.
    ///
    /// Arrays, byte strings, options and results are variable. A declared
    /// enum is fixed only when every variant carries the same payload width.
    pub fn fixed_width(&self, category: &Category) -> Option<usize> {
        self.fixed_width_at(category, 0)
    }

    fn fixed_width_at(&self, category: &Category, depth: usize) -> Option<usize> {
        if depth > self.max_depth {
            return None;
        }
        match category {
            Category::Felt
            | Category::Bool
            | Category::Integer(_)
            | Category::Address(_)
            | Category::Bytes31 => Some(1),
            Category::U256 => Some(2),
            Category::U512 => Some(4),
            Category::Unit => Some(0),
            Category::Tuple(items) => items
                .iter()
                .map(|c| self.fixed_width_at(c, depth + 1))
                .sum(),
            Category::Struct(name) => {
                let def = self.structs.get(name)?;
                def.members
                    .iter()
                    .map(|m| self.fixed_width_at(&m.category, depth + 1))
                    .sum()
            }
            Category::Enum(name) => {
                let def = self.enums.get(name)?;
                let mut widths = def
                    .variants
                    .iter()
                    .map(|v| self.fixed_width_at(&v.category, depth + 1));
                let first = widths.next()??;
                for w in widths {
                    if w? != first {
                        return None;
                    }
                }
                Some(1 + first)
            }
            Category::ByteArray
            | Category::Array(_)
            | Category::Option(_)
            | Category::Result(_, _)
            | Category::Unresolved(_) => None,
        }
    }
}

/// Classify `ty` given a lookup of declared names.
///
/// Built-in patterns win over declarations, since ABIs redeclare
/// `core::integer::u256`, `core::bool` and friends.
pub fn classify_with(
    ty: &str,
    lookup: &dyn Fn(&str) -> Option<DeclKind>,
    depth: usize,
    max_depth: usize,
) -> Result<Category, AbiError> {
    if depth > max_depth {
        return Err(AbiError::RecursionLimit(max_depth));
    }
    let ty = ty.trim();

    if let Some(inner) = enclosed_in_parens(ty) {
        let inner = inner.trim();
        if inner.is_empty() {
            return Ok(Category::Unit);
        }
        let items = split_top_level(inner)
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|item| classify_with(item, lookup, depth + 1, max_depth))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Category::Tuple(items));
    }

    if let Some(category) = classify_scalar(ty) {
        return Ok(category);
    }

    if let Some((base, args)) = split_generic(ty) {
        let category = match short_name(base) {
            "Array" | "Span" => {
                let [elem] = expect_args::<1>(ty, &args)?;
                Category::Array(Box::new(classify_with(
                    elem,
                    lookup,
                    depth + 1,
                    max_depth,
                )?))
            }
            "Option" => {
                let [inner] = expect_args::<1>(ty, &args)?;
                Category::Option(Box::new(classify_lenient(
                    inner,
                    lookup,
                    depth + 1,
                    max_depth,
                )?))
            }
            "Result" => {
                let [ok, err] = expect_args::<2>(ty, &args)?;
                Category::Result(
                    Box::new(classify_lenient(ok, lookup, depth + 1, max_depth)?),
                    Box::new(classify_lenient(err, lookup, depth + 1, max_depth)?),
                )
            }
            _ => match lookup(ty) {
                Some(kind) => declared(ty, kind),
                None => return Err(AbiError::UnknownType(ty.to_string())),
            },
        };
        return Ok(category);
    }

    match lookup(ty) {
        Some(kind) => Ok(declared(ty, kind)),
        None => Err(AbiError::UnknownType(ty.to_string())),
    }
}

fn declared(ty: &str, kind: DeclKind) -> Category {
    match kind {
        DeclKind::Struct => Category::Struct(ty.to_string()),
        DeclKind::Enum => Category::Enum(ty.to_string()),
    }
}

// Option and Result arguments are frequently exotic; keep them decodable as raw.
fn classify_lenient(
    ty: &str,
    lookup: &dyn Fn(&str) -> Option<DeclKind>,
    depth: usize,
    max_depth: usize,
) -> Result<Category, AbiError> {
    match classify_with(ty, lookup, depth, max_depth) {
        Err(AbiError::UnknownType(_)) => Ok(Category::Unresolved(ty.trim().to_string())),
        other => other,
    }
}

fn classify_scalar(ty: &str) -> Option<Category> {
    let short = short_name(ty);
    let listed = |table: &[&str]| table.contains(&ty);

    if listed(FELT_TYPES) {
        return Some(Category::Felt);
    }
    if listed(BOOL_TYPES) {
        return Some(Category::Bool);
    }
    if listed(U256_TYPES) {
        return Some(Category::U256);
    }
    if listed(U512_TYPES) {
        return Some(Category::U512);
    }
    if listed(BYTES31_TYPES) {
        return Some(Category::Bytes31);
    }
    if listed(BYTE_ARRAY_TYPES) {
        return Some(Category::ByteArray);
    }
    if ty == short || ty == format!("core::integer::{}", short) {
        if let Some((_, kind)) = INTEGER_TYPES.iter().find(|(name, _)| *name == short) {
            return Some(Category::Integer(*kind));
        }
    }
    ADDRESS_TYPES
        .iter()
        .find(|(name, _)| *name == ty || short_name(name) == ty)
        .map(|(_, kind)| Category::Address(*kind))
}

fn expect_args<'a, const N: usize>(ty: &str, args: &[&'a str]) -> Result<[&'a str; N], AbiError> {
    <[&str; N]>::try_from(args).map_err(|_| {
        AbiError::UnknownType(format!(
            "{}: expected {} generic argument(s), got {}",
            ty,
            N,
            args.len()
        ))
    })
}

/// Split `Name<A, B>` (or `Name::<A, B>`) into the base name and its
/// top-level arguments.
pub fn split_generic(ty: &str) -> Option<(&str, Vec<&str>)> {
    let open = ty.find('<')?;
    if !ty.ends_with('>') {
        return None;
    }
    let base = ty[..open].trim_end_matches("::");
    Some((base, parse_generic_args(&ty[open + 1..ty.len() - 1])))
}

/// Split generic arguments on top-level commas
pub fn parse_generic_args(args: &str) -> Vec<&str> {
    split_top_level(args)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
}

/// Inner text when the opening parenthesis at index 0 closes at the very end.
fn enclosed_in_parens(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Split on commas that are not nested inside `<>`, `()` or `[]`
pub fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_decls(_: &str) -> Option<DeclKind> {
        None
    }

    fn classify(ty: &str) -> Result<Category, AbiError> {
        classify_with(ty, &no_decls, 0, 64)
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        assert_eq!(
            split_top_level("core::integer::u128, (u8, u16), Array<(u8, u8)>"),
            vec!["core::integer::u128", "(u8, u16)", "Array<(u8, u8)>"]
        );
        assert_eq!(
            parse_generic_args("Option<Array<u8>>, felt252"),
            vec!["Option<Array<u8>>", "felt252"]
        );
    }

    #[test]
    fn test_split_generic_path_syntax() {
        let (base, args) = split_generic("core::array::Array::<core::felt252>").unwrap();
        assert_eq!(base, "core::array::Array");
        assert_eq!(args, vec!["core::felt252"]);
        assert!(split_generic("core::felt252").is_none());
    }

    #[test]
    fn test_classify_scalars() {
        assert_eq!(classify("core::felt252").unwrap(), Category::Felt);
        assert_eq!(classify("core::bool").unwrap(), Category::Bool);
        assert_eq!(
            classify("core::integer::u64").unwrap(),
            Category::Integer(IntegerKind::unsigned(64))
        );
        assert_eq!(
            classify("core::integer::i16").unwrap(),
            Category::Integer(IntegerKind::signed(16))
        );
        assert_eq!(classify("u256").unwrap(), Category::U256);
        assert_eq!(classify("core::integer::u512").unwrap(), Category::U512);
        assert_eq!(
            classify("core::starknet::class_hash::ClassHash").unwrap(),
            Category::Address(AddressKind::ClassHash)
        );
        assert_eq!(classify("ContractAddress").unwrap(), Category::Address(AddressKind::Contract));
    }

    #[test]
    fn test_classify_u256_is_not_a_narrow_integer() {
        assert_eq!(classify("core::integer::u256").unwrap(), Category::U256);
        assert!(classify("core::integer::u2").is_err());
    }

    #[test]
    fn test_classify_unit_and_tuple() {
        assert_eq!(classify("()").unwrap(), Category::Unit);
        assert_eq!(
            classify("(core::integer::u128, core::integer::u256)").unwrap(),
            Category::Tuple(vec![
                Category::Integer(IntegerKind::unsigned(128)),
                Category::U256
            ])
        );
    }

    #[test]
    fn test_classify_parenthesized_list_is_not_a_tuple() {
        assert!(matches!(
            classify("(core::felt252), (core::bool)"),
            Ok(Category::Unresolved(_)) | Err(AbiError::UnknownType(_))
        ));
        assert_eq!(
            classify("((core::felt252), core::bool)").unwrap(),
            Category::Tuple(vec![Category::Tuple(vec![Category::Felt]), Category::Bool])
        );
    }

    #[test]
    fn test_classify_generics() {
        assert_eq!(
            classify("core::array::Span::<core::felt252>").unwrap(),
            Category::Array(Box::new(Category::Felt))
        );
        assert_eq!(
            classify("core::option::Option::<my::Unknown>").unwrap(),
            Category::Option(Box::new(Category::Unresolved("my::Unknown".to_string())))
        );
        assert!(matches!(
            classify("core::result::Result::<u8>"),
            Err(AbiError::UnknownType(_))
        ));
    }

    #[test]
    fn test_classify_unknown_type() {
        assert!(matches!(
            classify("contracts::Missing"),
            Err(AbiError::UnknownType(_))
        ));
        assert!(matches!(
            classify("core::array::Array::<contracts::Missing>"),
            Err(AbiError::UnknownType(_))
        ));
    }

    #[test]
    fn test_classify_declared() {
        let lookup = |name: &str| match name {
            "my::Point" => Some(DeclKind::Struct),
            "my::Color" => Some(DeclKind::Enum),
            _ => None,
        };
        assert_eq!(
            classify_with("my::Point", &lookup, 0, 64).unwrap(),
            Category::Struct("my::Point".to_string())
        );
        assert_eq!(
            classify_with("Array<my::Color>", &lookup, 0, 64).unwrap(),
            Category::Array(Box::new(Category::Enum("my::Color".to_string())))
        );
    }

    #[test]
    fn test_classify_recursion_limit() {
        let deep = format!("{}u8{}", "Array<".repeat(10), ">".repeat(10));
        assert!(matches!(
            classify_with(&deep, &no_decls, 0, 4),
            Err(AbiError::RecursionLimit(4))
        ));
        assert!(classify_with(&deep, &no_decls, 0, 64).is_ok());
    }
}
