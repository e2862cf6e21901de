//! Contract ABI document model

use serde::{Deserialize, Serialize};
use stark_crypto::selector_from_name;
use stark_primitives::Felt;

use crate::AbiError;

/// A contract ABI: an ordered list of declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi {
    entries: Vec<AbiEntry>,
}

/// One top-level ABI entry, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiEntry {
    /// Free-standing function
    Function(FunctionDecl),
    /// Constructor
    Constructor(ConstructorDecl),
    /// L1 message handler
    L1Handler(FunctionDecl),
    /// Interface grouping function signatures
    Interface(InterfaceDecl),
    /// Interface implementation marker
    Impl(ImplDecl),
    /// Struct declaration
    Struct(StructDecl),
    /// Enum declaration
    Enum(EnumDecl),
    /// Event declaration
    Event(EventDecl),
}

/// Named, typed parameter or member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name, empty for function outputs
    #[serde(default)]
    pub name: String,
    /// Fully qualified type name
    #[serde(rename = "type")]
    pub ty: String,
}

impl Param {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateMutability {
    /// Read-only
    View,
    /// State-changing
    External,
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Output types
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// View or external
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

impl FunctionDecl {
    /// Entry point selector
    pub fn selector(&self) -> Felt {
        selector_from_name(&self.name)
    }
}

/// Constructor signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    /// Usually `constructor`
    pub name: String,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<Param>,
}

/// Interface declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    /// Qualified interface name
    pub name: String,
    /// Function signatures
    #[serde(default)]
    pub items: Vec<FunctionDecl>,
}

/// Implementation marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplDecl {
    /// Impl name
    pub name: String,
    /// Implemented interface
    pub interface_name: String,
}

/// Struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    /// Qualified struct name
    pub name: String,
    /// Members in wire order
    #[serde(default)]
    pub members: Vec<Param>,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    /// Qualified enum name
    pub name: String,
    /// Variants in discriminant order, `()` for unit variants
    #[serde(default)]
    pub variants: Vec<Param>,
}

/// Event declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Members split across keys and data
    Struct,
    /// Variants referencing other events
    Enum,
}

/// Which stream an event member travels in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Indexed, part of `keys`
    Key,
    /// Not indexed, part of `data`
    Data,
}

/// How an event enum variant embeds its event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Variant adds its own selector key
    Nested,
    /// Variant is flattened into the parent
    Flat,
}

/// Event struct member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMember {
    /// Member name
    pub name: String,
    /// Fully qualified type name
    #[serde(rename = "type")]
    pub ty: String,
    /// Key or data
    pub kind: MemberKind,
}

/// Event enum variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventVariant {
    /// Variant name
    pub name: String,
    /// Referenced event name
    #[serde(rename = "type")]
    pub ty: String,
    /// Nested or flat
    pub kind: VariantKind,
}

/// Event declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDecl {
    /// Qualified event name
    pub name: String,
    /// Struct or enum event
    pub kind: EventKind,
    /// Members, for struct events
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<EventMember>,
    /// Variants, for enum events
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<EventVariant>,
}

impl EventDecl {
    /// Trailing path segment of the name
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Selector carried in `keys[0]`
    pub fn selector(&self) -> Felt {
        selector_from_name(self.short_name())
    }
}

/// Trailing `::` segment of a qualified name
pub fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

impl Abi {
    /// Build from entries
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    /// Parse an ABI JSON document
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Ok(serde_json::from_str(json)?)
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    /// Struct declarations
    pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Enum declarations
    pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Enum(e) => Some(e),
            _ => None,
        })
    }

    /// Event declarations
    pub fn events(&self) -> impl Iterator<Item = &EventDecl> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Event(e) => Some(e),
            _ => None,
        })
    }

    /// Callable functions: free functions, L1 handlers and interface items
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.entries.iter().flat_map(|e| match e {
            AbiEntry::Function(f) | AbiEntry::L1Handler(f) => std::slice::from_ref(f).iter(),
            AbiEntry::Interface(i) => i.items.iter(),
            _ => (&[] as &[FunctionDecl]).iter(),
        })
    }

    /// Constructor, if declared
    pub fn constructor(&self) -> Option<&ConstructorDecl> {
        self.entries.iter().find_map(|e| match e {
            AbiEntry::Constructor(c) => Some(c),
            _ => None,
        })
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Result<&FunctionDecl, AbiError> {
        self.functions()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    /// Find a function by entry point selector
    pub fn function_by_selector(&self, selector: &Felt) -> Result<&FunctionDecl, AbiError> {
        self.functions()
            .find(|f| f.selector() == *selector)
            .ok_or_else(|| AbiError::UnknownFunction(selector.to_hex()))
    }

    /// Functions with the given mutability
    pub fn functions_by_mutability(
        &self,
        mutability: StateMutability,
    ) -> impl Iterator<Item = &FunctionDecl> {
        self.functions()
            .filter(move |f| f.state_mutability == Some(mutability))
    }

    /// Find an event by fully qualified name or by trailing segment
    pub fn event(&self, name: &str) -> Result<&EventDecl, AbiError> {
        if let Some(event) = self.events().find(|e| e.name == name) {
            return Ok(event);
        }
        let mut matches = self.events().filter(|e| e.short_name() == name);
        match (matches.next(), matches.next()) {
            (Some(event), None) => Ok(event),
            (Some(_), Some(_)) => Err(AbiError::AmbiguousEvent(name.to_string())),
            _ => Err(AbiError::UnknownEvent(name.to_string())),
        }
    }

    /// Find the struct event whose selector equals `keys[0]`
    pub fn event_by_selector(&self, selector: &Felt) -> Result<&EventDecl, AbiError> {
        self.events()
            .filter(|e| e.kind == EventKind::Struct)
            .find(|e| e.selector() == *selector)
            .ok_or_else(|| AbiError::UnknownEvent(selector.to_hex()))
    }
}

impl From<Vec<AbiEntry>> for Abi {
    fn from(entries: Vec<AbiEntry>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_abi() -> Abi {
        Abi::from_json(
            r#"[
            {"type": "impl", "name": "TokenImpl", "interface_name": "token::IToken"},
            {"type": "struct", "name": "token::Pair", "members": [
                {"name": "a", "type": "core::felt252"},
                {"name": "b", "type": "core::felt252"}
            ]},
            {"type": "interface", "name": "token::IToken", "items": [
                {"type": "function", "name": "balance_of",
                 "inputs": [{"name": "account", "type": "core::starknet::contract_address::ContractAddress"}],
                 "outputs": [{"type": "core::integer::u256"}],
                 "state_mutability": "view"},
                {"type": "function", "name": "transfer",
                 "inputs": [], "outputs": [], "state_mutability": "external"}
            ]},
            {"type": "constructor", "name": "constructor", "inputs": []},
            {"type": "event", "name": "token::Token::Transfer", "kind": "struct", "members": [
                {"name": "from", "type": "core::starknet::contract_address::ContractAddress", "kind": "key"}
            ]},
            {"type": "event", "name": "other::Transfer", "kind": "struct", "members": []},
            {"type": "event", "name": "token::Token::Event", "kind": "enum", "variants": [
                {"name": "Transfer", "type": "token::Token::Transfer", "kind": "nested"}
            ]}
        ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_abi_parse_entries() {
        let abi = sample_abi();
        assert_eq!(abi.entries().len(), 7);
        assert_eq!(abi.structs().count(), 1);
        assert_eq!(abi.events().count(), 3);
        assert!(abi.constructor().is_some());
    }

    #[test]
    fn test_output_params_have_no_name() {
        let abi = sample_abi();
        let f = abi.function("balance_of").unwrap();
        assert_eq!(f.outputs[0].name, "");
        assert_eq!(f.outputs[0].ty, "core::integer::u256");
    }

    #[test]
    fn test_function_lookup() {
        let abi = sample_abi();
        let selector = abi.function("transfer").unwrap().selector();
        assert_eq!(abi.function_by_selector(&selector).unwrap().name, "transfer");
        assert!(matches!(
            abi.function("mint"),
            Err(AbiError::UnknownFunction(_))
        ));
        assert_eq!(
            abi.functions_by_mutability(StateMutability::View).count(),
            1
        );
    }

    #[test]
    fn test_event_lookup_ambiguous_short_name() {
        let abi = sample_abi();
        assert!(matches!(abi.event("Transfer"), Err(AbiError::AmbiguousEvent(_))));
        assert_eq!(
            abi.event("token::Token::Transfer").unwrap().members.len(),
            1
        );
        assert!(matches!(abi.event("Mint"), Err(AbiError::UnknownEvent(_))));
    }

    #[test]
    fn test_event_by_selector_skips_enum_events() {
        let abi = sample_abi();
        let selector = selector_from_name("Transfer");
        let event = abi.event_by_selector(&selector).unwrap();
        assert_eq!(event.kind, EventKind::Struct);
        assert!(abi.event_by_selector(&selector_from_name("Event")).is_err());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("a::b::C"), "C");
        assert_eq!(short_name("C"), "C");
    }
}
