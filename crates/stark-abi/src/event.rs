//! Event key/data split, decoding and filter composition

use serde_json::{Map, Value as Json};
use stark_primitives::Felt;

use crate::abi::{Category, Decoder, Encoder, TypeRegistry, Value};
use crate::contract::{short_name, EventDecl, EventKind, EventMember, MemberKind};
use crate::{AbiError, CodecConfig};

/// Partition members into the key stream and the data stream, each in
/// declared order
pub fn split_members(event: &EventDecl) -> (Vec<&EventMember>, Vec<&EventMember>) {
    event
        .members
        .iter()
        .partition(|m| m.kind == MemberKind::Key)
}

/// An event member with its classified type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMember {
    /// Member name
    pub name: String,
    /// Declared type name
    pub ty: String,
    /// Key or data
    pub kind: MemberKind,
    /// Classified type
    pub category: Category,
}

/// Classified layout of a struct event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLayout {
    name: String,
    selector: Felt,
    members: Vec<LayoutMember>,
}

/// A decoded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Qualified event name
    pub name: String,
    /// Members in declared order
    pub fields: Vec<(String, Value)>,
}

impl DecodedEvent {
    /// Trailing segment of the event name
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Member value by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Members as a display JSON object
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl EventLayout {
    /// Classify the members of a struct event.
    ///
    /// In lenient mode a member type that resolves nowhere is kept as
    /// [`Category::Unresolved`]; strict mode rejects it.
    pub fn new(
        event: &EventDecl,
        registry: &TypeRegistry,
        config: &CodecConfig,
    ) -> Result<Self, AbiError> {
        if event.kind != EventKind::Struct {
            return Err(AbiError::shape(
                event.name.as_str(),
                "enum events have no members of their own",
            ));
        }
        let members = event
            .members
            .iter()
            .map(|m| {
                let category = match registry.classify(&m.ty) {
                    Ok(category) => category,
                    Err(AbiError::UnknownType(_)) if config.lenient => {
                        Category::Unresolved(m.ty.clone())
                    }
                    Err(e) => return Err(e),
                };
                Ok(LayoutMember {
                    name: m.name.clone(),
                    ty: m.ty.clone(),
                    kind: m.kind,
                    category,
                })
            })
            .collect::<Result<Vec<_>, AbiError>>()?;

        Ok(Self {
            name: event.name.clone(),
            selector: event.selector(),
            members,
        })
    }

    /// Qualified event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selector expected in `keys[0]`
    pub fn selector(&self) -> Felt {
        self.selector
    }

    /// All members in declared order
    pub fn members(&self) -> &[LayoutMember] {
        &self.members
    }

    /// Key members in declared order
    pub fn key_members(&self) -> impl Iterator<Item = &LayoutMember> {
        self.members.iter().filter(|m| m.kind == MemberKind::Key)
    }

    /// Data members in declared order
    pub fn data_members(&self) -> impl Iterator<Item = &LayoutMember> {
        self.members.iter().filter(|m| m.kind == MemberKind::Data)
    }

    /// Decode an emitted event.
    ///
    /// Key members are read from `keys[1..]` (`keys[0]` is the selector) and
    /// data members from `data`, with independent cursors.
    pub fn decode(
        &self,
        registry: &TypeRegistry,
        config: &CodecConfig,
        keys: &[Felt],
        data: &[Felt],
    ) -> Result<DecodedEvent, AbiError> {
        let decoder = Decoder::new(registry, config);
        let mut key_pos = 1;
        let mut data_pos = 0;
        let mut fields = Vec::with_capacity(self.members.len());

        for member in &self.members {
            let value = match member.kind {
                MemberKind::Key => {
                    let (value, consumed) =
                        decoder.decode_member(&member.category, keys, key_pos, 0)?;
                    key_pos += consumed;
                    value
                }
                MemberKind::Data => {
                    let (value, consumed) =
                        decoder.decode_member(&member.category, data, data_pos, 0)?;
                    data_pos += consumed;
                    value
                }
            };
            fields.push((member.name.clone(), value));
        }

        if key_pos < keys.len() || data_pos < data.len() {
            tracing::debug!(
                event = %self.name,
                unread_keys = keys.len().saturating_sub(key_pos),
                unread_data = data.len().saturating_sub(data_pos),
                "event has trailing felts"
            );
        }

        Ok(DecodedEvent {
            name: self.name.clone(),
            fields,
        })
    }

    /// Build the per-position key filter.
    ///
    /// `filter` maps key member names to a value, or to a JSON array of
    /// candidate values (OR). For array members only an array of arrays is
    /// read as candidates. Every position gets a candidate list; an empty
    /// list matches anything.
    ///
    /// A member without a filter yields wildcards for each of its felts when
    /// its width is fixed. Otherwise composition stops there, as it does when
    /// candidates encode to different widths (an error in strict mode).
    pub fn compose_filter_keys(
        &self,
        registry: &TypeRegistry,
        config: &CodecConfig,
        filter: &Json,
    ) -> Result<Vec<Vec<Felt>>, AbiError> {
        let empty = Map::new();
        let filter = match filter {
            Json::Object(map) => map,
            Json::Null => &empty,
            other => {
                return Err(AbiError::shape(
                    self.name.as_str(),
                    format!("expected a filter object, got {}", other),
                ))
            }
        };
        let encoder = Encoder::new(registry, config);
        let mut keys: Vec<Vec<Felt>> = Vec::new();

        for member in self.key_members() {
            let value = filter
                .get(&member.name)
                .filter(|v| !is_wildcard(v, &member.category));

            let Some(value) = value else {
                match registry.fixed_width(&member.category) {
                    Some(width) => keys.extend((0..width).map(|_| Vec::new())),
                    None => {
                        tracing::debug!(
                            member = %member.name,
                            "wildcard on variable-width key, filter truncated"
                        );
                        break;
                    }
                }
                continue;
            };

            match candidates(value, &member.category) {
                None => {
                    let felts = encoder.encode(&member.category, value)?;
                    keys.extend(felts.into_iter().map(|f| vec![f]));
                }
                Some(items) => {
                    let encoded = items
                        .iter()
                        .map(|item| encoder.encode(&member.category, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    let width = encoded.first().map_or(0, Vec::len);
                    if encoded.iter().any(|e| e.len() != width) {
                        if !config.lenient {
                            return Err(AbiError::UnsupportedFilterPattern {
                                member: member.name.clone(),
                                reason: "candidates encode to different widths".to_string(),
                            });
                        }
                        tracing::debug!(
                            member = %member.name,
                            "non-uniform candidates, filter truncated"
                        );
                        break;
                    }
                    for pos in 0..width {
                        keys.push(encoded.iter().map(|e| e[pos]).collect());
                    }
                }
            }
        }

        Ok(keys)
    }

    /// Filter keys with the event selector as the first position
    pub fn keys_with_selector(
        &self,
        registry: &TypeRegistry,
        config: &CodecConfig,
        filter: &Json,
    ) -> Result<Vec<Vec<Felt>>, AbiError> {
        let mut keys = vec![vec![self.selector]];
        keys.extend(self.compose_filter_keys(registry, config, filter)?);
        Ok(keys)
    }
}

// Null, and an empty candidate list on a non-array member, filter nothing.
fn is_wildcard(value: &Json, category: &Category) -> bool {
    match value {
        Json::Null => true,
        Json::Array(items) => items.is_empty() && !category.is_array(),
        _ => false,
    }
}

fn candidates<'v>(value: &'v Json, category: &Category) -> Option<&'v Vec<Json>> {
    let Json::Array(items) = value else {
        return None;
    };
    if !category.is_array() || (!items.is_empty() && items.iter().all(Json::is_array)) {
        Some(items)
    } else {
        None
    }
}
