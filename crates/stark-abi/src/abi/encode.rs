//! Wire value encoding from JSON-shaped input

use primitive_types::{U256, U512};
use serde_json::{Map, Value as Json};
use stark_primitives::Felt;

use super::classify::{split_top_level, TypeRegistry};
use super::types::{Category, IntegerKind};
use crate::byte_array::{encode_short_string, pack};
use crate::{AbiError, CodecConfig};

const TRUE_ALIASES: &[&str] = &["true", "1", "0x1", "0x01", "0x001"];

const FALSE_ALIASES: &[&str] = &["false", "0", "0x0", "0x00", "0x000"];

static NO_PAYLOAD: Json = Json::Null;

/// Encodes user input into felts, guided by classified types.
///
/// Any failure aborts the whole encode; partially built calldata is never
/// returned.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a CodecConfig,
}

impl<'a> Encoder<'a> {
    /// Create an encoder over a registry
    pub fn new(registry: &'a TypeRegistry, config: &'a CodecConfig) -> Self {
        Self { registry, config }
    }

    /// Encode one value
    pub fn encode(&self, category: &Category, input: &Json) -> Result<Vec<Felt>, AbiError> {
        let mut out = Vec::new();
        self.encode_token(category, input, &mut out, 0)?;
        Ok(out)
    }

    fn encode_token(
        &self,
        category: &Category,
        input: &Json,
        out: &mut Vec<Felt>,
        depth: usize,
    ) -> Result<(), AbiError> {
        if depth > self.config.max_depth {
            return Err(AbiError::RecursionLimit(self.config.max_depth));
        }
        let input = if self.has_form_members(category) {
            input
        } else {
            unwrap_form_field(input)
        };

        match category {
            Category::Felt => out.push(parse_felt_or_short_string(input)?),
            Category::Bool => out.push(Felt::from(parse_bool_input(input)?)),
            Category::Integer(kind) => out.push(parse_integer(*kind, input)?),
            Category::U256 => {
                let value = parse_u256("u256", input)?;
                out.push(low_limb(value));
                out.push(low_limb(value >> 128));
            }
            Category::U512 => {
                let value = parse_u512(input)?;
                for i in 0..4 {
                    let limb = (value >> (128 * i)).low_u128();
                    out.push(Felt::from(limb));
                }
            }
            Category::Address(_) => out.push(parse_felt("address", input)?),
            Category::Bytes31 => match input {
                Json::String(s) => out.push(encode_short_string(s)?),
                other => return Err(AbiError::shape("bytes31", expected("a string", other))),
            },
            Category::ByteArray => {
                let text = match input {
                    Json::String(s) => s.clone(),
                    Json::Number(n) => n.to_string(),
                    other => {
                        return Err(AbiError::shape("ByteArray", expected("a string", other)))
                    }
                };
                out.extend(pack(&text).to_felts());
            }
            Category::Unit => {}
            Category::Tuple(items) => {
                let values = tuple_items(items.len(), input)?;
                for (item, value) in items.iter().zip(values.iter()) {
                    self.encode_token(item, value, out, depth + 1)?;
                }
            }
            Category::Array(elem) => {
                let values = array_items(input)?;
                out.push(Felt::from(values.len()));
                for value in &values {
                    self.encode_token(elem, value, out, depth + 1)?;
                }
            }
            Category::Option(inner) => match variant_object(input) {
                _ if is_unset(input) => out.push(Felt::ONE),
                Some(("None", _)) => out.push(Felt::ONE),
                Some(("Some", payload)) => {
                    out.push(Felt::ZERO);
                    self.encode_token(inner, payload, out, depth + 1)?;
                }
                _ => {
                    out.push(Felt::ZERO);
                    self.encode_token(inner, input, out, depth + 1)?;
                }
            },
            Category::Result(ok, err) => match variant_object(input) {
                Some(("Ok", payload)) => {
                    out.push(Felt::ZERO);
                    self.encode_token(ok, payload, out, depth + 1)?;
                }
                Some(("Err", payload)) => {
                    out.push(Felt::ONE);
                    self.encode_token(err, payload, out, depth + 1)?;
                }
                _ => {
                    return Err(AbiError::shape(
                        "Result",
                        expected("{\"Ok\": ..} or {\"Err\": ..}", input),
                    ))
                }
            },
            Category::Struct(name) => {
                let def = self.registry.struct_def(name)?;
                let Json::Object(fields) = input else {
                    return Err(AbiError::shape(name.as_str(), expected("an object", input)));
                };
                for member in &def.members {
                    match fields.get(&member.name) {
                        Some(value) => self.encode_token(&member.category, value, out, depth + 1)?,
                        None if matches!(member.category, Category::Option(_)) => {
                            out.push(Felt::ONE)
                        }
                        None => {
                            return Err(AbiError::shape(
                                name.as_str(),
                                format!("missing member {}", member.name),
                            ))
                        }
                    }
                }
            }
            Category::Enum(name) => {
                let def = self.registry.enum_def(name)?;
                let selected = match input {
                    Json::String(s) => def
                        .variants
                        .iter()
                        .enumerate()
                        .find(|(_, v)| v.name == *s)
                        .map(|(i, v)| (i, v, &NO_PAYLOAD)),
                    Json::Object(map) => {
                        let map = enum_payloads(map);
                        // A lone key selects its variant even with an empty payload
                        let lone = map.len() == 1;
                        def.variants.iter().enumerate().find_map(|(i, v)| {
                            map.get(&v.name)
                                .filter(|payload| lone || !is_unset(payload))
                                .map(|payload| (i, v, payload))
                        })
                    }
                    _ => None,
                };
                let Some((index, variant, payload)) = selected else {
                    return Err(AbiError::shape(
                        name.as_str(),
                        expected("a variant name or {\"Variant\": payload}", input),
                    ));
                };
                out.push(Felt::from(index));
                if variant.category != Category::Unit {
                    self.encode_token(&variant.category, payload, out, depth + 1)?;
                }
            }
            Category::Unresolved(ty) => return Err(AbiError::UnknownType(ty.clone())),
        }
        Ok(())
    }

    // Structs declaring a `type` member are never form fields.
    fn has_form_members(&self, category: &Category) -> bool {
        match category {
            Category::Struct(name) => self
                .registry
                .struct_def(name)
                .map_or(false, |def| def.members.iter().any(|m| m.name == "type")),
            _ => false,
        }
    }
}

/// Interpret a boolean alias
pub fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if TRUE_ALIASES.contains(&s) {
        Some(true)
    } else if FALSE_ALIASES.contains(&s) {
        Some(false)
    } else {
        None
    }
}

fn parse_bool_input(input: &Json) -> Result<bool, AbiError> {
    let parsed = match input {
        Json::Bool(b) => Some(*b),
        Json::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Json::String(s) => parse_bool(s),
        _ => None,
    };
    parsed.ok_or_else(|| AbiError::shape("bool", expected("a boolean alias", input)))
}

// Interactive form fields arrive as `{ "type": ..., "value": ... }`.
fn unwrap_form_field(input: &Json) -> &Json {
    match input {
        Json::Object(map)
            if map.len() == 2 && map.get("type").map_or(false, Json::is_string) =>
        {
            map.get("value").unwrap_or(input)
        }
        _ => input,
    }
}

fn is_unset(input: &Json) -> bool {
    match input {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        _ => false,
    }
}

fn variant_object(input: &Json) -> Option<(&str, &Json)> {
    match input {
        Json::Object(map) if map.len() == 1 => map.iter().next().map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}

fn enum_payloads(map: &Map<String, Json>) -> &Map<String, Json> {
    match map.get("variant") {
        Some(Json::Object(inner)) if map.len() == 1 => inner,
        _ => map,
    }
}

fn tuple_items(len: usize, input: &Json) -> Result<Vec<Json>, AbiError> {
    let items = match input {
        Json::Array(items) => items.clone(),
        Json::Object(map) => (0..len)
            .map(|i| {
                map.get(&i.to_string())
                    .cloned()
                    .ok_or_else(|| AbiError::shape("tuple", format!("missing position {}", i)))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Json::String(s) => {
            let s = s.trim();
            let inner = s
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| AbiError::shape("tuple", format!("expected (a, b, ..), got {}", s)))?;
            split_top_level(inner)
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(|part| Json::String(part.to_string()))
                .collect()
        }
        other => return Err(AbiError::shape("tuple", expected("an array", other))),
    };
    if items.len() != len {
        return Err(AbiError::shape(
            "tuple",
            format!("expected {} members, got {}", len, items.len()),
        ));
    }
    Ok(items)
}

fn array_items(input: &Json) -> Result<Vec<Json>, AbiError> {
    match input {
        Json::Array(items) => Ok(items.clone()),
        Json::String(s) => match serde_json::from_str::<Json>(s) {
            Ok(Json::Array(items)) => Ok(items),
            _ => Err(AbiError::shape("array", format!("expected a JSON array, got {}", s))),
        },
        other => Err(AbiError::shape("array", expected("an array", other))),
    }
}

fn parse_felt(ty: &str, input: &Json) -> Result<Felt, AbiError> {
    match input {
        Json::String(s) => Ok(Felt::parse(s)?),
        Json::Bool(b) => Ok(Felt::from(*b)),
        Json::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(Felt::from(v))
            } else if let Some(v) = n.as_i64() {
                Ok(Felt::from_i128(v as i128))
            } else {
                Err(AbiError::shape(ty, format!("{} is not an integer", n)))
            }
        }
        other => Err(AbiError::shape(ty, expected("a number", other))),
    }
}

fn parse_felt_or_short_string(input: &Json) -> Result<Felt, AbiError> {
    if let Json::String(s) = input {
        let t = s.trim();
        if !t.is_empty() && !is_numeric_text(t) {
            return encode_short_string(s);
        }
    }
    parse_felt("felt252", input)
}

// Prefixed hex or a run of decimal digits, either optionally negated.
fn is_numeric_text(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    hex_digits(s).is_some() || (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_integer(kind: IntegerKind, input: &Json) -> Result<Felt, AbiError> {
    let ty = format!("{}{}", if kind.signed { "i" } else { "u" }, kind.bits);
    if kind.signed {
        let value = parse_i128(&ty, input)?;
        if !kind.fits_signed(value) {
            return Err(AbiError::shape(ty, format!("{} out of range", value)));
        }
        Ok(Felt::from_i128(value))
    } else {
        let value = parse_u256(&ty, input)?;
        if !kind.fits_unsigned(&value) {
            return Err(AbiError::shape(ty, format!("{} out of range", value)));
        }
        Ok(Felt::from(value.low_u128()))
    }
}

fn parse_i128(ty: &str, input: &Json) -> Result<i128, AbiError> {
    match input {
        Json::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| AbiError::shape(ty, format!("{} is not an integer", n))),
        Json::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<i128>() {
                return Ok(v);
            }
            Felt::parse(s)?
                .to_i128()
                .ok_or_else(|| AbiError::shape(ty, format!("{} out of range", s)))
        }
        other => Err(AbiError::shape(ty, expected("a number", other))),
    }
}

fn parse_u256(ty: &str, input: &Json) -> Result<U256, AbiError> {
    match input {
        Json::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| AbiError::shape(ty, format!("{} is not an unsigned integer", n))),
        Json::String(s) => {
            let s = s.trim();
            let parsed = match hex_digits(s) {
                Some(digits) => U256::from_str_radix(digits, 16).ok(),
                None => U256::from_dec_str(s).ok(),
            };
            parsed.ok_or_else(|| AbiError::shape(ty, format!("{} is not an unsigned integer", s)))
        }
        Json::Object(map) => {
            let low = limb_field(ty, map, "low")?;
            let high = limb_field(ty, map, "high")?;
            Ok((high << 128) | low)
        }
        other => Err(AbiError::shape(ty, expected("a number", other))),
    }
}

fn parse_u512(input: &Json) -> Result<U512, AbiError> {
    match input {
        Json::Number(_) => Ok(U512::from(parse_u256("u512", input)?)),
        Json::String(s) => {
            let s = s.trim();
            let parsed = match hex_digits(s) {
                Some(digits) => U512::from_str_radix(digits, 16).ok(),
                None => U512::from_dec_str(s).ok(),
            };
            parsed.ok_or_else(|| AbiError::shape("u512", format!("{} is not an unsigned integer", s)))
        }
        Json::Object(map) => {
            let mut value = U512::zero();
            for i in 0..4 {
                let limb = limb_field("u512", map, &format!("limb{}", i))?;
                value = value | (U512::from(limb) << (128 * i));
            }
            Ok(value)
        }
        other => Err(AbiError::shape("u512", expected("a number", other))),
    }
}

fn limb_field(ty: &str, map: &Map<String, Json>, key: &str) -> Result<U256, AbiError> {
    let value = map
        .get(key)
        .ok_or_else(|| AbiError::shape(ty, format!("missing {}", key)))?;
    let limb = parse_u256(ty, value)?;
    if limb.bits() > 128 {
        return Err(AbiError::shape(ty, format!("{} exceeds 128 bits", key)));
    }
    Ok(limb)
}

fn hex_digits(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

fn low_limb(value: U256) -> Felt {
    Felt::from(value.low_u128())
}

fn expected(what: &str, got: &Json) -> String {
    format!("expected {}, got {}", what, got)
}
