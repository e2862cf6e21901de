//! Wire value decoding

use primitive_types::{U256, U512};
use stark_primitives::Felt;

use super::classify::TypeRegistry;
use super::types::{Category, Value};
use crate::byte_array::{decode_short_string, ByteArray};
use crate::{AbiError, CodecConfig};

/// Decodes felts into structured values, guided by classified types.
///
/// Every decode returns the value together with the number of felts it
/// consumed, so callers thread the cursor explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    registry: &'a TypeRegistry,
    config: &'a CodecConfig,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over a registry
    pub fn new(registry: &'a TypeRegistry, config: &'a CodecConfig) -> Self {
        Self { registry, config }
    }

    /// Decode one value starting at `offset`
    pub fn decode(
        &self,
        category: &Category,
        data: &[Felt],
        offset: usize,
    ) -> Result<(Value, usize), AbiError> {
        self.decode_token(category, data, offset, 0)
    }

    /// Decode a list of values sharing one cursor.
    ///
    /// Each value is a member: in lenient mode a failing value degrades to
    /// raw felts and the remaining values are still attempted.
    pub fn decode_all(
        &self,
        categories: &[Category],
        data: &[Felt],
        offset: usize,
    ) -> Result<(Vec<Value>, usize), AbiError> {
        let mut pos = offset;
        let mut values = Vec::with_capacity(categories.len());
        for category in categories {
            let (value, consumed) = self.decode_member(category, data, pos, 0)?;
            values.push(value);
            pos += consumed;
        }
        Ok((values, pos - offset))
    }

    /// Decode a member of a composite value, degrading failures to raw felts
    /// in lenient mode. The raw run covers the member's fixed width when it
    /// has one, otherwise the rest of the input.
    pub fn decode_member(
        &self,
        category: &Category,
        data: &[Felt],
        offset: usize,
        depth: usize,
    ) -> Result<(Value, usize), AbiError> {
        match self.decode_token(category, data, offset, depth) {
            Ok(decoded) => Ok(decoded),
            Err(e @ AbiError::RecursionLimit(_)) => Err(e),
            Err(e) if self.config.lenient => {
                let rest = data.get(offset..).unwrap_or_default();
                let width = self
                    .registry
                    .fixed_width(category)
                    .filter(|w| *w <= rest.len())
                    .unwrap_or(rest.len());
                tracing::debug!(error = %e, offset, width, "member degraded to raw felts");
                Ok((Value::Raw(rest[..width].to_vec()), width))
            }
            Err(e) => Err(e),
        }
    }

    fn decode_token(
        &self,
        category: &Category,
        data: &[Felt],
        offset: usize,
        depth: usize,
    ) -> Result<(Value, usize), AbiError> {
        if depth > self.config.max_depth {
            return Err(AbiError::RecursionLimit(self.config.max_depth));
        }
        tracing::trace!(?category, offset, "decode");

        match category {
            Category::Felt => {
                let felt = read(data, offset)?;
                Ok((Value::Felt(felt), 1))
            }
            Category::Bool => {
                let felt = read(data, offset)?;
                Ok((Value::Bool(!felt.is_zero()), 1))
            }
            Category::Integer(kind) => {
                let felt = read(data, offset)?;
                let value = if kind.signed {
                    felt.to_i128()
                        .filter(|v| kind.fits_signed(*v))
                        .map(Value::Int)
                } else {
                    let v = felt.as_u256();
                    kind.fits_unsigned(&v).then_some(Value::Uint(v))
                };
                value.map(|v| (v, 1)).ok_or_else(|| {
                    AbiError::MalformedWire(format!(
                        "{} does not fit {}{}",
                        felt,
                        if kind.signed { "i" } else { "u" },
                        kind.bits
                    ))
                })
            }
            Category::U256 => {
                check_length(data, offset, 2)?;
                let low = limb(&data[offset])?;
                let high = limb(&data[offset + 1])?;
                Ok((Value::Uint((high << 128) | low), 2))
            }
            Category::U512 => {
                check_length(data, offset, 4)?;
                let mut value = U512::zero();
                for (i, felt) in data[offset..offset + 4].iter().enumerate() {
                    value = value | (U512::from(limb(felt)?) << (128 * i));
                }
                Ok((Value::U512(value), 4))
            }
            Category::Address(_) => {
                let felt = read(data, offset)?;
                Ok((Value::Address(felt), 1))
            }
            Category::Bytes31 => {
                let felt = read(data, offset)?;
                Ok((Value::String(decode_short_string(&felt)), 1))
            }
            Category::ByteArray => {
                let rest = data.get(offset..).unwrap_or_default();
                let (bytes, consumed) = ByteArray::from_felts(rest);
                Ok((Value::String(bytes.unpack()), consumed))
            }
            Category::Unit => Ok((Value::Unit, 0)),
            Category::Tuple(items) => {
                let mut pos = offset;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let (value, consumed) = self.decode_member(item, data, pos, depth + 1)?;
                    values.push(value);
                    pos += consumed;
                }
                Ok((Value::Tuple(values), pos - offset))
            }
            Category::Array(elem) => self.decode_array(elem, data, offset, depth),
            Category::Option(inner) => {
                let (variant, payload) = match discriminant(data, offset)? {
                    0 => ("Some", Some(inner.as_ref())),
                    1 => ("None", None),
                    d => return Err(bad_discriminant(d, "Option")),
                };
                self.decode_variant(variant, payload, data, offset, depth)
            }
            Category::Result(ok, err) => {
                let (variant, payload) = match discriminant(data, offset)? {
                    0 => ("Ok", ok.as_ref()),
                    1 => ("Err", err.as_ref()),
                    d => return Err(bad_discriminant(d, "Result")),
                };
                self.decode_variant(variant, Some(payload), data, offset, depth)
            }
            Category::Struct(name) => {
                let def = self.registry.struct_def(name)?;
                let mut pos = offset;
                let mut fields = Vec::with_capacity(def.members.len());
                for member in &def.members {
                    let (value, consumed) =
                        self.decode_member(&member.category, data, pos, depth + 1)?;
                    fields.push((member.name.clone(), value));
                    pos += consumed;
                }
                Ok((Value::Struct(fields), pos - offset))
            }
            Category::Enum(name) => {
                let def = self.registry.enum_def(name)?;
                let d = discriminant(data, offset)?;
                let variant = def
                    .variants
                    .get(d)
                    .ok_or_else(|| bad_discriminant(d, name))?;
                let payload = match variant.category {
                    Category::Unit => None,
                    ref category => Some(category),
                };
                self.decode_variant(&variant.name, payload, data, offset, depth)
            }
            Category::Unresolved(ty) => {
                if !self.config.lenient {
                    return Err(AbiError::UnknownType(ty.clone()));
                }
                let felt = read(data, offset)?;
                tracing::debug!(ty = %ty, "unresolved type passed through raw");
                Ok((Value::Raw(vec![felt]), 1))
            }
        }
    }

    fn decode_array(
        &self,
        elem: &Category,
        data: &[Felt],
        offset: usize,
        depth: usize,
    ) -> Result<(Value, usize), AbiError> {
        let prefix = read(data, offset)?;
        let remaining = data.len() - offset - 1;
        let declared = match prefix.to_usize() {
            Some(n) if n <= remaining => n,
            _ if self.config.lenient => {
                tracing::debug!(declared = %prefix, remaining, "array length exceeds input");
                remaining
            }
            _ => {
                return Err(AbiError::MalformedWire(format!(
                    "array length {} exceeds {} remaining felts",
                    prefix, remaining
                )))
            }
        };

        let mut pos = offset + 1;
        let mut items = Vec::with_capacity(declared);
        while items.len() < declared {
            if pos >= data.len() {
                if self.config.lenient {
                    tracing::debug!(decoded = items.len(), declared, "array input exhausted");
                    break;
                }
                return Err(AbiError::short_wire(1, pos, data.len()));
            }
            let (value, consumed) = self.decode_member(elem, data, pos, depth + 1)?;
            items.push(value);
            pos += consumed;
        }
        Ok((Value::Array(items), pos - offset))
    }

    fn decode_variant(
        &self,
        variant: &str,
        payload: Option<&Category>,
        data: &[Felt],
        offset: usize,
        depth: usize,
    ) -> Result<(Value, usize), AbiError> {
        match payload {
            None => Ok((Value::variant(variant, None), 1)),
            Some(category) => {
                let (value, consumed) =
                    self.decode_member(category, data, offset + 1, depth + 1)?;
                Ok((Value::variant(variant, Some(value)), 1 + consumed))
            }
        }
    }
}

/// Check that `needed` felts are available at `offset`
fn check_length(data: &[Felt], offset: usize, needed: usize) -> Result<(), AbiError> {
    if data.len() < offset + needed {
        return Err(AbiError::short_wire(needed, offset, data.len()));
    }
    Ok(())
}

fn read(data: &[Felt], offset: usize) -> Result<Felt, AbiError> {
    check_length(data, offset, 1)?;
    Ok(data[offset])
}

fn discriminant(data: &[Felt], offset: usize) -> Result<usize, AbiError> {
    let felt = read(data, offset)?;
    felt.to_usize()
        .ok_or_else(|| AbiError::MalformedWire(format!("discriminant {} out of range", felt)))
}

fn bad_discriminant(d: usize, ty: &str) -> AbiError {
    AbiError::MalformedWire(format!("unknown variant index {} for {}", d, ty))
}

fn limb(felt: &Felt) -> Result<U256, AbiError> {
    let value = felt.as_u256();
    if value.bits() > 128 {
        return Err(AbiError::MalformedWire(format!(
            "limb {} exceeds 128 bits",
            felt
        )));
    }
    Ok(value)
}
