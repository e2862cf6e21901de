//! ABI-bound codec

use std::collections::HashMap;

use serde_json::Value as Json;
use stark_primitives::Felt;

use crate::abi::{Category, Decoder, Encoder, TypeRegistry, Value};
use crate::contract::{Abi, EventKind, FunctionDecl};
use crate::event::{DecodedEvent, EventLayout};
use crate::{AbiError, CodecConfig};

/// A function signature with classified types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Entry point selector
    pub selector: Felt,
    /// Named inputs
    pub inputs: Vec<(String, Category)>,
    /// Output types
    pub outputs: Vec<Category>,
}

/// Encoder and decoder bound to one contract ABI.
///
/// Declarations, function signatures and event layouts are classified once
/// at construction. The codec is immutable afterwards and can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Codec {
    abi: Abi,
    registry: TypeRegistry,
    config: CodecConfig,
    functions: HashMap<String, FunctionSignature>,
    events: Vec<EventLayout>,
}

impl Codec {
    /// Build with the default configuration
    pub fn new(abi: Abi) -> Result<Self, AbiError> {
        Self::with_config(abi, CodecConfig::default())
    }

    /// Build with an explicit configuration
    pub fn with_config(abi: Abi, config: CodecConfig) -> Result<Self, AbiError> {
        let registry = TypeRegistry::from_abi(&abi, config.max_depth)?;

        let mut functions = HashMap::new();
        for f in abi.functions() {
            let signature = classify_function(f, &registry, &config)?;
            functions.entry(f.name.clone()).or_insert(signature);
        }

        let events = abi
            .events()
            .filter(|e| e.kind == EventKind::Struct)
            .map(|e| EventLayout::new(e, &registry, &config))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            functions = functions.len(),
            events = events.len(),
            lenient = config.lenient,
            "codec ready"
        );

        Ok(Self {
            abi,
            registry,
            config,
            functions,
            events,
        })
    }

    /// Parse an ABI JSON document and build with the default configuration
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Self::new(Abi::from_json(json)?)
    }

    /// The ABI document
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Active configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Declaration registry
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.registry, &self.config)
    }

    fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.registry, &self.config)
    }

    // ==================== Types ====================

    /// Classify a type reference
    pub fn classify(&self, ty: &str) -> Result<Category, AbiError> {
        self.registry.classify(ty)
    }

    /// Decode one value of type `ty` from the start of `data`
    pub fn decode(&self, ty: &str, data: &[Felt]) -> Result<Value, AbiError> {
        self.decode_at(ty, data, 0).map(|(value, _)| value)
    }

    /// Decode one value at `offset`, returning it with the felts consumed
    pub fn decode_at(
        &self,
        ty: &str,
        data: &[Felt],
        offset: usize,
    ) -> Result<(Value, usize), AbiError> {
        let category = self.classify(ty)?;
        self.decoder().decode(&category, data, offset)
    }

    /// Decode consecutive values sharing one cursor
    pub fn decode_types<S: AsRef<str>>(
        &self,
        types: &[S],
        data: &[Felt],
    ) -> Result<Vec<Value>, AbiError> {
        let categories = types
            .iter()
            .map(|ty| self.classify(ty.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.decoder()
            .decode_all(&categories, data, 0)
            .map(|(values, _)| values)
    }

    /// Encode JSON-shaped input as type `ty`
    pub fn encode(&self, ty: &str, input: &Json) -> Result<Vec<Felt>, AbiError> {
        let category = self.classify(ty)?;
        self.encoder().encode(&category, input)
    }

    // ==================== Functions ====================

    /// Classified signature of a function
    pub fn function(&self, name: &str) -> Result<&FunctionSignature, AbiError> {
        self.functions
            .get(name)
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    /// Classified signature of the function with this selector
    pub fn function_by_selector(&self, selector: &Felt) -> Result<&FunctionSignature, AbiError> {
        let decl = self.abi.function_by_selector(selector)?;
        self.function(&decl.name)
    }

    /// Encode call arguments. The argument count must match the inputs.
    pub fn encode_inputs(&self, function: &str, args: &[Json]) -> Result<Vec<Felt>, AbiError> {
        let signature = self.function(function)?;
        if args.len() != signature.inputs.len() {
            return Err(AbiError::shape(
                function,
                format!(
                    "expected {} arguments, got {}",
                    signature.inputs.len(),
                    args.len()
                ),
            ));
        }

        let encoder = self.encoder();
        let mut calldata = Vec::new();
        for ((_, category), arg) in signature.inputs.iter().zip(args) {
            calldata.extend(encoder.encode(category, arg)?);
        }
        Ok(calldata)
    }

    /// Decode a call result into the function's outputs
    pub fn decode_outputs(&self, function: &str, data: &[Felt]) -> Result<Vec<Value>, AbiError> {
        let signature = self.function(function)?;
        self.decoder()
            .decode_all(&signature.outputs, data, 0)
            .map(|(values, _)| values)
    }

    /// Best-effort decode of a call's raw arguments into named values.
    ///
    /// Stops at the first input with no felts left, so a truncated argument
    /// list yields the inputs it covers.
    pub fn decode_arguments(
        &self,
        function: &str,
        args: &[Felt],
    ) -> Result<Vec<(String, Value)>, AbiError> {
        let signature = self.function(function)?;
        let decoder = self.decoder();
        let mut pos = 0;
        let mut decoded = Vec::with_capacity(signature.inputs.len());
        for (name, category) in &signature.inputs {
            if pos >= args.len() && self.registry.fixed_width(category) != Some(0) {
                break;
            }
            let (value, consumed) = decoder.decode_member(category, args, pos, 0)?;
            decoded.push((name.clone(), value));
            pos += consumed;
        }
        Ok(decoded)
    }

    // ==================== Events ====================

    /// Layout of a struct event, by qualified or trailing name
    pub fn event(&self, name: &str) -> Result<&EventLayout, AbiError> {
        let decl = self.abi.event(name)?;
        self.events
            .iter()
            .find(|layout| layout.name() == decl.name)
            .ok_or_else(|| AbiError::UnknownEvent(name.to_string()))
    }

    /// Decode an emitted event by name
    pub fn decode_event(
        &self,
        name: &str,
        keys: &[Felt],
        data: &[Felt],
    ) -> Result<DecodedEvent, AbiError> {
        self.event(name)?
            .decode(&self.registry, &self.config, keys, data)
    }

    /// Decode an emitted event, finding its declaration by `keys[0]`
    pub fn decode_log(&self, keys: &[Felt], data: &[Felt]) -> Result<DecodedEvent, AbiError> {
        let selector = keys
            .first()
            .ok_or_else(|| AbiError::MalformedWire("event has no selector key".to_string()))?;
        let layout = self
            .events
            .iter()
            .find(|layout| layout.selector() == *selector)
            .ok_or_else(|| AbiError::UnknownEvent(selector.to_hex()))?;
        layout.decode(&self.registry, &self.config, keys, data)
    }

    /// Key filter for an event, without the selector position
    pub fn compose_filter_keys(
        &self,
        event: &str,
        filter: &Json,
    ) -> Result<Vec<Vec<Felt>>, AbiError> {
        self.event(event)?
            .compose_filter_keys(&self.registry, &self.config, filter)
    }

    /// Key filter for an event, selector first
    pub fn keys_with_selector(
        &self,
        event: &str,
        filter: &Json,
    ) -> Result<Vec<Vec<Felt>>, AbiError> {
        self.event(event)?
            .keys_with_selector(&self.registry, &self.config, filter)
    }
}

fn classify_function(
    f: &FunctionDecl,
    registry: &TypeRegistry,
    config: &CodecConfig,
) -> Result<FunctionSignature, AbiError> {
    let classify = |ty: &str| match registry.classify(ty) {
        Err(AbiError::UnknownType(_)) if config.lenient => Ok(Category::Unresolved(ty.to_string())),
        other => other,
    };
    let inputs = f
        .inputs
        .iter()
        .map(|p| Ok((p.name.clone(), classify(&p.ty)?)))
        .collect::<Result<Vec<_>, AbiError>>()?;
    let outputs = f
        .outputs
        .iter()
        .map(|p| classify(&p.ty))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FunctionSignature {
        name: f.name.clone(),
        selector: f.selector(),
        inputs,
        outputs,
    })
}
