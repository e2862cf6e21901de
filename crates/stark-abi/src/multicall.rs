//! Multicall calldata splitting and joining
//!
//! Layout: `[call count, (to, selector, arg count, args...)*]`.

use serde::{Deserialize, Serialize};
use stark_primitives::Felt;

use crate::AbiError;

/// One call of a multicall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Target contract, exactly as it appeared in the calldata
    pub to: String,
    /// Entry point selector
    pub selector: String,
    /// Raw arguments
    pub args: Vec<String>,
}

impl Call {
    /// Create a call
    pub fn new(to: impl Into<String>, selector: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            to: to.into(),
            selector: selector.into(),
            args,
        }
    }

    /// Parse the arguments as felts
    pub fn arg_felts(&self) -> Result<Vec<Felt>, AbiError> {
        crate::parse_felts(&self.args)
    }
}

/// Split flat multicall calldata into calls.
///
/// The leading count is not needed for termination: records are read until
/// the input is exhausted, and a disagreeing count is only logged. Argument
/// counts are hex, with or without `0x`. Target and selector strings are kept
/// untouched so callers can apply their own comparison.
pub fn split_calls<S: AsRef<str>>(calldata: &[S]) -> Result<Vec<Call>, AbiError> {
    let Some(count) = calldata.first() else {
        return Ok(Vec::new());
    };

    let mut calls = Vec::new();
    let mut pos = 1;
    while pos < calldata.len() {
        if pos + 3 > calldata.len() {
            return Err(AbiError::MalformedWire(format!(
                "incomplete call header at position {}",
                pos
            )));
        }
        let argc = parse_count(calldata[pos + 2].as_ref())?;
        let start = pos + 3;
        let end = start
            .checked_add(argc)
            .filter(|end| *end <= calldata.len())
            .ok_or_else(|| {
                AbiError::MalformedWire(format!(
                    "call at position {} declares {} args, {} available",
                    pos,
                    argc,
                    calldata.len() - start
                ))
            })?;

        calls.push(Call {
            to: calldata[pos].as_ref().to_string(),
            selector: calldata[pos + 1].as_ref().to_string(),
            args: calldata[start..end]
                .iter()
                .map(|a| a.as_ref().to_string())
                .collect(),
        });
        pos = end;
    }

    match parse_count(count.as_ref()) {
        Ok(declared) if declared == calls.len() => {}
        declared => tracing::debug!(
            declared = ?declared.ok(),
            parsed = calls.len(),
            "multicall count disagrees with records"
        ),
    }

    Ok(calls)
}

/// Flatten calls into multicall calldata. Counts are minimal hex.
pub fn join_calls(calls: &[Call]) -> Vec<String> {
    let mut out = Vec::with_capacity(1 + calls.iter().map(|c| 3 + c.args.len()).sum::<usize>());
    out.push(Felt::from(calls.len()).to_hex());
    for call in calls {
        out.push(call.to.clone());
        out.push(call.selector.clone());
        out.push(Felt::from(call.args.len()).to_hex());
        out.extend(call.args.iter().cloned());
    }
    out
}

fn parse_count(s: &str) -> Result<usize, AbiError> {
    let felt = Felt::from_hex(s.trim())?;
    felt.to_usize()
        .ok_or_else(|| AbiError::MalformedWire(format!("count {} out of range", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TO: &str = "0x049D36570D4e46f48e99674bd3fcc84644DdD6b96F7C741B1562B82f9e004dC7";
    const SELECTOR: &str = "0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e";

    #[test]
    fn test_split_single_call() {
        let calls = split_calls(&["0x1", TO, SELECTOR, "0x2", "0xa", "0xb"]).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to, TO);
        assert_eq!(calls[0].selector, SELECTOR);
        assert_eq!(calls[0].args, vec!["0xa", "0xb"]);
    }

    #[test]
    fn test_split_arg_count_is_hex() {
        let mut calldata = vec!["0x1", TO, SELECTOR, "10"];
        calldata.extend(std::iter::repeat("0x0").take(16));
        let calls = split_calls(&calldata).unwrap();
        assert_eq!(calls[0].args.len(), 16);
    }

    #[test]
    fn test_split_multiple_calls_and_empty_args() {
        let calls =
            split_calls(&["0x2", TO, SELECTOR, "0x0", "0x123", SELECTOR, "0x1", "0x5"]).unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].args.is_empty());
        assert_eq!(calls[1].to, "0x123");
        assert_eq!(calls[1].args, vec!["0x5"]);
    }

    #[test]
    fn test_split_count_mismatch_is_tolerated() {
        let calls = split_calls(&["0x5", TO, SELECTOR, "0x0"]).unwrap();
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_calls::<&str>(&[]).unwrap().is_empty());
        assert!(split_calls(&["0x0"]).unwrap().is_empty());
    }

    #[test]
    fn test_split_malformed() {
        assert!(matches!(
            split_calls(&["0x1", TO, SELECTOR]),
            Err(AbiError::MalformedWire(_))
        ));
        assert!(matches!(
            split_calls(&["0x1", TO, SELECTOR, "0x3", "0x1"]),
            Err(AbiError::MalformedWire(_))
        ));
        assert!(matches!(
            split_calls(&["0x1", TO, SELECTOR, "zz"]),
            Err(AbiError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_join_is_inverse_of_split() {
        let calls = vec![
            Call::new(TO, SELECTOR, vec!["0x1".to_string(), "0x2".to_string()]),
            Call::new("0x7", "0x8", vec![]),
        ];
        let flat = join_calls(&calls);
        assert_eq!(flat[0], "0x2");
        assert_eq!(flat[3], "0x2");
        assert_eq!(split_calls(&flat).unwrap(), calls);
    }

    #[test]
    fn test_call_arg_felts() {
        let call = Call::new(TO, SELECTOR, vec!["0x10".to_string(), "5".to_string()]);
        assert_eq!(
            call.arg_felts().unwrap(),
            vec![Felt::from(16u8), Felt::from(5u8)]
        );
    }
}
