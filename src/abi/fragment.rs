//! Contract fragments: functions, events and JSON ABI documents

use serde::{Deserialize, Serialize};

use super::coder::AbiCoder;
use super::param::{parse_param_list, ParamKind, ParamType};
use super::selector::{event_topic, function_selector, split_selector, with_selector, SELECTOR_LEN};
use super::value::{AbiValue, Record};
use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::encode_hex;

/// State mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

impl StateMutability {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pure" => Some(Self::Pure),
            "view" => Some(Self::View),
            "nonpayable" => Some(Self::Nonpayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }
}

/// Split `name(params) rest` into its three parts
fn split_signature<'a>(s: &'a str, keyword: &str) -> AbiResult<(&'a str, &'a str, &'a str)> {
    let s = s.trim();
    let s = s
        .strip_prefix(keyword)
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim_start)
        .unwrap_or(s);

    let open = s
        .find('(')
        .ok_or_else(|| AbiError::invalid_type(s, "missing parameter list"))?;
    let name = s[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err(AbiError::invalid_type(s, "invalid fragment name"));
    }

    let close = matching_paren(s, open).ok_or_else(|| AbiError::invalid_type(s, "unbalanced parentheses"))?;
    Ok((name, &s[open + 1..close], s[close + 1..].trim()))
}

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn canonical_list(params: &[ParamType]) -> String {
    params
        .iter()
        .map(ParamType::type_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// A contract function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ParamType>,
    #[serde(default)]
    pub outputs: Vec<ParamType>,
    #[serde(default)]
    pub state_mutability: StateMutability,
}

impl Function {
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs: Vec::new(),
            state_mutability: StateMutability::default(),
        }
    }

    /// Parse a human-readable signature
    ///
    /// Accepts `transfer(address to, uint256 amount)` with an optional
    /// `function` keyword, mutability keywords and `returns (...)` clause.
    pub fn parse(s: &str) -> AbiResult<Self> {
        let (name, params, mut rest) = split_signature(s, "function")?;
        let mut function = Function::new(name, parse_param_list(params)?);

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("returns") {
                let after = after.trim_start();
                if !after.starts_with('(') {
                    return Err(AbiError::invalid_type(s, "expected '(' after returns"));
                }
                let close = matching_paren(after, 0)
                    .ok_or_else(|| AbiError::invalid_type(s, "unbalanced parentheses"))?;
                function.outputs = parse_param_list(&after[1..close])?;
                rest = after[close + 1..].trim_start();
                continue;
            }

            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (word, tail) = rest.split_at(end);
            function.state_mutability = StateMutability::from_keyword(word)
                .ok_or_else(|| AbiError::invalid_type(s, format!("unexpected token {:?}", word)))?;
            rest = tail.trim_start();
        }

        Ok(function)
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, canonical_list(&self.inputs))
    }

    pub fn selector(&self) -> [u8; SELECTOR_LEN] {
        function_selector(&self.signature())
    }

    pub fn selector_hex(&self) -> String {
        encode_hex(&self.selector())
    }

    /// Call data: selector followed by the encoded arguments
    pub fn encode_input(&self, values: &[AbiValue]) -> AbiResult<Vec<u8>> {
        let args = AbiCoder::new().encode(&self.inputs, values)?;
        Ok(with_selector(self.selector(), &args))
    }

    /// Decode call data, checking that it targets this function
    pub fn decode_input(&self, calldata: &[u8]) -> AbiResult<Record> {
        let (selector, args) = split_selector(calldata)?;
        if selector != self.selector() {
            return Err(AbiError::malformed(
                self.signature(),
                format!("selector mismatch: got {}", encode_hex(&selector)),
                calldata.len(),
                0,
            ));
        }
        AbiCoder::new().decode(&self.inputs, args, false)
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> AbiResult<Record> {
        AbiCoder::new().decode(&self.outputs, data, false)
    }
}

/// A contract event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ParamType>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Indexed values of these kinds are stored as their hash
fn is_hashed_topic(param: &ParamType) -> bool {
    match &param.kind {
        ParamKind::Elementary(name) => name == "string" || name == "bytes",
        ParamKind::Array { .. } | ParamKind::Tuple(_) => true,
        ParamKind::Empty => false,
    }
}

fn missing_value(param: &ParamType, index: usize, length: usize) -> AbiError {
    AbiError::malformed(
        param.type_string(),
        format!("no decoded value for parameter {}", index),
        length,
        0,
    )
}

impl Event {
    /// Parse `Transfer(address indexed from, address indexed to, uint256 value)`
    ///
    /// A trailing `anonymous` keyword marks the event anonymous.
    pub fn parse(s: &str) -> AbiResult<Self> {
        let (name, params, rest) = split_signature(s, "event")?;
        let anonymous = match rest {
            "" => false,
            "anonymous" => true,
            other => return Err(AbiError::invalid_type(s, format!("unexpected token {:?}", other))),
        };

        let inputs = parse_param_list(params)?
            .into_iter()
            .map(|p| {
                let indexed = p.indexed.unwrap_or(false);
                p.with_indexed(indexed)
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            inputs,
            anonymous,
        })
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, canonical_list(&self.inputs))
    }

    /// topic0 of non-anonymous logs
    pub fn topic(&self) -> [u8; 32] {
        event_topic(&self.signature())
    }

    /// Decode a log into a record in declaration order
    ///
    /// Indexed parameters come from `topics`; indexed strings, bytes, arrays
    /// and tuples are only available as their 32-byte hash and are returned
    /// as `FixedBytes`.
    pub fn decode_log(&self, topics: &[[u8; 32]], data: &[u8]) -> AbiResult<Record> {
        let coder = AbiCoder::new();
        let mut topics = topics.iter();

        if !self.anonymous {
            let topic0 = topics.next().ok_or_else(|| {
                AbiError::malformed(self.signature(), "missing event signature topic", 0, 0)
            })?;
            if *topic0 != self.topic() {
                return Err(AbiError::malformed(self.signature(), "event signature topic mismatch", 32, 0));
            }
        }

        let body: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| p.indexed != Some(true))
            .cloned()
            .collect();
        let mut body_values = coder.decode(&body, data, false)?.into_values().into_iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for (index, param) in self.inputs.iter().enumerate() {
            let value = if param.indexed == Some(true) {
                let topic = topics.next().ok_or_else(|| {
                    AbiError::malformed(param.type_string(), format!("missing topic for parameter {}", index), 0, 0)
                })?;
                if is_hashed_topic(param) {
                    AbiValue::FixedBytes(topic.to_vec())
                } else {
                    coder
                        .decode(std::slice::from_ref(param), topic, false)?
                        .into_values()
                        .into_iter()
                        .next()
                        .ok_or_else(|| missing_value(param, index, topic.len()))?
                }
            } else {
                body_values
                    .next()
                    .ok_or_else(|| missing_value(param, index, data.len()))?
            };
            values.push(value);
        }

        let names = self.inputs.iter().map(|p| p.name.clone()).collect();
        Ok(Record::with_names(values, names))
    }
}

/// Constructor of a contract
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    #[serde(default)]
    pub inputs: Vec<ParamType>,
    #[serde(default)]
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Encoded deployment arguments, appended to the contract bytecode
    pub fn encode_input(&self, values: &[AbiValue]) -> AbiResult<Vec<u8>> {
        AbiCoder::new().encode(&self.inputs, values)
    }
}

/// Raw ABI item for parsing
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AbiItem {
    Function(Function),
    Event(Event),
    Constructor(Constructor),
    /// `error`, `fallback`, `receive`
    #[serde(other)]
    Other,
}

/// Parsed contract ABI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractAbi {
    pub functions: Vec<Function>,
    pub events: Vec<Event>,
    pub constructor: Option<Constructor>,
}

impl ContractAbi {
    /// Parse a JSON ABI document (an array of fragment objects)
    pub fn from_json(json: &str) -> AbiResult<Self> {
        let items: Vec<AbiItem> = serde_json::from_str(json)?;
        let mut abi = ContractAbi::default();

        for item in items {
            match item {
                AbiItem::Function(f) => abi.functions.push(f),
                AbiItem::Event(e) => abi.events.push(e),
                AbiItem::Constructor(c) => abi.constructor = Some(c),
                AbiItem::Other => {}
            }
        }

        Ok(abi)
    }

    /// First function with this name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// All overloads of a function name
    pub fn functions_by_name(&self, name: &str) -> Vec<&Function> {
        self.functions.iter().filter(|f| f.name == name).collect()
    }

    pub fn function_by_selector(&self, selector: &[u8; SELECTOR_LEN]) -> Option<&Function> {
        self.functions.iter().find(|f| f.selector() == *selector)
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Event matching a log's topic0
    pub fn event_by_topic(&self, topic: &[u8; 32]) -> Option<&Event> {
        self.events
            .iter()
            .filter(|e| !e.anonymous)
            .find(|e| e.topic() == *topic)
    }

    /// Decode call data against whichever function its selector names
    pub fn decode_call(&self, calldata: &[u8]) -> AbiResult<(&Function, Record)> {
        let (selector, _) = split_selector(calldata)?;
        let function = self.function_by_selector(&selector).ok_or_else(|| {
            AbiError::malformed("selector", format!("no function for selector {}", encode_hex(&selector)), calldata.len(), 0)
        })?;
        Ok((function, function.decode_input(calldata)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::value::parse_address;
    use crate::error::ErrorKind;

    const TOKEN_ABI: &str = r#"[
        {"type": "constructor", "inputs": [{"name": "supply", "type": "uint256"}]},
        {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
         "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
         "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "balanceOf", "stateMutability": "view",
         "inputs": [{"name": "owner", "type": "address"}],
         "outputs": [{"name": "", "type": "uint256"}]},
        {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
            {"name": "from", "type": "address", "indexed": true},
            {"name": "to", "type": "address", "indexed": true},
            {"name": "value", "type": "uint256", "indexed": false}]},
        {"type": "error", "name": "InsufficientBalance", "inputs": []},
        {"type": "receive", "stateMutability": "payable"}
    ]"#;

    fn address(byte: u8) -> AbiValue {
        AbiValue::Address([byte; 20].into())
    }

    fn topic_for(value: &AbiValue) -> [u8; 32] {
        let encoded = AbiCoder::new().encode(&["address"], std::slice::from_ref(value)).unwrap();
        let mut topic = [0u8; 32];
        topic.copy_from_slice(&encoded);
        topic
    }

    #[test]
    fn test_parse_function() {
        let f = Function::parse("function transfer(address to, uint256 amount) returns (bool)").unwrap();
        assert_eq!(f.name, "transfer");
        assert_eq!(f.signature(), "transfer(address,uint256)");
        assert_eq!(f.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(f.outputs.len(), 1);

        let view = Function::parse("balanceOf(address) view returns (uint256)").unwrap();
        assert_eq!(view.state_mutability, StateMutability::View);

        assert!(Function::parse("transfer(address").is_err());
        assert!(Function::parse("(address)").is_err());
        assert!(Function::parse("f() sideways").is_err());
    }

    #[test]
    fn test_parse_tuple_function() {
        let f = Function::parse("submit((address,uint256)[] orders, bytes sig)").unwrap();
        assert_eq!(f.signature(), "submit((address,uint256)[],bytes)");
    }

    #[test]
    fn test_call_roundtrip() {
        let f = Function::parse("transfer(address to, uint256 amount)").unwrap();
        let calldata = f.encode_input(&[address(0x11), AbiValue::uint(1000)]).unwrap();
        assert_eq!(calldata.len(), 4 + 64);
        assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);

        let decoded = f.decode_input(&calldata).unwrap();
        assert_eq!(decoded["to"], address(0x11));
        assert_eq!(decoded["amount"], AbiValue::uint(1000));

        let mut wrong = calldata.clone();
        wrong[0] ^= 0xff;
        assert_eq!(f.decode_input(&wrong).unwrap_err().kind(), ErrorKind::MalformedData);
    }

    #[test]
    fn test_decode_log() {
        let event = Event::parse("Transfer(address indexed from, address indexed to, uint256 value)").unwrap();
        assert_eq!(event.signature(), "Transfer(address,address,uint256)");

        let from = address(0xaa);
        let to = address(0xbb);
        let data = AbiCoder::new().encode(&["uint256"], &[AbiValue::uint(5)]).unwrap();
        let topics = [event.topic(), topic_for(&from), topic_for(&to)];

        let record = event.decode_log(&topics, &data).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record["from"], from);
        assert_eq!(record["to"], to);
        assert_eq!(record["value"], AbiValue::uint(5));

        // Missing the `to` topic
        let err = event.decode_log(&topics[..2], &data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);

        // Wrong topic0
        let bad = [[0u8; 32], topics[1], topics[2]];
        assert!(event.decode_log(&bad, &data).is_err());
    }

    #[test]
    fn test_decode_log_hashed_string() {
        let event = Event::parse("Named(string indexed label, uint8 n) anonymous").unwrap();
        assert!(event.anonymous);

        let hash = [7u8; 32];
        let data = AbiCoder::new().encode(&["uint8"], &[AbiValue::uint(2)]).unwrap();
        let record = event.decode_log(&[hash], &data).unwrap();
        assert_eq!(record["label"], AbiValue::FixedBytes(vec![7; 32]));
        assert_eq!(record["n"], AbiValue::uint(2));
    }

    #[test]
    fn test_decode_log_short_body_is_error() {
        let event = Event::parse("Moved(address indexed who, uint256 amount, bool done)").unwrap();
        let topics = [event.topic(), topic_for(&address(0xcc))];

        // Only `amount` present in the body
        let data = AbiCoder::new().encode(&["uint256"], &[AbiValue::uint(9)]).unwrap();
        let err = event.decode_log(&topics, &data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);

        let err = event.decode_log(&topics, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);

        let full = AbiCoder::new()
            .encode(&["uint256", "bool"], &[AbiValue::uint(9), AbiValue::Bool(true)])
            .unwrap();
        let record = event.decode_log(&topics, &full).unwrap();
        assert!(record.iter().all(|v| *v != AbiValue::Null));
        assert_eq!(record["done"], AbiValue::Bool(true));
    }

    #[test]
    fn test_contract_abi_from_json() {
        let abi = ContractAbi::from_json(TOKEN_ABI).unwrap();
        assert_eq!(abi.functions.len(), 2);
        assert_eq!(abi.events.len(), 1);
        assert_eq!(abi.constructor.as_ref().unwrap().inputs.len(), 1);

        let balance_of = abi.function("balanceOf").unwrap();
        assert_eq!(balance_of.state_mutability, StateMutability::View);
        assert_eq!(
            abi.function_by_selector(&[0x70, 0xa0, 0x82, 0x31]).map(|f| f.name.as_str()),
            Some("balanceOf")
        );

        let transfer = abi.event("Transfer").unwrap();
        assert_eq!(transfer.inputs[0].indexed, Some(true));
        assert!(abi.event_by_topic(&transfer.topic()).is_some());
    }

    #[test]
    fn test_decode_call() {
        let abi = ContractAbi::from_json(TOKEN_ABI).unwrap();
        let owner = parse_address("Z5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let calldata = abi
            .function("balanceOf")
            .unwrap()
            .encode_input(&[AbiValue::Address(owner)])
            .unwrap();

        let (function, args) = abi.decode_call(&calldata).unwrap();
        assert_eq!(function.name, "balanceOf");
        assert_eq!(args["owner"], AbiValue::Address(owner));

        assert!(abi.decode_call(&[0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(ContractAbi::from_json("{}").is_err());
        assert!(ContractAbi::from_json(r#"[{"type": "function", "name": "f", "inputs": [{"type": "tuple"}]}]"#).is_err());
    }
}
