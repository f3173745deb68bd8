//! Shared request parsing for the symbol-list tools

use serde_json::{Value, json};

pub const MISSING_SYMBOLS: &str = "missing symbols parameter, provide list like ['AAPL', 'MSFT']";
pub const NO_VALID_SYMBOLS: &str = "no valid symbols provided";
pub const BAD_OUTPUTSIZE: &str = "outputsize must be an integer";
pub const NEGATIVE_OUTPUTSIZE: &str = "outputsize must be a non-negative integer";
pub const OUTPUTSIZE_TOO_LARGE: &str = "outputsize is too large";

/// Validated `symbols` / `interval` / `outputsize` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolsRequest {
    /// Trimmed, upper-cased, non-empty symbols in request order
    pub symbols: Vec<String>,
    pub interval: Option<String>,
    /// `None` when absent or zero
    pub outputsize: Option<u32>,
}

impl SymbolsRequest {
    /// Validate tool arguments
    ///
    /// The error is the message to return to the caller.
    pub fn from_params(params: &Value) -> Result<Self, &'static str> {
        let raw = match params.get("symbols") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(MISSING_SYMBOLS),
        };

        let symbols: Vec<String> = raw
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .collect();
        if symbols.is_empty() {
            return Err(NO_VALID_SYMBOLS);
        }

        let interval = params
            .get("interval")
            .and_then(Value::as_str)
            .map(str::to_string);

        let outputsize = match params.get("outputsize") {
            None | Some(Value::Null) => None,
            Some(v) => parse_outputsize(v)?,
        };

        Ok(Self {
            symbols,
            interval,
            outputsize,
        })
    }
}

/// Integer, float (truncated) or integer string; zero means "use the default"
fn parse_outputsize(value: &Value) -> Result<Option<u32>, &'static str> {
    let n: i64 = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64().ok_or(BAD_OUTPUTSIZE)?.trunc();
                if !f.is_finite() {
                    return Err(BAD_OUTPUTSIZE);
                }
                if f < 0.0 {
                    return Err(NEGATIVE_OUTPUTSIZE);
                }
                if f > f64::from(u32::MAX) {
                    return Err(OUTPUTSIZE_TOO_LARGE);
                }
                f as i64
            },
        },
        Value::String(s) => s.trim().parse().map_err(|_| BAD_OUTPUTSIZE)?,
        _ => return Err(BAD_OUTPUTSIZE),
    };
    if n < 0 {
        return Err(NEGATIVE_OUTPUTSIZE);
    }
    let n = u32::try_from(n).map_err(|_| OUTPUTSIZE_TOO_LARGE)?;
    Ok((n > 0).then_some(n))
}

/// `{"error": message}`
pub fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Input schema shared by the symbol-list tools
pub fn symbols_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbols": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of stock ticker symbols to compare (e.g., ['AAPL', 'MSFT', 'GOOGL'])",
                "minItems": 1
            },
            "interval": {
                "type": "string",
                "description": "Time interval for historical data (e.g., '1day', '1week', '1month'). Optional.",
                "default": null
            },
            "outputsize": {
                "type": "integer",
                "description": "Number of data points to retrieve. Optional.",
                "default": null
            }
        },
        "required": ["symbols"]
    })
}
