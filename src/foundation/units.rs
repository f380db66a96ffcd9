use crate::foundation::error::{CopsError, CopsResult};

/// A size or offset expression: a bare number, or a string such as `"120"`, `"30px"` or `"50%"`.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitValue {
    Number(f64),
    Text(String),
}

impl From<f64> for UnitValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<u32> for UnitValue {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i32> for UnitValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for UnitValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for UnitValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl TryFrom<&serde_json::Value> for UnitValue {
    type Error = CopsError;

    fn try_from(value: &serde_json::Value) -> CopsResult<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| CopsError::invalid_units(n.to_string())),
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(CopsError::unsupported_unit_type(json_type_name(other))),
        }
    }
}

impl std::fmt::Display for UnitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Resolve a unit expression to pixels. Percentages are taken of `relative_to`.
pub fn resolve_units(value: &UnitValue, relative_to: f64) -> CopsResult<f64> {
    match value {
        UnitValue::Number(n) if n.is_finite() => Ok(*n),
        UnitValue::Number(n) => Err(CopsError::invalid_units(n.to_string())),
        UnitValue::Text(s) => parse_unit_str(s, relative_to),
    }
}

fn parse_unit_str(s: &str, relative_to: f64) -> CopsResult<f64> {
    if let Some(n) = parse_plain_number(s) {
        return Ok(n);
    }

    let (num, percent) = if let Some(num) = s.strip_suffix("px") {
        (num, false)
    } else if let Some(num) = s.strip_suffix('%') {
        (num, true)
    } else {
        return Err(CopsError::invalid_units(s));
    };

    let n = parse_plain_number(num)
        .ok_or_else(|| CopsError::invalid_units(format!("bad number '{num}' in '{s}'")))?;
    if percent {
        Ok(n / 100.0 * relative_to)
    } else {
        Ok(n)
    }
}

fn parse_plain_number(s: &str) -> Option<f64> {
    // `f64::from_str` also accepts "inf" and "NaN", which are not pixel counts.
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/units.rs"]
mod tests;
