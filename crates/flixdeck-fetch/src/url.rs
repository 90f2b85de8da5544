//! Request descriptors and catalog URL building.
//!
//! The fully resolved URL string returned by [`RequestDescriptor::resolve`]
//! doubles as the de-duplication key for the in-flight table.

use std::fmt;

use reqwest::Url;

use flixdeck_core::{Error, Result};

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => fmt_number(f, *x),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ECMAScript Number-to-String: plain decimal for magnitudes in [1e-6, 1e21),
// otherwise exponent form with an explicit sign (`1e+21`, `1.5e-7`).
fn fmt_number(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("NaN");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if x == 0.0 {
        return f.write_str("0");
    }
    if (1e-6..1e21).contains(&x.abs()) {
        return write!(f, "{x}");
    }
    let exp = format!("{x:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => write!(f, "{mantissa}e+{power}"),
        _ => f.write_str(&exp),
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Str(s.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(n: $t) -> Self {
                ParamValue::Int(n as i64)
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| ParamValue::Str(n.to_string()), ParamValue::Int)
    }
}

/// Ordered query parameters. Absent values are kept so that setting a name
/// to `None` is explicit, but they are never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Option<ParamValue>)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value in place.
    pub fn set(&mut self, name: impl Into<String>, value: Option<ParamValue>) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters that carry a value, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, Some(value.into()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// A path or absolute URL plus its query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    target: String,
    params: Params,
}

impl RequestDescriptor {
    pub fn new(target: impl Into<String>, params: Params) -> Self {
        Self {
            target: target.into(),
            params,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Build the canonical request URL.
    ///
    /// Present parameters are merged in order, then `configured_key` is
    /// appended as `api_key` unless the parameters or the target already
    /// carry one. Fails with [`Error::MissingApiKey`] when no key exists
    /// anywhere.
    pub fn resolve(&self, base_url: &str, configured_key: Option<&str>) -> Result<String> {
        let mut url = resolve_base(base_url, &self.target)?;

        let key_in_params = self.params.get(API_KEY_PARAM).is_some();
        let key_in_url = url.query_pairs().any(|(name, _)| name == API_KEY_PARAM);
        let inject = match (key_in_params || key_in_url, configured_key) {
            (true, _) => None,
            (false, Some(key)) => Some(key),
            (false, None) => return Err(Error::MissingApiKey),
        };

        for (name, value) in self.params.present() {
            set_query_param(&mut url, name, &value.to_string());
        }
        if let Some(key) = inject {
            set_query_param(&mut url, API_KEY_PARAM, key);
        }

        Ok(url.to_string())
    }
}

/// `true` when `target` starts with an `http://` or `https://` scheme.
pub fn is_absolute(target: &str) -> bool {
    let head = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Use an absolute target as-is, otherwise join it onto `base_url` with
/// exactly one separating slash.
pub fn resolve_base(base_url: &str, target: &str) -> Result<Url> {
    let joined = if is_absolute(target) {
        target.to_string()
    } else {
        let base = base_url.trim_end_matches('/');
        let sep = if target.starts_with('/') { "" } else { "/" };
        format!("{base}{sep}{target}")
    };

    Url::parse(&joined).map_err(|e| Error::InvalidUrl {
        url: joined.clone(),
        message: e.to_string(),
    })
}

/// Replace the first occurrence of `name` in place, dropping later ones, or
/// append it when absent.
fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (k, v) in url.query_pairs() {
        if k == name {
            if !replaced {
                pairs.push((k.into_owned(), value.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if !replaced {
        pairs.push((name.to_string(), value.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Mask the API key in a URL before it reaches a log line.
pub fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.query_pairs().any(|(name, _)| name == API_KEY_PARAM) {
        return url.to_string();
    }
    set_query_param(&mut parsed, API_KEY_PARAM, "***");
    parsed.to_string()
}
