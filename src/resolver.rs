use crate::YamlVersion;

/// The intrinsic type of a plain scalar under the core schema.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolved {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str,
}

/// The classifier failed on a value that matched a numeric shape but cannot
/// be represented, e.g. an integer outside the signed 64-bit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unrepresentable;

/// Classify a plain scalar under the YAML 1.2 core schema, or the widened
/// YAML 1.1 rules when the containing document selected them.
pub(crate) fn resolve(value: &str, version: YamlVersion) -> Result<Resolved, Unrepresentable> {
    if is_null(value) {
        return Ok(Resolved::Null);
    }
    if let Some(b) = as_bool(value, version) {
        return Ok(Resolved::Bool(b));
    }
    if matches_int(value, version) {
        return parse_int(value).map(Resolved::Int).ok_or(Unrepresentable);
    }
    if matches_float(value) {
        return parse_float(value).map(Resolved::Float).ok_or(Unrepresentable);
    }
    Ok(Resolved::Str)
}

pub(crate) fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

pub(crate) fn as_bool(value: &str, version: YamlVersion) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => return Some(true),
        "false" | "False" | "FALSE" => return Some(false),
        _ => {}
    }
    if version == YamlVersion::V1_1 {
        match value {
            "y" | "Y" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => return Some(true),
            "n" | "N" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => return Some(false),
            _ => {}
        }
    }
    None
}

/// Does the value have the shape of a core-schema integer?
///
/// Decimal with an optional sign, `0o` octal or `0x` hexadecimal; YAML 1.1
/// additionally accepts `0b` binary.
pub(crate) fn matches_int(value: &str, version: YamlVersion) -> bool {
    let unsigned = value
        .strip_prefix(['-', '+'])
        .map_or(value, |stripped| stripped);
    if let Some(digits) = unsigned.strip_prefix("0o") {
        return value == unsigned
            && !digits.is_empty()
            && digits.bytes().all(|b| (b'0'..=b'7').contains(&b));
    }
    if let Some(digits) = unsigned.strip_prefix("0x") {
        return value == unsigned
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_hexdigit());
    }
    if version == YamlVersion::V1_1 {
        if let Some(digits) = unsigned.strip_prefix("0b") {
            return value == unsigned
                && !digits.is_empty()
                && digits.bytes().all(|b| b == b'0' || b == b'1');
        }
    }
    !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit())
}

/// Does the value have the shape of a core-schema float?
///
/// An optional sign, then either digits with an optional fractional part or
/// a bare fractional part, then an optional exponent — plus the `.inf` and
/// `.nan` special forms. A value without both a dot and an exponent is an
/// integer, not a float.
pub(crate) fn matches_float(value: &str) -> bool {
    let unsigned = value
        .strip_prefix(['-', '+'])
        .map_or(value, |stripped| stripped);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let mantissa_ok = match mantissa.find('.') {
        Some(pos) => {
            let (integral, fractional) = (&mantissa[..pos], &mantissa[pos + 1..]);
            (!integral.is_empty() || !fractional.is_empty())
                && integral.bytes().all(|b| b.is_ascii_digit())
                && fractional.bytes().all(|b| b.is_ascii_digit())
        }
        // No dot: only digits followed by an exponent qualify.
        None => {
            exponent.is_some()
                && !mantissa.is_empty()
                && mantissa.bytes().all(|b| b.is_ascii_digit())
        }
    };
    if !mantissa_ok {
        return false;
    }
    match exponent {
        Some(exp) => {
            let exp_digits = exp.strip_prefix(['-', '+']).map_or(exp, |stripped| stripped);
            !exp_digits.is_empty() && exp_digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => true,
    }
}

/// Parse an integer-shaped value. Returns `None` when the magnitude does not
/// fit a signed 64-bit integer.
pub(crate) fn parse_int(value: &str) -> Option<i64> {
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let (radix, digits) = if let Some(digits) = unsigned.strip_prefix("0o") {
        (8, digits)
    } else if let Some(digits) = unsigned.strip_prefix("0x") {
        (16, digits)
    } else if let Some(digits) = unsigned.strip_prefix("0b") {
        (2, digits)
    } else {
        (10, unsigned)
    };
    if radix == 10 {
        let mut signed = String::new();
        let signed = if negative {
            signed.push('-');
            signed.push_str(digits);
            signed.as_str()
        } else {
            digits
        };
        atoi::atoi::<i64>(signed.as_bytes())
    } else {
        let magnitude = i64::from_str_radix(digits, radix).ok()?;
        Some(if negative { -magnitude } else { magnitude })
    }
}

/// Parse a float-shaped value, including the special tokens.
pub(crate) fn parse_float(value: &str) -> Option<f64> {
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let magnitude = match unsigned {
        ".inf" | ".Inf" | ".INF" => f64::INFINITY,
        ".nan" | ".NaN" | ".NAN" => f64::NAN,
        other => other.parse::<f64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(value: &str) -> Resolved {
        resolve(value, YamlVersion::V1_2).unwrap()
    }

    #[test]
    fn null_values() {
        for token in ["", "~", "null", "Null", "NULL"] {
            assert_eq!(core(token), Resolved::Null, "{token:?}");
        }
    }

    #[test]
    fn boolean_values() {
        for token in ["true", "True", "TRUE"] {
            assert_eq!(core(token), Resolved::Bool(true), "{token:?}");
        }
        for token in ["false", "False", "FALSE"] {
            assert_eq!(core(token), Resolved::Bool(false), "{token:?}");
        }
        // The 1.1 spellings stay strings under 1.2.
        for token in ["yes", "no", "on", "off", "y", "N"] {
            assert_eq!(core(token), Resolved::Str, "{token:?}");
        }
    }

    #[test]
    fn integer_values() {
        assert_eq!(core("-1234"), Resolved::Int(-1234));
        assert_eq!(core("0"), Resolved::Int(0));
        assert_eq!(core("+120"), Resolved::Int(120));
        assert_eq!(core("0o27"), Resolved::Int(0o27));
        assert_eq!(core("0o77772"), Resolved::Int(0o77772));
        assert_eq!(core("0xA04F"), Resolved::Int(0xA04F));
        assert_eq!(core("0xFf29Bc"), Resolved::Int(0x00FF_29BC));
    }

    #[test]
    fn integer_boundaries() {
        assert_eq!(
            core("9223372036854775807"),
            Resolved::Int(i64::MAX)
        );
        assert_eq!(
            core("-9223372036854775808"),
            Resolved::Int(i64::MIN)
        );
        assert_eq!(
            resolve("9223372036854775808", YamlVersion::V1_2),
            Err(Unrepresentable)
        );
        assert_eq!(
            resolve("-9223372036854775809", YamlVersion::V1_2),
            Err(Unrepresentable)
        );
    }

    #[test]
    fn float_values() {
        assert_eq!(core("-1.234"), Resolved::Float(-1.234));
        assert_eq!(core("567.8"), Resolved::Float(567.8));
        assert_eq!(core("123."), Resolved::Float(123.0));
        assert_eq!(core(".123"), Resolved::Float(0.123));
        assert_eq!(core("0e1"), Resolved::Float(0.0));
        assert_eq!(core("2e+2"), Resolved::Float(200.0));
        assert_eq!(core("1e-1"), Resolved::Float(0.1));
        assert_eq!(core("9.8e-3"), Resolved::Float(0.0098));
        assert_eq!(core("3.95E3"), Resolved::Float(3950.0));
        assert_eq!(core("1.e3"), Resolved::Float(1000.0));
    }

    #[test]
    fn float_specials() {
        for token in [".inf", ".Inf", ".INF", "+.inf"] {
            assert_eq!(core(token), Resolved::Float(f64::INFINITY), "{token:?}");
        }
        for token in ["-.inf", "-.Inf", "-.INF"] {
            assert_eq!(
                core(token),
                Resolved::Float(f64::NEG_INFINITY),
                "{token:?}"
            );
        }
        for token in [".nan", ".NaN", ".NAN"] {
            match core(token) {
                Resolved::Float(f) => assert!(f.is_nan(), "{token:?}"),
                other => panic!("{token:?} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn string_values() {
        for token in [
            "nullValue",
            "~Value",
            "trueValue",
            "falsy",
            ".infValue",
            ".nanValue",
            "-.foo",
            ".foo",
            "abc",
            "0th",
            "1st",
            "0e",
            "0e+",
            "0E",
            "1.2.3",
            "1.23e",
            "1.2e-z",
            "1.non-digit",
            "1exe",
            "0oabc",
            "0o8",
            "0xyz",
            "-",
            "+",
            ".",
            "-0x10",
        ] {
            assert_eq!(core(token), Resolved::Str, "{token:?}");
        }
    }

    #[test]
    fn version_1_1_extensions() {
        assert_eq!(
            resolve("yes", YamlVersion::V1_1).unwrap(),
            Resolved::Bool(true)
        );
        assert_eq!(
            resolve("Off", YamlVersion::V1_1).unwrap(),
            Resolved::Bool(false)
        );
        assert_eq!(
            resolve("0b1011", YamlVersion::V1_1).unwrap(),
            Resolved::Int(0b1011)
        );
        assert_eq!(resolve("0b1011", YamlVersion::V1_2).unwrap(), Resolved::Str);
    }
}
