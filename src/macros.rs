macro_rules! CHECK_AT {
    ($buffer:expr, $ch:expr, $offset:expr) => {
        $buffer.get($offset).copied() == Some($ch)
    };
}

macro_rules! CHECK {
    ($buffer:expr, $ch:expr) => {
        $buffer.get(0).copied() == Some($ch)
    };
}

macro_rules! IS_ALPHA {
    ($buffer:expr) => {
        crate::macros::is_alpha($buffer.get(0).copied())
    };
}

/// The character set YAML allows in anchor names, tag handles and directive
/// names: alphanumerics plus `_` and `-`.
pub(crate) fn is_alpha(ch: impl Into<Option<char>>) -> bool {
    let Some(ch) = ch.into() else {
        return false;
    };
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

macro_rules! IS_DIGIT {
    ($buffer:expr) => {
        $buffer
            .get(0)
            .copied()
            .map(|ch| ch.is_ascii_digit())
            .unwrap_or(false)
    };
}

macro_rules! AS_DIGIT {
    ($buffer:expr) => {
        $buffer
            .get(0)
            .copied()
            .expect("out of bounds buffer access")
            .to_digit(10)
            .expect("not in digit range")
    };
}

macro_rules! IS_HEX_AT {
    ($buffer:expr, $offset:expr) => {
        if let Some(ch) = $buffer.get($offset).copied() {
            ch.is_ascii_hexdigit()
        } else {
            false
        }
    };
}

macro_rules! AS_HEX_AT {
    ($buffer:expr, $offset:expr) => {
        $buffer
            .get($offset)
            .copied()
            .expect("out of range buffer access")
            .to_digit(16)
            .expect("not in digit range (hex)")
    };
}

/// Characters the emitter may write without escaping.
pub(crate) fn is_printable(ch: char) -> bool {
    match ch {
        '\u{feff}' | '\u{fffe}' | '\u{ffff}' => false,
        '\x0a'
        | '\x20'..='\x7e'
        | '\u{00a0}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}' => true,
        _ => false,
    }
}

macro_rules! IS_Z_AT {
    ($buffer:expr, $offset:expr) => {
        $buffer.get($offset).is_none()
    };
}

macro_rules! IS_Z {
    ($buffer:expr) => {
        IS_Z_AT!($buffer, 0)
    };
}

macro_rules! IS_BOM {
    ($buffer:expr) => {
        CHECK!($buffer, '\u{feff}')
    };
}

macro_rules! IS_SPACE {
    ($buffer:expr) => {
        CHECK!($buffer, ' ')
    };
}

pub(crate) fn is_space(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some(' ')
}

macro_rules! IS_TAB {
    ($buffer:expr) => {
        CHECK!($buffer, '\t')
    };
}

pub(crate) fn is_tab(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some('\t')
}

macro_rules! IS_BLANK_AT {
    ($buffer:expr, $offset:expr) => {{
        let ch = $buffer.get($offset).copied();
        $crate::macros::is_blank(ch)
    }};
}

macro_rules! IS_BLANK {
    ($buffer:expr) => {
        IS_BLANK_AT!($buffer, 0)
    };
}

pub(crate) fn is_blank(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_space(ch) || is_tab(ch)
}

pub(crate) fn is_blankz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_blank(ch) || is_breakz(ch)
}

macro_rules! IS_BREAK_AT {
    ($buffer:expr, $offset:expr) => {
        $crate::macros::is_break($buffer.get($offset).copied())
    };
}

macro_rules! IS_BREAK {
    ($buffer:expr) => {
        IS_BREAK_AT!($buffer, 0)
    };
}

pub(crate) fn is_break(ch: impl Into<Option<char>>) -> bool {
    matches!(
        ch.into(),
        Some('\r' | '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}')
    )
}

pub(crate) fn is_breakz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    ch.is_none() || is_break(ch)
}

macro_rules! IS_BREAKZ_AT {
    ($buffer:expr, $offset:expr) => {{
        let ch = $buffer.get($offset).copied();
        crate::macros::is_breakz(ch)
    }};
}

macro_rules! IS_BREAKZ {
    ($buffer:expr) => {
        IS_BREAKZ_AT!($buffer, 0)
    };
}

macro_rules! IS_BLANKZ_AT {
    ($buffer:expr, $offset:expr) => {{
        let ch = $buffer.get($offset).copied();
        $crate::macros::is_blankz(ch)
    }};
}

macro_rules! IS_BLANKZ {
    ($buffer:expr) => {
        IS_BLANKZ_AT!($buffer, 0)
    };
}

/// The URI character set permitted in tag handles and suffixes: the
/// unreserved and reserved sets of RFC 3986 plus `%HH` escapes, which are
/// validated separately.
pub(crate) fn is_uri_char(ch: char) -> bool {
    is_alpha(ch)
        || matches!(
            ch,
            '.' | '~'
                | ':' | '/' | '?' | '#' | '[' | ']' | '@'
                | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
                | '%'
        )
}

pub(crate) fn vecdeque_starts_with<T: PartialEq + Copy>(
    deque: &std::collections::VecDeque<T>,
    needle: &[T],
) -> bool {
    let (head, tail) = deque.as_slices();
    if head.len() >= needle.len() {
        head.starts_with(needle)
    } else {
        head.iter()
            .chain(tail.iter())
            .copied()
            .take(needle.len())
            .eq(needle.iter().copied())
    }
}
