//! Builtin text predicates.
//!
//! Every predicate receives the textual form of the value, the normalized
//! argument list and the record being validated.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::model::{Record, Value};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap()
});

static DISPLAY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>]*<([^<>]+)>$").unwrap());

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<proto>[A-Za-z][A-Za-z0-9+.-]*)://)?(?:[^\s:@/]+(?::[^\s@/]*)?@)?(?P<host>localhost|(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}|\d{1,3}(?:\.\d{1,3}){3}|\[[0-9A-Fa-f:.]+\])(?::\d{1,5})?(?:[/?#]\S*)?$",
    )
    .unwrap()
});

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:0|[1-9][0-9]*)$").unwrap());

static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:[0-9]+|[0-9]*\.[0-9]+)$").unwrap());

static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0[xXhH])?[0-9A-Fa-f]+$").unwrap());

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{4}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").unwrap()
});

static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{6,14}$").unwrap());

/// Predicates shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Equals,
    Contains,
    NotContains,
    Is,
    Not,
    IsEmail,
    IsUrl,
    IsIp,
    IsIpv4,
    IsIpv6,
    IsAlpha,
    IsAlphanumeric,
    IsNumeric,
    IsInt,
    IsFloat,
    IsDecimal,
    IsLowercase,
    IsUppercase,
    IsHexadecimal,
    IsHexColor,
    IsUuid,
    IsDate,
    IsAfter,
    IsBefore,
    IsIn,
    NotIn,
    NotEmpty,
    Len,
    Max,
    Min,
    IsCreditCard,
    IsMobilePhone,
    IsImmutable,
    NotNull,
}

impl Builtin {
    pub const ALL: [Builtin; 34] = [
        Self::Equals,
        Self::Contains,
        Self::NotContains,
        Self::Is,
        Self::Not,
        Self::IsEmail,
        Self::IsUrl,
        Self::IsIp,
        Self::IsIpv4,
        Self::IsIpv6,
        Self::IsAlpha,
        Self::IsAlphanumeric,
        Self::IsNumeric,
        Self::IsInt,
        Self::IsFloat,
        Self::IsDecimal,
        Self::IsLowercase,
        Self::IsUppercase,
        Self::IsHexadecimal,
        Self::IsHexColor,
        Self::IsUuid,
        Self::IsDate,
        Self::IsAfter,
        Self::IsBefore,
        Self::IsIn,
        Self::NotIn,
        Self::NotEmpty,
        Self::Len,
        Self::Max,
        Self::Min,
        Self::IsCreditCard,
        Self::IsMobilePhone,
        Self::IsImmutable,
        Self::NotNull,
    ];

    /// Registry name of the predicate.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Is => "is",
            Self::Not => "not",
            Self::IsEmail => "isEmail",
            Self::IsUrl => "isUrl",
            Self::IsIp => "isIP",
            Self::IsIpv4 => "isIPv4",
            Self::IsIpv6 => "isIPv6",
            Self::IsAlpha => "isAlpha",
            Self::IsAlphanumeric => "isAlphanumeric",
            Self::IsNumeric => "isNumeric",
            Self::IsInt => "isInt",
            Self::IsFloat => "isFloat",
            Self::IsDecimal => "isDecimal",
            Self::IsLowercase => "isLowercase",
            Self::IsUppercase => "isUppercase",
            Self::IsHexadecimal => "isHexadecimal",
            Self::IsHexColor => "isHexColor",
            Self::IsUuid => "isUUID",
            Self::IsDate => "isDate",
            Self::IsAfter => "isAfter",
            Self::IsBefore => "isBefore",
            Self::IsIn => "isIn",
            Self::NotIn => "notIn",
            Self::NotEmpty => "notEmpty",
            Self::Len => "len",
            Self::Max => "max",
            Self::Min => "min",
            Self::IsCreditCard => "isCreditCard",
            Self::IsMobilePhone => "isMobilePhone",
            Self::IsImmutable => "isImmutable",
            Self::NotNull => "notNull",
        }
    }

    /// Look up a builtin by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "isURL" {
            return Some(Self::IsUrl);
        }
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Predicates whose optional locale argument is not supported.
    pub fn is_locale_aware(&self) -> bool {
        matches!(self, Self::IsAlpha | Self::IsAlphanumeric | Self::IsMobilePhone)
    }

    /// Predicates taking an options object as their only argument.
    pub fn takes_options_object(&self) -> bool {
        matches!(self, Self::IsUrl | Self::IsEmail)
    }

    /// Run the predicate.
    pub fn check(&self, text: &str, args: &[Value], record: &Record) -> bool {
        let arg = args.first();
        match self {
            Self::Equals => arg.is_some_and(|a| a.to_text() == text),
            Self::Contains => arg.is_some_and(|a| text.contains(&a.to_text())),
            Self::NotContains => !arg.is_some_and(|a| text.contains(&a.to_text())),
            Self::Is => matches_pattern(text, args).unwrap_or(false),
            Self::Not => matches_pattern(text, args).is_some_and(|m| !m),
            Self::IsEmail => is_email(text, arg),
            Self::IsUrl => is_url(text, arg),
            Self::IsIp => match arg.map(Value::to_text).as_deref() {
                Some("4") => text.parse::<Ipv4Addr>().is_ok(),
                Some("6") => text.parse::<Ipv6Addr>().is_ok(),
                _ => text.parse::<Ipv4Addr>().is_ok() || text.parse::<Ipv6Addr>().is_ok(),
            },
            Self::IsIpv4 => text.parse::<Ipv4Addr>().is_ok(),
            Self::IsIpv6 => text.parse::<Ipv6Addr>().is_ok(),
            Self::IsAlpha => !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic()),
            Self::IsAlphanumeric => {
                !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric())
            }
            Self::IsNumeric => NUMERIC_RE.is_match(text),
            Self::IsInt => INT_RE.is_match(text) && within_bounds(text, arg),
            Self::IsFloat => {
                !matches!(text, "" | "." | "+" | "-")
                    && FLOAT_RE.is_match(text)
                    && within_bounds(text, arg)
            }
            Self::IsDecimal => {
                !matches!(text, "" | "." | "+" | "-") && DECIMAL_RE.is_match(text)
            }
            Self::IsLowercase => text == text.to_lowercase(),
            Self::IsUppercase => text == text.to_uppercase(),
            Self::IsHexadecimal => HEX_RE.is_match(text),
            Self::IsHexColor => HEX_COLOR_RE.is_match(text),
            Self::IsUuid => is_uuid(text, arg),
            Self::IsDate => parse_datetime(text).is_some(),
            Self::IsAfter => compare_dates(text, arg).is_some_and(|(v, bound)| v > bound),
            Self::IsBefore => compare_dates(text, arg).is_some_and(|(v, bound)| v < bound),
            Self::IsIn => choices(args).iter().any(|c| c.to_text() == text),
            Self::NotIn => !choices(args).iter().any(|c| c.to_text() == text),
            Self::NotEmpty => !text.trim().is_empty(),
            Self::Len => {
                let len = text.chars().count() as f64;
                let min = arg.and_then(Value::as_f64).unwrap_or(0.0);
                let max = args.get(1).and_then(Value::as_f64);
                len >= min && max.is_none_or(|m| len <= m)
            }
            Self::Max => match (text.trim().parse::<f64>(), arg.and_then(Value::as_f64)) {
                (Ok(v), Some(m)) => v <= m,
                _ => false,
            },
            Self::Min => match (text.trim().parse::<f64>(), arg.and_then(Value::as_f64)) {
                (Ok(v), Some(m)) => v >= m,
                _ => false,
            },
            Self::IsCreditCard => is_credit_card(text),
            Self::IsMobilePhone => {
                let compact: String =
                    text.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.')).collect();
                MOBILE_RE.is_match(&compact)
            }
            Self::IsImmutable => {
                let field = args.get(1).map(Value::to_text).unwrap_or_default();
                let previous = record.previous(&field);
                previous.is_null() || previous.to_text() == text
            }
            Self::NotNull => true,
        }
    }
}

/// Compile `[pattern, flags?]` and match. `None` when the pattern is invalid.
fn matches_pattern(text: &str, args: &[Value]) -> Option<bool> {
    let pattern = args.first()?.to_text();
    let flags = args.get(1).map(Value::to_text).unwrap_or_default();

    match RegexBuilder::new(&pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
    {
        Ok(re) => Some(re.is_match(text)),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "invalid pattern in predicate");
            None
        }
    }
}

fn is_email(text: &str, options: Option<&Value>) -> bool {
    let allow_display_name =
        options.and_then(|o| o.option("allow_display_name")).is_some_and(Value::is_truthy);

    let address = match DISPLAY_NAME_RE.captures(text) {
        Some(caps) if allow_display_name => caps.get(1).map_or(text, |m| m.as_str()).trim(),
        _ => text,
    };

    if !EMAIL_RE.is_match(address) || address.len() > 254 {
        return false;
    }
    // Top-level domain must be alphabetic.
    address
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_url(text: &str, options: Option<&Value>) -> bool {
    if text.is_empty() || text.len() > 2083 || text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some(caps) = URL_RE.captures(text) else {
        return false;
    };

    let require_protocol =
        options.and_then(|o| o.option("require_protocol")).is_some_and(Value::is_truthy);
    let protocols: Vec<String> = options
        .and_then(|o| o.option("protocols"))
        .and_then(Value::as_array)
        .map(|p| p.iter().map(|v| v.to_text().to_lowercase()).collect())
        .unwrap_or_else(|| vec!["http".into(), "https".into(), "ftp".into()]);

    match caps.name("proto") {
        Some(proto) => protocols.contains(&proto.as_str().to_lowercase()),
        None => !require_protocol,
    }
}

fn is_uuid(text: &str, version: Option<&Value>) -> bool {
    // Only the hyphenated form is accepted.
    if text.len() != 36 {
        return false;
    }
    let Ok(uuid) = uuid::Uuid::parse_str(text) else {
        return false;
    };
    match version.map(Value::to_text).as_deref() {
        None | Some("all") => true,
        Some(v) => v.parse::<usize>().is_ok_and(|n| uuid.get_version_num() == n),
    }
}

fn within_bounds(text: &str, options: Option<&Value>) -> bool {
    let Ok(v) = text.parse::<f64>() else {
        return false;
    };
    let bound = |key: &str| options.and_then(|o| o.option(key)).and_then(Value::as_f64);
    bound("min").is_none_or(|min| v >= min) && bound("max").is_none_or(|max| v <= max)
}

fn choices(args: &[Value]) -> &[Value] {
    match args.first() {
        Some(Value::Array(items)) => items,
        _ => args,
    }
}

/// Parse the date formats accepted by the date predicates.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Value date and bound; the bound defaults to now.
fn compare_dates(text: &str, bound: Option<&Value>) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let value = parse_datetime(text)?;
    let bound = match bound {
        Some(b) => parse_datetime(&b.to_text())?,
        None => Local::now().naive_local(),
    };
    Some((value, bound))
}

fn is_credit_card(text: &str) -> bool {
    let digits: Vec<u32> = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()
        .unwrap_or_default();

    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    // Luhn checksum
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}
