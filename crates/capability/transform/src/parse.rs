//! 路径编码与 payload 数值的宽松解析。
//!
//! 规则与设备侧 JS 脚本一致：只取前导数字部分，尾随内容忽略。

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::InvalidReason;

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// 取路径最后一段并解析前导整数。
pub fn parse_path_code(path: &str) -> Result<i64, InvalidReason> {
    let segment = path.rsplit('/').next().unwrap_or_default();
    leading_integer(segment).ok_or_else(|| InvalidReason::PathCode(segment.to_string()))
}

/// base64 → ASCII 文本 → 前导浮点数。
pub fn decode_payload_value(payload: &str) -> Result<f64, InvalidReason> {
    let text = decode_payload_text(payload)?;
    leading_float(&text).ok_or(InvalidReason::Value(text))
}

/// base64 解码为 7 位 ASCII 文本（高位清零）。
///
/// `=` 之后的内容忽略；末尾多出的单个字符不足一个字节，直接丢弃。
pub fn decode_payload_text(payload: &str) -> Result<String, InvalidReason> {
    let mut cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    if let Some(pad) = cleaned.find('=') {
        cleaned.truncate(pad);
    }
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }
    let bytes = LENIENT_BASE64
        .decode(cleaned.as_bytes())
        .map_err(|err| InvalidReason::Base64(err.to_string()))?;
    Ok(bytes.iter().map(|b| (b & 0x7f) as char).collect())
}

/// 前导整数：可选符号，十进制或 `0x` 十六进制。溢出视为无法解析。
pub fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = split_sign(text);
    let (radix, rest) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let end = rest
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude = i64::from_str_radix(&rest[..end], radix).ok()?;
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

/// 前导十进制浮点（含小数与指数部分），支持 `Infinity`。
pub fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (negative, rest) = split_sign(text);
    let sign = if negative { -1.0 } else { 1.0 };
    if rest.starts_with("Infinity") {
        return Some(sign * f64::INFINITY);
    }

    let bytes = rest.as_bytes();
    let mut pos = 0;
    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &rest[int_start..pos];
    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &rest[frac_start..frac_end];
        pos = frac_end;
    }
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent = String::new();
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_pos = pos + 1;
        let mut exp_sign = "";
        if exp_pos < bytes.len() && (bytes[exp_pos] == b'+' || bytes[exp_pos] == b'-') {
            exp_sign = &rest[exp_pos..exp_pos + 1];
            exp_pos += 1;
        }
        let digits_start = exp_pos;
        while exp_pos < bytes.len() && bytes[exp_pos].is_ascii_digit() {
            exp_pos += 1;
        }
        // 指数部分缺少数字时不计入
        if exp_pos > digits_start {
            exponent = format!("e{}{}", exp_sign, &rest[digits_start..exp_pos]);
        }
    }

    let literal = format!(
        "{}.{}{}",
        if int_digits.is_empty() { "0" } else { int_digits },
        if frac_digits.is_empty() { "0" } else { frac_digits },
        exponent
    );
    literal.parse::<f64>().ok().map(|value| sign * value)
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}
