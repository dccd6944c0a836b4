//! Locale-formatted number extraction.
//!
//! Grammar: numbers are `[-]digits[.digits]`, separated by any other text.
//! A `-` glued to a preceding digit is a range separator ("10-20"), not a sign.
//! A cell with several numbers (a range) is reduced to the arithmetic mean of all of them.

use crate::types::ParseError;

/// Turn French-formatted text into dot-decimal text.
///
/// - NBSP / narrow NBSP (thousands separators) are removed
/// - `,` is the decimal mark and becomes `.`
/// - a `.` is dropped only as a thousands separator: after a digit, followed by
///   groups of exactly three digits that end in a comma decimal ("1.234,50")
pub fn normalize_decimal(text: &str) -> String {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| !matches!(c, '\u{a0}' | '\u{202f}' | '\u{2009}'))
        .collect();

    let mut out = String::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        match c {
            '.' if is_thousands_dot(&chars, i) => {}
            ',' => out.push('.'),
            _ => out.push(*c),
        }
    }
    out
}

fn is_thousands_dot(chars: &[char], dot: usize) -> bool {
    if dot == 0 || !chars[dot - 1].is_ascii_digit() {
        return false;
    }
    let mut at = dot;
    loop {
        let group = chars.get(at + 1..at + 4);
        if !group.is_some_and(|g| g.iter().all(char::is_ascii_digit)) {
            return false;
        }
        match chars.get(at + 4) {
            Some(',') => return chars.get(at + 5).is_some_and(char::is_ascii_digit),
            Some('.') => at += 4,
            _ => return false,
        }
    }
}

/// Drop currency signs and unit suffixes ("€/m3", "/pièce", "€ / kg") so that
/// only amounts are left. A `/` followed by a digit is kept.
pub fn strip_unit_suffixes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '€' => {
                out.push(' ');
                i += 1;
            }
            '/' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if chars.get(j).is_some_and(char::is_ascii_digit) {
                    out.push('/');
                    i += 1;
                    continue;
                }
                while j < chars.len() && !chars[j].is_whitespace() {
                    j += 1;
                }
                out.push(' ');
                i = j;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Every number in `text`, in order of appearance.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    let normalized = normalize_decimal(text);
    let chars: Vec<char> = normalized.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let negative = chars[i] == '-'
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
            && (i == 0 || !(chars[i - 1].is_ascii_digit() || chars[i - 1] == '.'));
        let start = if negative { i + 1 } else { i };

        if !chars.get(start).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
            continue;
        }

        let mut end = start;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
        if end + 1 < chars.len() && chars[end] == '.' && chars[end + 1].is_ascii_digit() {
            end += 1;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
        }

        let literal: String = chars[start..end].iter().collect();
        if let Ok(v) = literal.parse::<f64>() {
            out.push(if negative { -v } else { v });
        }
        i = end;
    }

    out
}

/// Arithmetic mean of every number in `text`; a single value is its own mean.
pub fn mean_of_numbers(text: &str) -> Option<f64> {
    let numbers = extract_numbers(text);
    if numbers.is_empty() {
        return None;
    }
    Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

/// Parse a price cell such as "1,85", "3,50 €", "4,34 €/m3" or "10 € - 20 €".
///
/// Unit suffixes are removed first (so the "3" of "m3" never counts), then every
/// remaining number is averaged. Negative prices are rejected.
pub fn parse_price_text(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let amounts = strip_unit_suffixes(trimmed);
    let value =
        mean_of_numbers(&amounts).ok_or_else(|| ParseError::NoNumber(trimmed.to_string()))?;
    if value < 0.0 {
        return Err(ParseError::Negative(trimmed.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_range_means() {
        assert_eq!(mean_of_numbers("10-20"), Some(15.0));
        assert_relative_eq!(mean_of_numbers("0.8-2").unwrap(), 1.4);
        assert_relative_eq!(mean_of_numbers("0,8-2 kg / pied").unwrap(), 1.4);
        assert_eq!(mean_of_numbers("10 à 20 jours"), Some(15.0));
    }

    #[test]
    fn test_single_value_is_its_own_mean() {
        assert_eq!(mean_of_numbers("4"), Some(4.0));
        assert_eq!(mean_of_numbers("2,75"), Some(2.75));
    }

    #[test]
    fn test_no_number() {
        assert_eq!(mean_of_numbers("–"), None);
        assert_eq!(mean_of_numbers(""), None);
        assert_eq!(mean_of_numbers("n/a"), None);
    }

    #[test]
    fn test_sign_vs_range_separator() {
        assert_eq!(extract_numbers("-3"), vec![-3.0]);
        assert_eq!(extract_numbers("de -3 à 5"), vec![-3.0, 5.0]);
        assert_eq!(extract_numbers("3-5"), vec![3.0, 5.0]);
        assert_eq!(extract_numbers("1.5-2.5"), vec![1.5, 2.5]);
    }

    #[test]
    fn test_subscripts_and_superscripts_are_not_digits() {
        assert_eq!(extract_numbers("123,4 g CO₂e"), vec![123.4]);
        assert_eq!(extract_numbers("3 kg/m²"), vec![3.0]);
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(extract_numbers("1\u{a0}234,50"), vec![1234.5]);
        assert_eq!(extract_numbers("1.234,50"), vec![1234.5]);
        assert_eq!(extract_numbers("1.234.567,8"), vec![1234567.8]);
        assert_eq!(extract_numbers("12.345"), vec![12.345]);
    }

    #[test]
    fn test_mixed_dot_and_comma_ranges() {
        assert_relative_eq!(mean_of_numbers("1.5-2,5").unwrap(), 2.0);
        assert_relative_eq!(mean_of_numbers("2.5 à 3,5").unwrap(), 3.0);
        assert_eq!(normalize_decimal("1.5-2,5"), "1.5-2.5");
    }

    #[test]
    fn test_trailing_dot_is_not_decimal() {
        assert_eq!(extract_numbers("env. 2."), vec![2.0]);
    }

    #[test]
    fn test_price_range_with_currency_on_both_ends() {
        assert_eq!(parse_price_text("10 € - 20 €"), Ok(15.0));
        assert_relative_eq!(parse_price_text("0,80-1,20 €/kg").unwrap(), 1.0);
        assert_relative_eq!(parse_price_text("3,40 €/kg - 3,80 €/kg").unwrap(), 3.6);
    }

    #[test]
    fn test_strip_unit_suffixes() {
        assert_eq!(strip_unit_suffixes("4,34 €/m3").trim(), "4,34");
        assert_eq!(strip_unit_suffixes("1/2 kg"), "1/2 kg");
    }

    #[test]
    fn test_parse_price_text() {
        assert_eq!(parse_price_text("1,85"), Ok(1.85));
        assert_eq!(parse_price_text(" 3,50 € "), Ok(3.5));
        assert_eq!(parse_price_text("4,34 €/m3"), Ok(4.34));
        assert_eq!(parse_price_text("€ 2,10"), Ok(2.1));
        assert_eq!(parse_price_text("2,10 € / kg"), Ok(2.1));
        assert_eq!(parse_price_text("0,85 /pièce"), Ok(0.85));
        assert_eq!(parse_price_text(""), Err(ParseError::Empty));
        assert!(matches!(parse_price_text("gratuit"), Err(ParseError::NoNumber(_))));
        assert!(matches!(parse_price_text("-2"), Err(ParseError::Negative(_))));
    }
}
