pub const NOT_AVAILABLE: &str = "No disponible";
pub const NOT_AVAILABLE_SHORT: &str = "N/D";
pub const NO_COORDINATE: &str = "N/A";
pub const NO_DESCRIPTION: &str = "Sin descripción disponible.";
pub const DEFAULT_IMAGE: &str = "assets/img_header_1.jpg";

/// Formats a number the way `es-CO` does: `.` groups thousands, `,` separates
/// decimals, at most three fraction digits.
pub fn es_co_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let fixed = format!("{:.3}", rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push(',');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Non-empty trimmed text, or `None`.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Non-zero number, or `None`.
pub fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

pub fn join_or(items: &[String], fallback: &str) -> String {
    let parts: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        fallback.to_string()
    } else {
        parts.join(", ")
    }
}

pub fn is_absolute_http_url(raw: &str) -> bool {
    let s = raw.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

/// First absolute image URL candidate, or the bundled default image.
pub fn image_or_default(candidate: Option<&str>) -> &str {
    match candidate {
        Some(url) if is_absolute_http_url(url) => url.trim(),
        _ => DEFAULT_IMAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(es_co_number(50882884.0), "50.882.884");
        assert_eq!(es_co_number(1141748.0), "1.141.748");
        assert_eq!(es_co_number(999.0), "999");
        assert_eq!(es_co_number(1000.0), "1.000");
        assert_eq!(es_co_number(0.0), "0");
    }

    #[test]
    fn decimals_use_comma_and_three_digits() {
        assert_eq!(es_co_number(63612.5), "63.612,5");
        assert_eq!(es_co_number(1234.56789), "1.234,568");
        assert_eq!(es_co_number(-2500.25), "-2.500,25");
    }

    #[test]
    fn present_trims_and_drops_empty() {
        assert_eq!(present(Some("  Bogotá ")), Some("Bogotá"));
        assert_eq!(present(Some("   ")), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn join_skips_blank_items() {
        let items = vec!["Brasil".to_string(), " ".to_string(), "Perú".to_string()];
        assert_eq!(join_or(&items, NOT_AVAILABLE), "Brasil, Perú");
        assert_eq!(join_or(&[], NOT_AVAILABLE), NOT_AVAILABLE);
    }

    #[test]
    fn image_falls_back_unless_absolute_http() {
        assert_eq!(image_or_default(Some("https://x.test/a.jpg")), "https://x.test/a.jpg");
        assert_eq!(image_or_default(Some("http://x.test/a.jpg")), "http://x.test/a.jpg");
        assert_eq!(image_or_default(Some("/img/a.jpg")), DEFAULT_IMAGE);
        assert_eq!(image_or_default(Some("ftp://x.test/a.jpg")), DEFAULT_IMAGE);
        assert_eq!(image_or_default(None), DEFAULT_IMAGE);
    }
}
