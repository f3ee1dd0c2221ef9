use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Read the `"lat, lon"` pair encoded in an address.
///
/// Splits on the first comma and parses each trimmed half leniently: the longest
/// numeric prefix wins and anything unparseable becomes `NaN`. Ranges are not checked.
pub fn extract_coordinates(address: &str) -> Coordinates {
    let mut parts = address.split(',');
    let lat = parts.next().unwrap_or_default();
    let lon = parts.next();

    Coordinates {
        latitude: parse_float(lat),
        longitude: lon.map_or(f64::NAN, parse_float),
    }
}

fn parse_float(text: &str) -> f64 {
    let text = text.trim();
    let prefix = numeric_prefix(text);
    if prefix.is_empty() {
        return f64::NAN;
    }
    prefix.parse().unwrap_or(f64::NAN)
}

/// Longest leading slice of `text` that reads as a decimal literal (or `Infinity`).
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        return &text[..end + "Infinity".len()];
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    &text[..end]
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lon_pair() {
        let c = extract_coordinates("51.505, -0.09");
        assert_eq!(c.latitude, 51.505);
        assert_eq!(c.longitude, -0.09);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let tight = extract_coordinates("48.8566,2.3522");
        let loose = extract_coordinates("  48.8566 ,\t 2.3522  ");
        assert_eq!(tight, loose);
        assert_eq!(loose.latitude, 48.8566);
        assert_eq!(loose.longitude, 2.3522);
    }

    #[test]
    fn missing_comma_yields_nan_longitude() {
        let c = extract_coordinates("51.505");
        assert_eq!(c.latitude, 51.505);
        assert!(c.longitude.is_nan());
    }

    #[test]
    fn street_address_yields_nan() {
        let c = extract_coordinates("221B Baker Street, London");
        assert_eq!(c.latitude, 221.0);
        assert!(c.longitude.is_nan());

        let c = extract_coordinates("Baker Street, London");
        assert!(c.latitude.is_nan());
        assert!(c.longitude.is_nan());
    }

    #[test]
    fn empty_address_yields_nan() {
        let c = extract_coordinates("");
        assert!(c.latitude.is_nan());
        assert!(c.longitude.is_nan());
    }

    #[test]
    fn only_first_two_components_are_read() {
        let c = extract_coordinates("1.5, 2.5, 3.5");
        assert_eq!(c.latitude, 1.5);
        assert_eq!(c.longitude, 2.5);
    }

    #[test]
    fn ranges_are_not_validated() {
        let c = extract_coordinates("123.4, -500");
        assert_eq!(c.latitude, 123.4);
        assert_eq!(c.longitude, -500.0);
    }

    #[test]
    fn numeric_prefix_is_lenient() {
        assert_eq!(parse_float("12abc"), 12.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("-3."), -3.0);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("2e"), 2.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float(".").is_nan());
        assert!(parse_float("-").is_nan());
        assert!(parse_float("abc").is_nan());
    }
}
