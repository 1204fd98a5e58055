/// Formats a raw phone number for display.
///
/// Ten digits become `(555) 123-4567`, eleven digits with a leading `1` get a
/// `+1 ` prefix. Anything else is returned as given.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::format_phone_number;

    #[test]
    fn formats_ten_digits() {
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone_number("555-123-4567"), "(555) 123-4567");
    }

    #[test]
    fn formats_country_code() {
        assert_eq!(format_phone_number("15551234567"), "+1 (555) 123-4567");
    }

    #[test]
    fn leaves_other_input_alone() {
        assert_eq!(format_phone_number("12345"), "12345");
        assert_eq!(format_phone_number("25551234567"), "25551234567");
        assert_eq!(format_phone_number(""), "");
    }
}
