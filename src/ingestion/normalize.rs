//! Cleansing rules applied while reading.
//!
//! These are format-specific: CSV and spreadsheet values are kept verbatim, while delimited
//! text, JSON and the fixed-width registry exports are stripped of padding.

/// Full-width (ideographic) space, common padding in East-Asian registry exports.
pub const FULL_WIDTH_SPACE: char = '\u{3000}';

/// First Gregorian year of the Minguo calendar minus one (Minguo 1 == 1912).
pub const MINGUO_EPOCH_OFFSET: i64 = 1911;

/// Removes every ASCII space and full-width space, wherever they occur.
pub fn strip_spaces(value: &str) -> String {
    value
        .chars()
        .filter(|&c| c != ' ' && c != FULL_WIDTH_SPACE)
        .collect()
}

/// Removes ASCII spaces only. Used for header names of delimited text.
pub fn strip_ascii_spaces(value: &str) -> String {
    value.chars().filter(|&c| c != ' ').collect()
}

/// Removes all Unicode whitespace. Used for table names derived from file names.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Converts a Gregorian year to a zero-padded, three-digit Minguo year.
///
/// Integral decimals such as `2024.0` are accepted. Returns an error message when the input
/// is not a whole number or precedes Minguo 1.
pub fn to_minguo_year(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    let year = match raw.parse::<i64>() {
        Ok(year) => year,
        Err(e) => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => return Err(format!("expected a gregorian year: {e}")),
        },
    };
    let minguo = year - MINGUO_EPOCH_OFFSET;
    if minguo < 1 {
        return Err(format!("year {year} precedes the minguo calendar"));
    }
    Ok(format!("{minguo:03}"))
}

/// Number of address continuation cells that follow the address in a registry line.
pub const ADDRESS_CONTINUATIONS: usize = 4;

/// Appends the `ADDRESS_CONTINUATIONS` cells following `address_idx` onto the address cell.
///
/// The caller guarantees `cells.len() > address_idx + ADDRESS_CONTINUATIONS`.
pub fn fold_address(cells: &mut Vec<String>, address_idx: usize) {
    let tail: Vec<String> = cells
        .drain(address_idx + 1..=address_idx + ADDRESS_CONTINUATIONS)
        .collect();
    for part in tail {
        cells[address_idx].push_str(&part);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_spaces_removes_ascii_and_full_width() {
        assert_eq!(strip_spaces(" 王\u{3000}小 明 "), "王小明");
        assert_eq!(strip_spaces("\t"), "\t");
    }

    #[test]
    fn minguo_year_is_zero_padded() {
        assert_eq!(to_minguo_year("2024").unwrap(), "113");
        assert_eq!(to_minguo_year("1912").unwrap(), "001");
        assert_eq!(to_minguo_year(" 1999 ").unwrap(), "088");
        assert_eq!(to_minguo_year("2024.0").unwrap(), "113");
    }

    #[test]
    fn minguo_year_rejects_bad_input() {
        assert!(to_minguo_year("1911").is_err());
        assert!(to_minguo_year("abc").is_err());
        assert!(to_minguo_year("2024.5").is_err());
    }

    #[test]
    fn fold_address_merges_following_cells() {
        let mut cells: Vec<String> = ["a", "b", "addr", "1", "2", "3", "4", "z"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        fold_address(&mut cells, 2);
        assert_eq!(cells, vec!["a", "b", "addr1234", "z"]);
    }
}
