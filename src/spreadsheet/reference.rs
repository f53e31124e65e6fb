//! A1-style cell references
//!
//! Worksheet parts address cells as `B3`, optionally with `$` anchors. Indexes are
//! zero-based and returned in `(row, column)` order.

/// Converts a column name (`A`, `Z`, `AA`) into a zero-based column index.
pub(crate) fn col_to_index(column: &str) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for character in column.chars() {
        let digit = match character {
            'A'..='Z' => character as usize - 'A' as usize + 1,
            'a'..='z' => character as usize - 'a' as usize + 1,
            _ => return None,
        };
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a one-based row label into a zero-based row index.
pub(crate) fn row_to_index(row: &str) -> Option<usize> {
    if row.is_empty() || !row.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    row.parse::<usize>().ok()?.checked_sub(1)
}

/// Parses a cell reference like `C12` or `$C$12` into `(row, column)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|character: char| character.is_ascii_digit())?;
    let (column, row) = reference.split_at(split);
    Some((row_to_index(row)?, col_to_index(column)?))
}

/// Formats a zero-based `(row, column)` pair as an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = col + 1;
    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push((b'A' + digit as u8) as char);
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}
