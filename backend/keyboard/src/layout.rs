//! Key layout shown by the on-screen keyboard.

pub const ROWS: [&[char]; 3] = [
    &['Q', 'W', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P'],
    &['A', 'S', 'D', 'F', 'G', 'H', 'J', 'K', 'L'],
    &['Z', 'X', 'C', 'V', 'B', 'N', 'M'],
];

/// Character keys in display order, row by row.
pub fn rows() -> &'static [&'static [char]] {
    &ROWS
}

/// Whether `key` has a button on the layout. Space and the voice key are
/// separate controls and are not part of the rows.
pub fn contains(key: char) -> bool {
    ROWS.iter().any(|row| row.contains(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qwerty_rows() {
        assert_eq!(rows().iter().map(|r| r.len()).sum::<usize>(), 26);
        assert!(contains('Q'));
        assert!(contains('M'));
        assert!(!contains('q'));
        assert!(!contains(' '));
    }
}
