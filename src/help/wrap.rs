//! Line wrapping for help text

/// Wrap `text` into lines of at most `width` characters.
///
/// Lines break after the last break character at or before the limit. A space
/// at the break point is dropped; any other break character stays at the end
/// of the line. Words are only split when a line holds no break character.
/// Embedded newlines are kept.
pub fn wrap(text: &str, width: usize, break_chars: &str) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut rest: Vec<char> = paragraph.chars().collect();
        while rest.len() > width {
            // (line length, chars consumed) for the rightmost usable break
            let cut = (0..=width).rev().find_map(|i| {
                let c = rest[i];
                if !break_chars.contains(c) {
                    None
                } else if c.is_whitespace() {
                    (i > 0).then_some((i, i + 1))
                } else {
                    (i < width).then_some((i + 1, i + 1))
                }
            });
            let (line, skip) = cut.unwrap_or((width, width));

            let head: String = rest[..line].iter().collect();
            lines.push(head.trim_end().to_string());
            rest.drain(..skip);
            while rest.first().is_some_and(|c| *c == ' ') {
                rest.remove(0);
            }
        }
        lines.push(rest.into_iter().collect());
    }

    lines
}
