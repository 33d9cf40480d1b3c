//! Filename sanitization so a server-chosen name stays inside the target directory.

const NAME_MAX: usize = 255;

/// Makes `name` safe to join onto a directory.
///
/// - `/`, `\`, NUL and control characters become `_`
/// - leading dots and surrounding whitespace are stripped (no `..`, no hidden files)
/// - trailing dots are stripped
/// - truncated to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced
        .trim()
        .trim_start_matches('.')
        .trim_end_matches('.')
        .trim();

    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
