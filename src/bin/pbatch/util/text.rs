use ped_batch::bytes_to_mb;

/// Greedy word wrap; a single word longer than `width` gets its own line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shortens `s` to `max_len` characters, ending in `…` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    match max_len {
        0 => String::new(),
        _ if s.chars().count() <= max_len => s.to_string(),
        1 => "…".to_string(),
        _ => {
            let mut out: String = s.chars().take(max_len - 1).collect();
            out.push('…');
            out
        }
    }
}

/// Shortens a path from the left so the file-name end stays visible.
pub fn truncate_left(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }
    let tail: String = s.chars().skip(count - (max_len - 1)).collect();
    format!("…{tail}")
}

pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes_to_mb(bytes))
}

pub fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_words_together() {
        assert_eq!(wrap("catalog table not found", 14), ["catalog table", "not found"]);
    }

    #[test]
    fn wrap_empty_gives_one_blank_line() {
        assert_eq!(wrap("   ", 10), [""]);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("batch_651-700", 13), "batch_651-700");
        assert_eq!(truncate("batch_651-700_01", 8), "batch_6…");
        assert_eq!(truncate("Å-units", 1), "…");
    }

    #[test]
    fn truncate_left_keeps_the_tail() {
        assert_eq!(truncate_left("/data/cat2/completed_x", 12), "…completed_x");
        assert_eq!(truncate_left("/short", 12), "/short");
    }

    #[test]
    fn sizes_and_counts_read_naturally() {
        assert_eq!(format_mb(3 * 1024 * 1024 / 2), "1.50 MB");
        assert_eq!(plural(1, "file", "files"), "1 file");
        assert_eq!(plural(3, "file", "files"), "3 files");
    }
}
