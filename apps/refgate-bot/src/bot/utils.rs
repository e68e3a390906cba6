/// Telegram's limit for a single text message.
pub const MESSAGE_LIMIT: usize = 4096;

/// Packs lines into messages of at most `limit` characters, splitting only at line
/// boundaries unless a single line is itself too long.
pub fn chunk_lines<I, S>(lines: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in lines {
        let line = line.as_ref();
        let line_len = line.chars().count();

        if line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            chunks.extend(chars.chunks(limit).map(|piece| piece.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_output_in_one_message() {
        assert_eq!(chunk_lines(["a", "b", "c"], 10), vec!["a\nb\nc"]);
        assert!(chunk_lines(Vec::<String>::new(), 10).is_empty());
    }

    #[test]
    fn splits_at_line_boundaries() {
        let chunks = chunk_lines(["aaaa", "bbbb", "cccc"], 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn hard_splits_oversized_lines() {
        let chunks = chunk_lines(["ab", "cdefghij", "k"], 4);
        assert_eq!(chunks, vec!["ab", "cdef", "ghij", "k"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = chunk_lines(["🏆🏆", "🏆🏆"], 5);
        assert_eq!(chunks, vec!["🏆🏆\n🏆🏆"]);
    }
}
