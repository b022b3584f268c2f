/// Shorten upstream bodies before they reach the logs.
pub fn truncate(s: &str) -> String {
    const MAX: usize = 512;
    if s.len() > MAX {
        let end = s
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX)
            .last()
            .unwrap_or(0);
        format!("{}… ({} bytes)", &s[..end], s.len())
    } else {
        s.to_string()
    }
}
