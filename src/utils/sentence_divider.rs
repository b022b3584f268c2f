/// Characters that close an English sentence.
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Only a period is searched for when picking a cut point.
pub const SPLIT_DELIMITER: char = '.';

pub fn is_sentence_terminator(c: char) -> bool {
    SENTENCE_TERMINATORS.contains(&c)
}

/// Position (in characters) of the last period in `window`, if any.
pub fn last_split_point(window: &[char]) -> Option<usize> {
    window.iter().rposition(|&c| c == SPLIT_DELIMITER)
}
