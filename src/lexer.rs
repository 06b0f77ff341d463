//! Tokenizer for the raw `options` string passed straight through to an NCO tool.
//!
//! Words are split on unquoted whitespace. Single quotes keep their content as-is,
//! double quotes keep their content but honour `\"` and `\\`, and a backslash
//! outside quotes escapes the next character. Adjacent quoted and unquoted pieces
//! join into one word, so `-d 'lon,0, 4'x` is two tokens: `-d` and `lon,0, 4x`.

use thiserror::Error;

/// Errors that can occur while splitting a raw options string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("unterminated quote")]
    UnfinishedQuote,
    /// The input ended right after a backslash.
    #[error("trailing backslash")]
    DanglingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    // A word may be empty (`''`), so the buffer alone can't tell us one is open.
    in_word: bool,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            in_word: false,
        }
    }

    /// Runs the machine over the whole input and returns the words found.
    fn make_tokens(&mut self) -> Result<Vec<String>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start | LexingState::ReadingWord => {
                    self.handle_unquoted(ch, &mut out)?
                }
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexingError::UnfinishedQuote);
            }
            _ => {}
        }

        self.finish_word(&mut out);
        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_unquoted(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexingError> {
        match ch {
            c if c.is_whitespace() => {
                self.finish_word(out);
                self.state = LexingState::Start;
            }
            '\'' => {
                self.in_word = true;
                self.state = LexingState::ReadingSingleQuote;
            }
            '"' => {
                self.in_word = true;
                self.state = LexingState::ReadingDoubleQuote;
            }
            '\\' => {
                let escaped = self.read_char().ok_or(LexingError::DanglingEscape)?;
                self.push(escaped);
            }
            c => self.push(c),
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.read_char() {
                Some(c @ ('"' | '\\')) => self.buffer.push(c),
                Some(c) => {
                    self.buffer.push('\\');
                    self.buffer.push(c);
                }
                None => return Err(LexingError::UnfinishedQuote),
            },
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn push(&mut self, ch: char) {
        self.buffer.push(ch);
        self.in_word = true;
        self.state = LexingState::ReadingWord;
    }

    fn finish_word(&mut self, out: &mut Vec<String>) {
        if self.in_word {
            out.push(std::mem::take(&mut self.buffer));
            self.in_word = false;
        }
    }
}

/// Splits a raw options string into argument tokens.
///
/// An empty or all-whitespace string yields no tokens.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, LexingError> {
    LexingFSM::new(line).make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        split_into_tokens(line).unwrap()
    }

    #[test]
    fn test_whitespace_split() {
        assert_eq!(split("-7 -L 1"), vec!["-7", "-L", "1"]);
        assert_eq!(split("  -D\t2   -M "), vec!["-D", "2", "-M"]);
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn test_repeated_hyperslabs() {
        assert_eq!(
            split("-d lon,10.,20. -d lon,80.,90."),
            vec!["-d", "lon,10.,20.", "-d", "lon,80.,90."]
        );
    }

    #[test]
    fn test_quoted_groups_are_kept_together() {
        assert_eq!(
            split("-G : --ppc 'default=3 T=5' -v \"a b\""),
            vec!["-G", ":", "--ppc", "default=3 T=5", "-v", "a b"]
        );
    }

    #[test]
    fn test_adjacent_pieces_join() {
        assert_eq!(split("--dbg_lvl='3'"), vec!["--dbg_lvl=3"]);
        assert_eq!(split("a'b c'd"), vec!["ab cd"]);
    }

    #[test]
    fn test_empty_quotes_make_empty_token() {
        assert_eq!(split("-v ''"), vec!["-v", ""]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(split(r"a\ b"), vec!["a b"]);
        assert_eq!(split(r#""say \"hi\"""#), vec![r#"say "hi""#]);
        assert_eq!(split(r#""c:\dir""#), vec![r"c:\dir"]);
        assert_eq!(split(r"'no\escape'"), vec![r"no\escape"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            split_into_tokens("-d 'lon,0,4"),
            Err(LexingError::UnfinishedQuote)
        );
        assert_eq!(split_into_tokens("\"abc"), Err(LexingError::UnfinishedQuote));
        assert_eq!(split_into_tokens("abc\\"), Err(LexingError::DanglingEscape));
    }
}
