//! Tokenizer for HDL source text.
//!
//! A deliberately small lexer: it strips line comments, splits on
//! whitespace, then splits again at structural delimiter characters.
//! There is no grammar here; the unit-builder state machine supplies all
//! structure. Two modes cover every consumer:
//!
//! - **display**: case preserved, terminators kept, used to reconstruct
//!   port/generic declaration text exactly as written.
//! - **structural**: case folded, terminators stripped, used to drive
//!   the state machine, where `Entity` and `entity` are the same word.
//!
//! Tokenizing is pure: identical input and options always produce the
//! identical sequence, and nothing is shared between invocations.

use smol_str::SmolStr;

/// Delimiters used when reconstructing declaration text.
pub const DISPLAY_DELIMITERS: &[char] = &['(', ')', ':', ';', ','];

/// Delimiters used when driving the unit-builder state machine.
pub const STRUCTURAL_DELIMITERS: &[char] = &['(', ')', ':', ';'];

/// A lexical atom: either a word or a single structural delimiter.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    text: SmolStr,
}

impl Token {
    fn new(text: &str) -> Self {
        Self {
            text: SmolStr::new(text),
        }
    }

    /// The raw token text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this token is a single structural delimiter.
    pub fn is_delimiter(&self) -> bool {
        matches!(self.text.as_str(), "(" | ")" | ":" | ";" | ",")
    }

    /// Case-insensitive comparison against a keyword or name.
    pub fn matches(&self, word: &str) -> bool {
        self.text.eq_ignore_ascii_case(word)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({})", self.text)
    }
}

/// Options controlling a [`tokenize`] pass.
#[derive(Clone, Copy, Debug)]
pub struct TokenizeOptions<'a> {
    /// Lower-case word tokens (delimiters are unaffected).
    pub fold_case: bool,
    /// When false, `;` is dropped entirely and `(`/`)` characters are
    /// stripped from word tokens. A `:` split point survives either way.
    pub keep_terminators: bool,
    /// Characters that split words and become their own tokens.
    pub delimiters: &'a [char],
}

impl TokenizeOptions<'static> {
    /// Case preserved, terminators kept: declaration-text reconstruction.
    pub fn display() -> Self {
        Self {
            fold_case: false,
            keep_terminators: true,
            delimiters: DISPLAY_DELIMITERS,
        }
    }

    /// Case folded, terminators stripped: state-machine driving.
    pub fn structural() -> Self {
        Self {
            fold_case: true,
            keep_terminators: false,
            delimiters: STRUCTURAL_DELIMITERS,
        }
    }
}

/// Split source text into a token sequence.
///
/// Line comments (`--` to end of line) are stripped first; a comment at
/// column 0 discards the whole line. Consecutive delimiter characters
/// each become their own token.
pub fn tokenize(text: &str, options: TokenizeOptions<'_>) -> Vec<Token> {
    let mut tokens = Vec::new();

    for line in text.lines() {
        let line = match line.find("--") {
            Some(start) => &line[..start],
            None => line,
        };

        for word in line.split_whitespace() {
            let mut word = if options.fold_case {
                word.to_ascii_lowercase()
            } else {
                word.to_owned()
            };
            if !options.keep_terminators {
                word.retain(|c| c != ';');
            }
            chop(&word, &options, &mut tokens);
        }
    }

    tokens
}

/// Split one whitespace-delimited word at delimiter characters, pushing
/// each fragment and delimiter as its own token.
fn chop(word: &str, options: &TokenizeOptions<'_>, tokens: &mut Vec<Token>) {
    let mut rest = word;
    while let Some(at) = rest.find(options.delimiters) {
        let (head, tail) = rest.split_at(at);
        if !head.is_empty() {
            push_word(head, options, tokens);
        }
        let (delim, tail) = tail.split_at(1);
        push_delimiter(delim, options, tokens);
        rest = tail;
    }
    if !rest.is_empty() {
        push_word(rest, options, tokens);
    }
}

fn push_word(text: &str, options: &TokenizeOptions<'_>, tokens: &mut Vec<Token>) {
    if options.keep_terminators {
        tokens.push(Token::new(text));
        return;
    }
    // Parens may be embedded when '(' or ')' is not in the delimiter set.
    let stripped: String = text.chars().filter(|&c| c != '(' && c != ')').collect();
    if !stripped.is_empty() {
        tokens.push(Token::new(&stripped));
    }
}

fn push_delimiter(delim: &str, options: &TokenizeOptions<'_>, tokens: &mut Vec<Token>) {
    if !options.keep_terminators && matches!(delim, "(" | ")" | ";") {
        return;
    }
    tokens.push(Token::new(delim));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::text).collect()
    }

    #[test]
    fn test_display_mode_keeps_everything() {
        let tokens = tokenize("Port( clk : in STD_LOGIC;", TokenizeOptions::display());
        assert_eq!(
            texts(&tokens),
            vec!["Port", "(", "clk", ":", "in", "STD_LOGIC", ";"]
        );
    }

    #[test]
    fn test_structural_mode_folds_and_strips() {
        let tokens = tokenize("Port( clk : in STD_LOGIC;", TokenizeOptions::structural());
        assert_eq!(texts(&tokens), vec!["port", "clk", ":", "in", "std_logic"]);
    }

    #[test]
    fn test_comment_at_column_zero_drops_line() {
        let tokens = tokenize("-- entity ghost is\nentity real is", TokenizeOptions::structural());
        assert_eq!(texts(&tokens), vec!["entity", "real", "is"]);
    }

    #[test]
    fn test_comment_mid_line_truncates() {
        let tokens = tokenize("entity adder is -- ripple carry", TokenizeOptions::structural());
        assert_eq!(texts(&tokens), vec!["entity", "adder", "is"]);
    }

    #[test]
    fn test_consecutive_delimiters_are_separate_tokens() {
        let tokens = tokenize("f(());", TokenizeOptions::display());
        assert_eq!(texts(&tokens), vec!["f", "(", "(", ")", ")", ";"]);
    }

    #[test]
    fn test_colon_survives_terminator_stripping() {
        let tokens = tokenize("u0:work.gates.and_gate;", TokenizeOptions::structural());
        assert_eq!(texts(&tokens), vec!["u0", ":", "work.gates.and_gate"]);
    }

    #[test]
    fn test_tokenize_is_pure() {
        let src = "entity A is\n  Port( x : in bit );\nend A;";
        let a = tokenize(src, TokenizeOptions::display());
        let b = tokenize(src, TokenizeOptions::display());
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_bounded_by_input() {
        let src = "a(b)c:d;e,f g h";
        let tokens = tokenize(src, TokenizeOptions::display());
        assert!(tokens.len() <= src.len());
    }
}
