use super::{ast::Constant, ast::Function, ParseError};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Num(f64),
    Func(Function),
    Const(Constant),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleStar,
    /// Postfix factorial.
    Bang,
    LParen,
    RParen,
}

impl Token {
    /// Tokens that may begin an operand; used to detect implicit multiplication.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            Token::Num(_) | Token::Func(_) | Token::Const(_) | Token::LParen
        )
    }
}

#[derive(Clone, Copy, Debug)]
enum Word {
    Func(Function),
    Const(Constant),
}

/// Every identifier the grammar knows. Longest names first for greedy splitting.
const WORDS: [(&str, Word); 10] = [
    ("factorial", Word::Func(Function::Factorial)),
    ("sqrt", Word::Func(Function::Sqrt)),
    ("sin", Word::Func(Function::Sin)),
    ("cos", Word::Func(Function::Cos)),
    ("tan", Word::Func(Function::Tan)),
    ("log", Word::Func(Function::Log)),
    ("abs", Word::Func(Function::Abs)),
    ("ln", Word::Func(Function::Ln)),
    ("pi", Word::Const(Constant::Pi)),
    ("e", Word::Const(Constant::E)),
];

/// Tokens paired with their char offset in the input.
pub fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            let (value, next) = read_number(&chars, i)?;
            out.push((start, Token::Num(value)));
            i = next;
            continue;
        }

        if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            split_word(&word, start, &mut out)?;
            continue;
        }

        let tok = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '!' => Token::Bang,
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push((i, Token::DoubleStar));
                i += 2;
                continue;
            }
            '*' => Token::Star,
            other => {
                return Err(ParseError::new(i, format!("unexpected character {other:?}")));
            }
        };
        out.push((i, tok));
        i += 1;
    }

    Ok(out)
}

/// `12`, `1.5`, `.5` and `5.`; a lone `.` or a second point is an error.
fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), ParseError> {
    let mut i = start;
    let mut seen_dot = false;
    let mut digits = 0usize;

    while i < chars.len() {
        match chars[i] {
            d if d.is_ascii_digit() => digits += 1,
            '.' if !seen_dot => seen_dot = true,
            '.' => return Err(ParseError::new(i, "second decimal point in number")),
            _ => break,
        }
        i += 1;
    }

    if digits == 0 {
        return Err(ParseError::new(start, "decimal point without digits"));
    }

    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|e| ParseError::new(start, format!("bad number {text:?}: {e}")))?;
    Ok((value, i))
}

/// Split a run of letters into known names (`pie` -> `pi`, `e`).
fn split_word(
    word: &str,
    offset: usize,
    out: &mut Vec<(usize, Token)>,
) -> Result<(), ParseError> {
    let mut rest = word;
    let mut pos = offset;

    while !rest.is_empty() {
        let Some((name, w)) = WORDS.iter().find(|(name, _)| rest.starts_with(name)) else {
            return Err(ParseError::new(pos, format!("unknown name {word:?}")));
        };
        let tok = match *w {
            Word::Func(f) => Token::Func(f),
            Word::Const(c) => Token::Const(c),
        };
        out.push((pos, tok));
        rest = &rest[name.len()..];
        pos += name.chars().count();
    }

    Ok(())
}
