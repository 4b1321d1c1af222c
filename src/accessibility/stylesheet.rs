//! Stylesheet scan for typography and color declarations.

use cssparser::{ParseError, Parser, ParserInput, Token};

type CssParseError<'i> = ParseError<'i, ()>;

/// Properties whose presence suggests the text can be restyled for
/// readability (dyslexia support, code 24).
const READABILITY_PROPERTIES: &[&str] = &[
    "font-family",
    "letter-spacing",
    "word-spacing",
    "line-height",
    "background-color",
    "color",
];

/// Returns `true` as soon as any declaration block sets one of the
/// readability properties.
pub fn declares_readability_properties(css: &str) -> bool {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    scan_recursive(&mut parser, false)
}

fn scan_recursive(parser: &mut Parser, in_block: bool) -> bool {
    let mut last_ident: Option<String> = None;

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => return false,
        };

        match token {
            Token::Ident(name) => last_ident = Some(name.to_ascii_lowercase()),
            Token::Colon => {
                if in_block
                    && let Some(name) = last_ident.take()
                    && READABILITY_PROPERTIES.contains(&name.as_str())
                {
                    return true;
                }
            }
            Token::CurlyBracketBlock => {
                let found = parser
                    .parse_nested_block(|p| Ok::<_, CssParseError>(scan_recursive(p, true)))
                    .unwrap_or(false);
                if found {
                    return true;
                }
                last_ident = None;
            }
            _ => last_ident = None,
        }
    }
}
