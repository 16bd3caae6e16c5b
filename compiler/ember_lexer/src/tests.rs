#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("let x = fn function of"),
        vec![
            TokenKind::Let,
            TokenKind::Ident("x".into()),
            TokenKind::Eq,
            TokenKind::Fn,
            TokenKind::Fn,
            TokenKind::Ident("of".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn numbers_with_fraction_and_exponent() {
    assert_eq!(
        kinds("3 3.25 .5 1e3 2E-2 0xff"),
        vec![
            TokenKind::Number(3.0),
            TokenKind::Number(3.25),
            TokenKind::Number(0.5),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.02),
            TokenKind::Number(255.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn member_access_on_integer_is_not_a_fraction() {
    assert_eq!(
        kinds("1.x"),
        vec![
            TokenKind::Number(1.0),
            TokenKind::Dot,
            TokenKind::Ident("x".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_escapes() {
    assert_eq!(
        kinds(r#""a\n\"b\"" 'it\'s' "\u{1F600}é""#),
        vec![
            TokenKind::Str("a\n\"b\"".into()),
            TokenKind::Str("it's".into()),
            TokenKind::Str("\u{1F600}\u{e9}".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn multi_char_operators() {
    assert_eq!(
        kinds("== === != <= >= && || ... += ++ %="),
        vec![
            TokenKind::EqEq,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::Ellipsis,
            TokenKind::PlusEq,
            TokenKind::PlusPlus,
            TokenKind::PercentEq,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_skipped_and_newlines_recorded() {
    let tokens = lex("a // one\n/* two\n */ b /* inline */ c").unwrap();
    let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
    assert_eq!(flags, vec![false, true, false, false]);
}

#[test]
fn spans_cover_token_text() {
    let tokens = lex("let total").unwrap();
    assert_eq!(tokens[1].span, Span::new(4, 9));
}

#[test]
fn unterminated_string_is_an_error() {
    let err = lex("\"abc").unwrap_err();
    assert_eq!(err.message, "unterminated string literal");
    assert_eq!(err.span.start, 0);
}

#[test]
fn unterminated_comment_is_an_error() {
    assert!(lex("/* never closed").is_err());
}

#[test]
fn unexpected_character_is_reported() {
    let err = lex("a # b").unwrap_err();
    assert_eq!(err.message, "unexpected character `#`");
    assert_eq!(err.span, Span::new(2, 3));
}

proptest! {
    #[test]
    fn lexing_never_panics(src in "\\PC{0,64}") {
        let _ = lex(&src);
    }

    #[test]
    fn integers_lex_to_their_value(n in 0u32..1_000_000) {
        prop_assert_eq!(
            kinds(&n.to_string()),
            vec![TokenKind::Number(f64::from(n)), TokenKind::Eof]
        );
    }
}
