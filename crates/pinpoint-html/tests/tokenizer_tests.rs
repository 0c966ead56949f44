//! Tests for the HTML tokenizer.

use pinpoint_html::{HTMLTokenizer, Token, TokenizerState};

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(html);
    tokenizer.run();
    tokenizer.into_tokens()
}

#[test]
fn test_state_names_display_as_variants() {
    assert_eq!(TokenizerState::Data.to_string(), "Data");
    assert_eq!(
        TokenizerState::AttributeValueDoubleQuoted.to_string(),
        "AttributeValueDoubleQuoted"
    );
}

#[test]
fn test_text_end_tag_and_comment() {
    let tokens = tokenize("<P>a &amp; b</P><!--note-->");
    assert!(matches!(&tokens[0], Token::StartTag { name, self_closing: false, .. } if name == "p"));
    assert_eq!(
        tokens[1..],
        [
            Token::Text {
                data: "a & b".to_string()
            },
            Token::EndTag {
                name: "p".to_string()
            },
            Token::Comment {
                data: "note".to_string()
            },
            Token::EndOfFile,
        ]
    );
}
