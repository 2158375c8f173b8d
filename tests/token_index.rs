//! Token lookups against whole documents, as hover and completion perform them.

use indoc::indoc;
use tower_lsp::lsp_types::Position;

use zenscript_language_server::lsp::document::DocumentSnapshot;
use zenscript_language_server::lsp::token_index;
use zenscript_language_server::parsers::zenscript::{TokenKind, tokenize};

const SCRIPT: &str = indoc! {r#"
    #loader crafttweaker
    import crafttweaker.item.IItemStack;

    /* furnace */
    furnace.remove(<item:minecraft:cooked_beef>);
    val sword as IItemStack = <item:minecraft:iron_sword>.withTag({display: {Name: "Blade"}});
"#};

#[test]
fn test_code_and_comments_tile_the_document() {
    let lexed = tokenize(SCRIPT);
    let mut covered = vec![false; SCRIPT.len()];
    for token in lexed.tokens.iter().chain(lexed.comments.iter()) {
        assert_eq!(&SCRIPT[token.start_offset..=token.end_offset], token.text);
        for flag in &mut covered[token.start_offset..=token.end_offset] {
            assert!(!*flag, "overlap at {}", token.start_offset);
            *flag = true;
        }
    }
    for (offset, byte) in SCRIPT.bytes().enumerate() {
        assert_eq!(covered[offset], !byte.is_ascii_whitespace(), "offset {offset}");
    }
}

#[test]
fn test_every_code_offset_finds_its_token() {
    let lexed = tokenize(SCRIPT);
    for (index, token) in lexed.tokens.iter().enumerate() {
        for offset in token.start_offset..=token.end_offset {
            let lookup = token_index::find(&lexed.tokens, offset).unwrap();
            assert!(lookup.exists);
            assert_eq!(lookup.position, index);
        }
    }
}

#[test]
fn test_comment_offsets_miss_code_tokens() {
    let snapshot = DocumentSnapshot::build(SCRIPT.to_string(), 1);
    let inside_comment = SCRIPT.find("furnace */").unwrap();
    assert!(snapshot.token_at(inside_comment).is_none());
    assert_eq!(
        snapshot.comment_at(inside_comment).map(|t| t.kind),
        Some(TokenKind::BlockComment)
    );

    let directive = snapshot.comment_at(0).unwrap();
    assert_eq!(directive.kind, TokenKind::HashComment);
    assert_eq!(directive.text, "#loader crafttweaker");
}

#[test]
fn test_positions_resolve_to_tokens() {
    let snapshot = DocumentSnapshot::build(SCRIPT.to_string(), 1);

    // `remove` on line 4
    let offset = snapshot.offset_at(&Position::new(4, 10));
    let token = snapshot.token_at(offset).unwrap();
    assert_eq!(token.text, "remove");
    assert_eq!(snapshot.position_at(token.start_offset), Position::new(4, 8));

    // The gap after `val` falls back to `val` itself.
    let gap = snapshot.offset_at(&Position::new(5, 3));
    let lookup = snapshot.lookup(gap).unwrap();
    assert!(!lookup.exists);
    assert_eq!(lookup.token.text, "val");
}
