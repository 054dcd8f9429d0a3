//! The layout canonicalizer.
//!
//! A pre-lexing pass that turns raw source bytes into canonical text: UTF-8
//! with replacement characters for invalid sequences, no BOM, LF line
//! endings, tabs expanded at a fixed tab stop of 2, the `#` comment form
//! rewritten to `//`, and no trailing whitespace. The pass is idempotent
//! and preserves the line count, so spans computed downstream agree with
//! what the user sees.

use aster_common::diag::Diagnostics;
use aster_common::span::Span;

/// Tab stop for indentation expansion.
const TAB_STOP: u32 = 2;

/// Canonicalize raw source bytes.
///
/// Never fails: malformed UTF-8 yields an `E006` diagnostic per invalid
/// run and a best-effort replacement character.
pub fn canonicalize(bytes: &[u8], diags: &mut Diagnostics) -> String {
    let decoded = decode_utf8(bytes, diags);
    let text = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);
    let text = normalize_line_endings(text);

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    loop {
        let (line, remainder) = match rest.split_once('\n') {
            Some((line, remainder)) => (line, Some(remainder)),
            None => (rest, None),
        };
        canonicalize_line(line, &mut out);
        match remainder {
            Some(remainder) => {
                out.push('\n');
                rest = remainder;
            }
            None => break,
        }
    }
    out
}

/// Decode bytes, replacing each invalid run with U+FFFD and reporting it.
fn decode_utf8(bytes: &[u8], diags: &mut Diagnostics) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                // Safety of unwrap: split at valid_up_to is valid UTF-8.
                out.push_str(std::str::from_utf8(valid).unwrap());
                diags.emit("E006", position_of(&out), &[]);
                out.push('\u{fffd}');
                let skip = err.error_len().unwrap_or(after.len().max(1));
                rest = &after[skip.min(after.len())..];
                if rest.is_empty() {
                    return out;
                }
            }
        }
    }
}

/// The position just past the end of `text`, as a point span.
fn position_of(text: &str) -> Span {
    let line = text.matches('\n').count() as u32 + 1;
    let col = match text.rfind('\n') {
        Some(idx) => text[idx + 1..].chars().count() as u32 + 1,
        None => text.chars().count() as u32 + 1,
    };
    Span::point(line, col)
}

fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

/// Expand tabs, rewrite `#` comments to `//`, and strip trailing blanks.
fn canonicalize_line(line: &str, out: &mut String) {
    let expanded = expand_tabs(line);
    let rewritten = rewrite_comment(&expanded);
    out.push_str(rewritten.trim_end_matches(' '));
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col: u32 = 1;
    for c in line.chars() {
        if c == '\t' {
            let width = TAB_STOP - (col - 1) % TAB_STOP;
            for _ in 0..width {
                out.push(' ');
            }
            col += width;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

/// Rewrite the first `#` comment introducer outside a string to `//`.
/// Everything after a comment introducer is copied verbatim.
fn rewrite_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 1);
    let mut chars = line.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            '\\' if in_string => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '#' if !in_string => {
                out.push_str("//");
                out.extend(chars);
                return out;
            }
            '/' if !in_string && chars.peek() == Some(&'/') => {
                out.push(c);
                out.extend(chars);
                return out;
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(src: &str) -> String {
        let mut diags = Diagnostics::new();
        let out = canonicalize(src.as_bytes(), &mut diags);
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags.entries());
        out
    }

    #[test]
    fn strips_bom() {
        assert_eq!(canon("\u{feff}Module demo."), "Module demo.");
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(canon("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn expands_tabs_at_stop_2() {
        assert_eq!(canon("\tx"), "  x");
        assert_eq!(canon("a\tb"), "a b");
        assert_eq!(canon("ab\tc"), "ab  c");
        assert_eq!(canon("\t\tx"), "    x");
    }

    #[test]
    fn rewrites_hash_comments() {
        assert_eq!(canon("# note"), "// note");
        assert_eq!(canon("Return x. # done"), "Return x. // done");
        assert_eq!(canon("// already canonical"), "// already canonical");
    }

    #[test]
    fn hash_inside_string_is_preserved() {
        assert_eq!(canon(r##"Let x be "#1"."##), r##"Let x be "#1"."##);
    }

    #[test]
    fn hash_after_comment_start_is_untouched(){
        assert_eq!(canon("// keep # as is"), "// keep # as is");
        assert_eq!(canon("# one # two"), "// one # two");
    }

    #[test]
    fn strips_trailing_whitespace() {
        assert_eq!(canon("Return x.   \n  \nnext"), "Return x.\n\nnext");
    }

    #[test]
    fn preserves_line_count() {
        let src = "a\r\n\r\nb\rc\n";
        let out = canon(src);
        assert_eq!(out.matches('\n').count(), 4);
    }

    #[test]
    fn idempotent() {
        let cases = [
            "\u{feff}Module demo.\r\n\tRule x:\r\n\t\tReturn 1. # done\r\n",
            "plain text\n",
            "",
            "a\tb # c\n\"str # not comment\"\n",
            "deep\n\t\t\t\tnest\n",
        ];
        for src in cases {
            let once = canon(src);
            let twice = canon(&once);
            assert_eq!(once, twice, "canonicalizer not idempotent for {src:?}");
        }
    }

    #[test]
    fn invalid_utf8_replaced_with_diagnostic() {
        let mut diags = Diagnostics::new();
        let out = canonicalize(b"ab\xffcd", &mut diags);
        assert_eq!(out, "ab\u{fffd}cd");
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E006");
        assert_eq!(entries[0].span.start.col, 3);
    }

    #[test]
    fn empty_input() {
        assert_eq!(canon(""), "");
    }
}
