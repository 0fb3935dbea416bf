//! Low-level scanning primitives for Stellaris gamestate text.
//!
//! The gamestate format is a nested `key = value` / `key = { ... }` dialect.
//! Documents can run to hundreds of megabytes, so nothing here builds a parse
//! tree: every operation is a single forward pass with an explicit depth
//! counter, returning slices into the original text.
//!
//! Brace matching is purely count-based and ignores string quoting. Braces
//! never appear unbalanced inside quoted strings in practice, and staying
//! quote-blind keeps the scan branch-free.

use regex::Regex;

/// Returns the content of a `key = { ... }` block whose key sits at the start
/// of a line, exclusive of the braces. Top-level scopes (`country`, `war`,
/// `species_db`, ...) are the only unindented keys in a gamestate, so the
/// line anchor doubles as a depth-zero check without scanning the prefix.
///
/// Returns `None` when the key is absent or its closing brace is never found.
pub fn extract_top_level_block<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!(r"(?m)^{}\s*=\s*\{{", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(text)?;
    balance_braces(text, m.end())
}

/// Like [`extract_top_level_block`] but the key may appear anywhere, used for
/// sub-fields inside an already-isolated entity block (`budget`, `members`,
/// `attackers`, ...). The first occurrence wins.
pub fn extract_inline_block<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!(r"{}\s*=\s*\{{", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(text)?;
    balance_braces(text, m.end())
}

/// Scan forward from `start` (the first byte after an opening brace) to the
/// matching close, returning the content between the braces.
fn balance_braces(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut pos = start;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..pos]);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Iterator over `<integer> = { ... }` entries at depth zero of a scope.
///
/// Yields `(id, block)` pairs in document order. Candidates that turn out
/// malformed (digits not followed by `= {`, or a block whose close is never
/// found) are skipped silently; they represent truncated or foreign entries,
/// not fatal structure errors.
pub struct IdBlocks<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

/// Enumerate the id-blocks of `scope`. The scope text is typically the
/// content of a top-level block such as `country` or `war`.
pub fn id_blocks(scope: &str) -> IdBlocks<'_> {
    IdBlocks {
        text: scope,
        pos: 0,
        depth: 0,
    }
}

impl<'a> Iterator for IdBlocks<'a> {
    type Item = (u32, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'{' => {
                    self.depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    self.pos += 1;
                }
                b'0'..=b'9' if self.depth == 0 => {
                    let id_start = self.pos;
                    while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                        self.pos += 1;
                    }
                    let id: u32 = match self.text[id_start..self.pos].parse() {
                        Ok(id) => id,
                        Err(_) => continue,
                    };

                    while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                        self.pos += 1;
                    }
                    if self.pos >= bytes.len() || bytes[self.pos] != b'=' {
                        continue;
                    }
                    self.pos += 1;

                    while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                        self.pos += 1;
                    }
                    if self.pos >= bytes.len() || bytes[self.pos] != b'{' {
                        continue;
                    }

                    let content_start = self.pos + 1;
                    let mut depth = 1usize;
                    self.pos += 1;
                    while self.pos < bytes.len() && depth > 0 {
                        match bytes[self.pos] {
                            b'{' => depth += 1,
                            b'}' => depth -= 1,
                            _ => {}
                        }
                        self.pos += 1;
                    }

                    if depth == 0 {
                        return Some((id, &self.text[content_start..self.pos - 1]));
                    }
                    // Close never found: nothing after this point can match.
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
        None
    }
}
