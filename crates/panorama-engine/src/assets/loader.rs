use std::fmt;
use std::io::{self, BufRead};

/// Source of named text resources (shader files and the like).
///
/// Implementations log their own read failures and return `None`; callers
/// treat a missing resource as empty input.
pub trait AssetLoader: fmt::Debug {
    fn load_text(&self, name: &str) -> Option<String>;
}

/// Reads all of `reader`, normalizing line endings so every line ends in `\n`.
pub fn read_text<R: BufRead>(reader: R) -> io::Result<String> {
    let mut text = String::new();
    for line in reader.lines() {
        text.push_str(&line?);
        text.push('\n');
    }
    Ok(text)
}
