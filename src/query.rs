//! Interactive query loop over the populated index.

use std::borrow::Cow;
use std::io::{self, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::index::{Article, TokenIndex};

/// Most postings shown for one query.
pub const MAX_MATCHES_SHOWN: usize = 15;

/// Display widths beyond which titles and URLs are shortened.
const TITLE_WIDTH: usize = 60;
const URL_WIDTH: usize = 72;

/// Prompt for tokens until a blank line (or EOF) and print the ranked
/// articles mentioning each one.
pub fn run(index: &TokenIndex) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "Enter a search token (blank line quits): ")?;
        stdout.flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        let matches = index.matching(query);
        if matches.is_empty() {
            writeln!(stdout, "No articles mention \"{query}\".")?;
            continue;
        }
        let verb = if matches.len() == 1 {
            "article mentions"
        } else {
            "articles mention"
        };
        writeln!(stdout, "{} {verb} \"{query}\":", matches.len())?;
        for (rank, (article, count)) in matches.iter().take(MAX_MATCHES_SHOWN).enumerate() {
            writeln!(stdout, "{}", render_match(rank + 1, article, *count))?;
        }
    }
    Ok(())
}

fn render_match(rank: usize, article: &Article, count: usize) -> String {
    let times = if count == 1 { "time" } else { "times" };
    format!(
        "{rank:>3}. {} [appears {count} {times}]\n     {}",
        shorten(&article.title, TITLE_WIDTH),
        shorten(&article.url, URL_WIDTH),
    )
}

/// Width-aware `...` truncation for terminal display. The index itself never
/// shortens anything.
fn shorten(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    let budget = max_width.saturating_sub(3);
    let mut taken = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let width = UnicodeWidthChar::width(c).unwrap_or(0);
        if taken + width > budget {
            break;
        }
        taken += width;
        end = idx + c.len_utf8();
    }
    Cow::Owned(format!("{}...", &s[..end]))
}
