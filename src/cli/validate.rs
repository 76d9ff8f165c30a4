//! Deck validation command implementation.

use std::fmt::Write;
use std::path::Path;

use wayfarer::game::Capacity;
use wayfarer::{PathDeck, SiteKind};

use super::{CliError, load_items, load_path};

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error, with the dealer's exit code, if either deck is invalid.
pub(crate) fn execute(path: &Path, items: Option<&Path>) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let deck = match load_path(path) {
        Ok(deck) => {
            print_check("Path deck", true);
            deck
        }
        Err(e) => {
            print_check("Path deck", false);
            return Err(CliError::with_code(format!("{e}: {}", cause(&e)), e.exit_code()));
        }
    };

    if let Some(items) = items {
        match load_items(items) {
            Ok(deck) => print_check(&format!("Item deck ({} items)", deck.len()), true),
            Err(e) => {
                print_check("Item deck", false);
                return Err(CliError::with_code(format!("{e}: {}", cause(&e)), e.exit_code()));
            }
        }
    }

    println!();
    print!("{}", summarize(&deck));
    println!();
    println!("Validation successful!");

    Ok(())
}

fn cause(e: &dyn std::error::Error) -> String {
    e.source().map_or_else(String::new, ToString::to_string)
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}

/// Site counts per kind, the barrier segments and the canonical form.
fn summarize(deck: &PathDeck) -> String {
    let mut output = String::from("Summary:\n");
    let _ = writeln!(output, "  Sites:     {}", deck.len());
    for kind in SiteKind::ALL {
        let count = deck.sites().iter().filter(|site| site.kind == kind).count();
        if count > 0 {
            let label = format!("{}:", kind.tag());
            let _ = writeln!(output, "  {label:<10} {count}");
        }
    }
    // Both ends are barriers, so there is always at least one segment
    let segments = deck.sites().iter().filter(|site| site.is_barrier()).count() - 1;
    let _ = writeln!(output, "  Segments:  {segments}");
    let tightest = deck
        .sites()
        .iter()
        .filter_map(|site| match site.capacity {
            Capacity::Limited(n) => Some(n),
            Capacity::Unbounded => None,
        })
        .min();
    if let Some(n) = tightest {
        let _ = writeln!(output, "  Smallest capacity: {n}");
    }
    let _ = writeln!(output, "  Canonical: {deck}");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let deck = PathDeck::parse("7;::-Mo1V22::-Do2Ri3::-").unwrap();
        let text = summarize(&deck);
        assert!(text.contains("Sites:     7"));
        assert!(text.contains("Segments:  2"));
        assert!(text.contains("Smallest capacity: 1"));
        assert!(text.contains("Canonical: 7;::-Mo1V22::-"));
    }

    #[test]
    fn test_missing_path_file_exits_3() {
        let err = execute(Path::new("/nonexistent/path.deck"), None).unwrap_err();
        assert_eq!(err.code(), 3);
    }
}
