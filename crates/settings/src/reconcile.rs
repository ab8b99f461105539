//! Collection reconciliation
//!
//! Merges freshly parsed records with a canonical default set:
//!
//! 1. start empty
//! 2. seed with every default record
//! 3. append parsed records with no equivalent in the result
//! 4. update the equivalent result record in place for the rest
//! 5. enabled iff the result is non-empty
//! 6. stable sort by sort key
//!
//! Defaults are never dropped, user additions survive, and only the fields a
//! record type's update rule names are carried over onto matched defaults.
//! When several result records are equivalent to a parsed one, the first in
//! result order is updated; parsed duplicates therefore collapse onto one
//! entry with the last occurrence's values.

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<R> {
    pub items: Vec<R>,
    pub enabled: bool,
    /// Parsed records appended as new entries
    pub added: usize,
    /// Parsed records merged into an existing entry
    pub updated: usize,
}

pub fn reconcile<R, K>(
    parsed: Vec<R>,
    defaults: Option<&dyn Fn() -> Vec<R>>,
    is_equivalent: impl Fn(&R, &R) -> bool,
    update: impl Fn(&mut R, &R),
    sort_key: impl Fn(&R) -> K,
) -> Reconciled<R>
where
    K: Ord,
{
    let mut items: Vec<R> = defaults.map(|provider| provider()).unwrap_or_default();
    let mut added = 0;
    let mut updated = 0;

    for record in parsed {
        match items.iter().position(|existing| is_equivalent(existing, &record)) {
            Some(position) => {
                update(&mut items[position], &record);
                updated += 1;
            }
            None => {
                items.push(record);
                added += 1;
            }
        }
    }

    let enabled = !items.is_empty();
    items.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    Reconciled {
        items,
        enabled,
        added,
        updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        level: i32,
        note: &'static str,
    }

    fn item(name: &'static str, level: i32, note: &'static str) -> Item {
        Item { name, level, note }
    }

    fn run(parsed: Vec<Item>, defaults: Vec<Item>) -> Reconciled<Item> {
        let provider = move || defaults.clone();
        reconcile(
            parsed,
            Some(&provider),
            |a, b| a.name == b.name,
            // Only the level is carried over; notes stay with the default.
            |existing, parsed| existing.level = parsed.level,
            |r| r.name,
        )
    }

    #[test]
    fn test_defaults_are_preserved() {
        let result = run(
            vec![item("A", 5, "parsed")],
            vec![item("A", 1, "default"), item("B", 2, "default")],
        );
        assert_eq!(
            result.items,
            vec![item("A", 5, "default"), item("B", 2, "default")]
        );
        assert!(result.enabled);
        assert_eq!((result.added, result.updated), (0, 1));
    }

    #[test]
    fn test_custom_entries_survive() {
        let result = run(
            vec![item("C", 3, "custom"), item("A", 1, "parsed")],
            vec![item("A", 1, "default")],
        );
        assert_eq!(
            result.items,
            vec![item("A", 1, "default"), item("C", 3, "custom")]
        );
        assert_eq!((result.added, result.updated), (1, 1));
    }

    #[test]
    fn test_empty_disables() {
        let result = run(vec![], vec![]);
        assert!(result.items.is_empty());
        assert!(!result.enabled);
    }

    #[test]
    fn test_without_provider() {
        let result = reconcile(
            vec![item("B", 1, ""), item("A", 2, "")],
            None,
            |a: &Item, b: &Item| a.name == b.name,
            |existing, parsed| existing.level = parsed.level,
            |r| r.name,
        );
        assert_eq!(result.items, vec![item("A", 2, ""), item("B", 1, "")]);
        assert!(result.enabled);
    }

    #[test]
    fn test_parsed_duplicates_collapse_last_wins() {
        let result = run(vec![item("X", 1, "first"), item("X", 9, "second")], vec![]);
        assert_eq!(result.items, vec![item("X", 9, "first")]);
    }

    #[test]
    fn test_sort_is_stable() {
        let result = reconcile(
            vec![item("b", 1, "1"), item("a", 1, "2"), item("c", 0, "3")],
            None,
            |a: &Item, b: &Item| a.name == b.name,
            |_, _| {},
            |r| r.level,
        );
        let notes: Vec<&str> = result.items.iter().map(|r| r.note).collect();
        assert_eq!(notes, vec!["3", "1", "2"]);
    }
}
