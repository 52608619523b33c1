use crate::PAGE_SIZE;

/// Filters `collection` by free-text `query` and `custom_filter`, then cuts out page `page`
/// (1-based). Returns the number of matching rows along with the page.
pub fn search<'a, T, F>(
    collection: impl IntoIterator<Item = &'a T>,
    property: F,
    page: usize,
    query: Option<&str>,
    custom_filter: impl Fn(&T) -> bool,
) -> (usize, Vec<&'a T>)
where
    T: 'a,
    F: Fn(&T) -> String,
{
    let mut filter = contains_query(query, property);
    let mut total = 0;
    let mut skipped = 0;
    let mut results: Vec<&T> = Vec::new();
    let to_skip = (page.max(1) - 1).saturating_mul(PAGE_SIZE);

    for row in collection {
        if !filter(&row) || !custom_filter(row) {
            continue;
        }

        total += 1;

        if skipped < to_skip {
            skipped += 1;
        } else if results.len() < PAGE_SIZE {
            results.push(row);
        }
    }

    (total, results)
}

/// Returns a function to be used as a filter that checks if the provided query is contained in the
/// object string, ignoring case and accents.
fn contains_query<T, F>(query: Option<&str>, property: F) -> impl FnMut(&&T) -> bool
where
    F: Fn(&T) -> String,
{
    let query = query
        .map(|d| truncate(d, 50))
        .map(normalize)
        .filter(|q| !q.is_empty());

    move |object: &&T| {
        if let Some(query) = &query {
            let name = property(object);
            normalize(&name).contains(query.as_str())
        } else {
            true
        }
    }
}

pub fn normalize(s: &str) -> String {
    unidecode::unidecode(s.trim()).to_ascii_lowercase()
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((idx, _)) => &s[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("Aula {}", i)).collect()
    }

    #[test]
    fn pages_hold_ten_rows() {
        let rows = names(23);

        let (total, first) = search(&rows, |s: &String| s.clone(), 1, None, |_| true);
        assert_eq!(total, 23);
        assert_eq!(first.len(), PAGE_SIZE);
        assert_eq!(first[0], "Aula 0");

        let (_, last) = search(&rows, |s: &String| s.clone(), 3, None, |_| true);
        assert_eq!(last.len(), 3);
        assert_eq!(last[0], "Aula 20");

        let (total, past_end) = search(&rows, |s: &String| s.clone(), 4, None, |_| true);
        assert_eq!(total, 23);
        assert!(past_end.is_empty());
    }

    #[test]
    fn page_zero_is_first_page() {
        let rows = names(3);
        let (_, page) = search(&rows, |s: &String| s.clone(), 0, None, |_| true);
        assert_eq!(page.len(), 3);
    }

    #[test]
    fn huge_page_is_empty() {
        let rows = names(23);
        let (total, page) = search(&rows, |s: &String| s.clone(), usize::MAX, None, |_| true);
        assert_eq!(total, 23);
        assert!(page.is_empty());
    }

    #[test]
    fn query_ignores_accents_and_case() {
        let rows = vec![
            "Análisis Matemático I".to_string(),
            "Física I".to_string(),
            "ANALISIS NUMERICO".to_string(),
        ];

        let query = Some("  analisis ");
        let (total, found) = search(&rows, |s: &String| s.clone(), 1, query, |_| true);
        assert_eq!(total, 2);
        assert_eq!(found[0], "Análisis Matemático I");
        assert_eq!(found[1], "ANALISIS NUMERICO");
    }

    #[test]
    fn custom_filter_applies_with_query() {
        let rows = names(15);
        let (total, _) = search(
            &rows,
            |s: &String| s.clone(),
            1,
            Some("aula 1"),
            |s: &String| s.len() > 6,
        );
        // "Aula 10" to "Aula 14"
        assert_eq!(total, 5);
    }

    #[test]
    fn blank_query_matches_everything() {
        let rows = names(4);
        let (total, _) = search(&rows, |s: &String| s.clone(), 1, Some("   "), |_| true);
        assert_eq!(total, 4);
    }
}
