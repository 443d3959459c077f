//! Table-name extraction from SQL text (regex-based, not a parser).

use regex::Regex;
use std::sync::OnceLock;

use crate::dataset::TableSet;

/// Delimiters that may wrap an identifier: MySQL backticks, ANSI quotes, T-SQL brackets.
const DELIMITERS: &[char] = &['`', '"', '[', ']'];

fn table_regex() -> &'static Regex {
    static TABLE_RE: OnceLock<Regex> = OnceLock::new();
    TABLE_RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:FROM|JOIN)\s+([`"\[]?[\w.]+[`"\]]?)"#).expect("Invalid regex pattern")
    })
}

/// Extract the unique table names that follow a FROM or JOIN keyword.
///
/// Keywords match case-insensitively; the captured identifier keeps its own case.
/// Subqueries (`FROM (SELECT ...`) are skipped because `(` cannot start a name.
pub fn extract_tables(sql: &str) -> TableSet {
    table_regex()
        .captures_iter(sql)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim_matches(DELIMITERS))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> TableSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_from_and_join() {
        let sql = "SELECT T1.name FROM client AS T1 INNER JOIN disp AS T2 ON T1.client_id = T2.client_id";
        assert_eq!(extract_tables(sql), set(&["client", "disp"]));
    }

    #[test]
    fn test_extract_no_from_clause() {
        assert!(extract_tables("SELECT 1 + 1").is_empty());
        assert!(extract_tables("").is_empty());
        assert!(extract_tables("not sql at all").is_empty());
    }

    #[test]
    fn test_extract_keyword_case_insensitive() {
        let upper = extract_tables("SELECT * FROM account JOIN loan ON 1=1");
        let lower = extract_tables("select * from account join loan on 1=1");
        let mixed = extract_tables("Select * From account Join loan On 1=1");
        assert_eq!(upper, set(&["account", "loan"]));
        assert_eq!(upper, lower);
        assert_eq!(upper, mixed);
    }

    #[test]
    fn test_extract_strips_delimiters() {
        let backtick = extract_tables("SELECT * FROM `schools` JOIN `frpm` ON 1=1");
        let bracket = extract_tables("SELECT * FROM [schools] JOIN [frpm] ON 1=1");
        let quoted = extract_tables("SELECT * FROM \"schools\" JOIN \"frpm\" ON 1=1");
        assert_eq!(backtick, set(&["frpm", "schools"]));
        assert_eq!(backtick, bracket);
        assert_eq!(backtick, quoted);
    }

    #[test]
    fn test_extract_deduplicates() {
        let sql = "SELECT * FROM a JOIN b ON a.x = b.x JOIN a ON a.y = b.y";
        assert_eq!(extract_tables(sql), set(&["a", "b"]));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let sql = "SELECT COUNT(*) FROM `patient` WHERE id IN (SELECT id FROM laboratory)";
        assert_eq!(extract_tables(sql), extract_tables(sql));
        assert_eq!(extract_tables(sql), set(&["laboratory", "patient"]));
    }

    #[test]
    fn test_extract_skips_subquery_parenthesis() {
        let sql = "SELECT * FROM (SELECT id FROM races) AS r";
        assert_eq!(extract_tables(sql), set(&["races"]));
    }

    #[test]
    fn test_extract_keeps_qualified_names_and_case() {
        let sql = "SELECT * FROM main.Users JOIN Orders ON 1=1";
        assert_eq!(extract_tables(sql), set(&["Orders", "main.Users"]));
    }

    #[test]
    fn test_extract_keyword_must_be_a_word() {
        assert!(extract_tables("SELECT wherefrom_x FROMAGE").is_empty());
    }
}
