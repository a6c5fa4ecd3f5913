//! Deriving the list of runnable test methods from an artifact's symbol
//! table.

use crate::errors::MissingSymbolTableError;
use forcetest_metadata::SymbolTable;

/// Extracts the names of the test methods in `table`, in table order.
///
/// A missing table is a terminal failure for the run, observably distinct
/// from a present table that simply contains no test methods (which yields
/// `Ok` with an empty list; the server decides what an empty submission
/// means).
pub fn test_methods(
    table: Option<&SymbolTable>,
    artifact_name: &str,
) -> Result<Vec<String>, MissingSymbolTableError> {
    let table = table.ok_or_else(|| MissingSymbolTableError::new(artifact_name))?;
    Ok(table
        .methods
        .iter()
        .filter(|method| method.is_test())
        .map(|method| method.name.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forcetest_metadata::{MethodAnnotation, SymbolMethod};

    fn method(name: &str, annotations: &[&str]) -> SymbolMethod {
        SymbolMethod {
            name: name.to_owned(),
            annotations: annotations.iter().copied().map(MethodAnnotation::new).collect(),
        }
    }

    #[test]
    fn filters_to_test_methods_in_order() {
        let table = SymbolTable {
            methods: vec![
                method("setup", &[]),
                method("testB", &["IsTest"]),
                method("helper", &["Deprecated"]),
                method("testA", &["Deprecated", "IsTest"]),
            ],
        };
        let methods = test_methods(Some(&table), "MyTests").unwrap();
        assert_eq!(methods, vec!["testB", "testA"], "table order is preserved");
    }

    #[test]
    fn empty_table_is_a_valid_empty_list() {
        let table = SymbolTable { methods: vec![] };
        assert_eq!(test_methods(Some(&table), "MyTests").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn missing_table_is_an_error_not_an_empty_list() {
        let err = test_methods(None, "MyTests").unwrap_err();
        assert_eq!(err.artifact_name(), "MyTests");
    }

    #[test]
    fn annotation_match_is_case_sensitive() {
        let table = SymbolTable {
            methods: vec![method("testA", &["isTest"]), method("testB", &["ISTEST"])],
        };
        assert!(test_methods(Some(&table), "MyTests").unwrap().is_empty());
    }
}
