use std::collections::HashSet;

use thiserror::Error;

/// Catalog loaded when `INVENTORY_SEED` is not set.
static DEFAULT_CATALOG: &[(&str, i64)] = &[("P001", 100), ("P002", 50)];

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("seed catalog is empty")]
    Empty,
    #[error("malformed entry `{0}`, expected ID=QUANTITY")]
    Malformed(String),
    #[error("product id must not be empty in entry `{0}`")]
    EmptyId(String),
    #[error("quantity for {id} is not a non-negative integer: `{raw}`")]
    BadQuantity { id: String, raw: String },
    #[error("duplicate product id {0}")]
    Duplicate(String),
}

pub fn default_catalog() -> Vec<(String, i64)> {
    DEFAULT_CATALOG
        .iter()
        .map(|(id, qty)| (id.to_string(), *qty))
        .collect()
}

/// Parse a catalog such as `P001=100,P002=50`.
///
/// Whitespace around ids and quantities is ignored, as is a trailing comma.
pub fn parse_catalog(raw: &str) -> Result<Vec<(String, i64)>, SeedError> {
    let mut seen = HashSet::new();
    let mut catalog = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (id, qty) = entry
            .split_once('=')
            .ok_or_else(|| SeedError::Malformed(entry.to_string()))?;
        let id = id.trim();
        let qty = qty.trim();

        if id.is_empty() {
            return Err(SeedError::EmptyId(entry.to_string()));
        }

        let quantity = qty
            .parse::<i64>()
            .ok()
            .filter(|q| *q >= 0)
            .ok_or_else(|| SeedError::BadQuantity {
                id: id.to_string(),
                raw: qty.to_string(),
            })?;

        if !seen.insert(id.to_string()) {
            return Err(SeedError::Duplicate(id.to_string()));
        }
        catalog.push((id.to_string(), quantity));
    }

    if catalog.is_empty() {
        return Err(SeedError::Empty);
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_two_products() {
        assert_eq!(
            default_catalog(),
            vec![("P001".to_string(), 100), ("P002".to_string(), 50)]
        );
    }

    #[test]
    fn parses_pairs_with_whitespace_and_trailing_comma() {
        let catalog = parse_catalog(" P001 = 100, P002=50 ,").unwrap();
        assert_eq!(catalog, default_catalog());
    }

    #[test]
    fn zero_quantity_is_allowed() {
        assert_eq!(parse_catalog("X=0").unwrap(), vec![("X".to_string(), 0)]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_catalog(""), Err(SeedError::Empty));
        assert_eq!(parse_catalog(" , "), Err(SeedError::Empty));
        assert_eq!(
            parse_catalog("P001"),
            Err(SeedError::Malformed("P001".to_string()))
        );
        assert_eq!(parse_catalog("=5"), Err(SeedError::EmptyId("=5".to_string())));
        assert_eq!(
            parse_catalog("P001=-1"),
            Err(SeedError::BadQuantity {
                id: "P001".to_string(),
                raw: "-1".to_string()
            })
        );
        assert!(matches!(
            parse_catalog("P001=lots"),
            Err(SeedError::BadQuantity { .. })
        ));
        assert_eq!(
            parse_catalog("P001=1,P001=2"),
            Err(SeedError::Duplicate("P001".to_string()))
        );
    }
}
