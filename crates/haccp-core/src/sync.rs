//! Keeps the per-product tables in step with the product list.
//!
//! Rows are keyed by product name. A renamed product is therefore a removal
//! plus an addition and starts again from a default row.

use std::collections::HashSet;

use crate::{AllergenEntry, FormData, ProductHazard};

/// Row counts changed by one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub removed: usize,
}

/// Reconcile `rows` against `products`.
///
/// Rows whose key is still listed are kept in their existing order with their
/// values untouched, then one default row per unmatched product is appended in
/// `products` order. A key present on several rows keeps only the first.
pub fn reconcile<R>(
    rows: Vec<R>,
    products: &[String],
    key: impl Fn(&R) -> &str,
    default_row: impl Fn(&str) -> R,
) -> Vec<R> {
    let wanted: HashSet<&str> = products.iter().map(String::as_str).collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(products.len());
    let mut out = Vec::with_capacity(products.len());

    for row in rows {
        let keep = {
            let k = key(&row);
            wanted.contains(k) && seen.insert(k.to_string())
        };
        if keep {
            out.push(row);
        }
    }

    for product in products {
        if seen.insert(product.clone()) {
            out.push(default_row(product));
        }
    }

    out
}

/// Run [`reconcile`] over the allergen matrix and the hazard table.
pub fn sync_derived_tables(form: &mut FormData) -> SyncReport {
    let before = form.allergen_matrix.len();
    let known: HashSet<String> = form
        .allergen_matrix
        .iter()
        .map(|e| e.product.clone())
        .collect();

    let matrix = std::mem::take(&mut form.allergen_matrix);
    form.allergen_matrix = reconcile(
        matrix,
        &form.products,
        |e| e.product.as_str(),
        |p| AllergenEntry {
            product: p.to_string(),
            allergens: Default::default(),
        },
    );

    let hazards = std::mem::take(&mut form.product_hazards);
    form.product_hazards = reconcile(
        hazards,
        &form.products,
        |h| h.product.as_str(),
        ProductHazard::empty,
    );

    let added = form
        .allergen_matrix
        .iter()
        .filter(|e| !known.contains(&e.product))
        .count();
    let report = SyncReport {
        added,
        removed: before - (form.allergen_matrix.len() - added),
    };
    tracing::debug!(
        products = form.products.len(),
        added = report.added,
        removed = report.removed,
        "derived tables synchronized"
    );
    report
}

/// True when both derived tables list exactly the products, each once.
pub fn tables_in_sync(form: &FormData) -> bool {
    keys_match(&form.products, form.allergen_matrix.iter().map(|e| e.product.as_str()))
        && keys_match(&form.products, form.product_hazards.iter().map(|h| h.product.as_str()))
}

fn keys_match<'a>(products: &[String], keys: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    for k in keys {
        if !seen.insert(k) {
            return false;
        }
    }
    seen.len() == products.len() && products.iter().all(|p| seen.contains(p.as_str()))
}
