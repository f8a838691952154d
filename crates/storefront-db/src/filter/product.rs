//! Product filter conditions.

use storefront_core::validation::validate_product_filter;
use storefront_core::{Product, ProductFilterOptions};

use super::FilterQuery;
use crate::error::DbResult;

/// Builds the filter statement for `products`.
///
/// Redundant bounds are not merged: `min_stock` together with
/// `stock_range` yields both conditions, ANDed.
pub fn product_query(options: &ProductFilterOptions) -> DbResult<FilterQuery<Product>> {
    validate_product_filter(options)?;

    let mut query = FilterQuery::<Product>::new();

    if let Some(id) = options.id {
        query.eq("id", id);
    }
    query.any("id", &options.ids);

    if let Some(name) = &options.product_name {
        query.eq("product_name", name.as_str());
    }
    if let Some(text) = &options.product_name_contains {
        query.contains("product_name", text);
    }
    if let Some(text) = &options.description_contains {
        query.contains("description", text);
    }

    // Price
    if let Some(min) = options.min_price {
        query.gte("price", min);
    }
    if let Some(max) = options.max_price {
        query.lte("price", max);
    }
    if let Some(range) = options.price_range {
        query.between("price", range.min, range.max);
    }

    // Stock
    if let Some(min) = options.min_stock {
        query.gte("stock_quantity", min);
    }
    if let Some(max) = options.max_stock {
        query.lte("stock_quantity", max);
    }
    if let Some(range) = options.stock_range {
        query.between("stock_quantity", range.min, range.max);
    }

    if let Some(id) = options.category_id {
        query.eq("category_id", id);
    }
    query.any("category_id", &options.category_ids);

    if let Some(id) = options.brand_id {
        query.eq("brand_id", id);
    }
    query.any("brand_id", &options.brand_ids);

    if let Some(sku) = &options.sku {
        query.eq("sku", sku.as_str());
    }
    if let Some(text) = &options.sku_contains {
        query.contains("sku", text);
    }

    if let Some(has_image) = options.has_image {
        query.present("image_url", has_image);
    }
    if let Some(active) = options.is_active {
        query.eq("is_active", active);
    }

    if let Some(after) = options.created_after {
        query.gte("created_at", after);
    }
    if let Some(before) = options.created_before {
        query.lte("created_at", before);
    }
    if let Some(after) = options.updated_after {
        query.gte("updated_at", after);
    }
    if let Some(before) = options.updated_before {
        query.lte("updated_at", before);
    }

    query.apply_base(&options.base)?;
    Ok(query)
}
