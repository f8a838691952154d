//! User filter conditions.

use storefront_core::validation::validate_user_filter;
use storefront_core::{User, UserFilterOptions};

use super::FilterQuery;
use crate::error::DbResult;

/// Builds the filter statement for `users`.
///
/// ## Field Mapping
/// ```text
/// id / ids            → id = $n / id = ANY($n)
/// fullname, email     → exact match
/// *_contains          → ILIKE '%v%'
/// email_domain        → email ILIKE '%@domain'
/// phone               → phone = $n
/// phone_starts_with   → CAST(phone AS TEXT) LIKE 'v%'
/// created_* / updated_* → >= / <=
/// ```
pub fn user_query(options: &UserFilterOptions) -> DbResult<FilterQuery<User>> {
    validate_user_filter(options)?;

    let mut query = FilterQuery::<User>::new();

    if let Some(id) = options.id {
        query.eq("id", id);
    }
    query.any("id", &options.ids);

    if let Some(fullname) = &options.fullname {
        query.eq("fullname", fullname.as_str());
    }
    if let Some(text) = &options.fullname_contains {
        query.contains("fullname", text);
    }

    if let Some(email) = &options.email {
        query.eq("email", email.as_str());
    }
    if let Some(text) = &options.email_contains {
        query.contains("email", text);
    }
    if let Some(domain) = &options.email_domain {
        let domain = domain.trim().trim_start_matches('@');
        query.ends_with("email", &format!("@{domain}"));
    }

    if let Some(phone) = options.phone {
        query.eq("phone", phone);
    }
    if let Some(prefix) = &options.phone_starts_with {
        query.text_starts_with("phone", prefix);
    }

    if let Some(text) = &options.address_contains {
        query.contains("address", text);
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
