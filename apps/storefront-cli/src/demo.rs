//! Guided walkthrough: one user and one product through their whole
//! lifecycle, then the sales reports.
//!
//! Every row the demo creates is deleted again, even when a step fails
//! partway, so it can run against a seeded database repeatedly. Emails and
//! SKUs carry a timestamp so a previous interrupted run cannot collide with
//! this one.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::{
    Brand, Category, NewBrand, NewCategory, NewProduct, NewUser, ProductPatch, UserPatch,
};
use storefront_db::Database;
use tracing::{info, warn};

fn section<T: Serialize>(title: &str, value: &T) -> anyhow::Result<()> {
    println!("── {title} ──");
    println!("{}", serde_json::to_string_pretty(value)?);
    println!();
    Ok(())
}

/// Rows the walkthrough has created and not yet deleted itself.
#[derive(Debug, Default)]
struct Created {
    user: Option<i32>,
    product: Option<i32>,
    category: Option<i32>,
    brand: Option<i32>,
}

impl Created {
    /// Deletes whatever is left, children before parents. Every delete is
    /// attempted even if an earlier one fails.
    async fn remove(&mut self, db: &Database) -> anyhow::Result<()> {
        let mut failed = 0;

        if let Some(id) = self.user.take() {
            if let Err(e) = db.users().delete(id).await {
                warn!(user_id = id, error = %e, "Could not remove demo user");
                failed += 1;
            }
        }
        if let Some(id) = self.product.take() {
            if let Err(e) = db.products().delete(id).await {
                warn!(product_id = id, error = %e, "Could not remove demo product");
                failed += 1;
            }
        }
        if let Some(id) = self.category.take() {
            if let Err(e) = db.delete::<Category>(id).await {
                warn!(category_id = id, error = %e, "Could not remove demo category");
                failed += 1;
            }
        }
        if let Some(id) = self.brand.take() {
            if let Err(e) = db.delete::<Brand>(id).await {
                warn!(brand_id = id, error = %e, "Could not remove demo brand");
                failed += 1;
            }
        }

        if failed > 0 {
            anyhow::bail!("{failed} demo row(s) could not be removed");
        }
        Ok(())
    }
}

pub async fn run(db: &Database) -> anyhow::Result<()> {
    let mut created = Created::default();

    let walkthrough = walkthrough(db, &mut created).await;
    let cleanup = created.remove(db).await;
    walkthrough?;
    cleanup?;

    reports(db).await
}

async fn walkthrough(db: &Database, created: &mut Created) -> anyhow::Result<()> {
    let stamp = Utc::now().timestamp_millis();

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------
    let users = db.users();

    let user_id = users
        .insert(&NewUser {
            fullname: "John Doe".to_string(),
            email: format!("john.{stamp}@example.com"),
            phone: 1_234_567_890,
            address: "123 Main St".to_string(),
        })
        .await?;
    created.user = Some(user_id);
    info!(user_id, "Inserted demo user");

    section("All users", &users.get_all().await?)?;

    users
        .update(
            user_id,
            &UserPatch {
                phone: Some(3_987_654_321),
                ..Default::default()
            },
        )
        .await?;
    section("Updated user", &users.get_by_id(user_id).await?)?;

    users.delete(user_id).await?;
    created.user = None;
    info!(user_id, "Deleted demo user");

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------
    created.category = Some(
        db.create::<Category>(&NewCategory {
            name: format!("Demo Category {stamp}"),
            description: None,
        })
        .await?,
    );
    created.brand = Some(
        db.create::<Brand>(&NewBrand {
            name: format!("Demo Brand {stamp}"),
            description: None,
        })
        .await?,
    );

    let products = db.products();

    let product_id = products
        .insert(&NewProduct {
            product_name: "Sample Product".to_string(),
            description: Some("This is a sample product".to_string()),
            price: Decimal::new(1999, 2),
            stock_quantity: 100,
            category_id: created.category,
            brand_id: created.brand,
            sku: Some(format!("SKU-{stamp}")),
            image_url: Some("http://example.com/image.jpg".to_string()),
            is_active: true,
        })
        .await?;
    created.product = Some(product_id);
    info!(product_id, "Inserted demo product");

    section("All products", &products.get_all().await?)?;

    products
        .update(
            product_id,
            &ProductPatch {
                price: Some(Decimal::new(1799, 2)),
                ..Default::default()
            },
        )
        .await?;
    section("Updated product", &products.get_by_id(product_id).await?)?;

    created.remove(db).await?;
    info!(product_id, "Deleted demo product");

    Ok(())
}

async fn reports(db: &Database) -> anyhow::Result<()> {
    let analytics = db.analytics();

    section("Order details", &analytics.order_details().await?)?;
    section("Sales by category", &analytics.sales_by_category().await?)?;
    section("Sales rollup", &analytics.sales_rollup().await?)?;
    section("Sales cube", &analytics.sales_cube().await?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    async fn closed_database() -> Database {
        let options = PgConnectOptions::new().host("127.0.0.1").port(1);
        let db = Database::from_pool(PgPoolOptions::new().connect_lazy_with(options));
        db.close().await;
        db
    }

    #[tokio::test]
    async fn test_nothing_to_remove_needs_no_connection() {
        let db = closed_database().await;
        assert!(Created::default().remove(&db).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_attempts_every_row() {
        let db = closed_database().await;
        let mut created = Created {
            user: Some(1),
            product: Some(2),
            category: Some(3),
            brand: Some(4),
        };

        let err = created.remove(&db).await.unwrap_err();
        assert!(err.to_string().starts_with("4 demo row(s)"));
        assert!(created.user.is_none() && created.brand.is_none());
    }

    #[tokio::test]
    async fn test_failed_walkthrough_is_reported() {
        let db = closed_database().await;
        assert!(run(&db).await.is_err());
    }
}
