//! Integration tests against a throwaway PostgreSQL container.
//!
//! These need a Docker daemon, so they are ignored by default:
//!
//! ```bash
//! cargo test -p storefront-db --test postgres_integration -- --ignored
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use storefront_core::{
    BaseFilterOptions, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem,
    ProductFilterOptions, Range, User, UserFilterOptions, UserPatch,
};
use storefront_db::schema::missing_tables;
use storefront_db::{Database, DbConfig, DbError, Report};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

async fn setup() -> (ContainerAsync<Postgres>, Database) {
    let container = Postgres::default()
        .with_tag("16-alpine")
        .start()
        .await
        .expect("Failed to start Postgres container");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let db = Database::new(DbConfig::new(url).max_connections(5))
        .await
        .expect("Failed to connect to Postgres");

    (container, db)
}

fn user(n: usize) -> NewUser {
    NewUser {
        fullname: format!("User {n}"),
        email: format!("user{n}@example.com"),
        phone: 5_550_000_000 + n as i64,
        address: format!("{n} Main St"),
    }
}

fn product(name: &str, price: &str, sku: &str) -> NewProduct {
    NewProduct {
        product_name: name.to_string(),
        description: None,
        price: Decimal::from_str(price).unwrap(),
        stock_quantity: 10,
        category_id: None,
        brand_id: None,
        sku: Some(sku.to_string()),
        image_url: None,
        is_active: true,
    }
}

// =============================================================================
// Schema
// =============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_schema_initialization_is_idempotent() {
    let (_container, db) = setup().await;

    db.initialize_schema().await.unwrap();
    db.initialize_schema().await.unwrap();

    assert!(missing_tables(db.pool()).await.unwrap().is_empty());
    assert!(db.health_check().await);
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_then_read_back() {
    let (_container, db) = setup().await;

    let id = db.users().insert(&user(1)).await.unwrap();
    let stored = db.users().get_by_id(id).await.unwrap().unwrap();

    assert_eq!(stored.id, id);
    assert_eq!(stored.fullname, "User 1");
    assert_eq!(stored.email, "user1@example.com");
    assert_eq!(stored.phone, 5_550_000_001);

    assert!(db.users().get_by_id(id + 1000).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_ids_increase() {
    let (_container, db) = setup().await;

    let first = db.users().insert(&user(1)).await.unwrap();
    let second = db.users().insert(&user(2)).await.unwrap();
    assert!(second > first);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_changes_only_supplied_field() {
    let (_container, db) = setup().await;

    let id = db.users().insert(&user(1)).await.unwrap();
    let before = db.users().get_by_id(id).await.unwrap().unwrap();

    db.users()
        .update(
            id,
            &UserPatch {
                phone: Some(3_987_654_321),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = db.users().get_by_id(id).await.unwrap().unwrap();
    assert_eq!(after.phone, 3_987_654_321);
    assert_eq!(after.fullname, before.fullname);
    assert_eq!(after.email, before.email);
    assert_eq!(after.address, before.address);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_empty_patch_leaves_row_untouched() {
    let (_container, db) = setup().await;

    let id = db.users().insert(&user(1)).await.unwrap();
    let before = db.users().get_by_id(id).await.unwrap().unwrap();

    db.update::<User>(id, &UserPatch::default()).await.unwrap();

    let after = db.users().get_by_id(id).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_duplicate_email_is_constraint_violation() {
    let (_container, db) = setup().await;

    let id = db.users().insert(&user(1)).await.unwrap();

    let mut duplicate = user(2);
    duplicate.email = "user1@example.com".to_string();
    let err = db.users().insert(&duplicate).await.unwrap_err();

    assert!(err.is_constraint_violation(), "got {err:?}");
    assert_eq!(err.violated_field(), Some("email"));

    let original = db.users().get_by_id(id).await.unwrap().unwrap();
    assert_eq!(original.fullname, "User 1");
    assert_eq!(db.users().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_duplicate_sku_is_constraint_violation() {
    let (_container, db) = setup().await;

    db.products()
        .insert(&product("Lamp", "25.00", "LAMP-1"))
        .await
        .unwrap();
    let err = db
        .products()
        .insert(&product("Other Lamp", "30.00", "LAMP-1"))
        .await
        .unwrap_err();

    assert_eq!(err.violated_field(), Some("sku"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_missing_reference_is_foreign_key_violation() {
    let (_container, db) = setup().await;

    let err = db
        .create::<OrderItem>(&NewOrderItem {
            order_id: 9999,
            product_id: 9999,
            quantity: 1,
            price: Decimal::ONE,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_bulk_insert_rolls_back_on_failure() {
    let (_container, db) = setup().await;

    let mut clash = user(3);
    clash.email = user(1).email;
    let batch = vec![user(1), user(2), clash];

    let err = db.users().insert_many(&batch).await.unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(db.users().get_all().await.unwrap().is_empty());

    let ids = db.users().insert_many(&[user(1), user(2)]).await.unwrap();
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_delete_and_delete_all() {
    let (_container, db) = setup().await;

    let ids = db
        .users()
        .insert_many(&[user(1), user(2), user(3)])
        .await
        .unwrap();

    db.users().delete(ids[0]).await.unwrap();
    // Missing rows are not an error.
    db.users().delete(ids[0]).await.unwrap();

    assert_eq!(db.users().delete_all().await.unwrap(), 2);
    assert!(db.users().get_all().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_deleting_user_keeps_orders() {
    let (_container, db) = setup().await;

    let user_id = db.users().insert(&user(1)).await.unwrap();
    let order_id = db
        .create::<Order>(&NewOrder {
            user_id: Some(user_id),
            total_amount: Decimal::from(10),
            status: "paid".to_string(),
        })
        .await
        .unwrap();

    db.users().delete(user_id).await.unwrap();

    let order = db.read_by_id::<Order>(order_id).await.unwrap().unwrap();
    assert_eq!(order.user_id, None);
}

// =============================================================================
// Filters
// =============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_pagination_metadata() {
    let (_container, db) = setup().await;

    let users: Vec<NewUser> = (1..=25).map(user).collect();
    db.users().insert_many(&users).await.unwrap();

    let mut options = UserFilterOptions {
        base: BaseFilterOptions {
            page: Some(1),
            page_size: Some(10),
            ..Default::default()
        },
        ..Default::default()
    };

    let first = db.users().filter(&options).await.unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages, Some(3));
    assert_eq!(first.has_next_page, Some(true));
    assert_eq!(first.has_previous_page, Some(false));

    options.base.page = Some(3);
    let last = db.users().filter(&options).await.unwrap();
    assert_eq!(last.data.len(), 5);
    assert_eq!(last.has_next_page, Some(false));
    assert_eq!(last.has_previous_page, Some(true));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_price_range_is_inclusive() {
    let (_container, db) = setup().await;

    for (i, price) in ["10.00", "15.00", "20.00", "25.00"].iter().enumerate() {
        db.products()
            .insert(&product(&format!("P{i}"), price, &format!("P-{i}")))
            .await
            .unwrap();
    }

    let options = ProductFilterOptions {
        price_range: Some(Range::new(Decimal::from(10), Decimal::from(20))),
        ..Default::default()
    };
    let result = db.products().filter(&options).await.unwrap();

    assert_eq!(result.total, 3);
    assert!(result
        .data
        .iter()
        .all(|p| p.price >= Decimal::from(10) && p.price <= Decimal::from(20)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_search_counts_only_matches() {
    let (_container, db) = setup().await;

    db.users().insert_many(&[user(1), user(2)]).await.unwrap();
    let mut jane = user(3);
    jane.fullname = "Jane Smith".to_string();
    db.users().insert(&jane).await.unwrap();

    let options = UserFilterOptions {
        base: BaseFilterOptions {
            search: Some("jane".to_string()),
            search_fields: vec!["fullname".to_string(), "email".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let result = db.users().filter(&options).await.unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.data[0].fullname, "Jane Smith");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_contains_matches_percent_literally() {
    let (_container, db) = setup().await;

    db.products()
        .insert(&product("50% off bundle", "5.00", "B-1"))
        .await
        .unwrap();
    db.products()
        .insert(&product("500 gram coffee", "9.00", "C-1"))
        .await
        .unwrap();

    let options = ProductFilterOptions {
        product_name_contains: Some("50%".to_string()),
        ..Default::default()
    };
    let result = db.products().filter(&options).await.unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.data[0].product_name, "50% off bundle");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_storefront_lookups() {
    let (_container, db) = setup().await;

    let mut hidden = product("Hidden", "1.00", "H-1");
    hidden.is_active = false;
    hidden.stock_quantity = 0;
    let mut scarce = product("Scarce", "2.00", "S-1");
    scarce.stock_quantity = 2;
    db.products()
        .insert_many(&[hidden, scarce, product("Plenty", "3.00", "PL-1")])
        .await
        .unwrap();

    let low = db.products().low_stock(5).await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].product_name, "Scarce");

    let newest = db.products().newest(10).await.unwrap();
    assert_eq!(newest.len(), 2);

    let found = db.products().search("plen").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_user_lookups() {
    let (_container, db) = setup().await;

    let mut gmail = user(1);
    gmail.email = "someone@gmail.com".to_string();
    db.users().insert_many(&[gmail, user(2)]).await.unwrap();

    assert_eq!(db.users().by_email_domain("gmail.com").await.unwrap().len(), 1);
    assert_eq!(db.users().by_name_pattern("user").await.unwrap().len(), 2);
    assert_eq!(db.users().recent(1).await.unwrap().len(), 2);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_reports_over_small_dataset() {
    let (_container, db) = setup().await;

    let user_id = db.users().insert(&user(1)).await.unwrap();
    db.users().insert(&user(2)).await.unwrap();
    let product_ids = db
        .products()
        .insert_many(&[
            product("A", "10.00", "A-1"),
            product("B", "20.00", "B-1"),
            product("C", "90.00", "C-1"),
        ])
        .await
        .unwrap();

    let order_id = db
        .create::<Order>(&NewOrder {
            user_id: Some(user_id),
            total_amount: Decimal::from(30),
            status: "paid".to_string(),
        })
        .await
        .unwrap();
    for (product_id, price) in [(product_ids[0], 10), (product_ids[1], 20)] {
        db.create::<OrderItem>(&NewOrderItem {
            order_id,
            product_id,
            quantity: 1,
            price: Decimal::from(price),
        })
        .await
        .unwrap();
    }

    let analytics = db.analytics();

    assert_eq!(analytics.orders_with_users().await.unwrap().len(), 1);
    // user 2 has no orders but still appears
    assert_eq!(analytics.users_with_orders().await.unwrap().len(), 2);
    assert_eq!(analytics.orders_with_items().await.unwrap().len(), 2);

    let rollup = analytics.sales_rollup().await.unwrap();
    let grand_total = rollup.iter().find(|row| row.is_grand_total()).unwrap();
    assert_eq!(grand_total.total_sales, Decimal::from(30));

    let buyers = analytics.users_with_many_products(1).await.unwrap();
    assert_eq!(buyers.len(), 1);
    assert_eq!(buyers[0].distinct_products, 2);

    let expensive = analytics.expensive_products().await.unwrap();
    assert_eq!(expensive.len(), 1);
    assert_eq!(expensive[0].product_name, "C");

    assert_eq!(analytics.users_and_products().await.unwrap().len(), 5);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_every_report_runs_on_empty_store() {
    let (_container, db) = setup().await;

    for report in Report::ALL {
        let result = db.analytics().run(report).await;
        assert!(result.is_ok(), "{report} failed: {result:?}");
    }

    // the grand-total grouping set is returned even with no sales
    let rollup = db.analytics().sales_rollup().await.unwrap();
    assert_eq!(rollup.len(), 1);
    assert!(rollup[0].is_grand_total());
    assert_eq!(rollup[0].total_sales, Decimal::ZERO);
    assert_eq!(db.analytics().sales_cube().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_sales_reports_with_catalogue_but_no_sales() {
    let (_container, db) = setup().await;

    let users: Vec<NewUser> = (1..=25).map(user).collect();
    db.users().insert_many(&users).await.unwrap();
    db.products()
        .insert_many(&[product("A", "10.00", "A-1"), product("B", "20.00", "B-1")])
        .await
        .unwrap();
    // an order with no lines contributes nothing to sales
    db.create::<Order>(&NewOrder {
        user_id: None,
        total_amount: Decimal::ZERO,
        status: "pending".to_string(),
    })
    .await
    .unwrap();

    for report in [Report::SalesRollup, Report::SalesCube, Report::SalesByCategory] {
        assert!(db.analytics().run(report).await.is_ok(), "{report} failed");
    }

    let cube = db.analytics().sales_cube().await.unwrap();
    assert_eq!(cube.len(), 1);
    assert_eq!(cube[0].total_sales, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_outer_joins_keep_unmatched_rows() {
    let (_container, db) = setup().await;

    let buyer = db.users().insert(&user(1)).await.unwrap();
    for user_id in [Some(buyer), None] {
        db.create::<Order>(&NewOrder {
            user_id,
            total_amount: Decimal::from(5),
            status: "paid".to_string(),
        })
        .await
        .unwrap();
    }

    let analytics = db.analytics();
    assert_eq!(analytics.orders_with_users().await.unwrap().len(), 1);
    assert_eq!(analytics.orders_with_users_right_join().await.unwrap().len(), 2);
    assert_eq!(analytics.users_and_orders_full_join().await.unwrap().len(), 2);

    let right = analytics.orders_with_users_right_join().await.unwrap();
    assert!(right.iter().any(|row| row.user_id.is_none() && row.order_id.is_some()));

    // a user without orders only shows up in the full join
    db.users().insert(&user(2)).await.unwrap();
    assert_eq!(analytics.orders_with_users_right_join().await.unwrap().len(), 2);
    let full = analytics.users_and_orders_full_join().await.unwrap();
    assert_eq!(full.len(), 3);
    assert!(full.iter().any(|row| row.user_id.is_some() && row.order_id.is_none()));
}

// =============================================================================
// Paging stability
// =============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_pages_over_tied_sort_values_do_not_overlap() {
    let (_container, db) = setup().await;

    let products: Vec<NewProduct> = (0..12)
        .map(|i| product(&format!("Same price {i}"), "9.99", &format!("TIE-{i}")))
        .collect();
    db.products().insert_many(&products).await.unwrap();

    let mut seen = Vec::new();
    for page in 1..=3 {
        let options = ProductFilterOptions {
            base: BaseFilterOptions {
                page: Some(page),
                page_size: Some(5),
                sort_by: Some("price".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        seen.extend(db.products().filter(&options).await.unwrap().data.into_iter().map(|p| p.id));
    }

    let mut unique = seen.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(seen.len(), 12);
    assert_eq!(unique.len(), 12);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_padded_sku_is_rejected_before_insert() {
    let (_container, db) = setup().await;

    let err = db
        .products()
        .insert(&product("Lamp", "25.00", " LAMP-1 "))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Validation(_)), "got {err:?}");
    assert!(db.products().get_all().await.unwrap().is_empty());
}
