//! Database-backed façade tests
//!
//! These exercise the real lifecycle contracts against PostgreSQL and are
//! ignored by default. The suite mutates shared tables, so run it
//! single-threaded:
//!
//!   DATABASE_URL=postgres://... cargo test -p farmhand-server -- --ignored --test-threads=1

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use farmhand_server::db::reports::{Reports, SearchCondition};
use farmhand_server::db::{connect, Db, PoolConfig, TableFacade};

async fn db() -> Db {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = connect(&url, &PoolConfig::default())
        .await
        .expect("pool creation failed");
    Db::new(pool)
}

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().expect("object literal").clone()
}

async fn initiate(db: &Db, table: &str) {
    let facade = TableFacade::for_name(db, table).expect("registered table");
    assert!(facade.initiate().await, "initiate {table} failed");
}

async fn insert(db: &Db, table: &str, row: Value) -> bool {
    TableFacade::for_name(db, table)
        .expect("registered table")
        .insert(&fields(row))
        .await
}

fn rows_json(rows: Vec<Vec<farmhand_server::db::SqlValue>>) -> Value {
    serde_json::to_value(rows).expect("serializable rows")
}

#[tokio::test]
#[ignore = "requires database"]
async fn initiate_is_idempotent() {
    let db = db().await;
    initiate(&db, "customer").await;
    assert!(insert(&db, "customer", json!({ "cEmail": "a@farm.test" })).await);

    // Second initiate leaves the table present and empty again.
    initiate(&db, "customer").await;
    let facade = TableFacade::for_name(&db, "customer").unwrap();
    assert!(facade.fetch_all().await.is_empty());
    assert_eq!(facade.count().await, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn fetch_reflects_inserts() {
    let db = db().await;
    initiate(&db, "customer").await;

    let facade = TableFacade::for_name(&db, "customer").unwrap();
    assert!(facade.fetch_all().await.is_empty());

    assert!(
        insert(
            &db,
            "customer",
            json!({
                "cEmail": "a@farm.test",
                "cName": "Ada",
                "cPhoneNumber": "555-0100"
            })
        )
        .await
    );

    let rows = rows_json(facade.fetch_all().await);
    assert_eq!(rows, json!([["a@farm.test", "Ada", "555-0100"]]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_primary_key_insert_returns_false() {
    let db = db().await;
    initiate(&db, "customer").await;

    let row = json!({ "cEmail": "a@farm.test", "cName": "Ada" });
    assert!(insert(&db, "customer", row.clone()).await);
    assert!(!insert(&db, "customer", row).await);

    let facade = TableFacade::for_name(&db, "customer").unwrap();
    assert_eq!(facade.count().await, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn initiate_farmer_drops_referencing_shift_rows() {
    let db = db().await;
    initiate(&db, "farmer").await;
    initiate(&db, "shift").await;
    assert!(insert(&db, "farmer", json!({ "FarmerID": 1, "fName": "Bo" })).await);
    assert!(insert(&db, "shift", json!({ "FarmerID": 1, "sDate": "2024-06-01" })).await);

    // Re-initiating Farmer drops Shift first; the old shift rows are gone.
    initiate(&db, "farmer").await;
    let shift = TableFacade::for_name(&db, "shift").unwrap();
    assert!(shift.fetch_all().await.is_empty());

    // Shift needs its own re-initiate before new rows land.
    assert!(!insert(&db, "shift", json!({ "FarmerID": 1, "sDate": "2024-06-02" })).await);
    initiate(&db, "shift").await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn shift_roster_joins_farmer_info() {
    let db = db().await;
    initiate(&db, "farmer").await;
    initiate(&db, "shift").await;
    assert!(
        insert(
            &db,
            "farmer",
            json!({ "FarmerID": 1, "fName": "Bo", "fPhoneNumber": "555-0101" })
        )
        .await
    );
    assert!(insert(&db, "farmer", json!({ "FarmerID": 2, "fName": "Lin" })).await);
    assert!(insert(&db, "shift", json!({ "FarmerID": 1, "sDate": "2024-06-01" })).await);
    assert!(insert(&db, "shift", json!({ "FarmerID": 2, "sDate": "2024-06-02" })).await);

    let reports = Reports::new(&db);
    let rows = rows_json(reports.shift_roster("2024-06-01").await);
    assert_eq!(rows, json!([[1, "Bo", "555-0101"]]));

    assert!(reports.shift_roster("not a date").await.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn super_farmers_division() {
    let db = db().await;
    initiate(&db, "farmer").await;
    initiate(&db, "shift").await;
    for (id, name) in [(1, "Bo"), (2, "Lin")] {
        assert!(insert(&db, "farmer", json!({ "FarmerID": id, "fName": name })).await);
    }
    // Bo works both dates, Lin only one.
    for (id, date) in [(1, "2024-06-01"), (1, "2024-06-02"), (2, "2024-06-01")] {
        assert!(insert(&db, "shift", json!({ "FarmerID": id, "sDate": date })).await);
    }

    let rows = rows_json(Reports::new(&db).super_farmers().await);
    assert_eq!(rows, json!([[1, "Bo"]]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn projection_returns_columns_in_request_order() {
    let db = db().await;
    initiate(&db, "customer").await;
    initiate(&db, "transaction").await;
    assert!(insert(&db, "customer", json!({ "cEmail": "a@farm.test" })).await);
    assert!(
        insert(
            &db,
            "transaction",
            json!({
                "TransactionNumber": 10,
                "cEmail": "a@farm.test",
                "tDate": "2024-06-01",
                "Total": "25.50"
            })
        )
        .await
    );

    let facade = TableFacade::for_name(&db, "transaction").unwrap();
    let rows = rows_json(
        facade
            .project(&["Total".into(), "TransactionNumber".into()])
            .await,
    );
    assert_eq!(rows, json!([[25.5, 10]]));

    // Unknown names are dropped; all-unknown projects nothing.
    let rows = facade
        .project(&["TransactionNumber".into(), "dropTable".into()])
        .await;
    assert_eq!(rows[0].len(), 1);
    assert!(facade.project(&["dropTable".into()]).await.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn transaction_totals_having_thresholds() {
    let db = db().await;
    initiate(&db, "customer").await;
    initiate(&db, "transaction").await;
    assert!(insert(&db, "customer", json!({ "cEmail": "a@farm.test" })).await);
    for (num, date, total) in [
        (1, "2024-06-01", "10.00"),
        (2, "2024-06-01", "15.00"),
        (3, "2024-06-02", "5.00"),
    ] {
        assert!(
            insert(
                &db,
                "transaction",
                json!({
                    "TransactionNumber": num,
                    "cEmail": "a@farm.test",
                    "tDate": date,
                    "Total": total
                })
            )
            .await
        );
    }

    let reports = Reports::new(&db);

    // Threshold 0 keeps every group.
    let rows = rows_json(reports.transaction_totals(Decimal::ZERO).await);
    assert_eq!(rows, json!([["2024-06-01", 25.0], ["2024-06-02", 5.0]]));

    // A threshold above every group's sum returns nothing.
    assert!(reports
        .transaction_totals(Decimal::from(1000))
        .await
        .is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn machinery_group_by_counts() {
    let db = db().await;
    initiate(&db, "machinery").await;
    for (id, ty, condition) in [
        (1, "Tractor", "Good"),
        (2, "Plow", "Good"),
        (3, "Harvester", "Broken"),
    ] {
        assert!(
            insert(
                &db,
                "machinery",
                json!({ "MachineID": id, "mType": ty, "Condition": condition })
            )
            .await
        );
    }

    let rows = rows_json(Reports::new(&db).machinery_by_condition().await);
    assert_eq!(rows, json!([["Broken", 1], ["Good", 2]]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_and_delete_report_row_effects() {
    let db = db().await;
    initiate(&db, "storagebuilding").await;
    assert!(
        insert(
            &db,
            "storagebuilding",
            json!({ "BuildingID": 1, "BuildingType": "Silo" })
        )
        .await
    );

    let facade = TableFacade::for_name(&db, "storagebuilding").unwrap();

    assert!(
        facade
            .update(
                &fields(json!({ "BuildingType": "Barn" })),
                &fields(json!({ "BuildingID": 1 })),
            )
            .await
    );
    // No matching row: false.
    assert!(
        !facade
            .update(
                &fields(json!({ "BuildingType": "Barn" })),
                &fields(json!({ "BuildingID": 99 })),
            )
            .await
    );
    // No recognized assignment column: false, nothing touched.
    assert!(
        !facade
            .update(
                &fields(json!({ "dropTable": "x" })),
                &fields(json!({ "BuildingID": 1 })),
            )
            .await
    );

    assert!(facade.delete(&fields(json!({ "BuildingID": 1 }))).await);
    assert!(!facade.delete(&fields(json!({ "BuildingID": 1 }))).await);
    assert_eq!(facade.count().await, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn animal_search_and_underweight_count() {
    let db = db().await;
    initiate(&db, "animal").await;
    initiate(&db, "cow").await;
    for (id, name, age, pen, weight) in [
        (1, "Clarabelle", 4, 1, "520.0"),
        (2, "Daisy", 2, 1, "350.0"),
        (3, "Henrietta", 1, 2, "2.5"),
    ] {
        assert!(
            insert(
                &db,
                "animal",
                json!({
                    "AnimalID": id,
                    "aName": name,
                    "Age": age,
                    "PenNumber": pen,
                    "Weight": weight
                })
            )
            .await
        );
    }
    for id in [1, 2] {
        assert!(insert(&db, "cow", json!({ "AnimalID": id, "Breed": "Jersey" })).await);
    }

    let reports = Reports::new(&db);

    let conditions = vec![SearchCondition {
        column: "Age".into(),
        op: ">=".into(),
        value: json!(2),
        connective: None,
    }];
    let rows = reports.animal_search(&conditions).await;
    assert_eq!(rows.len(), 2);

    // Chickens are not cows: only Daisy is under 400.
    assert_eq!(reports.underweight_cows(Decimal::from(400)).await, 1);
    assert_eq!(reports.underweight_cows(Decimal::from(1)).await, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn product_joins() {
    let db = db().await;
    for table in [
        "customer",
        "transaction",
        "crop",
        "products",
        "purchase",
        "animal",
        "chicken",
        "eggrecords",
    ] {
        initiate(&db, table).await;
    }

    assert!(insert(&db, "customer", json!({ "cEmail": "a@farm.test" })).await);
    assert!(
        insert(
            &db,
            "transaction",
            json!({
                "TransactionNumber": 1,
                "cEmail": "a@farm.test",
                "tDate": "2024-06-01",
                "Total": "9.00"
            })
        )
        .await
    );
    assert!(insert(&db, "crop", json!({ "CropID": 1, "cType": "Wheat" })).await);
    assert!(
        insert(
            &db,
            "products",
            json!({ "ProductID": 1, "CropID": 1, "pName": "Flour", "Price": "4.50" })
        )
        .await
    );
    assert!(
        insert(
            &db,
            "purchase",
            json!({ "TransactionNumber": 1, "ProductID": 1, "Quantity": 2 })
        )
        .await
    );
    assert!(insert(&db, "animal", json!({ "AnimalID": 9, "aName": "Henrietta" })).await);
    assert!(insert(&db, "chicken", json!({ "AnimalID": 9, "EggColor": "Brown" })).await);
    assert!(
        insert(
            &db,
            "eggrecords",
            json!({ "AnimalID": 9, "CollectionDate": "2024-06-01", "EggCount": 6 })
        )
        .await
    );

    let reports = Reports::new(&db);

    let rows = rows_json(reports.crop_products().await);
    assert_eq!(rows, json!([[1, "Flour", "Wheat", 4.5]]));

    let rows = rows_json(reports.purchased_products().await);
    assert_eq!(rows, json!([[1, "Flour", 4.5, 2]]));

    let rows = rows_json(reports.egg_products().await);
    assert_eq!(rows, json!([[9, "Henrietta", "2024-06-01", 6]]));
}
