//! Static registry of every table the API manages
//!
//! The drop-ordering dependency between tables is data: [`drop_order`]
//! walks the declared FK graph so `initiate` never trips over a dependent
//! table blocking a DROP.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{Column, ColumnType, ForeignKey, OnDelete, TableSchema};

pub static CUSTOMER: TableSchema = TableSchema {
    name: "Customer",
    columns: &[
        Column::new("cEmail", ColumnType::Text),
        Column::new("cName", ColumnType::Text),
        Column::new("cPhoneNumber", ColumnType::Text),
    ],
    primary_key: &["cEmail"],
    foreign_keys: &[],
};

pub static FARMER: TableSchema = TableSchema {
    name: "Farmer",
    columns: &[
        Column::new("FarmerID", ColumnType::Integer),
        Column::new("fName", ColumnType::Text),
        Column::new("fPhoneNumber", ColumnType::Text),
    ],
    primary_key: &["FarmerID"],
    foreign_keys: &[],
};

pub static SHIFT: TableSchema = TableSchema {
    name: "Shift",
    columns: &[
        Column::new("FarmerID", ColumnType::Integer),
        Column::new("sDate", ColumnType::Date),
    ],
    primary_key: &["FarmerID", "sDate"],
    foreign_keys: &[ForeignKey {
        columns: &["FarmerID"],
        references: "Farmer",
        referenced_columns: &["FarmerID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static TRANSACTION: TableSchema = TableSchema {
    name: "Transaction",
    columns: &[
        Column::new("TransactionNumber", ColumnType::Integer),
        Column::required("cEmail", ColumnType::Text),
        Column::new("tDate", ColumnType::Date),
        Column::new("Total", ColumnType::Decimal),
    ],
    primary_key: &["TransactionNumber"],
    foreign_keys: &[ForeignKey {
        columns: &["cEmail"],
        references: "Customer",
        referenced_columns: &["cEmail"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static STORAGE_BUILDING: TableSchema = TableSchema {
    name: "StorageBuilding",
    columns: &[
        Column::new("BuildingID", ColumnType::Integer),
        Column::new("BuildingType", ColumnType::Text),
    ],
    primary_key: &["BuildingID"],
    foreign_keys: &[],
};

pub static MACHINERY: TableSchema = TableSchema {
    name: "Machinery",
    columns: &[
        Column::new("MachineID", ColumnType::Integer),
        Column::new("mType", ColumnType::Text),
        Column::new("Condition", ColumnType::Text),
    ],
    primary_key: &["MachineID"],
    foreign_keys: &[],
};

pub static ANIMAL: TableSchema = TableSchema {
    name: "Animal",
    columns: &[
        Column::new("AnimalID", ColumnType::Integer),
        Column::new("aName", ColumnType::Text),
        Column::new("Age", ColumnType::Integer),
        Column::new("PenNumber", ColumnType::Integer),
        Column::new("Weight", ColumnType::Decimal),
    ],
    primary_key: &["AnimalID"],
    foreign_keys: &[],
};

pub static COW: TableSchema = TableSchema {
    name: "Cow",
    columns: &[
        Column::new("AnimalID", ColumnType::Integer),
        Column::new("Breed", ColumnType::Text),
    ],
    primary_key: &["AnimalID"],
    foreign_keys: &[ForeignKey {
        columns: &["AnimalID"],
        references: "Animal",
        referenced_columns: &["AnimalID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static CHICKEN: TableSchema = TableSchema {
    name: "Chicken",
    columns: &[
        Column::new("AnimalID", ColumnType::Integer),
        Column::new("EggColor", ColumnType::Text),
    ],
    primary_key: &["AnimalID"],
    foreign_keys: &[ForeignKey {
        columns: &["AnimalID"],
        references: "Animal",
        referenced_columns: &["AnimalID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static EGG_RECORDS: TableSchema = TableSchema {
    name: "EggRecords",
    columns: &[
        Column::new("AnimalID", ColumnType::Integer),
        Column::new("CollectionDate", ColumnType::Date),
        Column::new("EggCount", ColumnType::Integer),
    ],
    primary_key: &["AnimalID", "CollectionDate"],
    foreign_keys: &[ForeignKey {
        columns: &["AnimalID"],
        references: "Chicken",
        referenced_columns: &["AnimalID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static DAIRY_RECORDS: TableSchema = TableSchema {
    name: "DairyRecords",
    columns: &[
        Column::new("AnimalID", ColumnType::Integer),
        Column::new("CollectionDate", ColumnType::Date),
        Column::new("Volume", ColumnType::Decimal),
    ],
    primary_key: &["AnimalID", "CollectionDate"],
    foreign_keys: &[ForeignKey {
        columns: &["AnimalID"],
        references: "Cow",
        referenced_columns: &["AnimalID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static CROP: TableSchema = TableSchema {
    name: "Crop",
    columns: &[
        Column::new("CropID", ColumnType::Integer),
        Column::new("cType", ColumnType::Text),
        Column::new("PlantDate", ColumnType::Date),
    ],
    primary_key: &["CropID"],
    foreign_keys: &[],
};

pub static PRODUCTS: TableSchema = TableSchema {
    name: "Products",
    columns: &[
        Column::new("ProductID", ColumnType::Integer),
        Column::new("CropID", ColumnType::Integer),
        Column::new("pName", ColumnType::Text),
        Column::new("Price", ColumnType::Decimal),
    ],
    primary_key: &["ProductID"],
    foreign_keys: &[ForeignKey {
        columns: &["CropID"],
        references: "Crop",
        referenced_columns: &["CropID"],
        on_delete: OnDelete::SetNull,
    }],
};

pub static CROP_MAINTENANCE: TableSchema = TableSchema {
    name: "CropMaintenance",
    columns: &[
        Column::new("CropID", ColumnType::Integer),
        Column::new("mDate", ColumnType::Date),
        Column::new("Activity", ColumnType::Text),
    ],
    primary_key: &["CropID", "mDate"],
    foreign_keys: &[ForeignKey {
        columns: &["CropID"],
        references: "Crop",
        referenced_columns: &["CropID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static ANIMAL_FEEDING: TableSchema = TableSchema {
    name: "AnimalFeeding",
    columns: &[
        Column::new("AnimalID", ColumnType::Integer),
        Column::new("fDate", ColumnType::Date),
        Column::new("FeedType", ColumnType::Text),
    ],
    primary_key: &["AnimalID", "fDate"],
    foreign_keys: &[ForeignKey {
        columns: &["AnimalID"],
        references: "Animal",
        referenced_columns: &["AnimalID"],
        on_delete: OnDelete::Cascade,
    }],
};

pub static PURCHASE: TableSchema = TableSchema {
    name: "Purchase",
    columns: &[
        Column::new("TransactionNumber", ColumnType::Integer),
        Column::new("ProductID", ColumnType::Integer),
        Column::new("Quantity", ColumnType::Integer),
    ],
    primary_key: &["TransactionNumber", "ProductID"],
    foreign_keys: &[
        ForeignKey {
            columns: &["TransactionNumber"],
            references: "Transaction",
            referenced_columns: &["TransactionNumber"],
            on_delete: OnDelete::Cascade,
        },
        ForeignKey {
            columns: &["ProductID"],
            references: "Products",
            referenced_columns: &["ProductID"],
            on_delete: OnDelete::Cascade,
        },
    ],
};

/// Every managed table.
pub static REGISTRY: &[&TableSchema] = &[
    &CUSTOMER,
    &FARMER,
    &SHIFT,
    &TRANSACTION,
    &STORAGE_BUILDING,
    &MACHINERY,
    &ANIMAL,
    &COW,
    &CHICKEN,
    &EGG_RECORDS,
    &DAIRY_RECORDS,
    &CROP,
    &PRODUCTS,
    &CROP_MAINTENANCE,
    &ANIMAL_FEEDING,
    &PURCHASE,
];

static BY_NAME: Lazy<HashMap<String, &'static TableSchema>> = Lazy::new(|| {
    REGISTRY
        .iter()
        .map(|t| (t.name.to_ascii_lowercase(), *t))
        .collect()
});

/// Case-insensitive table lookup.
pub fn lookup(name: &str) -> Option<&'static TableSchema> {
    BY_NAME.get(&name.to_ascii_lowercase()).copied()
}

/// Tables whose foreign keys reference `table` directly.
pub fn dependents(table: &TableSchema) -> Vec<&'static TableSchema> {
    REGISTRY
        .iter()
        .filter(|t| t.foreign_keys.iter().any(|fk| fk.references == table.name))
        .copied()
        .collect()
}

/// Drop order for re-initiating `table`: transitive dependents first
/// (deepest dependents before the tables they reference), `table` last.
/// Each table appears once even when reachable through multiple FKs.
pub fn drop_order(table: &'static TableSchema) -> Vec<&'static TableSchema> {
    let mut order = Vec::new();
    let mut seen = Vec::new();
    visit(table, &mut seen, &mut order);
    order
}

fn visit(
    table: &'static TableSchema,
    seen: &mut Vec<&'static str>,
    order: &mut Vec<&'static TableSchema>,
) {
    if seen.contains(&table.name) {
        return;
    }
    seen.push(table.name);
    for dep in dependents(table) {
        visit(dep, seen, order);
    }
    order.push(table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("storagebuilding").unwrap().name, "StorageBuilding");
        assert_eq!(lookup("TRANSACTION").unwrap().name, "Transaction");
        assert!(lookup("DropTable").is_none());
    }

    #[test]
    fn direct_dependents() {
        let deps = dependents(&FARMER);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "Shift");
    }

    #[test]
    fn customer_drop_order_reaches_purchase_through_transaction() {
        let names: Vec<_> = drop_order(&CUSTOMER).iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Purchase", "Transaction", "Customer"]);
    }

    #[test]
    fn animal_drop_order_covers_all_branches() {
        let names: Vec<_> = drop_order(&ANIMAL).iter().map(|t| t.name).collect();
        // Animal last; every record table before its parent.
        assert_eq!(*names.last().unwrap(), "Animal");
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("EggRecords") < pos("Chicken"));
        assert!(pos("DairyRecords") < pos("Cow"));
        assert!(pos("AnimalFeeding") < pos("Animal"));
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn table_without_dependents_drops_alone() {
        let names: Vec<_> = drop_order(&MACHINERY).iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Machinery"]);
    }

    #[test]
    fn shared_dependent_appears_once() {
        // Purchase references both Transaction and Products; dropping Crop
        // reaches it only via Products and must list it once.
        let names: Vec<_> = drop_order(&CROP).iter().map(|t| t.name).collect();
        assert_eq!(
            names.iter().filter(|n| **n == "Purchase").count(),
            1,
            "{names:?}"
        );
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("Purchase") < pos("Products"));
        assert!(pos("Products") < pos("Crop"));
    }
}
