use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{DerivedMax, FieldKind, FieldSpec, Model, Record};
use crate::{
    analytics::Highlight,
    forms::{Draft, ValidationError},
    middleware::Portal,
    models::MaterialStatus,
    repository::{
        postgres::{PgModel, PgQuery},
        Repositories, Repository,
    },
};

pub const MATERIAL_CATEGORIES: &[&str] = &[
    "Aluminum",
    "Steel",
    "Titanium",
    "Composite Materials",
    "Fasteners",
    "Electronics",
];

pub const UNITS: &[&str] = &["kg", "lbs", "pieces", "meters", "feet", "liters"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RawMaterial {
    // Column spelling is inherited from the legacy schema.
    #[serde(rename = "Marterial_Name")]
    #[sqlx(rename = "Marterial_Name")]
    pub material_name: String,
    #[serde(rename = "Material_Code")]
    #[sqlx(rename = "Material_Code")]
    pub material_code: String,
    #[serde(rename = "Category")]
    #[sqlx(rename = "Category")]
    pub category: String,
    #[serde(rename = "Quantity")]
    #[sqlx(rename = "Quantity")]
    pub quantity: i32,
    #[serde(rename = "Unit")]
    #[sqlx(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Minimum_Stock")]
    #[sqlx(rename = "Minimum_Stock")]
    pub minimum_stock: i32,
    #[serde(rename = "Maximum_Stock")]
    #[sqlx(rename = "Maximum_Stock")]
    pub maximum_stock: i32,
    #[serde(rename = "Supplier")]
    #[sqlx(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Cost_Per_Unit")]
    #[sqlx(rename = "Cost_Per_Unit")]
    pub cost_per_unit: Decimal,
    #[serde(rename = "Status")]
    #[sqlx(rename = "Status", try_from = "String")]
    pub status: MaterialStatus,
}

impl Model for RawMaterial {
    const LABEL: &'static str = "Raw Material";
    const PLURAL: &'static str = "raw materials";
    const API_PATH: &'static str = "rawmaterials";
    const SLUG: &'static str = "rawmaterials";
    const TABLE: &'static str = "raw_materials";
    const PORTAL: Portal = Portal::RawMaterials;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("Marterial_Name", "Material Name", FieldKind::Text)
            .aliases(&["Material_Name", "materialName", "name"]),
        FieldSpec::new("Material_Code", "Material Code", FieldKind::Text)
            .aliases(&["code", "materialCode"]),
        FieldSpec::new("Category", "Category", FieldKind::Suggest(MATERIAL_CATEGORIES))
            .aliases(&["category"]),
        FieldSpec::new("Quantity", "Quantity", FieldKind::Count)
            .aliases(&["quantity", "currentStock"]),
        FieldSpec::new("Unit", "Unit", FieldKind::Suggest(UNITS)).aliases(&["unit"]),
        FieldSpec::new("Minimum_Stock", "Minimum Stock", FieldKind::Count)
            .aliases(&["minStock", "minThreshold"]),
        FieldSpec::new("Maximum_Stock", "Maximum Stock", FieldKind::Count)
            .aliases(&["maxStock", "maxThreshold"]),
        FieldSpec::new("Supplier", "Supplier", FieldKind::Text).aliases(&["supplier"]),
        FieldSpec::new("Cost_Per_Unit", "Cost per Unit", FieldKind::Decimal)
            .aliases(&["costPerUnit", "unitCost"]),
        FieldSpec::new("Status", "Status", FieldKind::Choice(MaterialStatus::LABELS))
            .aliases(&["status"]),
    ];
    const LIST_COLUMNS: &'static [&'static str] = &[
        "Material_Code",
        "Marterial_Name",
        "Category",
        "Quantity",
        "Unit",
        "Cost_Per_Unit",
        "Status",
    ];
    const CATEGORY_FIELD: &'static str = "Status";
    const DERIVED_MAX: Option<DerivedMax> = Some(DerivedMax {
        base: "Minimum_Stock",
        max: "Maximum_Stock",
        multiple: 5,
    });

    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.raw_materials.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.material_name.as_str(),
            self.material_code.as_str(),
            self.supplier.as_str(),
        ]
    }

    fn category(&self) -> &str {
        self.status.as_str()
    }

    fn status(&self) -> Option<&'static str> {
        Some(self.status.as_str())
    }

    fn to_draft(&self) -> Draft {
        Draft::new()
            .with("Marterial_Name", &self.material_name)
            .with("Material_Code", &self.material_code)
            .with("Category", &self.category)
            .with("Quantity", self.quantity.to_string())
            .with("Unit", &self.unit)
            .with("Minimum_Stock", self.minimum_stock.to_string())
            .with("Maximum_Stock", self.maximum_stock.to_string())
            .with("Supplier", &self.supplier)
            .with("Cost_Per_Unit", self.cost_per_unit.to_string())
            .with("Status", self.status.as_str())
    }

    fn from_draft(draft: &Draft) -> Result<Self, ValidationError> {
        Ok(Self {
            material_name: draft.text("Marterial_Name")?,
            material_code: draft.text("Material_Code")?,
            category: draft.text("Category")?,
            quantity: draft.count("Quantity")?,
            unit: draft.text("Unit")?,
            minimum_stock: draft.count("Minimum_Stock")?,
            maximum_stock: draft.count("Maximum_Stock")?,
            supplier: draft.text("Supplier")?,
            cost_per_unit: draft.decimal("Cost_Per_Unit")?,
            status: draft.choice("Status")?,
        })
    }

    fn legacy_value(column: &str, value: &str) -> Option<&'static str> {
        match (column, value) {
            ("Status", "In Stock") => Some(MaterialStatus::Available.as_str()),
            ("Status", "Expired") => Some(MaterialStatus::OutOfStock.as_str()),
            _ => None,
        }
    }

    fn defaults() -> Draft {
        Draft::new()
            .with("Unit", "kg")
            .with("Status", MaterialStatus::Available.as_str())
    }

    fn highlights(records: &[Record<Self>]) -> Vec<Highlight> {
        let value = records.iter().try_fold(Decimal::ZERO, |total, r| {
            r.fields
                .cost_per_unit
                .checked_mul(Decimal::from(r.fields.quantity))
                .and_then(|line| total.checked_add(line))
        });
        let low = records
            .iter()
            .filter(|r| r.fields.quantity < r.fields.minimum_stock)
            .count();

        vec![
            Highlight::new(
                "Inventory value",
                value.map_or_else(|| "out of range".to_string(), |v| format!("{:.2}", v)),
            ),
            Highlight::new("Below minimum stock", low.to_string()),
        ]
    }
}

impl PgModel for RawMaterial {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.material_name)
            .bind(&self.material_code)
            .bind(&self.category)
            .bind(self.quantity)
            .bind(&self.unit)
            .bind(self.minimum_stock)
            .bind(self.maximum_stock)
            .bind(&self.supplier)
            .bind(self.cost_per_unit)
            .bind(self.status.as_str())
    }
}
