//! Entity records of the notebook and their plugins.

pub mod animal;
pub mod farm;
pub mod farm_product;
pub mod livestock_care;
pub mod note;

pub use animal::{Animal, AnimalPlugin, AnimalType};
pub use farm::{Farm, FarmPlugin, FarmType};
pub use farm_product::{FarmProduct, FarmProductPlugin};
pub use livestock_care::{CareType, LivestockCare, LivestockCarePlugin};
pub use note::{Note, NotePlugin};

pub const NOTES_SLOT: &str = "notes";
pub const FARMS_SLOT: &str = "farms";
pub const FARM_PRODUCTS_SLOT: &str = "farm_products";
pub const LIVESTOCK_SLOT: &str = "livestock";
pub const LIVESTOCK_CARE_SLOT: &str = "livestock_care";

pub const ALL_SLOTS: [&str; 5] = [
    NOTES_SLOT,
    FARMS_SLOT,
    FARM_PRODUCTS_SLOT,
    LIVESTOCK_SLOT,
    LIVESTOCK_CARE_SLOT,
];

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
