//! Built-in catalog - common lifts offered before the user defines their own

use crate::db::Category;

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub is_barbell: bool, // loaded with plates on an olympic bar
}

pub const CATALOG: &[CatalogEntry] = &[
    // Chest
    CatalogEntry {
        id: "barbell_bench",
        name: "Bench Press",
        category: Category::Chest,
        is_barbell: true,
    },
    CatalogEntry {
        id: "incline_bench",
        name: "Incline Bench Press",
        category: Category::Chest,
        is_barbell: true,
    },
    CatalogEntry {
        id: "dumbbell_fly",
        name: "Dumbbell Fly",
        category: Category::Chest,
        is_barbell: false,
    },
    // Back
    CatalogEntry {
        id: "deadlift",
        name: "Deadlift",
        category: Category::Back,
        is_barbell: true,
    },
    CatalogEntry {
        id: "barbell_row",
        name: "Barbell Row",
        category: Category::Back,
        is_barbell: true,
    },
    CatalogEntry {
        id: "pull_up",
        name: "Pull Up",
        category: Category::Back,
        is_barbell: false,
    },
    CatalogEntry {
        id: "lat_pulldown",
        name: "Lat Pulldown",
        category: Category::Back,
        is_barbell: false,
    },
    // Legs
    CatalogEntry {
        id: "back_squat",
        name: "Squat",
        category: Category::Legs,
        is_barbell: true,
    },
    CatalogEntry {
        id: "romanian_deadlift",
        name: "Romanian Deadlift",
        category: Category::Legs,
        is_barbell: true,
    },
    CatalogEntry {
        id: "leg_press",
        name: "Leg Press",
        category: Category::Legs,
        is_barbell: false,
    },
    CatalogEntry {
        id: "calf_raise",
        name: "Calf Raise",
        category: Category::Legs,
        is_barbell: false,
    },
    // Shoulders
    CatalogEntry {
        id: "overhead_press",
        name: "Overhead Press",
        category: Category::Shoulders,
        is_barbell: true,
    },
    CatalogEntry {
        id: "lateral_raise",
        name: "Lateral Raise",
        category: Category::Shoulders,
        is_barbell: false,
    },
    // Arms
    CatalogEntry {
        id: "barbell_curl",
        name: "Barbell Curl",
        category: Category::Arms,
        is_barbell: true,
    },
    CatalogEntry {
        id: "tricep_pushdown",
        name: "Tricep Pushdown",
        category: Category::Arms,
        is_barbell: false,
    },
    // Core
    CatalogEntry {
        id: "plank",
        name: "Plank",
        category: Category::Core,
        is_barbell: false,
    },
    CatalogEntry {
        id: "hanging_leg_raise",
        name: "Hanging Leg Raise",
        category: Category::Core,
        is_barbell: false,
    },
    // Cardio
    CatalogEntry {
        id: "rowing_machine",
        name: "Rowing Machine",
        category: Category::Cardio,
        is_barbell: false,
    },
    CatalogEntry {
        id: "treadmill",
        name: "Treadmill",
        category: Category::Cardio,
        is_barbell: false,
    },
];

pub fn find_entry(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

pub fn entries_in(category: Category) -> Vec<&'static CatalogEntry> {
    CATALOG.iter().filter(|e| e.category == category).collect()
}
