//! Built-in category catalog.
//!
//! Every user is expected to end up with these categories. The table is
//! compiled into the client and never changes at runtime; the bootstrap
//! controller and the sync manager materialize missing entries remotely and
//! the fallback read path serves them when the API is unreachable.

use crate::models::{CategoryKey, CategoryKind, NewCategory, Subcategory, UserCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSubcategory {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalCategory {
    pub name: &'static str,
    pub kind: CategoryKind,
    pub icon: &'static str,
    pub color: &'static str,
    pub order: i32,
    pub subcategories: &'static [CanonicalSubcategory],
}

impl CanonicalCategory {
    pub fn key(&self) -> CategoryKey {
        CategoryKey::new(self.kind, self.name)
    }

    pub fn find_subcategory(&self, name: &str) -> Option<&'static CanonicalSubcategory> {
        let subcategories: &'static [CanonicalSubcategory] = self.subcategories;
        subcategories
            .iter()
            .find(|s| s.name.to_lowercase() == name.to_lowercase())
    }

    /// Request body used when materializing this definition remotely.
    pub fn to_new_category(&self) -> NewCategory {
        NewCategory {
            name: self.name.to_string(),
            kind: self.kind,
            icon: self.icon.to_string(),
            color: self.color.to_string(),
            order: self.order,
            is_default: true,
            subcategories: self.owned_subcategories(),
        }
    }

    /// Local stand-in used when the remote list is unavailable. The id is
    /// synthetic and must never be sent back to the server.
    pub fn to_fallback(&self) -> UserCategory {
        UserCategory {
            id: format!("fallback-{}-{}", self.kind, self.order),
            name: self.name.to_string(),
            kind: self.kind,
            icon: self.icon.to_string(),
            color: self.color.to_string(),
            order: self.order,
            active: true,
            is_default: true,
            subcategories: Some(self.owned_subcategories()),
            usage_stats: None,
        }
    }

    fn owned_subcategories(&self) -> Vec<Subcategory> {
        self.subcategories
            .iter()
            .map(|s| Subcategory {
                name: s.name.to_string(),
                icon: s.icon.to_string(),
                color: s.color.to_string(),
            })
            .collect()
    }
}

pub fn all_definitions() -> &'static [CanonicalCategory] {
    CATALOG
}

pub fn definitions_by_kind(kind: CategoryKind) -> Vec<&'static CanonicalCategory> {
    CATALOG.iter().filter(|c| c.kind == kind).collect()
}

pub fn find_by_name(name: &str) -> Option<&'static CanonicalCategory> {
    let wanted = name.to_lowercase();
    CATALOG.iter().find(|c| c.name.to_lowercase() == wanted)
}

pub fn find_subcategory(
    category_name: &str,
    sub_name: &str,
) -> Option<&'static CanonicalSubcategory> {
    find_by_name(category_name)?.find_subcategory(sub_name)
}

pub fn find_by_key(key: &CategoryKey) -> Option<&'static CanonicalCategory> {
    CATALOG.iter().find(|c| &c.key() == key)
}

const fn sub(name: &'static str, icon: &'static str, color: &'static str) -> CanonicalSubcategory {
    CanonicalSubcategory { name, icon, color }
}

static CATALOG: &[CanonicalCategory] = &[
    // Income
    CanonicalCategory {
        name: "Salary",
        kind: CategoryKind::Income,
        icon: "briefcase",
        color: "#16a34a",
        order: 1,
        subcategories: &[
            sub("Monthly Salary", "calendar", "#22c55e"),
            sub("Overtime", "clock", "#4ade80"),
            sub("Thirteenth Salary", "gift", "#86efac"),
        ],
    },
    CanonicalCategory {
        name: "Freelance",
        kind: CategoryKind::Income,
        icon: "laptop",
        color: "#0d9488",
        order: 2,
        subcategories: &[
            sub("Projects", "folder-kanban", "#14b8a6"),
            sub("Consulting", "messages-square", "#2dd4bf"),
        ],
    },
    CanonicalCategory {
        name: "Investments",
        kind: CategoryKind::Income,
        icon: "trending-up",
        color: "#0891b2",
        order: 3,
        subcategories: &[
            sub("Dividends", "coins", "#06b6d4"),
            sub("Interest", "percent", "#22d3ee"),
            sub("Capital Gains", "line-chart", "#67e8f9"),
        ],
    },
    CanonicalCategory {
        name: "Rental Income",
        kind: CategoryKind::Income,
        icon: "building",
        color: "#2563eb",
        order: 4,
        subcategories: &[
            sub("Residential", "home", "#3b82f6"),
            sub("Commercial", "store", "#60a5fa"),
        ],
    },
    CanonicalCategory {
        name: "Bonus",
        kind: CategoryKind::Income,
        icon: "award",
        color: "#7c3aed",
        order: 5,
        subcategories: &[
            sub("Performance Bonus", "target", "#8b5cf6"),
            sub("Profit Sharing", "pie-chart", "#a78bfa"),
        ],
    },
    CanonicalCategory {
        name: "Gifts Received",
        kind: CategoryKind::Income,
        icon: "gift",
        color: "#db2777",
        order: 6,
        subcategories: &[
            sub("Family", "users", "#ec4899"),
            sub("Friends", "heart-handshake", "#f472b6"),
        ],
    },
    CanonicalCategory {
        name: "Other Income",
        kind: CategoryKind::Income,
        icon: "plus-circle",
        color: "#65a30d",
        order: 7,
        subcategories: &[
            sub("Refunds", "rotate-ccw", "#84cc16"),
            sub("Sales", "tag", "#a3e635"),
        ],
    },
    // Expense
    CanonicalCategory {
        name: "Food",
        kind: CategoryKind::Expense,
        icon: "utensils",
        color: "#ea580c",
        order: 1,
        subcategories: &[
            sub("Groceries", "shopping-basket", "#f97316"),
            sub("Restaurants", "utensils-crossed", "#fb923c"),
            sub("Delivery", "bike", "#fdba74"),
        ],
    },
    CanonicalCategory {
        name: "Transportation",
        kind: CategoryKind::Expense,
        icon: "car",
        color: "#2563eb",
        order: 2,
        subcategories: &[
            sub("Fuel", "fuel", "#3b82f6"),
            sub("Public Transit", "bus", "#60a5fa"),
            sub("Ride Sharing", "car-taxi-front", "#93c5fd"),
            sub("Maintenance", "wrench", "#1d4ed8"),
        ],
    },
    CanonicalCategory {
        name: "Housing",
        kind: CategoryKind::Expense,
        icon: "home",
        color: "#7c3aed",
        order: 3,
        subcategories: &[
            sub("Rent", "key", "#8b5cf6"),
            sub("Mortgage", "landmark", "#a78bfa"),
            sub("Repairs", "hammer", "#c4b5fd"),
        ],
    },
    CanonicalCategory {
        name: "Utilities",
        kind: CategoryKind::Expense,
        icon: "lightbulb",
        color: "#ca8a04",
        order: 4,
        subcategories: &[
            sub("Electricity", "zap", "#eab308"),
            sub("Water", "droplet", "#facc15"),
            sub("Internet", "wifi", "#fde047"),
            sub("Phone", "smartphone", "#a16207"),
        ],
    },
    CanonicalCategory {
        name: "Health",
        kind: CategoryKind::Expense,
        icon: "heart-pulse",
        color: "#dc2626",
        order: 5,
        subcategories: &[
            sub("Pharmacy", "pill", "#ef4444"),
            sub("Doctor", "stethoscope", "#f87171"),
            sub("Health Insurance", "shield-plus", "#fca5a5"),
        ],
    },
    CanonicalCategory {
        name: "Education",
        kind: CategoryKind::Expense,
        icon: "graduation-cap",
        color: "#0891b2",
        order: 6,
        subcategories: &[
            sub("Tuition", "school", "#06b6d4"),
            sub("Books", "book-open", "#22d3ee"),
            sub("Courses", "monitor-play", "#67e8f9"),
        ],
    },
    CanonicalCategory {
        name: "Entertainment",
        kind: CategoryKind::Expense,
        icon: "gamepad-2",
        color: "#db2777",
        order: 7,
        subcategories: &[
            sub("Movies", "clapperboard", "#ec4899"),
            sub("Games", "joystick", "#f472b6"),
            sub("Events", "ticket", "#f9a8d4"),
        ],
    },
    CanonicalCategory {
        name: "Shopping",
        kind: CategoryKind::Expense,
        icon: "shopping-bag",
        color: "#9333ea",
        order: 8,
        subcategories: &[
            sub("Electronics", "cpu", "#a855f7"),
            sub("Home Goods", "sofa", "#c084fc"),
        ],
    },
    CanonicalCategory {
        name: "Clothing",
        kind: CategoryKind::Expense,
        icon: "shirt",
        color: "#c026d3",
        order: 9,
        subcategories: &[
            sub("Apparel", "shirt", "#d946ef"),
            sub("Shoes", "footprints", "#e879f9"),
            sub("Accessories", "watch", "#f0abfc"),
        ],
    },
    CanonicalCategory {
        name: "Personal Care",
        kind: CategoryKind::Expense,
        icon: "sparkles",
        color: "#e11d48",
        order: 10,
        subcategories: &[
            sub("Hair", "scissors", "#f43f5e"),
            sub("Cosmetics", "brush", "#fb7185"),
            sub("Gym", "dumbbell", "#fda4af"),
        ],
    },
    CanonicalCategory {
        name: "Travel",
        kind: CategoryKind::Expense,
        icon: "plane",
        color: "#0284c7",
        order: 11,
        subcategories: &[
            sub("Flights", "plane-takeoff", "#0ea5e9"),
            sub("Lodging", "bed", "#38bdf8"),
            sub("Tours", "map", "#7dd3fc"),
        ],
    },
    CanonicalCategory {
        name: "Subscriptions",
        kind: CategoryKind::Expense,
        icon: "repeat",
        color: "#4f46e5",
        order: 12,
        subcategories: &[
            sub("Streaming", "tv", "#6366f1"),
            sub("Software", "app-window", "#818cf8"),
            sub("Memberships", "id-card", "#a5b4fc"),
        ],
    },
    CanonicalCategory {
        name: "Pets",
        kind: CategoryKind::Expense,
        icon: "paw-print",
        color: "#b45309",
        order: 13,
        subcategories: &[
            sub("Pet Food", "bone", "#d97706"),
            sub("Veterinary", "syringe", "#f59e0b"),
        ],
    },
    CanonicalCategory {
        name: "Taxes & Fees",
        kind: CategoryKind::Expense,
        icon: "receipt",
        color: "#475569",
        order: 14,
        subcategories: &[
            sub("Income Tax", "landmark", "#64748b"),
            sub("Property Tax", "building-2", "#94a3b8"),
            sub("Bank Fees", "credit-card", "#cbd5e1"),
        ],
    },
    CanonicalCategory {
        name: "Insurance",
        kind: CategoryKind::Expense,
        icon: "shield",
        color: "#0f766e",
        order: 15,
        subcategories: &[
            sub("Car Insurance", "car", "#14b8a6"),
            sub("Home Insurance", "house", "#2dd4bf"),
            sub("Life Insurance", "heart", "#5eead4"),
        ],
    },
    CanonicalCategory {
        name: "Other Expenses",
        kind: CategoryKind::Expense,
        icon: "more-horizontal",
        color: "#6b7280",
        order: 16,
        subcategories: &[
            sub("Donations", "hand-heart", "#9ca3af"),
            sub("Miscellaneous", "package", "#d1d5db"),
        ],
    },
];
