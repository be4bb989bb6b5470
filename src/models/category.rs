/// The fixed category registry.
///
/// Declaration order is the registry order: the derived `Ord` drives map
/// iteration and every tie-break in the analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Category {
    Food,
    Shopping,
    Transport,
    Entertainment,
    Housing,
    Utilities,
    Healthcare,
    Education,
    Income,
    Other,
}

impl Category {
    pub(crate) fn id(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Shopping => "shopping",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Housing => "housing",
            Self::Utilities => "utilities",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Income => "income",
            Self::Other => "other",
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Food => "Food & Drinks",
            Self::Shopping => "Shopping",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Housing => "Housing",
            Self::Utilities => "Utilities",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Income => "Income",
            Self::Other => "Other",
        }
    }

    pub(crate) fn icon(&self) -> &'static str {
        match self {
            Self::Food => "🍔",
            Self::Shopping => "🛍️",
            Self::Transport => "🚗",
            Self::Entertainment => "🎬",
            Self::Housing => "🏠",
            Self::Utilities => "💡",
            Self::Healthcare => "🏥",
            Self::Education => "📚",
            Self::Income => "💰",
            Self::Other => "📋",
        }
    }

    /// Hex color used by presentation layers.
    pub(crate) fn color(&self) -> &'static str {
        match self {
            Self::Food => "#FF6384",
            Self::Shopping => "#36A2EB",
            Self::Transport => "#FFCE56",
            Self::Entertainment => "#4BC0C0",
            Self::Housing => "#9966FF",
            Self::Utilities => "#FF9F40",
            Self::Healthcare => "#C9CBCF",
            Self::Education => "#7FD2C0",
            Self::Income => "#8CD47E",
            Self::Other => "#A0A0A0",
        }
    }

    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Shopping,
            Self::Transport,
            Self::Entertainment,
            Self::Housing,
            Self::Utilities,
            Self::Healthcare,
            Self::Education,
            Self::Income,
            Self::Other,
        ]
    }

    /// Categories that can carry a monthly budget (everything but income).
    pub(crate) fn budgetable() -> impl Iterator<Item = Category> {
        Self::all().iter().copied().filter(|c| *c != Self::Income)
    }

    /// Strict lookup by id (case-insensitive).
    pub(crate) fn parse(id: &str) -> Option<Self> {
        let lower = id.trim().to_lowercase();
        Self::all().iter().copied().find(|c| c.id() == lower)
    }

    /// Lookup that never fails: absent or unknown ids fall back to `Other`.
    pub(crate) fn resolve(id: Option<&str>) -> Self {
        id.and_then(Self::parse).unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
