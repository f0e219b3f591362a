//! Hub type strategy table.
//!
//! Every hub type is one row: its path dimensions, request-time minimum
//! population and group cap. Adding a hub type means adding a variant and a
//! row; nothing else branches on the type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;
use crate::facets::normalize::Dimension;

/// Closed set of hub kinds, named by their path dimensions in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubType {
    Line,
    Category,
    Formula,
    Engine,
    ModelCode,
    LineCategory,
    LineFormula,
    LineEngine,
    CategoryFormula,
    EngineCategory,
    LineCategoryFormula,
    CategoryLineFormula,
    CategoryEngine,
    CategoryLine,
}

/// Which configured cap bounds a hub type's group count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapClass {
    SingleDimension,
    Combination,
}

/// One row of the strategy table.
#[derive(Debug, Clone, Copy)]
pub struct HubTypeRow {
    pub hub_type: HubType,
    pub name: &'static str,
    pub dimensions: &'static [Dimension],
    /// Request-time population floor for the allow-list.
    pub min_count: u64,
    pub cap: CapClass,
    /// Single-dimension type whose allow-list must also admit this key's
    /// value in that dimension.
    pub parent: Option<HubType>,
    /// Title pattern; `{0}`, `{1}`, `{2}` are replaced by facet labels.
    pub title: &'static str,
}

use CapClass::{Combination, SingleDimension};
use Dimension::{Category, Engine, Formula, Line, ModelCode};

static TABLE: [HubTypeRow; 14] = [
    HubTypeRow {
        hub_type: HubType::Line,
        name: "line",
        dimensions: &[Line],
        min_count: 2,
        cap: SingleDimension,
        parent: None,
        title: "{0} trucks",
    },
    HubTypeRow {
        hub_type: HubType::Category,
        name: "category",
        dimensions: &[Category],
        min_count: 2,
        cap: SingleDimension,
        parent: None,
        title: "{0}",
    },
    HubTypeRow {
        hub_type: HubType::Formula,
        name: "formula",
        dimensions: &[Formula],
        min_count: 2,
        cap: SingleDimension,
        parent: None,
        title: "{0} trucks",
    },
    HubTypeRow {
        hub_type: HubType::Engine,
        name: "engine",
        dimensions: &[Engine],
        min_count: 2,
        cap: SingleDimension,
        parent: None,
        title: "Trucks with {0} engine",
    },
    HubTypeRow {
        hub_type: HubType::ModelCode,
        name: "model_code",
        dimensions: &[ModelCode],
        min_count: 1,
        cap: Combination,
        parent: None,
        title: "Model {0}",
    },
    HubTypeRow {
        hub_type: HubType::LineCategory,
        name: "line_category",
        dimensions: &[Line, Category],
        min_count: 2,
        cap: Combination,
        parent: None,
        title: "{0} {1}",
    },
    HubTypeRow {
        hub_type: HubType::LineFormula,
        name: "line_formula",
        dimensions: &[Line, Formula],
        min_count: 1,
        cap: Combination,
        parent: None,
        title: "{0} {1}",
    },
    HubTypeRow {
        hub_type: HubType::LineEngine,
        name: "line_engine",
        dimensions: &[Line, Engine],
        min_count: 2,
        cap: Combination,
        parent: None,
        title: "{0} with {1} engine",
    },
    HubTypeRow {
        hub_type: HubType::CategoryFormula,
        name: "category_formula",
        dimensions: &[Category, Formula],
        min_count: 1,
        cap: Combination,
        parent: None,
        title: "{0} {1}",
    },
    HubTypeRow {
        hub_type: HubType::EngineCategory,
        name: "engine_category",
        dimensions: &[Engine, Category],
        min_count: 2,
        cap: Combination,
        parent: None,
        title: "{1} with {0} engine",
    },
    HubTypeRow {
        hub_type: HubType::LineCategoryFormula,
        name: "line_category_formula",
        dimensions: &[Line, Category, Formula],
        min_count: 2,
        cap: Combination,
        parent: None,
        title: "{0} {1} {2}",
    },
    HubTypeRow {
        hub_type: HubType::CategoryLineFormula,
        name: "category_line_formula",
        dimensions: &[Category, Line, Formula],
        min_count: 1,
        cap: Combination,
        parent: None,
        title: "{0} {1} {2}",
    },
    HubTypeRow {
        hub_type: HubType::CategoryEngine,
        name: "category_engine",
        dimensions: &[Category, Engine],
        min_count: 1,
        cap: Combination,
        parent: Some(HubType::Engine),
        title: "{0} with {1} engine",
    },
    HubTypeRow {
        hub_type: HubType::CategoryLine,
        name: "category_line",
        dimensions: &[Category, Line],
        min_count: 1,
        cap: Combination,
        parent: None,
        title: "{0} {1}",
    },
];

impl HubType {
    /// All hub types in table order.
    pub fn all() -> impl Iterator<Item = HubType> {
        TABLE.iter().map(|row| row.hub_type)
    }

    /// The strategy row for this hub type.
    pub fn row(self) -> &'static HubTypeRow {
        // Table order mirrors declaration order.
        &TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.row().name
    }

    pub fn dimensions(self) -> &'static [Dimension] {
        self.row().dimensions
    }

    pub fn min_count(self) -> u64 {
        self.row().min_count
    }

    pub fn parent(self) -> Option<HubType> {
        self.row().parent
    }

    /// Group cap from the configured thresholds.
    pub fn cap(self, thresholds: &ThresholdConfig) -> usize {
        match self.row().cap {
            SingleDimension => thresholds.single_dimension_cap,
            Combination => thresholds.combo_cap,
        }
    }

    /// Hub type addressed by an ordered dimension sequence.
    pub fn from_dimensions(dimensions: &[Dimension]) -> Option<Self> {
        TABLE
            .iter()
            .find(|row| row.dimensions == dimensions)
            .map(|row| row.hub_type)
    }

    /// Sitemap section slug, e.g. `line-category`.
    pub fn section_name(self) -> String {
        self.name().replace('_', "-")
    }

    pub fn from_section_name(section: &str) -> Option<Self> {
        Self::all().find(|t| t.section_name() == section)
    }

    /// Page title built from facet labels.
    pub fn title(self, labels: &[String], in_stock: bool) -> String {
        let mut title = self.row().title.to_string();
        for (i, label) in labels.iter().enumerate() {
            title = title.replace(&format!("{{{}}}", i), label);
        }
        if in_stock {
            title.push_str(" in stock");
        }
        title
    }
}

impl fmt::Display for HubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HubType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::all()
            .find(|t| t.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown hub type {:?}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_variants() {
        for (i, t) in HubType::all().enumerate() {
            assert_eq!(t as usize, i, "{} is out of order", t);
            assert_eq!(t.row().hub_type, t);
        }
    }

    #[test]
    fn test_dimension_sequences_are_unique() {
        let all: Vec<_> = HubType::all().collect();
        for t in &all {
            assert_eq!(HubType::from_dimensions(t.dimensions()), Some(*t));
            assert!((1..=3).contains(&t.dimensions().len()));
        }
    }

    #[test]
    fn test_single_product_floors() {
        assert_eq!(HubType::CategoryEngine.min_count(), 1);
        assert_eq!(HubType::CategoryLine.min_count(), 1);
        assert_eq!(HubType::LineCategory.min_count(), 2);
        assert_eq!(HubType::Engine.min_count(), 2);
        assert_eq!(HubType::CategoryLineFormula.min_count(), 1);
        assert_eq!(HubType::LineFormula.min_count(), 1);
        assert_eq!(HubType::CategoryFormula.min_count(), 1);
        assert_eq!(HubType::EngineCategory.min_count(), 2);
        assert_eq!(HubType::LineCategoryFormula.min_count(), 2);
    }

    #[test]
    fn test_parent_is_a_single_dimension_of_the_child() {
        assert_eq!(HubType::CategoryEngine.parent(), Some(HubType::Engine));
        for t in HubType::all() {
            if let Some(parent) = t.parent() {
                assert_eq!(parent.dimensions().len(), 1);
                assert!(t.dimensions().contains(&parent.dimensions()[0]));
            }
        }
    }

    #[test]
    fn test_caps_follow_thresholds() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(HubType::Engine.cap(&thresholds), 20);
        assert_eq!(HubType::LineEngine.cap(&thresholds), 50);
        assert_eq!(HubType::ModelCode.cap(&thresholds), 50);
    }

    #[test]
    fn test_names_parse_back() {
        for t in HubType::all() {
            assert_eq!(t.name().parse::<HubType>().unwrap(), t);
            assert_eq!(HubType::from_section_name(&t.section_name()), Some(t));
        }
        assert_eq!("line-category".parse::<HubType>().unwrap(), HubType::LineCategory);
        assert!("wheels".parse::<HubType>().is_err());
    }

    #[test]
    fn test_title() {
        let labels = vec!["WP13.550E501".to_string()];
        assert_eq!(HubType::Engine.title(&labels, false), "Trucks with WP13.550E501 engine");
        assert_eq!(
            HubType::Engine.title(&labels, true),
            "Trucks with WP13.550E501 engine in stock"
        );
    }
}
