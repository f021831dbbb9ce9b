use crate::filter::Filter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the backend can evaluate natively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCapabilities {
    pub comparisons: bool,
    pub between: bool,
    pub like: bool,
    pub in_list: bool,
    pub null_checks: bool,
    /// AND / OR / NOT.
    pub logical: bool,
    /// Function names (case-insensitive) allowed in `Filter::Function`.
    pub functions: BTreeSet<String>,
}

impl Default for FilterCapabilities {
    fn default() -> Self {
        Self {
            comparisons: true,
            between: true,
            like: true,
            in_list: true,
            null_checks: true,
            logical: true,
            functions: BTreeSet::new(),
        }
    }
}

impl FilterCapabilities {
    pub fn with_function(mut self, name: &str) -> Self {
        self.functions.insert(name.to_ascii_lowercase());
        self
    }

    fn supports_leaf(&self, filter: &Filter) -> bool {
        match filter {
            Filter::Include | Filter::Exclude => true,
            Filter::Compare { .. } => self.comparisons,
            Filter::Between { .. } => self.between,
            Filter::Like { .. } => self.like,
            Filter::In { .. } => self.in_list,
            Filter::IsNull { .. } => self.null_checks,
            Filter::Function { name, .. } => {
                self.functions.iter().any(|f| f.eq_ignore_ascii_case(name))
            }
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => false,
        }
    }
}

/// The two halves of a filter after splitting. `pushable AND residual` is
/// equivalent to the original filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFilter {
    pub pushable: Filter,
    pub residual: Filter,
}

impl SplitFilter {
    fn pushable(filter: Filter) -> Self {
        Self {
            pushable: filter,
            residual: Filter::Include,
        }
    }

    fn residual(filter: Filter) -> Self {
        Self {
            pushable: Filter::Include,
            residual: filter,
        }
    }

    pub fn is_fully_pushable(&self) -> bool {
        self.residual.is_include()
    }
}

pub trait FilterSplitter: Send + Sync {
    fn split(&self, filter: &Filter) -> SplitFilter;
}

#[derive(Debug, Clone, Default)]
pub struct CapabilitiesSplitter {
    capabilities: FilterCapabilities,
}

impl CapabilitiesSplitter {
    pub fn new(capabilities: FilterCapabilities) -> Self {
        Self { capabilities }
    }
}

impl FilterSplitter for CapabilitiesSplitter {
    fn split(&self, filter: &Filter) -> SplitFilter {
        match filter {
            Filter::And(children) if self.capabilities.logical => {
                let (pushable, residual): (Vec<_>, Vec<_>) = children
                    .iter()
                    .map(|child| {
                        let split = self.split(child);
                        (split.pushable, split.residual)
                    })
                    .unzip();
                SplitFilter {
                    pushable: Filter::and(pushable),
                    residual: Filter::and(residual),
                }
            }
            // OR and NOT cannot be partially evaluated.
            Filter::Or(children) if self.capabilities.logical => {
                if children.iter().all(|c| self.split(c).is_fully_pushable()) {
                    SplitFilter::pushable(filter.clone())
                } else {
                    SplitFilter::residual(filter.clone())
                }
            }
            Filter::Not(inner) if self.capabilities.logical => {
                if self.split(inner).is_fully_pushable() {
                    SplitFilter::pushable(filter.clone())
                } else {
                    SplitFilter::residual(filter.clone())
                }
            }
            leaf if self.capabilities.supports_leaf(leaf) => SplitFilter::pushable(leaf.clone()),
            other => SplitFilter::residual(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    fn like() -> Filter {
        Filter::Like {
            property: "name".into(),
            pattern: "B%".into(),
        }
    }

    #[test]
    fn everything_pushable_by_default() {
        let filter = Filter::and(vec![Filter::eq("a", Value::Int(1)), like()]);
        let split = CapabilitiesSplitter::default().split(&filter);
        assert!(split.is_fully_pushable());
        assert_eq!(split.pushable, filter);
    }

    #[test]
    fn and_is_split_per_child() {
        let splitter = CapabilitiesSplitter::new(FilterCapabilities {
            like: false,
            ..Default::default()
        });
        let eq = Filter::eq("a", Value::Int(1));
        let split = splitter.split(&Filter::and(vec![eq.clone(), like()]));
        assert_eq!(split.pushable, eq);
        assert_eq!(split.residual, like());
    }

    #[test]
    fn or_stays_whole() {
        let splitter = CapabilitiesSplitter::new(FilterCapabilities {
            like: false,
            ..Default::default()
        });
        let filter = Filter::or(vec![Filter::eq("a", Value::Int(1)), like()]);
        let split = splitter.split(&filter);
        assert_eq!(split.pushable, Filter::Include);
        assert_eq!(split.residual, filter);
    }

    #[test]
    fn functions_need_declaring() {
        let filter = Filter::Function {
            name: "ST_Intersects".into(),
            property: "geom".into(),
            args: vec![],
        };
        assert!(!CapabilitiesSplitter::default().split(&filter).is_fully_pushable());

        let splitter =
            CapabilitiesSplitter::new(FilterCapabilities::default().with_function("st_intersects"));
        assert!(splitter.split(&filter).is_fully_pushable());
    }
}
