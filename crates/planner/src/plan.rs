use crate::filter::Filter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Property {
        name: String,
        #[serde(default)]
        order: SortOrder,
    },
    /// Primary-key order.
    Natural,
    /// Reverse primary-key order.
    Reverse,
}

impl SortBy {
    pub fn asc(name: &str) -> Self {
        SortBy::Property {
            name: name.to_string(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(name: &str) -> Self {
        SortBy::Property {
            name: name.to_string(),
            order: SortOrder::Desc,
        }
    }

    pub fn property(&self) -> Option<(&str, SortOrder)> {
        match self {
            SortBy::Property { name, order } => Some((name, *order)),
            SortBy::Natural | SortBy::Reverse => None,
        }
    }
}

/// Property sort keys of a sort list; natural/reverse entries are skipped.
pub fn sort_properties(sort_by: &[SortBy]) -> Vec<(&str, SortOrder)> {
    sort_by.iter().filter_map(SortBy::property).collect()
}

/// One dependent table in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinStep {
    pub table: String,
    /// Column on the previous table in the chain.
    pub foreign_key: String,
    /// Column on this table.
    pub joining_key: String,
    pub sort_by: Vec<SortBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl JoinStep {
    pub fn new(table: &str, foreign_key: &str, joining_key: &str) -> Self {
        Self {
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            joining_key: joining_key.to_string(),
            sort_by: Vec::new(),
            filter: None,
        }
    }

    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort_by.push(sort);
        self
    }

    pub fn sort_keys(&self) -> Vec<(&str, SortOrder)> {
        sort_properties(&self.sort_by)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPlan {
    pub table: String,
    #[serde(default)]
    pub joins: Vec<JoinStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub sort_by: Vec<SortBy>,
    /// Projected root columns. `None` selects every column of the root table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Filter rows directly instead of keeping whole sibling groups.
    #[serde(default)]
    pub subset: bool,
    /// Repeat the root primary key as `PARENT_TABLE_PKEY_<i>` columns.
    #[serde(default)]
    pub expose_parent_key: bool,
}

impl JoinPlan {
    pub fn builder(table: &str) -> JoinPlanBuilder {
        JoinPlanBuilder {
            plan: JoinPlan {
                table: table.to_string(),
                joins: Vec::new(),
                filter: None,
                sort_by: Vec::new(),
                attributes: None,
                limit: None,
                offset: None,
                subset: false,
                expose_parent_key: false,
            },
        }
    }

    pub fn has_joins(&self) -> bool {
        !self.joins.is_empty()
    }

    pub fn sort_keys(&self) -> Vec<(&str, SortOrder)> {
        sort_properties(&self.sort_by)
    }

    /// Table the filter and group paging apply to: the last step, or the root.
    pub fn target_table(&self) -> &str {
        self.joins.last().map_or(&self.table, |step| &step.table)
    }

    pub fn target_sort_keys(&self) -> Vec<(&str, SortOrder)> {
        match self.joins.last() {
            Some(step) => step.sort_keys(),
            None => self.sort_keys(),
        }
    }

    /// Stable fingerprint used to correlate log lines.
    pub fn hash(&self) -> String {
        let serialized = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        format!("{:x}", md5::compute(serialized))
    }
}

#[derive(Debug, Clone)]
pub struct JoinPlanBuilder {
    plan: JoinPlan,
}

impl JoinPlanBuilder {
    pub fn join(mut self, step: JoinStep) -> Self {
        self.plan.joins.push(step);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.plan.filter = Some(filter);
        self
    }

    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.plan.sort_by.push(sort);
        self
    }

    pub fn attributes(mut self, attributes: &[&str]) -> Self {
        self.plan.attributes = Some(attributes.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.plan.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.plan.offset = Some(offset);
        self
    }

    pub fn subset(mut self, subset: bool) -> Self {
        self.plan.subset = subset;
        self
    }

    pub fn expose_parent_key(mut self, expose: bool) -> Self {
        self.plan.expose_parent_key = expose;
        self
    }

    pub fn build(self) -> JoinPlan {
        self.plan
    }
}
