use crate::{
    condition::{
        node::{Group, NodeRef},
        operator::{Logic, SortDir},
    },
    error::ModelError,
};
use serde::{Deserialize, Serialize};

/// One ordering instruction. Entries keep their insertion order, which is
/// also their priority in the emitted ORDER BY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    #[serde(alias = "sort")]
    pub field: String,
    #[serde(alias = "dir", default)]
    pub direction: SortDir,
}

impl SortEntry {
    pub fn new(field: impl Into<String>, direction: SortDir) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Filter, sort and pagination description for a collection query.
///
/// `Clone` is shallow: the clone owns its own sort list but shares the
/// condition nodes with the original. Use [`ConditionSpec::deep_clone`] when
/// the tree must be independent too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<NodeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sorts: Vec<SortEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
}

impl ConditionSpec {
    /// Builds a spec. The sort list is seeded only when both `sort` and
    /// `direction` are given; zero offsets and limits are treated as unset.
    pub fn new(
        root: Option<NodeRef>,
        offset: Option<u64>,
        limit: Option<u64>,
        sort: Option<&str>,
        direction: Option<SortDir>,
    ) -> Self {
        let sorts = match (sort, direction) {
            (Some(field), Some(direction)) => vec![SortEntry::new(field, direction)],
            _ => Vec::new(),
        };

        Self {
            root,
            sorts,
            offset: offset.filter(|n| *n > 0),
            limit: limit.filter(|n| *n > 0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_sort(&mut self, field: impl Into<String>, direction: SortDir) -> &mut Self {
        self.sorts.push(SortEntry::new(field, direction));
        self
    }

    pub fn set_sort(&mut self, field: impl Into<String>, direction: SortDir) -> &mut Self {
        self.sorts.clear();
        self.add_sort(field, direction)
    }

    pub fn clear_sort(&mut self) -> &mut Self {
        self.sorts.clear();
        self
    }

    pub fn set_offset(&mut self, offset: Option<u64>) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn set_limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.limit = limit;
        self
    }

    /// Combines `node` with the current root under a fresh group.
    ///
    /// Without a root the new root is `Group { logic, [node] }`; otherwise it
    /// is `Group { logic, [old_root, node] }`. Existing groups are never
    /// merged, so every call adds one level of nesting.
    ///
    /// Compiling, rendering and dropping the tree each recurse once per
    /// level. On the default 2 MiB thread stack a few thousand levels is the
    /// practical ceiling; for longer chains push leaves into one [`Group`]
    /// instead, or compile on a thread spawned with a larger stack.
    pub fn add_condition(&mut self, node: impl Into<NodeRef>, logic: Logic) -> &mut Self {
        let group = match self.root.take() {
            Some(previous) => Group::pair(logic, previous, node),
            None => Group::single(logic, node),
        };
        self.root = Some(NodeRef::new(group));
        self
    }

    pub fn and_condition(&mut self, node: impl Into<NodeRef>) -> &mut Self {
        self.add_condition(node, Logic::And)
    }

    pub fn or_condition(&mut self, node: impl Into<NodeRef>) -> &mut Self {
        self.add_condition(node, Logic::Or)
    }

    /// A copy that shares nothing with `self`.
    pub fn deep_clone(&self) -> Self {
        Self {
            root: self.root.as_ref().map(NodeRef::deep_clone),
            sorts: self.sorts.clone(),
            offset: self.offset,
            limit: self.limit,
        }
    }

    pub fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    pub fn sorts(&self) -> &[SortEntry] {
        &self.sorts
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}
