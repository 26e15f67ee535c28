//! Translates a [`ConditionSpec`] into calls on a [`QueryBuilder`].

use model::condition::{
    node::{ConditionNode, Group, Leaf},
    operator::{Logic, Operator},
    spec::{ConditionSpec, SortEntry},
};
use query_builder::builder::{Comparison, QueryBuilder};
use tracing::debug;

/// Stateless condition compiler.
///
/// Each group opens a builder scope matching its own logic. Leaves are added
/// to the scope of the group that holds them, joined with that group's
/// logic. Sorting and pagination are applied after all predicates.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compiles `spec` into `builder`. `None` leaves the builder untouched.
    pub fn compile_optional<B: QueryBuilder>(&self, builder: &mut B, spec: Option<&ConditionSpec>) {
        if let Some(spec) = spec {
            self.compile(builder, spec);
        }
    }

    pub fn compile<B: QueryBuilder>(&self, builder: &mut B, spec: &ConditionSpec) {
        if let Some(root) = spec.root() {
            let node = root.read();
            match &*node {
                ConditionNode::Group(group) => self.compile_group(builder, group),
                ConditionNode::Leaf(leaf) => {
                    builder.and_scope(|scoped| self.compile_leaf(scoped, leaf, Logic::And))
                }
            }
        }

        PageOptions::resolve(spec).apply(builder);
    }

    /// Recurses once per nested group: this call, the builder's scope call
    /// and the `children` closure make up one level of stack.
    fn compile_group<B: QueryBuilder>(&self, builder: &mut B, group: &Group) {
        if group.is_empty() {
            debug!("Skipping empty {} group", group.logic);
            return;
        }

        let children = |scoped: &mut B| {
            for child in &group.children {
                match &*child.read() {
                    ConditionNode::Group(nested) => self.compile_group(scoped, nested),
                    ConditionNode::Leaf(leaf) => self.compile_leaf(scoped, leaf, group.logic),
                }
            }
        };

        match group.logic {
            Logic::And => builder.and_scope(children),
            Logic::Or => builder.or_scope(children),
        }
    }

    fn compile_leaf<B: QueryBuilder>(&self, builder: &mut B, leaf: &Leaf, logic: Logic) {
        let field = leaf.field.as_str();
        let or = logic == Logic::Or;

        match leaf.operator {
            Operator::In => match leaf.value.as_list() {
                Some(values) if or => builder.or_where_in(field, values),
                Some(values) => builder.where_in(field, values),
                None => debug!(field, value = %leaf.value, "IN operand is not a list, skipping"),
            },
            Operator::Between => match leaf.value.as_list() {
                Some([low, high, ..]) if or => builder.or_where_between(field, low, high),
                Some([low, high, ..]) => builder.where_between(field, low, high),
                _ => debug!(field, value = %leaf.value, "BETWEEN operand is not a pair, skipping"),
            },
            Operator::IsNull if or => builder.or_where_null(field),
            Operator::IsNull => builder.where_null(field),
            Operator::IsNotNull if or => builder.or_where_not_null(field),
            Operator::IsNotNull => builder.where_not_null(field),
            Operator::Unrecognized => debug!(field, "Unrecognized operator, skipping"),
            operator => {
                if let Some(cmp) = Comparison::from_operator(operator) {
                    if or {
                        builder.or_where_cmp(field, cmp, &leaf.value);
                    } else {
                        builder.where_cmp(field, cmp, &leaf.value);
                    }
                }
            }
        }
    }
}

/// Sort and pagination settings derived from a spec.
///
/// A zero limit counts as unset, and an offset is only kept when a limit is.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub sorts: Vec<SortEntry>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageOptions {
    pub fn resolve(spec: &ConditionSpec) -> Self {
        let limit = spec.limit().filter(|n| *n > 0);
        let offset = limit.and(spec.offset().filter(|n| *n > 0));

        Self {
            sorts: spec.sorts().to_vec(),
            offset,
            limit,
        }
    }

    /// Emits sorts in list order, then the offset, then the limit.
    pub fn apply<B: QueryBuilder>(&self, builder: &mut B) {
        for sort in &self.sorts {
            builder.order_by(&sort.field, sort.direction);
        }
        if let Some(offset) = self.offset {
            builder.offset(offset);
        }
        if let Some(limit) = self.limit {
            builder.limit(limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::condition::{node::NodeRef, operator::SortDir};
    use query_builder::{SqlQueryBuilder, dialect::Postgres};
    use tracing_test::traced_test;

    fn sql_for(spec: &ConditionSpec) -> String {
        let mut qb = SqlQueryBuilder::new("t");
        QueryCompiler::new().compile(&mut qb, spec);
        qb.to_sql(&Postgres).0
    }

    #[test]
    fn test_page_options_offset_requires_limit() {
        let mut spec = ConditionSpec::default();
        spec.set_offset(Some(20)).add_sort("id", SortDir::Asc);

        let options = PageOptions::resolve(&spec);
        assert_eq!(options.offset, None);
        assert_eq!(options.limit, None);
        assert_eq!(options.sorts.len(), 1);

        spec.set_limit(Some(0));
        assert_eq!(PageOptions::resolve(&spec).offset, None);

        spec.set_limit(Some(5));
        let options = PageOptions::resolve(&spec);
        assert_eq!((options.offset, options.limit), (Some(20), Some(5)));

        spec.set_offset(Some(0));
        assert_eq!(PageOptions::resolve(&spec).offset, None);
    }

    #[test]
    #[traced_test]
    fn test_unrecognized_operator_is_skipped() {
        let mut spec = ConditionSpec::default();
        spec.and_condition(Leaf::new(Operator::Unrecognized, "x", 1));

        assert_eq!(sql_for(&spec), r#"SELECT * FROM "t""#);
        assert!(logs_contain("Unrecognized operator, skipping"));
    }

    #[test]
    #[traced_test]
    fn test_malformed_operands_are_skipped() {
        let mut spec = ConditionSpec::default();
        spec.and_condition(Leaf::new(Operator::In, "tag", "a"))
            .and_condition(Leaf::new(Operator::Between, "age", vec![18]));

        assert_eq!(sql_for(&spec), r#"SELECT * FROM "t""#);
        assert!(logs_contain("IN operand is not a list"));
        assert!(logs_contain("BETWEEN operand is not a pair"));
    }

    #[test]
    #[traced_test]
    fn test_empty_group_compiles_to_nothing() {
        let empty = Group {
            logic: Logic::Or,
            children: vec![],
        };
        let spec = ConditionSpec::new(Some(NodeRef::new(empty)), None, None, None, None);

        assert_eq!(sql_for(&spec), r#"SELECT * FROM "t""#);
        assert!(logs_contain("Skipping empty OR group"));
    }

    #[test]
    fn test_leaf_root_compiles_in_and_scope() {
        let root = NodeRef::new(Leaf::unary(Operator::IsNull, "deleted_at"));
        let spec = ConditionSpec::new(Some(root), None, None, None, None);

        assert_eq!(
            sql_for(&spec),
            r#"SELECT * FROM "t" WHERE ("deleted_at" IS NULL)"#
        );
    }
}
