use crate::{
    compiler::{
        CompiledStatement, DialectContext, QueryCompiler, RowShape,
        alias::AliasAllocator,
        assembler::{Fragments, assemble, finish},
        count::{count_joined, count_shape},
        error::CompileError,
        filter::{place_filter, pushable_filter},
        joins::build_join_chain,
        ordering::build_order_by,
        paging::{RowPaging, group_paging_join, row_paging},
        projection::build_projection,
        validate::validate_joining,
    },
    config::PagingMode,
    plan::JoinPlan,
    query::ast::select::Select,
};

/// Compiles plans with join steps into one ordered, denormalized `SELECT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoiningCompiler;

impl JoiningCompiler {
    fn select(
        &self,
        plan: &JoinPlan,
        ctx: &DialectContext,
        ordered: bool,
    ) -> Result<(Select, RowShape), CompileError> {
        validate_joining(plan, ctx)?;
        let filter = pushable_filter(plan, ctx)?;

        let mut allocator = AliasAllocator::new(&plan.table);
        let chain = build_join_chain(plan, &mut allocator);
        let projection = build_projection(plan, &chain, ctx)?;

        let mut joins = chain.clauses.clone();
        let mut paging = RowPaging::default();
        if ordered {
            paging = row_paging(plan);
            if ctx.paging == PagingMode::Groups
                && let Some(join) = group_paging_join(plan, &filter, &chain, &mut allocator, ctx)?
            {
                joins.push(join);
                paging = RowPaging::default();
            }
        }

        let placement = place_filter(plan, &filter, &chain, &mut allocator, ctx)?;
        let order_by = if ordered {
            build_order_by(plan, &chain, &projection.shape.primary_keys)
        } else {
            Vec::new()
        };

        let select = assemble(
            &plan.table,
            Fragments {
                projection: projection.columns,
                joins,
                filter: placement,
                order_by,
                limit: paging.limit,
                offset: paging.offset,
            },
        );
        Ok((select, projection.shape))
    }
}

impl QueryCompiler for JoiningCompiler {
    fn compile(&self, plan: &JoinPlan, ctx: &DialectContext) -> Result<CompiledStatement, CompileError> {
        let (select, shape) = self.select(plan, ctx, true)?;
        Ok(finish(&select, shape, plan, ctx))
    }

    fn compile_count(
        &self,
        plan: &JoinPlan,
        ctx: &DialectContext,
    ) -> Result<CompiledStatement, CompileError> {
        let (select, shape) = self.select(plan, ctx, false)?;
        let count = count_joined(select, &shape.primary_keys);
        Ok(finish(&count, count_shape(), plan, ctx))
    }
}
