//! Shared state threaded through the plugin pipeline: the parsed file,
//! its parent map, recovered type info, the error accumulator, and a
//! counter for fresh temporary names (`__match_N`, `__dg_try_N`, ...).

mod parent_map;
pub mod type_info;

pub use parent_map::{Node, ParentMap};
pub use type_info::build_type_info;

use std::cell::Cell;

use crate::errors::ErrorAccumulator;
use crate::goast::ast::File;
use crate::goast::types::TypeInfo;

pub struct Context {
    pub file: File,
    pub parent_map: ParentMap,
    pub type_info: TypeInfo,
    pub errors: ErrorAccumulator,
    next_temp: Cell<u32>,
}

impl Context {
    pub fn new(file: File) -> Self {
        let parent_map = ParentMap::build(&file);
        let type_info = build_type_info(&file);
        Self {
            file,
            parent_map,
            type_info,
            errors: ErrorAccumulator::default(),
            next_temp: Cell::new(0),
        }
    }

    /// Allocate a fresh numeric suffix for a synthetic identifier, e.g.
    /// `format!("__match_{}", ctx.fresh_temp())`.
    pub fn fresh_temp(&self) -> u32 {
        let n = self.next_temp.get();
        self.next_temp.set(n + 1);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parse;

    #[test]
    fn fresh_temp_counts_up_without_repeats() {
        let file = parse("package main\n").unwrap();
        let ctx = Context::new(file);
        let seen: Vec<u32> = (0..5).map(|_| ctx.fresh_temp()).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
