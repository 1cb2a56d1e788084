//! Foreign-key dependency ordering.
//!
//! Tables are created and loaded parents-first so inline foreign keys and
//! FK-enforcing destinations never see a reference to a missing table.

use std::collections::{HashMap, HashSet};

use crate::core::schema::TableSchema;
use crate::error::{MigrateError, Result};

/// Order tables so every foreign-key parent precedes its children.
///
/// Self-references and references to tables outside the set are ignored.
/// A genuine cycle is a hard error naming one table on the cycle; the
/// caller decides whether to exclude tables and retry.
pub fn sort_tables(tables: Vec<TableSchema>) -> Result<Vec<TableSchema>> {
    let index: HashMap<String, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.to_lowercase(), i))
        .collect();

    let mut sorted_indices = Vec::with_capacity(tables.len());
    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();

    fn visit(
        i: usize,
        tables: &[TableSchema],
        index: &HashMap<String, usize>,
        visited: &mut HashSet<usize>,
        on_stack: &mut HashSet<usize>,
        sorted: &mut Vec<usize>,
    ) -> Result<()> {
        if visited.contains(&i) {
            return Ok(());
        }
        if !on_stack.insert(i) {
            return Err(MigrateError::CyclicDependency {
                table: tables[i].name.clone(),
            });
        }
        for fk in &tables[i].foreign_keys {
            let key = fk.ref_table.to_lowercase();
            match index.get(&key) {
                // Self-references order trivially.
                Some(&parent) if parent != i => {
                    if on_stack.contains(&parent) && !visited.contains(&parent) {
                        return Err(MigrateError::CyclicDependency {
                            table: tables[parent].name.clone(),
                        });
                    }
                    visit(parent, tables, index, visited, on_stack, sorted)?;
                }
                _ => {}
            }
        }
        on_stack.remove(&i);
        visited.insert(i);
        sorted.push(i);
        Ok(())
    }

    for i in 0..tables.len() {
        visit(
            i,
            &tables,
            &index,
            &mut visited,
            &mut on_stack,
            &mut sorted_indices,
        )?;
    }

    let mut slots: Vec<Option<TableSchema>> = tables.into_iter().map(Some).collect();
    Ok(sorted_indices
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}
