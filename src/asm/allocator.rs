use crate::semantic::Scope;
use std::collections::HashMap;

/// A statically allocated word holding one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageCell {
    pub label: String,
    pub scope: String,
    pub name: String,
}

/// Assigns one storage cell to each distinct (scope, identifier) pair.
///
/// Cells are named after the scope and the identifier, e.g. `var_main_x`
/// for `x` in `$main`, and are listed in allocation order.
#[derive(Debug, Default)]
pub struct StorageAllocator {
    cells: Vec<StorageCell>,
    index: HashMap<(String, String), usize>,
}

impl StorageAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label of the cell for `name` defined in `scope`,
    /// allocating it on first use.
    pub fn allocate(&mut self, scope: &Scope<'_>, name: &str) -> &str {
        let scope_name = scope.qualified_name();
        let key = (scope_name, name.to_string());

        let i = match self.index.get(&key) {
            Some(i) => *i,
            None => {
                let label = if key.0.is_empty() {
                    format!("var_{}", name)
                } else {
                    format!("var_{}_{}", key.0, name)
                };

                self.cells.push(StorageCell {
                    label,
                    scope: key.0.clone(),
                    name: name.to_string(),
                });
                self.index.insert(key, self.cells.len() - 1);
                self.cells.len() - 1
            }
        };

        &self.cells[i].label
    }

    pub fn cells(&self) -> &[StorageCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<StorageCell> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BumpaloArena;
    use crate::semantic::PrimitiveType;

    #[test]
    fn one_cell_per_scope_and_name() {
        let arena = BumpaloArena::new();
        let global = Scope::global(&arena);
        let main = global.create_child_scope(&arena, "$main", PrimitiveType::Void);
        let mut storage = StorageAllocator::new();

        assert_eq!(storage.allocate(main, "x"), "var_main_x");
        assert_eq!(storage.allocate(main, "y"), "var_main_y");
        assert_eq!(storage.allocate(main, "x"), "var_main_x");
        assert_eq!(storage.allocate(global, "x"), "var_x");

        let labels = storage
            .cells()
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["var_main_x", "var_main_y", "var_x"]);
    }
}
