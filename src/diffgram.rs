//! Snapshot differ: diffs every table level of a pilot/production pair,
//! restores the parent/child links on the result and flags the rows a
//! "changes only" view may hide.

use crate::change_detection::{ChangeDetector, DiffCounts, DiffTable, RowState};
use crate::error::Result;
use crate::layout::PrintLayout;
use crate::logging::LogContext;
use crate::snapshot::{Relation, Snapshot, Value};
use std::collections::{HashMap, HashSet};

/// Parent/child row links between adjacent diff table levels
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    /// `children[level][row]` lists row indices of `level + 1`
    children: Vec<Vec<Vec<usize>>>,
    /// `parents[level][row]` is the first matching row of `level - 1`
    parents: Vec<Vec<Option<usize>>>,
}

impl Hierarchy {
    pub fn build(tables: &[DiffTable], relations: &[Relation]) -> Self {
        let mut children: Vec<Vec<Vec<usize>>> =
            tables.iter().map(|t| vec![Vec::new(); t.len()]).collect();
        let mut parents: Vec<Vec<Option<usize>>> =
            tables.iter().map(|t| vec![None; t.len()]).collect();

        for (level, relation) in relations.iter().enumerate() {
            let (Some(parent_table), Some(child_table)) = (tables.get(level), tables.get(level + 1))
            else {
                continue;
            };

            let mut by_key: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
            for (index, row) in child_table.rows().iter().enumerate() {
                by_key
                    .entry(relation.child_key(row.change.values()))
                    .or_default()
                    .push(index);
            }

            for (index, row) in parent_table.rows().iter().enumerate() {
                let key = relation.parent_key(row.change.values());
                if let Some(matches) = by_key.get(&key) {
                    for &child in matches {
                        parents[level + 1][child].get_or_insert(index);
                    }
                    children[level][index] = matches.clone();
                }
            }
        }

        Self { children, parents }
    }

    pub fn children(&self, level: usize, row: usize) -> &[usize] {
        self.children
            .get(level)
            .and_then(|rows| rows.get(row))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn parent(&self, level: usize, row: usize) -> Option<usize> {
        self.parents.get(level).and_then(|rows| rows.get(row)).copied().flatten()
    }
}

/// The diff of a whole snapshot pair
#[derive(Debug, Clone)]
pub struct Diffgram {
    name: String,
    tables: Vec<DiffTable>,
    relations: Vec<Relation>,
    layout: PrintLayout,
    hierarchy: Hierarchy,
    can_hide: bool,
}

impl Diffgram {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[DiffTable] {
        &self.tables
    }

    pub fn table(&self, level: usize) -> Option<&DiffTable> {
        self.tables.get(level)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn layout(&self) -> &PrintLayout {
        &self.layout
    }

    pub fn children(&self, level: usize, row: usize) -> &[usize] {
        self.hierarchy.children(level, row)
    }

    pub fn parent(&self, level: usize, row: usize) -> Option<usize> {
        self.hierarchy.parent(level, row)
    }

    /// True when every root row is cumulatively unchanged, so the whole
    /// section may be hidden by a "changes only" view
    pub fn can_hide(&self) -> bool {
        self.can_hide
    }

    pub fn has_changes(&self) -> bool {
        self.tables.iter().any(|t| t.counts().has_changes())
    }

    pub fn counts(&self) -> Vec<(String, DiffCounts)> {
        self.tables
            .iter()
            .map(|t| (t.name().to_string(), t.counts()))
            .collect()
    }

    /// Root row indices in rendering order
    pub fn root_rows(&self) -> Vec<usize> {
        self.tables
            .first()
            .map(|t| (0..t.len()).collect())
            .unwrap_or_default()
    }
}

/// Diff a pilot snapshot against a production snapshot of the same schema
pub fn diff_snapshots(pilot: &Snapshot, production: &Snapshot) -> Result<Diffgram> {
    let ctx = LogContext::new(pilot.name());
    pilot.validate()?;
    production.validate()?;
    pilot.ensure_same_schema(production)?;

    let layout = pilot.layout().clone();
    if production.layout() != &layout {
        ctx.warn("production print layout differs from pilot; using the pilot layout");
    }

    let mut tables = Vec::with_capacity(pilot.tables().len());
    for (level, (p, q)) in pilot.tables().iter().zip(production.tables()).enumerate() {
        let mut diff = ChangeDetector::diff_tables(p, q, &layout.ignored_columns(level), &ctx)?;
        diff.sort_by_columns(&layout.sort_columns(level));
        tables.push(diff);
    }

    let relations = pilot.relations().to_vec();
    drop_orphans(&mut tables, &relations, &ctx);
    let hierarchy = Hierarchy::build(&tables, &relations);
    let can_hide = apply_visibility(&mut tables, &hierarchy);

    ctx.debug(format!(
        "diffed {} tables, section can be hidden: {}",
        tables.len(),
        can_hide
    ));

    Ok(Diffgram {
        name: pilot.name().to_string(),
        tables,
        relations,
        layout,
        hierarchy,
        can_hide,
    })
}

/// Drop rows whose parent key matches no row one level up. Levels are
/// filtered top-down, so a row under a dropped orphan goes too.
fn drop_orphans(tables: &mut [DiffTable], relations: &[Relation], ctx: &LogContext) {
    for (level, relation) in relations.iter().enumerate() {
        if level + 1 >= tables.len() {
            break;
        }
        let parent_keys: HashSet<Vec<Value>> = tables[level]
            .rows()
            .iter()
            .map(|row| relation.parent_key(row.change.values()))
            .collect();

        let child = &mut tables[level + 1];
        let dropped = child.retain(|row| parent_keys.contains(&relation.child_key(row.change.values())));
        if dropped > 0 {
            ctx.table(child.name())
                .warn(format!("{} rows without a parent row dropped", dropped));
        }
    }
}

/// Whether each row and every descendant is Unchanged, per level
pub fn cumulative_unchanged(tables: &[DiffTable], hierarchy: &Hierarchy) -> Vec<Vec<bool>> {
    let mut cumulative: Vec<Vec<bool>> = tables.iter().map(|t| vec![false; t.len()]).collect();

    for level in (0..tables.len()).rev() {
        for (index, row) in tables[level].rows().iter().enumerate() {
            let own = row.state() == RowState::Unchanged;
            let subtree = own
                && hierarchy
                    .children(level, index)
                    .iter()
                    .all(|&child| cumulative[level + 1][child]);
            cumulative[level][index] = subtree;
        }
    }

    cumulative
}

/// Set `can_hide` on every row and return whether the whole diffgram can be hidden.
/// Root rows are hideable when cumulatively unchanged; deeper rows that are
/// cumulatively unchanged inherit their parent's flag.
fn apply_visibility(tables: &mut [DiffTable], hierarchy: &Hierarchy) -> bool {
    let cumulative = cumulative_unchanged(tables, hierarchy);
    let mut can_hide_all = true;

    for level in 0..tables.len() {
        let inherited: Vec<bool> = (0..tables[level].len())
            .map(|index| match (level, hierarchy.parent(level, index)) {
                (0, _) | (_, None) => true,
                (_, Some(parent)) => tables[level - 1].rows()[parent].can_hide,
            })
            .collect();

        for (index, row) in tables[level].rows_mut().iter_mut().enumerate() {
            let unchanged = cumulative[level][index];
            row.can_hide = unchanged && inherited[index];
            if level == 0 && !unchanged {
                can_hide_all = false;
            }
        }
    }

    can_hide_all
}
