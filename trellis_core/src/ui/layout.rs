// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout ordering and execution.
//!
//! Every visible node can have at most one layout from each layouter. The
//! layouts of a node depend on the layouts of its *anchor*, the closest
//! ancestor that has layouts, and on layouts of the same node from layouters
//! earlier in the layouter order. The dependencies go into an
//! [`understory_dirty`] tracker whose deterministic drain yields them
//! parents first.
//!
//! Layouts are then grouped into passes. A layout's level is the highest
//! level among its dependencies, plus one if that dependency belongs to a
//! different layouter. One pass covers one level of one layouter, and passes
//! run by level and then by layouter order. Within a pass, a layout is
//! *top-level* if none of its dependencies are in the same pass.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::handle::{DATA_ID_BITS, INVALID};
use crate::layouter::LayouterStates;

use super::UserInterface;

/// The single dependency channel layouts are tracked in.
const LAYOUT: Channel = Channel::new(0);

fn layout_key(layouter: u32, layout: u32) -> u32 {
    (layouter << DATA_ID_BITS) | layout
}

fn layout_of(key: u32) -> (u32, u32) {
    (key >> DATA_ID_BITS, key & ((1 << DATA_ID_BITS) - 1))
}

/// Layouts of one layouter that can run in a single call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayoutPass {
    pub(crate) layouter: u32,
    pub(crate) layouts: Range<usize>,
    pub(crate) top_level: Range<usize>,
}

/// Ordered layout passes.
#[derive(Debug, Default)]
pub(crate) struct LayoutPlan {
    pub(crate) passes: Vec<LayoutPass>,
    pub(crate) layout_ids: Vec<u32>,
    pub(crate) top_level_ids: Vec<u32>,
}

#[derive(Clone, Copy)]
struct NodeLayout {
    order: usize,
    layouter: u32,
    layout: u32,
}

struct Entry {
    key: u32,
    order: usize,
    level: u32,
    deps: Range<usize>,
}

impl UserInterface {
    /// Recomputes [`LayoutPlan`] for the current visible nodes.
    pub(super) fn order_layouts(&mut self) {
        let layouter_ids = self.layouters.ordered_ids();
        let capacity = self.nodes.parent.len();
        let mut node_layouts: Vec<Vec<NodeLayout>> = vec![Vec::new(); capacity];

        for (order, &layouter_id) in layouter_ids.iter().enumerate() {
            let Some(layouter) = self.layouters.instance(layouter_id) else {
                continue;
            };
            let core = layouter.core();
            for (layout, node) in core.nodes().iter().enumerate() {
                if node.is_null()
                    || !self.nodes.is_valid(*node)
                    || !self.frame.visible.mask[node.id() as usize]
                {
                    continue;
                }
                let list = &mut node_layouts[node.id() as usize];
                assert!(
                    list.iter().all(|l| l.layouter != layouter_id),
                    "UserInterface::update(): {node:?} has more than one layout from {:?}",
                    core.handle()
                );
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "layout slot count is bounded by 1 << DATA_ID_BITS"
                )]
                list.push(NodeLayout {
                    order,
                    layouter: layouter_id,
                    layout: layout as u32,
                });
            }
        }

        let mut tracker = DirtyTracker::<u32>::with_cycle_handling(CycleHandling::Error);
        let mut deps_of: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        let mut orders: BTreeMap<u32, usize> = BTreeMap::new();
        let mut anchor = vec![INVALID; capacity];

        for &node in &self.frame.visible.nodes {
            let parent = self.nodes.parent[node as usize];
            if !parent.is_null() {
                let p = parent.id() as usize;
                anchor[node as usize] = if node_layouts[p].is_empty() {
                    anchor[p]
                } else {
                    parent.id()
                };
            }
            let layouts = &node_layouts[node as usize];
            for (i, entry) in layouts.iter().enumerate() {
                let key = layout_key(entry.layouter, entry.layout);
                let mut deps = Vec::new();
                let node_anchor = anchor[node as usize];
                if node_anchor != INVALID {
                    for dep in &node_layouts[node_anchor as usize] {
                        deps.push(layout_key(dep.layouter, dep.layout));
                    }
                }
                for earlier in &layouts[..i] {
                    deps.push(layout_key(earlier.layouter, earlier.layout));
                }
                for &dep in &deps {
                    let added = tracker.add_dependency(key, dep, LAYOUT);
                    debug_assert!(
                        added.is_ok(),
                        "layouts only depend on ancestor and earlier layouts, so can't form a cycle"
                    );
                }
                tracker.mark(key, LAYOUT);
                deps_of.insert(key, deps);
                orders.insert(key, entry.order);
            }
        }

        let sorted: Vec<u32> = tracker
            .drain(LAYOUT)
            .affected()
            .deterministic()
            .run()
            .collect();

        let mut entries: Vec<Entry> = Vec::with_capacity(sorted.len());
        let mut index_of: BTreeMap<u32, usize> = BTreeMap::new();
        let mut all_deps: Vec<u32> = Vec::new();
        for key in sorted {
            let Some(deps) = deps_of.remove(&key) else {
                continue;
            };
            let order = orders.get(&key).copied().unwrap_or_default();
            let mut level = 0;
            for &dep in &deps {
                if let Some(&d) = index_of.get(&dep) {
                    let dep_entry = &entries[d];
                    let step = u32::from(dep_entry.order != order);
                    level = level.max(dep_entry.level + step);
                }
            }
            let start = all_deps.len();
            all_deps.extend_from_slice(&deps);
            index_of.insert(key, entries.len());
            entries.push(Entry {
                key,
                order,
                level,
                deps: start..all_deps.len(),
            });
        }

        // Stable, so parents stay before children within a pass.
        let mut by_pass: Vec<usize> = (0..entries.len()).collect();
        by_pass.sort_by_key(|&i| (entries[i].level, entries[i].order));

        let plan = &mut self.layout;
        plan.passes.clear();
        plan.layout_ids.clear();
        plan.top_level_ids.clear();
        let mut i = 0;
        while i < by_pass.len() {
            let first = &entries[by_pass[i]];
            let pass_key = (first.level, first.order);
            let (layouter, _) = layout_of(first.key);
            let layouts_start = plan.layout_ids.len();
            let top_level_start = plan.top_level_ids.len();
            while i < by_pass.len() {
                let entry = &entries[by_pass[i]];
                if (entry.level, entry.order) != pass_key {
                    break;
                }
                let (_, layout) = layout_of(entry.key);
                plan.layout_ids.push(layout);
                let nested = all_deps[entry.deps.clone()].iter().any(|dep| {
                    index_of.get(dep).is_some_and(|&d| {
                        (entries[d].level, entries[d].order) == pass_key
                    })
                });
                if !nested {
                    plan.top_level_ids.push(layout);
                }
                i += 1;
            }
            plan.passes.push(LayoutPass {
                layouter,
                layouts: layouts_start..plan.layout_ids.len(),
                top_level: top_level_start..plan.top_level_ids.len(),
            });
        }
        tracing::trace!(
            layouts = plan.layout_ids.len(),
            passes = plan.passes.len(),
            "ordered layouts"
        );
    }

    /// Runs all layout passes on copies of the own node offsets and sizes.
    pub(super) fn run_layouts(&mut self) {
        self.frame.offsets.clone_from(&self.nodes.offset);
        self.frame.sizes.clone_from(&self.nodes.size);
        for pass in &self.layout.passes {
            let Some(layouter) = self.layouters.instance_mut(pass.layouter) else {
                continue;
            };
            layouter.update(
                &self.layout.layout_ids[pass.layouts.clone()],
                &self.layout.top_level_ids[pass.top_level.clone()],
                &mut self.frame.offsets,
                &mut self.frame.sizes,
            );
        }
        for id in self.layouters.ordered_ids() {
            if let Some(layouter) = self.layouters.instance_mut(id) {
                layouter
                    .core_mut()
                    .clear_state(LayouterStates::NEEDS_ASSIGNMENT_UPDATE);
            }
        }
    }
}
