//! Sector → subsector → instrument hierarchy with size-based consolidation.
//!
//! The builder is a pure function of the instrument list and the view
//! configuration. Every group it returns has been through
//! [`finalize`](crate::domain::aggregate::finalize).

use crate::domain::aggregate::finalize;
use crate::domain::config::{HierarchyConfig, ViewConfig};
use crate::domain::instrument::Instrument;
use crate::domain::node::HierarchyNode;
use crate::domain::taxonomy::{
    is_exempt_sector, promote_pattern, OTHER_COMPANIES, OTHER_SECTORS, OTHER_SUBSECTORS,
};
use std::collections::HashMap;

/// Insertion-ordered grouping of `items` by `key`.
fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

fn sort_by_value_desc(nodes: &mut [HierarchyNode]) {
    nodes.sort_by(|a, b| b.value.total_cmp(&a.value));
}

/// Cap a sibling list at `max_boxes`: the top `max_boxes - 1` by value stay,
/// the remainder is merged into one consolidated node named `label`.
///
/// Lists within the cap are returned untouched, order included.
pub fn cap_siblings(mut items: Vec<HierarchyNode>, label: &str, max_boxes: usize) -> Vec<HierarchyNode> {
    if items.len() <= max_boxes {
        return items;
    }
    sort_by_value_desc(&mut items);
    let rest = items.split_off(max_boxes.saturating_sub(1));
    tracing::debug!(label, merged = rest.len(), "capping siblings");
    items.push(finalize(HierarchyNode::consolidated(label, rest)));
    items
}

/// Append `extra` to a group's children and re-aggregate it.
fn absorb(mut group: HierarchyNode, extra: Vec<HierarchyNode>) -> HierarchyNode {
    let mut children = group.children.take().unwrap_or_default();
    children.extend(extra);
    group.children = Some(children);
    finalize(group)
}

/// Merge undersized subsectors into the catch-all subsector, then collapse the
/// subsector tier when only one meaningful subsector remains.
fn build_sector(name: String, subsectors: Vec<(String, Vec<HierarchyNode>)>, cfg: &HierarchyConfig) -> HierarchyNode {
    let mut subs: Vec<HierarchyNode> = subsectors
        .into_iter()
        .map(|(sub, companies)| {
            HierarchyNode::group(sub, cap_siblings(companies, OTHER_COMPANIES, cfg.max_boxes))
        })
        .collect();

    let is_small = |s: &HierarchyNode| s.children().len() < cfg.min_items && s.name != OTHER_SUBSECTORS;
    if subs.len() > 1 && subs.iter().any(is_small) {
        if !subs.iter().any(|s| s.name == OTHER_SUBSECTORS) {
            subs.push(HierarchyNode::group(OTHER_SUBSECTORS, Vec::new()));
        }
        let (small, kept): (Vec<_>, Vec<_>) = subs.into_iter().partition(|s| is_small(s));
        tracing::debug!(sector = %name, merged = small.len(), "consolidating subsectors");
        let mut moved: Vec<HierarchyNode> = small
            .into_iter()
            .flat_map(|s| s.children.unwrap_or_default())
            .collect();

        subs = kept
            .into_iter()
            .map(|s| {
                if s.name != OTHER_SUBSECTORS {
                    return s;
                }
                let mut children = s.children.unwrap_or_default();
                children.extend(std::mem::take(&mut moved));
                sort_by_value_desc(&mut children);
                HierarchyNode::group(OTHER_SUBSECTORS, cap_siblings(children, OTHER_COMPANIES, cfg.max_boxes))
            })
            .collect();
    }

    let promoted_idx = if subs.len() == 1 {
        Some(0)
    } else {
        promote_pattern(&name).and_then(|pattern| subs.iter().position(|s| s.name.contains(pattern)))
    };

    match promoted_idx {
        Some(i) => {
            let sub = subs.swap_remove(i);
            let dropped_leaves: usize = subs.iter().map(HierarchyNode::leaf_count).sum();
            if dropped_leaves > 0 {
                tracing::warn!(
                    sector = %name,
                    subsector = %sub.name,
                    dropped_subsectors = subs.len(),
                    dropped_leaves,
                    "promotion drops sibling subsectors"
                );
            } else {
                tracing::debug!(sector = %name, subsector = %sub.name, "promoting subsector");
            }
            HierarchyNode::promoted(name, sub.children.unwrap_or_default())
        }
        None => HierarchyNode::group(name, subs),
    }
}

/// Children of a sector as seen from the top level: a promoted sector's
/// children directly, otherwise its subsectors' children.
fn flatten_sector(sector: HierarchyNode) -> Vec<HierarchyNode> {
    let promoted = sector.is_promoted;
    let children = sector.children.unwrap_or_default();
    if promoted {
        children
    } else {
        children
            .into_iter()
            .flat_map(|sub| match sub.children {
                Some(grand) => grand,
                None => vec![sub],
            })
            .collect()
    }
}

/// Fold `extra` into the "Other sectors" node, creating it if absent.
fn merge_into_other_sectors(mut sectors: Vec<HierarchyNode>, extra: Vec<HierarchyNode>) -> Vec<HierarchyNode> {
    match sectors.iter().position(|s| s.name == OTHER_SECTORS) {
        Some(i) => {
            let existing = sectors.remove(i);
            sectors.insert(i, absorb(existing, extra));
        }
        None => sectors.push(finalize(HierarchyNode::consolidated(OTHER_SECTORS, extra))),
    }
    sectors
}

/// Build the market-level list of sector nodes.
pub fn build_hierarchy(instruments: &[Instrument], config: &ViewConfig) -> Vec<HierarchyNode> {
    let cfg = &config.hierarchy;
    let selected = instruments.iter().filter(|i| config.allows_sector(&i.sector));

    let by_sector = group_by(selected, |i| {
        if i.sector.is_empty() {
            OTHER_SECTORS.to_string()
        } else {
            i.sector.clone()
        }
    });

    let sectors: Vec<HierarchyNode> = by_sector
        .into_iter()
        .map(|(sector, members)| {
            let subsectors = group_by(members, |i| {
                if i.subsector.is_empty() {
                    OTHER_SUBSECTORS.to_string()
                } else {
                    i.subsector.clone()
                }
            })
            .into_iter()
            .map(|(sub, items)| (sub, items.into_iter().map(HierarchyNode::leaf).collect()))
            .collect();
            finalize(build_sector(sector, subsectors, cfg))
        })
        .collect();

    let (small, mut sectors): (Vec<_>, Vec<_>) = sectors
        .into_iter()
        .partition(|s| s.leaf_count() < cfg.min_items && !is_exempt_sector(&s.name));

    if !small.is_empty() {
        tracing::debug!(
            sectors = ?small.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "consolidating small sectors"
        );
        let orphans: Vec<HierarchyNode> = small.into_iter().flat_map(flatten_sector).collect();
        sectors = merge_into_other_sectors(sectors, orphans);
    }

    sort_by_value_desc(&mut sectors);
    if sectors.len() > cfg.max_boxes {
        let rest: Vec<HierarchyNode> = sectors
            .split_off(cfg.max_boxes.saturating_sub(1))
            .into_iter()
            .flat_map(|s| {
                // A catch-all ranked out of the kept set is unpacked, not nested.
                if s.name == OTHER_SECTORS {
                    s.children.unwrap_or_default()
                } else {
                    vec![s]
                }
            })
            .collect();
        tracing::debug!(merged = rest.len(), "capping sectors");
        sectors = merge_into_other_sectors(sectors, rest);
    }

    tracing::info!(
        sectors = sectors.len(),
        leaves = sectors.iter().map(HierarchyNode::leaf_count).sum::<usize>(),
        "built hierarchy"
    );
    sectors
}
