//! Bottom-up roll-up of group statistics.
//!
//! Valuation (`p_l`) and margin use the median of the direct children, so
//! medians compose level by level. Profitability and yield use a weighted mean
//! with each child's [`HierarchyNode::weight`].

use crate::domain::classifier::is_holding;
use crate::domain::node::HierarchyNode;

/// Median of `values`; the mean of the two middle values for an even count, 0 when empty.
pub fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Weighted mean of `(value, weight)` pairs; 0 when the total weight is 0.
pub fn weighted_mean<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (sum, total) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(s, t), (v, w)| (s + v * w, t + w));
    if total > 0.0 { sum / total } else { 0.0 }
}

/// Margin a child contributes to its parent's median.
///
/// Financial leaves often report a zero accounting margin; when such a leaf is
/// profitable (`roe > 0`, `p_l > 0`) its ROE stands in.
pub fn effective_margin(child: &HierarchyNode, parent_is_financial: bool) -> f64 {
    if child.is_leaf()
        && (child.is_holding || parent_is_financial)
        && child.net_margin == 0.0
        && child.roe > 0.0
        && child.p_l > 0.0
    {
        return child.roe;
    }
    child.net_margin
}

/// Recompute every group's statistics, post-order. Leaves are returned unchanged.
pub fn finalize(node: HierarchyNode) -> HierarchyNode {
    let children = match node.children {
        Some(children) => children,
        None => return node,
    };
    let children: Vec<HierarchyNode> = children.into_iter().map(finalize).collect();

    let is_financial = is_holding(&node.name);
    let value = children.iter().map(|c| c.value).sum();
    let market_cap = children.iter().map(HierarchyNode::weight).sum();
    let p_l = median(children.iter().map(|c| c.p_l).collect());
    let net_margin = median(
        children
            .iter()
            .map(|c| effective_margin(c, is_financial))
            .collect(),
    );
    let weighted = |f: fn(&HierarchyNode) -> f64| {
        weighted_mean(children.iter().map(|c| (f(c), c.weight())))
    };
    let roe = weighted(|c| c.roe);
    let roic = weighted(|c| c.roic);
    let dy = weighted(|c| c.dy);

    HierarchyNode {
        value,
        market_cap,
        p_l,
        net_margin,
        roe,
        roic,
        dy,
        is_holding: is_financial,
        children: Some(children),
        ..node
    }
}
