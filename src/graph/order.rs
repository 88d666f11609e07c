/*
Execution order
===============

Every tick each scheduled node runs once, after everything feeding it. The
order is a post-order depth-first walk over *producers*:

    visit(n):
        for each input slot of n, in slot order:
            if a link feeds it from p and p is unvisited: visit(p)
        push n

Post-order means a node is pushed only after all of its producers, so the
list is already producer-first and needs no reversal.

Walk roots:

    1. every sink (Writer), in id order
    2. the output node

Sinks publish into storage rather than into a link, so nothing downstream
would pull them in. The output node is walked last and its walk never
descends into a node already placed, so it always ends up last. A sink that
reads the output node's own output is not allowed to pull the output node
forward: that edge is skipped while walking sinks, and the sink sees the
output one tick late.

Nodes no walk reaches are simply not scheduled.
*/

use hashbrown::{HashMap, HashSet};

use super::{link::Link, NodeId};

/// Producers feeding each node, sorted by destination slot.
pub(crate) fn producers<'a>(links: impl Iterator<Item = &'a Link>) -> HashMap<NodeId, Vec<(usize, NodeId)>> {
    let mut map: HashMap<NodeId, Vec<(usize, NodeId)>> = HashMap::new();
    for link in links {
        map.entry(link.to).or_default().push((link.to_slot, link.from));
    }
    for feeds in map.values_mut() {
        feeds.sort_unstable();
    }
    map
}

/// Compute the execution order for `root` and `sinks` (already in id order).
pub(crate) fn execution_order(
    root: Option<NodeId>,
    sinks: &[NodeId],
    producers: &HashMap<NodeId, Vec<(usize, NodeId)>>,
) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();

    for &sink in sinks {
        if Some(sink) != root {
            walk(sink, root, producers, &mut visited, &mut order);
        }
    }
    if let Some(root) = root {
        walk(root, None, producers, &mut visited, &mut order);
    }
    order
}

fn walk(
    start: NodeId,
    barrier: Option<NodeId>,
    producers: &HashMap<NodeId, Vec<(usize, NodeId)>>,
    visited: &mut HashSet<NodeId>,
    order: &mut Vec<NodeId>,
) {
    if !visited.insert(start) {
        return;
    }

    // Explicit stack of (node, next producer to look at)
    let mut stack = vec![(start, 0usize)];
    while let Some(&(node, cursor)) = stack.last() {
        let feeds = producers.get(&node).map(Vec::as_slice).unwrap_or(&[]);
        match feeds.get(cursor) {
            Some(&(_, producer)) => {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if Some(producer) != barrier && visited.insert(producer) {
                    stack.push((producer, 0));
                }
            }
            None => {
                order.push(node);
                stack.pop();
            }
        }
    }
}

/// Whether `target` is reachable by walking producers upstream from `start`.
pub(crate) fn feeds_into(
    target: NodeId,
    start: NodeId,
    producers: &HashMap<NodeId, Vec<(usize, NodeId)>>,
) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(feeds) = producers.get(&node) {
            stack.extend(feeds.iter().map(|&(_, producer)| producer));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkId;

    fn link(id: u32, from: u32, to: u32, to_slot: usize) -> Link {
        Link {
            id: LinkId(id),
            from: NodeId(from),
            from_slot: 0,
            to: NodeId(to),
            to_slot,
        }
    }

    fn order_of(root: u32, sinks: &[u32], links: &[Link]) -> Vec<u32> {
        let sinks: Vec<NodeId> = sinks.iter().map(|&s| NodeId(s)).collect();
        execution_order(Some(NodeId(root)), &sinks, &producers(links.iter()))
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    #[test]
    fn chain_is_producer_first() {
        // 3 -> 2 -> 1 -> 0 (root)
        let links = [link(0, 1, 0, 0), link(1, 2, 1, 0), link(2, 3, 2, 0)];
        assert_eq!(order_of(0, &[], &links), vec![3, 2, 1, 0]);
    }

    #[test]
    fn diamond_places_shared_node_once() {
        //     1
        //   /   \
        // 3       0
        //   \   /
        //     2
        let links = [
            link(0, 1, 0, 0),
            link(1, 2, 0, 1),
            link(2, 3, 1, 0),
            link(3, 3, 2, 0),
        ];
        assert_eq!(order_of(0, &[], &links), vec![3, 1, 2, 0]);
    }

    #[test]
    fn input_slot_order_decides_siblings() {
        // Linked in reverse slot order on purpose
        let links = [link(0, 5, 0, 1), link(1, 6, 0, 0)];
        assert_eq!(order_of(0, &[], &links), vec![6, 5, 0]);
    }

    #[test]
    fn unreachable_nodes_are_elided() {
        let links = [link(0, 1, 0, 0), link(1, 9, 8, 0)];
        assert_eq!(order_of(0, &[], &links), vec![1, 0]);
    }

    #[test]
    fn sinks_run_first_and_root_stays_last() {
        // 4 is a sink fed by 3; root 0 fed by 1; sink 5 reads the root
        let links = [link(0, 3, 4, 0), link(1, 1, 0, 0), link(2, 0, 5, 0)];
        assert_eq!(order_of(0, &[4, 5], &links), vec![3, 4, 5, 1, 0]);
    }

    #[test]
    fn reachability() {
        let links = [link(0, 1, 0, 0), link(1, 2, 1, 0)];
        let map = producers(links.iter());
        assert!(feeds_into(NodeId(2), NodeId(0), &map));
        assert!(!feeds_into(NodeId(0), NodeId(2), &map));
    }
}
