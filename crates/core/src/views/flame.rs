use flamefold_protocol::FrameRect;

use crate::error::FlameError;
use crate::model::{CallTree, CallTreeNode};
use crate::options::FlameOptions;

/// Assign every tree node a rectangle on a canvas of `opts.width` pixels.
///
/// The root spans the full canvas at depth 0. Each node's children tile
/// the parent interval left to right in the tree's sort order, widths
/// proportional to their share of the parent total. Positions come from
/// cumulative ratios, so the last child's right edge lands exactly on the
/// parent's right edge and rounding error cannot compound across rows.
///
/// Rects narrower than `opts.min_width` are flagged elided but still
/// emitted so totals and search stay exact. Output is depth-first, the
/// order a renderer should paint.
///
/// Fails fast with `CanvasOverflow` when the tree exceeds
/// `opts.max_nodes`, before emitting anything.
pub fn layout_flame(tree: &CallTree, opts: &FlameOptions) -> Result<Vec<FrameRect>, FlameError> {
    let count = tree.node_count();
    if let Some(max) = opts.max_nodes
        && count > max
    {
        return Err(FlameError::CanvasOverflow { count, max });
    }

    let mut rects = Vec::with_capacity(count);
    place(
        &tree.root,
        tree.root.name.as_str(),
        0,
        0.0,
        opts.width,
        opts,
        &mut rects,
    );
    Ok(rects)
}

fn place(
    node: &CallTreeNode,
    path: &str,
    depth: u32,
    x: f64,
    width: f64,
    opts: &FlameOptions,
    out: &mut Vec<FrameRect>,
) {
    out.push(FrameRect {
        name: node.name.clone(),
        path: path.to_string(),
        depth,
        x,
        width,
        total_count: node.total_count,
        self_count: node.self_count,
        elided: width < opts.min_width,
    });

    let mut cum: u64 = 0;
    for child in &node.children {
        // A zero-weight subtree collapses to width 0 at the parent's left
        // edge; it stays in the output for search.
        let (cx, cw) = if node.total_count == 0 {
            (x, 0.0)
        } else {
            let left = x + width * (cum as f64 / node.total_count as f64);
            cum += child.total_count;
            let right = x + width * (cum as f64 / node.total_count as f64);
            (left, right - left)
        };
        let child_path = format!("{path};{}", child.name);
        place(child, &child_path, depth + 1, cx, cw, opts, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FoldedStacks;
    use flamefold_protocol::FrameName;

    fn tree(paths: &[(&str, u64)]) -> CallTree {
        let mut s = FoldedStacks::new();
        for (path, count) in paths {
            s.add(path.split(';').map(FrameName::from).collect(), *count);
        }
        CallTree::build(&s).unwrap()
    }

    fn find<'a>(rects: &'a [FrameRect], path: &str) -> &'a FrameRect {
        rects.iter().find(|r| r.path == path).unwrap()
    }

    #[test]
    fn root_spans_full_canvas() {
        let rects = layout_flame(&tree(&[("main;foo", 1)]), &FlameOptions::default()).unwrap();
        assert_eq!(rects[0].path, "all");
        assert_eq!(rects[0].x, 0.0);
        assert_eq!(rects[0].width, 1200.0);
        assert_eq!(rects[0].depth, 0);
    }

    #[test]
    fn widths_are_proportional_to_totals() {
        let opts = FlameOptions {
            width: 1000.0,
            ..FlameOptions::default()
        };
        let rects = layout_flame(&tree(&[("m;a", 3), ("m;b", 1)]), &opts).unwrap();
        assert_eq!(find(&rects, "all;m").width, 1000.0);
        assert_eq!(find(&rects, "all;m;a").width, 750.0);
        assert_eq!(find(&rects, "all;m;b").width, 250.0);
    }

    #[test]
    fn children_tile_without_gap_or_overlap() {
        let opts = FlameOptions {
            width: 997.0, // deliberately awkward
            ..FlameOptions::default()
        };
        let rects = layout_flame(
            &tree(&[("m;a", 1), ("m;b", 1), ("m;c", 1)]),
            &opts,
        )
        .unwrap();
        let a = find(&rects, "all;m;a");
        let b = find(&rects, "all;m;b");
        let c = find(&rects, "all;m;c");
        let eps = 1e-9;
        assert!((a.right() - b.x).abs() < eps);
        assert!((b.right() - c.x).abs() < eps);
        // Last child absorbs residual: ends at the parent edge.
        assert!((c.right() - 997.0).abs() < eps);
    }

    #[test]
    fn single_frame_fills_the_root_width() {
        let rects = layout_flame(&tree(&[("only", 1)]), &FlameOptions::default()).unwrap();
        let only = find(&rects, "all;only");
        assert_eq!(only.width, rects[0].width);
        assert_eq!(only.depth, 1);
        assert_eq!(only.self_count, 1);
    }

    #[test]
    fn depth_increments_per_row() {
        let rects = layout_flame(&tree(&[("a;b;c", 1)]), &FlameOptions::default()).unwrap();
        assert_eq!(find(&rects, "all;a").depth, 1);
        assert_eq!(find(&rects, "all;a;b").depth, 2);
        assert_eq!(find(&rects, "all;a;b;c").depth, 3);
    }

    #[test]
    fn narrow_rects_are_flagged_elided_but_kept() {
        let opts = FlameOptions {
            width: 100.0,
            min_width: 1.0,
            ..FlameOptions::default()
        };
        // "tiny" gets 100 * 1/1001 of the canvas, well under min_width.
        let rects = layout_flame(&tree(&[("m;big", 1000), ("m;tiny", 1)]), &opts).unwrap();
        let tiny = find(&rects, "all;m;tiny");
        assert!(tiny.elided);
        assert!(tiny.width > 0.0);
        assert!(!find(&rects, "all;m;big").elided);
        // Still tiles out to the parent edge.
        assert!((tiny.right() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tree_lays_out_just_the_root() {
        let rects = layout_flame(
            &CallTree::build(&FoldedStacks::new()).unwrap(),
            &FlameOptions::default(),
        )
        .unwrap();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].total_count, 0);
    }

    #[test]
    fn output_is_depth_first() {
        let rects = layout_flame(&tree(&[("m;a;x", 2), ("m;b", 1)]), &FlameOptions::default())
            .unwrap();
        let paths: Vec<&str> = rects.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["all", "all;m", "all;m;a", "all;m;a;x", "all;m;b"]);
    }

    #[test]
    fn node_guard_fails_fast() {
        let opts = FlameOptions {
            max_nodes: Some(3),
            ..FlameOptions::default()
        };
        let err = layout_flame(&tree(&[("a;b;c;d", 1)]), &opts).unwrap_err();
        match err {
            FlameError::CanvasOverflow { count, max } => {
                assert_eq!(count, 5);
                assert_eq!(max, 3);
            }
            other => panic!("expected CanvasOverflow, got {other:?}"),
        }
    }
}
