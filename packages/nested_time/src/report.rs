//! Region timing reports.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::region::{RegionId, RegionNode, RegionTree};
use crate::{Error, Result};

/// Display name of the synthetic rows accounting for a region's own time.
pub const UNACCOUNTED_LABEL: &str = "(Unaccounted)";

/// A snapshot of a session's region tree, with the two reporting traversals.
///
/// A `Report` contains the captured region statistics from a
/// [`Session`](crate::Session) and can be safely sent to other threads for
/// processing. The two traversals are independent read-only views over the same
/// tree, except that [`top_down()`](Self::top_down) also computes and stores
/// the exclusive duration of every region, which
/// [`flattened()`](Self::flattened) requires.
///
/// # Examples
///
/// ```
/// use nested_time::Session;
///
/// # fn main() -> Result<(), nested_time::Error> {
/// let session = Session::new();
/// {
///     let _request = session.measure("request")?;
///     let _parse = session.measure("parse")?;
/// }
///
/// let mut report = session.to_report();
/// for row in report.top_down() {
///     println!("{row}");
/// }
///
/// for (name, summary) in report.flattened()? {
///     println!("{name}: {} x {:?}", summary.count(), summary.duration());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    nodes: Vec<RegionNode>,
    roots: Vec<RegionId>,
}

/// One row of the top-down report: either a region at some depth of the call
/// tree, or a synthetic "unaccounted" row attributing a parent's own time.
///
/// Rows carry structure, not rendering: any renderer (text table, structured
/// log, JSON) can consume them. The provided [`Display`](fmt::Display)
/// implementation renders an indented text line.
#[derive(Clone, Debug)]
pub struct TreeRow {
    name: String,
    depth: usize,
    count: Option<u64>,
    duration_nanos: i64,
    exclusive_nanos: Option<i64>,
}

/// Accumulated statistics for all regions sharing one name, regardless of their
/// positions in the call tree.
#[derive(Clone, Debug, Default)]
pub struct RegionSummary {
    count: u64,
    duration: Duration,
    exclusive_nanos: i64,
}

impl Report {
    pub(crate) fn from_tree(tree: &RegionTree) -> Self {
        Self {
            nodes: tree.nodes().to_vec(),
            roots: tree.roots().to_vec(),
        }
    }

    /// Whether there is any recorded activity in this report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.nodes.iter().all(|node| node.total_count == 0)
    }

    /// Performs the top-down traversal of the region tree.
    ///
    /// Emits one row per region in depth-first order, with the direct children
    /// of every region (and the roots themselves) ordered by total duration
    /// descending; ties keep their original insertion order. Every region with
    /// children is followed by a synthetic [`UNACCOUNTED_LABEL`] row (with no
    /// count) carrying the region's exclusive duration.
    ///
    /// As a side effect, computes and stores the exclusive duration of every
    /// region in this snapshot - the value is recomputed from scratch on every
    /// call, so repeated traversals of an unchanged report yield identical
    /// rows. [`flattened()`](Self::flattened) requires this pass to have run.
    pub fn top_down(&mut self) -> Vec<TreeRow> {
        let mut rows = Vec::new();

        let mut roots = self.roots.clone();
        self.sort_by_duration_descending(&mut roots);
        for root in roots {
            self.visit(root, 0, &mut rows);
        }

        rows
    }

    /// Aggregates the region tree strictly by name, regardless of depth or
    /// parent.
    ///
    /// Two regions with the same name at different tree positions contribute to
    /// the same output entry: counts, durations and exclusive durations all
    /// sum. The output carries no inherent ordering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteAggregation`] if
    /// [`top_down()`](Self::top_down) has not run on this report, as the
    /// exclusive durations it computes are part of the aggregation.
    pub fn flattened(&self) -> Result<HashMap<String, RegionSummary>> {
        let mut summaries: HashMap<String, RegionSummary> = HashMap::new();

        let mut pending = self.roots.clone();
        while let Some(id) = pending.pop() {
            let node = self.node(id);
            let Some(exclusive) = node.exclusive_nanos else {
                return Err(Error::IncompleteAggregation {
                    name: node.name.clone(),
                });
            };

            let summary = summaries.entry(node.name.clone()).or_default();
            summary.count = summary
                .count
                .checked_add(node.total_count)
                .expect("activation count overflows u64 - this indicates an unrealistic scenario");
            summary.duration = summary.duration.checked_add(node.total_duration).expect(
                "accumulated duration overflows Duration - this indicates an unrealistic scenario",
            );
            summary.exclusive_nanos = summary.exclusive_nanos.checked_add(exclusive).expect(
                "exclusive duration overflows i64 nanoseconds - this indicates an unrealistic scenario",
            );

            pending.extend(node.children.iter().copied());
        }

        Ok(summaries)
    }

    /// Prints the region timing statistics to stdout as an indented tree.
    ///
    /// Prints nothing if no activations were captured, not even an empty line.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }
        println!("{self}");
    }

    fn visit(&mut self, id: RegionId, depth: usize, rows: &mut Vec<TreeRow>) {
        let node = self.node(id);
        let name = node.name.clone();
        let count = node.total_count;
        let total = duration_nanos(node.total_duration);
        let mut children = node.children.clone();

        let children_total = children
            .iter()
            .map(|child| duration_nanos(self.node(*child).total_duration))
            .try_fold(0_i64, |sum, value| sum.checked_add(value))
            .expect("summed duration overflows i64 nanoseconds - this indicates an unrealistic scenario");

        // Negative when the children's summed time exceeds the parent's own -
        // only possible under timer interference. Passed through unclamped.
        let exclusive = total.checked_sub(children_total).expect(
            "exclusive duration overflows i64 nanoseconds - this indicates an unrealistic scenario",
        );
        self.node_mut(id).exclusive_nanos = Some(exclusive);

        rows.push(TreeRow {
            name,
            depth,
            count: Some(count),
            duration_nanos: total,
            exclusive_nanos: Some(exclusive),
        });

        self.sort_by_duration_descending(&mut children);
        let has_children = !children.is_empty();
        for child in children {
            self.visit(
                child,
                depth.checked_add(1).expect("region nesting depth overflows usize"),
                rows,
            );
        }

        if has_children {
            rows.push(TreeRow {
                name: UNACCOUNTED_LABEL.to_string(),
                depth: depth.checked_add(1).expect("region nesting depth overflows usize"),
                count: None,
                duration_nanos: exclusive,
                exclusive_nanos: None,
            });
        }
    }

    /// Sorts sibling regions by total duration descending. The sort is stable,
    /// so equal durations keep their insertion order.
    fn sort_by_duration_descending(&self, ids: &mut [RegionId]) {
        ids.sort_by(|a, b| {
            self.node(*b)
                .total_duration
                .cmp(&self.node(*a).total_duration)
        });
    }

    fn node(&self, id: RegionId) -> &RegionNode {
        self.nodes
            .get(id.0)
            .expect("region ids in a report always refer to nodes of its own snapshot")
    }

    fn node_mut(&mut self, id: RegionId) -> &mut RegionNode {
        self.nodes
            .get_mut(id.0)
            .expect("region ids in a report always refer to nodes of its own snapshot")
    }
}

impl TreeRow {
    /// The region name, or [`UNACCOUNTED_LABEL`] for synthetic rows.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth of this row, starting at zero for root regions.
    /// Unaccounted rows sit one level below their region.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// How many times the region was opened. `None` for unaccounted rows.
    #[must_use]
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// The row's duration in signed nanoseconds: the region's cumulative total,
    /// or for unaccounted rows the parent's exclusive duration, which can be
    /// negative under timer interference.
    #[must_use]
    pub fn duration_nanos(&self) -> i64 {
        self.duration_nanos
    }

    /// The region's exclusive duration in signed nanoseconds: its total minus
    /// the summed totals of its direct children. For leaf regions this equals
    /// the total. `None` for unaccounted rows.
    #[must_use]
    pub fn exclusive_nanos(&self) -> Option<i64> {
        self.exclusive_nanos
    }

    /// Whether this is a synthetic unaccounted row rather than a region.
    #[must_use]
    pub fn is_unaccounted(&self) -> bool {
        self.count.is_none()
    }
}

impl RegionSummary {
    /// Total number of activations across all same-named regions.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Summed cumulative duration across all same-named regions.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Summed exclusive duration across all same-named regions, in signed
    /// nanoseconds. Can be negative under timer interference; the value is
    /// passed through unclamped.
    #[must_use]
    pub fn exclusive_nanos(&self) -> i64 {
        self.exclusive_nanos
    }
}

fn duration_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).expect("all realistic durations fit in i64 nanoseconds")
}

fn format_nanos(nanos: i64) -> String {
    if nanos < 0 {
        format!("-{:?}", Duration::from_nanos(nanos.unsigned_abs()))
    } else {
        format!(
            "{:?}",
            Duration::from_nanos(u64::try_from(nanos).expect("guarded by if condition"))
        )
    }
}

impl fmt::Display for TreeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            write!(f, "  ")?;
        }
        match self.count {
            Some(count) => write!(
                f,
                "{}: {} x {}",
                self.name,
                count,
                format_nanos(self.duration_nanos)
            ),
            None => write!(f, "{}: {}", self.name, format_nanos(self.duration_nanos)),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "No region timing statistics captured.")?;
        } else {
            writeln!(f, "Region timing statistics:")?;
            // The traversal mutates a snapshot's exclusive durations, so render
            // from a scratch copy to keep Display read-only.
            let mut snapshot = self.clone();
            for row in snapshot.top_down() {
                writeln!(f, "  {row}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::pal::{FakePlatform, PlatformFacade};

    fn create_test_session() -> (Session, FakePlatform) {
        let fake_platform = FakePlatform::new();
        let platform_facade = PlatformFacade::fake(fake_platform.clone());
        (Session::with_platform(platform_facade), fake_platform)
    }

    fn at(clock: &FakePlatform, millis: u64) {
        clock.set_time(Duration::from_millis(millis));
    }

    /// Builds a depth-3 tree with "network" repeated at two different depths:
    ///
    /// request (40ms total)
    ///   parse (10ms)
    ///     network (5ms)
    ///   network (15ms)
    fn build_sample_tree() -> Session {
        let (session, clock) = create_test_session();

        session.open("request").unwrap();
        at(&clock, 5);
        session.open("parse").unwrap();
        at(&clock, 10);
        session.open("network").unwrap();
        at(&clock, 15);
        session.close("network").unwrap();
        session.close("parse").unwrap();
        at(&clock, 20);
        session.open("network").unwrap();
        at(&clock, 35);
        session.close("network").unwrap();
        at(&clock, 40);
        session.close("request").unwrap();

        session
    }

    #[test]
    fn empty_report_is_empty() {
        let (session, _clock) = create_test_session();
        let report = session.to_report();
        assert!(report.is_empty());
        assert!(report.clone().top_down().is_empty());
    }

    #[test]
    fn top_down_emits_rows_in_depth_first_duration_order() {
        let mut report = build_sample_tree().to_report();
        let rows = report.top_down();

        let names: Vec<&str> = rows.iter().map(TreeRow::name).collect();
        assert_eq!(
            names,
            [
                "request",
                "network", // 15ms child sorts before parse's 10ms
                "parse",
                "network",
                UNACCOUNTED_LABEL, // parse's own 5ms
                UNACCOUNTED_LABEL, // request's own 15ms
            ]
        );

        let depths: Vec<usize> = rows.iter().map(TreeRow::depth).collect();
        assert_eq!(depths, [0, 1, 1, 2, 2, 1]);
    }

    #[test]
    fn top_down_computes_exclusive_durations() {
        let mut report = build_sample_tree().to_report();
        let rows = report.top_down();

        let request = rows.first().unwrap();
        assert_eq!(request.duration_nanos(), 40_000_000);
        // 40ms total minus 10ms parse and 15ms network.
        assert_eq!(request.exclusive_nanos(), Some(15_000_000));

        // Leaves have their exclusive duration set explicitly, equal to the
        // total, for consistency with the flattening pass.
        let leaf = rows.get(1).unwrap();
        assert_eq!(leaf.name(), "network");
        assert_eq!(leaf.exclusive_nanos(), Some(leaf.duration_nanos()));
    }

    #[test]
    fn leaf_rows_have_no_unaccounted_row() {
        let (session, clock) = create_test_session();
        session.open("solo").unwrap();
        at(&clock, 3);
        session.close("solo").unwrap();

        let mut report = session.to_report();
        let rows = report.top_down();

        assert_eq!(rows.len(), 1);
        assert!(!rows.first().unwrap().is_unaccounted());
    }

    #[test]
    fn top_down_is_idempotent() {
        let mut report = build_sample_tree().to_report();

        let first: Vec<(String, Option<i64>)> = report
            .top_down()
            .iter()
            .map(|row| (row.name().to_string(), row.exclusive_nanos()))
            .collect();
        let second: Vec<(String, Option<i64>)> = report
            .top_down()
            .iter()
            .map(|row| (row.name().to_string(), row.exclusive_nanos()))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let (session, clock) = create_test_session();

        session.open("parent").unwrap();
        session.open("first").unwrap();
        at(&clock, 5);
        session.close("first").unwrap();
        at(&clock, 10);
        session.open("second").unwrap();
        at(&clock, 15);
        session.close("second").unwrap();
        session.close("parent").unwrap();

        // Both children measured 5ms; insertion order breaks the tie.
        let mut report = session.to_report();
        let rows = report.top_down();
        assert_eq!(rows.get(1).unwrap().name(), "first");
        assert_eq!(rows.get(2).unwrap().name(), "second");
    }

    #[test]
    fn flattened_before_top_down_is_incomplete_aggregation() {
        let report = build_sample_tree().to_report();

        let error = report.flattened().unwrap_err();
        assert!(matches!(error, Error::IncompleteAggregation { .. }));
    }

    #[test]
    fn flattened_groups_same_name_across_depths() {
        let mut report = build_sample_tree().to_report();
        report.top_down();

        let flattened = report.flattened().unwrap();
        let network = flattened.get("network").unwrap();

        // 5ms at depth 2 plus 15ms at depth 1.
        assert_eq!(network.count(), 2);
        assert_eq!(network.duration(), Duration::from_millis(20));
        assert_eq!(network.exclusive_nanos(), 20_000_000);
    }

    #[test]
    fn flattened_duration_sum_equals_tree_duration_sum() {
        let mut report = build_sample_tree().to_report();
        report.top_down();

        let tree_total: Duration = report.nodes.iter().map(|node| node.total_duration).sum();
        let flattened_total: Duration = report
            .flattened()
            .unwrap()
            .values()
            .map(RegionSummary::duration)
            .sum();

        assert_eq!(flattened_total, tree_total);
    }

    #[test]
    fn negative_exclusive_duration_passes_through_unclamped() {
        // Simulate timer interference: the clock jumps backwards between the
        // parent's open and the child's open, so the child measures more time
        // than its parent.
        let (session, clock) = create_test_session();

        at(&clock, 5);
        session.open("outer").unwrap();
        at(&clock, 0);
        session.open("inner").unwrap();
        at(&clock, 10);
        session.close("inner").unwrap();
        session.close("outer").unwrap();

        let mut report = session.to_report();
        let rows = report.top_down();

        // Outer measured 5ms, inner measured 10ms.
        let outer = rows.first().unwrap();
        assert_eq!(outer.exclusive_nanos(), Some(-5_000_000));

        let unaccounted = rows.get(2).unwrap();
        assert!(unaccounted.is_unaccounted());
        assert_eq!(unaccounted.duration_nanos(), -5_000_000);

        let flattened = report.flattened().unwrap();
        assert_eq!(flattened.get("outer").unwrap().exclusive_nanos(), -5_000_000);
    }

    #[test]
    fn multiple_roots_sort_by_duration() {
        let (session, clock) = create_test_session();

        session.open("short").unwrap();
        at(&clock, 2);
        session.close("short").unwrap();
        session.open("long").unwrap();
        at(&clock, 20);
        session.close("long").unwrap();

        let mut report = session.to_report();
        let rows = report.top_down();
        assert_eq!(rows.first().unwrap().name(), "long");
        assert_eq!(rows.get(1).unwrap().name(), "short");
    }

    #[test]
    fn display_renders_indented_rows() {
        let report = build_sample_tree().to_report();
        let rendered = report.to_string();

        assert!(rendered.contains("Region timing statistics:"), "got: {rendered}");
        assert!(rendered.contains("request"), "got: {rendered}");
        assert!(rendered.contains(UNACCOUNTED_LABEL), "got: {rendered}");
    }

    #[test]
    fn display_of_empty_report_says_so() {
        let (session, _clock) = create_test_session();
        let rendered = session.to_report().to_string();
        assert!(rendered.contains("No region timing statistics captured."));
    }

    #[test]
    fn negative_durations_render_with_sign() {
        assert_eq!(format_nanos(-5_000_000), "-5ms");
        assert_eq!(format_nanos(5_000_000), "5ms");
    }

    // Reports may be handed off to whatever thread renders them.
    static_assertions::assert_impl_all!(Report: Send, Sync);
    static_assertions::assert_impl_all!(TreeRow: Send, Sync);
    static_assertions::assert_impl_all!(RegionSummary: Send, Sync);
}
