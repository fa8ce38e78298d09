use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::model::{Need, NeedKind};
use crate::config::TraceConfig;
use crate::error::{TraceError, TraceResult};

/// Edges grouped by record, then by link type.
pub type LinkMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A link whose target is not in the record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLink {
    pub source: String,
    pub link: String,
    pub target: String,
}

/// Forward and reverse edges of a record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLinks {
    pub outgoing: LinkMap,
    pub incoming: LinkMap,
    pub dead: Vec<DeadLink>,
}

/// Resolve all links of `needs`.
///
/// The forward pass only reads the records; the reverse pass only reads the
/// finished forward map. Nothing is mutated while it is being walked.
pub fn resolve(needs: &BTreeMap<String, Need>, config: &TraceConfig) -> TraceResult<ResolvedLinks> {
    let mut outgoing: LinkMap = BTreeMap::new();
    let mut dead = Vec::new();

    for (id, need) in needs {
        for (link, targets) in &need.links {
            let link_type = config
                .link_type(link)
                .ok_or_else(|| TraceError::UnknownLinkType {
                    record: id.clone(),
                    link: link.clone(),
                })?;

            let entry = outgoing
                .entry(id.clone())
                .or_default()
                .entry(link.clone())
                .or_default();

            for target in targets {
                if entry.contains(target) {
                    continue;
                }
                if !needs.contains_key(target) {
                    if !link_type.allow_dead_links {
                        return Err(TraceError::DeadLink {
                            record: id.clone(),
                            link: link.clone(),
                            target: target.clone(),
                        });
                    }
                    dead.push(DeadLink {
                        source: id.clone(),
                        link: link.clone(),
                        target: target.clone(),
                    });
                }
                entry.push(target.clone());
            }
        }
    }

    let mut incoming: LinkMap = BTreeMap::new();
    for (source, links) in &outgoing {
        for (link, targets) in links {
            for target in targets.iter().filter(|t| needs.contains_key(*t)) {
                incoming
                    .entry(target.clone())
                    .or_default()
                    .entry(link.clone())
                    .or_default()
                    .push(source.clone());
            }
        }
    }

    Ok(ResolvedLinks {
        outgoing,
        incoming,
        dead,
    })
}

// ---------------------------------------------------------------------------
// TraceGraph
// ---------------------------------------------------------------------------

/// How far a requirement has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing covers it.
    Uncovered,
    /// Covered, but no result reports PASS or FAIL.
    Unverified,
    Passed,
    Failed,
}

/// One line of the coverage summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRow {
    pub id: String,
    pub title: String,
    pub covered_by: Vec<String>,
    pub results: Vec<String>,
    pub verdict: Verdict,
}

/// Validated, resolved record set.
#[derive(Debug, Clone)]
pub struct TraceGraph {
    needs: BTreeMap<String, Need>,
    links: ResolvedLinks,
    config: TraceConfig,
}

const COVERS: &str = "covers";
const VALIDATES: &str = "validates";

impl TraceGraph {
    /// Check ids and link types, then resolve every link.
    pub fn build(needs: Vec<Need>, config: &TraceConfig) -> TraceResult<Self> {
        let mut by_id = BTreeMap::new();
        for need in needs {
            if !config.is_valid_id(&need.id) {
                return Err(TraceError::InvalidId {
                    id: need.id,
                    min_len: config.id_min_len,
                });
            }
            if by_id.contains_key(&need.id) {
                return Err(TraceError::DuplicateId(need.id));
            }
            by_id.insert(need.id.clone(), need);
        }

        let links = resolve(&by_id, config)?;
        for d in &links.dead {
            log::warn!("{} --{}--> {}: target not found", d.source, d.link, d.target);
        }

        Ok(TraceGraph {
            needs: by_id,
            links,
            config: config.clone(),
        })
    }

    /// Rebuild with `need` added, replacing any record with the same id.
    pub fn with_record(&self, need: Need) -> TraceResult<Self> {
        let mut needs: Vec<Need> = self
            .needs
            .values()
            .filter(|n| n.id != need.id)
            .cloned()
            .collect();
        needs.push(need);
        Self::build(needs, &self.config)
    }

    pub fn len(&self) -> usize {
        self.needs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.needs.is_empty()
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn need(&self, id: &str) -> Option<&Need> {
        self.needs.get(id)
    }

    /// Records in id order.
    pub fn needs(&self) -> impl Iterator<Item = &Need> {
        self.needs.values()
    }

    pub fn dead_links(&self) -> &[DeadLink] {
        &self.links.dead
    }

    pub fn outgoing(&self, id: &str, link: &str) -> &[String] {
        lookup(&self.links.outgoing, id, link)
    }

    pub fn incoming(&self, id: &str, link: &str) -> &[String] {
        lookup(&self.links.incoming, id, link)
    }

    /// Results that validate `id`, directly or through chains of `covers`
    /// (result → test case → specification → requirement).
    pub fn validated_by(&self, id: &str) -> TraceResult<Vec<String>> {
        if !self.needs.contains_key(id) {
            return Err(TraceError::UnknownRecord(id.to_string()));
        }

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([id.to_string()]);
        let mut results = BTreeSet::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            results.extend(self.incoming(&current, VALIDATES).iter().cloned());
            for coverer in self.incoming(&current, COVERS) {
                if !visited.contains(coverer) {
                    queue.push_back(coverer.clone());
                }
            }
        }

        Ok(results.into_iter().collect())
    }

    /// Coverage and verification state of every requirement.
    pub fn coverage(&self) -> Vec<CoverageRow> {
        self.needs
            .values()
            .filter(|n| n.kind == NeedKind::Requirement)
            .map(|req| {
                let covered_by = self.incoming(&req.id, COVERS).to_vec();
                // The id comes from the graph itself, so the lookup cannot fail.
                let results = self.validated_by(&req.id).unwrap_or_default();

                let verdicts: Vec<Option<bool>> = results
                    .iter()
                    .filter_map(|r| self.need(r))
                    .map(Need::verdict)
                    .collect();
                let verdict = if covered_by.is_empty() {
                    Verdict::Uncovered
                } else if verdicts.contains(&Some(false)) {
                    Verdict::Failed
                } else if verdicts.contains(&Some(true)) {
                    Verdict::Passed
                } else {
                    Verdict::Unverified
                };

                CoverageRow {
                    id: req.id.clone(),
                    title: req.title.clone(),
                    covered_by,
                    results,
                    verdict,
                }
            })
            .collect()
    }
}

fn lookup<'a>(map: &'a LinkMap, id: &str, link: &str) -> &'a [String] {
    map.get(id)
        .and_then(|links| links.get(link))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkTypeConfig;

    fn sample() -> Vec<Need> {
        vec![
            Need::new("REQ_TX_001", NeedKind::Requirement, "TX gain in band"),
            Need::new("REQ_RX_001", NeedKind::Requirement, "RX sensitivity"),
            Need::new("SPEC_TX_GAIN", NeedKind::Specification, "Gain 14..16 dB")
                .with_links("covers", &["REQ_TX_001"]),
            Need::new("TC_TX_001", NeedKind::TestCase, "TX gain sweep")
                .with_links("covers", &["SPEC_TX_GAIN"]),
            Need::new("TR_TX_001", NeedKind::TestResult, "Sweep run 1")
                .with_status("PASS")
                .with_links("validates", &["TC_TX_001"]),
        ]
    }

    fn graph() -> TraceGraph {
        TraceGraph::build(sample(), &TraceConfig::default()).unwrap()
    }

    #[test]
    fn test_reverse_links() {
        let g = graph();
        assert_eq!(g.incoming("REQ_TX_001", "covers"), ["SPEC_TX_GAIN".to_string()]);
        assert_eq!(g.incoming("TC_TX_001", "validates"), ["TR_TX_001".to_string()]);
        assert_eq!(g.outgoing("TC_TX_001", "covers"), ["SPEC_TX_GAIN".to_string()]);
        assert!(g.incoming("TR_TX_001", "covers").is_empty());
    }

    #[test]
    fn test_validated_by_is_transitive() {
        let g = graph();
        assert_eq!(g.validated_by("REQ_TX_001").unwrap(), vec!["TR_TX_001".to_string()]);
        assert_eq!(g.validated_by("SPEC_TX_GAIN").unwrap(), vec!["TR_TX_001".to_string()]);
        assert!(g.validated_by("REQ_RX_001").unwrap().is_empty());
        assert_eq!(
            g.validated_by("NOPE_00001"),
            Err(TraceError::UnknownRecord("NOPE_00001".to_string()))
        );
    }

    #[test]
    fn test_coverage() {
        let rows = graph().coverage();
        assert_eq!(rows.len(), 2);
        let rx = rows.iter().find(|r| r.id == "REQ_RX_001").unwrap();
        assert_eq!(rx.verdict, Verdict::Uncovered);
        let tx = rows.iter().find(|r| r.id == "REQ_TX_001").unwrap();
        assert_eq!(tx.verdict, Verdict::Passed);
        assert_eq!(tx.covered_by, vec!["SPEC_TX_GAIN".to_string()]);
    }

    #[test]
    fn test_failed_result_wins() {
        let g = graph()
            .with_record(
                Need::new("TR_TX_002", NeedKind::TestResult, "Sweep run 2")
                    .with_status("FAIL")
                    .with_links("validates", &["TC_TX_001"]),
            )
            .unwrap();
        let tx = g.coverage().into_iter().find(|r| r.id == "REQ_TX_001").unwrap();
        assert_eq!(tx.verdict, Verdict::Failed);
        assert_eq!(tx.results.len(), 2);
    }

    #[test]
    fn test_with_record_replaces() {
        let g = graph()
            .with_record(
                Need::new("TR_TX_001", NeedKind::TestResult, "Sweep run 1")
                    .with_status("FAIL")
                    .with_links("validates", &["TC_TX_001"]),
            )
            .unwrap();
        assert_eq!(g.len(), 5);
        assert_eq!(g.need("TR_TX_001").unwrap().verdict(), Some(false));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let g = graph();
        let again = resolve(&g.needs, g.config()).unwrap();
        assert_eq!(again, g.links);
        assert_eq!(g.validated_by("REQ_TX_001").unwrap(), g.validated_by("REQ_TX_001").unwrap());
    }

    #[test]
    fn test_cycle_terminates() {
        let needs = vec![
            Need::new("SPEC_A", NeedKind::Specification, "a").with_links("covers", &["SPEC_B"]),
            Need::new("SPEC_B", NeedKind::Specification, "b").with_links("covers", &["SPEC_A"]),
            Need::new("TC_AAAA", NeedKind::TestCase, "t").with_links("covers", &["SPEC_A"]),
            Need::new("TR_AAAA", NeedKind::TestResult, "r").with_links("validates", &["TC_AAAA"]),
        ];
        let g = TraceGraph::build(needs, &TraceConfig::default()).unwrap();
        assert_eq!(g.validated_by("SPEC_B").unwrap(), vec!["TR_AAAA".to_string()]);
    }

    #[test]
    fn test_dead_links() {
        let needs = vec![Need::new("TC_TX_009", NeedKind::TestCase, "t").with_links("covers", &["REQ_GONE_1"])];
        let g = TraceGraph::build(needs.clone(), &TraceConfig::default()).unwrap();
        assert_eq!(
            g.dead_links(),
            [DeadLink {
                source: "TC_TX_009".to_string(),
                link: "covers".to_string(),
                target: "REQ_GONE_1".to_string(),
            }]
        );
        assert!(g.incoming("REQ_GONE_1", "covers").is_empty());

        let mut strict = TraceConfig::default();
        strict.link_types = vec![LinkTypeConfig {
            option: "covers".to_string(),
            outgoing: "covers".to_string(),
            incoming: "covered by".to_string(),
            allow_dead_links: false,
        }];
        let err = TraceGraph::build(needs, &strict).unwrap_err();
        assert!(matches!(err, TraceError::DeadLink { .. }));
    }

    #[test]
    fn test_invalid_and_duplicate_ids() {
        let err = TraceGraph::build(vec![Need::new("R1", NeedKind::Requirement, "x")], &TraceConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            TraceError::InvalidId {
                id: "R1".to_string(),
                min_len: 5
            }
        );

        let dup = vec![
            Need::new("REQ_00001", NeedKind::Requirement, "a"),
            Need::new("REQ_00001", NeedKind::Requirement, "b"),
        ];
        assert_eq!(
            TraceGraph::build(dup, &TraceConfig::default()).unwrap_err(),
            TraceError::DuplicateId("REQ_00001".to_string())
        );
    }

    #[test]
    fn test_unknown_link_type() {
        let needs = vec![Need::new("REQ_00001", NeedKind::Requirement, "a").with_links("implements", &["REQ_00002"])];
        let err = TraceGraph::build(needs, &TraceConfig::default()).unwrap_err();
        assert!(matches!(err, TraceError::UnknownLinkType { .. }));
    }

    #[test]
    fn test_duplicate_targets_collapse() {
        let needs = vec![
            Need::new("REQ_00001", NeedKind::Requirement, "a"),
            Need::new("SPEC_0001", NeedKind::Specification, "s").with_links("covers", &["REQ_00001", "REQ_00001"]),
        ];
        let g = TraceGraph::build(needs, &TraceConfig::default()).unwrap();
        assert_eq!(g.outgoing("SPEC_0001", "covers").len(), 1);
        assert_eq!(g.incoming("REQ_00001", "covers").len(), 1);
    }
}
