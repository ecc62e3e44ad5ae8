use crate::config::ImpactConfig;
use atlas_fact_store::FactStore;
use atlas_protocol::{FactFilter, NodeId, Predicate, Result};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ImpactReport {
    pub target: String,
    pub direct_callers: Vec<String>,
    pub indirect_callers: Vec<String>,
    pub affected_files: Vec<String>,
    pub test_files: Vec<String>,
    pub test_coverage_ratio: f32,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Blast-radius analysis for changing one symbol.
///
/// Direct callers come from a single query; indirect callers from a
/// depth-bounded DFS whose visited set is seeded with the target, so the
/// result never contains the target and never duplicates. A failing
/// sub-query contributes nothing instead of failing the call.
pub async fn analyze_impact<S: FactStore + ?Sized>(
    store: &S,
    entity_id: &str,
    max_depth: usize,
    config: &ImpactConfig,
) -> Result<ImpactReport> {
    let direct_callers = callers_of(store, entity_id)
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|caller| caller != entity_id)
        .collect::<Vec<_>>();

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(entity_id.to_string());
    visited.extend(direct_callers.iter().cloned());

    let mut indirect_callers = Vec::new();
    let mut stack: Vec<(String, usize)> = direct_callers
        .iter()
        .map(|caller| (caller.clone(), 1))
        .collect();

    while let Some((id, depth)) = stack.pop() {
        if depth >= max_depth {
            continue;
        }
        let callers = match callers_of(store, &id).await {
            Ok(callers) => callers,
            Err(err) => {
                log::debug!("indirect caller lookup failed for {id}: {err}");
                continue;
            }
        };
        for caller in callers {
            if visited.insert(caller.clone()) {
                indirect_callers.push(caller.clone());
                stack.push((caller, depth + 1));
            }
        }
    }

    let mut affected_files: Vec<String> = direct_callers
        .iter()
        .chain(indirect_callers.iter())
        .filter_map(|id| {
            NodeId::parse(id)
                .ok()
                .and_then(|node| node.containing_file().map(str::to_string))
        })
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    affected_files.sort();

    let (test_files, test_coverage_ratio) =
        discover_tests(store, &affected_files).await.unwrap_or_default();

    let (risk_level, risk_factors) = score_risk(
        config,
        direct_callers.len(),
        indirect_callers.len(),
        affected_files.len(),
        test_coverage_ratio,
    );
    let recommendations = recommend(config, risk_level, test_coverage_ratio);

    Ok(ImpactReport {
        target: entity_id.to_string(),
        direct_callers,
        indirect_callers,
        affected_files,
        test_files,
        test_coverage_ratio,
        risk_level,
        risk_factors,
        recommendations,
    })
}

async fn callers_of<S: FactStore + ?Sized>(store: &S, id: &str) -> Result<Vec<String>> {
    let facts = store
        .find(&FactFilter::object(id).with_predicate(Predicate::Calls))
        .await?;
    let mut seen = HashSet::new();
    Ok(facts
        .into_iter()
        .map(|fact| fact.subject)
        .filter(|subject| seen.insert(subject.clone()))
        .collect())
}

/// Filename-pattern test discovery against the graph's file nodes.
///
/// A heuristic, not a build-system-aware lookup: conventional names
/// (`*.spec.*`, `*.test.*`, `__tests__/`, mirrored `tests/` trees,
/// `test_*`/`*_test` stems) are matched against each affected file's stem.
async fn discover_tests<S: FactStore + ?Sized>(
    store: &S,
    affected_files: &[String],
) -> Result<(Vec<String>, f32)> {
    if affected_files.is_empty() {
        return Ok((Vec::new(), 1.0));
    }

    let contains = store
        .find(&FactFilter::predicate(Predicate::Contains))
        .await?;
    let all_files: Vec<String> = contains
        .into_iter()
        .filter_map(|fact| {
            NodeId::parse(&fact.object)
                .ok()
                .and_then(|node| node.containing_file().map(str::to_string))
        })
        .collect();

    let mut test_files: HashSet<String> = HashSet::new();
    let mut covered = 0usize;
    for affected in affected_files {
        let stem = file_stem(affected);
        let mirror = format!("tests/{affected}");
        let mut found = false;
        for candidate in &all_files {
            if !is_test_path(candidate) {
                continue;
            }
            if candidate == &mirror || candidate.contains(stem) {
                test_files.insert(candidate.clone());
                found = true;
            }
        }
        if found {
            covered += 1;
        }
    }

    let ratio = covered as f32 / affected_files.len() as f32;
    let mut test_files: Vec<String> = test_files.into_iter().collect();
    test_files.sort();
    Ok((test_files, ratio))
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}

fn is_test_path(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = file_stem(path);
    name.contains(".spec.")
        || name.contains(".test.")
        || path.contains("__tests__/")
        || path.starts_with("tests/")
        || path.contains("/tests/")
        || stem.starts_with("test_")
        || stem.ends_with("_test")
}

fn score_risk(
    config: &ImpactConfig,
    direct: usize,
    indirect: usize,
    affected_files: usize,
    coverage: f32,
) -> (RiskLevel, Vec<String>) {
    let mut score = 0i32;
    let mut factors = Vec::new();
    let total_callers = direct + indirect;

    for (threshold, weight) in config.caller_bands {
        if total_callers >= threshold {
            score += weight;
            factors.push(format!("{total_callers} callers (threshold {threshold})"));
            break;
        }
    }
    for (threshold, weight) in config.file_bands {
        if affected_files >= threshold {
            score += weight;
            factors.push(format!(
                "{affected_files} affected files (threshold {threshold})"
            ));
            break;
        }
    }
    for (threshold, weight) in config.low_coverage_bands {
        if coverage < threshold {
            score += weight;
            factors.push(format!(
                "test coverage {:.0}% below {:.0}%",
                coverage * 100.0,
                threshold * 100.0
            ));
            break;
        }
    }
    if coverage >= config.high_coverage_ratio {
        score += config.high_coverage_bonus;
        factors.push(format!("test coverage {:.0}%", coverage * 100.0));
    }
    if direct > 0 && indirect as f32 > config.indirect_ratio * direct as f32 {
        score += config.indirect_weight;
        factors.push(format!(
            "{indirect} indirect callers exceed {}x the {direct} direct",
            config.indirect_ratio
        ));
    }

    let level = if score >= config.cutoffs.critical {
        RiskLevel::Critical
    } else if score >= config.cutoffs.high {
        RiskLevel::High
    } else if score >= config.cutoffs.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    (level, factors)
}

/// Template strings by risk level and coverage band. A rule lookup, not
/// derived from any model.
fn recommend(config: &ImpactConfig, level: RiskLevel, coverage: f32) -> Vec<String> {
    let mut out = Vec::new();
    out.push(
        match level {
            RiskLevel::Critical => {
                "Break the change into smaller increments and stage the rollout"
            }
            RiskLevel::High => "Review every call site before merging",
            RiskLevel::Medium => "Run the affected test suites and spot-check major callers",
            RiskLevel::Low => "Safe to proceed with standard review",
        }
        .to_string(),
    );

    if coverage < config.low_coverage_bands[0].0 {
        out.push("Add tests before changing this symbol; coverage is very low".to_string());
    } else if coverage < config.low_coverage_bands[1].0 {
        out.push("Consider adding tests around the most critical callers".to_string());
    } else if coverage >= config.high_coverage_ratio {
        out.push("Existing test coverage is strong; lean on the suite".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_fact_store::MemoryFactStore;
    use atlas_protocol::Fact;
    use pretty_assertions::assert_eq;

    fn calls(a: &str, b: &str) -> Fact {
        Fact::new(a, Predicate::Calls, b)
    }

    #[tokio::test]
    async fn direct_and_indirect_callers_are_separated() {
        let store = MemoryFactStore::with_facts(vec![
            calls("function:a.ts#one", "function:a.ts#target"),
            calls("function:b.ts#two", "function:a.ts#one"),
            calls("function:c.ts#three", "function:b.ts#two"),
        ]);

        let report = analyze_impact(&store, "function:a.ts#target", 5, &ImpactConfig::default())
            .await
            .unwrap();

        assert_eq!(report.direct_callers, vec!["function:a.ts#one"]);
        assert_eq!(
            report.indirect_callers,
            vec!["function:b.ts#two", "function:c.ts#three"]
        );
        assert_eq!(report.affected_files, vec!["a.ts", "b.ts", "c.ts"]);
    }

    #[tokio::test]
    async fn indirect_set_never_contains_the_target() {
        // Cycle back into the target plus a self-recursive caller.
        let store = MemoryFactStore::with_facts(vec![
            calls("function:a.ts#caller", "function:a.ts#target"),
            calls("function:a.ts#target", "function:a.ts#caller"),
            calls("function:a.ts#caller", "function:a.ts#caller"),
        ]);

        let report = analyze_impact(&store, "function:a.ts#target", 10, &ImpactConfig::default())
            .await
            .unwrap();

        assert!(!report
            .indirect_callers
            .contains(&"function:a.ts#target".to_string()));
        assert!(!report
            .direct_callers
            .contains(&"function:a.ts#target".to_string()));
        // No duplicates either.
        let mut deduped = report.indirect_callers.clone();
        deduped.dedup();
        assert_eq!(deduped, report.indirect_callers);
    }

    #[tokio::test]
    async fn depth_bounds_the_indirect_walk() {
        let store = MemoryFactStore::with_facts(vec![
            calls("function:a.ts#l1", "function:a.ts#target"),
            calls("function:a.ts#l2", "function:a.ts#l1"),
            calls("function:a.ts#l3", "function:a.ts#l2"),
        ]);

        let report = analyze_impact(&store, "function:a.ts#target", 2, &ImpactConfig::default())
            .await
            .unwrap();
        // Depth 1 expands direct callers; l3 sits past the bound.
        assert_eq!(report.indirect_callers, vec!["function:a.ts#l2"]);
    }

    #[tokio::test]
    async fn unknown_target_yields_empty_low_risk_report() {
        let store = MemoryFactStore::new();
        let report = analyze_impact(&store, "function:a.ts#ghost", 3, &ImpactConfig::default())
            .await
            .unwrap();
        assert!(report.direct_callers.is_empty());
        assert!(report.affected_files.is_empty());
        assert_eq!(report.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn many_callers_raise_the_risk_level() {
        let mut facts = Vec::new();
        for i in 0..25 {
            facts.push(calls(
                &format!("function:f{i}.ts#caller{i}"),
                "function:a.ts#target",
            ));
        }
        let store = MemoryFactStore::with_facts(facts);

        let report = analyze_impact(&store, "function:a.ts#target", 3, &ImpactConfig::default())
            .await
            .unwrap();

        // 25 callers (+3), 25 affected files (+2), zero coverage (+2) => critical.
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert!(!report.risk_factors.is_empty());
        assert!(!report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_files_improve_coverage_and_lower_risk() {
        let store = MemoryFactStore::with_facts(vec![
            calls("function:src/auth.ts#login_caller", "function:src/core.ts#target"),
            Fact::new("project:demo", Predicate::Contains, "file:src/auth.ts"),
            Fact::new("project:demo", Predicate::Contains, "file:src/auth.test.ts"),
        ]);

        let report = analyze_impact(&store, "function:src/core.ts#target", 3, &ImpactConfig::default())
            .await
            .unwrap();

        assert_eq!(report.test_files, vec!["src/auth.test.ts"]);
        assert_eq!(report.test_coverage_ratio, 1.0);
        assert_eq!(report.risk_level, RiskLevel::Low);
    }

    #[test]
    fn risk_banding_is_additive() {
        let config = ImpactConfig::default();

        let (level, _) = score_risk(&config, 2, 0, 1, 1.0);
        assert_eq!(level, RiskLevel::Low);

        let (level, _) = score_risk(&config, 6, 0, 2, 0.7);
        assert_eq!(level, RiskLevel::Low); // +1 callers only

        let (level, _) = score_risk(&config, 12, 0, 6, 0.7);
        assert_eq!(level, RiskLevel::Medium); // +2 callers, +1 files

        let (level, _) = score_risk(&config, 25, 0, 12, 0.1);
        assert_eq!(level, RiskLevel::Critical); // +3, +2, +2
    }

    #[test]
    fn indirect_heavy_graphs_add_risk() {
        let config = ImpactConfig::default();
        let (_, factors_light) = score_risk(&config, 4, 2, 1, 1.0);
        let (_, factors_heavy) = score_risk(&config, 4, 9, 1, 1.0);
        assert!(factors_heavy.len() > factors_light.len());
    }
}
