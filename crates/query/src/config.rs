use atlas_protocol::Predicate;

/// All traversal tunables in one overridable bundle.
///
/// The heuristic tables are deliberately simple named constants so behavior
/// stays reproducible and testable.
#[derive(Debug, Clone, Default)]
pub struct QueryConfig {
    pub hierarchy: HierarchyConfig,
    pub impact: ImpactConfig,
    pub related: RelatedFilesConfig,
    pub definitions: DefinitionConfig,
}

#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    /// Nodes with more immediate children are truncated to this many
    /// (first N in store order) and flagged as pruned.
    pub max_children: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { max_children: 50 }
    }
}

/// Additive risk scoring bands for impact analysis.
#[derive(Debug, Clone)]
pub struct ImpactConfig {
    pub caller_bands: [(usize, i32); 3],
    pub file_bands: [(usize, i32); 2],
    /// Coverage below these ratios adds risk.
    pub low_coverage_bands: [(f32, i32); 2],
    pub high_coverage_ratio: f32,
    pub high_coverage_bonus: i32,
    /// Added when indirect callers exceed this multiple of direct ones.
    pub indirect_ratio: f32,
    pub indirect_weight: i32,
    pub cutoffs: RiskCutoffs,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            caller_bands: [(20, 3), (10, 2), (5, 1)],
            file_bands: [(10, 2), (5, 1)],
            low_coverage_bands: [(0.3, 2), (0.6, 1)],
            high_coverage_ratio: 0.8,
            high_coverage_bonus: -1,
            indirect_ratio: 2.0,
            indirect_weight: 1,
            cutoffs: RiskCutoffs::default(),
        }
    }
}

/// Score-to-level mapping for impact risk.
#[derive(Debug, Clone)]
pub struct RiskCutoffs {
    pub critical: i32,
    pub high: i32,
    pub medium: i32,
}

impl Default for RiskCutoffs {
    fn default() -> Self {
        Self {
            critical: 6,
            high: 4,
            medium: 2,
        }
    }
}

/// Per-predicate weights for related-file scoring.
#[derive(Debug, Clone)]
pub struct RelationWeights {
    pub imports: f32,
    pub implements: f32,
    pub extends: f32,
    pub calls: f32,
    pub contains: f32,
    pub defines: f32,
    /// Any predicate without its own weight.
    pub fallback: f32,
}

impl RelationWeights {
    #[must_use]
    pub fn weight_for(&self, predicate: Predicate) -> f32 {
        match predicate {
            Predicate::Imports => self.imports,
            Predicate::Implements => self.implements,
            Predicate::Extends => self.extends,
            Predicate::Calls => self.calls,
            Predicate::Contains => self.contains,
            Predicate::Defines => self.defines,
            _ => self.fallback,
        }
    }
}

impl Default for RelationWeights {
    fn default() -> Self {
        Self {
            imports: 1.0,
            implements: 0.9,
            extends: 0.9,
            calls: 0.8,
            contains: 0.5,
            defines: 0.4,
            fallback: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelatedFilesConfig {
    pub weights: RelationWeights,
    /// Added per shared module when expansion is enabled.
    pub shared_dependency_weight: f32,
    pub include_shared_dependencies: bool,
    /// Normalized scores below this are dropped.
    pub min_score: f32,
}

impl Default for RelatedFilesConfig {
    fn default() -> Self {
        Self {
            weights: RelationWeights::default(),
            shared_dependency_weight: 0.3,
            include_shared_dependencies: true,
            min_score: 0.05,
        }
    }
}

/// Weighted blend producing a definition match confidence in [0, 1].
///
/// Components whose filter is absent (no type filter, no file hint) award
/// their full weight.
#[derive(Debug, Clone)]
pub struct ConfidenceWeights {
    pub name: f32,
    pub entity_type: f32,
    pub exact_type_bonus: f32,
    pub file_hint_exact: f32,
    pub file_hint_partial: f32,
    pub signature_presence: f32,
    pub line_range_presence: f32,
    pub exact_name_bonus: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            name: 0.4,
            entity_type: 0.2,
            exact_type_bonus: 0.05,
            file_hint_exact: 0.2,
            file_hint_partial: 0.1,
            signature_presence: 0.1,
            line_range_presence: 0.1,
            exact_name_bonus: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DefinitionConfig {
    pub weights: ConfidenceWeights,
    pub min_confidence: f32,
    pub max_results: usize,
}

impl Default for DefinitionConfig {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            min_confidence: 0.3,
            max_results: 20,
        }
    }
}
