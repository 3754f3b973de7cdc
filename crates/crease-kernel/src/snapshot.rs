//! Persisted sketches.
//!
//! A snapshot lists features in creation order, so every parent index is
//! smaller than the index of its children and the master card comes first.
//! Loading replays the attachments in that order, which rebuilds the same
//! tree topology; edges are regenerated rather than trusted.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use crease_kernel_feature::{Attachment, FeatureVariant, FoldFeature, Validity};
use crease_kernel_math::Point2;
use crease_kernel_topo::{Edge, EdgeSignature};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::sketch::Sketch;
use crate::{Result, SketchError};

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One persisted feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Variant payload.
    pub variant: FeatureVariant,
    /// Start anchor.
    pub start: Option<Point2>,
    /// End anchor.
    pub end: Option<Point2>,
    /// Validity at save time.
    pub validity: Validity,
    /// Index of the parent record.
    pub parent: Option<usize>,
    /// Indices of the child records, in attachment order.
    #[serde(default)]
    pub children: Vec<usize>,
    /// The parent fold this feature crosses.
    pub driving_fold: Option<Edge>,
    /// Where the outline crosses the driving fold.
    #[serde(default)]
    pub crossings: Vec<Point2>,
    /// Horizontal folds at save time.
    #[serde(default)]
    pub horizontal_folds: Vec<Edge>,
}

/// A whole sketch, ready for JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchSnapshot {
    /// Format version.
    pub version: u32,
    /// Master card corner.
    pub top_left: Point2,
    /// Opposite master card corner.
    pub bottom_right: Point2,
    /// Features in creation order, master card first.
    pub features: Vec<FeatureRecord>,
    /// Edges the user erased.
    #[serde(default)]
    pub erased: Vec<EdgeSignature>,
}

impl SketchSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON. The tree is not checked until it is loaded
    /// into a [`Sketch`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check index consistency.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SketchError::InvalidSnapshot(msg));
        if self.version != SNAPSHOT_VERSION {
            return invalid(format!("unsupported version {}", self.version));
        }
        let Some(first) = self.features.first() else {
            return invalid("no master card".into());
        };
        if !matches!(first.variant, FeatureVariant::MasterCard(_)) || first.parent.is_some() {
            return invalid("first feature must be the root master card".into());
        }

        let mut children = vec![Vec::new(); self.features.len()];
        for (i, record) in self.features.iter().enumerate().skip(1) {
            if matches!(record.variant, FeatureVariant::MasterCard(_)) {
                return invalid(format!("feature {i} is a second master card"));
            }
            let Some(parent) = record.parent else {
                return invalid(format!("feature {i} is a second root"));
            };
            if parent >= self.features.len() {
                return invalid(format!("feature {i} has dangling parent {parent}"));
            }
            // Forward or self references are the only way to form a cycle.
            if parent >= i {
                return invalid(format!("feature {i} has parent {parent} that does not precede it"));
            }
            if record.driving_fold.is_none() {
                return invalid(format!("feature {i} has a parent but no driving fold"));
            }
            children[parent].push(i);
        }
        if first.driving_fold.is_some() {
            return invalid("the master card has a driving fold".into());
        }
        for (i, (record, expected)) in self.features.iter().zip(&children).enumerate() {
            if &record.children != expected {
                return invalid(format!("children of feature {i} disagree with parent links"));
            }
        }
        Ok(())
    }
}

impl Sketch {
    /// Capture the sketch.
    pub fn snapshot(&mut self) -> Result<SketchSnapshot> {
        let root = self.tree.root();
        let master = self.tree.feature(root)?;
        let (top_left, bottom_right) = match (master.start, master.end) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(SketchError::InvalidSnapshot("master card has no corners".into())),
        };

        let ids = self.tree.ids().to_vec();
        let index: HashMap<_, _> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut features = Vec::with_capacity(ids.len());
        for id in ids {
            let horizontal_folds = self.tree.horizontal_folds(id, &self.params)?.to_vec();
            let f = self.tree.feature(id)?;
            let attachment = f.attachment();
            features.push(FeatureRecord {
                variant: f.variant.clone(),
                start: f.start,
                end: f.end,
                validity: f.validity(),
                parent: f.parent().and_then(|p| index.get(&p).copied()),
                children: f.children().iter().filter_map(|c| index.get(c).copied()).collect(),
                driving_fold: attachment.map(|a| a.fold.clone()),
                crossings: attachment.map(|a| a.crossings.clone()).unwrap_or_default(),
                horizontal_folds,
            });
        }

        Ok(SketchSnapshot {
            version: SNAPSHOT_VERSION,
            top_left,
            bottom_right,
            features,
            erased: self.erased.iter().copied().collect(),
        })
    }

    /// Rebuild a sketch from a snapshot.
    pub fn from_snapshot(snapshot: &SketchSnapshot, config: EngineConfig) -> Result<Self> {
        snapshot.validate()?;
        let mut sketch = Sketch::new(snapshot.top_left, snapshot.bottom_right, config)?;
        let mut ids = vec![sketch.tree.root()];
        for record in snapshot.features.iter().skip(1) {
            let (Some(parent), Some(fold)) = (record.parent, record.driving_fold.clone()) else {
                return Err(SketchError::InvalidSnapshot("feature without parent link".into()));
            };
            let feature = FoldFeature::from_parts(
                record.variant.clone(),
                record.start,
                record.end,
                record.validity,
            );
            let attachment = Attachment {
                parent: ids[parent],
                fold,
                crossings: record.crossings.clone(),
            };
            ids.push(sketch.tree.attach(feature, attachment)?);
        }
        sketch.tree.validate()?;
        sketch.erased = snapshot.erased.iter().copied().collect();
        sketch.refresh()?;
        Ok(sketch)
    }

    /// Write the sketch as JSON.
    pub fn save(&mut self, path: &Path) -> anyhow::Result<()> {
        let json = self.snapshot()?.to_json()?;
        std::fs::write(path, json).with_context(|| format!("writing sketch {}", path.display()))?;
        info!(path = %path.display(), "saved sketch");
        Ok(())
    }

    /// Read a sketch saved with [`Sketch::save`].
    pub fn load(path: &Path, config: EngineConfig) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading sketch {}", path.display()))?;
        let snapshot = SketchSnapshot::from_json(&json)
            .with_context(|| format!("parsing sketch {}", path.display()))?;
        let sketch = Self::from_snapshot(&snapshot, config)
            .with_context(|| format!("rebuilding sketch {}", path.display()))?;
        info!(path = %path.display(), features = snapshot.features.len(), "loaded sketch");
        Ok(sketch)
    }
}
