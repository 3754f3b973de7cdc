//! Arena of features rooted at the master card.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use crease_kernel_math::{distance, Point2};
use crease_kernel_topo::{Edge, EdgeKind};
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::feature::{Attachment, EdgeCache, FeatureKind, FeatureOption, FoldFeature, Generated, Validity};
use crate::{FeatureError, FeatureId, FeatureParams, Result};

/// The fold tree.
///
/// Features live in a slotmap and refer to each other by [`FeatureId`].
/// The root is always the master card; every other feature is attached to
/// the fold it crosses.
#[derive(Debug, Clone)]
pub struct FeatureTree {
    features: SlotMap<FeatureId, FoldFeature>,
    order: Vec<FeatureId>,
    root: FeatureId,
}

impl FeatureTree {
    /// Tree holding only a master card between two corners.
    pub fn new(top_left: Point2, bottom_right: Point2) -> Self {
        let mut features = SlotMap::with_key();
        let root = features.insert(FoldFeature::master_card(top_left, bottom_right));
        Self {
            features,
            order: vec![root],
            root,
        }
    }

    /// The master card.
    pub fn root(&self) -> FeatureId {
        self.root
    }

    /// Look up a feature.
    pub fn get(&self, id: FeatureId) -> Option<&FoldFeature> {
        self.features.get(id)
    }

    /// Look up a feature that must exist.
    pub fn feature(&self, id: FeatureId) -> Result<&FoldFeature> {
        self.features.get(id).ok_or(FeatureError::UnknownFeature(id))
    }

    /// Mutable access. Cached edges follow the change on the next query.
    pub fn get_mut(&mut self, id: FeatureId) -> Result<&mut FoldFeature> {
        self.features
            .get_mut(id)
            .ok_or(FeatureError::UnknownFeature(id))
    }

    /// Feature ids in creation order.
    pub fn ids(&self) -> &[FeatureId] {
        &self.order
    }

    /// Features in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &FoldFeature)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.features.get(*id).map(|f| (*id, f)))
    }

    /// Number of features, the master card included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Never true: the master card is always present.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Link `feature` under `attachment.parent` and return its id.
    pub fn attach(&mut self, mut feature: FoldFeature, attachment: Attachment) -> Result<FeatureId> {
        if feature.kind() == FeatureKind::MasterCard {
            return Err(FeatureError::AlreadyAttached);
        }
        if feature.start.is_none() || feature.end.is_none() {
            return Err(FeatureError::MissingAnchor);
        }
        let parent = attachment.parent;
        if !self.features.contains_key(parent) {
            return Err(FeatureError::UnknownFeature(parent));
        }

        feature.attachment = Some(attachment);
        feature.cache = None;
        let kind = feature.kind();
        let id = self.features.insert(feature);
        if let Some(p) = self.features.get_mut(parent) {
            p.children.push(id);
        }
        self.order.push(id);
        info!(?id, ?parent, ?kind, "attached feature");
        Ok(id)
    }

    /// Remove a feature and all of its descendants, returned in removal
    /// order (the feature first).
    pub fn remove(&mut self, id: FeatureId) -> Result<Vec<FoldFeature>> {
        if id == self.root {
            return Err(FeatureError::CannotRemoveRoot);
        }
        let parent = self.feature(id)?.parent();

        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            if let Some(f) = self.features.get(doomed[i]) {
                doomed.extend_from_slice(&f.children);
            }
            i += 1;
        }

        if let Some(p) = parent.and_then(|p| self.features.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        self.order.retain(|f| !doomed.contains(f));
        let removed: Vec<FoldFeature> = doomed
            .iter()
            .filter_map(|f| self.features.remove(*f))
            .collect();
        info!(?id, count = removed.len(), "removed feature");
        Ok(removed)
    }

    fn fingerprint(&self, id: FeatureId, params: &FeatureParams) -> Result<u64> {
        let feature = self.feature(id)?;
        let mut h = DefaultHasher::new();
        feature.hash_footprint(&mut h);
        params.hash_into(&mut h);
        for child in feature.children.iter().filter_map(|c| self.features.get(*c)) {
            child.hash_footprint(&mut h);
        }
        Ok(h.finish())
    }

    fn generated(&mut self, id: FeatureId, params: &FeatureParams) -> Result<&Generated> {
        let key = self.fingerprint(id, params)?;
        let feature = self.feature(id)?;
        let hit = feature.cache.as_ref().is_some_and(|c| c.key == key);
        if hit {
            debug!(?id, "edge cache hit");
        } else {
            debug!(?id, "edge cache miss");
            let children: Vec<&FoldFeature> = feature
                .children
                .iter()
                .filter_map(|c| self.features.get(*c))
                .collect();
            let generated = feature.generate(&children, params);
            let feature = self.get_mut(id)?;
            feature.validity = generated.validity;
            feature.cache = Some(EdgeCache { key, generated });
        }
        self.feature(id)?
            .cache
            .as_ref()
            .map(|c| &c.generated)
            .ok_or(FeatureError::UnknownFeature(id))
    }

    /// The feature's edges, folds first.
    pub fn edges(&mut self, id: FeatureId, params: &FeatureParams) -> Result<&[Edge]> {
        Ok(&self.generated(id, params)?.edges)
    }

    /// The feature's horizontal folds after splitting, sorted by y.
    pub fn horizontal_folds(&mut self, id: FeatureId, params: &FeatureParams) -> Result<&[Edge]> {
        Ok(&self.generated(id, params)?.horizontal_folds)
    }

    /// Validity of the feature's current edges.
    pub fn validity(&mut self, id: FeatureId, params: &FeatureParams) -> Result<Validity> {
        Ok(self.generated(id, params)?.validity)
    }

    /// The first fold, in creation order of the features, that `feature`
    /// spans.
    pub fn find_spanned_fold(
        &mut self,
        feature: &FoldFeature,
        params: &FeatureParams,
    ) -> Result<Option<Attachment>> {
        for i in 0..self.order.len() {
            let id = self.order[i];
            for fold in self.horizontal_folds(id, params)? {
                if fold.kind != EdgeKind::Fold {
                    continue;
                }
                if let Some(crossings) = feature.spans_fold(fold, params) {
                    debug!(parent = ?id, crossings = crossings.len(), "span test passed");
                    return Ok(Some(Attachment {
                        parent: id,
                        fold: fold.clone(),
                        crossings,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// The edge of `id` passing within the feature hit radius of `point`.
    pub fn feature_edge_at_point(
        &mut self,
        id: FeatureId,
        point: &Point2,
        params: &FeatureParams,
    ) -> Result<Option<Edge>> {
        let radius = params.hit_test_radius * params.feature_hit_scale;
        let inc = params.bezier_increments;
        Ok(self
            .edges(id, params)?
            .iter()
            .filter_map(|e| {
                e.hit_test(point, radius, inc)
                    .map(|q| (distance(point, &q), e))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, e)| e.clone()))
    }

    /// The most recently drawn feature with an edge near `point`.
    pub fn feature_at(&mut self, point: &Point2, params: &FeatureParams) -> Result<Option<FeatureId>> {
        let ids: Vec<FeatureId> = self.order.iter().rev().copied().collect();
        for id in ids {
            if self.feature_edge_at_point(id, point, params)?.is_some() {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Edits offered when `id` is tapped.
    pub fn tap_options(&mut self, id: FeatureId, params: &FeatureParams) -> Result<Vec<FeatureOption>> {
        let folds = self.horizontal_folds(id, params)?.len();
        Ok(self.feature(id)?.tap_options(folds))
    }

    /// Check the tree links.
    ///
    /// The root is the only master card and the only feature without a
    /// parent; every parent lists its children and every child points back;
    /// following parents always reaches the root.
    pub fn validate(&self) -> Result<()> {
        for (id, f) in self.iter() {
            let broken = FeatureError::BrokenTree(id);
            let is_root = id == self.root;
            if is_root != (f.kind() == FeatureKind::MasterCard) || is_root != f.parent().is_none() {
                return Err(broken);
            }
            if let Some(parent) = f.parent() {
                let listed = self
                    .features
                    .get(parent)
                    .is_some_and(|p| p.children.contains(&id));
                if !listed {
                    return Err(broken);
                }
            }
            for child in &f.children {
                if self.features.get(*child).and_then(|c| c.parent()) != Some(id) {
                    return Err(broken);
                }
            }

            let mut cursor = f.parent();
            let mut steps = 0;
            while let Some(p) = cursor {
                steps += 1;
                if steps > self.order.len() {
                    return Err(broken);
                }
                cursor = self.features.get(p).and_then(|pf| pf.parent());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn card() -> FeatureTree {
        FeatureTree::new(p(0.0, 0.0), p(200.0, 300.0))
    }

    fn placed_box(start: Point2, end: Point2) -> FoldFeature {
        let mut b = FoldFeature::box_fold(start);
        b.end = Some(end);
        b
    }

    fn attach_box(tree: &mut FeatureTree, start: Point2, end: Point2) -> FeatureId {
        let params = FeatureParams::default();
        let b = placed_box(start, end);
        let attachment = tree.find_spanned_fold(&b, &params).unwrap().unwrap();
        tree.attach(b, attachment).unwrap()
    }

    #[test]
    fn test_tree_invariant_holds() {
        let mut tree = card();
        let a = attach_box(&mut tree, p(50.0, 100.0), p(150.0, 200.0));
        tree.validate().unwrap();

        let root = tree.root();
        assert_eq!(tree.feature(a).unwrap().parent(), Some(root));
        assert!(tree.feature(a).unwrap().driving_fold().is_some());
        assert!(tree.feature(root).unwrap().parent().is_none());
        assert!(tree.feature(root).unwrap().driving_fold().is_none());
        let parentless = tree.iter().filter(|(_, f)| f.parent().is_none()).count();
        assert_eq!(parentless, 1);
    }

    #[test]
    fn test_nested_box_hangs_off_middle_fold() {
        let params = FeatureParams::default();
        let mut tree = card();
        let a = attach_box(&mut tree, p(50.0, 100.0), p(150.0, 200.0));
        let b = attach_box(&mut tree, p(70.0, 120.0), p(130.0, 170.0));
        assert_eq!(tree.feature(b).unwrap().parent(), Some(a));
        assert_eq!(tree.feature(b).unwrap().driving_fold().unwrap().start.y, 150.0);

        // A's middle fold is now split around B.
        let ys: Vec<f64> = tree
            .horizontal_folds(a, &params)
            .unwrap()
            .iter()
            .map(|e| e.start.y)
            .collect();
        assert_eq!(ys, vec![100.0, 150.0, 150.0, 200.0]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_attach_rejects_bad_input() {
        let mut tree = card();
        let root = tree.root();
        let fold = Edge::straight(p(0.0, 150.0), p(200.0, 150.0), EdgeKind::Fold);
        let link = |parent| Attachment {
            parent,
            fold: fold.clone(),
            crossings: vec![p(100.0, 150.0)],
        };

        let master = FoldFeature::master_card(p(0.0, 0.0), p(10.0, 10.0));
        assert_eq!(tree.attach(master, link(root)), Err(FeatureError::AlreadyAttached));

        let unplaced = FoldFeature::box_fold(p(50.0, 100.0));
        assert_eq!(tree.attach(unplaced, link(root)), Err(FeatureError::MissingAnchor));

        let gone = attach_box(&mut tree, p(50.0, 100.0), p(150.0, 200.0));
        tree.remove(gone).unwrap();
        let b = placed_box(p(50.0, 100.0), p(150.0, 200.0));
        assert_eq!(tree.attach(b, link(gone)), Err(FeatureError::UnknownFeature(gone)));
    }

    #[test]
    fn test_remove_is_recursive() {
        let params = FeatureParams::default();
        let mut tree = card();
        let root = tree.root();
        let a = attach_box(&mut tree, p(50.0, 100.0), p(150.0, 200.0));
        let b = attach_box(&mut tree, p(70.0, 120.0), p(130.0, 170.0));
        assert_eq!(tree.horizontal_folds(root, &params).unwrap().len(), 2);

        let removed = tree.remove(a).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(tree.len(), 1);
        assert!(tree.get(b).is_none());
        assert!(tree.feature(root).unwrap().is_leaf());
        assert_eq!(tree.horizontal_folds(root, &params).unwrap().len(), 1);
        assert_eq!(tree.remove(root), Err(FeatureError::CannotRemoveRoot));
        tree.validate().unwrap();
    }

    #[test]
    fn test_cache_follows_child_anchors() {
        let params = FeatureParams::default();
        let mut tree = card();
        let root = tree.root();
        let a = attach_box(&mut tree, p(50.0, 100.0), p(150.0, 200.0));
        let right = tree.horizontal_folds(root, &params).unwrap()[1].start.x;
        assert_eq!(right, 150.0);

        tree.get_mut(a).unwrap().end = Some(p(170.0, 200.0));
        let right = tree.horizontal_folds(root, &params).unwrap()[1].start.x;
        assert_eq!(right, 170.0);
        // A fresh query with nothing changed reuses the same edges.
        let again = tree.horizontal_folds(root, &params).unwrap()[1].start.x;
        assert_eq!(again, 170.0);
    }

    #[test]
    fn test_no_span_outside_folds() {
        let params = FeatureParams::default();
        let mut tree = card();
        let b = placed_box(p(50.0, 10.0), p(150.0, 60.0));
        assert!(tree.find_spanned_fold(&b, &params).unwrap().is_none());
    }

    #[test]
    fn test_feature_at_prefers_latest() {
        let params = FeatureParams::default();
        let mut tree = card();
        let root = tree.root();
        let a = attach_box(&mut tree, p(50.0, 100.0), p(150.0, 200.0));
        assert_eq!(tree.feature_at(&p(100.0, 1.0), &params).unwrap(), Some(root));
        assert_eq!(tree.feature_at(&p(100.0, 101.0), &params).unwrap(), Some(a));
        assert_eq!(tree.feature_at(&p(100.0, 250.0), &params).unwrap(), None);

        let edge = tree.feature_edge_at_point(a, &p(100.0, 101.0), &params).unwrap();
        assert_eq!(edge.unwrap().start.y, 100.0);
        assert!(tree.tap_options(root, &params).unwrap().is_empty());
        assert_eq!(
            tree.tap_options(a, &params).unwrap(),
            vec![FeatureOption::DeleteFeature, FeatureOption::AddFolds]
        );
    }
}
