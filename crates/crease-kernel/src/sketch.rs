//! The editable card.

use std::collections::BTreeSet;

use crease_kernel_feature::{
    FeatureId, FeatureKind, FeatureOption, FeatureParams, FeatureTree, FoldFeature, MasterCard,
    Validity,
};
use crease_kernel_geom::{curve_through_points, sample, simplify, Curve};
use crease_kernel_math::{distance, Point2, Rect};
use crease_kernel_plane::{assemble, fold_directions, Plane};
use crease_kernel_topo::{Edge, EdgeGraph, EdgeId, EdgeSignature};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::style::{Medium, StrokeStyle};
use crate::{Result, SketchError};

/// A pop-up card being designed.
///
/// Owns the fold tree, at most one feature being drawn, and the edge graph
/// and planes derived from the tree. The graph and planes are rebuilt
/// after every change to the tree.
#[derive(Debug, Clone)]
pub struct Sketch {
    pub(crate) config: EngineConfig,
    pub(crate) params: FeatureParams,
    pub(crate) tree: FeatureTree,
    active: Option<FoldFeature>,
    graph: EdgeGraph,
    planes: Vec<Plane>,
    master_top: Option<EdgeId>,
    pub(crate) erased: BTreeSet<EdgeSignature>,
}

impl Sketch {
    /// New card spanning two corners, holding only the master card.
    pub fn new(top_left: Point2, bottom_right: Point2, config: EngineConfig) -> Result<Self> {
        let params = config.feature_params();
        let mut sketch = Self {
            config,
            params,
            tree: FeatureTree::new(top_left, bottom_right),
            active: None,
            graph: EdgeGraph::new(),
            planes: Vec::new(),
            master_top: None,
            erased: BTreeSet::new(),
        };
        sketch.refresh()?;
        Ok(sketch)
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The fold tree.
    pub fn tree(&self) -> &FeatureTree {
        &self.tree
    }

    /// The edge graph of every finalized feature.
    pub fn graph(&self) -> &EdgeGraph {
        &self.graph
    }

    /// The feature being drawn.
    pub fn active(&self) -> Option<&FoldFeature> {
        self.active.as_ref()
    }

    /// Kinds of every feature in creation order.
    pub fn feature_kinds(&self) -> Vec<FeatureKind> {
        self.tree.iter().map(|(_, f)| f.kind()).collect()
    }

    /// The master card rectangle.
    pub fn master_bounds(&self) -> Option<Rect> {
        let master = self.tree.get(self.tree.root())?;
        Some(Rect::from_corners(&master.start?, &master.end?))
    }

    // =========================================================================
    // Feature lifecycle
    // =========================================================================

    /// Start drawing a feature at `start`.
    pub fn begin_feature(&mut self, kind: FeatureKind, start: Point2) -> Result<()> {
        if self.active.is_some() {
            return Err(SketchError::FeatureInProgress);
        }
        if kind == FeatureKind::MasterCard {
            return Err(SketchError::WrongFeatureKind(kind));
        }
        debug!(?kind, x = start.x, y = start.y, "began feature");
        self.active = Some(FoldFeature::of_kind(kind, start));
        Ok(())
    }

    /// Follow the cursor.
    ///
    /// A box fold's end stays inside the master card. The fold the feature
    /// would attach to is recorded provisionally so previews show the
    /// middle fold.
    pub fn update_feature(&mut self, point: Point2) -> Result<()> {
        let bounds = self.master_bounds();
        let active = self.active.as_mut().ok_or(SketchError::NoActiveFeature)?;
        let inside = bounds.map_or(true, |b| b.contains(&point));
        if active.kind() != FeatureKind::BoxFold || inside {
            active.track_cursor(point, &self.params);
        }
        let attachment = self.tree.find_spanned_fold(active, &self.params)?;
        active.set_provisional_attachment(attachment);
        Ok(())
    }

    /// Finish the feature being drawn and link it into the tree.
    ///
    /// A feature crossing no fold is discarded. A free-form stroke too short
    /// to close stays active.
    pub fn finalize_feature(&mut self) -> Result<FeatureId> {
        let mut feature = self.active.take().ok_or(SketchError::NoActiveFeature)?;
        match feature.kind() {
            FeatureKind::BoxFold => feature.fix_start_end_point(),
            FeatureKind::FreeForm => {
                let closed = match feature.as_free_form_mut() {
                    Some(shape) => shape.close_stroke(&self.params),
                    None => Ok(()),
                };
                if let Err(err) = closed {
                    warn!(%err, "free-form stroke cannot be closed yet");
                    self.active = Some(feature);
                    return Err(err.into());
                }
            }
            FeatureKind::MasterCard | FeatureKind::Polygon => {}
        }
        feature.set_provisional_attachment(None);

        let Some(attachment) = self.tree.find_spanned_fold(&feature, &self.params)? else {
            warn!(kind = ?feature.kind(), "feature spans no fold, discarded");
            return Err(SketchError::NoSpannedFold);
        };
        let id = self.tree.attach(feature, attachment)?;
        if self.tree.validity(id, &self.params)? == Validity::Invalid {
            warn!(?id, "feature cannot be folded");
        }
        self.refresh()?;
        info!(
            ?id,
            edges = self.graph.len(),
            planes = self.planes.len(),
            "finalized feature"
        );
        Ok(id)
    }

    /// Drop the feature being drawn.
    pub fn cancel_feature(&mut self) -> Option<FoldFeature> {
        self.active.take()
    }

    /// Remove a feature and its descendants.
    pub fn remove_feature(&mut self, id: FeatureId) -> Result<Vec<FoldFeature>> {
        let removed = self.tree.remove(id)?;
        self.refresh()?;
        Ok(removed)
    }

    /// Drag the active polygon's vertex near `from` to `to`.
    pub fn move_poly_point(&mut self, from: &Point2, to: Point2) -> Result<bool> {
        let radius = self.config.hit_test_radius;
        let active = self.active.as_mut().ok_or(SketchError::NoActiveFeature)?;
        if active.kind() != FeatureKind::Polygon {
            return Err(SketchError::WrongFeatureKind(active.kind()));
        }
        Ok(active.move_poly_point(from, to, radius))
    }

    // =========================================================================
    // Erasing
    // =========================================================================

    /// Erase an edge and its twin. Erased edges stay gone when the graph is
    /// rebuilt.
    pub fn erase_edge(&mut self, id: EdgeId) -> Result<()> {
        let edge = self.graph.edge(id)?;
        if edge.is_master {
            warn!(?id, "refused to erase a master card edge");
            return Err(SketchError::MasterEdge);
        }
        let signature = edge.signature();
        self.erased.insert(signature);
        info!(?id, "erased edge");
        self.refresh()
    }

    /// Erase the edge under `point`, if any. Returns whether one was
    /// erased.
    pub fn erase_at(&mut self, point: &Point2) -> Result<bool> {
        match self.edge_hit_test(point) {
            Some((id, _)) => self.erase_edge(id).map(|()| true),
            None => Ok(false),
        }
    }

    /// Bring every erased edge back.
    pub fn restore_erased(&mut self) -> Result<()> {
        self.erased.clear();
        self.refresh()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The edge nearest to `point` within the hit radius, with the nearest
    /// point on it.
    pub fn edge_hit_test(&self, point: &Point2) -> Option<(EdgeId, Point2)> {
        let radius = self.config.hit_test_radius;
        let inc = self.config.bezier_increments;
        self.graph
            .iter_undirected()
            .filter_map(|(id, e)| e.hit_test(point, radius, inc).map(|q| (id, q)))
            .min_by(|a, b| distance(point, &a.1).total_cmp(&distance(point, &b.1)))
    }

    /// The smallest plane containing `point`.
    pub fn plane_hit_test(&self, point: &Point2) -> Option<&Plane> {
        self.planes
            .iter()
            .filter(|p| p.contains(point))
            .min_by(|a, b| a.signed_area().abs().total_cmp(&b.signed_area().abs()))
    }

    /// The most recently drawn feature with an edge near `point`.
    pub fn feature_at(&mut self, point: &Point2) -> Result<Option<FeatureId>> {
        Ok(self.tree.feature_at(point, &self.params)?)
    }

    /// Edits offered when a feature is tapped.
    pub fn tap_options(&mut self, id: FeatureId) -> Result<Vec<FeatureOption>> {
        Ok(self.tree.tap_options(id, &self.params)?)
    }

    /// Every edge to draw: one per undirected graph edge in creation order,
    /// then the preview of the feature being drawn.
    pub fn current_edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self.graph.iter_undirected().map(|(_, e)| e.clone()).collect();
        if let Some(active) = &self.active {
            edges.extend(active.generate(&[], &self.params).edges);
        }
        edges
    }

    /// The planes of the finalized features.
    pub fn current_planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Stroke for an edge on the given medium.
    pub fn stroke_style(&self, edge: &Edge, medium: Medium) -> StrokeStyle {
        self.config.palette.edge_stroke(edge, medium)
    }

    /// Signed preview extrusion of a plane.
    pub fn preview_extrusion(&self, plane: &Plane) -> f64 {
        plane.preview_extrusion(self.config.extrusion_depth)
    }

    /// Points along an edge at the configured step.
    pub fn sample_edge(&self, edge: &Edge) -> Result<Vec<Point2>> {
        Ok(sample(&edge.curve, self.config.sample_step)?)
    }

    /// An edge resampled, simplified and refitted as a smooth curve, for
    /// export.
    pub fn smoothed_edge(&self, edge: &Edge) -> Result<Curve> {
        let points = self.sample_edge(edge)?;
        let simplified = simplify(&points, self.config.simplify_epsilon);
        Ok(curve_through_points(&simplified)?)
    }

    /// The graph edge along the master card's top cut.
    pub fn master_top_edge(&self) -> Option<EdgeId> {
        self.master_top
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// Rebuild the edge graph and planes from the tree.
    pub(crate) fn refresh(&mut self) -> Result<()> {
        let mut graph = EdgeGraph::new();
        let ids = self.tree.ids().to_vec();
        for id in ids {
            for edge in self.tree.edges(id, &self.params)? {
                if !self.erased.contains(&edge.signature()) {
                    graph.add_edge(edge.clone());
                }
            }
        }

        let master_top = self.master_bounds().and_then(|b| {
            let top = MasterCard::top_edge(
                Point2::new(b.min_x(), b.min_y()),
                Point2::new(b.max_x(), b.max_y()),
            );
            graph.find_by_signature(&top.signature())
        });

        let planes = assemble(&graph, master_top, self.config.bezier_increments)?;
        for (id, direction) in fold_directions(&planes, &graph) {
            graph.set_fold_direction(id, direction)?;
        }
        graph.mark_clean();
        debug!(edges = graph.len(), planes = planes.len(), "rebuilt sketch");

        self.graph = graph;
        self.planes = planes;
        self.master_top = master_top;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use approx::assert_relative_eq;
    use crease_kernel_feature::FeatureError;
    use crease_kernel_geom::GeomError;
    use crease_kernel_plane::{Orientation, PlaneKind};
    use crease_kernel_topo::{EdgeKind, FoldDirection};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn card() -> Sketch {
        Sketch::new(p(0.0, 0.0), p(200.0, 300.0), EngineConfig::default()).unwrap()
    }

    fn with_box(sketch: &mut Sketch, a: Point2, b: Point2) -> FeatureId {
        sketch.begin_feature(FeatureKind::BoxFold, a).unwrap();
        sketch.update_feature(b).unwrap();
        sketch.finalize_feature().unwrap()
    }

    /// The graph fold at height `y` whose span strictly covers `x`.
    fn fold_at(sketch: &Sketch, y: f64, x: f64) -> &Edge {
        sketch
            .graph()
            .iter_undirected()
            .map(|(_, e)| e)
            .find(|e| {
                e.kind == EdgeKind::Fold
                    && (e.start.y - y).abs() < 1e-9
                    && e.start.x.min(e.end.x) < x
                    && x < e.start.x.max(e.end.x)
            })
            .unwrap()
    }

    #[test]
    fn test_new_card() {
        let sketch = card();
        let edges = sketch.current_edges();
        assert_eq!(edges.len(), 7);
        assert_eq!(edges.iter().filter(|e| e.kind == EdgeKind::Fold).count(), 1);
        assert!(edges.iter().all(|e| e.is_master));
        assert!(sketch.master_top_edge().is_some());

        let planes = sketch.current_planes();
        assert_eq!(planes.len(), 2);
        let upper = sketch.plane_hit_test(&p(100.0, 50.0)).unwrap();
        assert_eq!(upper.orientation, Orientation::Vertical);
        assert_relative_eq!(upper.centroid().x, 100.0, epsilon = 1e-6);
        assert_relative_eq!(upper.centroid().y, 75.0, epsilon = 1e-6);
        assert_eq!(fold_at(&sketch, 150.0, 100.0).fold_direction, FoldDirection::Valley);
    }

    #[test]
    fn test_box_fold_lifecycle() {
        let mut sketch = card();
        sketch.begin_feature(FeatureKind::BoxFold, p(150.0, 200.0)).unwrap();
        sketch.update_feature(p(50.0, 100.0)).unwrap();
        // The preview already carries the middle fold.
        let preview_folds = sketch.current_edges()[7..]
            .iter()
            .filter(|e| e.kind == EdgeKind::Fold)
            .count();
        assert_eq!(preview_folds, 3);

        let id = sketch.finalize_feature().unwrap();
        let feature = sketch.tree().feature(id).unwrap();
        assert_eq!(feature.start, Some(p(50.0, 100.0)));
        assert_eq!(feature.end, Some(p(150.0, 200.0)));
        assert_eq!(feature.parent(), Some(sketch.tree().root()));
        assert!(sketch.active().is_none());

        assert_eq!(sketch.current_planes().len(), 4);
        let front = sketch.plane_hit_test(&p(100.0, 175.0)).unwrap();
        assert_eq!(front.orientation, Orientation::Vertical);
        let top = sketch.plane_hit_test(&p(100.0, 125.0)).unwrap();
        assert_eq!(top.orientation, Orientation::Horizontal);
        assert_eq!(fold_at(&sketch, 150.0, 100.0).fold_direction, FoldDirection::Hill);
        assert_eq!(fold_at(&sketch, 150.0, 20.0).fold_direction, FoldDirection::Valley);
    }

    #[test]
    fn test_box_end_stays_on_card() {
        let mut sketch = card();
        sketch.begin_feature(FeatureKind::BoxFold, p(50.0, 100.0)).unwrap();
        sketch.update_feature(p(150.0, 200.0)).unwrap();
        sketch.update_feature(p(250.0, 220.0)).unwrap();
        assert_eq!(sketch.active().unwrap().end, Some(p(150.0, 200.0)));
    }

    #[test]
    fn test_feature_without_span_is_discarded() {
        let mut sketch = card();
        sketch.begin_feature(FeatureKind::BoxFold, p(20.0, 20.0)).unwrap();
        sketch.update_feature(p(80.0, 80.0)).unwrap();
        assert!(matches!(sketch.finalize_feature(), Err(SketchError::NoSpannedFold)));
        assert!(sketch.active().is_none());
        assert_eq!(sketch.tree().len(), 1);
        assert_eq!(sketch.current_edges().len(), 7);
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut sketch = card();
        assert!(matches!(sketch.update_feature(p(1.0, 1.0)), Err(SketchError::NoActiveFeature)));
        assert!(matches!(sketch.finalize_feature(), Err(SketchError::NoActiveFeature)));
        assert!(matches!(
            sketch.begin_feature(FeatureKind::MasterCard, p(1.0, 1.0)),
            Err(SketchError::WrongFeatureKind(FeatureKind::MasterCard))
        ));
        sketch.begin_feature(FeatureKind::BoxFold, p(50.0, 100.0)).unwrap();
        assert!(matches!(
            sketch.begin_feature(FeatureKind::Polygon, p(1.0, 1.0)),
            Err(SketchError::FeatureInProgress)
        ));
        assert!(matches!(
            sketch.move_poly_point(&p(50.0, 100.0), p(1.0, 1.0)),
            Err(SketchError::WrongFeatureKind(FeatureKind::BoxFold))
        ));
        assert!(sketch.cancel_feature().is_some());
        assert!(sketch.active().is_none());

        // A stroke of one sample cannot close and stays active.
        sketch.begin_feature(FeatureKind::FreeForm, p(100.0, 140.0)).unwrap();
        assert!(matches!(
            sketch.finalize_feature(),
            Err(SketchError::Geom(GeomError::TooFewPoints { .. }))
        ));
        assert_eq!(sketch.active().map(|f| f.kind()), Some(FeatureKind::FreeForm));
        assert_eq!(sketch.tree().len(), 1);
    }

    #[test]
    fn test_polygon_points_move_but_never_attach() {
        let mut sketch = card();
        sketch.begin_feature(FeatureKind::Polygon, p(60.0, 100.0)).unwrap();
        sketch.update_feature(p(140.0, 100.0)).unwrap();
        sketch.update_feature(p(140.0, 200.0)).unwrap();
        assert!(sketch.move_poly_point(&p(141.0, 199.0), p(130.0, 210.0)).unwrap());
        assert_eq!(sketch.active().unwrap().end, Some(p(130.0, 210.0)));
        assert!(matches!(sketch.finalize_feature(), Err(SketchError::NoSpannedFold)));
    }

    #[test]
    fn test_remove_feature_restores_card() {
        let mut sketch = card();
        let outer = with_box(&mut sketch, p(50.0, 100.0), p(150.0, 200.0));
        with_box(&mut sketch, p(70.0, 110.0), p(130.0, 190.0));
        assert_eq!(sketch.tree().len(), 3);

        let removed = sketch.remove_feature(outer).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(sketch.tree().len(), 1);
        assert_eq!(sketch.current_edges().len(), 7);
        assert_eq!(sketch.current_planes().len(), 2);

        let root = sketch.tree().root();
        assert!(matches!(
            sketch.remove_feature(root),
            Err(SketchError::Feature(FeatureError::CannotRemoveRoot))
        ));
    }

    #[test]
    fn test_erase_edge() {
        let mut sketch = card();
        with_box(&mut sketch, p(50.0, 100.0), p(150.0, 200.0));
        let before = sketch.graph().len();

        let (master, _) = sketch.edge_hit_test(&p(100.0, 1.0)).unwrap();
        assert!(matches!(sketch.erase_edge(master), Err(SketchError::MasterEdge)));

        // The box top fold.
        assert!(sketch.erase_at(&p(100.0, 101.0)).unwrap());
        assert_eq!(sketch.graph().len(), before - 1);
        assert!(sketch.edge_hit_test(&p(100.0, 100.0)).is_none());
        assert!(!sketch.erase_at(&p(100.0, 60.0)).unwrap());

        // Still erased after the tree changes.
        with_box(&mut sketch, p(10.0, 120.0), p(40.0, 180.0));
        assert!(sketch.edge_hit_test(&p(100.0, 100.0)).is_none());

        sketch.restore_erased().unwrap();
        assert!(sketch.edge_hit_test(&p(100.0, 100.0)).is_some());
    }

    #[test]
    fn test_feature_at_and_tap_options() {
        let mut sketch = card();
        let id = with_box(&mut sketch, p(50.0, 100.0), p(150.0, 200.0));
        assert_eq!(sketch.feature_at(&p(100.0, 125.0)).unwrap(), Some(id));
        assert_eq!(
            sketch.tap_options(id).unwrap(),
            vec![FeatureOption::DeleteFeature, FeatureOption::AddFolds]
        );
        let root = sketch.tree().root();
        assert!(sketch.tap_options(root).unwrap().is_empty());
    }

    /// Free-form stroke through `samples` points of a circle.
    fn with_circle(sketch: &mut Sketch, centre: Point2, radius: f64, samples: usize) -> FeatureId {
        let on_circle = |i: usize| {
            let t = std::f64::consts::TAU * (i as f64 + 0.5) / samples as f64;
            p(centre.x + radius * t.cos(), centre.y + radius * t.sin())
        };
        sketch.begin_feature(FeatureKind::FreeForm, on_circle(0)).unwrap();
        for i in 1..samples {
            sketch.update_feature(on_circle(i)).unwrap();
        }
        sketch.finalize_feature().unwrap()
    }

    #[test]
    fn test_free_form_attaches() {
        let mut sketch = card();
        let id = with_circle(&mut sketch, p(100.0, 155.0), 40.0, 16);
        let feature = sketch.tree().feature(id).unwrap();
        assert_eq!(feature.parent(), Some(sketch.tree().root()));
        assert!(feature.as_free_form().unwrap().is_closed());
        // The master fold now has a gap under the shape.
        let master_folds = sketch
            .current_edges()
            .iter()
            .filter(|e| e.is_master && e.kind == EdgeKind::Fold)
            .count();
        assert_eq!(master_folds, 2);
    }

    #[test]
    fn test_free_form_pops_up() {
        let mut sketch = card();
        let id = with_circle(&mut sketch, p(100.0, 160.0), 50.0, 24);
        assert_eq!(sketch.tree().feature(id).unwrap().validity(), Validity::Valid);

        // Card top, top band, lower band, card bottom.
        assert_eq!(sketch.current_planes().len(), 4);
        let orientation = |x, y| sketch.plane_hit_test(&p(x, y)).unwrap().orientation;
        assert_eq!(orientation(100.0, 50.0), Orientation::Vertical);
        assert_eq!(orientation(100.0, 145.0), Orientation::Horizontal);
        assert_eq!(orientation(100.0, 170.0), Orientation::Vertical);
        assert_eq!(orientation(100.0, 250.0), Orientation::Horizontal);

        let mut chords: Vec<&Edge> = sketch
            .graph()
            .iter_undirected()
            .map(|(_, e)| e)
            .filter(|e| e.kind == EdgeKind::Fold && !e.is_master)
            .collect();
        chords.sort_by(|a, b| a.start.y.total_cmp(&b.start.y));
        let directions: Vec<FoldDirection> = chords.iter().map(|e| e.fold_direction).collect();
        assert_eq!(
            directions,
            vec![FoldDirection::Valley, FoldDirection::Hill, FoldDirection::Valley]
        );
        assert!(sketch
            .graph()
            .iter_undirected()
            .all(|(_, e)| e.kind != EdgeKind::Fold || e.fold_direction != FoldDirection::Unknown));

        // Nothing of the outline is left above the top chord.
        let top = chords[0].start.y;
        assert!(sketch.edge_hit_test(&p(100.0, 111.0)).is_none());
        assert!(top > 120.0);

        // Erasing one side arc leaves the others.
        let before = sketch.graph().len();
        assert!(sketch.erase_at(&p(54.2, 140.0)).unwrap());
        assert_eq!(sketch.graph().len(), before - 1);
    }

    #[test]
    fn test_styles_and_extrusion() {
        let sketch = card();
        let fold = fold_at(&sketch, 150.0, 100.0).clone();
        let style = sketch.stroke_style(&fold, Medium::Screen);
        assert_eq!(style.color, sketch.config().palette.valley);
        assert_eq!(style.dash, Some([10.0, 5.0]));
        assert_eq!(sketch.stroke_style(&fold, Medium::Laser).color, Color::BLACK);

        let smooth = sketch.smoothed_edge(&fold).unwrap();
        assert_eq!(smooth.segments().len(), 1);
        assert_eq!(smooth.first_point(), Some(fold.start));
        assert_eq!(smooth.last_point(), Some(fold.end));
        assert!(sketch.sample_edge(&fold).unwrap().len() > 2);

        let plane = &sketch.current_planes()[0];
        assert_eq!(plane.kind, PlaneKind::Plane);
        assert_eq!(sketch.preview_extrusion(plane), 1.0);
    }
}
