//! Canonical parameter set, cached preview geometry and dimension locks.

use crate::types::*;

/// Owns everything the preview depends on besides presentation style.
///
/// Mutation is unchecked; validation happens when a request is built.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: Parameters,
    preview: Option<PreviewGeometry>,
    width_lock: DimensionLock,
    height_lock: DimensionLock,
}

impl ParameterStore {
    /// Creates a store holding the default parameters and no geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current parameter values.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Assigns a single parameter.
    pub fn set_parameter(&mut self, key: ParamKey, value: impl Into<ParamValue>) {
        self.params.assign(key, value.into());
    }

    /// Assigns several parameters in order.
    pub fn set_parameters<I, V>(&mut self, patch: I)
    where
        I: IntoIterator<Item = (ParamKey, V)>,
        V: Into<ParamValue>,
    {
        for (key, value) in patch {
            self.set_parameter(key, value);
        }
    }

    /// Assigns a padding value, mirroring it onto the other axis when `linked`.
    pub fn set_padding(&mut self, axis: Axis, value: f64, linked: bool) {
        self.set_parameter(axis.padding_key(), value);
        if linked {
            let other = match axis {
                Axis::Width => Axis::Height,
                Axis::Height => Axis::Width,
            };
            self.set_parameter(other.padding_key(), value);
        }
    }

    /// Replaces the cached geometry.
    pub fn set_preview_data(&mut self, geometry: PreviewGeometry) {
        self.preview = Some(geometry);
    }

    /// Most recently accepted geometry, if any.
    pub fn preview(&self) -> Option<&PreviewGeometry> {
        self.preview.as_ref()
    }

    /// Request-shaped snapshot of the current parameters.
    pub fn api_parameters(&self) -> ApiParameters {
        self.params.to_api()
    }

    /// Derived figures, available once geometry has been received.
    pub fn statistics(&self) -> Option<Statistics> {
        let geometry = self.preview.as_ref()?;
        let inner_width = geometry.bounds.width();
        let inner_height = geometry.bounds.height();
        let wall = self.params.wall_thickness;
        let area = inner_width * inner_height;
        let density = if area > 0.0 {
            geometry.pillars.len() as f64 / area
        } else {
            0.0
        };

        Some(Statistics {
            pillar_count: geometry.pillars.len(),
            hole_count: geometry.holes.len(),
            inner_width,
            inner_height,
            total_width: inner_width + 2.0 * wall,
            total_height: inner_height + 2.0 * wall,
            total_height_z: self.params.floor_thickness + self.params.pillar_height,
            density,
        })
    }

    /// Lock state for an axis.
    pub fn lock(&self, axis: Axis) -> DimensionLock {
        match axis {
            Axis::Width => self.width_lock,
            Axis::Height => self.height_lock,
        }
    }

    /// Whether the axis is locked.
    pub fn is_locked(&self, axis: Axis) -> bool {
        self.lock(axis).active
    }

    /// Target of a locked axis.
    pub fn lock_target(&self, axis: Axis) -> Option<f64> {
        let lock = self.lock(axis);
        lock.active.then_some(lock.target).flatten()
    }

    /// Flips the lock on `axis`.
    ///
    /// Locking records `target`; unlocking clears it. Returns `false` and
    /// changes nothing when no geometry exists yet or when locking with a
    /// target that is not a finite number.
    pub fn toggle_lock(&mut self, axis: Axis, target: f64) -> bool {
        if self.preview.is_none() {
            return false;
        }
        let lock = match axis {
            Axis::Width => &mut self.width_lock,
            Axis::Height => &mut self.height_lock,
        };
        if lock.active {
            *lock = DimensionLock::default();
        } else {
            if !target.is_finite() {
                return false;
            }
            *lock = DimensionLock {
                active: true,
                target: Some(target),
            };
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_geometry(pillars: usize) -> PreviewGeometry {
        PreviewGeometry {
            pillars: (0..pillars).map(|i| Point::new(i as f64, 0.0)).collect(),
            holes: vec![Point::new(0.5, 0.5)],
            bounds: Bounds {
                min_x: 0.0,
                max_x: 10.0,
                min_y: 0.0,
                max_y: 5.0,
            },
        }
    }

    #[test]
    fn test_statistics_absent_without_geometry() {
        assert!(ParameterStore::new().statistics().is_none());
    }

    #[test]
    fn test_statistics_density() {
        let mut store = ParameterStore::new();
        store.set_parameter(ParamKey::WallThickness, 1.0);
        store.set_preview_data(sample_geometry(20));
        let stats = store.statistics().unwrap();
        assert_eq!(stats.pillar_count, 20);
        assert_eq!(stats.hole_count, 1);
        assert!((stats.density - 0.40).abs() < 1e-12);
        assert_eq!(stats.total_width, 12.0);
        assert_eq!(stats.total_height, 7.0);
        assert_eq!(stats.total_height_z, 12.0);
    }

    #[test]
    fn test_lock_requires_geometry() {
        let mut store = ParameterStore::new();
        assert!(!store.toggle_lock(Axis::Width, 12.0));
        assert!(!store.is_locked(Axis::Width));
    }

    #[test]
    fn test_lock_rejects_nan_target() {
        let mut store = ParameterStore::new();
        store.set_preview_data(sample_geometry(2));
        assert!(!store.toggle_lock(Axis::Height, f64::NAN));
        assert_eq!(store.lock(Axis::Height), DimensionLock::default());
    }

    #[test]
    fn test_toggle_lock_sets_and_clears_target() {
        let mut store = ParameterStore::new();
        store.set_preview_data(sample_geometry(2));
        assert!(store.toggle_lock(Axis::Width, 12.5));
        assert_eq!(store.lock_target(Axis::Width), Some(12.5));
        assert!(store.toggle_lock(Axis::Width, f64::NAN));
        assert!(!store.is_locked(Axis::Width));
        assert_eq!(store.lock(Axis::Width).target, None);
    }

    #[test]
    fn test_linked_padding_mirrors() {
        let mut store = ParameterStore::new();
        store.set_padding(Axis::Width, 0.6, true);
        assert_eq!(store.parameters().floor_padding_x, 0.6);
        assert_eq!(store.parameters().floor_padding_y, 0.6);
        store.set_padding(Axis::Height, 0.1, false);
        assert_eq!(store.parameters().floor_padding_x, 0.6);
        assert_eq!(store.parameters().floor_padding_y, 0.1);
    }

    #[test]
    fn test_bulk_assignment() {
        let mut store = ParameterStore::new();
        store.set_parameters([
            (ParamKey::Rows, ParamValue::Number(4.0)),
            (ParamKey::LayoutType, ParamValue::Layout(LayoutType::Voronoi)),
            (ParamKey::Spacing, ParamValue::Text("0.5".into())),
        ]);
        let params = store.parameters();
        assert_eq!(params.rows, 4.0);
        assert_eq!(params.layout_type, LayoutType::Voronoi);
        assert_eq!(params.spacing, 0.5);
    }
}
