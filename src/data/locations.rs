use crate::shared::*;

/// Populate the LocationRegistry with every hunting area the game ships with.
///
/// Centers are sidewalk-accessible points; the ghost spawns within a few
/// meters of the center and the ECTO-1 sits at the configured offset.
pub fn populate_locations(registry: &mut LocationRegistry) {
    registry.locations = vec![
        Location {
            name: "Firehouse".into(),
            center: Coordinate::new(40.719_736, -74.006_638),
        },
        Location {
            name: "Public Library".into(),
            center: Coordinate::new(40.753_182, -73.982_253),
        },
        Location {
            name: "Central Park".into(),
            center: Coordinate::new(40.782_865, -73.965_355),
        },
        Location {
            name: "Columbia University".into(),
            center: Coordinate::new(40.807_536, -73.962_573),
        },
        Location {
            name: "Sedgewick Hotel".into(),
            center: Coordinate::new(40.764_618, -73.973_950),
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_names_are_unique() {
        let mut registry = LocationRegistry::default();
        populate_locations(&mut registry);
        let mut names = std::collections::HashSet::new();
        for loc in &registry.locations {
            assert!(names.insert(loc.name.clone()), "Duplicate location: {}", loc.name);
        }
    }

    #[test]
    fn test_location_coordinates_are_valid() {
        let mut registry = LocationRegistry::default();
        populate_locations(&mut registry);
        assert!(!registry.locations.is_empty());
        for loc in &registry.locations {
            assert!((-90.0..=90.0).contains(&loc.center.lat), "{} lat", loc.name);
            assert!((-180.0..=180.0).contains(&loc.center.lon), "{} lon", loc.name);
        }
    }

    #[test]
    fn test_registry_lookup_by_name() {
        let mut registry = LocationRegistry::default();
        populate_locations(&mut registry);
        assert!(registry.get("Firehouse").is_some());
        assert!(registry.get("firehouse").is_none());
    }
}
