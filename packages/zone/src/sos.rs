//! Plain-text location context for outgoing SOS alerts.
//!
//! Only formats text; sending it is the dispatcher's job.

use std::fmt::Write as _;

use safe_zone_places_models::{Coordinate, Zone, ZoneStatus};

/// Location and nearest-help summary attached to an SOS alert.
#[derive(Debug, Clone)]
pub struct SosContext<'a> {
    location: Option<Coordinate>,
    status: &'a ZoneStatus,
}

impl<'a> SosContext<'a> {
    /// Creates a context for an alert sent from `location`.
    #[must_use]
    pub const fn new(location: Option<Coordinate>, status: &'a ZoneStatus) -> Self {
        Self { location, status }
    }

    /// Map link for the alert location, if known.
    #[must_use]
    pub fn map_link(&self) -> Option<String> {
        self.location.map(|c| {
            format!(
                "https://www.google.com/maps?q={},{}",
                c.latitude(),
                c.longitude()
            )
        })
    }

    /// Renders the context block.
    ///
    /// # Panics
    ///
    /// Only if formatting into a `String` fails.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        match (self.location, self.map_link()) {
            (Some(c), Some(link)) => {
                writeln!(
                    out,
                    "Location: {:.6}, {:.6}",
                    c.latitude(),
                    c.longitude()
                )
                .unwrap();
                writeln!(out, "Map: {link}").unwrap();
            }
            _ => out.push_str("Location: unavailable\n"),
        }

        writeln!(out, "Safety: {} ({})", self.status.message, self.status.zone).unwrap();

        if let Some(place) = self
            .status
            .nearest_place
            .as_ref()
            .filter(|_| self.status.zone != Zone::Unknown)
        {
            writeln!(
                out,
                "Nearest help: {} [{}], {:.1} km",
                place.name,
                place.category.label(),
                self.status.nearest_distance_km
            )
            .unwrap();
            writeln!(out, "Address: {}", place.address).unwrap();
        }

        out
    }
}

impl std::fmt::Display for SosContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use safe_zone_places_models::{PlaceCategory, SafePlace};

    use super::*;
    use crate::classify;

    #[test]
    fn renders_location_and_nearest_place() {
        let user = Coordinate::new(28.6139, 77.209).unwrap();
        let place = SafePlace {
            id: "P1".to_string(),
            name: "Parliament Street Police Station".to_string(),
            category: PlaceCategory::Police,
            address: "Parliament St, New Delhi".to_string(),
            coordinate: Coordinate::new(28.6225, 77.2131).unwrap(),
            distance_meters: Some(1_040.0),
            rating: None,
            open_now: None,
        };
        let status = classify(Some(user), &[place]);

        let text = SosContext::new(Some(user), &status).render();
        assert!(text.contains("https://www.google.com/maps?q=28.6139,77.209"));
        assert!(text.contains("Location: 28.613900, 77.209000"));
        assert!(text.contains("Safety: 1.0km to safety (ORANGE)"));
        assert!(text.contains("Nearest help: Parliament Street Police Station [Police Station], 1.0 km"));
        assert!(text.contains("Address: Parliament St, New Delhi"));
    }

    #[test]
    fn renders_without_location() {
        let status = classify(None, &[]);
        let ctx = SosContext::new(None, &status);
        assert!(ctx.map_link().is_none());
        let text = ctx.to_string();
        assert!(text.starts_with("Location: unavailable"));
        assert!(text.contains("Safety zone unknown (UNKNOWN)"));
        assert!(!text.contains("Nearest help"));
    }
}
